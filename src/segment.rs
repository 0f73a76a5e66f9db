//! Animated line segments
//!
//! A segment grows linearly from its start point to its end point over a
//! fixed duration once started. The first draw that sees the animation
//! finished fires the segment's completion exactly once.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::oneshot;

use crate::surface::{Pen, PenGuard, Rgb, Surface, SurfaceError};
use crate::turtle::{Point, Stroke, StrokeKind};

/// Leaf strokes: green, quick
pub const LEAF_STYLE: SegmentStyle = SegmentStyle {
    color: Rgb(0, 255, 0),
    duration: Duration::from_millis(400),
};

/// Branch strokes: brown, slow
pub const BRANCH_STYLE: SegmentStyle = SegmentStyle {
    color: Rgb(105, 80, 0),
    duration: Duration::from_millis(2_000),
};

const STROKE_WIDTH: f32 = 1.0;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CompletionError {
    #[error("segment was dropped before its animation finished")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentStyle {
    pub color: Rgb,
    pub duration: Duration,
}

impl SegmentStyle {
    pub fn for_kind(kind: StrokeKind) -> Self {
        match kind {
            StrokeKind::Leaf => LEAF_STYLE,
            StrokeKind::Branch => BRANCH_STYLE,
        }
    }
}

/// What a draw call rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Never started, nothing drawn
    NotStarted,
    /// Partial line up to this point
    Animating(Point),
    /// Full line; this draw fired the completion
    Completed(Point),
    /// Full line, completion fired earlier
    Settled(Point),
}

impl Progress {
    pub fn is_animating(&self) -> bool {
        matches!(self, Progress::Animating(_))
    }
}

enum AnimationState {
    Idle,
    Animating {
        since: Instant,
        done: oneshot::Sender<()>,
    },
    Settled,
}

pub struct AnimatedSegment {
    start: Point,
    end: Point,
    pen: Pen,
    duration: Duration,
    state: Mutex<AnimationState>,
}

impl AnimatedSegment {
    pub fn new(start: Point, end: Point, color: Rgb, duration: Duration) -> Self {
        Self {
            start,
            end,
            pen: Pen {
                color,
                width: STROKE_WIDTH,
            },
            duration,
            state: Mutex::new(AnimationState::Idle),
        }
    }

    /// Segment for a turtle stroke, styled by its kind
    pub fn from_stroke(stroke: &Stroke, style: SegmentStyle) -> Self {
        Self::new(stroke.start, stroke.end, style.color, style.duration)
    }

    pub fn start(&self) -> Completion {
        self.start_at(Instant::now())
    }

    /// Begin animating from `now`. Each call hands out a fresh completion;
    /// restarting cancels the previous one.
    pub fn start_at(&self, now: Instant) -> Completion {
        let (done, rx) = oneshot::channel();
        *self.lock() = AnimationState::Animating { since: now, done };
        Completion { rx }
    }

    /// Whether the last observed state was still animating
    pub fn is_animating(&self) -> bool {
        matches!(*self.lock(), AnimationState::Animating { .. })
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) -> Result<Progress, SurfaceError> {
        self.draw_at(surface, Instant::now())
    }

    pub fn draw_at<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        now: Instant,
    ) -> Result<Progress, SurfaceError> {
        let (progress, done) = self.advance(now);
        let tip = match progress {
            Progress::NotStarted => return Ok(progress),
            Progress::Animating(tip) | Progress::Completed(tip) | Progress::Settled(tip) => tip,
        };

        {
            let mut pen = PenGuard::select(surface, self.pen);
            pen.line(self.start, tip)?;
        }

        if let Some(done) = done {
            // The waiter may have gone away; settlement still stands
            let _ = done.send(());
        }
        Ok(progress)
    }

    /// Move the animation forward to `now`, taking the completion sender
    /// if this is the first observation of settlement.
    fn advance(&self, now: Instant) -> (Progress, Option<oneshot::Sender<()>>) {
        let mut state = self.lock();
        let since = match &*state {
            AnimationState::Idle => return (Progress::NotStarted, None),
            AnimationState::Settled => return (Progress::Settled(self.end), None),
            AnimationState::Animating { since, .. } => *since,
        };

        let elapsed = now.saturating_duration_since(since);
        if elapsed < self.duration {
            return (Progress::Animating(self.point_at(elapsed)), None);
        }

        match std::mem::replace(&mut *state, AnimationState::Settled) {
            AnimationState::Animating { done, .. } => (Progress::Completed(self.end), Some(done)),
            _ => (Progress::Settled(self.end), None),
        }
    }

    /// Interpolated tip after `elapsed`, rounded to the nearest pixel
    fn point_at(&self, elapsed: Duration) -> Point {
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        let lerp = |a: i32, b: i32| (a as f64 + (b - a) as f64 * t).round() as i32;
        Point::new(lerp(self.start.x, self.end.x), lerp(self.start.y, self.end.y))
    }

    fn lock(&self) -> MutexGuard<'_, AnimationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for AnimatedSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimatedSegment")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("pen", &self.pen)
            .field("duration", &self.duration)
            .field("animating", &self.is_animating())
            .finish()
    }
}

/// Handle for one segment's animation end
#[derive(Debug)]
pub struct Completion {
    rx: oneshot::Receiver<()>,
}

impl Completion {
    /// Block the calling thread until the segment settles.
    /// Must not be called from inside an async runtime.
    pub fn wait(self) -> Result<(), CompletionError> {
        self.rx.blocking_recv().map_err(|_| CompletionError::Cancelled)
    }
}
