//! Background tree generator
//!
//! Grows the L-system one pass at a time and feeds the render driver one
//! stroke at a time, waiting for each stroke to finish animating before the
//! next one starts.

use std::sync::Arc;
use std::thread::JoinHandle;

use thiserror::Error;
use tracing::{debug, info};

use crate::lsystem::LSystem;
use crate::render::{RenderDriver, RequestRepaint};
use crate::segment::{AnimatedSegment, CompletionError, SegmentStyle};
use crate::turtle::{Point, StrokeKind, Turtle, TurtleError, TurtleEvent};

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Turtle error: {0}")]
    Turtle(#[from] TurtleError),
    #[error("Stroke animation abandoned while the renderer was still open")]
    Cancelled(#[from] CompletionError),
    #[error("Generator thread panicked")]
    Panicked,
}

/// Why a generator run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stopped {
    /// Driver shut down, usually because the window closed
    Shutdown,
    /// The configured maximum depth has been drawn
    MaxDepth(u32),
}

pub struct Generator<R: ?Sized> {
    system: LSystem,
    origin: Point,
    max_depth: Option<u32>,
    leaf: SegmentStyle,
    branch: SegmentStyle,
    driver: RenderDriver,
    repaint: Arc<R>,
}

impl<R: RequestRepaint + ?Sized> Generator<R> {
    pub fn new(system: LSystem, driver: RenderDriver, repaint: Arc<R>) -> Self {
        Self {
            system,
            origin: crate::turtle::ORIGIN,
            max_depth: None,
            leaf: SegmentStyle::for_kind(StrokeKind::Leaf),
            branch: SegmentStyle::for_kind(StrokeKind::Branch),
            driver,
            repaint,
        }
    }

    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    /// Stop after drawing the pattern at this depth
    pub fn with_max_depth(mut self, max_depth: Option<u32>) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[cfg(test)]
    pub fn with_styles(mut self, leaf: SegmentStyle, branch: SegmentStyle) -> Self {
        self.leaf = leaf;
        self.branch = branch;
        self
    }

    /// Redraw the tree from scratch at ever greater depth until stopped
    pub fn run(mut self) -> Result<Stopped, GeneratorError> {
        loop {
            let depth = self.system.depth();
            self.driver.clear(depth);
            self.repaint.request_repaint();
            info!(depth, symbols = self.system.value().len(), "Drawing tree");

            if !self.draw_pass()? {
                info!("Renderer shut down, generator stopping");
                return Ok(Stopped::Shutdown);
            }

            if self.max_depth.is_some_and(|max| depth >= max) {
                info!(depth, "Maximum depth drawn");
                return Ok(Stopped::MaxDepth(depth));
            }
            self.system.iterate();
        }
    }

    /// One walk over the current pattern. Returns false if the driver went
    /// away mid-pass.
    fn draw_pass(&self) -> Result<bool, GeneratorError> {
        let mut turtle = Turtle::new(self.origin);
        for symbol in self.system.value().chars() {
            let stroke = match turtle.step(symbol)? {
                Some(TurtleEvent::Segment(stroke)) => stroke,
                _ => continue,
            };

            let style = match stroke.kind {
                StrokeKind::Leaf => self.leaf,
                StrokeKind::Branch => self.branch,
            };
            let segment = AnimatedSegment::from_stroke(&stroke, style);
            let done = segment.start();
            if !self.driver.push(segment) {
                return Ok(false);
            }
            self.repaint.request_repaint();

            if let Err(e) = done.wait() {
                // Only a shutdown may drop a pending stroke; anything else
                // means its settling draw failed
                if self.driver.is_shut_down() {
                    return Ok(false);
                }
                return Err(e.into());
            }
            debug!(?stroke, "Stroke settled");
        }
        Ok(true)
    }
}

impl<R: RequestRepaint + Send + Sync + ?Sized + 'static> Generator<R> {
    /// Run on a dedicated thread
    pub fn spawn(self) -> std::io::Result<JoinHandle<Result<Stopped, GeneratorError>>> {
        std::thread::Builder::new()
            .name("tree-generator".to_string())
            .spawn(move || {
                self.run().map_err(|e| {
                    crate::log_error!(e);
                    e
                })
            })
    }
}

/// Wait for a spawned generator, folding a panic into an error
pub fn join(handle: JoinHandle<Result<Stopped, GeneratorError>>) -> Result<Stopped, GeneratorError> {
    handle.join().map_err(|_| GeneratorError::Panicked)?
}
