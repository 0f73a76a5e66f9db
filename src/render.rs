//! Render Driver - shared segment collection and repaint loop
//!
//! The generator appends, the paint callback draws a snapshot. Segments are
//! drawn in insertion order so later strokes sit on top of earlier ones.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::segment::AnimatedSegment;
use crate::surface::{Surface, SurfaceError};

/// Something that can schedule another paint callback
pub trait RequestRepaint {
    fn request_repaint(&self);
}

impl RequestRepaint for egui::Context {
    fn request_repaint(&self) {
        egui::Context::request_repaint(self);
    }
}

/// Outcome of one paint callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaintReport {
    pub drawn: usize,
    pub animating: bool,
}

#[derive(Default)]
struct Segments {
    items: Vec<Arc<AnimatedSegment>>,
    shut_down: bool,
}

/// Thread-safe, append-only segment list
#[derive(Clone, Default)]
pub struct RenderDriver {
    segments: Arc<RwLock<Segments>>,
    depth: Arc<AtomicU32>,
}

impl RenderDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment. Returns false once the driver has shut down, in
    /// which case the segment is dropped.
    pub fn push(&self, segment: AnimatedSegment) -> bool {
        let mut segments = self.write();
        if segments.shut_down {
            return false;
        }
        segments.items.push(Arc::new(segment));
        true
    }

    /// Forget every segment, ahead of redrawing at a new depth
    pub fn clear(&self, depth: u32) {
        self.write().items.clear();
        self.depth.store(depth, Ordering::Relaxed);
    }

    /// Depth of the pattern currently being drawn
    pub fn depth(&self) -> u32 {
        self.depth.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.read().items.len()
    }

    /// Stable copy of the collection as it stands now
    pub fn snapshot(&self) -> Vec<Arc<AnimatedSegment>> {
        self.read().items.clone()
    }

    /// Refuse further segments and drop the current ones, cancelling any
    /// pending completion wait.
    pub fn shutdown(&self) {
        let mut segments = self.write();
        segments.shut_down = true;
        segments.items.clear();
    }

    pub fn is_shut_down(&self) -> bool {
        self.read().shut_down
    }

    /// Draw every segment, then ask for one more frame if any is still moving
    pub fn paint<S, R>(&self, surface: &mut S, repaint: &R) -> Result<PaintReport, SurfaceError>
    where
        S: Surface + ?Sized,
        R: RequestRepaint + ?Sized,
    {
        let snapshot = self.snapshot();
        let mut report = PaintReport::default();

        for segment in &snapshot {
            let progress = segment.draw(surface).map_err(|e| {
                crate::log_error!(e, segment = ?segment);
                e
            })?;
            report.drawn += 1;
            report.animating |= progress.is_animating();
        }

        if report.animating {
            repaint.request_repaint();
        }
        Ok(report)
    }

    fn read(&self) -> RwLockReadGuard<'_, Segments> {
        self.segments.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Segments> {
        self.segments.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
pub mod testing {
    use super::RequestRepaint;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    pub struct CountingRepaint {
        pub requests: AtomicUsize,
    }

    impl CountingRepaint {
        pub fn count(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    impl RequestRepaint for CountingRepaint {
        fn request_repaint(&self) {
            self.requests.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::CountingRepaint;
    use super::*;
    use crate::segment::Progress;
    use crate::surface::testing::RecordingSurface;
    use crate::surface::Rgb;
    use crate::turtle::Point;
    use std::time::Duration;

    fn settled(x: i32) -> AnimatedSegment {
        let seg = AnimatedSegment::new(Point::new(x, 0), Point::new(x, 10), Rgb(0, 255, 0), Duration::ZERO);
        let _ = seg.start();
        seg
    }

    #[test]
    fn test_paint_in_insertion_order_with_one_repaint() {
        let driver = RenderDriver::new();
        for x in 0..3 {
            assert!(driver.push(settled(x)));
        }
        let moving = AnimatedSegment::new(Point::new(9, 0), Point::new(9, 50), Rgb(105, 80, 0), Duration::from_secs(3600));
        let _done = moving.start();
        assert!(driver.push(moving));

        let mut surface = RecordingSurface::default();
        let repaint = CountingRepaint::default();
        let report = driver.paint(&mut surface, &repaint).unwrap();

        assert_eq!(report, PaintReport { drawn: 4, animating: true });
        assert_eq!(repaint.count(), 1);
        let xs: Vec<i32> = surface.lines.iter().map(|l| l.from.x).collect();
        assert_eq!(xs, vec![0, 1, 2, 9]);
    }

    #[test]
    fn test_no_repaint_when_all_settled() {
        let driver = RenderDriver::new();
        driver.push(settled(0));
        driver.push(settled(1));

        let mut surface = RecordingSurface::default();
        let repaint = CountingRepaint::default();
        let report = driver.paint(&mut surface, &repaint).unwrap();
        assert!(!report.animating);
        assert_eq!(repaint.count(), 0);
    }

    #[test]
    fn test_snapshot_is_stable() {
        let driver = RenderDriver::new();
        driver.push(settled(0));
        let snapshot = driver.snapshot();
        driver.push(settled(1));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(driver.len(), 2);
    }

    #[test]
    fn test_clear_sets_depth() {
        let driver = RenderDriver::new();
        driver.push(settled(0));
        driver.clear(3);
        assert_eq!(driver.len(), 0);
        assert_eq!(driver.depth(), 3);
    }

    #[test]
    fn test_shutdown_refuses_and_cancels() {
        let driver = RenderDriver::new();
        let seg = AnimatedSegment::new(Point::new(0, 0), Point::new(0, 10), Rgb::BLACK, Duration::from_secs(3600));
        let done = seg.start();
        driver.push(seg);

        driver.shutdown();
        assert!(driver.is_shut_down());
        assert!(done.wait().is_err());
        assert!(!driver.push(settled(0)));
        assert_eq!(driver.len(), 0);
    }

    #[test]
    fn test_paint_error_propagates() {
        let driver = RenderDriver::new();
        driver.push(settled(0));
        driver.push(settled(1));
        let mut surface = RecordingSurface {
            fail_after: Some(1),
            ..Default::default()
        };
        let repaint = CountingRepaint::default();
        assert!(driver.paint(&mut surface, &repaint).is_err());
        assert_eq!(surface.lines.len(), 1);
        assert_eq!(repaint.count(), 0);
        // The first segment settled on that frame and stays settled
        let mut retry = RecordingSurface::default();
        assert_eq!(driver.snapshot()[0].draw(&mut retry).unwrap(), Progress::Settled(Point::new(0, 10)));
    }
}
