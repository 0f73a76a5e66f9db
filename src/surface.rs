//! Drawing surface seam
//!
//! The core only needs pen selection and straight lines; the viewer
//! implements this over an egui painter.

use crate::turtle::Point;
use thiserror::Error;

// The egui backend cannot fail, only recording surfaces in tests do
#[cfg_attr(not(test), allow(dead_code))]
#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("Could not draw line: {0}")]
    Line(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pen {
    pub color: Rgb,
    pub width: f32,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            color: Rgb::BLACK,
            width: 1.0,
        }
    }
}

pub trait Surface {
    /// Make `pen` current, returning the pen it replaced
    fn select_pen(&mut self, pen: Pen) -> Pen;

    /// Line from `from` to `to` with the current pen
    fn line(&mut self, from: Point, to: Point) -> Result<(), SurfaceError>;
}

/// Selects a pen for its lifetime and puts the previous one back on drop,
/// whichever way the caller leaves.
pub struct PenGuard<'a, S: Surface + ?Sized> {
    surface: &'a mut S,
    previous: Pen,
}

impl<'a, S: Surface + ?Sized> PenGuard<'a, S> {
    pub fn select(surface: &'a mut S, pen: Pen) -> Self {
        let previous = surface.select_pen(pen);
        Self { surface, previous }
    }

    pub fn line(&mut self, from: Point, to: Point) -> Result<(), SurfaceError> {
        self.surface.line(from, to)
    }
}

impl<S: Surface + ?Sized> Drop for PenGuard<'_, S> {
    fn drop(&mut self) {
        self.surface.select_pen(self.previous);
    }
}

/// In-memory surface for tests
#[cfg(test)]
pub mod testing {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct DrawnLine {
        pub from: Point,
        pub to: Point,
        pub pen: Pen,
    }

    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub pen: Pen,
        pub lines: Vec<DrawnLine>,
        pub pen_changes: usize,
        /// Fail every line call after this many succeeded
        pub fail_after: Option<usize>,
    }

    impl Surface for RecordingSurface {
        fn select_pen(&mut self, pen: Pen) -> Pen {
            self.pen_changes += 1;
            std::mem::replace(&mut self.pen, pen)
        }

        fn line(&mut self, from: Point, to: Point) -> Result<(), SurfaceError> {
            if self.fail_after.is_some_and(|n| self.lines.len() >= n) {
                return Err(SurfaceError::Line("device lost".to_string()));
            }
            self.lines.push(DrawnLine {
                from,
                to,
                pen: self.pen,
            });
            Ok(())
        }
    }
}
