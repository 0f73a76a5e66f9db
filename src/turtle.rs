//! Turtle 2D Interpreter
//!
//! Walks an L-system string and turns it into line strokes.
//! - `0`: leaf stroke (short), `1`: branch stroke (long)
//! - `[`: save position and heading, turn left 45 degrees
//! - `]`: restore position and heading, turn right 45 degrees
//!
//! Screen coordinates: y grows downwards, heading 0 points up.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where the demo turtle starts
pub const ORIGIN: Point = Point { x: 500, y: 500 };

/// Stroke length for `0`
pub const LEAF_LENGTH: i32 = 10;
/// Stroke length for `1`
pub const BRANCH_LENGTH: i32 = 50;

/// Turn applied by `[` (left) and `]` (right)
const TURN: i32 = 45;

/// Unit offsets per heading, clockwise from up. Diagonals are not normalised.
const DIRECTIONS: [(i32, i32); 8] = [
    (0, -1),  // 0: up
    (1, -1),  // 45: up & right
    (1, 0),   // 90: right
    (1, 1),   // 135: down & right
    (0, 1),   // 180: down
    (-1, 1),  // 225: down & left
    (-1, 0),  // 270: left
    (-1, -1), // 315: up & left
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TurtleError {
    #[error("headings that aren't multiples of 45 degrees aren't supported (got {0})")]
    UnsupportedHeading(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeKind {
    Leaf,
    Branch,
}

impl StrokeKind {
    pub fn length(self) -> i32 {
        match self {
            StrokeKind::Leaf => LEAF_LENGTH,
            StrokeKind::Branch => BRANCH_LENGTH,
        }
    }
}

/// A straight line the turtle drew
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stroke {
    pub kind: StrokeKind,
    pub start: Point,
    pub end: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurtleEvent {
    Segment(Stroke),
    Push,
    Pop,
}

impl TurtleEvent {
    pub fn stroke(&self) -> Option<&Stroke> {
        match self {
            TurtleEvent::Segment(stroke) => Some(stroke),
            _ => None,
        }
    }
}

/// Position plus heading in degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurtleState {
    pub position: Point,
    pub heading: i32,
}

/// End of a line of `length` from `from` along `heading`.
pub fn end_position(from: Point, heading: i32, length: i32) -> Result<Point, TurtleError> {
    if heading % TURN != 0 || !(0..360).contains(&heading) {
        return Err(TurtleError::UnsupportedHeading(heading));
    }
    let (dx, dy) = DIRECTIONS[(heading / TURN) as usize];
    Ok(Point::new(from.x + dx * length, from.y + dy * length))
}

/// Bring a heading that stepped one turn past either end back into 0..360
fn wrap(heading: i32) -> i32 {
    if heading < 0 {
        360 - TURN
    } else if heading >= 360 {
        0
    } else {
        heading
    }
}

#[derive(Debug, Clone)]
pub struct Turtle {
    state: TurtleState,
    saved: Vec<TurtleState>,
}

impl Turtle {
    pub fn new(origin: Point) -> Self {
        Self {
            state: TurtleState {
                position: origin,
                heading: 0,
            },
            saved: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> TurtleState {
        self.state
    }

    /// Process one symbol. Unknown symbols produce no event.
    pub fn step(&mut self, symbol: char) -> Result<Option<TurtleEvent>, TurtleError> {
        let event = match symbol {
            '0' => Some(TurtleEvent::Segment(self.forward(StrokeKind::Leaf)?)),
            '1' => Some(TurtleEvent::Segment(self.forward(StrokeKind::Branch)?)),
            '[' => {
                self.saved.push(self.state);
                self.state.heading -= TURN;
                Some(TurtleEvent::Push)
            }
            ']' => {
                // An unmatched `]` keeps the current state and still turns
                if let Some(saved) = self.saved.pop() {
                    self.state = saved;
                }
                self.state.heading += TURN;
                Some(TurtleEvent::Pop)
            }
            _ => None,
        };
        self.state.heading = wrap(self.state.heading);
        Ok(event)
    }

    fn forward(&mut self, kind: StrokeKind) -> Result<Stroke, TurtleError> {
        let start = self.state.position;
        let end = end_position(start, self.state.heading, kind.length())?;
        self.state.position = end;
        Ok(Stroke { kind, start, end })
    }
}

/// Walk a whole symbol string from `origin`, heading up
pub fn interpret(symbols: &str, origin: Point) -> Result<Vec<TurtleEvent>, TurtleError> {
    let mut turtle = Turtle::new(origin);
    let mut events = Vec::with_capacity(symbols.len());
    for symbol in symbols.chars() {
        if let Some(event) = turtle.step(symbol)? {
            events.push(event);
        }
    }
    Ok(events)
}

/// Only the strokes of a walk, in drawing order
pub fn strokes(symbols: &str, origin: Point) -> Result<Vec<Stroke>, TurtleError> {
    Ok(interpret(symbols, origin)?
        .iter()
        .filter_map(TurtleEvent::stroke)
        .copied()
        .collect())
}
