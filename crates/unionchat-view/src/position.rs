use serde::{Deserialize, Serialize};

/// A point in unit coordinates (`0.0..=1.0` on both axes) within a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitPoint {
    pub x: f64,
    pub y: f64,
}

impl UnitPoint {
    pub const TOP: Self = Self { x: 0.5, y: 0.0 };
    pub const CENTER: Self = Self { x: 0.5, y: 0.5 };
    pub const BOTTOM: Self = Self { x: 0.5, y: 1.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Default for UnitPoint {
    fn default() -> Self {
        Self::BOTTOM
    }
}

/// A content boundary of the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Top,
    Bottom,
}

/// Symbolic scroll target, resolved against a layout by
/// [`ScrollAnchor`](crate::anchor::ScrollAnchor).
#[derive(Debug, Clone, PartialEq)]
pub enum ChatPosition<Id> {
    /// Wherever a chat naturally rests: the newest message.
    Automatic,
    Top,
    Bottom { animated: bool },
    Message { id: Id, anchor: UnitPoint },
    Index(usize),
    Offset { delta: f64, from: Box<ChatPosition<Id>> },
}

impl<Id> ChatPosition<Id> {
    pub fn bottom() -> Self {
        Self::Bottom { animated: true }
    }

    pub fn message(id: Id) -> Self {
        Self::Message {
            id,
            anchor: UnitPoint::BOTTOM,
        }
    }

    pub fn message_at(id: Id, anchor: UnitPoint) -> Self {
        Self::Message { id, anchor }
    }

    /// `delta` points below (positive) or above (negative) `base`.
    pub fn offset(delta: f64, base: ChatPosition<Id>) -> Self {
        Self::Offset {
            delta,
            from: Box::new(base),
        }
    }

    pub fn is_animated(&self) -> bool {
        match self {
            Self::Bottom { animated } => *animated,
            Self::Offset { from, .. } => from.is_animated(),
            _ => true,
        }
    }
}
