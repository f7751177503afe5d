use std::hash::Hash;

use serde::{Deserialize, Serialize};
use tracing::trace;

use unionchat_shared::constants::DEFAULT_AUTOSCROLL_THRESHOLD;

use crate::layout::ContentLayout;
use crate::position::{ChatPosition, Edge, UnitPoint};

/// What the transcript does with the viewport when a message arrives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ChatAutoscroll {
    /// Always bring the new message into view.
    Always { anchor: UnitPoint, animated: bool },
    /// Follow new messages only while the reader sits at the bottom.
    WhenAtBottom { anchor: UnitPoint, animated: bool },
    Never,
}

impl ChatAutoscroll {
    pub fn always() -> Self {
        Self::Always {
            anchor: UnitPoint::BOTTOM,
            animated: true,
        }
    }

    pub fn when_at_bottom() -> Self {
        Self::WhenAtBottom {
            anchor: UnitPoint::BOTTOM,
            animated: true,
        }
    }

    /// Parse `always`, `when_at_bottom` or `never`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Some(Self::always()),
            "when_at_bottom" | "whenatbottom" => Some(Self::when_at_bottom()),
            "never" => Some(Self::Never),
            _ => None,
        }
    }
}

impl Default for ChatAutoscroll {
    fn default() -> Self {
        Self::when_at_bottom()
    }
}

/// A scroll the renderer should perform.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollRequest<Id> {
    pub position: ChatPosition<Id>,
    pub animated: bool,
}

/// Follows the viewport across layout passes and decides whether a new
/// message should pull it down.
///
/// Call [`observe`](Self::observe) after every layout pass and
/// [`on_new_message`](Self::on_new_message) when a message is appended; the
/// decision uses the last layout seen *before* the message arrived.
#[derive(Debug, Clone)]
pub struct AutoscrollTracker {
    threshold: f64,
    at_bottom: bool,
    last_offset: f64,
    last_max_offset: f64,
    unread: usize,
}

impl AutoscrollTracker {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            at_bottom: true,
            last_offset: 0.0,
            last_max_offset: 0.0,
            unread: 0,
        }
    }

    pub fn observe<Id: Clone + Eq + Hash>(&mut self, layout: &ContentLayout<Id>) {
        self.at_bottom = layout.near_edge(Edge::Bottom, self.threshold);
        self.last_offset = layout.scroll_offset();
        self.last_max_offset = layout.max_offset();
        if self.at_bottom {
            self.unread = 0;
        }
        trace!(
            offset = self.last_offset,
            max_offset = self.last_max_offset,
            at_bottom = self.at_bottom,
            "autoscroll observed layout"
        );
    }

    pub fn is_at_bottom(&self) -> bool {
        self.at_bottom
    }

    /// Messages that arrived while the viewport was away from the bottom.
    pub fn unread_count(&self) -> usize {
        self.unread
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Decide whether `id`, just appended, should be scrolled to.
    pub fn on_new_message<Id>(&mut self, policy: &ChatAutoscroll, id: Id) -> Option<ScrollRequest<Id>> {
        let follow = match policy {
            ChatAutoscroll::Always { anchor, animated } => Some((*anchor, *animated)),
            ChatAutoscroll::WhenAtBottom { anchor, animated } if self.at_bottom => {
                Some((*anchor, *animated))
            }
            _ => None,
        };

        match follow {
            Some((anchor, animated)) => Some(ScrollRequest {
                position: ChatPosition::message_at(id, anchor),
                animated,
            }),
            None => {
                if !self.at_bottom {
                    self.unread += 1;
                }
                None
            }
        }
    }

    /// The "jump to latest" affordance: clears the unread count and
    /// requests the bottom.
    pub fn jump_to_bottom<Id>(&mut self) -> ScrollRequest<Id> {
        self.unread = 0;
        ScrollRequest {
            position: ChatPosition::bottom(),
            animated: true,
        }
    }
}

impl Default for AutoscrollTracker {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSCROLL_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Size;

    use super::*;

    fn layout(offset: f64) -> ContentLayout<u32> {
        ContentLayout::stacked((0..10).map(|i| (i, 50.0)), 0.0, Size::new(320.0, 200.0), offset)
    }

    #[test]
    fn follows_when_at_bottom() {
        let mut tracker = AutoscrollTracker::default();
        tracker.observe(&layout(290.0));
        let request = tracker.on_new_message(&ChatAutoscroll::when_at_bottom(), 10u32);
        assert_eq!(request.unwrap().position, ChatPosition::message(10));
    }

    #[test]
    fn stays_put_when_scrolled_up() {
        let mut tracker = AutoscrollTracker::default();
        tracker.observe(&layout(100.0));
        assert!(tracker
            .on_new_message(&ChatAutoscroll::when_at_bottom(), 10u32)
            .is_none());
        assert!(tracker
            .on_new_message(&ChatAutoscroll::when_at_bottom(), 11u32)
            .is_none());
        assert_eq!(tracker.unread_count(), 2);

        tracker.observe(&layout(300.0));
        assert_eq!(tracker.unread_count(), 0);
    }

    #[test]
    fn always_ignores_position() {
        let mut tracker = AutoscrollTracker::default();
        tracker.observe(&layout(0.0));
        assert!(tracker.on_new_message(&ChatAutoscroll::always(), 10u32).is_some());
        assert!(tracker.on_new_message(&ChatAutoscroll::Never, 11u32).is_none());
        assert_eq!(tracker.unread_count(), 1);
        let jump: ScrollRequest<u32> = tracker.jump_to_bottom();
        assert_eq!(jump.position, ChatPosition::bottom());
        assert_eq!(tracker.unread_count(), 0);
    }

    #[test]
    fn parse_policy() {
        assert_eq!(ChatAutoscroll::parse("Always"), Some(ChatAutoscroll::always()));
        assert_eq!(ChatAutoscroll::parse("never"), Some(ChatAutoscroll::Never));
        assert_eq!(ChatAutoscroll::parse("sometimes"), None);
    }
}
