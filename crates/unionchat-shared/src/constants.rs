/// Snapshot format version written by `TranscriptSnapshot`
pub const SNAPSHOT_VERSION: u32 = 1;

/// Distance from the bottom edge (points) still treated as "at bottom"
pub const DEFAULT_AUTOSCROLL_THRESHOLD: f64 = 24.0;

/// Distance from a content edge (points) that triggers a history load
pub const DEFAULT_EDGE_THRESHOLD: f64 = 200.0;

/// Vertical gap between consecutive messages (points)
pub const DEFAULT_MESSAGE_SPACING: f64 = 8.0;

/// Corner radius of a message bubble (points)
pub const DEFAULT_BUBBLE_RADIUS: f64 = 18.0;

/// Default composer placeholder
pub const DEFAULT_INPUT_PLACEHOLDER: &str = "Message";

/// Number of messages requested per history page
pub const DEFAULT_PAGE_SIZE: usize = 50;
