//! # unionchat-store
//!
//! In-memory transcript state backing a chat view.
//!
//! The crate exposes a single-owner [`MessageStore`] that keeps messages in
//! display order, enforces id uniqueness and delivery-state monotonicity,
//! edits reactions and tracks who is typing. Every applied mutation is
//! reported to subscribed observers as a [`StoreEvent`]. Persistence is left
//! to the embedding application; [`TranscriptSnapshot`] is the hand-off.

pub mod events;
pub mod grouping;
pub mod snapshot;
pub mod store;

mod error;

pub use error::{Result, StoreError};
pub use events::{StoreEvent, SubscriptionId};
pub use grouping::DayGroup;
pub use snapshot::TranscriptSnapshot;
pub use store::MessageStore;
