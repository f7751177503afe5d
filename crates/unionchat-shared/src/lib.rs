//! # unionchat-shared
//!
//! Data model shared by the UnionChat crates: identifiers, roles, delivery
//! states, media, reactions and the [`ChatMessage`] capability trait.

pub mod constants;
pub mod error;
pub mod flags;
pub mod media;
pub mod message;
pub mod reaction;
pub mod types;

pub use error::LoadError;
pub use flags::{ChatInputCapability, ChatInteractionModes};
pub use media::MessageMedia;
pub use message::{ChatMessage, Message};
pub use reaction::{Reaction, ReactionAction};
pub use types::{ChatRole, DeliveryState, MessageId, MessageKind, UserId};
