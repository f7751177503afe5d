//! The message capability the store works against, and the stock message
//! type that implements it.
//!
//! Applications that already have their own message struct implement
//! [`ChatMessage`] for it; everyone else can use [`Message`].

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::media::MessageMedia;
use crate::reaction::Reaction;
use crate::types::{ChatRole, DeliveryState, MessageId, MessageKind};

/// Accessors a transcript needs from a message.
pub trait ChatMessage {
    /// Identity, unique within a store and stable for the message's lifetime.
    type Id: Clone + Eq + Hash + Debug;

    fn id(&self) -> &Self::Id;

    fn role(&self) -> &ChatRole;

    fn timestamp(&self) -> DateTime<Utc>;

    fn kind(&self) -> MessageKind {
        MessageKind::Text
    }

    /// Current delivery state. Must reflect what [`set_state`](Self::set_state)
    /// last stored.
    fn state(&self) -> DeliveryState;

    fn set_state(&mut self, state: DeliveryState);

    fn reactions(&self) -> &[Reaction];

    fn reactions_mut(&mut self) -> &mut Vec<Reaction>;

    /// Weak reference to another message. It may not resolve.
    fn reply_to(&self) -> Option<&Self::Id> {
        None
    }

    /// Plain-text rendering used for previews.
    fn preview_text(&self) -> Option<String> {
        None
    }
}

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub role: ChatRole,
    pub timestamp: DateTime<Utc>,
    pub kind: MessageKind,
    pub state: DeliveryState,
    pub text: Option<String>,
    pub media: Option<MessageMedia>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    pub reply_to: Option<MessageId>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Message {
    /// A text message stamped with the current time.
    pub fn text(role: ChatRole, text: impl Into<String>) -> Self {
        let state = if role.is_me() {
            DeliveryState::Sending
        } else {
            DeliveryState::Delivered
        };
        Self {
            id: MessageId::new(),
            role,
            timestamp: Utc::now(),
            kind: MessageKind::Text,
            state,
            text: Some(text.into()),
            media: None,
            reactions: Vec::new(),
            reply_to: None,
            metadata: BTreeMap::new(),
        }
    }

    /// A system event line ("Alice joined the chat").
    pub fn event(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Event,
            state: DeliveryState::Delivered,
            ..Self::text(ChatRole::System, text)
        }
    }

    /// A message carrying media and an optional caption.
    pub fn media(role: ChatRole, media: MessageMedia, caption: Option<String>) -> Self {
        let mut message = Self::text(role, String::new());
        message.text = caption;
        message.media = Some(media);
        message
    }

    /// What the composer sends: trimmed text, optional media, authored by
    /// [`ChatRole::Me`]. `None` when there is nothing to send.
    pub fn outgoing(text: Option<String>, media: Option<MessageMedia>) -> Option<Self> {
        let text = text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        match (text, media) {
            (None, None) => None,
            (Some(text), None) => Some(Self::text(ChatRole::Me, text)),
            (caption, Some(media)) => Some(Self::media(ChatRole::Me, media, caption)),
        }
    }

    pub fn with_id(mut self, id: MessageId) -> Self {
        self.id = id;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_state(mut self, state: DeliveryState) -> Self {
        self.state = state;
        self
    }

    pub fn replying_to(mut self, id: MessageId) -> Self {
        self.reply_to = Some(id);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl ChatMessage for Message {
    type Id = MessageId;

    fn id(&self) -> &MessageId {
        &self.id
    }

    fn role(&self) -> &ChatRole {
        &self.role
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn kind(&self) -> MessageKind {
        self.kind.clone()
    }

    fn state(&self) -> DeliveryState {
        self.state
    }

    fn set_state(&mut self, state: DeliveryState) {
        self.state = state;
    }

    fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    fn reactions_mut(&mut self) -> &mut Vec<Reaction> {
        &mut self.reactions
    }

    fn reply_to(&self) -> Option<&MessageId> {
        self.reply_to.as_ref()
    }

    fn preview_text(&self) -> Option<String> {
        match (&self.text, &self.media) {
            (Some(text), _) if !text.is_empty() => Some(text.clone()),
            (_, Some(media)) => Some(media.summary()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outgoing_from_composer() {
        assert!(Message::outgoing(Some("   ".into()), None).is_none());

        let text = Message::outgoing(Some(" hi ".into()), None).unwrap();
        assert_eq!(text.text.as_deref(), Some("hi"));
        assert_eq!(text.state, DeliveryState::Sending);

        let photo = MessageMedia::Image {
            url: "file:///p.jpg".into(),
        };
        let captioned = Message::outgoing(Some("look".into()), Some(photo.clone())).unwrap();
        assert!(captioned.role.is_me());
        assert_eq!(captioned.media, Some(photo));
        assert_eq!(captioned.preview_text().as_deref(), Some("look"));
    }

    #[test]
    fn outgoing_text_starts_sending() {
        let m = Message::text(ChatRole::Me, "hi");
        assert_eq!(m.state, DeliveryState::Sending);
        let other = Message::text(ChatRole::user("alice"), "hey");
        assert_eq!(other.state, DeliveryState::Delivered);
    }

    #[test]
    fn event_is_system_kind() {
        let m = Message::event("Alice joined");
        assert_eq!(m.role, ChatRole::System);
        assert_eq!(m.kind(), MessageKind::Event);
    }

    #[test]
    fn preview_falls_back_to_media() {
        let m = Message::media(
            ChatRole::Me,
            MessageMedia::File {
                url: "file:///tmp/report.pdf".into(),
                name: "report.pdf".into(),
                size: Some(1024),
                mime_type: Some("application/pdf".into()),
            },
            None,
        );
        assert_eq!(m.preview_text().as_deref(), Some("report.pdf"));
    }

    #[test]
    fn unknown_kind_survives_json() {
        let mut m = Message::text(ChatRole::Me, "x");
        m.kind = MessageKind::Unknown("sticker".into());
        let json = serde_json::to_string(&m).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind, MessageKind::Unknown("sticker".into()));
    }
}
