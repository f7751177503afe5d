use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Message identity = random UUID, stable for the message's lifetime
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// User identity = application-defined handle (display name, account id, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The conversational party a message is attributed to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    Me,
    System,
    User(String),
}

impl ChatRole {
    pub fn user(name: impl Into<String>) -> Self {
        Self::User(name.into())
    }

    pub fn is_me(&self) -> bool {
        matches!(self, Self::Me)
    }
}

/// What a message represents in the transcript.
///
/// Kinds travel as lowercase strings. A tag this version does not know about
/// is kept as [`MessageKind::Unknown`] and written back out unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageKind {
    Text,
    Event,
    Typing,
    Unknown(String),
}

impl MessageKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Event => "event",
            Self::Typing => "typing",
            Self::Unknown(tag) => tag,
        }
    }
}

impl From<String> for MessageKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "text" => Self::Text,
            "event" => Self::Event,
            "typing" => Self::Typing,
            _ => Self::Unknown(s),
        }
    }
}

impl From<MessageKind> for String {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::Unknown(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

/// Lifecycle stage of an outbound message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum DeliveryState {
    Composing = 0,
    Sending = 1,
    Sent = 2,
    Delivered = 3,
    Read = 4,
    Failed = 0xFF,
}

impl DeliveryState {
    /// Position along the happy path, `None` for [`DeliveryState::Failed`].
    pub fn rank(self) -> Option<u8> {
        match self {
            Self::Failed => None,
            other => Some(other as u8),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Whether moving from `self` to `next` keeps the lifecycle monotonic.
    ///
    /// Forward moves may skip stages (a read receipt implies delivery) and
    /// staying put is allowed. `Failed` is reachable from every other state
    /// and nothing leaves it.
    pub fn can_transition_to(self, next: DeliveryState) -> bool {
        match (self.rank(), next.rank()) {
            (None, None) => true,
            (None, Some(_)) => false,
            (Some(_), None) => true,
            (Some(current), Some(target)) => target >= current,
        }
    }
}

impl std::fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Composing => "composing",
            Self::Sending => "sending",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Read => "read",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}
