use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use unionchat_shared::constants::SNAPSHOT_VERSION;
use unionchat_shared::{ChatMessage, UserId};

use crate::error::{Result, StoreError};
use crate::store::MessageStore;

/// Serializable copy of a transcript, handed to whatever persists it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSnapshot<M> {
    pub version: u32,
    /// ISO 8601 timestamp of when the snapshot was taken
    pub created_at: String,
    pub messages: Vec<M>,
    #[serde(default)]
    pub typing: Vec<UserId>,
}

impl<M: Serialize> TranscriptSnapshot<M> {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl<M: DeserializeOwned> TranscriptSnapshot<M> {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<M: ChatMessage + Clone> MessageStore<M> {
    /// Copy the current messages and typing set.
    pub fn snapshot(&self) -> TranscriptSnapshot<M> {
        let mut typing: Vec<UserId> = self.typing_users().cloned().collect();
        typing.sort();
        TranscriptSnapshot {
            version: SNAPSHOT_VERSION,
            created_at: Utc::now().to_rfc3339(),
            messages: self.messages().to_vec(),
            typing,
        }
    }
}

impl<M: ChatMessage> MessageStore<M> {
    /// Rebuild a store from a snapshot. Observers are not carried over.
    pub fn from_snapshot(snapshot: TranscriptSnapshot<M>) -> Result<Self> {
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(StoreError::UnsupportedVersion(snapshot.version));
        }
        let mut store = Self::with_messages(snapshot.messages)?;
        for user in &snapshot.typing {
            store.set_typing(user, true);
        }
        tracing::debug!(messages = store.len(), "restored transcript snapshot");
        Ok(store)
    }
}
