//! The in-memory transcript.
//!
//! [`MessageStore`] owns the ordered message sequence and the typing set. It
//! is meant to live on a single mutator timeline (the UI thread): every
//! mutation goes through one of the methods below and observers hear about it
//! synchronously once the change is in place.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::{debug, warn};

use unionchat_shared::reaction;
use unionchat_shared::{ChatMessage, DeliveryState, Message, MessageId, ReactionAction, UserId};

use crate::error::{describe, Result, StoreError};
use crate::events::{Observers, StoreEvent, SubscriptionId};

/// Ordered message sequence plus the set of users currently typing.
pub struct MessageStore<M: ChatMessage> {
    messages: Vec<M>,
    index: HashMap<M::Id, usize>,
    typing: HashSet<UserId>,
    observers: Observers<M::Id>,
}

impl<M: ChatMessage> MessageStore<M> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            index: HashMap::new(),
            typing: HashSet::new(),
            observers: Observers::new(),
        }
    }

    /// Create a store holding `initial` in the given order.
    ///
    /// Fails with [`StoreError::DuplicateId`] if two messages share an id.
    pub fn with_messages(initial: Vec<M>) -> Result<Self> {
        let mut store = Self::new();
        for message in initial {
            if store.index.contains_key(message.id()) {
                return Err(StoreError::DuplicateId(describe(message.id())));
            }
            store.index.insert(message.id().clone(), store.messages.len());
            store.messages.push(message);
        }
        Ok(store)
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    /// Register a change observer.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent<M::Id>) + 'static,
    {
        self.observers.add(Box::new(observer))
    }

    /// Remove an observer. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.remove(id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Insert at the end. The store is left untouched if the id is taken.
    pub fn append(&mut self, message: M) -> Result<usize> {
        if self.index.contains_key(message.id()) {
            warn!(id = ?message.id(), "append rejected: duplicate id");
            return Err(StoreError::DuplicateId(describe(message.id())));
        }
        let pos = self.messages.len();
        debug!(id = ?message.id(), index = pos, "append");
        self.index.insert(message.id().clone(), pos);
        self.messages.push(message);
        self.observers
            .notify(&StoreEvent::Inserted { range: pos..pos + 1 });
        Ok(pos)
    }

    /// Insert at the end if the id is new, otherwise replace in place.
    /// Returns the message's index.
    pub fn upsert(&mut self, message: M) -> usize {
        match self.index.get(message.id()).copied() {
            Some(pos) => {
                debug!(id = ?message.id(), index = pos, "upsert: replace");
                let id = message.id().clone();
                self.messages[pos] = message;
                self.observers
                    .notify(&StoreEvent::Replaced { index: pos, id });
                pos
            }
            None => {
                let pos = self.messages.len();
                debug!(id = ?message.id(), index = pos, "upsert: insert");
                self.index.insert(message.id().clone(), pos);
                self.messages.push(message);
                self.observers
                    .notify(&StoreEvent::Inserted { range: pos..pos + 1 });
                pos
            }
        }
    }

    /// Bulk upsert at the head of the transcript.
    ///
    /// Messages whose id is already known are replaced where they stand; the
    /// rest are inserted as one block at the front, keeping their relative
    /// order. Within `batch`, a later copy of an id wins. Returns how many
    /// messages were newly inserted.
    pub fn prepend_batch(&mut self, batch: Vec<M>) -> usize {
        let mut fresh: Vec<M> = Vec::new();
        let mut fresh_pos: HashMap<M::Id, usize> = HashMap::new();
        let mut existing: Vec<M> = Vec::new();

        for message in batch {
            if self.index.contains_key(message.id()) {
                existing.push(message);
            } else if let Some(&slot) = fresh_pos.get(message.id()) {
                fresh[slot] = message;
            } else {
                fresh_pos.insert(message.id().clone(), fresh.len());
                fresh.push(message);
            }
        }

        let inserted = fresh.len();
        if inserted > 0 {
            self.messages.splice(0..0, fresh);
            self.reindex_from(0);
            debug!(count = inserted, "prepend batch");
            self.observers
                .notify(&StoreEvent::Inserted { range: 0..inserted });
        }

        for message in existing {
            self.upsert(message);
        }
        inserted
    }

    /// Move a message to a new delivery state.
    ///
    /// Returns `Ok(false)` when the message already is in `state`.
    pub fn update_state(&mut self, id: &M::Id, state: DeliveryState) -> Result<bool> {
        let pos = self.position(id)?;
        let current = self.messages[pos].state();
        if !current.can_transition_to(state) {
            warn!(id = ?id, from = %current, to = %state, "rejected delivery transition");
            return Err(StoreError::InvalidTransition {
                from: current,
                to: state,
            });
        }
        if current == state {
            return Ok(false);
        }
        self.messages[pos].set_state(state);
        debug!(id = ?id, from = %current, to = %state, "delivery state");
        self.observers.notify(&StoreEvent::StateChanged {
            index: pos,
            id: id.clone(),
            from: current,
            to: state,
        });
        Ok(true)
    }

    /// Add `user` under `emoji`. Adding an existing pair changes nothing.
    pub fn add_reaction(&mut self, id: &M::Id, emoji: &str, user: &UserId) -> Result<bool> {
        let pos = self.position(id)?;
        let changed = reaction::add_reaction(self.messages[pos].reactions_mut(), emoji, user);
        if changed {
            debug!(id = ?id, emoji, user = %user, "reaction added");
            self.observers.notify(&StoreEvent::ReactionsChanged {
                index: pos,
                id: id.clone(),
            });
        }
        Ok(changed)
    }

    /// Remove `user` from `emoji`. Removing an absent pair changes nothing.
    pub fn remove_reaction(&mut self, id: &M::Id, emoji: &str, user: &UserId) -> Result<bool> {
        let pos = self.position(id)?;
        let changed = reaction::remove_reaction(self.messages[pos].reactions_mut(), emoji, user);
        if changed {
            debug!(id = ?id, emoji, user = %user, "reaction removed");
            self.observers.notify(&StoreEvent::ReactionsChanged {
                index: pos,
                id: id.clone(),
            });
        }
        Ok(changed)
    }

    /// Apply a reaction edit reported by the input surface.
    pub fn apply_reaction(
        &mut self,
        id: &M::Id,
        emoji: &str,
        user: &UserId,
        action: ReactionAction,
    ) -> Result<bool> {
        match action {
            ReactionAction::Adding => self.add_reaction(id, emoji, user),
            ReactionAction::Removing => self.remove_reaction(id, emoji, user),
        }
    }

    /// Delete a message. Replies pointing at it keep their (now dangling)
    /// reference.
    pub fn remove(&mut self, id: &M::Id) -> Result<M> {
        let pos = self.position(id)?;
        let message = self.messages.remove(pos);
        self.index.remove(id);
        self.reindex_from(pos);
        debug!(id = ?id, index = pos, "remove");
        self.observers.notify(&StoreEvent::Removed {
            index: pos,
            id: id.clone(),
        });
        Ok(message)
    }

    /// Mark `user` as typing or not. Returns whether the set changed.
    pub fn set_typing(&mut self, user: &UserId, is_typing: bool) -> bool {
        let changed = if is_typing {
            self.typing.insert(user.clone())
        } else {
            self.typing.remove(user)
        };
        if changed {
            debug!(user = %user, is_typing, "typing");
            self.observers.notify(&StoreEvent::TypingChanged {
                user: user.clone(),
                is_typing,
            });
        }
        changed
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn get(&self, id: &M::Id) -> Option<&M> {
        self.index.get(id).map(|&pos| &self.messages[pos])
    }

    pub fn index_of(&self, id: &M::Id) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &M::Id) -> bool {
        self.index.contains_key(id)
    }

    pub fn messages(&self) -> &[M] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, M> {
        self.messages.iter()
    }

    pub fn first(&self) -> Option<&M> {
        self.messages.first()
    }

    pub fn last(&self) -> Option<&M> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Users currently typing, in no particular order.
    pub fn typing_users(&self) -> impl Iterator<Item = &UserId> {
        self.typing.iter()
    }

    pub fn is_typing(&self, user: &UserId) -> bool {
        self.typing.contains(user)
    }

    pub fn anyone_typing(&self) -> bool {
        !self.typing.is_empty()
    }

    /// The message `id` replies to, if it is still in the store.
    pub fn reply_target(&self, id: &M::Id) -> Option<&M> {
        let target = self.get(id)?.reply_to()?;
        self.get(target)
    }

    fn position(&self, id: &M::Id) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| StoreError::NotFound(describe(id)))
    }

    fn reindex_from(&mut self, start: usize) {
        for (pos, message) in self.messages.iter().enumerate().skip(start) {
            self.index.insert(message.id().clone(), pos);
        }
    }
}

impl MessageStore<Message> {
    /// Replace the text of a message (the "edit" interaction).
    pub fn edit_text(&mut self, id: &MessageId, text: impl Into<String>) -> Result<()> {
        let pos = self.position(id)?;
        self.messages[pos].text = Some(text.into());
        debug!(id = %id, index = pos, "edit");
        self.observers.notify(&StoreEvent::Edited {
            index: pos,
            id: *id,
        });
        Ok(())
    }
}

impl<M: ChatMessage> Default for MessageStore<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: ChatMessage + fmt::Debug> fmt::Debug for MessageStore<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageStore")
            .field("messages", &self.messages)
            .field("typing", &self.typing)
            .field("observers", &self.observers.len())
            .finish()
    }
}
