//! Emoji reactions attached to a message.
//!
//! A message holds at most one [`Reaction`] per emoji. The free functions in
//! this module keep that invariant when editing a reaction list in place.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// An emoji annotation and the set of users who added it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reaction {
    pub emoji: String,
    pub user_ids: BTreeSet<UserId>,
}

impl Reaction {
    pub fn new(emoji: impl Into<String>, user: UserId) -> Self {
        let mut user_ids = BTreeSet::new();
        user_ids.insert(user);
        Self {
            emoji: emoji.into(),
            user_ids,
        }
    }

    pub fn count(&self) -> usize {
        self.user_ids.len()
    }

    pub fn includes(&self, user: &UserId) -> bool {
        self.user_ids.contains(user)
    }

    /// Whether the local user is among the reactors.
    pub fn includes_me(&self, me: &UserId) -> bool {
        self.includes(me)
    }
}

/// Direction of a reaction edit, as reported by the input surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReactionAction {
    Adding,
    Removing,
}

/// Add `user` under `emoji`. Returns `false` when the pair was already present.
pub fn add_reaction(reactions: &mut Vec<Reaction>, emoji: &str, user: &UserId) -> bool {
    match reactions.iter_mut().find(|r| r.emoji == emoji) {
        Some(reaction) => reaction.user_ids.insert(user.clone()),
        None => {
            reactions.push(Reaction::new(emoji, user.clone()));
            true
        }
    }
}

/// Remove `user` from `emoji`, dropping the entry once nobody is left.
/// Returns `false` when there was nothing to remove.
pub fn remove_reaction(reactions: &mut Vec<Reaction>, emoji: &str, user: &UserId) -> bool {
    let Some(pos) = reactions.iter().position(|r| r.emoji == emoji) else {
        return false;
    };
    if !reactions[pos].user_ids.remove(user) {
        return false;
    }
    if reactions[pos].user_ids.is_empty() {
        reactions.remove(pos);
    }
    true
}
