//! Change notifications delivered to the rendering layer.
//!
//! Observers run synchronously on the mutator's timeline, after the mutation
//! they describe has been applied.

use std::ops::Range;

use unionchat_shared::{DeliveryState, UserId};

/// What changed in the transcript. Indices refer to positions after the change,
/// except [`StoreEvent::Removed`] which reports where the message used to be.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent<Id> {
    Inserted { range: Range<usize> },
    Replaced { index: usize, id: Id },
    StateChanged {
        index: usize,
        id: Id,
        from: DeliveryState,
        to: DeliveryState,
    },
    ReactionsChanged { index: usize, id: Id },
    Edited { index: usize, id: Id },
    Removed { index: usize, id: Id },
    TypingChanged { user: UserId, is_typing: bool },
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

type Callback<Id> = Box<dyn FnMut(&StoreEvent<Id>)>;

pub(crate) struct Observers<Id> {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Callback<Id>)>,
}

impl<Id> Observers<Id> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 0,
            callbacks: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, callback: Callback<Id>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, callback));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(sub, _)| *sub != id);
        self.callbacks.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub(crate) fn notify(&mut self, event: &StoreEvent<Id>) {
        for (_, callback) in self.callbacks.iter_mut() {
            callback(event);
        }
    }
}
