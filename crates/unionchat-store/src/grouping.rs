//! Day grouping for transcript dividers.

use std::ops::Range;

use chrono::NaiveDate;

use unionchat_shared::ChatMessage;

use crate::store::MessageStore;

/// A run of consecutive messages sharing a calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub range: Range<usize>,
}

impl<M: ChatMessage> MessageStore<M> {
    /// Split the transcript into runs of same-day messages, in store order.
    ///
    /// Store order is not necessarily timestamp order, so a day can show up
    /// in more than one group.
    pub fn day_groups(&self) -> Vec<DayGroup> {
        let mut groups: Vec<DayGroup> = Vec::new();
        for (pos, message) in self.iter().enumerate() {
            let date = message.timestamp().date_naive();
            match groups.last_mut() {
                Some(group) if group.date == date => group.range.end = pos + 1,
                _ => groups.push(DayGroup {
                    date,
                    range: pos..pos + 1,
                }),
            }
        }
        groups
    }
}
