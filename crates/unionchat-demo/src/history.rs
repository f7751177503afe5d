//! Scripted history source standing in for a backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::debug;

use unionchat_shared::{ChatRole, DeliveryState, LoadError, Message, MessageId};
use unionchat_view::{HistoryLoader, PageRequest};

/// Serves `pages` pages of older messages, then nothing. The first request
/// fails, so the caller sees a load failure it has to retry itself.
pub struct ScriptedHistory {
    pages: usize,
    calls: AtomicUsize,
    oldest: DateTime<Utc>,
    latency: Duration,
}

impl ScriptedHistory {
    pub fn new(pages: usize, oldest: DateTime<Utc>, latency: Duration) -> Self {
        Self {
            pages,
            calls: AtomicUsize::new(0),
            oldest,
            latency,
        }
    }
}

impl HistoryLoader<Message> for ScriptedHistory {
    fn load(&self, request: PageRequest<MessageId>) -> BoxFuture<'static, Result<Vec<Message>, LoadError>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let latency = self.latency;
        let served = call.saturating_sub(1);
        let remaining = self.pages.saturating_sub(served);
        // Each page sits one day further back.
        let day_start = self.oldest - ChronoDuration::days(served as i64 + 1);

        async move {
            tokio::time::sleep(latency).await;
            if call == 0 {
                return Err(LoadError::Network("connection reset".into()));
            }
            debug!(call, cursor = ?request.cursor, remaining, "serving history page");
            if remaining == 0 {
                return Ok(Vec::new());
            }
            let page = (0..request.limit)
                .map(|i| {
                    let role = if i % 2 == 0 {
                        ChatRole::user("alice")
                    } else {
                        ChatRole::Me
                    };
                    Message::text(role, format!("archived #{served}-{i}"))
                        .with_timestamp(day_start + ChronoDuration::minutes(i as i64))
                        .with_state(DeliveryState::Read)
                })
                .collect();
            Ok(page)
        }
        .boxed()
    }
}
