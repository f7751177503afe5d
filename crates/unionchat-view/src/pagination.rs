//! Single-flight "load more" for transcript edges.
//!
//! The controller hands out a [`LoadTicket`] when an edge is reached and it
//! is idle. The ticket travels with the background fetch and comes back with
//! the page; [`PaginationController::complete`] applies it to the store on
//! the mutator timeline. Every ticket carries the controller's generation so
//! a completion that outlives its view (see [`PaginationController::cancel`])
//! is dropped instead of being applied.

use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use unionchat_shared::constants::{DEFAULT_EDGE_THRESHOLD, DEFAULT_PAGE_SIZE};
use unionchat_shared::{ChatMessage, LoadError};
use unionchat_store::MessageStore;

use crate::error::PaginationError;
use crate::layout::ContentLayout;
use crate::position::Edge;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationState {
    Idle,
    Loading,
}

/// What the history source is asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest<Id> {
    pub edge: Edge,
    /// Oldest known message for `Top`, newest for `Bottom`; `None` when the
    /// transcript is empty.
    pub cursor: Option<Id>,
    pub limit: usize,
}

/// Proof that a load was started, consumed by `complete`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket<Id> {
    generation: u64,
    request: PageRequest<Id>,
}

impl<Id> LoadTicket<Id> {
    pub fn request(&self) -> &PageRequest<Id> {
        &self.request
    }

    pub fn edge(&self) -> Edge {
        self.request.edge
    }
}

/// Result of applying a completed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page went into the store; `inserted` counts new messages.
    Applied { inserted: usize },
    /// The source returned nothing; the edge will not trigger again until
    /// [`PaginationController::reset`].
    Exhausted,
    /// The ticket was stale and the page was dropped.
    Discarded,
}

/// A source of older (or newer) messages, typically backed by the network.
pub trait HistoryLoader<M: ChatMessage>: Send + Sync {
    fn load(&self, request: PageRequest<M::Id>) -> BoxFuture<'static, Result<Vec<M>, LoadError>>;
}

/// A finished fetch on its way back to the mutator timeline.
#[derive(Debug)]
pub struct LoadCompletion<M: ChatMessage> {
    pub ticket: LoadTicket<M::Id>,
    pub result: Result<Vec<M>, LoadError>,
}

/// Run the load for `ticket`. Safe to call from a background task: it does
/// not touch the store.
pub async fn fetch<M, L>(ticket: LoadTicket<M::Id>, loader: &L) -> LoadCompletion<M>
where
    M: ChatMessage,
    L: HistoryLoader<M> + ?Sized,
{
    let result = loader.load(ticket.request().clone()).await;
    LoadCompletion { ticket, result }
}

/// Debounces edge triggers into at most one in-flight load.
#[derive(Debug, Clone)]
pub struct PaginationController {
    state: PaginationState,
    generation: u64,
    watched_edge: Edge,
    edge_threshold: f64,
    page_size: usize,
    exhausted_top: bool,
    exhausted_bottom: bool,
}

impl PaginationController {
    pub fn new(edge_threshold: f64, page_size: usize) -> Self {
        Self {
            state: PaginationState::Idle,
            generation: 0,
            watched_edge: Edge::Top,
            edge_threshold,
            page_size,
            exhausted_top: false,
            exhausted_bottom: false,
        }
    }

    /// Which edge [`on_layout`](Self::on_layout) watches. Defaults to `Top`.
    pub fn watching(mut self, edge: Edge) -> Self {
        self.watched_edge = edge;
        self
    }

    pub fn state(&self) -> PaginationState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == PaginationState::Loading
    }

    pub fn is_exhausted(&self, edge: Edge) -> bool {
        match edge {
            Edge::Top => self.exhausted_top,
            Edge::Bottom => self.exhausted_bottom,
        }
    }

    /// An edge was reached. Returns a ticket if a load should start;
    /// triggers while loading, or on an exhausted edge, are dropped.
    pub fn trigger<M: ChatMessage>(
        &mut self,
        edge: Edge,
        store: &MessageStore<M>,
    ) -> Option<LoadTicket<M::Id>> {
        if self.is_loading() {
            debug!(?edge, "edge trigger dropped: load in flight");
            return None;
        }
        if self.is_exhausted(edge) {
            debug!(?edge, "edge trigger dropped: edge exhausted");
            return None;
        }

        let cursor = match edge {
            Edge::Top => store.first(),
            Edge::Bottom => store.last(),
        }
        .map(|m| m.id().clone());

        self.generation += 1;
        self.state = PaginationState::Loading;
        info!(?edge, generation = self.generation, "history load started");

        Some(LoadTicket {
            generation: self.generation,
            request: PageRequest {
                edge,
                cursor,
                limit: self.page_size,
            },
        })
    }

    /// Trigger the watched edge if the viewport is within the threshold of it.
    pub fn on_layout<M: ChatMessage>(
        &mut self,
        layout: &ContentLayout<M::Id>,
        store: &MessageStore<M>,
    ) -> Option<LoadTicket<M::Id>> {
        if layout.near_edge(self.watched_edge, self.edge_threshold) {
            self.trigger(self.watched_edge, store)
        } else {
            None
        }
    }

    /// Apply a finished load. The controller is idle afterwards whatever the
    /// result, unless the ticket was stale, in which case nothing changes.
    pub fn complete<M: ChatMessage>(
        &mut self,
        ticket: LoadTicket<M::Id>,
        result: Result<Vec<M>, LoadError>,
        store: &mut MessageStore<M>,
    ) -> Result<PageOutcome, PaginationError> {
        if ticket.generation != self.generation || !self.is_loading() {
            warn!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale history page"
            );
            return Ok(PageOutcome::Discarded);
        }
        self.state = PaginationState::Idle;

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                warn!(edge = ?ticket.edge(), error = %e, "history load failed");
                return Err(PaginationError::LoadFailure(e));
            }
        };

        if page.is_empty() {
            info!(edge = ?ticket.edge(), "history exhausted");
            match ticket.edge() {
                Edge::Top => self.exhausted_top = true,
                Edge::Bottom => self.exhausted_bottom = true,
            }
            return Ok(PageOutcome::Exhausted);
        }

        let inserted = match ticket.edge() {
            Edge::Top => store.prepend_batch(page),
            Edge::Bottom => {
                let before = store.len();
                for message in page {
                    store.upsert(message);
                }
                store.len() - before
            }
        };
        info!(edge = ?ticket.edge(), inserted, "history page applied");
        Ok(PageOutcome::Applied { inserted })
    }

    /// Convenience for [`complete`](Self::complete) with a [`LoadCompletion`].
    pub fn apply<M: ChatMessage>(
        &mut self,
        completion: LoadCompletion<M>,
        store: &mut MessageStore<M>,
    ) -> Result<PageOutcome, PaginationError> {
        self.complete(completion.ticket, completion.result, store)
    }

    /// The owning view went away: any in-flight load becomes stale.
    pub fn cancel(&mut self) {
        if self.is_loading() {
            debug!(generation = self.generation, "cancelling in-flight load");
        }
        self.generation += 1;
        self.state = PaginationState::Idle;
    }

    /// Cancel and forget exhausted edges (e.g. after switching conversations).
    pub fn reset(&mut self) {
        self.cancel();
        self.exhausted_top = false;
        self.exhausted_bottom = false;
    }
}

impl Default for PaginationController {
    fn default() -> Self {
        Self::new(DEFAULT_EDGE_THRESHOLD, DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;
    use kurbo::Size;
    use unionchat_shared::{ChatRole, Message, MessageId};

    use super::*;

    fn store_with(texts: &[&str]) -> MessageStore<Message> {
        MessageStore::with_messages(
            texts
                .iter()
                .map(|t| Message::text(ChatRole::user("bob"), *t))
                .collect(),
        )
        .unwrap()
    }

    fn texts(store: &MessageStore<Message>) -> Vec<String> {
        store.iter().filter_map(|m| m.text.clone()).collect()
    }

    #[test]
    fn second_trigger_while_loading_is_dropped() {
        let store = store_with(&["c"]);
        let mut pager = PaginationController::default();
        let ticket = pager.trigger(Edge::Top, &store).unwrap();
        assert_eq!(ticket.request().cursor, Some(store.messages()[0].id));
        assert!(pager.trigger(Edge::Top, &store).is_none());
        assert!(pager.trigger(Edge::Bottom, &store).is_none());
        assert!(pager.is_loading());
    }

    #[test]
    fn success_prepends_and_returns_to_idle_once() {
        let mut store = store_with(&["c"]);
        let mut pager = PaginationController::default();
        let ticket = pager.trigger(Edge::Top, &store).unwrap();

        let page = vec![
            Message::text(ChatRole::user("bob"), "a"),
            Message::text(ChatRole::user("bob"), "b"),
        ];
        let outcome = pager.complete(ticket.clone(), Ok(page), &mut store).unwrap();
        assert_eq!(outcome, PageOutcome::Applied { inserted: 2 });
        assert_eq!(texts(&store), vec!["a", "b", "c"]);
        assert_eq!(pager.state(), PaginationState::Idle);

        // The same ticket cannot complete twice.
        let again = pager.complete(ticket, Ok(Vec::new()), &mut store).unwrap();
        assert_eq!(again, PageOutcome::Discarded);
        assert!(!pager.is_exhausted(Edge::Top));
    }

    #[test]
    fn failure_surfaces_and_returns_to_idle() {
        let mut store = store_with(&["c"]);
        let mut pager = PaginationController::default();
        let ticket = pager.trigger(Edge::Top, &store).unwrap();

        let err = pager
            .complete(ticket, Err(LoadError::Network("timeout".into())), &mut store)
            .unwrap_err();
        assert!(matches!(err, PaginationError::LoadFailure(LoadError::Network(_))));
        assert_eq!(pager.state(), PaginationState::Idle);
        assert_eq!(store.len(), 1);
        assert!(pager.trigger(Edge::Top, &store).is_some());
    }

    #[test]
    fn cancelled_load_is_discarded() {
        let mut store = store_with(&["c"]);
        let mut pager = PaginationController::default();
        let stale = pager.trigger(Edge::Top, &store).unwrap();
        pager.cancel();

        let fresh = pager.trigger(Edge::Top, &store).unwrap();
        let page = vec![Message::text(ChatRole::user("bob"), "old")];
        assert_eq!(
            pager.complete(stale, Ok(page), &mut store).unwrap(),
            PageOutcome::Discarded
        );
        assert_eq!(store.len(), 1);
        assert!(pager.is_loading());

        pager.complete(fresh, Ok(Vec::new()), &mut store).unwrap();
        assert!(!pager.is_loading());
    }

    #[test]
    fn empty_page_exhausts_edge_until_reset() {
        let mut store = store_with(&["c"]);
        let mut pager = PaginationController::default();
        let ticket = pager.trigger(Edge::Top, &store).unwrap();
        assert_eq!(
            pager.complete(ticket, Ok(Vec::new()), &mut store).unwrap(),
            PageOutcome::Exhausted
        );
        assert!(pager.trigger(Edge::Top, &store).is_none());
        pager.reset();
        assert!(pager.trigger(Edge::Top, &store).is_some());
    }

    #[test]
    fn bottom_edge_appends() {
        let mut store = store_with(&["a"]);
        let mut pager = PaginationController::default();
        let ticket = pager.trigger(Edge::Bottom, &store).unwrap();
        let page = vec![Message::text(ChatRole::user("bob"), "b")];
        assert_eq!(
            pager.complete(ticket, Ok(page), &mut store).unwrap(),
            PageOutcome::Applied { inserted: 1 }
        );
        assert_eq!(texts(&store), vec!["a", "b"]);
    }

    #[test]
    fn layout_near_top_triggers() {
        let store = store_with(&["a", "b"]);
        let ids: Vec<MessageId> = store.iter().map(|m| m.id).collect();
        let mut pager = PaginationController::new(50.0, 20);

        let far = ContentLayout::stacked(ids.iter().map(|id| (*id, 400.0)), 0.0, Size::new(320.0, 300.0), 300.0);
        assert!(pager.on_layout(&far, &store).is_none());

        let near = ContentLayout::stacked(ids.iter().map(|id| (*id, 400.0)), 0.0, Size::new(320.0, 300.0), 20.0);
        let ticket = pager.on_layout(&near, &store).unwrap();
        assert_eq!(ticket.request().limit, 20);
        assert_eq!(ticket.edge(), Edge::Top);
    }

    struct FixedLoader {
        page: Vec<Message>,
    }

    impl HistoryLoader<Message> for FixedLoader {
        fn load(
            &self,
            request: PageRequest<MessageId>,
        ) -> BoxFuture<'static, Result<Vec<Message>, LoadError>> {
            let page: Vec<Message> = self.page.iter().take(request.limit).cloned().collect();
            async move { Ok(page) }.boxed()
        }
    }

    #[tokio::test]
    async fn fetch_on_background_task_then_apply() {
        let mut store = store_with(&["now"]);
        let mut pager = PaginationController::new(DEFAULT_EDGE_THRESHOLD, 1);
        let ticket = pager.trigger(Edge::Top, &store).unwrap();

        let loader = FixedLoader {
            page: vec![
                Message::text(ChatRole::user("bob"), "older"),
                Message::text(ChatRole::user("bob"), "oldest"),
            ],
        };
        let completion = tokio::spawn(async move { fetch::<Message, _>(ticket, &loader).await })
            .await
            .unwrap();

        let outcome = pager.apply(completion, &mut store).unwrap();
        assert_eq!(outcome, PageOutcome::Applied { inserted: 1 });
        assert_eq!(texts(&store), vec!["older", "now"]);
    }
}
