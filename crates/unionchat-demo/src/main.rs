//! # unionchat-demo
//!
//! Drives a transcript the way a chat screen would:
//! - the store lives on the main task and is only mutated there
//! - a simulated network task reports delivery progress, replies, typing and
//!   reactions over a channel
//! - history pages are fetched on background tasks and marshalled back
//!   before they touch the store
//! - a synthetic layout stands in for the renderer so scroll anchoring,
//!   autoscroll and edge-triggered pagination run for real

mod history;

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use kurbo::Size;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use unionchat_shared::{
    ChatMessage, ChatRole, DeliveryState, Message, MessageId, MessageMedia, ReactionAction, UserId,
};
use unionchat_store::{MessageStore, StoreEvent};
use unionchat_view::{
    build_nodes, fetch, ChatConfig, ChatNode, ChatPosition, ContentLayout, Edge, LoadCompletion,
    LoadTicket, PageOutcome, PaginationError, ScrollAnchor,
};

use crate::history::ScriptedHistory;

/// Viewport of the pretend screen.
const VIEWPORT: Size = Size::new(390.0, 640.0);

/// Everything that reaches the main task from elsewhere.
enum UiEvent {
    Delivery(MessageId, DeliveryState),
    Incoming(Message),
    Typing(UserId, bool),
    Reaction(MessageId, String, UserId, ReactionAction),
    Page(LoadCompletion<Message>),
    NetworkDone,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,unionchat=debug")),
        )
        .init();

    info!("Starting UnionChat demo v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ChatConfig::from_env();
    info!(?config, "Loaded configuration");

    let styles = config.style_table();
    let mut tracker = config.autoscroll_tracker();
    let mut pager = config.pagination_controller();

    // -----------------------------------------------------------------------
    // 3. Seed the transcript
    // -----------------------------------------------------------------------
    let now = Utc::now();
    let greeting = Message::text(ChatRole::user("alice"), "Hey! Are we still on for tonight?")
        .with_timestamp(now - ChronoDuration::minutes(5));
    let joined = Message::event("Alice joined the conversation")
        .with_timestamp(now - ChronoDuration::minutes(6));
    let mine = Message::text(ChatRole::Me, "Yes! 7pm at the usual place")
        .replying_to(greeting.id)
        .with_timestamp(now - ChronoDuration::minutes(4));
    let mine_id = mine.id;

    let mut store = MessageStore::with_messages(vec![joined, greeting, mine])?;
    store.subscribe(|event: &StoreEvent<MessageId>| debug!(?event, "store changed"));

    // -----------------------------------------------------------------------
    // 4. Background collaborators
    // -----------------------------------------------------------------------
    let (tx, mut rx) = mpsc::channel::<UiEvent>(64);
    let loader = Arc::new(ScriptedHistory::new(
        2,
        now - ChronoDuration::minutes(10),
        Duration::from_millis(50),
    ));
    tokio::spawn(simulate_network(tx.clone(), mine_id));

    // The reader starts at the top, which asks for history straight away.
    let mut offset = 0.0;
    let mut network_done = false;

    loop {
        let layout = measure(&store, &config, offset);
        tracker.observe(&layout);
        if let Some(ticket) = pager.on_layout(&layout, &store) {
            spawn_fetch(ticket, &loader, &tx);
        }

        if network_done && !pager.is_loading() {
            if pager.is_exhausted(Edge::Top) {
                break;
            }
            // Reader scrolls back up for more history.
            offset = 0.0;
            continue;
        }

        let Some(event) = rx.recv().await else {
            break;
        };

        match event {
            UiEvent::Delivery(id, state) => {
                if let Err(e) = store.update_state(&id, state) {
                    warn!(error = %e, "delivery update ignored");
                }
            }
            UiEvent::Incoming(message) => {
                let id = message.id;
                store.upsert(message);
                match tracker.on_new_message(&config.autoscroll, id) {
                    Some(request) => {
                        let layout = measure(&store, &config, offset);
                        offset = ScrollAnchor::resolve(&request.position, &layout)?.offset;
                        info!(offset, animated = request.animated, "followed new message");
                    }
                    None => info!(unread = tracker.unread_count(), "new message below the fold"),
                }
            }
            UiEvent::Typing(user, is_typing) => {
                store.set_typing(&user, is_typing);
            }
            UiEvent::Reaction(id, emoji, user, action) => {
                store.apply_reaction(&id, &emoji, &user, action)?;
            }
            UiEvent::Page(completion) => {
                let height_before = measure(&store, &config, offset).content_size().height;
                match pager.apply(completion, &mut store) {
                    Ok(PageOutcome::Applied { inserted }) => {
                        // Content grew above the viewport; shift so nothing visible moves.
                        let height_after = measure(&store, &config, offset).content_size().height;
                        offset += height_after - height_before;
                        info!(inserted, offset, "history page prepended");
                    }
                    Ok(PageOutcome::Exhausted) => {
                        info!("reached the beginning of the conversation");
                        let request = tracker.jump_to_bottom::<MessageId>();
                        let layout = measure(&store, &config, offset);
                        offset = ScrollAnchor::resolve(&request.position, &layout)?.offset;
                    }
                    Ok(PageOutcome::Discarded) => {}
                    Err(PaginationError::LoadFailure(e)) => {
                        warn!(error = %e, "history load failed, retrying");
                        if let Some(ticket) = pager.trigger(Edge::Top, &store) {
                            spawn_fetch(ticket, &loader, &tx);
                        }
                    }
                }
            }
            UiEvent::NetworkDone => network_done = true,
        }
    }

    // View goes away: anything still in flight must not land.
    pager.cancel();

    // The reader sends a reply from the composer, then tries to share a location.
    match config.compose(Some("On my way!".into()), None) {
        Ok(message) => {
            store.append(message)?;
        }
        Err(e) => warn!(error = %e, "nothing sent"),
    }
    let pin = MessageMedia::Location {
        latitude: 48.8566,
        longitude: 2.3522,
        name: Some("Usual place".into()),
    };
    match config.compose(None, Some(pin)) {
        Ok(message) => {
            store.append(message)?;
        }
        Err(e) => warn!(error = %e, "nothing sent"),
    }

    // -----------------------------------------------------------------------
    // 5. Report
    // -----------------------------------------------------------------------
    let nodes = build_nodes(&store, &config, &styles, pager.is_loading());
    for node in &nodes {
        match node {
            ChatNode::DayDivider { date } => info!(%date, "── day ──"),
            ChatNode::Divider { label } => info!(?label, "── divider ──"),
            ChatNode::Event { text, .. } => info!(%text, "event"),
            ChatNode::Typing { users } => info!(?users, "typing"),
            ChatNode::Loading => info!("loading…"),
            ChatNode::Composer {
                placeholder,
                capabilities,
            } => info!(%placeholder, ?capabilities, "composer"),
            ChatNode::Message(m) => info!(
                id = %m.id.short(),
                role = ?m.role,
                state = %m.state,
                alignment = ?m.style.alignment,
                avatar = m.avatar.as_ref().map(|a| a.initials.as_str()).unwrap_or("-"),
                reactions = m.reactions.len(),
                text = m.text.as_deref().unwrap_or(""),
                "message"
            ),
        }
    }

    let layout = measure(&store, &config, offset);
    let mine_target = ScrollAnchor::resolve(&ChatPosition::message(mine_id), &layout)?;
    info!(offset = mine_target.offset, "scroll target for my message");
    if let Some(reply) = store.get(&mine_id).and_then(|m| m.reply_to()) {
        info!(resolved = store.contains(reply), "reply reference");
    }

    let snapshot = store.snapshot().to_json()?;
    info!(
        messages = store.len(),
        bytes = snapshot.len(),
        "transcript snapshot ready for persistence"
    );

    Ok(())
}

fn spawn_fetch(ticket: LoadTicket<MessageId>, loader: &Arc<ScriptedHistory>, tx: &mpsc::Sender<UiEvent>) {
    let loader = Arc::clone(loader);
    let tx = tx.clone();
    tokio::spawn(async move {
        let completion = fetch::<Message, _>(ticket, loader.as_ref()).await;
        // The receiver only goes away on shutdown.
        let _ = tx.send(UiEvent::Page(completion)).await;
    });
}

/// Stand-in for the renderer: row heights from text length.
fn measure(store: &MessageStore<Message>, config: &ChatConfig, offset: f64) -> ContentLayout<MessageId> {
    let rows: Vec<(MessageId, f64)> = store
        .iter()
        .map(|m| {
            let chars = m.preview_text().map(|t| t.chars().count()).unwrap_or(0) as f64;
            (m.id, 20.0 + (chars / 32.0).ceil().max(1.0) * 22.0)
        })
        .collect();
    let unclamped = ContentLayout::stacked(rows.clone(), config.message_spacing, VIEWPORT, 0.0);
    let offset = unclamped.clamp_offset(offset);
    ContentLayout::stacked(rows, config.message_spacing, VIEWPORT, offset)
}

async fn simulate_network(tx: mpsc::Sender<UiEvent>, mine: MessageId) {
    let alice = UserId::from("alice");
    let script = vec![
        UiEvent::Delivery(mine, DeliveryState::Sent),
        UiEvent::Delivery(mine, DeliveryState::Delivered),
        UiEvent::Typing(alice.clone(), true),
        UiEvent::Delivery(mine, DeliveryState::Read),
        UiEvent::Typing(alice.clone(), false),
        UiEvent::Incoming(Message::text(ChatRole::user("alice"), "Perfect, see you there 🎉")),
        UiEvent::Reaction(mine, "👍".to_string(), alice.clone(), ReactionAction::Adding),
        UiEvent::Reaction(mine, "❤️".to_string(), alice.clone(), ReactionAction::Adding),
        UiEvent::Reaction(mine, "👍".to_string(), alice.clone(), ReactionAction::Removing),
        // A late receipt that would move backwards: rejected by the store.
        UiEvent::Delivery(mine, DeliveryState::Sent),
        UiEvent::NetworkDone,
    ];

    for event in script {
        tokio::time::sleep(Duration::from_millis(30)).await;
        if tx.send(event).await.is_err() {
            return;
        }
    }
}
