//! View-model nodes.
//!
//! A renderer draws a transcript as a flat, ordered list of [`ChatNode`]s.
//! [`build_nodes`] derives that list from a store and a configuration;
//! [`ChatBuilder`] composes one by hand.

use chrono::NaiveDate;

use unionchat_shared::{
    ChatInputCapability, ChatInteractionModes, ChatMessage, ChatRole, DeliveryState, MessageKind,
    UserId,
};
use unionchat_store::MessageStore;

use crate::config::{ChatConfig, Visibility};
use crate::style::{Color, ResolvedStyle, StyleTable};

#[derive(Debug, Clone, PartialEq)]
pub enum ChatNode<Id> {
    DayDivider { date: NaiveDate },
    Divider { label: Option<String> },
    Message(MessageNode<Id>),
    Event { id: Option<Id>, text: String },
    Typing { users: Vec<UserId> },
    Loading,
    /// The input row closing the transcript.
    Composer {
        placeholder: String,
        capabilities: ChatInputCapability,
    },
}

/// Preview of the message being replied to.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyPreview<Id> {
    Resolved {
        id: Id,
        author: ChatRole,
        text: Option<String>,
    },
    /// The target is not (or no longer) in the transcript.
    Missing { id: Id },
}

/// Initials badge shown next to another user's message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Avatar {
    pub initials: String,
    pub background: Color,
}

impl Avatar {
    /// Up to two initials from the words of `name`, `?` when it has none.
    pub fn initials(name: &str, background: Color) -> Self {
        let initials: String = name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect();
        Self {
            initials: if initials.is_empty() { "?".to_string() } else { initials },
            background,
        }
    }

    /// Avatar for `role`. Only named users get one.
    pub fn for_role(role: &ChatRole, background: Color) -> Option<Self> {
        match role {
            ChatRole::User(name) => Some(Self::initials(name, background)),
            ChatRole::Me | ChatRole::System => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionBadge {
    pub emoji: String,
    pub count: usize,
    pub includes_me: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageNode<Id> {
    pub id: Id,
    pub role: ChatRole,
    pub kind: MessageKind,
    pub state: DeliveryState,
    pub text: Option<String>,
    pub style: ResolvedStyle,
    pub avatar: Option<Avatar>,
    pub reply: Option<ReplyPreview<Id>>,
    pub reactions: Vec<ReactionBadge>,
    pub actions: ChatInteractionModes,
}

impl<Id: Clone> MessageNode<Id> {
    pub fn new<M>(message: &M, styles: &StyleTable, me: &UserId) -> Self
    where
        M: ChatMessage<Id = Id>,
    {
        Self {
            id: message.id().clone(),
            role: message.role().clone(),
            kind: message.kind(),
            state: message.state(),
            text: message.preview_text(),
            style: styles.resolve(message),
            avatar: None,
            reply: None,
            reactions: message
                .reactions()
                .iter()
                .map(|r| ReactionBadge {
                    emoji: r.emoji.clone(),
                    count: r.count(),
                    includes_me: r.includes_me(me),
                })
                .collect(),
            actions: ChatInteractionModes::all(),
        }
    }

    pub fn with_avatar(mut self, avatar: Option<Avatar>) -> Self {
        self.avatar = avatar;
        self
    }

    pub fn with_reply(mut self, reply: ReplyPreview<Id>) -> Self {
        self.reply = Some(reply);
        self
    }

    pub fn with_actions(mut self, actions: ChatInteractionModes) -> Self {
        self.actions = actions;
        self
    }
}

/// Hand composition of a node list.
#[derive(Debug, Clone)]
pub struct ChatBuilder<Id> {
    nodes: Vec<ChatNode<Id>>,
}

impl<Id> ChatBuilder<Id> {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn message(mut self, node: MessageNode<Id>) -> Self {
        self.nodes.push(ChatNode::Message(node));
        self
    }

    pub fn event(mut self, text: impl Into<String>) -> Self {
        self.nodes.push(ChatNode::Event {
            id: None,
            text: text.into(),
        });
        self
    }

    pub fn divider(mut self, label: Option<String>) -> Self {
        self.nodes.push(ChatNode::Divider { label });
        self
    }

    pub fn day(mut self, date: NaiveDate) -> Self {
        self.nodes.push(ChatNode::DayDivider { date });
        self
    }

    pub fn typing(mut self, users: Vec<UserId>) -> Self {
        if !users.is_empty() {
            self.nodes.push(ChatNode::Typing { users });
        }
        self
    }

    pub fn loading(mut self) -> Self {
        self.nodes.push(ChatNode::Loading);
        self
    }

    pub fn composer(mut self, placeholder: impl Into<String>, capabilities: ChatInputCapability) -> Self {
        self.nodes.push(ChatNode::Composer {
            placeholder: placeholder.into(),
            capabilities,
        });
        self
    }

    pub fn push(&mut self, node: ChatNode<Id>) {
        self.nodes.push(node);
    }

    pub fn build(self) -> Vec<ChatNode<Id>> {
        self.nodes
    }
}

impl<Id> Default for ChatBuilder<Id> {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive the node list for the current transcript.
///
/// Day dividers open every day group, a loading row sits on top while a
/// history page is in flight and a typing row follows the messages while
/// anyone is typing. The composer comes last unless the input is hidden.
pub fn build_nodes<M: ChatMessage>(
    store: &MessageStore<M>,
    config: &ChatConfig,
    styles: &StyleTable,
    loading: bool,
) -> Vec<ChatNode<M::Id>> {
    let mut builder = ChatBuilder::new();
    if loading {
        builder = builder.loading();
    }

    let messages = store.messages();
    for group in store.day_groups() {
        builder = builder.day(group.date);
        for pos in group.range.clone() {
            let message = &messages[pos];
            if message.kind() == MessageKind::Event {
                builder.push(ChatNode::Event {
                    id: Some(message.id().clone()),
                    text: message.preview_text().unwrap_or_default(),
                });
                continue;
            }

            let next = (pos + 1 < group.range.end).then(|| &messages[pos + 1]);
            let mut node = MessageNode::new(message, styles, &config.me)
                .with_actions(actions_for(message, config.interactions));
            if show_avatar(message, next, config.avatar_visibility) {
                let background = node.style.background.unwrap_or(Color::BUBBLE_GRAY);
                node = node.with_avatar(Avatar::for_role(message.role(), background));
            }
            if let Some(target) = message.reply_to() {
                node = node.with_reply(match store.get(target) {
                    Some(original) => ReplyPreview::Resolved {
                        id: target.clone(),
                        author: original.role().clone(),
                        text: original.preview_text(),
                    },
                    None => ReplyPreview::Missing { id: target.clone() },
                });
            }
            builder = builder.message(node);
        }
    }

    let mut typing: Vec<UserId> = store.typing_users().cloned().collect();
    typing.sort();
    builder = builder.typing(typing);
    if config.shows_input() {
        builder = builder.composer(config.input_placeholder.clone(), config.input_capabilities);
    }
    builder.build()
}

// Avatars belong to other people's messages. In automatic mode only the last
// message of a same-author run shows one.
fn show_avatar<M: ChatMessage>(message: &M, next: Option<&M>, visibility: Visibility) -> bool {
    if !matches!(message.role(), ChatRole::User(_)) {
        return false;
    }
    match visibility {
        Visibility::Hidden => false,
        Visibility::Visible => true,
        Visibility::Automatic => match next {
            Some(next) => next.role() != message.role() || next.kind() == MessageKind::Event,
            None => true,
        },
    }
}

fn actions_for<M: ChatMessage>(message: &M, allowed: ChatInteractionModes) -> ChatInteractionModes {
    let mut actions = allowed;
    if !message.role().is_me() {
        actions.remove(ChatInteractionModes::EDIT | ChatInteractionModes::DELETE);
    }
    if matches!(message.kind(), MessageKind::Typing | MessageKind::Unknown(_))
        || message.state() == DeliveryState::Composing
    {
        actions = ChatInteractionModes::empty();
    }
    actions
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use unionchat_shared::{Message, MessageId};

    use super::*;

    fn at(role: ChatRole, text: &str, day: u32, minute: u32) -> Message {
        Message::text(role, text)
            .with_timestamp(Utc.with_ymd_and_hms(2024, 3, day, 10, minute, 0).unwrap())
    }

    fn message_nodes(nodes: &[ChatNode<MessageId>]) -> Vec<&MessageNode<MessageId>> {
        nodes
            .iter()
            .filter_map(|n| match n {
                ChatNode::Message(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn dividers_events_and_typing() {
        let mut store = MessageStore::with_messages(vec![
            at(ChatRole::Me, "hi", 1, 0),
            Message::event("Alice joined")
                .with_timestamp(Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap()),
            at(ChatRole::user("alice"), "hey", 2, 1),
        ])
        .unwrap();
        store.set_typing(&UserId::from("alice"), true);

        let config = ChatConfig::default();
        let nodes = build_nodes(&store, &config, &config.style_table(), true);

        assert_eq!(nodes[0], ChatNode::Loading);
        assert!(matches!(nodes[1], ChatNode::DayDivider { .. }));
        assert!(matches!(nodes[2], ChatNode::Message(_)));
        assert!(matches!(nodes[3], ChatNode::DayDivider { .. }));
        assert!(matches!(&nodes[4], ChatNode::Event { text, .. } if text == "Alice joined"));
        assert!(matches!(nodes[5], ChatNode::Message(_)));
        assert_eq!(
            nodes[6],
            ChatNode::Typing {
                users: vec![UserId::from("alice")]
            }
        );
        assert_eq!(
            nodes[7],
            ChatNode::Composer {
                placeholder: "Message".into(),
                capabilities: ChatInputCapability::all(),
            }
        );
        assert_eq!(nodes.len(), 8);
    }

    #[test]
    fn avatar_on_last_of_run() {
        let store = MessageStore::with_messages(vec![
            at(ChatRole::user("bob"), "one", 1, 0),
            at(ChatRole::user("bob"), "two", 1, 1),
            at(ChatRole::Me, "three", 1, 2),
        ])
        .unwrap();
        let config = ChatConfig::default();
        let nodes = build_nodes(&store, &config, &config.style_table(), false);
        let avatars: Vec<Option<String>> = message_nodes(&nodes)
            .iter()
            .map(|m| m.avatar.as_ref().map(|a| a.initials.clone()))
            .collect();
        assert_eq!(avatars, vec![None, Some("B".into()), None]);
    }

    #[test]
    fn avatar_initials() {
        assert_eq!(Avatar::initials("ada lovelace byron", Color::ACCENT).initials, "AL");
        assert_eq!(Avatar::initials("  ", Color::ACCENT).initials, "?");
        assert_eq!(Avatar::for_role(&ChatRole::Me, Color::ACCENT), None);
    }

    #[test]
    fn hidden_input_drops_composer() {
        let store = MessageStore::with_messages(vec![at(ChatRole::Me, "hi", 1, 0)]).unwrap();
        let config = ChatConfig {
            input_visibility: Visibility::Hidden,
            ..ChatConfig::default()
        };
        let nodes = build_nodes(&store, &config, &config.style_table(), false);
        assert!(!nodes.iter().any(|n| matches!(n, ChatNode::Composer { .. })));

        let shown = ChatConfig {
            input_placeholder: "Say something".into(),
            ..ChatConfig::default()
        };
        let nodes = build_nodes(&store, &shown, &shown.style_table(), false);
        assert!(matches!(
            nodes.last(),
            Some(ChatNode::Composer { placeholder, .. }) if placeholder == "Say something"
        ));
    }

    #[test]
    fn reply_previews_resolve_or_dangle() {
        let original = at(ChatRole::user("bob"), "question", 1, 0);
        let reply = at(ChatRole::Me, "answer", 1, 1).replying_to(original.id);
        let orphan = at(ChatRole::Me, "ps", 1, 2).replying_to(MessageId::new());
        let store = MessageStore::with_messages(vec![original.clone(), reply, orphan]).unwrap();

        let config = ChatConfig::default();
        let nodes = build_nodes(&store, &config, &config.style_table(), false);
        let messages = message_nodes(&nodes);
        assert_eq!(
            messages[1].reply,
            Some(ReplyPreview::Resolved {
                id: original.id,
                author: ChatRole::user("bob"),
                text: Some("question".into()),
            })
        );
        assert!(matches!(messages[2].reply, Some(ReplyPreview::Missing { .. })));
    }

    #[test]
    fn actions_and_reactions() {
        let mut store = MessageStore::with_messages(vec![
            at(ChatRole::user("bob"), "theirs", 1, 0),
            at(ChatRole::Me, "mine", 1, 1),
        ])
        .unwrap();
        let theirs = store.messages()[0].id;
        store.add_reaction(&theirs, "👍", &UserId::from("me")).unwrap();
        store.add_reaction(&theirs, "👍", &UserId::from("bob")).unwrap();

        let config = ChatConfig::default();
        let nodes = build_nodes(&store, &config, &config.style_table(), false);
        let messages = message_nodes(&nodes);

        assert!(!messages[0].actions.contains(ChatInteractionModes::EDIT));
        assert!(messages[0].actions.contains(ChatInteractionModes::REPLY));
        assert!(messages[1].actions.contains(ChatInteractionModes::EDIT));
        assert_eq!(
            messages[0].reactions,
            vec![ReactionBadge {
                emoji: "👍".into(),
                count: 2,
                includes_me: true
            }]
        );
    }

    #[test]
    fn builder_composes_by_hand() {
        let styles = StyleTable::default();
        let me = UserId::from("me");
        let hello = Message::text(ChatRole::Me, "hello");
        let nodes = ChatBuilder::new()
            .divider(Some("Today".into()))
            .message(MessageNode::new(&hello, &styles, &me))
            .event("Bob left")
            .typing(Vec::new())
            .build();
        assert_eq!(nodes.len(), 3);
        assert!(matches!(&nodes[1], ChatNode::Message(m) if m.id == hello.id));
    }
}
