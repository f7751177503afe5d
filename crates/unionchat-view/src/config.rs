//! View configuration.
//!
//! Everything a chat view needs to know about presentation and behaviour is
//! carried in one explicit [`ChatConfig`] value. All settings have defaults;
//! [`ChatConfig::from_env`] overrides them from `UNIONCHAT_*` variables.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use unionchat_shared::constants::{
    DEFAULT_AUTOSCROLL_THRESHOLD, DEFAULT_EDGE_THRESHOLD, DEFAULT_INPUT_PLACEHOLDER,
    DEFAULT_MESSAGE_SPACING, DEFAULT_PAGE_SIZE,
};
use unionchat_shared::{ChatInputCapability, ChatInteractionModes, Message, MessageMedia, UserId};

use crate::autoscroll::{AutoscrollTracker, ChatAutoscroll};
use crate::error::ComposeError;
use crate::pagination::PaginationController;
use crate::style::{ChatStyle, StyleTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Automatic,
    Visible,
    Hidden,
}

impl Visibility {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "automatic" | "auto" => Some(Self::Automatic),
            "visible" | "true" | "1" => Some(Self::Visible),
            "hidden" | "false" | "0" => Some(Self::Hidden),
            _ => None,
        }
    }
}

/// Chat view configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// The local user; decides `includes_me` on reactions.
    /// Env: `UNIONCHAT_USER_ID`
    /// Default: `"me"`
    pub me: UserId,

    /// Env: `UNIONCHAT_STYLE` (`bubble` / `plain`)
    /// Default: `bubble`
    pub chat_style: ChatStyle,

    /// Env: `UNIONCHAT_AUTOSCROLL` (`always` / `when_at_bottom` / `never`)
    /// Default: `when_at_bottom`
    pub autoscroll: ChatAutoscroll,

    /// Distance from the bottom edge that still counts as "at bottom".
    /// Env: `UNIONCHAT_AUTOSCROLL_THRESHOLD`
    /// Default: `24`
    pub autoscroll_threshold: f64,

    /// Distance from the watched edge that triggers a history load.
    /// Env: `UNIONCHAT_EDGE_THRESHOLD`
    /// Default: `200`
    pub edge_threshold: f64,

    /// Env: `UNIONCHAT_PAGE_SIZE`
    /// Default: `50`
    pub page_size: usize,

    /// Env: `UNIONCHAT_INTERACTIONS` (comma separated, e.g. `reply,react`)
    /// Default: all
    pub interactions: ChatInteractionModes,

    /// Env: `UNIONCHAT_INPUT_CAPABILITIES` (comma separated)
    /// Default: all
    pub input_capabilities: ChatInputCapability,

    /// Env: `UNIONCHAT_INPUT_PLACEHOLDER`
    pub input_placeholder: String,

    /// Env: `UNIONCHAT_INPUT_VISIBILITY`
    pub input_visibility: Visibility,

    /// Env: `UNIONCHAT_AVATARS`
    pub avatar_visibility: Visibility,

    /// Vertical gap between messages.
    /// Env: `UNIONCHAT_MESSAGE_SPACING`
    /// Default: `8`
    pub message_spacing: f64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            me: UserId::from("me"),
            chat_style: ChatStyle::Bubble,
            autoscroll: ChatAutoscroll::default(),
            autoscroll_threshold: DEFAULT_AUTOSCROLL_THRESHOLD,
            edge_threshold: DEFAULT_EDGE_THRESHOLD,
            page_size: DEFAULT_PAGE_SIZE,
            interactions: ChatInteractionModes::all(),
            input_capabilities: ChatInputCapability::all(),
            input_placeholder: DEFAULT_INPUT_PLACEHOLDER.to_string(),
            input_visibility: Visibility::Automatic,
            avatar_visibility: Visibility::Automatic,
            message_spacing: DEFAULT_MESSAGE_SPACING,
        }
    }
}

impl ChatConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(id) = lookup("UNIONCHAT_USER_ID") {
            if !id.trim().is_empty() {
                config.me = UserId::new(id.trim());
            }
        }

        if let Some(val) = lookup("UNIONCHAT_STYLE") {
            match val.trim().to_ascii_lowercase().as_str() {
                "bubble" => config.chat_style = ChatStyle::Bubble,
                "plain" => config.chat_style = ChatStyle::Plain,
                _ => tracing::warn!(value = %val, "Invalid UNIONCHAT_STYLE, using default"),
            }
        }

        if let Some(val) = lookup("UNIONCHAT_AUTOSCROLL") {
            match ChatAutoscroll::parse(&val) {
                Some(policy) => config.autoscroll = policy,
                None => tracing::warn!(value = %val, "Invalid UNIONCHAT_AUTOSCROLL, using default"),
            }
        }

        parse_number(&lookup, "UNIONCHAT_AUTOSCROLL_THRESHOLD", &mut config.autoscroll_threshold, non_negative);
        parse_number(&lookup, "UNIONCHAT_EDGE_THRESHOLD", &mut config.edge_threshold, non_negative);
        parse_number(&lookup, "UNIONCHAT_PAGE_SIZE", &mut config.page_size, |n: &usize| *n > 0);
        parse_number(&lookup, "UNIONCHAT_MESSAGE_SPACING", &mut config.message_spacing, non_negative);

        if let Some(val) = lookup("UNIONCHAT_INTERACTIONS") {
            match ChatInteractionModes::parse_list(&val) {
                Ok(modes) => config.interactions = modes,
                Err(name) => tracing::warn!(
                    value = %val,
                    unknown = %name,
                    "Invalid UNIONCHAT_INTERACTIONS, using default"
                ),
            }
        }

        if let Some(val) = lookup("UNIONCHAT_INPUT_CAPABILITIES") {
            match ChatInputCapability::parse_list(&val) {
                Ok(caps) => config.input_capabilities = caps,
                Err(name) => tracing::warn!(
                    value = %val,
                    unknown = %name,
                    "Invalid UNIONCHAT_INPUT_CAPABILITIES, using default"
                ),
            }
        }

        if let Some(text) = lookup("UNIONCHAT_INPUT_PLACEHOLDER") {
            config.input_placeholder = text;
        }

        if let Some(val) = lookup("UNIONCHAT_INPUT_VISIBILITY") {
            match Visibility::parse(&val) {
                Some(v) => config.input_visibility = v,
                None => tracing::warn!(value = %val, "Invalid UNIONCHAT_INPUT_VISIBILITY, using default"),
            }
        }

        if let Some(val) = lookup("UNIONCHAT_AVATARS") {
            match Visibility::parse(&val) {
                Some(v) => config.avatar_visibility = v,
                None => tracing::warn!(value = %val, "Invalid UNIONCHAT_AVATARS, using default"),
            }
        }

        config
    }

    pub fn allows(&self, mode: ChatInteractionModes) -> bool {
        self.interactions.contains(mode)
    }

    /// Turn the composer's contents into an outgoing message for
    /// `MessageStore::append`. Attachments must come from an enabled input
    /// capability.
    pub fn compose(
        &self,
        text: Option<String>,
        media: Option<MessageMedia>,
    ) -> Result<Message, ComposeError> {
        if let Some(media) = &media {
            if !self.input_capabilities.intersects(ChatInputCapability::for_media(media)) {
                tracing::warn!(media = %media.summary(), "attachment rejected by input capabilities");
                return Err(ComposeError::Unsupported(media.summary()));
            }
        }
        Message::outgoing(text, media).ok_or(ComposeError::Empty)
    }

    /// Whether the composer row is shown.
    pub fn shows_input(&self) -> bool {
        self.input_visibility != Visibility::Hidden
    }

    pub fn style_table(&self) -> StyleTable {
        StyleTable::new(self.chat_style)
    }

    pub fn autoscroll_tracker(&self) -> AutoscrollTracker {
        AutoscrollTracker::new(self.autoscroll_threshold)
    }

    pub fn pagination_controller(&self) -> PaginationController {
        PaginationController::new(self.edge_threshold, self.page_size)
    }
}

/// Parse `key` into `slot` when it is a number `valid` accepts.
fn parse_number<F, T, V>(lookup: &F, key: &str, slot: &mut T, valid: V)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    V: Fn(&T) -> bool,
{
    if let Some(val) = lookup(key) {
        match val.trim().parse::<T>() {
            Ok(n) if valid(&n) => *slot = n,
            Ok(_) => tracing::warn!(key, value = %val, "Number out of range, using default"),
            Err(_) => tracing::warn!(key, value = %val, "Invalid number, using default"),
        }
    }
}

// Distances: finite and not negative.
fn non_negative(n: &f64) -> bool {
    n.is_finite() && *n >= 0.0
}
