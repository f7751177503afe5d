//! Style resolution.
//!
//! Appearance is looked up in an explicit [`StyleTable`] handed to the node
//! builder: alignment and colour per role, bubble shape per message kind.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use unionchat_shared::constants::DEFAULT_BUBBLE_RADIUS;
use unionchat_shared::{ChatMessage, ChatRole, MessageKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatStyle {
    #[default]
    Bubble,
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Leading,
    Center,
    Trailing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const ACCENT: Self = Self::rgb(0x0A, 0x84, 0xFF);
    pub const BUBBLE_GRAY: Self = Self::rgb(0xE9, 0xE9, 0xEB);
    pub const SECONDARY: Self = Self::rgb(0x8E, 0x8E, 0x93);
    pub const WHITE: Self = Self::rgb(0xFF, 0xFF, 0xFF);
    pub const BLACK: Self = Self::rgb(0x00, 0x00, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (the `#` is optional).
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        let a = if hex.len() == 8 { byte(6)? } else { 0xFF };
        Some(Self {
            r: byte(0)?,
            g: byte(2)?,
            b: byte(4)?,
            a,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TailPosition {
    BottomLeft,
    BottomRight,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BubbleShape {
    pub tail: TailPosition,
    pub corner_radius: f64,
}

impl BubbleShape {
    pub fn new(tail: TailPosition) -> Self {
        Self {
            tail,
            corner_radius: DEFAULT_BUBBLE_RADIUS,
        }
    }
}

/// Appearance of one message after table lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedStyle {
    pub alignment: Alignment,
    pub foreground: Color,
    /// Bubble fill; `None` in the plain style and for event lines.
    pub background: Option<Color>,
    pub shape: Option<BubbleShape>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RoleClass {
    Me,
    System,
    Other,
}

impl From<&ChatRole> for RoleClass {
    fn from(role: &ChatRole) -> Self {
        match role {
            ChatRole::Me => Self::Me,
            ChatRole::System => Self::System,
            ChatRole::User(_) => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum KindClass {
    Text,
    Event,
    Typing,
}

/// Lookup table from role and kind to appearance.
#[derive(Debug, Clone)]
pub struct StyleTable {
    style: ChatStyle,
    backgrounds: HashMap<RoleClass, Color>,
    foregrounds: HashMap<RoleClass, Color>,
    user_backgrounds: BTreeMap<String, Color>,
    shapes: HashMap<(KindClass, RoleClass), BubbleShape>,
}

impl StyleTable {
    pub fn new(style: ChatStyle) -> Self {
        let mut table = Self {
            style,
            backgrounds: HashMap::new(),
            foregrounds: HashMap::new(),
            user_backgrounds: BTreeMap::new(),
            shapes: HashMap::new(),
        };
        table.backgrounds.insert(RoleClass::Me, Color::ACCENT);
        table.backgrounds.insert(RoleClass::Other, Color::BUBBLE_GRAY);
        table.foregrounds.insert(RoleClass::Me, Color::WHITE);
        table.foregrounds.insert(RoleClass::Other, Color::BLACK);
        table.foregrounds.insert(RoleClass::System, Color::SECONDARY);

        for role in [RoleClass::Me, RoleClass::Other, RoleClass::System] {
            let tail = match role {
                RoleClass::Me => TailPosition::BottomRight,
                RoleClass::Other => TailPosition::BottomLeft,
                RoleClass::System => TailPosition::None,
            };
            table.shapes.insert((KindClass::Text, role), BubbleShape::new(tail));
            table
                .shapes
                .insert((KindClass::Typing, role), BubbleShape::new(TailPosition::None));
        }
        table
    }

    pub fn style(&self) -> ChatStyle {
        self.style
    }

    /// Bubble fill for every message of `role`.
    pub fn with_background(mut self, role: &ChatRole, color: Color) -> Self {
        match role {
            ChatRole::User(name) => {
                self.user_backgrounds.insert(name.clone(), color);
            }
            other => {
                self.backgrounds.insert(other.into(), color);
            }
        }
        self
    }

    pub fn with_foreground(mut self, role: &ChatRole, color: Color) -> Self {
        self.foregrounds.insert(role.into(), color);
        self
    }

    /// Bubble shape for text messages of `role`.
    pub fn with_text_shape(mut self, role: &ChatRole, shape: BubbleShape) -> Self {
        self.shapes.insert((KindClass::Text, role.into()), shape);
        self
    }

    pub fn alignment(&self, role: &ChatRole) -> Alignment {
        match role {
            ChatRole::Me => Alignment::Trailing,
            ChatRole::System => Alignment::Center,
            ChatRole::User(_) => Alignment::Leading,
        }
    }

    pub fn resolve<M: ChatMessage>(&self, message: &M) -> ResolvedStyle {
        let role = message.role();
        let class = RoleClass::from(role);
        let foreground = self
            .foregrounds
            .get(&class)
            .copied()
            .unwrap_or(Color::BLACK);

        let kind = match message.kind() {
            MessageKind::Text => Some(KindClass::Text),
            MessageKind::Event => Some(KindClass::Event),
            MessageKind::Typing => Some(KindClass::Typing),
            MessageKind::Unknown(_) => None,
        };

        if kind == Some(KindClass::Event) {
            return ResolvedStyle {
                alignment: Alignment::Center,
                foreground: self
                    .foregrounds
                    .get(&RoleClass::System)
                    .copied()
                    .unwrap_or(Color::SECONDARY),
                background: None,
                shape: None,
            };
        }

        let bubbled = self.style == ChatStyle::Bubble && kind.is_some();
        let background = if bubbled {
            match role {
                ChatRole::User(name) => self
                    .user_backgrounds
                    .get(name)
                    .or_else(|| self.backgrounds.get(&class))
                    .copied(),
                _ => self.backgrounds.get(&class).copied(),
            }
        } else {
            None
        };
        let shape = match kind {
            Some(kind) if bubbled => self.shapes.get(&(kind, class)).copied(),
            _ => None,
        };

        ResolvedStyle {
            alignment: self.alignment(role),
            foreground,
            background,
            shape,
        }
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::new(ChatStyle::Bubble)
    }
}

#[cfg(test)]
mod tests {
    use unionchat_shared::Message;

    use super::*;

    #[test]
    fn bubble_defaults_by_role() {
        let table = StyleTable::default();
        let mine = table.resolve(&Message::text(ChatRole::Me, "hi"));
        assert_eq!(mine.alignment, Alignment::Trailing);
        assert_eq!(mine.background, Some(Color::ACCENT));
        assert_eq!(mine.shape.unwrap().tail, TailPosition::BottomRight);

        let theirs = table.resolve(&Message::text(ChatRole::user("alice"), "hey"));
        assert_eq!(theirs.alignment, Alignment::Leading);
        assert_eq!(theirs.shape.unwrap().tail, TailPosition::BottomLeft);
    }

    #[test]
    fn plain_style_drops_bubbles() {
        let table = StyleTable::new(ChatStyle::Plain);
        let mine = table.resolve(&Message::text(ChatRole::Me, "hi"));
        assert_eq!(mine.background, None);
        assert_eq!(mine.shape, None);
        assert_eq!(mine.alignment, Alignment::Trailing);
    }

    #[test]
    fn events_are_centered_lines() {
        let style = StyleTable::default().resolve(&Message::event("Alice joined"));
        assert_eq!(style.alignment, Alignment::Center);
        assert_eq!(style.shape, None);
    }

    #[test]
    fn per_user_background_overrides_role() {
        let green = Color::rgb(0x30, 0xD1, 0x58);
        let table = StyleTable::default().with_background(&ChatRole::user("bob"), green);
        let bob = table.resolve(&Message::text(ChatRole::user("bob"), "yo"));
        let alice = table.resolve(&Message::text(ChatRole::user("alice"), "yo"));
        assert_eq!(bob.background, Some(green));
        assert_eq!(alice.background, Some(Color::BUBBLE_GRAY));
    }

    #[test]
    fn unknown_kind_renders_plain() {
        let mut m = Message::text(ChatRole::user("bob"), "?");
        m.kind = MessageKind::Unknown("sticker".into());
        let style = StyleTable::default().resolve(&m);
        assert_eq!(style.shape, None);
        assert_eq!(style.alignment, Alignment::Leading);
    }

    #[test]
    fn hex_colors() {
        assert_eq!(Color::from_hex("#0A84FF"), Some(Color::ACCENT));
        assert_eq!(Color::from_hex("00000080").unwrap().a, 0x80);
        assert_eq!(Color::from_hex("#xyz"), None);
    }
}
