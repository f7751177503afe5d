use serde::{Deserialize, Serialize};

use crate::media::MessageMedia;

bitflags::bitflags! {
    /// Message actions the transcript offers to the user.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ChatInteractionModes: u8 {
        const REPLY   = 1 << 0;
        const EDIT    = 1 << 1;
        const DELETE  = 1 << 2;
        const REACT   = 1 << 3;
        const FORWARD = 1 << 4;
    }
}

impl Default for ChatInteractionModes {
    fn default() -> Self {
        Self::all()
    }
}

impl ChatInteractionModes {
    /// Parse a comma separated list such as `"reply,react"`.
    /// Unknown names are returned as the error value.
    pub fn parse_list(list: &str) -> Result<Self, String> {
        parse_names(list, |name| match name {
            "reply" => Some(Self::REPLY),
            "edit" => Some(Self::EDIT),
            "delete" => Some(Self::DELETE),
            "react" => Some(Self::REACT),
            "forward" => Some(Self::FORWARD),
            "all" => Some(Self::all()),
            _ => None,
        })
    }
}

bitflags::bitflags! {
    /// Attachment sources the composer exposes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ChatInputCapability: u8 {
        const CAMERA        = 1 << 0;
        const PHOTO_LIBRARY = 1 << 1;
        const RECORD_AUDIO  = 1 << 2;
        const FILES         = 1 << 3;
        const LOCATION      = 1 << 4;
        const POLLS         = 1 << 5;
    }
}

impl Default for ChatInputCapability {
    fn default() -> Self {
        Self::all()
    }
}

impl ChatInputCapability {
    pub fn parse_list(list: &str) -> Result<Self, String> {
        parse_names(list, |name| match name {
            "camera" => Some(Self::CAMERA),
            "photo_library" | "photos" => Some(Self::PHOTO_LIBRARY),
            "record_audio" | "audio" => Some(Self::RECORD_AUDIO),
            "files" => Some(Self::FILES),
            "location" => Some(Self::LOCATION),
            "polls" => Some(Self::POLLS),
            "all" => Some(Self::all()),
            _ => None,
        })
    }
}

impl ChatInputCapability {
    /// Sources that can produce `media`. Sending it needs at least one of them.
    pub fn for_media(media: &MessageMedia) -> Self {
        match media {
            MessageMedia::Image { .. } | MessageMedia::Video { .. } => {
                Self::CAMERA | Self::PHOTO_LIBRARY
            }
            MessageMedia::Audio { .. } => Self::RECORD_AUDIO,
            MessageMedia::File { .. } => Self::FILES,
            MessageMedia::Location { .. } => Self::LOCATION,
            MessageMedia::Poll { .. } => Self::POLLS,
        }
    }
}

fn parse_names<F, T>(list: &str, lookup: F) -> Result<T, String>
where
    F: Fn(&str) -> Option<T>,
    T: bitflags::Flags,
{
    let mut flags = T::empty();
    for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let flag = lookup(&name.to_ascii_lowercase()).ok_or_else(|| name.to_string())?;
        flags.insert(flag);
    }
    Ok(flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_interaction_list() {
        let modes = ChatInteractionModes::parse_list("reply, React").unwrap();
        assert_eq!(modes, ChatInteractionModes::REPLY | ChatInteractionModes::REACT);
        assert!(!modes.contains(ChatInteractionModes::DELETE));
    }

    #[test]
    fn media_maps_to_its_sources() {
        let video = MessageMedia::Video {
            url: "v.mp4".into(),
            thumbnail_url: None,
            duration: None,
        };
        let sources = ChatInputCapability::for_media(&video);
        assert!(sources.contains(ChatInputCapability::CAMERA));
        assert!(!sources.intersects(ChatInputCapability::FILES | ChatInputCapability::POLLS));
    }

    #[test]
    fn parse_rejects_unknown() {
        assert_eq!(ChatInputCapability::parse_list("camera,teleport"), Err("teleport".into()));
        assert_eq!(ChatInputCapability::parse_list("").unwrap(), ChatInputCapability::empty());
    }
}
