use serde::{Deserialize, Serialize};

/// Media attached to a message. URLs are opaque strings resolved by the
/// embedding application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageMedia {
    Image {
        url: String,
    },
    Video {
        url: String,
        thumbnail_url: Option<String>,
        /// Seconds.
        duration: Option<f64>,
    },
    Audio {
        url: String,
        duration: Option<f64>,
        waveform: Option<Vec<f32>>,
    },
    File {
        url: String,
        name: String,
        size: Option<u64>,
        mime_type: Option<String>,
    },
    Location {
        latitude: f64,
        longitude: f64,
        name: Option<String>,
    },
    Poll {
        question: String,
        options: Vec<String>,
        votes: Option<Vec<u32>>,
    },
}

impl MessageMedia {
    /// Short label used for reply previews and notifications.
    pub fn summary(&self) -> String {
        match self {
            Self::Image { .. } => "Photo".to_string(),
            Self::Video { .. } => "Video".to_string(),
            Self::Audio { .. } => "Voice message".to_string(),
            Self::File { name, .. } => name.clone(),
            Self::Location { name, .. } => name.clone().unwrap_or_else(|| "Location".to_string()),
            Self::Poll { question, .. } => question.clone(),
        }
    }

    /// Total votes cast on a poll, `None` for other media or unknown tallies.
    pub fn total_votes(&self) -> Option<u32> {
        match self {
            Self::Poll {
                votes: Some(votes), ..
            } => Some(votes.iter().sum()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_json_shape() {
        let media = MessageMedia::Location {
            latitude: 48.85,
            longitude: 2.35,
            name: Some("Paris".into()),
        };
        let value = serde_json::to_value(&media).unwrap();
        assert_eq!(value["type"], "location");
        assert_eq!(media.summary(), "Paris");
    }

    #[test]
    fn poll_votes() {
        let poll = MessageMedia::Poll {
            question: "Lunch?".into(),
            options: vec!["Pizza".into(), "Sushi".into()],
            votes: Some(vec![3, 4]),
        };
        assert_eq!(poll.total_votes(), Some(7));
        assert_eq!(MessageMedia::Image { url: "a.png".into() }.total_votes(), None);
    }
}
