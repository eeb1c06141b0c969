use crate::gate::Lane;
use thiserror::Error;

pub mod mqtt;

/// A decoded feed event: one distance reading for one lane.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedReading {
    pub lane: Lane,
    pub distance_cm: f64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeedParseError {
    #[error("unknown topic: {0}")]
    UnknownTopic(String),
    #[error("payload is not valid utf-8")]
    NotUtf8,
    #[error("payload is not a number: {0:?}")]
    NotNumeric(String),
}

/// Maps feed channel names to lanes. The core never interprets topic
/// framing beyond this lookup.
#[derive(Debug, Clone)]
pub struct TopicMap {
    entry_topic: String,
    exit_topic: String,
}

impl TopicMap {
    pub fn new(entry_topic: impl Into<String>, exit_topic: impl Into<String>) -> Self {
        Self {
            entry_topic: entry_topic.into(),
            exit_topic: exit_topic.into(),
        }
    }

    pub fn lane_for(&self, topic: &str) -> Option<Lane> {
        if topic == self.entry_topic {
            Some(Lane::Entry)
        } else if topic == self.exit_topic {
            Some(Lane::Exit)
        } else {
            None
        }
    }

    pub fn topics(&self) -> [&str; 2] {
        [&self.entry_topic, &self.exit_topic]
    }
}

/// Decode a raw feed message into a lane reading. Pure; malformed input is
/// the caller's to log and drop.
pub fn parse_reading(
    topics: &TopicMap,
    topic: &str,
    payload: &[u8],
) -> Result<FeedReading, FeedParseError> {
    let lane = topics
        .lane_for(topic)
        .ok_or_else(|| FeedParseError::UnknownTopic(topic.to_string()))?;

    let text = std::str::from_utf8(payload).map_err(|_| FeedParseError::NotUtf8)?;
    let distance_cm: f64 = text
        .trim()
        .parse()
        .map_err(|_| FeedParseError::NotNumeric(text.to_string()))?;

    Ok(FeedReading { lane, distance_cm })
}
