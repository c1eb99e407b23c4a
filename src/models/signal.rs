use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::domain::Participant;

/// Inbound signaling envelope, dispatched on the `type` tag.
///
/// Payload blobs (SDP offers/answers, ICE candidates) are carried as opaque
/// JSON; the relay forwards them without inspecting their contents. A missing
/// payload field deserializes to `null` and is forwarded as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientSignal {
    Offer {
        #[serde(default)]
        offer: Value,
    },
    Answer {
        #[serde(default)]
        answer: Value,
        /// Target-peer hint; the relay broadcasts it untouched and peers
        /// self-filter on it rather than receiving a unicast.
        #[serde(default)]
        to: Value,
    },
    IceCandidate {
        #[serde(default)]
        candidate: Value,
    },
    ToggleAudio {
        #[serde(default)]
        audio_enabled: bool,
    },
    ToggleVideo {
        #[serde(default)]
        video_enabled: bool,
    },
    Ping,
    /// Unrecognized message types are a forward-compatible no-op
    #[serde(other)]
    Unknown,
}

/// Outbound signaling envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerSignal {
    RoomInfo {
        room_id: String,
        participants: Vec<Participant>,
        your_id: String,
    },
    UserJoined {
        user: Participant,
        participant_count: usize,
    },
    UserLeft {
        user: Participant,
        participant_count: usize,
    },
    Offer {
        offer: Value,
        from: String,
        from_name: String,
    },
    Answer {
        answer: Value,
        from: String,
        from_name: String,
        to: Value,
    },
    IceCandidate {
        candidate: Value,
        from: String,
        from_name: String,
    },
    UserAudioToggled {
        user_id: String,
        audio_enabled: bool,
    },
    UserVideoToggled {
        user_id: String,
        video_enabled: bool,
    },
    Pong,
    Error {
        message: String,
    },
}
