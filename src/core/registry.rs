use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use crate::models::{Participant, ServerSignal};

/// Outbound half of a session's channel; owned exclusively by the registry
/// once the session is admitted and revoked on leave.
pub type OutboundSender = UnboundedSender<String>;

/// Unique handle for one admitted session
pub type SessionId = Uuid;

struct PeerSlot {
    participant: Participant,
    sender: OutboundSender,
}

/// Process-wide registry of active signaling rooms
///
/// Rooms are created implicitly on first join and removed as soon as their
/// last session leaves; an empty room never persists in the map. All
/// membership edits and broadcast snapshots go through a single mutex; the
/// per-session channel pushes themselves are non-blocking, so the lock is
/// only held for map manipulation.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: Mutex<HashMap<String, HashMap<SessionId, PeerSlot>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a session into a room, creating the room if needed.
    ///
    /// Returns the session id and the room's new participant count.
    pub fn join(
        &self,
        room_id: &str,
        participant: Participant,
        sender: OutboundSender,
    ) -> (SessionId, usize) {
        let session_id = Uuid::new_v4();
        let mut rooms = self.rooms.lock().expect("room registry poisoned");

        let room = rooms.entry(room_id.to_string()).or_default();
        room.insert(session_id, PeerSlot { participant, sender });

        (session_id, room.len())
    }

    /// Remove a session from a room, deleting the room if it is now empty.
    ///
    /// Returns the departed participant and the remaining count, or `None` if
    /// the session was already gone (e.g. swept by a failed broadcast).
    pub fn leave(&self, room_id: &str, session_id: SessionId) -> Option<(Participant, usize)> {
        let mut rooms = self.rooms.lock().expect("room registry poisoned");

        let room = rooms.get_mut(room_id)?;
        let slot = room.remove(&session_id)?;
        let remaining = room.len();

        if remaining == 0 {
            rooms.remove(room_id);
        }

        Some((slot.participant, remaining))
    }

    /// Participants currently in a room, optionally excluding one session
    pub fn participants(&self, room_id: &str, exclude: Option<SessionId>) -> Vec<Participant> {
        let rooms = self.rooms.lock().expect("room registry poisoned");

        rooms
            .get(room_id)
            .map(|room| {
                room.iter()
                    .filter(|(id, _)| Some(**id) != exclude)
                    .map(|(_, slot)| slot.participant.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn participant_count(&self, room_id: &str) -> usize {
        let rooms = self.rooms.lock().expect("room registry poisoned");
        rooms.get(room_id).map(|room| room.len()).unwrap_or(0)
    }

    /// Best-effort fan-out of a message to every session in the room except
    /// the excluded sender.
    ///
    /// Two-phase mark-and-sweep: delivery failures are collected during the
    /// iteration and the failed sessions removed afterwards, each removal
    /// re-checking the empty-room invariant. Swept sessions get no leave
    /// notice here; their own connection loop observes the closed channel and
    /// finds itself already deregistered.
    pub fn broadcast(&self, room_id: &str, exclude: Option<SessionId>, message: &ServerSignal) {
        let frame = match serde_json::to_string(message) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("Failed to serialize broadcast frame: {}", e);
                return;
            }
        };

        let mut rooms = self.rooms.lock().expect("room registry poisoned");
        let Some(room) = rooms.get_mut(room_id) else {
            return;
        };

        let mut disconnected: Vec<SessionId> = Vec::new();
        for (id, slot) in room.iter() {
            if Some(*id) == exclude {
                continue;
            }
            if slot.sender.send(frame.clone()).is_err() {
                disconnected.push(*id);
            }
        }

        for id in disconnected {
            room.remove(&id);
        }
        if room.is_empty() {
            rooms.remove(room_id);
        }
    }
}
