//! CollabHub RT - Real-time signaling and task-matching service
//!
//! This library provides the two stateful subsystems of the CollabHub project
//! platform: an in-memory WebRTC signaling relay (room membership + message
//! fan-out) and a skill-based task assignment engine with an external scoring
//! delegate and a deterministic local fallback.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{RoomRegistry, ScoringDelegate, TaskMatcher};
pub use models::{
    Assignment, CandidateProfile, ClientSignal, MatchWeights, Participant, ServerSignal,
    SkillEntry, TaskRequirement,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let matcher = TaskMatcher::with_default_weights();
        assert!(matcher.assign(&[], &[]).is_empty());
    }
}
