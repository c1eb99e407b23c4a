// Core algorithm exports
pub mod matcher;
pub mod registry;
pub mod scoring;

pub use matcher::{DelegateError, ScoringDelegate, TaskMatcher};
pub use registry::{OutboundSender, RoomRegistry, SessionId};
pub use scoring::{final_score, load_factor, skill_score};
