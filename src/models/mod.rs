// Model exports
pub mod domain;
pub mod requests;
pub mod responses;
pub mod signal;

pub use domain::{Assignment, CandidateProfile, MatchWeights, Participant, SkillEntry, TaskRequirement};
pub use requests::{AssignTasksRequest, SignalingQuery};
pub use responses::{AssignTasksResponse, ErrorResponse, HealthResponse, RoomInfoResponse};
pub use signal::{ClientSignal, ServerSignal};
