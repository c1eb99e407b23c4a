use serde::{Deserialize, Serialize};

/// A task awaiting assignment, with the skills it calls for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRequirement {
    pub task_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
}

/// One skill a team member holds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillEntry {
    pub name: String,
    pub level: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// A project member considered for assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub user_id: i64,
    pub name: String,
    #[serde(default)]
    pub skills: Vec<SkillEntry>,
}

impl CandidateProfile {
    /// Lowercased skill names, used for case-insensitive overlap checks
    pub fn skill_names_lowercase(&self) -> Vec<String> {
        self.skills.iter().map(|s| s.name.to_lowercase()).collect()
    }
}

/// Result of matching one task to one member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub task_id: i64,
    pub assigned_to_id: i64,
    pub confidence: f64,
    pub reasoning: String,
}

/// Identity of a connected signaling peer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    pub user_id: String,
    pub user_name: String,
    pub joined_at: String,
}

impl Participant {
    pub fn new(user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
            joined_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Matching weights for the local fallback scorer
#[derive(Debug, Clone, Copy)]
pub struct MatchWeights {
    pub skill: f64,
    pub load: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self { skill: 0.7, load: 0.3 }
    }
}
