use crate::models::{CandidateProfile, MatchWeights, TaskRequirement};

/// Fraction of a task's required skills present in the candidate's skill set
///
/// Names are compared case-insensitively and exactly (no partial or fuzzy
/// matching). An empty requirement list scores 0 for every candidate, so the
/// final score reduces to pure load balancing.
pub fn skill_score(task: &TaskRequirement, candidate_skill_names: &[String]) -> f64 {
    let required: Vec<String> = task
        .required_skills
        .iter()
        .map(|s| s.to_lowercase())
        .collect();

    let matches = required
        .iter()
        .filter(|skill| candidate_skill_names.contains(skill))
        .count();

    matches as f64 / required.len().max(1) as f64
}

/// Inverse-proportional penalty for candidates already assigned tasks
/// within the current matching run
#[inline]
pub fn load_factor(assigned_so_far: usize) -> f64 {
    1.0 / (assigned_so_far as f64 + 1.0)
}

/// Weighted combination of skill overlap and workload balance
#[inline]
pub fn final_score(skill: f64, load: f64, weights: &MatchWeights) -> f64 {
    skill * weights.skill + load * weights.load
}

/// Score one candidate for one task given their current load in this run
pub fn score_candidate(
    task: &TaskRequirement,
    candidate: &CandidateProfile,
    assigned_so_far: usize,
    weights: &MatchWeights,
) -> f64 {
    let names = candidate.skill_names_lowercase();
    final_score(
        skill_score(task, &names),
        load_factor(assigned_so_far),
        weights,
    )
}
