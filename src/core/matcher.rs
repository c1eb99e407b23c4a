use std::collections::HashMap;
use std::future::Future;

use thiserror::Error;

use crate::core::scoring::score_candidate;
use crate::models::{Assignment, CandidateProfile, MatchWeights, TaskRequirement};

/// Error returned by an external scoring delegate invocation
#[derive(Debug, Error)]
#[error("scoring delegate failed: {0}")]
pub struct DelegateError(pub String);

/// External scoring collaborator (e.g. an LLM-backed assignment service)
///
/// Any failure is recovered by the local fallback algorithm; implementations
/// never need to retry.
pub trait ScoringDelegate {
    fn score(
        &self,
        candidates: &[CandidateProfile],
        tasks: &[TaskRequirement],
    ) -> impl Future<Output = Result<Vec<Assignment>, DelegateError>> + Send;
}

const FALLBACK_REASONING: &str = "Matched based on skill overlap and workload balance";

/// Task-to-member matching engine
///
/// Greedy per-task assignment: tasks are processed in the order given, and for
/// each task the highest-scoring candidate wins (ties keep the earliest-scanned
/// candidate). This is a local optimum per task, not a global bipartite
/// optimum.
#[derive(Debug, Clone)]
pub struct TaskMatcher {
    weights: MatchWeights,
}

impl TaskMatcher {
    pub fn new(weights: MatchWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: MatchWeights::default(),
        }
    }

    /// Deterministic local assignment
    ///
    /// Every task receives exactly one assignment as long as at least one
    /// candidate exists; an empty candidate list yields an empty result. The
    /// per-candidate load counter is scoped to this call and starts at zero.
    pub fn assign(
        &self,
        candidates: &[CandidateProfile],
        tasks: &[TaskRequirement],
    ) -> Vec<Assignment> {
        let mut assignments = Vec::with_capacity(tasks.len());
        let mut task_counts: HashMap<i64, usize> =
            candidates.iter().map(|c| (c.user_id, 0)).collect();

        for task in tasks {
            let mut best_match: Option<i64> = None;
            let mut best_score = 0.0;

            for candidate in candidates {
                let assigned_so_far = task_counts.get(&candidate.user_id).copied().unwrap_or(0);
                let score = score_candidate(task, candidate, assigned_so_far, &self.weights);

                if score > best_score {
                    best_score = score;
                    best_match = Some(candidate.user_id);
                }
            }

            if let Some(user_id) = best_match {
                assignments.push(Assignment {
                    task_id: task.task_id,
                    assigned_to_id: user_id,
                    confidence: best_score,
                    reasoning: FALLBACK_REASONING.to_string(),
                });
                *task_counts.entry(user_id).or_insert(0) += 1;
            }
        }

        assignments
    }

    /// Delegate-first assignment with full-list local fallback
    ///
    /// The delegate's assignments are returned verbatim when usable. Any
    /// invocation failure, malformed response, or empty response while tasks
    /// exist falls back to the local algorithm for the entire task list, never
    /// a partial mix.
    pub async fn assign_with_delegate<D: ScoringDelegate>(
        &self,
        delegate: Option<&D>,
        candidates: &[CandidateProfile],
        tasks: &[TaskRequirement],
    ) -> Vec<Assignment> {
        if let Some(delegate) = delegate {
            match delegate.score(candidates, tasks).await {
                Ok(assignments) if self.delegate_response_is_usable(&assignments, candidates, tasks) => {
                    tracing::debug!("Using {} delegate assignments", assignments.len());
                    return assignments;
                }
                Ok(assignments) => {
                    tracing::warn!(
                        "Delegate returned unusable response ({} assignments for {} tasks), using local fallback",
                        assignments.len(),
                        tasks.len()
                    );
                }
                Err(e) => {
                    tracing::warn!("Delegate invocation failed, using local fallback: {}", e);
                }
            }
        }

        self.assign(candidates, tasks)
    }

    /// A delegate response is usable when it is non-empty (given tasks exist)
    /// and every record references a known task and candidate with a sane
    /// confidence value.
    fn delegate_response_is_usable(
        &self,
        assignments: &[Assignment],
        candidates: &[CandidateProfile],
        tasks: &[TaskRequirement],
    ) -> bool {
        if assignments.is_empty() {
            return tasks.is_empty();
        }

        assignments.iter().all(|a| {
            tasks.iter().any(|t| t.task_id == a.task_id)
                && candidates.iter().any(|c| c.user_id == a.assigned_to_id)
                && a.confidence.is_finite()
                && (0.0..=1.0).contains(&a.confidence)
        })
    }
}

impl Default for TaskMatcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SkillEntry;

    fn task(id: i64, skills: &[&str]) -> TaskRequirement {
        TaskRequirement {
            task_id: id,
            title: format!("Task {}", id),
            description: String::new(),
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn candidate(id: i64, skills: &[&str]) -> CandidateProfile {
        CandidateProfile {
            user_id: id,
            name: format!("Member {}", id),
            skills: skills
                .iter()
                .map(|s| SkillEntry {
                    name: s.to_string(),
                    level: "intermediate".to_string(),
                    category: None,
                })
                .collect(),
        }
    }

    struct FixedDelegate(Vec<Assignment>);

    impl ScoringDelegate for FixedDelegate {
        async fn score(
            &self,
            _candidates: &[CandidateProfile],
            _tasks: &[TaskRequirement],
        ) -> Result<Vec<Assignment>, DelegateError> {
            Ok(self.0.clone())
        }
    }

    struct FailingDelegate;

    impl ScoringDelegate for FailingDelegate {
        async fn score(
            &self,
            _candidates: &[CandidateProfile],
            _tasks: &[TaskRequirement],
        ) -> Result<Vec<Assignment>, DelegateError> {
            Err(DelegateError("connection refused".to_string()))
        }
    }

    #[test]
    fn test_strong_skill_match_beats_load_advantage() {
        // Reference arithmetic: after task 1 goes to A, task 2 scores
        // A = 0.7*1 + 0.3*0.5 = 0.85 against B = 0.7*0 + 0.3*1 = 0.3,
        // so A wins both tasks.
        let matcher = TaskMatcher::with_default_weights();
        let candidates = vec![candidate(1, &["python"]), candidate(2, &[])];
        let tasks = vec![task(10, &["python"]), task(11, &["python"])];

        let assignments = matcher.assign(&candidates, &tasks);

        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0].assigned_to_id, 1);
        assert!((assignments[0].confidence - 1.0).abs() < 1e-9);
        assert_eq!(assignments[1].assigned_to_id, 1);
        assert!((assignments[1].confidence - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_load_balancing_without_skill_signal() {
        let matcher = TaskMatcher::with_default_weights();
        let candidates = vec![candidate(1, &[]), candidate(2, &[])];
        let tasks = vec![task(10, &[]), task(11, &[])];

        let assignments = matcher.assign(&candidates, &tasks);

        // Task 1 ties at 0.3 each: first candidate wins. Task 2: candidate 1
        // has dropped to 0.15 while candidate 2 is still at 0.3.
        assert_eq!(assignments[0].assigned_to_id, 1);
        assert_eq!(assignments[1].assigned_to_id, 2);
    }

    #[test]
    fn test_every_task_assigned_with_nonempty_candidates() {
        let matcher = TaskMatcher::with_default_weights();
        let candidates = vec![candidate(1, &[])];
        let tasks: Vec<_> = (0..5).map(|i| task(i, &["rust"])).collect();

        let assignments = matcher.assign(&candidates, &tasks);
        assert_eq!(assignments.len(), 5);
        assert!(assignments.iter().all(|a| a.assigned_to_id == 1));
    }

    #[test]
    fn test_empty_candidates_yields_empty_result() {
        let matcher = TaskMatcher::with_default_weights();
        let tasks = vec![task(10, &["python"])];
        assert!(matcher.assign(&[], &tasks).is_empty());
    }

    #[test]
    fn test_load_counter_resets_between_calls() {
        let matcher = TaskMatcher::with_default_weights();
        let candidates = vec![candidate(1, &["python"]), candidate(2, &[])];
        let tasks = vec![task(10, &["python"])];

        let first = matcher.assign(&candidates, &tasks);
        let second = matcher.assign(&candidates, &tasks);

        // No cross-call load memory: identical inputs give identical output.
        assert_eq!(first[0].assigned_to_id, second[0].assigned_to_id);
        assert_eq!(first[0].confidence, second[0].confidence);
    }

    #[tokio::test]
    async fn test_delegate_response_used_when_well_formed() {
        let matcher = TaskMatcher::with_default_weights();
        let candidates = vec![candidate(1, &["python"]), candidate(2, &[])];
        let tasks = vec![task(10, &["python"])];

        let delegate = FixedDelegate(vec![Assignment {
            task_id: 10,
            assigned_to_id: 2,
            confidence: 0.9,
            reasoning: "Delegate pick".to_string(),
        }]);

        let assignments = matcher
            .assign_with_delegate(Some(&delegate), &candidates, &tasks)
            .await;

        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].assigned_to_id, 2);
        assert_eq!(assignments[0].reasoning, "Delegate pick");
    }

    #[tokio::test]
    async fn test_delegate_failure_falls_back_locally() {
        let matcher = TaskMatcher::with_default_weights();
        let candidates = vec![candidate(1, &["python"])];
        let tasks = vec![task(10, &["python"])];

        let assignments = matcher
            .assign_with_delegate(Some(&FailingDelegate), &candidates, &tasks)
            .await;

        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].assigned_to_id, 1);
        assert_eq!(assignments[0].reasoning, FALLBACK_REASONING);
    }

    #[tokio::test]
    async fn test_delegate_empty_response_falls_back_for_whole_list() {
        let matcher = TaskMatcher::with_default_weights();
        let candidates = vec![candidate(1, &["python"])];
        let tasks = vec![task(10, &["python"]), task(11, &[])];

        let assignments = matcher
            .assign_with_delegate(Some(&FixedDelegate(vec![])), &candidates, &tasks)
            .await;

        assert_eq!(assignments.len(), 2);
    }

    #[tokio::test]
    async fn test_delegate_with_unknown_ids_rejected() {
        let matcher = TaskMatcher::with_default_weights();
        let candidates = vec![candidate(1, &["python"])];
        let tasks = vec![task(10, &["python"])];

        let delegate = FixedDelegate(vec![Assignment {
            task_id: 999,
            assigned_to_id: 999,
            confidence: 0.5,
            reasoning: "bogus".to_string(),
        }]);

        let assignments = matcher
            .assign_with_delegate(Some(&delegate), &candidates, &tasks)
            .await;

        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].assigned_to_id, 1);
    }

    #[tokio::test]
    async fn test_no_delegate_runs_local() {
        let matcher = TaskMatcher::with_default_weights();
        let candidates = vec![candidate(1, &["python"])];
        let tasks = vec![task(10, &["python"])];

        let assignments = matcher
            .assign_with_delegate(None::<&FailingDelegate>, &candidates, &tasks)
            .await;

        assert_eq!(assignments.len(), 1);
    }
}
