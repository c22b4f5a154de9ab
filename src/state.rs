//! Application state: in-memory stores, tolerances, and selection logic.
//!
//! This module owns:
//!   - problem stores (by id, by exam/topic bucket, last-by-bucket)
//!   - per-user progress (exam choice, solved counters, difficulty)
//!   - the tolerance table (built-ins overlaid with TOML overrides)
//!
//! Selection is loosely adaptive: it targets the complexity matching the
//! user's current difficulty and widens gracefully when the bucket is thin.

use std::{collections::HashMap, sync::Arc};

use rand::seq::SliceRandom;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::checker::Tolerances;
use crate::config::load_quiz_config_from_env;
use crate::domain::{Problem, ProblemSource, UserProgress};
use crate::seeds::{hard_fallback_problem, seed_problems};
use uuid::Uuid;

/// Complexity values live on this scale; difficulty targets are clamped to it.
const COMPLEXITY_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// A topic's difficulty bumps after this many solves in it.
const SOLVES_PER_LEVEL: u32 = 5;

fn bucket_key(exam: &str, topic: &str) -> String {
    format!("{exam}/{topic}")
}

#[derive(Clone)]
pub struct AppState {
    pub by_id: Arc<RwLock<HashMap<String, Problem>>>,
    pub by_bucket: Arc<RwLock<HashMap<String, Vec<String>>>>,
    pub last_by_bucket: Arc<RwLock<HashMap<String, String>>>,
    pub users: Arc<RwLock<HashMap<u64, UserProgress>>>,
    pub tolerances: Tolerances,
}

impl AppState {
    /// Build state from env: load config, seed problems, build indices.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg_opt = load_quiz_config_from_env();

        let mut tolerances = Tolerances::default();
        if let Some(cfg) = &cfg_opt {
            tolerances.apply_overrides(cfg.tolerances.default, &cfg.tolerances.by_topic);
        }

        let mut id_map = HashMap::<String, Problem>::new();
        let mut bucket_map = HashMap::<String, Vec<String>>::new();

        // Insert config-based problems (if any).
        if let Some(cfg) = &cfg_opt {
            for pc in &cfg.problems {
                let id = pc.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
                if pc.answer.trim().is_empty() {
                    warn!(target: "problem", %id, "Skipping bank item: empty answer.");
                    continue;
                }
                let p = Problem {
                    id: id.clone(),
                    topic: pc.topic.clone(),
                    exam: pc.exam.clone(),
                    level: pc.level.clone(),
                    source: ProblemSource::LocalBank,
                    text: pc.text.clone(),
                    answer: pc.answer.clone(),
                    hint: pc.hint.clone(),
                    complexity: pc.complexity.clamp(*COMPLEXITY_RANGE.start(), *COMPLEXITY_RANGE.end()),
                };
                bucket_map
                    .entry(bucket_key(&p.exam, &p.topic))
                    .or_default()
                    .push(id.clone());
                id_map.insert(id, p);
            }
        }

        // Always insert built-in seeds, but don't overwrite existing ids.
        for p in seed_problems() {
            if id_map.contains_key(&p.id) {
                continue;
            }
            bucket_map
                .entry(bucket_key(&p.exam, &p.topic))
                .or_default()
                .push(p.id.clone());
            id_map.insert(p.id.clone(), p);
        }

        // Inventory summary by bucket/source.
        let mut count_by_bucket: HashMap<String, (usize, usize)> = HashMap::new();
        for p in id_map.values() {
            let entry = count_by_bucket
                .entry(bucket_key(&p.exam, &p.topic))
                .or_insert((0, 0));
            match p.source {
                ProblemSource::LocalBank => entry.0 += 1,
                ProblemSource::Seed => entry.1 += 1,
            }
        }
        for (bucket, (bank, seed)) in count_by_bucket {
            info!(target: "problem", %bucket, local_bank = bank, seed = seed, "Startup problem inventory");
        }

        Self {
            by_id: Arc::new(RwLock::new(id_map)),
            by_bucket: Arc::new(RwLock::new(bucket_map)),
            last_by_bucket: Arc::new(RwLock::new(HashMap::new())),
            users: Arc::new(RwLock::new(HashMap::new())),
            tolerances,
        }
    }

    /// Insert a problem into stores (by_id and by_bucket).
    #[instrument(level = "debug", skip(self, p), fields(id = %p.id))]
    pub async fn insert_problem(&self, p: Problem) {
        let mut by_id = self.by_id.write().await;
        let mut by_bucket = self.by_bucket.write().await;
        let id = p.id.clone();
        let bucket = bucket_key(&p.exam, &p.topic);
        by_id.insert(id.clone(), p);
        by_bucket.entry(bucket).or_default().push(id);
    }

    /// Read-only access to a problem by id.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_problem(&self, id: &str) -> Option<Problem> {
        let by_id = self.by_id.read().await;
        by_id.get(id).cloned()
    }

    /// The user's current difficulty level, starting at 1. Also records
    /// the exam choice so stats reflect the latest selection.
    #[instrument(level = "debug", skip(self), fields(%user_id, %exam))]
    pub async fn user_difficulty(&self, user_id: u64, exam: &str) -> u32 {
        let mut users = self.users.write().await;
        let u = users.entry(user_id).or_insert_with(|| UserProgress {
            exam: exam.to_string(),
            solved: HashMap::new(),
            difficulty: 1,
        });
        u.exam = exam.to_string();
        u.difficulty
    }

    /// Record a correct answer: bump the topic counter and raise the
    /// difficulty every `SOLVES_PER_LEVEL`-th solve of that topic.
    #[instrument(level = "info", skip(self), fields(%user_id, %topic))]
    pub async fn record_solved(&self, user_id: u64, topic: &str) {
        let mut users = self.users.write().await;
        let u = users.entry(user_id).or_insert_with(|| UserProgress {
            exam: "oge".to_string(),
            solved: HashMap::new(),
            difficulty: 1,
        });
        let counter = u.solved.entry(topic.to_string()).or_insert(0);
        *counter += 1;
        if *counter % SOLVES_PER_LEVEL == 0 {
            u.difficulty += 1;
            info!(target: "problem", %user_id, %topic, difficulty = u.difficulty, "Difficulty raised");
        }
    }

    /// Snapshot of a user's progress, if we have seen them.
    #[instrument(level = "debug", skip(self), fields(%user_id))]
    pub async fn user_progress(&self, user_id: u64) -> Option<UserProgress> {
        let users = self.users.read().await;
        users.get(&user_id).cloned()
    }

    /// Selection policy, loosely adaptive:
    /// 1) candidates at the complexity matching the user's difficulty,
    /// 2) widened to ±1 complexity,
    /// 3) anything in the (exam, topic) bucket,
    /// 4) a hard fallback problem, inserted so answers can be checked.
    /// The most recently served problem of a bucket is avoided when an
    /// alternative exists.
    #[instrument(level = "info", skip(self), fields(%exam, %topic, %difficulty))]
    pub async fn choose_problem(&self, exam: &str, topic: &str, difficulty: u32) -> (Problem, &'static str) {
        let bucket = bucket_key(exam, topic);
        let target = (difficulty.min(*COMPLEXITY_RANGE.end() as u32) as u8)
            .max(*COMPLEXITY_RANGE.start());

        let ids = { self.by_bucket.read().await.get(&bucket).cloned() };
        let chosen: Option<(Problem, &'static str)> = match ids {
            Some(ids) if !ids.is_empty() => {
                let last = { self.last_by_bucket.read().await.get(&bucket).cloned() };
                let by_id = self.by_id.read().await;

                let pool: Vec<&Problem> = ids.iter().filter_map(|id| by_id.get(id)).collect();
                let exact: Vec<&Problem> =
                    pool.iter().copied().filter(|p| p.complexity == target).collect();
                let near: Vec<&Problem> = pool
                    .iter()
                    .copied()
                    .filter(|p| p.complexity.abs_diff(target) <= 1)
                    .collect();

                let (candidates, origin) = if !exact.is_empty() {
                    (exact, "exact_complexity")
                } else if !near.is_empty() {
                    (near, "near_complexity")
                } else {
                    (pool, "whole_bucket")
                };

                let fresh: Vec<&Problem> = match &last {
                    Some(last_id) if candidates.len() > 1 => candidates
                        .iter()
                        .copied()
                        .filter(|p| &p.id != last_id)
                        .collect(),
                    _ => candidates.clone(),
                };
                let fresh = if fresh.is_empty() { candidates } else { fresh };

                fresh
                    .choose(&mut rand::thread_rng())
                    .map(|p| ((*p).clone(), origin))
            }
            _ => None,
        };

        if let Some((p, origin)) = chosen {
            self.last_by_bucket
                .write()
                .await
                .insert(bucket, p.id.clone());
            info!(target: "problem", %exam, %topic, chosen = %p.id, complexity = p.complexity, %origin, "Serving problem");
            return (p, origin);
        }

        // Absolute last resort: hard fallback.
        let p = hard_fallback_problem(exam.to_string(), topic.to_string());
        let id = p.id.clone();
        self.insert_problem(p.clone()).await;
        self.last_by_bucket.write().await.insert(bucket, id.clone());
        warn!(target: "problem", %exam, %topic, chosen = %id, source = "hard_fallback", "Inserted hard fallback problem");
        (p, "hard_fallback")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_state() -> AppState {
        AppState {
            by_id: Arc::new(RwLock::new(HashMap::new())),
            by_bucket: Arc::new(RwLock::new(HashMap::new())),
            last_by_bucket: Arc::new(RwLock::new(HashMap::new())),
            users: Arc::new(RwLock::new(HashMap::new())),
            tolerances: Tolerances::default(),
        }
    }

    fn problem(id: &str, complexity: u8) -> Problem {
        Problem {
            id: id.to_string(),
            topic: "Algebra".to_string(),
            exam: "oge".to_string(),
            level: "basic".to_string(),
            source: ProblemSource::Seed,
            text: "?".to_string(),
            answer: "1".to_string(),
            hint: String::new(),
            complexity,
        }
    }

    #[tokio::test]
    async fn prefers_exact_complexity_match() {
        let state = empty_state();
        state.insert_problem(problem("a", 1)).await;
        state.insert_problem(problem("b", 3)).await;
        let (p, origin) = state.choose_problem("oge", "Algebra", 3).await;
        assert_eq!(p.id, "b");
        assert_eq!(origin, "exact_complexity");
    }

    #[tokio::test]
    async fn widens_when_target_is_missing() {
        let state = empty_state();
        state.insert_problem(problem("a", 2)).await;
        let (p, origin) = state.choose_problem("oge", "Algebra", 3).await;
        assert_eq!(p.id, "a");
        assert_eq!(origin, "near_complexity");

        let (p, origin) = state.choose_problem("oge", "Algebra", 5).await;
        assert_eq!(p.id, "a");
        assert_eq!(origin, "whole_bucket");
    }

    #[tokio::test]
    async fn empty_bucket_yields_hard_fallback() {
        let state = empty_state();
        let (p, origin) = state.choose_problem("ege", "Geometry", 1).await;
        assert_eq!(origin, "hard_fallback");
        // The fallback is inserted so a later answer check can find it.
        assert!(state.get_problem(&p.id).await.is_some());
    }

    #[tokio::test]
    async fn avoids_repeating_last_served() {
        let state = empty_state();
        state.insert_problem(problem("a", 1)).await;
        state.insert_problem(problem("b", 1)).await;
        let (first, _) = state.choose_problem("oge", "Algebra", 1).await;
        let (second, _) = state.choose_problem("oge", "Algebra", 1).await;
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn difficulty_bumps_every_fifth_solve() {
        let state = empty_state();
        assert_eq!(state.user_difficulty(7, "oge").await, 1);
        for _ in 0..4 {
            state.record_solved(7, "Algebra").await;
        }
        assert_eq!(state.user_difficulty(7, "oge").await, 1);
        state.record_solved(7, "Algebra").await;
        assert_eq!(state.user_difficulty(7, "oge").await, 2);

        // Counters are per topic: geometry solves don't ride along.
        state.record_solved(7, "Geometry").await;
        let progress = state.user_progress(7).await.unwrap();
        assert_eq!(progress.solved["Algebra"], 5);
        assert_eq!(progress.solved["Geometry"], 1);
        assert_eq!(progress.difficulty, 2);
    }
}
