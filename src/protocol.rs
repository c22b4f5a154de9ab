//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Problem, ProblemSource, UserProgress};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    NewProblem {
        exam: String,
        topic: String,
        #[serde(rename = "userId")]
        user_id: u64,
    },
    SubmitAnswer {
        #[serde(rename = "problemId")]
        problem_id: String,
        #[serde(rename = "userId")]
        user_id: u64,
        answer: String,
    },
    Hint {
        #[serde(rename = "problemId")]
        problem_id: String,
    },
    Stats {
        #[serde(rename = "userId")]
        user_id: u64,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Problem {
        problem: ProblemOut,
    },
    AnswerResult {
        correct: bool,
        expected: String,
        hint: String,
    },
    Hint {
        text: String,
    },
    Stats {
        stats: StatsOut,
    },
    Error {
        message: String,
    },
}

/// DTO used by both WS and HTTP for problem delivery.
/// The canonical answer is deliberately withheld.
#[derive(Debug, Serialize)]
pub struct ProblemOut {
    pub id: String,
    pub topic: String,
    pub exam: String,
    pub level: String,
    pub source: ProblemSource,
    pub text: String,
    pub complexity: u8,
}

/// Convert full `Problem` (internal) to the public DTO.
pub fn to_out(p: &Problem) -> ProblemOut {
    ProblemOut {
        id: p.id.clone(),
        topic: p.topic.clone(),
        exam: p.exam.clone(),
        level: p.level.clone(),
        source: p.source.clone(),
        text: p.text.clone(),
        complexity: p.complexity,
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct ProblemQuery {
    pub exam: Option<String>,
    pub topic: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: u64,
}

#[derive(Deserialize)]
pub struct AnswerIn {
    #[serde(rename = "problemId")]
    pub problem_id: String,
    #[serde(rename = "userId")]
    pub user_id: u64,
    pub answer: String,
}
#[derive(Serialize)]
pub struct AnswerOut {
    pub correct: bool,
    pub expected: String,
    pub hint: String,
}

#[derive(Debug, Deserialize)]
pub struct HintQuery {
    #[serde(rename = "problemId")]
    pub problem_id: String,
}
#[derive(Serialize)]
pub struct HintOut {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    #[serde(rename = "userId")]
    pub user_id: u64,
}
#[derive(Debug, Serialize)]
pub struct StatsOut {
    pub exam: String,
    pub solved: HashMap<String, u32>,
    pub difficulty: u32,
}

pub fn stats_out(p: UserProgress) -> StatsOut {
    StatsOut {
        exam: p.exam,
        solved: p.solved,
        difficulty: p.difficulty,
    }
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_reply_is_loggable_and_serializable() {
        let msg = ServerWsMessage::Stats {
            stats: stats_out(UserProgress {
                exam: "oge".into(),
                solved: HashMap::from([("Algebra".to_string(), 5)]),
                difficulty: 2,
            }),
        };
        // ServerWsMessage derives Debug; every variant's payload must too.
        assert!(format!("{:?}", msg).contains("Stats"));

        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "stats");
        assert_eq!(json["stats"]["difficulty"], 2);
        assert_eq!(json["stats"]["solved"]["Algebra"], 5);
    }
}
