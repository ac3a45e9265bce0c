//! AI 模块（电脑对手的启发式选点）。

pub mod heuristic;

pub use heuristic::{AiAgent, AiConfig, AiDecision, AiDifficulty, ChoiceReason};
