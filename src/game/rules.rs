use serde::{Deserialize, Serialize};

use super::{
    board::{BoardError, CellIndex, Mark},
    state::{evaluate, GameEvent, GameState, GameStatus, IntegrityError},
};

/// 一次落子请求。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveAction {
    pub cell: CellIndex,
    pub mark: Mark,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RuleError {
    GameAlreadyOver,
    NotYourTurn { mark: Mark },
    IllegalMove { cell: CellIndex },
    IntegrityViolation { error: IntegrityError },
}

/// 一次成功落子的完整结果：新状态、本次产生的事件、以及落子后的对局结果。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveResolution {
    pub state: GameState,
    pub events: Vec<GameEvent>,
    pub status: GameStatus,
}

impl MoveResolution {
    pub fn new(state: GameState, events: Vec<GameEvent>) -> Self {
        let status = state.status.clone();
        Self {
            state,
            events,
            status,
        }
    }
}

/// 执行器：唯一允许修改 `GameState` 的入口。
/// 前置校验失败时原状态保持不变，错误都是可恢复的拒绝而不是崩溃。
#[derive(Debug, Default)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn new() -> Self {
        Self
    }

    fn ensure_active(state: &GameState) -> Result<(), RuleError> {
        if state.is_finished() {
            return Err(RuleError::GameAlreadyOver);
        }
        Ok(())
    }

    fn ensure_turn_owner(state: &GameState, mark: Mark) -> Result<(), RuleError> {
        if mark.is_empty() || mark != state.current_mark {
            return Err(RuleError::NotYourTurn { mark });
        }
        Ok(())
    }

    fn ensure_integrity(state: &GameState) -> Result<(), RuleError> {
        state
            .integrity_check()
            .map_err(|error| RuleError::IntegrityViolation { error })
    }

    /// 落子：校验回合与格子，写入棋盘，递增计数，评估胜负并推进调度器。
    pub fn apply_move(
        &self,
        state: &mut GameState,
        action: MoveAction,
    ) -> Result<Vec<GameEvent>, RuleError> {
        Self::ensure_active(state)?;
        Self::ensure_integrity(state)?;
        Self::ensure_turn_owner(state, action.mark)?;

        state
            .board
            .place(action.cell, action.mark)
            .map_err(|error| match error {
                BoardError::CellOccupied { cell, .. } | BoardError::CellOutOfRange { cell } => {
                    RuleError::IllegalMove { cell }
                }
            })?;
        state.moves_made += 1;

        let mut events = Vec::new();
        let move_event = GameEvent::MoveApplied {
            cell: action.cell,
            mark: action.mark,
        };
        state.record_event(move_event.clone());
        events.push(move_event);

        state.status = evaluate(&state.board);
        match &state.status {
            GameStatus::Won { winner, line } => {
                let won = GameEvent::GameWon {
                    winner: *winner,
                    line: *line,
                };
                state.record_event(won.clone());
                events.push(won);
            }
            GameStatus::Tie => {
                state.record_event(GameEvent::GameTied);
                events.push(GameEvent::GameTied);
            }
            GameStatus::InProgress => {}
        }

        state.advance_turn();

        Ok(events)
    }
}
