use serde::{Deserialize, Serialize};

use super::board::{Board, CellIndex, Mark, WIN_LINES};

/// 对局结果。`Won` 会带上获胜的那条线，前端用它画贯穿线。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameStatus {
    InProgress,
    Won {
        winner: Mark,
        line: [CellIndex; 3],
    },
    Tie,
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

impl Default for GameStatus {
    fn default() -> Self {
        GameStatus::InProgress
    }
}

/// 回合阶段，由调度器维护。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    PlayerToMove,
    ComputerToMove,
    GameOver,
}

impl TurnPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            TurnPhase::PlayerToMove => "player_to_move",
            TurnPhase::ComputerToMove => "computer_to_move",
            TurnPhase::GameOver => "game_over",
        }
    }
}

/// 对局事件流，供前端回放落子与终局动画。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    MoveApplied {
        cell: CellIndex,
        mark: Mark,
    },
    GameWon {
        winner: Mark,
        line: [CellIndex; 3],
    },
    GameTied,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum IntegrityError {
    InvalidAssignment { player: Mark, computer: Mark },
    InvalidCurrentMark { current: Mark },
    MoveCountMismatch { moves_made: u8, marks_on_board: u8 },
    MarkImbalance { x_count: u8, o_count: u8 },
}

/// 胜负检测：纯函数，按固定顺序扫描八条线，命中第一条即返回。
/// 不修改棋盘，也不触发任何副作用；AI 的试探走子直接对棋盘副本调用它。
pub fn evaluate(board: &Board) -> GameStatus {
    for line in WIN_LINES {
        let first = board.get(line[0]).unwrap_or(Mark::Empty);
        if first.is_empty() {
            continue;
        }
        if board.get(line[1]) == Some(first) && board.get(line[2]) == Some(first) {
            return GameStatus::Won {
                winner: first,
                line,
            };
        }
    }

    if board.is_full() {
        GameStatus::Tie
    } else {
        GameStatus::InProgress
    }
}

/// 单局对局状态：棋盘、棋子分配、回合计数、结果与事件流。
/// 所有修改都必须经过 `RuleEngine`，新开一局会整体替换这份状态。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub player_mark: Mark,
    pub computer_mark: Mark,
    pub current_mark: Mark,
    pub moves_made: u8,
    #[serde(default)]
    pub status: GameStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event_log: Vec<GameEvent>,
}

impl GameState {
    /// 新开一局。棋子分配在开局前确定且整局不变；X 永远先手，
    /// 所以玩家执 O 时首回合属于电脑。
    pub fn new(player_mark: Mark) -> Self {
        let player = if player_mark.is_empty() {
            Mark::X
        } else {
            player_mark
        };
        Self {
            board: Board::new(),
            player_mark: player,
            computer_mark: player.opponent(),
            current_mark: Mark::X,
            moves_made: 0,
            status: GameStatus::InProgress,
            event_log: Vec::new(),
        }
    }

    pub fn record_event(&mut self, event: GameEvent) {
        self.event_log.push(event);
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn turn_phase(&self) -> TurnPhase {
        if self.is_finished() {
            TurnPhase::GameOver
        } else if self.current_mark == self.player_mark {
            TurnPhase::PlayerToMove
        } else {
            TurnPhase::ComputerToMove
        }
    }

    /// 调度器的状态转移：非终局时交换行棋方，终局后冻结。
    pub fn advance_turn(&mut self) {
        if !self.is_finished() {
            self.current_mark = self.current_mark.opponent();
        }
    }

    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        if self.player_mark.is_empty()
            || self.computer_mark.is_empty()
            || self.player_mark == self.computer_mark
        {
            return Err(IntegrityError::InvalidAssignment {
                player: self.player_mark,
                computer: self.computer_mark,
            });
        }

        if self.current_mark.is_empty() {
            return Err(IntegrityError::InvalidCurrentMark {
                current: self.current_mark,
            });
        }

        let marks_on_board = self.board.mark_count();
        if marks_on_board != self.moves_made {
            return Err(IntegrityError::MoveCountMismatch {
                moves_made: self.moves_made,
                marks_on_board,
            });
        }

        let x_count = self
            .board
            .cells()
            .iter()
            .filter(|mark| **mark == Mark::X)
            .count() as u8;
        let o_count = marks_on_board - x_count;
        // X 先手，任何合法局面下 X 的子数等于或恰好多一。
        if x_count != o_count && x_count != o_count + 1 {
            return Err(IntegrityError::MarkImbalance { x_count, o_count });
        }

        Ok(())
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new(Mark::X)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_from(layout: [Mark; 9]) -> Board {
        Board::from_cells(layout)
    }

    #[test]
    fn evaluate_detects_top_row_win() {
        use Mark::{Empty as E, O, X};
        let board = board_from([X, X, X, O, O, E, E, E, E]);
        assert_eq!(
            evaluate(&board),
            GameStatus::Won {
                winner: Mark::X,
                line: [0, 1, 2]
            }
        );
    }

    #[test]
    fn evaluate_detects_tie_on_full_board() {
        use Mark::{O, X};
        let board = board_from([X, O, X, X, O, O, O, X, X]);
        assert_eq!(evaluate(&board), GameStatus::Tie);
    }

    #[test]
    fn evaluate_reports_in_progress_otherwise() {
        use Mark::{Empty as E, O, X};
        let board = board_from([X, O, E, E, E, E, E, E, E]);
        assert_eq!(evaluate(&board), GameStatus::InProgress);
    }

    #[test]
    fn evaluate_is_deterministic_and_side_effect_free() {
        use Mark::{Empty as E, O, X};
        let board = board_from([X, X, E, O, O, E, E, E, E]);
        let snapshot = board.clone();

        let first = evaluate(&board);
        let second = evaluate(&board);

        assert_eq!(first, second);
        assert_eq!(board, snapshot, "evaluate must not mutate the board");
    }

    #[test]
    fn new_game_resets_everything() {
        let state = GameState::new(Mark::O);
        assert_eq!(state.moves_made, 0);
        assert!(state.board.empty_cells().len() == 9);
        assert_eq!(state.current_mark, Mark::X, "X always opens");
        assert_eq!(state.player_mark, Mark::O);
        assert_eq!(state.computer_mark, Mark::X);
        assert_eq!(state.status, GameStatus::InProgress);
        assert!(state.event_log.is_empty());
    }

    #[test]
    fn initial_phase_follows_piece_assignment() {
        assert_eq!(GameState::new(Mark::X).turn_phase(), TurnPhase::PlayerToMove);
        assert_eq!(
            GameState::new(Mark::O).turn_phase(),
            TurnPhase::ComputerToMove,
            "when the player takes O the computer opens as X"
        );
    }

    #[test]
    fn integrity_check_flags_move_count_drift() {
        let mut state = GameState::new(Mark::X);
        state.board.place(0, Mark::X).expect("cell 0 is empty");

        assert_eq!(
            state.integrity_check(),
            Err(IntegrityError::MoveCountMismatch {
                moves_made: 0,
                marks_on_board: 1
            })
        );

        state.moves_made = 1;
        state.integrity_check().expect("balanced state should pass");
    }

    #[test]
    fn integrity_check_flags_mark_imbalance() {
        let mut state = GameState::new(Mark::X);
        state.board.place(0, Mark::O).expect("cell 0 is empty");
        state.moves_made = 1;

        assert_eq!(
            state.integrity_check(),
            Err(IntegrityError::MarkImbalance {
                x_count: 0,
                o_count: 1
            })
        );
    }
}
