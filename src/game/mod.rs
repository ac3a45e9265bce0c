//! 游戏核心逻辑模块（棋盘、状态机、规则引擎）。

pub mod board;
pub mod rules;
pub mod state;

pub use board::{
    Board,
    BoardError,
    CellIndex,
    Mark,
    CELL_COUNT,
    CENTER_CELL,
    CORNER_CELLS,
    WIN_LINES,
};
pub use rules::{MoveAction, MoveResolution, RuleEngine, RuleError};
pub use state::{evaluate, GameEvent, GameState, GameStatus, IntegrityError, TurnPhase};
