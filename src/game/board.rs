use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 棋盘格子的线性索引（0–8，按行优先排列）。
pub type CellIndex = u8;

/// 棋盘一共九个格子。
pub const CELL_COUNT: usize = 9;

/// 中心格。
pub const CENTER_CELL: CellIndex = 4;

/// 四个角格。
pub const CORNER_CELLS: [CellIndex; 4] = [0, 2, 6, 8];

/// 八条胜利线：三行、三列、两条对角线，检测顺序固定。
pub const WIN_LINES: [[CellIndex; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// 格子内容：空、X 或 O。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    #[default]
    Empty,
    X,
    O,
}

impl Mark {
    pub fn is_empty(self) -> bool {
        self == Mark::Empty
    }

    /// 另一方的棋子；`Empty` 没有对手，原样返回。
    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
            Mark::Empty => Mark::Empty,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mark::Empty => "empty",
            Mark::X => "x",
            Mark::O => "o",
        }
    }
}

impl FromStr for Mark {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x" => Ok(Mark::X),
            "o" | "0" => Ok(Mark::O),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum BoardError {
    CellOccupied { cell: CellIndex, occupant: Mark },
    CellOutOfRange { cell: CellIndex },
}

/// 3×3 棋盘，只负责存储与查询，不包含回合规则。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Board {
    cells: [Mark; CELL_COUNT],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells(cells: [Mark; CELL_COUNT]) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Mark; CELL_COUNT] {
        &self.cells
    }

    pub fn get(&self, cell: CellIndex) -> Option<Mark> {
        self.cells.get(cell as usize).copied()
    }

    /// 落子。不允许覆盖非空格子，这是存储层唯一的合法性约束。
    pub fn place(&mut self, cell: CellIndex, mark: Mark) -> Result<(), BoardError> {
        let slot = self
            .cells
            .get_mut(cell as usize)
            .ok_or(BoardError::CellOutOfRange { cell })?;
        if !slot.is_empty() {
            return Err(BoardError::CellOccupied {
                cell,
                occupant: *slot,
            });
        }
        *slot = mark;
        Ok(())
    }

    /// 空格索引，升序排列，顺序确定。
    pub fn empty_cells(&self) -> Vec<CellIndex> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, mark)| mark.is_empty())
            .map(|(index, _)| index as CellIndex)
            .collect()
    }

    pub fn mark_count(&self) -> u8 {
        self.cells.iter().filter(|mark| !mark.is_empty()).count() as u8
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|mark| !mark.is_empty())
    }

    pub fn clear(&mut self) {
        self.cells = [Mark::Empty; CELL_COUNT];
    }

    pub fn row_col(cell: CellIndex) -> (u8, u8) {
        (cell / 3, cell % 3)
    }

    pub fn cell_at(row: u8, col: u8) -> CellIndex {
        row * 3 + col
    }
}
