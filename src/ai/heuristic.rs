use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::game::{
    evaluate, Board, CellIndex, GameState, GameStatus, Mark, CENTER_CELL, CORNER_CELLS,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AiDifficulty {
    Easy,
    Medium,
    Hard,
}

impl FromStr for AiDifficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(AiDifficulty::Easy),
            "medium" | "normal" => Ok(AiDifficulty::Medium),
            "hard" | "expert" => Ok(AiDifficulty::Hard),
            _ => Err(()),
        }
    }
}

/// AI 配置。`fork_defense_chance` 是防分叉步骤的触发概率，
/// 作为显式参数暴露出来，测试可以把它钉在 0.0 或 1.0 上覆盖两个分支。
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AiConfig {
    pub difficulty: AiDifficulty,
    pub fork_defense_chance: f64,
}

impl AiConfig {
    pub fn from_difficulty(difficulty: AiDifficulty) -> Self {
        let fork_defense_chance = match difficulty {
            AiDifficulty::Easy => 0.0,
            AiDifficulty::Medium => 0.4,
            AiDifficulty::Hard => 1.0,
        };
        Self {
            difficulty,
            fork_defense_chance,
        }
    }

    pub fn with_fork_defense_chance(mut self, chance: f64) -> Self {
        self.fork_defense_chance = chance.clamp(0.0, 1.0);
        self
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig::from_difficulty(AiDifficulty::Easy)
    }
}

/// 选中这步棋的阶梯步骤，随决策一起返回，便于前端提示与测试断言。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceReason {
    Random,
    WinNow,
    BlockNow,
    TakeCenter,
    ForkDefense,
    TakeCorner,
    Fallback,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiDecision {
    pub cell: CellIndex,
    pub mark: Mark,
    pub reason: ChoiceReason,
}

/// 电脑棋手。只通过棋盘的只读接口与试探评估做决策，
/// 从不直接改动对局状态；落子仍然走 `RuleEngine`。
pub struct AiAgent {
    config: AiConfig,
    rng: SmallRng,
}

impl AiAgent {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(config: AiConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// 为电脑挑一格。终局或满盘时返回 `None`。
    ///
    /// Easy 纯随机；Medium/Hard 走固定阶梯：先扫完所有格找必胜，
    /// 再扫完所有格找必堵，然后中心、防分叉、角、随机兜底。
    /// 阶梯在第一个给出落点的步骤停下。
    pub fn choose_move(&mut self, state: &GameState) -> Option<AiDecision> {
        if state.is_finished() {
            return None;
        }

        let empty = state.board.empty_cells();
        if empty.is_empty() {
            return None;
        }

        let computer = state.computer_mark;
        let player = state.player_mark;

        if self.config.difficulty == AiDifficulty::Easy {
            let cell = *empty.choose(&mut self.rng)?;
            return Some(AiDecision {
                cell,
                mark: computer,
                reason: ChoiceReason::Random,
            });
        }

        // 1. 必胜：整轮扫描，先于任何堵截。
        for &cell in &empty {
            if probe_wins(&state.board, cell, computer) {
                return Some(AiDecision {
                    cell,
                    mark: computer,
                    reason: ChoiceReason::WinNow,
                });
            }
        }

        // 2. 必堵。
        for &cell in &empty {
            if probe_wins(&state.board, cell, player) {
                return Some(AiDecision {
                    cell,
                    mark: computer,
                    reason: ChoiceReason::BlockNow,
                });
            }
        }

        // 3. 中心。
        if state.board.get(CENTER_CELL) == Some(Mark::Empty) {
            return Some(AiDecision {
                cell: CENTER_CELL,
                mark: computer,
                reason: ChoiceReason::TakeCenter,
            });
        }

        // 4. 防分叉：只认两条主对角线的端点对，且只在第 3 手后触发。
        //    这是对一个已知漏洞的定点补丁，不是通用的分叉求解。
        if state.moves_made == 3 && self.rng.gen::<f64>() < self.config.fork_defense_chance {
            if let Some(cell) = fork_defense_cell(&state.board, player) {
                return Some(AiDecision {
                    cell,
                    mark: computer,
                    reason: ChoiceReason::ForkDefense,
                });
            }
        }

        // 5. 随机挑一个空角。
        let corners: Vec<CellIndex> = CORNER_CELLS
            .iter()
            .copied()
            .filter(|&cell| state.board.get(cell) == Some(Mark::Empty))
            .collect();
        if let Some(&cell) = corners.choose(&mut self.rng) {
            return Some(AiDecision {
                cell,
                mark: computer,
                reason: ChoiceReason::TakeCorner,
            });
        }

        // 6. 兜底：剩余空格随机。
        let cell = *empty.choose(&mut self.rng)?;
        Some(AiDecision {
            cell,
            mark: computer,
            reason: ChoiceReason::Fallback,
        })
    }
}

/// 试探走子：对棋盘副本落子再评估，原棋盘不受影响。
fn probe_wins(board: &Board, cell: CellIndex, mark: Mark) -> bool {
    let mut hypothetical = board.clone();
    if hypothetical.place(cell, mark).is_err() {
        return false;
    }
    matches!(evaluate(&hypothetical), GameStatus::Won { winner, .. } if winner == mark)
}

/// 对角端点对的定点应对表：0/8 → 1，2/6 → 3。
fn fork_defense_cell(board: &Board, player: Mark) -> Option<CellIndex> {
    let occupied_by_player =
        |cell: CellIndex| board.get(cell) == Some(player) && !player.is_empty();

    if occupied_by_player(0) && occupied_by_player(8) && board.get(1) == Some(Mark::Empty) {
        Some(1)
    } else if occupied_by_player(2) && occupied_by_player(6) && board.get(3) == Some(Mark::Empty) {
        Some(3)
    } else {
        None
    }
}
