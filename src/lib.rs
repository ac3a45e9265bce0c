pub mod ai;
pub mod game;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use std::str::FromStr;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{AiAgent, AiConfig, AiDecision, AiDifficulty, ChoiceReason};
pub use game::{
    evaluate, Board, BoardError, CellIndex, GameEvent, GameState, GameStatus, IntegrityError,
    Mark, MoveAction, MoveResolution, RuleEngine, RuleError, TurnPhase, CELL_COUNT, CENTER_CELL,
    CORNER_CELLS, WIN_LINES,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
}

fn to_js_error(error: RuleError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn parse_mark(value: &str) -> Result<Mark, JsValue> {
    Mark::from_str(value).map_err(|_| JsValue::from_str(&format!("invalid mark: {value}")))
}

fn parse_difficulty(value: Option<&str>) -> AiDifficulty {
    value
        .and_then(|value| AiDifficulty::from_str(value).ok())
        .unwrap_or(AiDifficulty::Easy)
}

fn make_resolution_json(resolution: MoveResolution) -> Result<String, JsValue> {
    serde_json::to_string(&resolution).map_err(serde_to_js_error)
}

fn resolution_from_events(state: &GameState, events: Vec<GameEvent>) -> MoveResolution {
    MoveResolution::new(state.clone(), events)
}

#[derive(Serialize)]
struct AiMoveResponse {
    decision: AiDecision,
    applied: MoveResolution,
}

/// 对外的唯一门面：持有一局状态，前端只跟它交互。
#[wasm_bindgen]
pub struct GameEngine {
    state: GameState,
}

#[wasm_bindgen]
impl GameEngine {
    /// 建一个新引擎。`player_mark` 省略时玩家执 X。
    #[wasm_bindgen(constructor)]
    pub fn new(player_mark: Option<String>) -> Result<GameEngine, JsValue> {
        let mark = match player_mark {
            Some(value) => parse_mark(&value)?,
            None => Mark::X,
        };
        Ok(GameEngine {
            state: GameState::new(mark),
        })
    }

    /// 重开一局：棋盘、回合计数、结果整体重置。
    /// 传入 `player_mark` 可以同时换边，省略则沿用上一局的分配。
    pub fn new_game(&mut self, player_mark: Option<String>) -> Result<(), JsValue> {
        let mark = match player_mark {
            Some(value) => parse_mark(&value)?,
            None => self.state.player_mark,
        };
        self.state = GameState::new(mark);
        Ok(())
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state).map_err(serde_to_js_error)
    }

    pub fn set_state_json(&mut self, json: &str) -> Result<(), JsValue> {
        let state: GameState = serde_json::from_str(json).map_err(serde_to_js_error)?;
        self.state = state;
        Ok(())
    }

    pub fn status_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state.status).map_err(serde_to_js_error)
    }

    pub fn current_turn(&self) -> String {
        self.state.turn_phase().as_str().to_string()
    }

    pub fn player_mark(&self) -> String {
        self.state.player_mark.as_str().to_string()
    }

    pub fn computer_mark(&self) -> String {
        self.state.computer_mark.as_str().to_string()
    }

    pub fn moves_made(&self) -> u8 {
        self.state.moves_made
    }

    /// 玩家落子，返回序列化的 `MoveResolution`。
    /// 非玩家回合或终局后的调用会拿到对应的规则错误。
    pub fn apply_player_move(&mut self, cell: u8) -> Result<String, JsValue> {
        let action = MoveAction {
            cell,
            mark: self.state.player_mark,
        };
        let events = RuleEngine::new()
            .apply_move(&mut self.state, action)
            .map_err(to_js_error)?;
        make_resolution_json(resolution_from_events(&self.state, events))
    }

    /// 请求电脑落子并立即应用，同步返回决策与结果。
    /// 思考延迟属于表现层，见 `think_computer_move`。
    pub fn request_computer_move(&mut self, difficulty: Option<String>) -> Result<String, JsValue> {
        if self.state.is_finished() {
            return Err(to_js_error(RuleError::GameAlreadyOver));
        }
        if self.state.turn_phase() != TurnPhase::ComputerToMove {
            return Err(to_js_error(RuleError::NotYourTurn {
                mark: self.state.computer_mark,
            }));
        }

        let config = AiConfig::from_difficulty(parse_difficulty(difficulty.as_deref()));
        let mut agent = AiAgent::new(config);
        let decision = agent
            .choose_move(&self.state)
            .ok_or_else(|| to_js_error(RuleError::GameAlreadyOver))?;

        let action = MoveAction {
            cell: decision.cell,
            mark: decision.mark,
        };
        let events = RuleEngine::new()
            .apply_move(&mut self.state, action)
            .map_err(to_js_error)?;

        let response = AiMoveResponse {
            decision,
            applied: resolution_from_events(&self.state, events),
        };
        serde_json::to_string(&response).map_err(serde_to_js_error)
    }

    /// 异步版本：先等 `delay_ms` 再给出决策（不落子），用于前端节奏控制。
    pub fn think_computer_move(
        &self,
        difficulty: Option<String>,
        delay_ms: Option<u32>,
    ) -> Promise {
        let state = self.state.clone();
        let config = AiConfig::from_difficulty(parse_difficulty(difficulty.as_deref()));
        let delay = delay_ms.unwrap_or(0);

        future_to_promise(async move {
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let mut agent = AiAgent::new(config);
            let decision = agent.choose_move(&state);
            let json = serde_json::to_string(&decision).map_err(serde_to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }
}

/// 跨局比分。记分属于表现层，所以它独立于 `GameState`，由前端自己持有。
#[wasm_bindgen]
#[derive(Default)]
pub struct ScoreBoard {
    pub player: u32,
    pub computer: u32,
    pub ties: u32,
}

#[wasm_bindgen]
impl ScoreBoard {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ScoreBoard {
        ScoreBoard::default()
    }

    /// 按一局的最终 `GameStatus` 记分；进行中的状态不计。
    pub fn record_json(&mut self, status_json: &str, player_mark: &str) -> Result<(), JsValue> {
        let status: GameStatus = serde_json::from_str(status_json).map_err(serde_to_js_error)?;
        let player = parse_mark(player_mark)?;
        match status {
            GameStatus::Won { winner, .. } if winner == player => self.player += 1,
            GameStatus::Won { .. } => self.computer += 1,
            GameStatus::Tie => self.ties += 1,
            GameStatus::InProgress => {}
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = ScoreBoard::default();
    }
}

/// 返回一局初始状态，方便前端调试或初始化。
#[wasm_bindgen(js_name = "createGameState")]
pub fn create_game_state(player_mark: Option<String>) -> Result<JsValue, JsValue> {
    let mark = match player_mark {
        Some(value) => parse_mark(&value)?,
        None => Mark::X,
    };
    to_value(&GameState::new(mark)).map_err(JsValue::from)
}

/// 纯函数胜负评估：不修改传入状态。
#[wasm_bindgen(js_name = "evaluateBoard")]
pub fn evaluate_board(state: JsValue) -> Result<JsValue, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    to_value(&evaluate(&state.board)).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "applyMove")]
pub fn apply_move(state: JsValue, action: JsValue) -> Result<JsValue, JsValue> {
    let mut state: GameState = from_value(state).map_err(JsValue::from)?;
    let action: MoveAction = from_value(action).map_err(JsValue::from)?;
    let engine = RuleEngine::new();
    match engine.apply_move(&mut state, action) {
        Ok(events) => to_value(&MoveResolution::new(state, events)).map_err(JsValue::from),
        Err(error) => Err(to_js_error(error)),
    }
}

#[wasm_bindgen(js_name = "validateState")]
pub fn validate_state(state: JsValue) -> Result<(), JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    state
        .integrity_check()
        .map_err(|error| to_js_error(RuleError::IntegrityViolation { error }))?;
    Ok(())
}

/// 只计算电脑的决策，不应用。`seed` 固定时决策可复现。
#[wasm_bindgen(js_name = "computeAiMove")]
pub fn compute_ai_move(
    state: JsValue,
    difficulty: Option<String>,
    seed: Option<u64>,
) -> Result<JsValue, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    let config = AiConfig::from_difficulty(parse_difficulty(difficulty.as_deref()));
    let mut agent = match seed {
        Some(seed) => AiAgent::with_seed(config, seed),
        None => AiAgent::new(config),
    };
    let decision = agent.choose_move(&state);
    to_value(&decision).map_err(JsValue::from)
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
