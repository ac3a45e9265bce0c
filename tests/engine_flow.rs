//! Full-game flows through the core engine types, the way the wasm façade
//! drives them: player moves through `RuleEngine`, computer moves chosen by
//! a seeded `AiAgent` and applied through the same executor.

use tictactoe_core::{
    AiAgent, AiConfig, AiDifficulty, GameEvent, GameState, GameStatus, Mark, MoveAction,
    RuleEngine, RuleError, TurnPhase,
};

fn lowest_empty(state: &GameState) -> u8 {
    *state
        .board
        .empty_cells()
        .first()
        .expect("an unfinished game always has an empty cell")
}

#[test]
fn player_move_is_rejected_on_the_computers_turn() {
    // Player takes O, so X (the computer) opens.
    let mut state = GameState::new(Mark::O);
    assert_eq!(state.turn_phase(), TurnPhase::ComputerToMove);

    let before = state.clone();
    let mark = state.player_mark;
    let result = RuleEngine::new().apply_move(&mut state, MoveAction { cell: 0, mark });

    assert_eq!(result, Err(RuleError::NotYourTurn { mark: Mark::O }));
    assert_eq!(state, before, "a rejected move must not change anything");
}

#[test]
fn scripted_player_versus_seeded_computer_runs_to_completion() {
    let mut state = GameState::new(Mark::X);
    let engine = RuleEngine::new();
    let mut agent = AiAgent::with_seed(AiConfig::from_difficulty(AiDifficulty::Medium), 42);

    let mut turns = 0;
    while !state.is_finished() {
        turns += 1;
        assert!(turns <= 9, "a game can never exceed nine moves");

        let phase_before = state.turn_phase();
        let action = match phase_before {
            TurnPhase::PlayerToMove => MoveAction {
                cell: lowest_empty(&state),
                mark: state.player_mark,
            },
            TurnPhase::ComputerToMove => {
                let decision = agent
                    .choose_move(&state)
                    .expect("the computer can always move in an unfinished game");
                MoveAction {
                    cell: decision.cell,
                    mark: decision.mark,
                }
            }
            TurnPhase::GameOver => unreachable!("loop condition excludes finished games"),
        };

        engine
            .apply_move(&mut state, action)
            .expect("both sides only ever submit legal moves");

        // Accounting and alternation invariants hold after every move.
        assert_eq!(state.board.empty_cells().len() as u8 + state.moves_made, 9);
        state.integrity_check().expect("state stays consistent");
        if !state.is_finished() {
            assert_ne!(state.turn_phase(), phase_before, "the turn must toggle");
        }
    }

    assert_eq!(state.turn_phase(), TurnPhase::GameOver);
    match &state.status {
        GameStatus::Won { line, .. } => {
            assert!(state
                .event_log
                .iter()
                .any(|event| matches!(event, GameEvent::GameWon { line: l, .. } if l == line)));
        }
        GameStatus::Tie => {
            assert!(state
                .event_log
                .iter()
                .any(|event| matches!(event, GameEvent::GameTied)));
        }
        GameStatus::InProgress => panic!("loop only exits on a terminal status"),
    }

    // Frozen scheduler: nothing goes through after the game is over.
    let mark = state.current_mark;
    let result = engine.apply_move(&mut state, MoveAction { cell: 0, mark });
    assert_eq!(result, Err(RuleError::GameAlreadyOver));
}

#[test]
fn medium_computer_never_loses_to_a_naive_opponent() {
    // The lowest-empty-cell player is easy prey: across many seeds the ladder
    // should win or tie every game, since it always blocks single threats.
    for seed in 0..20 {
        let mut state = GameState::new(Mark::X);
        let engine = RuleEngine::new();
        let mut agent = AiAgent::with_seed(AiConfig::from_difficulty(AiDifficulty::Medium), seed);

        while !state.is_finished() {
            let action = match state.turn_phase() {
                TurnPhase::PlayerToMove => MoveAction {
                    cell: lowest_empty(&state),
                    mark: state.player_mark,
                },
                _ => {
                    let decision = agent.choose_move(&state).expect("computer can move");
                    MoveAction {
                        cell: decision.cell,
                        mark: decision.mark,
                    }
                }
            };
            engine.apply_move(&mut state, action).expect("legal move");
        }

        if let GameStatus::Won { winner, .. } = &state.status {
            assert_eq!(
                *winner, state.computer_mark,
                "seed {seed}: the ladder must at least block a lowest-cell player"
            );
        }
    }
}

#[test]
fn new_game_replaces_the_whole_state_atomically() {
    let mut state = GameState::new(Mark::X);
    let engine = RuleEngine::new();
    engine
        .apply_move(&mut state, MoveAction { cell: 4, mark: Mark::X })
        .expect("legal opening move");
    assert_eq!(state.moves_made, 1);

    // Switching sides requires a fresh game; board, count and log all reset.
    state = GameState::new(Mark::O);
    assert_eq!(state.moves_made, 0);
    assert_eq!(state.board.empty_cells().len(), 9);
    assert!(state.event_log.is_empty());
    assert_eq!(state.turn_phase(), TurnPhase::ComputerToMove);
}
