use match3_wasm::engine::{Engine, MoveOutcome, PassKind, Step};
use match3_wasm::matcher::find_matches;
use match3_wasm::rng::ScriptedColors;
use match3_wasm::special::{Detonation, SpecialSpawn};
use match3_wasm::types::{index, Board, Special, CELL_COUNT};
use match3_wasm::{EngineConfig, EngineError, InvalidMove};

fn scripted(text: &str, colors: Vec<u8>) -> Engine<ScriptedColors> {
    let board = Board::parse(text).unwrap();
    Engine::with_board(EngineConfig::default(), board, ScriptedColors::new(colors)).unwrap()
}

fn resolved(outcome: MoveOutcome) -> match3_wasm::Resolution {
    match outcome {
        MoveOutcome::Resolved(resolution) => resolution,
        other => panic!("expected a resolved turn, got {other:?}"),
    }
}

#[test]
fn test_seeded_playthrough_keeps_board_stable_and_playable() {
    let mut engine = Engine::from_config(EngineConfig::default().with_seed(2024)).unwrap();

    for _ in 0..150 {
        let before = engine.score();
        let hint = engine.query_hint().expect("idle board always has a move");
        let outcome = engine.attempt_swap(hint.from, hint.to).unwrap();

        let resolution = outcome.resolution().expect("hinted move is legal");
        assert_eq!(engine.score(), before + resolution.score_delta);
        assert!(!engine.is_busy());
        assert!(engine.board().is_full());
        assert!(engine.board().cells().iter().flatten().all(|t| t.color < 4));
        assert!(find_matches(engine.board()).is_empty());
        assert!(engine.query_hint().is_some());
    }
}

#[test]
fn test_same_seed_same_game() {
    let config = EngineConfig::default().with_seed(99);
    let mut a = Engine::from_config(config.clone()).unwrap();
    let mut b = Engine::from_config(config).unwrap();
    assert!(a.board() == b.board());

    for _ in 0..20 {
        let mv = a.query_hint().unwrap();
        assert_eq!(b.query_hint(), Some(mv));
        a.attempt_swap(mv.from, mv.to).unwrap();
        b.attempt_swap(mv.from, mv.to).unwrap();
        assert!(a.board() == b.board());
        assert_eq!(a.score(), b.score());
    }
}

#[test]
fn test_invalid_swaps_leave_everything_untouched() {
    let mut engine = Engine::from_config(EngineConfig::default().with_seed(5)).unwrap();
    let board = engine.board().clone();

    // Find an adjacent pair that does not match.
    let dud = (0..CELL_COUNT - 1)
        .filter(|&i| (i + 1) % 7 != 0)
        .find(|&i| {
            let mut probe = board.clone();
            probe.swap(i, i + 1);
            find_matches(&probe).is_empty()
        })
        .unwrap();

    let outcome = engine.attempt_swap(dud, dud + 1).unwrap();
    assert!(matches!(outcome, MoveOutcome::Invalid { reason: InvalidMove::NoMatch }));
    let outcome = engine.attempt_swap(0, 8).unwrap();
    assert!(matches!(outcome, MoveOutcome::Invalid { reason: InvalidMove::NotAdjacent }));
    let outcome = engine.attempt_swap(3, 3).unwrap();
    assert!(matches!(outcome, MoveOutcome::Invalid { reason: InvalidMove::NotAdjacent }));

    assert!(engine.board() == &board);
    assert_eq!(engine.score(), 0);
    assert!(!engine.is_busy());
}

#[test]
fn test_vertical_swap_into_horizontal_run_makes_vertical_rocket() {
    let mut engine = scripted(
        "0 1 2 3 0 1 2
         2 3 0 1 2 3 0
         0 1 1 0 1 0 2
         2 3 0 1 2 3 0
         0 1 2 3 0 1 2
         2 3 0 1 2 3 0
         0 1 2 3 0 1 2",
        vec![0, 1, 2, 3],
    );
    let resolution = resolved(engine.attempt_swap(index(1, 3), index(2, 3)).unwrap());

    let pass = &resolution.passes[0];
    assert_eq!(pass.removed, vec![15, 16, 18]);
    assert_eq!(
        resolution.specials_created,
        vec![SpecialSpawn {
            index: 17,
            color: 1,
            kind: Special::RocketVertical
        }]
    );
    assert_eq!(engine.board().special(17), Some(Special::RocketVertical));
    assert_eq!(engine.score(), 30);
}

#[test]
fn test_t_shape_makes_bomb_at_swap_target() {
    let mut engine = scripted(
        "0 1 2 3 0 1 2
         2 3 0 1 0 3 0
         0 1 2 0 1 0 2
         2 3 0 1 0 3 0
         0 1 2 3 0 1 2
         2 3 0 1 2 3 0
         0 1 2 3 0 1 2",
        vec![0, 1, 2, 3],
    );
    let resolution = resolved(engine.attempt_swap(index(1, 4), index(2, 4)).unwrap());

    assert_eq!(resolution.combo, 1);
    assert_eq!(resolution.passes[0].removed, vec![17, 19, 25, 32]);
    assert_eq!(
        resolution.specials_created,
        vec![SpecialSpawn {
            index: index(2, 4),
            color: 0,
            kind: Special::Bomb
        }]
    );
    assert_eq!(resolution.score_delta, 40);
    // The bomb dropped two rows into the vertical arm's gaps.
    assert_eq!(engine.board().special(index(4, 4)), Some(Special::Bomb));
    assert_eq!(engine.board().special_count(), 1);
}

#[test]
fn test_crossing_runs_leave_one_bomb_at_the_swap_cell() {
    // Row 2 becomes a run of five and column 2 a run of three through the
    // moved token; the merged component of seven leaves a single bomb.
    let mut engine = scripted(
        "0 1 0 3 0 1 2
         2 3 0 1 2 3 0
         0 0 1 0 0 1 2
         2 3 0 1 2 3 0
         0 1 2 3 0 1 2
         2 3 0 1 2 3 0
         0 1 2 3 0 1 2",
        vec![0, 1, 2, 3],
    );
    let resolution = resolved(engine.attempt_swap(index(3, 2), index(2, 2)).unwrap());

    assert_eq!(resolution.passes[0].removed, vec![2, 9, 14, 15, 17, 18]);
    assert_eq!(
        resolution.specials_created,
        vec![SpecialSpawn {
            index: 16,
            color: 0,
            kind: Special::Bomb
        }]
    );
    assert_eq!(engine.score(), 60);
    assert_eq!(engine.board().special(16), Some(Special::Bomb));
    assert_eq!(engine.board().special_count(), 1);
}

#[test]
fn test_rocket_chains_into_bomb() {
    let mut engine = scripted(
        "0 1 2 3 0 1 2
         2 3 0 1 2 3 0
         0 1 2 3 0 1 2
         2h 3 0 1 2b 3 0
         0 1 2 3 0 1 2
         2 3 0 1 2 3 0
         0 1 2 3 0 1 2",
        vec![0, 1, 2, 3],
    );
    let resolution = resolved(engine.activate_special(index(3, 0)).unwrap());

    let blast = &resolution.passes[0];
    assert_eq!(blast.kind, PassKind::Detonation);
    let mut expected: Vec<usize> = (21..28).collect();
    for row in 1..6 {
        for col in 2..7 {
            expected.push(index(row, col));
        }
    }
    expected.sort_unstable();
    expected.dedup();
    assert_eq!(expected.len(), 27);
    assert_eq!(blast.removed, expected);
    assert_eq!(
        blast.triggered,
        vec![
            Detonation {
                index: 21,
                kind: Special::RocketHorizontal
            },
            Detonation {
                index: 25,
                kind: Special::Bomb
            },
        ]
    );

    // The refill lines up five vertical runs of three.
    assert_eq!(resolution.passes.len(), 2);
    assert_eq!(resolution.passes[1].kind, PassKind::Cascade { combo: 1 });
    assert_eq!(resolution.passes[1].removed.len(), 15);
    assert_eq!(resolution.combo, 1);
    assert_eq!(engine.score(), 420);
    assert_eq!(engine.board().special_count(), 0);
}

#[test]
fn test_cascade_awards_combo_bonus() {
    let mut engine = scripted(
        "1 2 2 1 0 2 0
         0 2 1 3 3 0 0
         1 3 0 3 0 1 1
         1 0 1 1 2 0 3
         2 3 2 3 0 1 3
         1 3 2 3 3 0 1
         0 1 1 2 3 1 0",
        vec![0, 1, 2, 3],
    );
    let resolution = resolved(engine.attempt_swap(15, 22).unwrap());

    let removed: Vec<_> = resolution.passes.iter().map(|p| p.removed.clone()).collect();
    assert_eq!(removed, vec![vec![22, 29, 36], vec![28, 29, 30], vec![21, 28, 35]]);
    let kinds: Vec<_> = resolution.passes.iter().map(|p| p.kind).collect();
    assert_eq!(
        kinds,
        vec![
            PassKind::Cascade { combo: 1 },
            PassKind::Cascade { combo: 2 },
            PassKind::Cascade { combo: 3 },
        ]
    );
    assert_eq!(resolution.combo, 3);
    // 9 cells at 10 points, plus 3 × 20 bonus.
    assert_eq!(resolution.score_delta, 150);
    assert_eq!(engine.score(), 150);
    assert_eq!(resolution.removed_total(), 9);
}

#[test]
fn test_deadlock_after_turn_reshuffles() {
    // Clearing column 0 and refilling 0, 2, 0, ... rebuilds the deadlocked
    // diagonal layout.
    let mut engine = scripted(
        "0 1 2 3 0 1 2
         2 3 0 1 2 3 0
         0 1 2 3 0 1 2
         2v 3 0 1 2 3 0
         0 1 2 3 0 1 2
         2 3 0 1 2 3 0
         0 1 2 3 0 1 2",
        vec![0, 2],
    );
    let outcome = engine.activate_special(index(3, 0)).unwrap();
    let (resolution, board) = match outcome {
        MoveOutcome::Reshuffled { resolution, board } => (resolution, board),
        other => panic!("expected a reshuffle, got {other:?}"),
    };

    assert_eq!(resolution.combo, 0);
    assert_eq!(resolution.passes.len(), 1);
    assert_eq!(resolution.passes[0].removed, vec![0, 7, 14, 21, 28, 35, 42]);
    let deadlocked = &resolution.passes[0].board;
    assert!(find_matches(deadlocked).is_empty());

    // Reshuffling is free.
    assert_eq!(engine.score(), 70);
    assert!(engine.board() == &board);
    assert!(find_matches(&board).is_empty());
    assert!(engine.query_hint().is_some());
    assert_eq!(board.color(0), Some(2));
    assert_eq!(board.color(1), Some(0));
}

#[test]
fn test_swapping_a_special_detonates_it() {
    let mut engine = scripted(
        "0 1 2 3 0 1 2
         2 3 0 1 2 3 0
         0 1 2 3 0 1 2
         2v 3 0 1 2 3 0
         0 1 2 3 0 1 2
         2 3 0 1 2 3 0
         0 1 2 3 0 1 2",
        vec![0, 1, 2, 3],
    );
    // The rocket moves to (3, 1) before it goes off.
    let outcome = engine.attempt_swap(index(3, 0), index(3, 1)).unwrap();
    let resolution = outcome.resolution().unwrap();
    let blast = &resolution.passes[0];
    assert_eq!(blast.kind, PassKind::Detonation);
    assert_eq!(blast.removed, (0..7).map(|row| index(row, 1)).collect::<Vec<_>>());
    assert_eq!(
        blast.triggered,
        vec![Detonation {
            index: index(3, 1),
            kind: Special::RocketVertical
        }]
    );
}

#[test]
fn test_step_by_step_matches_one_shot() {
    const COMBO: &str = "1 2 2 1 0 2 0
         0 2 1 3 3 0 0
         1 3 0 3 0 1 1
         1 0 1 1 2 0 3
         2 3 2 3 0 1 3
         1 3 2 3 3 0 1
         0 1 1 2 3 1 0";
    let mut one_shot = scripted(COMBO, vec![0, 1, 2, 3]);
    let expected = resolved(one_shot.attempt_swap(15, 22).unwrap());

    let mut paced = scripted(COMBO, vec![0, 1, 2, 3]);
    paced.begin_swap(15, 22).unwrap();
    let mut reports = Vec::new();
    let outcome = loop {
        match paced.step().unwrap() {
            Step::Pass(report) => {
                assert!(paced.is_busy());
                reports.push(report);
            }
            Step::Finished(outcome) => break outcome,
        }
    };

    assert_eq!(reports.len(), 3);
    for (stepped, whole) in reports.iter().zip(&expected.passes) {
        assert_eq!(stepped.removed, whole.removed);
        assert!(stepped.board == whole.board);
    }
    assert_eq!(resolved(outcome).score_delta, 150);
    assert!(paced.board() == one_shot.board());
    assert_eq!(paced.step().err(), Some(EngineError::NotResolving));
}

#[test]
fn test_snapshot_serializes_for_the_host() {
    let engine = scripted(
        "0 1 2 3 0 1 2
         2 3 0 1 2 3 0
         0 1 2 3 0 1 2
         2v 3 0 1 2 3 0
         0 1 2 3 0 1 2
         2 3 0 1 2 3 0
         0 1 2 3 0 1 2",
        vec![0],
    );
    let json = serde_json::to_value(engine.snapshot()).unwrap();
    assert_eq!(json["score"], 0);
    assert_eq!(json["busy"], false);
    assert_eq!(json["board"].as_array().unwrap().len(), CELL_COUNT);
    assert_eq!(json["board"][21]["color"], 2);
    assert_eq!(json["board"][21]["special"], "rocket-vertical");
    assert!(json["board"][0]["special"].is_null());

    let hint = serde_json::to_value(engine.query_hint().unwrap()).unwrap();
    assert!(hint["from"].is_u64() && hint["to"].is_u64());
}

#[test]
fn test_matched_special_detonates_and_survivor_still_gets_its_rocket() {
    // The vertical rocket at (1, 3) is part of the new four-run in column 3.
    // It goes off during the match pass and its column blast sweeps up the
    // survivor cell too.
    let mut engine = scripted(
        "0 1 2 3 0 1 2
         2 3 0 1v 2 3 0
         0 1 2 1 0 1 2
         2 3 1 0 2 3 0
         0 1 2 1 0 1 2
         2 3 0 2 2 3 0
         0 1 2 3 0 1 2",
        vec![0, 1, 2, 3],
    );
    let resolution = resolved(engine.attempt_swap(index(3, 2), index(3, 3)).unwrap());

    assert_eq!(resolution.passes.len(), 1);
    let pass = &resolution.passes[0];
    assert_eq!(pass.kind, PassKind::Cascade { combo: 1 });
    assert_eq!(pass.removed, vec![3, 10, 17, 24, 31, 38, 45]);
    assert_eq!(
        pass.triggered,
        vec![Detonation {
            index: index(1, 3),
            kind: Special::RocketVertical
        }]
    );
    assert_eq!(
        pass.spawned,
        vec![SpecialSpawn {
            index: index(3, 3),
            color: 1,
            kind: Special::RocketHorizontal
        }]
    );
    assert_eq!(pass.points, 70);
    assert_eq!(engine.score(), 70);

    // Placed after clearing, then dropped to the floor of the empty column.
    assert_eq!(engine.board().special(index(6, 3)), Some(Special::RocketHorizontal));
    assert_eq!(engine.board().special_count(), 1);
}
