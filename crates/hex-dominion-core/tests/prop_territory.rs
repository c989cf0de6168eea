//! Property tests for captures and the territory partition.
//!
//! Run with: PROPTEST_CASES=5000 cargo test --release prop_territory

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use hex_dominion_core::{
    check_invariants, execute_move, renew_all_main_buildings, Board, BoardSnapshot, FieldId,
    HexCoord, MoveError, MoveOutcome, PlayerId, UnitLedger, UnitType,
};

const PLAYERS: u8 = 3;

/// Random rectangular board with owners in `0..PLAYERS`.
fn board_strategy() -> impl Strategy<Value = (u32, u32, Vec<PlayerId>)> {
    (3u32..8, 3u32..7).prop_flat_map(|(w, h)| {
        (
            Just(w),
            Just(h),
            prop::collection::vec(0..PLAYERS, (w * h) as usize),
        )
    })
}

fn build(w: u32, h: u32, owners: &[PlayerId]) -> Board {
    let cells = (0..h).flat_map(|r| {
        (0..w).map(move |q| (HexCoord::new(q as i32, r as i32), owners[(r * w + q) as usize]))
    });
    Board::from_owners(cells).unwrap()
}

fn money_of(board: &Board, player: PlayerId) -> i32 {
    board.territories_of(player).map(|t| t.money).sum()
}

/// A neighbor of `field` owned by someone else, if any.
fn attacking_neighbor(board: &Board, field: FieldId, pick: usize) -> Option<FieldId> {
    let owner = board.field(field)?.owner;
    let candidates: Vec<FieldId> = board
        .neighbors(field)
        .into_iter()
        .filter(|&n| board.field(n).is_some_and(|f| f.owner != owner))
        .collect();
    if candidates.is_empty() {
        None
    } else {
        Some(candidates[pick % candidates.len()])
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any sequence of capture attempts keeps the board consistent.
    #[test]
    fn prop_captures_keep_board_consistent(
        (w, h, owners) in board_strategy(),
        attempts in prop::collection::vec((any::<usize>(), any::<usize>()), 1..25),
    ) {
        let mut board = build(w, h, &owners);
        let mut units = UnitLedger::new();
        renew_all_main_buildings(&board, &mut units);
        let ids: Vec<_> = board.territories().map(|t| t.id).collect();
        for (i, id) in ids.into_iter().enumerate() {
            board.territory_mut(id).unwrap().money = (i as i32 % 4) * 5;
        }
        prop_assert!(check_invariants(&board, &units).is_empty());

        for (target_pick, neighbor_pick) in attempts {
            let target = target_pick % board.len();
            let Some(base) = attacking_neighbor(&board, target, neighbor_pick) else {
                continue;
            };
            let attacker = board.field(base).unwrap().owner;
            let origin = board.territory_of(base).unwrap().id;

            let baron = units.spawn(attacker, UnitType::Baron);
            units.unit_mut(baron).unwrap().can_move = true;

            let before = (board.clone(), units.clone());
            let attacker_money = money_of(&board, attacker);

            match execute_move(&mut board, &mut units, baron, target, Some(origin)) {
                Ok(MoveOutcome::Captured(report)) => {
                    prop_assert_eq!(board.field(target).unwrap().owner, attacker);
                    prop_assert_eq!(money_of(&board, attacker), attacker_money);
                    for absorbed in &report.absorbed {
                        prop_assert!(board.territory(*absorbed).is_none());
                    }
                    prop_assert_eq!(units.unit(baron).unwrap().field, Some(target));
                }
                Ok(other) => prop_assert!(false, "unexpected outcome {:?}", other),
                Err(MoveError::TooWeak { attack, defense }) => {
                    prop_assert!(attack <= defense);
                    prop_assert_eq!(&board, &before.0);
                    prop_assert_eq!(&units, &before.1);
                    units.remove(baron);
                }
                Err(err) => prop_assert!(false, "unexpected error {}", err),
            }

            let violations = check_invariants(&board, &units);
            prop_assert!(violations.is_empty(), "{:?}", violations);
        }
    }

    /// A board rebuilt from its snapshot has the same layout.
    #[test]
    fn prop_snapshot_restores_layout((w, h, owners) in board_strategy()) {
        let board = build(w, h, &owners);
        let json = board.snapshot().to_json().unwrap();
        let snapshot = BoardSnapshot::from_json(&json).unwrap();
        let restored = Board::from_snapshot(&snapshot, PLAYERS).unwrap();

        prop_assert_eq!(restored.len(), board.len());
        prop_assert_eq!(restored.territory_count(), board.territory_count());
        for f in board.fields() {
            let id = restored.field_id(&f.coord).unwrap();
            prop_assert_eq!(restored.field(id).unwrap().owner, f.owner);
        }
    }
}
