//! Property tests for the squad rules.
//!
//! Random player pools are pushed through random sequences of add / remove / role changes and
//! every squad observed along the way is checked against the caps, the budget and the role rules.

use std::collections::HashSet;

use fpl_terminal::catalog::{Player, PlayerId, PlayerStats, Position};
use fpl_terminal::squad::{BUDGET_CAP, CLUB_QUOTA, Role, SQUAD_SIZE, Squad, position_cap};
use proptest::prelude::*;

const CLUBS: [&str; 6] = ["Arsenal", "Chelsea", "Everton", "Fulham", "Spurs", "Wolves"];

#[derive(Debug, Clone)]
enum Op {
    Add(usize),
    Remove(usize),
    Assign(usize, Role),
}

// ── Strategies ───────────────────────────────────────────────────────

fn arb_position() -> impl Strategy<Value = Position> {
    prop_oneof![
        Just(Position::GK),
        Just(Position::DEF),
        Just(Position::MID),
        Just(Position::FWD),
    ]
}

fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Captain), Just(Role::ViceCaptain)]
}

/// Ids are assigned by index so the pool never repeats one.
fn arb_pool() -> impl Strategy<Value = Vec<Player>> {
    prop::collection::vec((arb_position(), 0..CLUBS.len(), 40u32..=140), 1..40).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(idx, (position, club, price))| Player {
                id: idx as PlayerId + 1,
                name: format!("Player {}", idx + 1),
                club: CLUBS[club].to_string(),
                club_id: Some(club as u32 + 1),
                position,
                price_tenths: price,
                stats: PlayerStats::default(),
            })
            .collect()
    })
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            6 => (0usize..64).prop_map(Op::Add),
            2 => (0usize..64).prop_map(Op::Remove),
            2 => ((0usize..64), arb_role()).prop_map(|(i, r)| Op::Assign(i, r)),
        ],
        0..80,
    )
}

fn assert_invariants(squad: &Squad) -> Result<(), TestCaseError> {
    prop_assert!(squad.len() <= SQUAD_SIZE);

    let ids: HashSet<PlayerId> = squad.member_ids().into_iter().collect();
    prop_assert_eq!(ids.len(), squad.len());

    let counts = squad.position_counts();
    for position in Position::ALL {
        prop_assert!(counts.get(position) <= position_cap(position));
    }
    for (_, count) in squad.club_counts() {
        prop_assert!(count <= CLUB_QUOTA);
    }

    prop_assert!(squad.total_cost() <= BUDGET_CAP);
    prop_assert_eq!(
        squad.remaining_budget().tenths() + squad.total_cost().tenths(),
        BUDGET_CAP.tenths()
    );

    if let Some(c) = squad.captain() {
        prop_assert!(squad.contains(c));
    }
    if let Some(v) = squad.vice_captain() {
        prop_assert!(squad.contains(v));
    }
    if let (Some(c), Some(v)) = (squad.captain(), squad.vice_captain()) {
        prop_assert_ne!(c, v);
    }
    if squad.len() < SQUAD_SIZE {
        prop_assert!(!squad.is_submittable());
    }
    Ok(())
}

fn apply(squad: &Squad, pool: &[Player], op: &Op) -> Squad {
    match op {
        Op::Add(i) => squad.add(&pool[i % pool.len()]).unwrap_or_else(|_| squad.clone()),
        Op::Remove(i) => squad.remove(pool[i % pool.len()].id),
        Op::Assign(i, role) => squad
            .assign_role(pool[i % pool.len()].id, *role)
            .unwrap_or_else(|_| squad.clone()),
    }
}

proptest! {
    /// Every squad reachable through the public operations satisfies all rules.
    #[test]
    fn invariants_hold_after_every_operation(pool in arb_pool(), ops in arb_ops()) {
        let mut squad = Squad::new();
        assert_invariants(&squad)?;
        for op in &ops {
            squad = apply(&squad, &pool, op);
            assert_invariants(&squad)?;
        }
    }

    /// `can_add` answers exactly what `add` would do, and a refused add leaves the squad alone.
    #[test]
    fn can_add_agrees_with_add(pool in arb_pool(), ops in arb_ops(), probe in 0usize..64) {
        let mut squad = Squad::new();
        for op in &ops {
            squad = apply(&squad, &pool, op);
        }
        let candidate = &pool[probe % pool.len()];
        let before = squad.clone();
        let predicted = squad.can_add(candidate);
        match squad.add(candidate) {
            Ok(next) => {
                prop_assert!(predicted);
                prop_assert_eq!(next.len(), before.len() + 1);
                prop_assert_eq!(next.members().last().map(|p| p.id), Some(candidate.id));
            }
            Err(violation) => {
                prop_assert!(!predicted);
                prop_assert_eq!(squad.check_add(candidate), Err(violation));
            }
        }
        prop_assert_eq!(squad, before);
    }

    #[test]
    fn remove_is_idempotent(pool in arb_pool(), ops in arb_ops(), probe in 0usize..64) {
        let mut squad = Squad::new();
        for op in &ops {
            squad = apply(&squad, &pool, op);
        }
        let id = pool[probe % pool.len()].id;
        let once = squad.remove(id);
        prop_assert!(!once.contains(id));
        prop_assert_eq!(once.remove(id), once.clone());
        if squad.captain() == Some(id) {
            prop_assert_eq!(once.captain(), None);
        }
        if squad.vice_captain() == Some(id) {
            prop_assert_eq!(once.vice_captain(), None);
        }
    }

    /// Any mix of role assignments over a full squad keeps captain and vice apart.
    #[test]
    fn roles_stay_disjoint(
        assignments in prop::collection::vec((0usize..SQUAD_SIZE, arb_role()), 0..40),
    ) {
        let xi: Vec<Player> = (0..SQUAD_SIZE)
            .map(|idx| Player {
                id: idx as PlayerId + 1,
                name: format!("Player {}", idx + 1),
                club: format!("Club {idx}"),
                club_id: None,
                position: match idx {
                    0 => Position::GK,
                    1..=4 => Position::DEF,
                    5..=8 => Position::MID,
                    _ => Position::FWD,
                },
                price_tenths: 50,
                stats: PlayerStats::default(),
            })
            .collect();
        let mut squad = Squad::apply_recommended(&xi, None).expect("cheap XI is legal");
        for (idx, role) in assignments {
            squad = squad.assign_role(xi[idx].id, role).expect("members can take roles");
            if let (Some(c), Some(v)) = (squad.captain(), squad.vice_captain()) {
                prop_assert_ne!(c, v);
            }
            prop_assert_eq!(
                squad.is_submittable(),
                squad.captain().is_some() && squad.vice_captain().is_some()
            );
        }
    }
}
