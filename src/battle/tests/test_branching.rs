use crate::battle::branch::total_probability;
use crate::battle::engine::{resolve_turn, ResolveOptions};
use crate::battle::instructions::{apply, BattleInstruction};
use crate::battle::state::{Action, SideId};
use crate::battle::tests::common::{
    create_team_battle, create_test_battle, dex, single_damage_to, TestPokemonBuilder,
};
use pretty_assertions::assert_eq;
use schema::{Move, Species, Stat, StatusCondition};

fn probabilities(outcomes: &[crate::battle::branch::WeightedOutcome]) -> Vec<f64> {
    outcomes.iter().map(|o| o.probability).collect()
}

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
}

/// A fully accurate, no-secondary damaging move with no modifiers produces
/// exactly one leaf at probability 1.0 whose Damage edit matches the formula.
#[test]
fn test_plain_move_is_a_single_certain_leaf() {
    let state = create_test_battle(
        TestPokemonBuilder::new(Species::Snorlax, 50)
            .with_moves(vec![Move::Surf])
            .build(),
        TestPokemonBuilder::new(Species::Machamp, 50).build(),
    );

    let outcomes = resolve_turn(
        &state,
        dex(),
        Action::Move(Move::Surf),
        Action::None,
        &ResolveOptions::default(),
    )
    .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_close(outcomes[0].probability, 1.0);
    assert!(!outcomes[0].frozen);
    assert_eq!(outcomes[0].instructions, vec![
        BattleInstruction::DecrementPP {
            side: SideId::User,
            move_: Move::Surf,
            amount: 1,
        },
        BattleInstruction::SetLastUsedMove {
            side: SideId::User,
            move_: Some(Move::Surf),
            previous: None,
        },
        BattleInstruction::Damage {
            side: SideId::Opponent,
            amount: 31,
        },
    ]);
}

/// An 80%-accuracy move with no secondary effects yields two leaves: the hit
/// with its Damage edit, and a frozen miss with no further edits.
#[test]
fn test_inaccurate_move_splits_into_hit_and_frozen_miss() {
    let state = create_test_battle(
        TestPokemonBuilder::new(Species::Blastoise, 50)
            .with_moves(vec![Move::HydroPump])
            .build(),
        TestPokemonBuilder::new(Species::Snorlax, 50).build(),
    );

    let outcomes = resolve_turn(
        &state,
        dex(),
        Action::Move(Move::HydroPump),
        Action::None,
        &ResolveOptions::default(),
    )
    .unwrap();

    assert_eq!(outcomes.len(), 2);
    assert_close(total_probability(&outcomes), 1.0);

    let hit = outcomes
        .iter()
        .find(|o| !o.frozen)
        .expect("one live hit leaf");
    let miss = outcomes.iter().find(|o| o.frozen).expect("one frozen miss");
    assert_close(hit.probability, 0.8);
    assert_close(miss.probability, 0.2);
    assert_eq!(single_damage_to(hit, SideId::Opponent), 56);
    // The miss still paid PP and recorded the attempt, nothing more.
    assert_eq!(miss.instructions.len(), 2);
}

/// Mutual 30%-chance status moves: the paralysis inflicted by the first
/// mover gates the second mover's action, so the turn fans out into five
/// leaves whose probabilities are products of the independent rolls.
#[test]
fn test_mutual_secondary_status_product_of_branches() {
    let state = create_test_battle(
        TestPokemonBuilder::new(Species::Machamp, 50)
            .with_moves(vec![Move::BodySlam])
            .build(),
        TestPokemonBuilder::new(Species::Snorlax, 50)
            .with_moves(vec![Move::BodySlam])
            .build(),
    );

    let outcomes = resolve_turn(
        &state,
        dex(),
        Action::Move(Move::BodySlam),
        Action::Move(Move::BodySlam),
        &ResolveOptions::default(),
    )
    .unwrap();

    assert_eq!(outcomes.len(), 5);
    assert_close(total_probability(&outcomes), 1.0);

    let mut probs = probabilities(&outcomes);
    probs.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let expected = {
        let mut e = [
            0.3 * 0.25,        // paralyzed and fully immobilized
            0.3 * 0.75 * 0.3,  // paralyzed, acts, paralyzes back
            0.3 * 0.75 * 0.7,  // paralyzed, acts, no return status
            0.7 * 0.3,         // clean, acts, paralyzes back
            0.7 * 0.7,         // clean, acts, no status either way
        ];
        e.sort_by(|a, b| a.partial_cmp(b).unwrap());
        e
    };
    for (got, want) in probs.iter().zip(expected.iter()) {
        assert_close(*got, *want);
    }
}

/// If both Pokemon already carry a status, the 30% secondaries cannot
/// trigger and the whole turn collapses into a single certain leaf.
#[test]
fn test_impossible_secondaries_never_fork() {
    let state = create_test_battle(
        TestPokemonBuilder::new(Species::Machamp, 50)
            .with_moves(vec![Move::BodySlam])
            .with_status(StatusCondition::Burn)
            .build(),
        TestPokemonBuilder::new(Species::Snorlax, 50)
            .with_moves(vec![Move::BodySlam])
            .with_status(StatusCondition::Burn)
            .build(),
    );

    let outcomes = resolve_turn(
        &state,
        dex(),
        Action::Move(Move::BodySlam),
        Action::Move(Move::BodySlam),
        &ResolveOptions::default(),
    )
    .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_close(outcomes[0].probability, 1.0);
}

/// A phazing move against a side with two alive bench members yields one
/// leaf per replacement at half weight, each with its own Switch edit.
#[test]
fn test_forced_switch_fans_out_uniformly() {
    let state = create_team_battle(
        vec![TestPokemonBuilder::new(Species::Machamp, 50)
            .with_moves(vec![Move::Roar])
            .build()],
        vec![
            TestPokemonBuilder::new(Species::Snorlax, 50).build(),
            TestPokemonBuilder::new(Species::Blastoise, 50).build(),
            TestPokemonBuilder::new(Species::Venusaur, 50).build(),
        ],
    );

    let outcomes = resolve_turn(
        &state,
        dex(),
        Action::Move(Move::Roar),
        Action::None,
        &ResolveOptions::default(),
    )
    .unwrap();

    assert_eq!(outcomes.len(), 2);
    let mut switch_targets = Vec::new();
    for outcome in &outcomes {
        assert_close(outcome.probability, 0.5);
        assert!(outcome.frozen, "a phased-out branch is terminal");
        let to_slot = outcome
            .instructions
            .iter()
            .find_map(|i| match i {
                BattleInstruction::Switch { to_slot, .. } => Some(*to_slot),
                _ => None,
            })
            .expect("each leaf carries a Switch edit");
        switch_targets.push(to_slot);
    }
    switch_targets.sort();
    assert_eq!(switch_targets, vec![1, 2]);
}

/// Probability is conserved across an intentionally messy turn: imperfect
/// accuracy, confusion infliction, confusion self-hit gating, and a second
/// accuracy roll.
#[test]
fn test_probability_conservation_on_messy_turn() {
    let state = create_test_battle(
        TestPokemonBuilder::new(Species::Gengar, 50)
            .with_moves(vec![Move::Hurricane])
            .build(),
        TestPokemonBuilder::new(Species::Gyarados, 50)
            .with_moves(vec![Move::AirSlash])
            .build(),
    );

    let outcomes = resolve_turn(
        &state,
        dex(),
        Action::Move(Move::Hurricane),
        Action::Move(Move::AirSlash),
        &ResolveOptions::default(),
    )
    .unwrap();

    assert!(outcomes.len() >= 4);
    assert_close(total_probability(&outcomes), 1.0);
}

/// Crit branching is opt-in; with it enabled a plain move becomes a
/// two-leaf distribution whose weights are the crit rate and its complement.
#[test]
fn test_crit_branching_splits_by_crit_rate() {
    let state = create_test_battle(
        TestPokemonBuilder::new(Species::Snorlax, 50)
            .with_moves(vec![Move::Surf])
            .build(),
        TestPokemonBuilder::new(Species::Machamp, 50).build(),
    );

    let options = ResolveOptions {
        branch_crits: true,
        ..ResolveOptions::default()
    };
    let outcomes = resolve_turn(
        &state,
        dex(),
        Action::Move(Move::Surf),
        Action::None,
        &options,
    )
    .unwrap();

    assert_eq!(outcomes.len(), 2);
    assert_close(total_probability(&outcomes), 1.0);
    let crit_leaf = outcomes
        .iter()
        .min_by(|a, b| a.probability.partial_cmp(&b.probability).unwrap())
        .unwrap();
    assert_close(crit_leaf.probability, 1.0 / 24.0);
    assert!(single_damage_to(crit_leaf, SideId::Opponent) > 31);
}

/// Boosting a stat already at +6 still produces a branch; its Boost edit
/// records an effective delta of 0 and the stage stays pinned at the cap.
#[test]
fn test_boost_at_cap_records_zero_delta() {
    let mut state = create_test_battle(
        TestPokemonBuilder::new(Species::Machamp, 50)
            .with_moves(vec![Move::SwordsDance])
            .build(),
        TestPokemonBuilder::new(Species::Snorlax, 50).build(),
    );
    apply(&mut state, &BattleInstruction::Boost {
        side: SideId::User,
        stat: Stat::Attack,
        delta: 6,
    });

    let outcomes = resolve_turn(
        &state,
        dex(),
        Action::Move(Move::SwordsDance),
        Action::None,
        &ResolveOptions::default(),
    )
    .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].instructions.contains(&BattleInstruction::Boost {
        side: SideId::User,
        stat: Stat::Attack,
        delta: 0,
    }));
}

/// Lethal damage clamps to the defender's remaining HP and freezes the leaf.
#[test]
fn test_lethal_damage_clamps_to_remaining_hp() {
    let state = create_test_battle(
        TestPokemonBuilder::new(Species::Garchomp, 50)
            .with_moves(vec![Move::Earthquake])
            .build(),
        TestPokemonBuilder::new(Species::Blastoise, 50).with_hp(10).build(),
    );

    let outcomes = resolve_turn(
        &state,
        dex(),
        Action::Move(Move::Earthquake),
        Action::None,
        &ResolveOptions::default(),
    )
    .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].frozen);
    assert_eq!(single_damage_to(&outcomes[0], SideId::Opponent), 10);
}

/// Unknown moves and illegal switch targets fail fast instead of producing
/// silent empty branch sets.
#[test]
fn test_malformed_actions_are_rejected() {
    let state = create_test_battle(
        TestPokemonBuilder::new(Species::Pikachu, 50)
            .with_moves(vec![Move::Thunderbolt])
            .build(),
        TestPokemonBuilder::new(Species::Machamp, 50).build(),
    );

    // Move the active Pokemon does not know.
    assert!(resolve_turn(
        &state,
        dex(),
        Action::Move(Move::Earthquake),
        Action::None,
        &ResolveOptions::default(),
    )
    .is_err());

    // Switch to an empty slot.
    assert!(resolve_turn(
        &state,
        dex(),
        Action::Switch(3),
        Action::None,
        &ResolveOptions::default(),
    )
    .is_err());
}
