use crate::battle::engine::{resolve_turn, ResolveOptions};
use crate::battle::instructions::{apply, BattleInstruction};
use crate::battle::state::{Action, SideId};
use crate::battle::stats::effective_speed;
use crate::battle::tests::common::{
    create_team_battle, create_test_battle, dex, TestPokemonBuilder,
};
use pretty_assertions::assert_eq;
use schema::{Item, Move, SideCondition, Species, StatusCondition};

/// The side whose Damage edit lands first in the instruction stream.
fn first_damage_side(outcome: &crate::battle::branch::WeightedOutcome) -> SideId {
    outcome
        .instructions
        .iter()
        .find_map(|i| match i {
            BattleInstruction::Damage { side, .. } => Some(*side),
            _ => None,
        })
        .expect("turn should contain damage")
}

#[test]
fn test_higher_priority_acts_before_faster_speed() {
    // Snorlax is far slower, but Quick Attack's +1 bracket wins.
    let state = create_test_battle(
        TestPokemonBuilder::new(Species::Snorlax, 50)
            .with_moves(vec![Move::QuickAttack])
            .build(),
        TestPokemonBuilder::new(Species::Jolteon, 50)
            .with_moves(vec![Move::Tackle])
            .build(),
    );

    let outcomes = resolve_turn(
        &state,
        dex(),
        Action::Move(Move::QuickAttack),
        Action::Move(Move::Tackle),
        &ResolveOptions::default(),
    )
    .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(first_damage_side(&outcomes[0]), SideId::Opponent);
}

#[test]
fn test_trick_room_inverts_speed_order() {
    let mut state = create_test_battle(
        TestPokemonBuilder::new(Species::Snorlax, 50)
            .with_moves(vec![Move::Tackle])
            .build(),
        TestPokemonBuilder::new(Species::Jolteon, 50)
            .with_moves(vec![Move::Tackle])
            .build(),
    );
    apply(&mut state, &BattleInstruction::ToggleTrickRoom);

    let outcomes = resolve_turn(
        &state,
        dex(),
        Action::Move(Move::Tackle),
        Action::Move(Move::Tackle),
        &ResolveOptions::default(),
    )
    .unwrap();

    // Under Trick Room the slow Snorlax moves first.
    assert_eq!(first_damage_side(&outcomes[0]), SideId::Opponent);
}

#[test]
fn test_trick_room_never_inverts_priority_brackets() {
    let mut state = create_test_battle(
        TestPokemonBuilder::new(Species::Snorlax, 50)
            .with_moves(vec![Move::Tackle])
            .build(),
        TestPokemonBuilder::new(Species::Jolteon, 50)
            .with_moves(vec![Move::QuickAttack])
            .build(),
    );
    apply(&mut state, &BattleInstruction::ToggleTrickRoom);

    let outcomes = resolve_turn(
        &state,
        dex(),
        Action::Move(Move::Tackle),
        Action::Move(Move::QuickAttack),
        &ResolveOptions::default(),
    )
    .unwrap();

    // Jolteon's Quick Attack still goes first; its damage hits the user side.
    assert_eq!(first_damage_side(&outcomes[0]), SideId::User);
}

/// An exact speed tie forks the turn into both orderings at equal weight.
#[test]
fn test_speed_tie_branches_fifty_fifty() {
    let state = create_test_battle(
        TestPokemonBuilder::new(Species::Machamp, 50)
            .with_moves(vec![Move::Tackle])
            .build(),
        TestPokemonBuilder::new(Species::Machamp, 50)
            .with_moves(vec![Move::Tackle])
            .build(),
    );

    let outcomes = resolve_turn(
        &state,
        dex(),
        Action::Move(Move::Tackle),
        Action::Move(Move::Tackle),
        &ResolveOptions::default(),
    )
    .unwrap();

    assert_eq!(outcomes.len(), 2);
    let sides: Vec<SideId> = outcomes.iter().map(first_damage_side).collect();
    assert!(sides.contains(&SideId::User) && sides.contains(&SideId::Opponent));
    for outcome in &outcomes {
        assert!((outcome.probability - 0.5).abs() < 1e-9);
    }
}

#[test]
fn test_switches_resolve_before_moves() {
    let state = create_team_battle(
        vec![
            TestPokemonBuilder::new(Species::Snorlax, 50).build(),
            TestPokemonBuilder::new(Species::Blastoise, 50).build(),
        ],
        vec![TestPokemonBuilder::new(Species::Jolteon, 50)
            .with_moves(vec![Move::Tackle])
            .build()],
    );

    let outcomes = resolve_turn(
        &state,
        dex(),
        Action::Switch(1),
        Action::Move(Move::Tackle),
        &ResolveOptions::default(),
    )
    .unwrap();

    assert_eq!(outcomes.len(), 1);
    let instructions = &outcomes[0].instructions;
    let switch_pos = instructions
        .iter()
        .position(|i| matches!(i, BattleInstruction::Switch { .. }))
        .expect("switch edit present");
    let damage_pos = instructions
        .iter()
        .position(|i| matches!(i, BattleInstruction::Damage { .. }))
        .expect("damage edit present");
    assert!(
        switch_pos < damage_pos,
        "the switch must land before the faster Pokemon's move"
    );
}

/// Paralysis halves effective speed, which can flip the move order.
#[test]
fn test_paralysis_half_speed_affects_order() {
    let state = create_test_battle(
        TestPokemonBuilder::new(Species::Machamp, 50)
            .with_moves(vec![Move::Tackle])
            .build(),
        TestPokemonBuilder::new(Species::Jolteon, 50)
            .with_moves(vec![Move::Tackle])
            .with_status(StatusCondition::Paralysis)
            .build(),
    );

    // Machamp 86 vs paralyzed Jolteon 161/2 = 80.
    assert_eq!(effective_speed(&state, SideId::User), 86);
    assert_eq!(effective_speed(&state, SideId::Opponent), 80);

    let outcomes = resolve_turn(
        &state,
        dex(),
        Action::Move(Move::Tackle),
        Action::Move(Move::Tackle),
        &ResolveOptions::default(),
    )
    .unwrap();

    // Two leaves: Jolteon acts or is fully paralyzed. Machamp is first in both.
    assert_eq!(outcomes.len(), 2);
    for outcome in &outcomes {
        assert_eq!(first_damage_side(outcome), SideId::Opponent);
    }
}

#[test]
fn test_tailwind_and_scarf_speed_multipliers() {
    let mut state = create_test_battle(
        TestPokemonBuilder::new(Species::Snorlax, 50).build(),
        TestPokemonBuilder::new(Species::Machamp, 50).build(),
    );
    assert_eq!(effective_speed(&state, SideId::User), 61);

    apply(&mut state, &BattleInstruction::SideConditionStart {
        side: SideId::User,
        condition: SideCondition::Tailwind,
        amount: 4,
    });
    assert_eq!(effective_speed(&state, SideId::User), 122);

    apply(&mut state, &BattleInstruction::ChangeItem {
        side: SideId::Opponent,
        new_item: Some(Item::ChoiceScarf),
        old_item: None,
    });
    // Machamp 86 * 1.5 = 129.
    assert_eq!(effective_speed(&state, SideId::Opponent), 129);
}
