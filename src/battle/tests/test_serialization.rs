use crate::battle::instructions::{apply_sequence, BattleInstruction};
use crate::battle::state::{BattleState, SideId};
use crate::battle::tests::common::{create_team_battle, TestPokemonBuilder};
use pretty_assertions::assert_eq;
use schema::{
    Item, Move, SideCondition, Species, Stat, StatusCondition, Terrain, VolatileStatus, Weather,
};

/// `from_json(to_json(state)) == state` for a state exercising every field:
/// statuses, volatiles, boosts, side conditions, pending wish/future sight,
/// weather, terrain, and trick room.
#[test]
fn test_json_round_trip_of_rich_state() {
    let mut state = create_team_battle(
        vec![
            TestPokemonBuilder::new(Species::Venusaur, 50)
                .with_moves(vec![Move::GigaDrain, Move::LeechSeed, Move::Toxic])
                .with_item(Item::BlackSludge)
                .with_status(StatusCondition::Burn)
                .build(),
            TestPokemonBuilder::new(Species::Skarmory, 50)
                .with_moves(vec![Move::Spikes, Move::Roost])
                .build(),
        ],
        vec![TestPokemonBuilder::new(Species::Alakazam, 50)
            .with_moves(vec![Move::Psychic, Move::FutureSight])
            .with_item(Item::LifeOrb)
            .build()],
    );

    apply_sequence(&mut state, &[
        BattleInstruction::Boost {
            side: SideId::User,
            stat: Stat::SpecialAttack,
            delta: 2,
        },
        BattleInstruction::ApplyVolatile {
            side: SideId::Opponent,
            volatile: VolatileStatus::LeechSeed,
        },
        BattleInstruction::SideConditionStart {
            side: SideId::Opponent,
            condition: SideCondition::StealthRock,
            amount: 1,
        },
        BattleInstruction::SideConditionStart {
            side: SideId::User,
            condition: SideCondition::Reflect,
            amount: 3,
        },
        BattleInstruction::StartWish {
            side: SideId::User,
            heal_amount: 120,
            previous: None,
        },
        BattleInstruction::StartFutureSight {
            side: SideId::Opponent,
            source_slot: 0,
            previous: None,
        },
        BattleInstruction::WeatherStart {
            weather: Weather::Sand,
            previous: None,
        },
        BattleInstruction::FieldStart {
            terrain: Terrain::PsychicTerrain,
            previous: None,
        },
        BattleInstruction::ToggleTrickRoom,
        BattleInstruction::DisableMove {
            side: SideId::User,
            move_: Move::Toxic,
        },
    ]);

    let json = state.to_json();
    let decoded = BattleState::from_json(&json).expect("round trip must decode");
    assert_eq!(decoded, state);
}

#[test]
fn test_minimal_state_round_trip() {
    let state = create_team_battle(
        vec![TestPokemonBuilder::new(Species::Pikachu, 50).build()],
        vec![TestPokemonBuilder::new(Species::Machamp, 50).build()],
    );
    let decoded = BattleState::from_json(&state.to_json()).unwrap();
    assert_eq!(decoded, state);
}

#[test]
fn test_malformed_json_is_rejected() {
    assert!(BattleState::from_json("not json at all").is_err());
    assert!(BattleState::from_json("{\"sides\": []}").is_err());
}
