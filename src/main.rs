use pokemon_foresight::battle::engine::{legal_actions, resolve_turn, ResolveOptions};
use pokemon_foresight::battle::instructions::apply_sequence;
use pokemon_foresight::battle::branch::sample_outcome;
use pokemon_foresight::battle::state::{Action, BattleState, SideId};
use pokemon_foresight::dex::Dex;
use pokemon_foresight::pokemon::PokemonInst;
use pokemon_foresight::side::SideState;
use schema::{Ability, Move, Species};

/// Demo driver: builds two small teams, then plays the battle forward by
/// sampling one concrete outcome from each turn's weighted outcome set.
fn main() {
    let dex = Dex::bundled();

    let user = SideState::new(vec![
        build(&dex, Species::Garchomp, Ability::RoughSkin, vec![
            Move::Earthquake,
            Move::DragonTail,
            Move::SwordsDance,
            Move::StealthRock,
        ]),
        build(&dex, Species::Gengar, Ability::Levitate, vec![
            Move::ShadowBall,
            Move::SludgeBomb,
            Move::WillOWisp,
            Move::Taunt,
        ]),
    ]);
    let opponent = SideState::new(vec![
        build(&dex, Species::Charizard, Ability::NoAbility, vec![
            Move::Flamethrower,
            Move::AirSlash,
            Move::SolarBeam,
            Move::Roost,
        ]),
        build(&dex, Species::Blastoise, Ability::NoAbility, vec![
            Move::Surf,
            Move::IceBeam,
            Move::Toxic,
            Move::Protect,
        ]),
    ]);

    let mut state = BattleState::new(user, opponent);
    let mut rng = rand::rng();

    for turn in 1..=30 {
        let user_action = pick_action(&state, &dex, SideId::User);
        let opponent_action = pick_action(&state, &dex, SideId::Opponent);
        let (Some(user_action), Some(opponent_action)) = (user_action, opponent_action) else {
            break;
        };

        println!("=== Turn {} ===", turn);
        println!("  user: {} / opponent: {}", user_action, opponent_action);

        let outcomes = match resolve_turn(
            &state,
            &dex,
            user_action,
            opponent_action,
            &ResolveOptions::default(),
        ) {
            Ok(outcomes) => outcomes,
            Err(e) => {
                println!("  turn resolution failed: {}", e);
                break;
            }
        };

        println!("  {} possible futures", outcomes.len());
        let sampled = sample_outcome(&outcomes, &mut rng);
        println!(
            "  sampled future with probability {:.3} ({} edits)",
            sampled.probability,
            sampled.instructions.len()
        );
        apply_sequence(&mut state, &sampled.instructions);

        for side in SideId::both() {
            if let Some(active) = state.side(side).active() {
                println!(
                    "  {}: {} {}/{} HP",
                    side, active.species, active.current_hp, active.max_hp
                );
            }
        }

        if battle_over(&state) {
            println!("Battle over.");
            break;
        }
    }
}

fn build(dex: &Dex, species: Species, ability: Ability, moves: Vec<Move>) -> PokemonInst {
    let data = dex.species_data(species).expect("bundled species");
    let moves = moves
        .into_iter()
        .map(|m| {
            let pp = dex.move_data(m).expect("bundled move").pp;
            (m, pp)
        })
        .collect();
    PokemonInst::new(species, data, 76, ability, moves)
}

/// First legal action, switching in a replacement when the active fainted.
fn pick_action(state: &BattleState, dex: &Dex, side: SideId) -> Option<Action> {
    let force_switch = state.side(side).active().map_or(true, |p| p.is_fainted());
    legal_actions(state, dex, side, force_switch).into_iter().next()
}

fn battle_over(state: &BattleState) -> bool {
    SideId::both().iter().any(|side| {
        state
            .side(*side)
            .team
            .iter()
            .flatten()
            .all(|p| p.is_fainted())
    })
}
