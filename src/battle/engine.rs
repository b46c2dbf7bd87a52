use crate::battle::abilities::{self, AbsorbEffect, ContactTrigger};
use crate::battle::branch::{merge_duplicates, WeightedOutcome};
use crate::battle::damage::{
    confusion_self_damage, damage_rolls, DamagePolicy,
};
use crate::battle::instructions::{apply, BattleInstruction};
use crate::battle::items;
use crate::battle::state::{Action, BattleState, SideId};
use crate::battle::stats::{effective_accuracy, effective_boost_delta, effective_speed};
use crate::dex::Dex;
use crate::errors::{ActionError, BattleResult, BattleStateError, MoveDataError};
use crate::pokemon::PokemonInst;
use schema::{
    Move, MoveCategory, MoveData, PokemonType, SideCondition, Stat, StatusCondition, Target,
    VolatileStatus,
};

/// Turns a Reflect / Light Screen / Aurora Veil stays up.
const SCREEN_TURNS: u8 = 5;
/// Turns Tailwind stays up.
const TAILWIND_TURNS: u8 = 4;
/// Chance a sleeping Pokemon wakes when it tries to act.
const WAKE_CHANCE: f64 = 1.0 / 3.0;
/// Chance a frozen Pokemon thaws when it tries to act.
const THAW_CHANCE: f64 = 0.2;
/// Chance a confused Pokemon hits itself instead of acting.
const CONFUSION_SELF_HIT_CHANCE: f64 = 1.0 / 3.0;
/// Chance a paralyzed Pokemon is fully immobilized.
const FULL_PARALYSIS_CHANCE: f64 = 0.25;

/// Knobs for a resolution call. Damage variance expansion is always
/// configurable; critical-hit forking is opt-in because every crit roll
/// doubles the branch count of every damaging hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolveOptions {
    pub damage_policy: DamagePolicy,
    pub branch_crits: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            damage_policy: DamagePolicy::Average,
            branch_crits: false,
        }
    }
}

/// One in-flight hypothetical during turn resolution: the materialized state,
/// the probability of reaching it, and the edit log that produced it. The
/// state is always exactly `apply_sequence(turn_start, instructions)`.
#[derive(Debug, Clone)]
struct Branch {
    state: BattleState,
    probability: f64,
    instructions: Vec<BattleInstruction>,
    frozen: bool,
}

impl Branch {
    fn root(state: BattleState, probability: f64) -> Self {
        Self {
            state,
            probability,
            instructions: Vec::new(),
            frozen: false,
        }
    }

    /// Record and apply one edit.
    fn push(&mut self, instruction: BattleInstruction) {
        apply(&mut self.state, &instruction);
        self.instructions.push(instruction);
    }

    /// Split off a copy carrying `weight` of this branch's probability.
    fn fork(&self, weight: f64) -> Branch {
        Branch {
            state: self.state.clone(),
            probability: self.probability * weight,
            instructions: self.instructions.clone(),
            frozen: self.frozen,
        }
    }

    fn into_outcome(self) -> WeightedOutcome {
        WeightedOutcome {
            probability: self.probability,
            instructions: self.instructions,
            frozen: self.frozen,
        }
    }

    fn active(&self, side: SideId) -> Option<&PokemonInst> {
        self.state.side(side).active()
    }

    fn active_fainted(&self, side: SideId) -> bool {
        self.active(side).map_or(true, |p| p.is_fainted())
    }
}

/// Resolve one full turn: both submitted actions plus the end-of-turn phase,
/// expanded into every reachable future with its exact probability.
///
/// The input state is never mutated; each returned leaf's edit sequence
/// replays from it. Leaf probabilities sum to 1.0 within float tolerance.
pub fn resolve_turn(
    state: &BattleState,
    dex: &Dex,
    user_action: Action,
    opponent_action: Action,
    options: &ResolveOptions,
) -> BattleResult<Vec<WeightedOutcome>> {
    validate_action(state, dex, SideId::User, user_action)?;
    validate_action(state, dex, SideId::Opponent, opponent_action)?;

    let actions = |side: SideId| match side {
        SideId::User => user_action,
        SideId::Opponent => opponent_action,
    };
    let start_active =
        |side: SideId| -> usize { state.side(side).active_index };

    let mut leaves: Vec<WeightedOutcome> = Vec::new();

    for (first, weight) in determine_order(state, dex, user_action, opponent_action)? {
        let second = first.opponent();
        let mut branches = vec![Branch::root(state.clone(), weight)];

        branches = run_action_phase(
            branches,
            dex,
            first,
            actions(first),
            options,
            ActionSlot::First,
            start_active(first),
        );
        branches = run_action_phase(
            branches,
            dex,
            second,
            actions(second),
            options,
            ActionSlot::Second,
            start_active(second),
        );
        branches = run_residual_phase(branches, dex);

        leaves.extend(branches.into_iter().map(Branch::into_outcome));
    }

    Ok(merge_duplicates(leaves))
}

/// Fail-fast validation of a submitted action against the current state.
/// A legitimately ineffective move is not an error; an impossible one is.
pub fn validate_action(
    state: &BattleState,
    dex: &Dex,
    side: SideId,
    action: Action,
) -> BattleResult<()> {
    let side_state = state.side(side);

    match action {
        Action::None => Ok(()),
        Action::Move(move_) => {
            dex.move_data(move_)?;
            let active = side_state
                .active()
                .ok_or(BattleStateError::NoActivePokemon)?;
            if active.is_fainted() {
                return Err(BattleStateError::NoActivePokemon.into());
            }
            if move_ == Move::Struggle {
                return Ok(());
            }
            let slot = active
                .move_slot(move_)
                .ok_or(ActionError::UnknownMove(move_))?;
            if slot.disabled {
                return Err(ActionError::MoveDisabled(move_).into());
            }
            if slot.pp == 0 {
                return Err(ActionError::NoPPRemaining(move_).into());
            }
            Ok(())
        }
        Action::Switch(slot) => {
            if slot >= side_state.team.len() {
                return Err(ActionError::InvalidSwitchTarget(slot).into());
            }
            let target = side_state.team[slot]
                .as_ref()
                .ok_or(ActionError::InvalidSwitchTarget(slot))?;
            if target.is_fainted() {
                return Err(ActionError::SwitchTargetFainted(slot).into());
            }
            if slot == side_state.active_index {
                return Err(ActionError::SwitchTargetActive(slot).into());
            }
            Ok(())
        }
    }
}

/// Legal action tokens for one side, in move-then-switch order.
///
/// `force_switch` marks the inter-turn replacement phase after a faint, where
/// switching is the only legal action kind.
pub fn legal_actions(
    state: &BattleState,
    dex: &Dex,
    side: SideId,
    force_switch: bool,
) -> Vec<Action> {
    let side_state = state.side(side);
    let mut actions = Vec::new();

    let active_fainted = side_state.active().map_or(true, |p| p.is_fainted());

    if force_switch || active_fainted {
        return side_state
            .alive_bench_slots()
            .into_iter()
            .map(Action::Switch)
            .collect();
    }

    let active = side_state.active().expect("checked above");

    // Multi-turn lock-in forces the continuation move and rules out
    // switching entirely.
    if let Some(locked) = active.locked_move {
        return vec![Action::Move(locked)];
    }

    if let Some(choice_locked) = choice_locked_move(side_state.last_used_move, active) {
        actions.push(Action::Move(choice_locked));
    } else {
        let usable: Vec<Action> = active
            .moves
            .iter()
            .flatten()
            .filter(|inst| inst.pp > 0 && !inst.disabled)
            .map(|inst| Action::Move(inst.move_))
            .collect();
        if usable.is_empty() {
            // Nothing usable: the only "fight" option left is Struggle.
            actions.push(Action::Move(Move::Struggle));
        } else {
            actions.extend(usable);
        }
    }

    let trapped = is_trapped(state, dex, side);
    if !trapped {
        actions.extend(side_state.alive_bench_slots().into_iter().map(Action::Switch));
    }

    actions
}

fn choice_locked_move(last_used: Option<Move>, active: &PokemonInst) -> Option<Move> {
    let item = active.item?;
    if !item.is_choice() {
        return None;
    }
    let locked = last_used?;
    let slot = active.move_slot(locked)?;
    if slot.pp > 0 && !slot.disabled {
        Some(locked)
    } else {
        None
    }
}

fn is_trapped(state: &BattleState, _dex: &Dex, side: SideId) -> bool {
    let Some(active) = state.side(side).active() else {
        return false;
    };
    if active.has_volatile(VolatileStatus::PartiallyTrapped) {
        return true;
    }
    match state.side(side.opponent()).active() {
        Some(opposing) => abilities::traps_opponent(opposing.ability, active),
        None => false,
    }
}

// ============================================================================
// Move order
// ============================================================================

/// Ordering bracket for an action. Switches always precede move usage;
/// priority brackets are never inverted by Trick Room.
fn action_bracket(dex: &Dex, action: Action) -> BattleResult<i8> {
    Ok(match action {
        Action::Switch(_) => 6,
        Action::Move(move_) => dex.move_data(move_)?.priority,
        Action::None => i8::MIN,
    })
}

/// Which side acts first, as weighted alternatives. Exact speed ties always
/// fork into two equally likely orderings.
fn determine_order(
    state: &BattleState,
    dex: &Dex,
    user_action: Action,
    opponent_action: Action,
) -> BattleResult<Vec<(SideId, f64)>> {
    let user_bracket = action_bracket(dex, user_action)?;
    let opponent_bracket = action_bracket(dex, opponent_action)?;

    if user_bracket != opponent_bracket {
        let first = if user_bracket > opponent_bracket {
            SideId::User
        } else {
            SideId::Opponent
        };
        return Ok(vec![(first, 1.0)]);
    }

    let user_speed = effective_speed(state, SideId::User);
    let opponent_speed = effective_speed(state, SideId::Opponent);

    if user_speed == opponent_speed {
        return Ok(vec![(SideId::User, 0.5), (SideId::Opponent, 0.5)]);
    }

    // Trick Room inverts the speed comparison only, never the bracket.
    let user_first = (user_speed > opponent_speed) != state.trick_room;
    Ok(vec![(if user_first { SideId::User } else { SideId::Opponent }, 1.0)])
}

// ============================================================================
// Action phase
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionSlot {
    First,
    Second,
}

fn run_action_phase(
    branches: Vec<Branch>,
    dex: &Dex,
    side: SideId,
    action: Action,
    options: &ResolveOptions,
    slot: ActionSlot,
    start_active_index: usize,
) -> Vec<Branch> {
    if action == Action::None {
        return branches;
    }

    let mut out = Vec::new();
    for mut branch in branches {
        if slot == ActionSlot::Second
            && second_action_skipped(&branch, side, action, start_active_index)
        {
            out.push(branch);
            continue;
        }

        // A new actor's pipeline begins: the branch is live again.
        branch.frozen = false;

        match action {
            Action::Switch(to_slot) => out.push(execute_switch(branch, dex, side, to_slot)),
            Action::Move(move_) => {
                let acts_first = slot == ActionSlot::First;
                out.extend(execute_move(branch, dex, side, move_, options, acts_first));
            }
            Action::None => unreachable!(),
        }
    }
    out
}

/// The second action is cancelled on branches where its creature fainted, or
/// (for moves) was phased out by the first action. A switch still executes
/// for a side whose creature was merely flinched or damaged.
fn second_action_skipped(
    branch: &Branch,
    side: SideId,
    action: Action,
    start_active_index: usize,
) -> bool {
    match action {
        Action::None => false,
        Action::Switch(_) => branch.active_fainted(side),
        Action::Move(_) => {
            branch.active_fainted(side)
                || branch.state.side(side).active_index != start_active_index
        }
    }
}

// ============================================================================
// Switching
// ============================================================================

/// Edits that clear everything bound to the outgoing active Pokemon. Emitted
/// by the resolver (not folded into `Switch`) so each edit stays atomic and
/// exactly reversible.
fn push_switch_out_cleanup(branch: &mut Branch, side: SideId) {
    let Some(active) = branch.active(side) else {
        return;
    };

    let mut volatiles: Vec<VolatileStatus> = active.volatiles.iter().copied().collect();
    volatiles.sort();
    let mut boosts: Vec<(Stat, i8)> = active
        .stat_boosts
        .iter()
        .map(|(stat, stage)| (*stat, *stage))
        .collect();
    boosts.sort();
    let substitute_hp = active.substitute_hp;
    let locked_move = active.locked_move;
    let toxic = active.status == Some(StatusCondition::Toxic);
    let last_used = branch.state.side(side).last_used_move;

    for volatile in volatiles {
        branch.push(BattleInstruction::RemoveVolatile { side, volatile });
    }
    for (stat, stage) in boosts {
        branch.push(BattleInstruction::Boost {
            side,
            stat,
            delta: -stage,
        });
    }
    if substitute_hp > 0 {
        branch.push(BattleInstruction::SetSubstituteHealth {
            side,
            new_hp: 0,
            old_hp: substitute_hp,
        });
    }
    if locked_move.is_some() {
        branch.push(BattleInstruction::SetLockedMove {
            side,
            move_: None,
            previous: locked_move,
        });
    }
    if last_used.is_some() {
        branch.push(BattleInstruction::SetLastUsedMove {
            side,
            move_: None,
            previous: last_used,
        });
    }
    if toxic {
        let count = branch.state.side(side).condition(SideCondition::ToxicCount);
        if count > 0 {
            branch.push(BattleInstruction::SideConditionEnd {
                side,
                condition: SideCondition::ToxicCount,
                amount: count,
            });
        }
    }
}

/// Entry hazards and switch-in abilities for the Pokemon that just arrived.
fn push_switch_in_effects(branch: &mut Branch, side: SideId) {
    let incoming = branch
        .active(side)
        .expect("switch-in requires an active Pokemon");
    let max_hp = incoming.max_hp;
    let grounded = incoming.is_grounded();
    let ignores_hazards = items::blocks_hazards(incoming);
    let shrugs_damage = abilities::blocks_indirect_damage(incoming.ability);
    let types = incoming.types.clone();
    let has_status = incoming.status.is_some();
    let ability = incoming.ability;

    if !ignores_hazards {
        // Stealth Rock scales with the Rock matchup against the arrival.
        if branch.state.side(side).condition(SideCondition::StealthRock) > 0 && !shrugs_damage {
            let effectiveness =
                PokemonType::effectiveness_against(PokemonType::Rock, &types);
            let damage = (max_hp as f64 * effectiveness / 8.0).floor() as u16;
            push_clamped_damage(branch, side, damage);
        }

        let spikes = branch.state.side(side).condition(SideCondition::Spikes);
        if spikes > 0 && grounded && !shrugs_damage && !branch.active_fainted(side) {
            let denominator = match spikes {
                1 => 8,
                2 => 6,
                _ => 4,
            };
            push_clamped_damage(branch, side, max_hp / denominator);
        }

        let toxic_spikes = branch.state.side(side).condition(SideCondition::ToxicSpikes);
        if toxic_spikes > 0 && grounded && !branch.active_fainted(side) {
            if types.contains(&PokemonType::Poison) {
                // A grounded Poison type soaks the spikes up on arrival.
                branch.push(BattleInstruction::SideConditionEnd {
                    side,
                    condition: SideCondition::ToxicSpikes,
                    amount: toxic_spikes,
                });
            } else if !has_status && can_receive_status(
                branch.active(side).expect("checked above"),
                if toxic_spikes >= 2 {
                    StatusCondition::Toxic
                } else {
                    StatusCondition::Poison
                },
            ) {
                let status = if toxic_spikes >= 2 {
                    StatusCondition::Toxic
                } else {
                    StatusCondition::Poison
                };
                branch.push(BattleInstruction::ApplyStatus { side, status });
            }
        }
    }

    if branch.active_fainted(side) {
        branch.frozen = true;
        return;
    }

    // Switch-in abilities fire only if the arrival survived its hazards.
    if let Some(weather) = abilities::switch_in_weather(ability) {
        if branch.state.weather != Some(weather) {
            branch.push(BattleInstruction::WeatherStart {
                weather,
                previous: branch.state.weather,
            });
        }
    }

    if ability == schema::Ability::Intimidate {
        let opponent = side.opponent();
        if !branch.active_fainted(opponent) {
            let current = branch
                .active(opponent)
                .expect("checked above")
                .boost(Stat::Attack);
            branch.push(BattleInstruction::Boost {
                side: opponent,
                stat: Stat::Attack,
                delta: effective_boost_delta(current, -1),
            });
        }
    }
}

fn execute_switch(mut branch: Branch, _dex: &Dex, side: SideId, to_slot: usize) -> Branch {
    let from_slot = branch.state.side(side).active_index;
    push_switch_out_cleanup(&mut branch, side);
    branch.push(BattleInstruction::Switch {
        side,
        from_slot,
        to_slot,
    });
    push_switch_in_effects(&mut branch, side);
    branch
}

// ============================================================================
// Move execution
// ============================================================================

fn execute_move(
    branch: Branch,
    dex: &Dex,
    side: SideId,
    move_: Move,
    options: &ResolveOptions,
    acts_first: bool,
) -> Vec<Branch> {
    let move_data = dex
        .move_data(move_)
        .unwrap_or_else(|_| panic!("{}", MoveDataError::MoveNotFound(move_)))
        .clone();

    let mut finished: Vec<Branch> = Vec::new();
    let mut continuing = run_gates(branch, side, &mut finished);

    // Taunt shuts status moves down before any PP is spent.
    continuing.retain(|branch| {
        let blocked = taunt_blocks(branch, side, &move_data);
        if blocked {
            finished.push(branch.clone());
        }
        !blocked
    });

    // PP and bookkeeping happen once the move actually starts executing.
    for branch in &mut continuing {
        let active = branch.active(side).expect("gates guarantee an actor");
        let was_charging = active.has_volatile(VolatileStatus::Charging);
        let last_used = branch.state.side(side).last_used_move;

        if move_ != Move::Struggle && !was_charging {
            if let Some(slot) = branch
                .active(side)
                .and_then(|p| p.move_slot(move_))
            {
                if slot.pp > 0 {
                    branch.push(BattleInstruction::DecrementPP {
                        side,
                        move_,
                        amount: 1,
                    });
                }
            }
        }
        if last_used != Some(move_) {
            branch.push(BattleInstruction::SetLastUsedMove {
                side,
                move_: Some(move_),
                previous: last_used,
            });
        }
    }

    // Charge moves spend their first turn building up (unless sunlit
    // Solar Beam). The release turn clears the lock and proceeds.
    if move_data.flags.charge {
        let mut released = Vec::new();
        for mut branch in continuing {
            let active = branch.active(side).expect("actor exists");
            if active.has_volatile(VolatileStatus::Charging) {
                let locked = active.locked_move;
                branch.push(BattleInstruction::RemoveVolatile {
                    side,
                    volatile: VolatileStatus::Charging,
                });
                branch.push(BattleInstruction::SetLockedMove {
                    side,
                    move_: None,
                    previous: locked,
                });
                released.push(branch);
            } else if move_ == Move::SolarBeam
                && branch.state.weather == Some(schema::Weather::Sun)
            {
                released.push(branch);
            } else {
                let locked = active.locked_move;
                branch.push(BattleInstruction::ApplyVolatile {
                    side,
                    volatile: VolatileStatus::Charging,
                });
                branch.push(BattleInstruction::SetLockedMove {
                    side,
                    move_: Some(move_),
                    previous: locked,
                });
                finished.push(branch);
            }
        }
        continuing = released;
    }

    // Target resolution and immunity: a fully blocked execution is a single
    // no-op branch, not an error and not a frozen leaf.
    let targets_opponent =
        move_data.is_damaging() || move_effects_opponent(&move_data);
    if targets_opponent {
        let mut through = Vec::new();
        for mut branch in continuing {
            let defender_side = side.opponent();
            if branch.active_fainted(defender_side) {
                finished.push(branch);
                continue;
            }
            let defender = branch.active(defender_side).expect("checked above");

            if defender.has_volatile(VolatileStatus::Protect) && !move_data.flags.bypass_protect {
                finished.push(branch);
                continue;
            }
            if move_data.flags.powder && defender.types.contains(&PokemonType::Grass) {
                finished.push(branch);
                continue;
            }
            // The chart blocks damage and typed status payloads (Thunder
            // Wave into a Ground type), but not pure phazing.
            let chart_applies = move_data.is_damaging()
                || move_data
                    .status
                    .map_or(false, |(t, _)| t == Target::Opponent);
            let effectiveness = PokemonType::effectiveness_against(
                move_data.move_type,
                &defender.types,
            );
            if chart_applies && effectiveness == 0.0 {
                finished.push(branch);
                continue;
            }
            match abilities::absorbs_move(defender, &move_data) {
                Some(AbsorbEffect::Immune) => {
                    finished.push(branch);
                    continue;
                }
                Some(AbsorbEffect::HealQuarter) => {
                    let heal = missing_hp(defender).min(defender.max_hp / 4);
                    if heal > 0 {
                        branch.push(BattleInstruction::Heal {
                            side: defender_side,
                            amount: heal,
                        });
                    }
                    finished.push(branch);
                    continue;
                }
                None => {}
            }
            through.push(branch);
        }
        continuing = through;
    }

    // Accuracy fork. A miss may still carry self-inflicted crash damage and
    // leaves the branch frozen: nothing else can come of this action.
    if let Some(base_accuracy) = move_data.accuracy {
        let mut hit_branches = Vec::new();
        for branch in continuing {
            let attacker = branch.active(side).expect("actor exists");
            let defender = branch.active(side.opponent());
            let hit_chance = match defender {
                Some(defender) if targets_opponent => {
                    effective_accuracy(base_accuracy, attacker, defender) / 100.0
                }
                _ => base_accuracy as f64 / 100.0,
            };

            if hit_chance >= 1.0 {
                hit_branches.push(branch);
                continue;
            }

            let mut miss = branch.fork(1.0 - hit_chance);
            if let Some((num, den)) = move_data.crash {
                let attacker = miss.active(side).expect("actor exists");
                let crash = attacker.max_hp as u32 * num as u32 / den as u32;
                push_clamped_damage(&mut miss, side, crash as u16);
            }
            miss.frozen = true;
            finished.push(miss);

            let mut hit = branch;
            hit.probability *= hit_chance;
            hit_branches.push(hit);
        }
        continuing = hit_branches;
    }

    if move_data.is_damaging() && !move_data.flags.future_sight {
        for branch in continuing {
            execute_damaging_hit(
                branch,
                side,
                move_,
                &move_data,
                options,
                acts_first,
                &mut finished,
            );
        }
    } else {
        for mut branch in continuing {
            push_status_move_payloads(&mut branch, side, move_, &move_data);
            if move_data.flags.drag {
                drag_out_defender(branch, side.opponent(), &mut finished);
            } else {
                finished.push(branch);
            }
        }
    }

    finished
}

/// Pre-move gates in fixed order: sleep, freeze, flinch, confusion,
/// paralysis, taunt. Chance gates fork; a failed gate ends the action but
/// does not freeze the leaf, so residual effects still run there.
fn run_gates(branch: Branch, side: SideId, finished: &mut Vec<Branch>) -> Vec<Branch> {
    let mut continuing = vec![branch];

    // Sleep: wake-and-act vs stay asleep.
    continuing = fork_gate(continuing, finished, |branch| {
        if branch.active(side).expect("actor exists").status == Some(StatusCondition::Sleep) {
            Some(WAKE_CHANCE)
        } else {
            None
        }
    }, |branch| {
        branch.push(BattleInstruction::RemoveStatus {
            side,
            status: StatusCondition::Sleep,
        });
    });

    // Freeze: thaw-and-act vs stay frozen.
    continuing = fork_gate(continuing, finished, |branch| {
        if branch.active(side).expect("actor exists").status == Some(StatusCondition::Freeze) {
            Some(THAW_CHANCE)
        } else {
            None
        }
    }, |branch| {
        branch.push(BattleInstruction::RemoveStatus {
            side,
            status: StatusCondition::Freeze,
        });
    });

    // Flinch is deterministic: the action simply fails.
    continuing.retain(|branch| {
        let flinched = branch
            .active(side)
            .expect("actor exists")
            .has_volatile(VolatileStatus::Flinch);
        if flinched {
            finished.push(branch.clone());
        }
        !flinched
    });

    // Confusion: the fail path hits the Pokemon with its own attack.
    let mut after_confusion = Vec::new();
    for branch in continuing {
        let confused = branch
            .active(side)
            .expect("actor exists")
            .has_volatile(VolatileStatus::Confusion);
        if !confused {
            after_confusion.push(branch);
            continue;
        }
        let mut self_hit = branch.fork(CONFUSION_SELF_HIT_CHANCE);
        let damage = confusion_self_damage(self_hit.active(side).expect("actor exists"));
        push_clamped_damage(&mut self_hit, side, damage);
        if self_hit.active_fainted(side) {
            self_hit.frozen = true;
        }
        finished.push(self_hit);

        let mut acts = branch;
        acts.probability *= 1.0 - CONFUSION_SELF_HIT_CHANCE;
        after_confusion.push(acts);
    }
    continuing = after_confusion;

    // Full paralysis.
    continuing = fork_gate(continuing, finished, |branch| {
        if branch.active(side).expect("actor exists").status
            == Some(StatusCondition::Paralysis)
        {
            Some(1.0 - FULL_PARALYSIS_CHANCE)
        } else {
            None
        }
    }, |_| {});

    continuing
}

/// Generic chance gate: `chance(branch)` returns the pass probability (None
/// means the gate does not apply), `on_pass` mutates the passing branch.
fn fork_gate(
    branches: Vec<Branch>,
    finished: &mut Vec<Branch>,
    chance: impl Fn(&Branch) -> Option<f64>,
    on_pass: impl Fn(&mut Branch),
) -> Vec<Branch> {
    let mut continuing = Vec::new();
    for branch in branches {
        match chance(&branch) {
            None => continuing.push(branch),
            Some(pass_chance) => {
                if pass_chance < 1.0 {
                    finished.push(branch.fork(1.0 - pass_chance));
                }
                let mut pass = branch;
                pass.probability *= pass_chance;
                on_pass(&mut pass);
                continuing.push(pass);
            }
        }
    }
    continuing
}

fn move_effects_opponent(move_data: &MoveData) -> bool {
    move_data.status.map_or(false, |(t, _)| t == Target::Opponent)
        || move_data
            .volatile_status
            .map_or(false, |(t, _)| t == Target::Opponent)
        || move_data.flags.drag
}

/// Taunt blocks status moves; checked as part of move execution because it
/// only matters once the creature actually tries to act.
fn taunt_blocks(branch: &Branch, side: SideId, move_data: &MoveData) -> bool {
    move_data.category == MoveCategory::Status
        && branch
            .active(side)
            .map_or(false, |p| p.has_volatile(VolatileStatus::Taunt))
}

// ============================================================================
// Damaging pipeline
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn execute_damaging_hit(
    branch: Branch,
    side: SideId,
    move_: Move,
    move_data: &MoveData,
    options: &ResolveOptions,
    acts_first: bool,
    finished: &mut Vec<Branch>,
) {
    // Crit fork happens once per hit; for multi-hit moves the whole
    // damage-and-effects pipeline runs again on the post-hit state.
    let mut live = vec![branch];
    for hit in 0..move_data.hits.max(1) {
        let mut next = Vec::new();
        for branch in live {
            if branch.active_fainted(side.opponent()) || branch.active_fainted(side) {
                // A defender that faints mid-sequence stops taking hits.
                finished.push(branch);
                continue;
            }

            if options.branch_crits {
                let crit_chance = move_data.crit_rate.chance();
                let crit = branch.fork(crit_chance);
                let mut normal = branch;
                normal.probability *= 1.0 - crit_chance;

                for (branch, is_crit) in [(normal, false), (crit, true)] {
                    next.extend(resolve_one_hit(
                        branch, side, move_, move_data, options, is_crit, acts_first, hit,
                    ));
                }
            } else {
                next.extend(resolve_one_hit(
                    branch, side, move_, move_data, options, false, acts_first, hit,
                ));
            }
        }
        live = next;
    }

    for branch in live {
        if move_data.flags.drag && !branch.active_fainted(side.opponent()) {
            drag_out_defender(branch, side.opponent(), finished);
        } else {
            finished.push(branch);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve_one_hit(
    branch: Branch,
    side: SideId,
    move_: Move,
    move_data: &MoveData,
    options: &ResolveOptions,
    is_crit: bool,
    acts_first: bool,
    _hit: u8,
) -> Vec<Branch> {
    let defender_side = side.opponent();
    let rolls = damage_rolls(&branch.state, side, move_data, is_crit, options.damage_policy);

    let mut results = Vec::new();
    for (damage, weight) in rolls {
        let mut hit_branch = if weight < 1.0 {
            branch.fork(weight)
        } else {
            branch.clone()
        };

        let defender = hit_branch
            .active(defender_side)
            .expect("defender exists during a hit");
        let behind_substitute =
            defender.has_volatile(VolatileStatus::Substitute) && !move_data.flags.sound;

        let dealt = if behind_substitute {
            let old_hp = defender.substitute_hp;
            let dealt = damage.min(old_hp);
            let new_hp = old_hp - dealt;
            hit_branch.push(BattleInstruction::SetSubstituteHealth {
                side: defender_side,
                new_hp,
                old_hp,
            });
            if new_hp == 0 {
                hit_branch.push(BattleInstruction::RemoveVolatile {
                    side: defender_side,
                    volatile: VolatileStatus::Substitute,
                });
            }
            dealt
        } else {
            let dealt = damage.min(defender.current_hp);
            if dealt > 0 {
                hit_branch.push(BattleInstruction::Damage {
                    side: defender_side,
                    amount: dealt,
                });
            }
            dealt
        };

        if hit_branch.active_fainted(defender_side) {
            hit_branch.frozen = true;
        }

        // Drain and recoil are fractions of the damage actually dealt;
        // Struggle's recoil is a flat quarter of the user's max HP.
        if let Some((num, den)) = move_data.drain {
            let attacker = hit_branch.active(side).expect("attacker exists");
            let heal = (dealt as u32 * num as u32 / den as u32) as u16;
            let heal = heal.min(missing_hp(attacker));
            if heal > 0 {
                hit_branch.push(BattleInstruction::Heal { side, amount: heal });
            }
        }
        let recoil = if move_ == Move::Struggle {
            let attacker = hit_branch.active(side).expect("attacker exists");
            Some(attacker.max_hp / 4)
        } else {
            move_data.recoil.map(|(num, den)| {
                (dealt as u32 * num as u32 / den as u32) as u16
            })
        };
        if let Some(recoil) = recoil {
            if recoil > 0 && !abilities::blocks_indirect_damage(
                hit_branch.active(side).expect("attacker exists").ability,
            ) {
                push_clamped_damage(&mut hit_branch, side, recoil);
                if hit_branch.active_fainted(side) {
                    hit_branch.frozen = true;
                }
            }
        }

        // Self boosts land on every successful hit.
        push_self_boosts(&mut hit_branch, side, &move_data.self_boosts);

        let mut secondary_branches = apply_secondaries(
            hit_branch,
            side,
            move_data,
            behind_substitute,
            acts_first,
        );

        for branch in &mut secondary_branches {
            push_contact_reactions(branch, side, move_data, behind_substitute, dealt);
            push_life_orb_chip(branch, side, dealt);
        }

        let mut final_branches = Vec::new();
        for branch in secondary_branches {
            final_branches.extend(fork_contact_statuses(
                branch,
                side,
                move_data,
                behind_substitute,
                dealt,
            ));
        }
        results.extend(final_branches);
    }
    results
}

/// Chance-gated secondary effects, forked independently. Chances are
/// adjusted for Serene Grace and Shield Dust before forking, and effects
/// that cannot possibly apply never fork at all.
fn apply_secondaries(
    branch: Branch,
    side: SideId,
    move_data: &MoveData,
    behind_substitute: bool,
    acts_first: bool,
) -> Vec<Branch> {
    let defender_side = side.opponent();
    let mut branches = vec![branch];

    for secondary in &move_data.secondaries {
        let mut next = Vec::new();
        for branch in branches {
            let (target_side, on_opponent) = match secondary.target {
                Target::User => (side, false),
                Target::Opponent => (defender_side, true),
            };

            if on_opponent && (behind_substitute || branch.active_fainted(defender_side)) {
                next.push(branch);
                continue;
            }

            let attacker = branch.active(side).expect("attacker exists");
            let target = branch.active(target_side).expect("target exists");
            let chance = abilities::secondary_chance_modifier(
                attacker,
                target,
                on_opponent,
                secondary.chance,
            ) / 100.0;

            let applies = match &secondary.effect {
                schema::EffectKind::Status(status) => {
                    target.status.is_none() && can_receive_status(target, *status)
                }
                schema::EffectKind::Volatile(volatile) => {
                    let redundant = target.has_volatile(*volatile);
                    let useless_flinch =
                        *volatile == VolatileStatus::Flinch && (!acts_first || !on_opponent);
                    !redundant && !useless_flinch
                }
                schema::EffectKind::Boosts(_) => true,
            };

            if !applies || chance <= 0.0 {
                next.push(branch);
                continue;
            }

            let mut triggered = branch.fork(chance);
            match &secondary.effect {
                schema::EffectKind::Status(status) => {
                    triggered.push(BattleInstruction::ApplyStatus {
                        side: target_side,
                        status: *status,
                    });
                }
                schema::EffectKind::Volatile(volatile) => {
                    triggered.push(BattleInstruction::ApplyVolatile {
                        side: target_side,
                        volatile: *volatile,
                    });
                }
                schema::EffectKind::Boosts(boosts) => {
                    push_target_boosts(&mut triggered, target_side, boosts);
                }
            }

            if chance >= 1.0 {
                next.push(triggered);
            } else {
                let mut missed = branch;
                missed.probability *= 1.0 - chance;
                next.push(missed);
                next.push(triggered);
            }
        }
        branches = next;
    }

    branches
}

/// Deterministic contact reactions: Rough Skin and Rocky Helmet chip the
/// attacker as a fixed max-HP fraction.
fn push_contact_reactions(
    branch: &mut Branch,
    side: SideId,
    move_data: &MoveData,
    behind_substitute: bool,
    dealt: u16,
) {
    if !move_data.flags.contact || behind_substitute || dealt == 0 {
        return;
    }
    let defender_side = side.opponent();
    let Some(defender) = branch.active(defender_side) else {
        return;
    };
    if defender.is_fainted() {
        return;
    }

    let mut fractions: Vec<(u16, u16)> = Vec::new();
    for trigger in abilities::contact_triggers(defender) {
        if let ContactTrigger::DamageFraction(num, den) = trigger {
            fractions.push((num, den));
        }
    }
    if let Some(fraction) = items::contact_damage_fraction(defender) {
        fractions.push(fraction);
    }

    let attacker = branch.active(side).expect("attacker exists");
    if abilities::blocks_indirect_damage(attacker.ability) {
        return;
    }
    let max_hp = attacker.max_hp;
    for (num, den) in fractions {
        if branch.active_fainted(side) {
            break;
        }
        push_clamped_damage(branch, side, max_hp * num / den);
    }
    if branch.active_fainted(side) {
        branch.frozen = true;
    }
}

/// Life Orb chip lands after any contact punishment, on every damaging hit
/// regardless of contact.
fn push_life_orb_chip(branch: &mut Branch, side: SideId, dealt: u16) {
    if dealt == 0 || branch.active_fainted(side) {
        return;
    }
    let attacker = branch.active(side).expect("attacker exists");
    if abilities::blocks_indirect_damage(attacker.ability) {
        return;
    }
    let Some((num, den)) = items::post_move_recoil_fraction(attacker) else {
        return;
    };
    let chip = attacker.max_hp * num / den;
    push_clamped_damage(branch, side, chip);
    if branch.active_fainted(side) {
        branch.frozen = true;
    }
}

/// Chance-gated contact statuses (Static, Flame Body, Poison Point) fork
/// their own branches after the deterministic chip damage.
fn fork_contact_statuses(
    branch: Branch,
    side: SideId,
    move_data: &MoveData,
    behind_substitute: bool,
    dealt: u16,
) -> Vec<Branch> {
    if !move_data.flags.contact || behind_substitute || dealt == 0 {
        return vec![branch];
    }
    let defender_side = side.opponent();
    let Some(defender) = branch.active(defender_side) else {
        return vec![branch];
    };
    if defender.is_fainted() {
        return vec![branch];
    }

    let mut branches = vec![branch];
    for trigger in abilities::contact_triggers(
        branches[0].active(defender_side).expect("defender exists"),
    ) {
        let ContactTrigger::Status(status, chance) = trigger else {
            continue;
        };
        let mut next = Vec::new();
        for branch in branches {
            let attacker = branch.active(side).expect("attacker exists");
            if attacker.is_fainted()
                || attacker.status.is_some()
                || !can_receive_status(attacker, status)
            {
                next.push(branch);
                continue;
            }
            let mut triggered = branch.fork(chance);
            triggered.push(BattleInstruction::ApplyStatus { side, status });
            let mut skipped = branch;
            skipped.probability *= 1.0 - chance;
            next.push(skipped);
            next.push(triggered);
        }
        branches = next;
    }
    branches
}

// ============================================================================
// Status moves
// ============================================================================

fn push_status_move_payloads(
    branch: &mut Branch,
    side: SideId,
    move_: Move,
    move_data: &MoveData,
) {
    push_self_boosts(branch, side, &move_data.self_boosts);

    if let Some((target, status)) = move_data.status {
        let target_side = resolve_target(side, target);
        if let Some(target_pokemon) = branch.active(target_side) {
            if !target_pokemon.is_fainted()
                && target_pokemon.status.is_none()
                && can_receive_status(target_pokemon, status)
                && !(target == Target::Opponent
                    && target_pokemon.has_volatile(VolatileStatus::Substitute))
            {
                branch.push(BattleInstruction::ApplyStatus {
                    side: target_side,
                    status,
                });
            }
        }
    }

    if let Some((target, volatile)) = move_data.volatile_status {
        let target_side = resolve_target(side, target);
        push_volatile_payload(branch, side, target_side, move_, volatile);
    }

    if let Some((target, condition)) = move_data.side_condition {
        let target_side = resolve_target(side, target);
        push_side_condition_payload(branch, target_side, condition);
    }

    if let Some(weather) = move_data.weather {
        if branch.state.weather != Some(weather) {
            branch.push(BattleInstruction::WeatherStart {
                weather,
                previous: branch.state.weather,
            });
        }
    }

    if let Some(terrain) = move_data.terrain {
        if branch.state.terrain != Some(terrain) {
            branch.push(BattleInstruction::FieldStart {
                terrain,
                previous: branch.state.terrain,
            });
        }
    }

    if move_data.flags.trick_room {
        branch.push(BattleInstruction::ToggleTrickRoom);
    }

    if move_data.flags.wish {
        let side_state = branch.state.side(side);
        let pending = side_state.wish.map_or(false, |(turns, _)| turns > 0);
        if !pending {
            let heal_amount = branch.active(side).expect("actor exists").max_hp / 2;
            let previous = side_state.wish;
            branch.push(BattleInstruction::StartWish {
                side,
                heal_amount,
                previous,
            });
        }
    }

    if move_data.flags.future_sight {
        let side_state = branch.state.side(side);
        let pending = side_state.future_sight.map_or(false, |(turns, _)| turns > 0);
        if !pending {
            let previous = side_state.future_sight;
            let source_slot = side_state.active_index as u8;
            branch.push(BattleInstruction::StartFutureSight {
                side,
                source_slot,
                previous,
            });
        }
    }

    if let Some((num, den)) = move_data.heal {
        let active = branch.active(side).expect("actor exists");
        let heal = (active.max_hp as u32 * num as u32 / den as u32) as u16;
        let heal = heal.min(missing_hp(active));
        if heal > 0 {
            branch.push(BattleInstruction::Heal { side, amount: heal });
        }
    }
}

fn push_volatile_payload(
    branch: &mut Branch,
    user_side: SideId,
    target_side: SideId,
    _move: Move,
    volatile: VolatileStatus,
) {
    let Some(target) = branch.active(target_side) else {
        return;
    };
    if target.is_fainted() || target.has_volatile(volatile) {
        return;
    }

    match volatile {
        VolatileStatus::Substitute => {
            // Costs a quarter of max HP, payable only with HP to spare.
            let active = branch.active(user_side).expect("actor exists");
            let cost = active.max_hp / 4;
            if active.current_hp <= cost {
                return;
            }
            let old_hp = active.substitute_hp;
            branch.push(BattleInstruction::Damage {
                side: user_side,
                amount: cost,
            });
            branch.push(BattleInstruction::ApplyVolatile {
                side: user_side,
                volatile: VolatileStatus::Substitute,
            });
            branch.push(BattleInstruction::SetSubstituteHealth {
                side: user_side,
                new_hp: cost,
                old_hp,
            });
        }
        VolatileStatus::LeechSeed => {
            if target.types.contains(&PokemonType::Grass)
                || target.has_volatile(VolatileStatus::Substitute)
            {
                return;
            }
            branch.push(BattleInstruction::ApplyVolatile {
                side: target_side,
                volatile,
            });
        }
        _ => {
            if target_side != user_side && target.has_volatile(VolatileStatus::Substitute) {
                return;
            }
            branch.push(BattleInstruction::ApplyVolatile {
                side: target_side,
                volatile,
            });
        }
    }
}

fn push_side_condition_payload(branch: &mut Branch, target_side: SideId, condition: SideCondition) {
    let current = branch.state.side(target_side).condition(condition);

    match condition {
        SideCondition::StealthRock | SideCondition::Spikes | SideCondition::ToxicSpikes => {
            let cap = condition.max_layers().unwrap_or(1);
            if current < cap {
                branch.push(BattleInstruction::SideConditionStart {
                    side: target_side,
                    condition,
                    amount: 1,
                });
            }
        }
        SideCondition::Reflect | SideCondition::LightScreen => {
            if current == 0 {
                branch.push(BattleInstruction::SideConditionStart {
                    side: target_side,
                    condition,
                    amount: SCREEN_TURNS,
                });
            }
        }
        SideCondition::AuroraVeil => {
            // Only forms in snow, and never stacks.
            if current == 0 && branch.state.weather == Some(schema::Weather::Snow) {
                branch.push(BattleInstruction::SideConditionStart {
                    side: target_side,
                    condition,
                    amount: SCREEN_TURNS,
                });
            }
        }
        SideCondition::Tailwind => {
            if current == 0 {
                branch.push(BattleInstruction::SideConditionStart {
                    side: target_side,
                    condition,
                    amount: TAILWIND_TURNS,
                });
            }
        }
        SideCondition::ToxicCount => {
            branch.push(BattleInstruction::SideConditionStart {
                side: target_side,
                condition,
                amount: 1,
            });
        }
    }
}

/// Forced switch: one branch per alive bench slot, uniformly weighted, each
/// carrying the replacement's full switch-in effects. A phased-out creature
/// marks the branch frozen.
fn drag_out_defender(branch: Branch, defender_side: SideId, finished: &mut Vec<Branch>) {
    let slots = branch.state.side(defender_side).alive_bench_slots();
    if slots.is_empty() {
        finished.push(branch);
        return;
    }

    let weight = 1.0 / slots.len() as f64;
    for slot in slots {
        let mut dragged = branch.fork(weight);
        let from_slot = dragged.state.side(defender_side).active_index;
        push_switch_out_cleanup(&mut dragged, defender_side);
        dragged.push(BattleInstruction::Switch {
            side: defender_side,
            from_slot,
            to_slot: slot,
        });
        push_switch_in_effects(&mut dragged, defender_side);
        dragged.frozen = true;
        finished.push(dragged);
    }
}

// ============================================================================
// Residual (end-of-turn) phase
// ============================================================================

fn run_residual_phase(branches: Vec<Branch>, dex: &Dex) -> Vec<Branch> {
    branches
        .into_iter()
        .map(|branch| {
            if branch.frozen {
                branch
            } else {
                apply_residuals(branch, dex)
            }
        })
        .collect()
}

/// End-of-turn effects in their fixed total order. A creature dropped to
/// 0 HP mid-phase takes no further residual steps, but the other side's
/// steps still proceed.
fn apply_residuals(mut branch: Branch, _dex: &Dex) -> Branch {
    let order = residual_side_order(&branch.state);

    // 1. Weather damage.
    if branch.state.weather == Some(schema::Weather::Sand) {
        for side in order {
            let Some(active) = branch.active(side) else { continue };
            if active.is_fainted()
                || abilities::blocks_indirect_damage(active.ability)
                || active.types.iter().any(|t| {
                    matches!(
                        t,
                        PokemonType::Rock | PokemonType::Ground | PokemonType::Steel
                    )
                })
            {
                continue;
            }
            let chip = (active.max_hp / 16).max(1);
            push_clamped_damage(&mut branch, side, chip);
            if branch.active_fainted(side) {
                branch.frozen = true;
            }
        }
    }

    // 2. Terrain residual: Grassy Terrain heals grounded actives.
    if branch.state.terrain == Some(schema::Terrain::GrassyTerrain) {
        for side in order {
            let Some(active) = branch.active(side) else { continue };
            if active.is_fainted() || !active.is_grounded() {
                continue;
            }
            let heal = (active.max_hp / 16).min(missing_hp(active));
            if heal > 0 {
                branch.push(BattleInstruction::Heal { side, amount: heal });
            }
        }
    }

    // 3. Passive item healing and damage.
    for side in order {
        let Some(active) = branch.active(side) else { continue };
        if active.is_fainted() {
            continue;
        }
        let Some((num, den)) = items::residual_fraction(active) else {
            continue;
        };
        if num > 0 {
            let heal = (active.max_hp / den).min(missing_hp(active));
            if heal > 0 {
                branch.push(BattleInstruction::Heal { side, amount: heal });
            }
        } else if !abilities::blocks_indirect_damage(active.ability) {
            let damage = active.max_hp / den;
            push_clamped_damage(&mut branch, side, damage);
            if branch.active_fainted(side) {
                branch.frozen = true;
            }
        }
    }

    // 4. Non-volatile status damage. The toxic counter increments every turn
    //    the status persists, even for damage-immune holders.
    for side in order {
        let Some(active) = branch.active(side) else { continue };
        if active.is_fainted() {
            continue;
        }
        let max_hp = active.max_hp;
        let immune = abilities::blocks_indirect_damage(active.ability);
        match active.status {
            Some(StatusCondition::Burn) if !immune => {
                push_clamped_damage(&mut branch, side, (max_hp / 16).max(1));
            }
            Some(StatusCondition::Poison) if !immune => {
                push_clamped_damage(&mut branch, side, (max_hp / 8).max(1));
            }
            Some(StatusCondition::Toxic) => {
                if !immune {
                    let count = branch.state.side(side).condition(SideCondition::ToxicCount);
                    let damage =
                        (max_hp as u32 * (count as u32 + 1) / 16).max(1) as u16;
                    push_clamped_damage(&mut branch, side, damage);
                }
                branch.push(BattleInstruction::SideConditionStart {
                    side,
                    condition: SideCondition::ToxicCount,
                    amount: 1,
                });
            }
            _ => {}
        }
        if branch.active_fainted(side) {
            branch.frozen = true;
        }
    }

    // 5. Leech Seed: drain from the seeded creature, heal the opposing
    //    active, never overhealing. Skipped entirely if the seeded creature
    //    already fainted this phase.
    for side in order {
        let Some(active) = branch.active(side) else { continue };
        if active.is_fainted()
            || !active.has_volatile(VolatileStatus::LeechSeed)
            || abilities::blocks_indirect_damage(active.ability)
        {
            continue;
        }
        let drained = ((active.max_hp / 8).max(1)).min(active.current_hp);
        push_clamped_damage(&mut branch, side, drained);
        if branch.active_fainted(side) {
            branch.frozen = true;
        }
        let opponent = side.opponent();
        if let Some(receiver) = branch.active(opponent) {
            if !receiver.is_fainted() {
                let heal = drained.min(missing_hp(receiver));
                if heal > 0 {
                    branch.push(BattleInstruction::Heal {
                        side: opponent,
                        amount: heal,
                    });
                }
            }
        }
    }

    // 6. Wish always ticks down; on expiry it heals whoever is active now.
    for side in order {
        let pending = branch.state.side(side).wish;
        let Some((turns, amount)) = pending else { continue };
        if turns == 0 {
            continue;
        }
        branch.push(BattleInstruction::DecrementWish { side });
        if turns == 1 {
            if let Some(active) = branch.active(side) {
                if !active.is_fainted() {
                    let heal = amount.min(missing_hp(active));
                    if heal > 0 {
                        branch.push(BattleInstruction::Heal { side, amount: heal });
                    }
                }
            }
        }
    }

    // 7. Future Sight resolves against the opposing active, respecting type
    //    immunity and screens at resolution time.
    for side in order {
        let pending = branch.state.side(side).future_sight;
        let Some((turns, source_slot)) = pending else { continue };
        if turns == 0 {
            continue;
        }
        branch.push(BattleInstruction::DecrementFutureSight { side });
        if turns == 1 {
            let target_side = side.opponent();
            if !branch.active_fainted(target_side) {
                let damage =
                    future_sight_damage(&branch.state, side, source_slot as usize);
                if damage > 0 {
                    push_clamped_damage(&mut branch, target_side, damage);
                    if branch.active_fainted(target_side) {
                        branch.frozen = true;
                    }
                }
            }
        }
    }

    // 8. Timed side conditions tick down and expire; one-turn volatiles clear.
    for side in order {
        for condition in [
            SideCondition::Reflect,
            SideCondition::LightScreen,
            SideCondition::AuroraVeil,
            SideCondition::Tailwind,
        ] {
            if branch.state.side(side).condition(condition) > 0 {
                branch.push(BattleInstruction::SideConditionEnd {
                    side,
                    condition,
                    amount: 1,
                });
            }
        }
        if let Some(active) = branch.active(side) {
            let mut expiring: Vec<VolatileStatus> = [VolatileStatus::Flinch, VolatileStatus::Protect]
                .into_iter()
                .filter(|v| active.has_volatile(*v))
                .collect();
            expiring.sort();
            for volatile in expiring {
                branch.push(BattleInstruction::RemoveVolatile { side, volatile });
            }
        }
    }

    // 9. Speed Boost and similar end-of-turn abilities.
    for side in order {
        let Some(active) = branch.active(side) else { continue };
        if active.is_fainted() {
            continue;
        }
        if active.ability == schema::Ability::SpeedBoost {
            let current = active.boost(Stat::Speed);
            branch.push(BattleInstruction::Boost {
                side,
                stat: Stat::Speed,
                delta: effective_boost_delta(current, 1),
            });
        }
    }

    branch
}

/// Residual steps run in current speed order, faster side first.
fn residual_side_order(state: &BattleState) -> [SideId; 2] {
    let user_speed = effective_speed(state, SideId::User);
    let opponent_speed = effective_speed(state, SideId::Opponent);
    if opponent_speed > user_speed {
        [SideId::Opponent, SideId::User]
    } else {
        [SideId::User, SideId::Opponent]
    }
}

/// A delayed Future Sight strike: the stored caster's Special Attack against
/// the current defender, with screens and the type chart applied at
/// resolution time. Always computed at the average roll.
fn future_sight_damage(state: &BattleState, caster_side: SideId, source_slot: usize) -> u16 {
    let Some(source) = state.side(caster_side).team[source_slot].as_ref() else {
        return 0;
    };
    let target_side = caster_side.opponent();
    let Some(target) = state.side(target_side).active() else {
        return 0;
    };

    let effectiveness =
        PokemonType::effectiveness_against(PokemonType::Psychic, &target.types);
    if effectiveness == 0.0 {
        return 0;
    }

    let attack = source.stats[3] as u32;
    let defense = (target.stats[4] as u32).max(1);
    let level_term = 2 * source.level as u32 / 5 + 2;
    let base = (level_term * 120 * attack / defense) / 50 + 2;

    let mut damage = base as f64;
    if source.types.contains(&PokemonType::Psychic) {
        damage *= 1.5;
    }
    damage *= effectiveness;
    let screened = state.side(target_side).condition(SideCondition::LightScreen) > 0
        || state.side(target_side).condition(SideCondition::AuroraVeil) > 0;
    if screened {
        damage *= 0.5;
    }
    ((damage * 0.925).floor() as u16).max(1)
}

// ============================================================================
// Shared helpers
// ============================================================================

fn resolve_target(user: SideId, target: Target) -> SideId {
    match target {
        Target::User => user,
        Target::Opponent => user.opponent(),
    }
}

fn missing_hp(pokemon: &PokemonInst) -> u16 {
    pokemon.max_hp - pokemon.current_hp
}

/// Type- and ability-based immunity to a non-volatile status.
fn can_receive_status(pokemon: &PokemonInst, status: StatusCondition) -> bool {
    if abilities::prevents_status(pokemon.ability, status) {
        return false;
    }
    match status {
        StatusCondition::Burn => !pokemon.types.contains(&PokemonType::Fire),
        StatusCondition::Paralysis => !pokemon.types.contains(&PokemonType::Electric),
        StatusCondition::Poison | StatusCondition::Toxic => {
            !pokemon.types.contains(&PokemonType::Poison)
                && !pokemon.types.contains(&PokemonType::Steel)
        }
        StatusCondition::Freeze => !pokemon.types.contains(&PokemonType::Ice),
        StatusCondition::Sleep => true,
    }
}

/// Emit a Damage edit pre-clamped to the target's remaining HP. Zero damage
/// emits nothing.
fn push_clamped_damage(branch: &mut Branch, side: SideId, amount: u16) {
    let Some(active) = branch.active(side) else {
        return;
    };
    let clamped = amount.min(active.current_hp);
    if clamped > 0 {
        branch.push(BattleInstruction::Damage {
            side,
            amount: clamped,
        });
    }
}

/// Self boosts (Swords Dance, Close Combat drops) always emit their clamped
/// effective delta, even a 0 at the cap: the action stays legal and the edit
/// records that nothing moved.
fn push_self_boosts(branch: &mut Branch, side: SideId, boosts: &[(Stat, i8)]) {
    if boosts.is_empty() {
        return;
    }
    if branch.active_fainted(side) {
        return;
    }
    for (stat, delta) in boosts {
        let current = branch.active(side).expect("actor exists").boost(*stat);
        branch.push(BattleInstruction::Boost {
            side,
            stat: *stat,
            delta: effective_boost_delta(current, *delta),
        });
    }
}

fn push_target_boosts(branch: &mut Branch, target_side: SideId, boosts: &[(Stat, i8)]) {
    for (stat, delta) in boosts {
        let Some(target) = branch.active(target_side) else {
            return;
        };
        if target.is_fainted() {
            return;
        }
        let current = target.boost(*stat);
        branch.push(BattleInstruction::Boost {
            side: target_side,
            stat: *stat,
            delta: effective_boost_delta(current, *delta),
        });
    }
}
