use crate::battle::state::{BattleState, SideId};
use schema::{
    Item, Move, PokemonType, SideCondition, Stat, StatusCondition, Terrain, VolatileStatus,
    Weather,
};
use serde::{Deserialize, Serialize};

/// Number of residual phases a Wish stays pending, counting the turn it was
/// cast: it resolves at the end of the following turn.
pub const WISH_TURNS: u8 = 2;
/// Future Sight lands at the end of the second turn after the cast.
pub const FUTURE_SIGHT_TURNS: u8 = 3;

/// Atomic, reversible state edits.
///
/// Every variant carries the operands needed both to apply and to undo it;
/// reversal never re-derives "old" values from the current state, because the
/// state may have moved on since the edit was recorded. Rule logic (clamping,
/// immunity, ordering) lives in the resolver, which is responsible for only
/// emitting edits whose operands are already exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleInstruction {
    Damage {
        side: SideId,
        amount: u16,
    },
    Heal {
        side: SideId,
        amount: u16,
    },
    Boost {
        side: SideId,
        stat: Stat,
        delta: i8,
    },
    ApplyStatus {
        side: SideId,
        status: StatusCondition,
    },
    RemoveStatus {
        side: SideId,
        status: StatusCondition,
    },
    ApplyVolatile {
        side: SideId,
        volatile: VolatileStatus,
    },
    RemoveVolatile {
        side: SideId,
        volatile: VolatileStatus,
    },
    Switch {
        side: SideId,
        from_slot: usize,
        to_slot: usize,
    },
    SideConditionStart {
        side: SideId,
        condition: SideCondition,
        amount: u8,
    },
    SideConditionEnd {
        side: SideId,
        condition: SideCondition,
        amount: u8,
    },
    WeatherStart {
        weather: Weather,
        previous: Option<Weather>,
    },
    FieldStart {
        terrain: Terrain,
        previous: Option<Terrain>,
    },
    FieldEnd {
        terrain: Terrain,
    },
    ToggleTrickRoom,
    ChangeType {
        side: SideId,
        new_types: Vec<PokemonType>,
        old_types: Vec<PokemonType>,
    },
    ChangeItem {
        side: SideId,
        new_item: Option<Item>,
        old_item: Option<Item>,
    },
    ChangeStats {
        side: SideId,
        new_stats: [u16; 6],
        old_stats: [u16; 6],
    },
    DisableMove {
        side: SideId,
        move_: Move,
    },
    EnableMove {
        side: SideId,
        move_: Move,
    },
    DecrementPP {
        side: SideId,
        move_: Move,
        amount: u8,
    },
    StartWish {
        side: SideId,
        heal_amount: u16,
        previous: Option<(u8, u16)>,
    },
    DecrementWish {
        side: SideId,
    },
    StartFutureSight {
        side: SideId,
        source_slot: u8,
        previous: Option<(u8, u8)>,
    },
    DecrementFutureSight {
        side: SideId,
    },
    SetLastUsedMove {
        side: SideId,
        move_: Option<Move>,
        previous: Option<Move>,
    },
    SetLockedMove {
        side: SideId,
        move_: Option<Move>,
        previous: Option<Move>,
    },
    SetSubstituteHealth {
        side: SideId,
        new_hp: u16,
        old_hp: u16,
    },
}

/// Apply one instruction to the state.
pub fn apply(state: &mut BattleState, instruction: &BattleInstruction) {
    use BattleInstruction::*;

    match instruction {
        Damage { side, amount } => {
            let active = state
                .side_mut(*side)
                .active_mut()
                .expect("Damage requires an active Pokemon");
            debug_assert!(active.current_hp >= *amount, "resolver must pre-clamp damage");
            active.current_hp -= amount;
        }
        Heal { side, amount } => {
            let active = state
                .side_mut(*side)
                .active_mut()
                .expect("Heal requires an active Pokemon");
            active.current_hp += amount;
            debug_assert!(active.current_hp <= active.max_hp, "resolver must pre-clamp healing");
        }
        Boost { side, stat, delta } => {
            state
                .side_mut(*side)
                .active_mut()
                .expect("Boost requires an active Pokemon")
                .shift_boost(*stat, *delta);
        }
        ApplyStatus { side, status } => {
            let active = state
                .side_mut(*side)
                .active_mut()
                .expect("ApplyStatus requires an active Pokemon");
            debug_assert!(active.status.is_none(), "statuses are mutually exclusive");
            active.status = Some(*status);
        }
        RemoveStatus { side, status } => {
            let active = state
                .side_mut(*side)
                .active_mut()
                .expect("RemoveStatus requires an active Pokemon");
            debug_assert_eq!(active.status, Some(*status));
            active.status = None;
        }
        ApplyVolatile { side, volatile } => {
            state
                .side_mut(*side)
                .active_mut()
                .expect("ApplyVolatile requires an active Pokemon")
                .volatiles
                .insert(*volatile);
        }
        RemoveVolatile { side, volatile } => {
            // Set-discard semantics: removing an absent volatile is a no-op.
            state
                .side_mut(*side)
                .active_mut()
                .expect("RemoveVolatile requires an active Pokemon")
                .volatiles
                .remove(volatile);
        }
        Switch {
            side,
            from_slot,
            to_slot,
        } => {
            let side_state = state.side_mut(*side);
            debug_assert_eq!(side_state.active_index, *from_slot);
            side_state.active_index = *to_slot;
        }
        SideConditionStart {
            side,
            condition,
            amount,
        } => {
            state
                .side_mut(*side)
                .shift_condition(*condition, *amount as i16);
        }
        SideConditionEnd {
            side,
            condition,
            amount,
        } => {
            state
                .side_mut(*side)
                .shift_condition(*condition, -(*amount as i16));
        }
        WeatherStart { weather, .. } => {
            state.weather = Some(*weather);
        }
        FieldStart { terrain, .. } => {
            state.terrain = Some(*terrain);
        }
        FieldEnd { .. } => {
            state.terrain = None;
        }
        ToggleTrickRoom => {
            state.trick_room = !state.trick_room;
        }
        ChangeType {
            side, new_types, ..
        } => {
            state
                .side_mut(*side)
                .active_mut()
                .expect("ChangeType requires an active Pokemon")
                .types = new_types.clone();
        }
        ChangeItem { side, new_item, .. } => {
            state
                .side_mut(*side)
                .active_mut()
                .expect("ChangeItem requires an active Pokemon")
                .item = *new_item;
        }
        ChangeStats {
            side, new_stats, ..
        } => {
            state
                .side_mut(*side)
                .active_mut()
                .expect("ChangeStats requires an active Pokemon")
                .stats = *new_stats;
        }
        DisableMove { side, move_ } => {
            state
                .side_mut(*side)
                .active_mut()
                .expect("DisableMove requires an active Pokemon")
                .move_slot_mut(*move_)
                .expect("DisableMove targets a known move")
                .disabled = true;
        }
        EnableMove { side, move_ } => {
            state
                .side_mut(*side)
                .active_mut()
                .expect("EnableMove requires an active Pokemon")
                .move_slot_mut(*move_)
                .expect("EnableMove targets a known move")
                .disabled = false;
        }
        DecrementPP {
            side,
            move_,
            amount,
        } => {
            let slot = state
                .side_mut(*side)
                .active_mut()
                .expect("DecrementPP requires an active Pokemon")
                .move_slot_mut(*move_)
                .expect("DecrementPP targets a known move");
            debug_assert!(slot.pp >= *amount);
            slot.pp -= amount;
        }
        StartWish {
            side, heal_amount, ..
        } => {
            state.side_mut(*side).wish = Some((WISH_TURNS, *heal_amount));
        }
        DecrementWish { side } => {
            let wish = state
                .side_mut(*side)
                .wish
                .as_mut()
                .expect("DecrementWish requires a pending wish");
            debug_assert!(wish.0 > 0);
            wish.0 -= 1;
        }
        StartFutureSight {
            side, source_slot, ..
        } => {
            state.side_mut(*side).future_sight = Some((FUTURE_SIGHT_TURNS, *source_slot));
        }
        DecrementFutureSight { side } => {
            let pending = state
                .side_mut(*side)
                .future_sight
                .as_mut()
                .expect("DecrementFutureSight requires a pending future sight");
            debug_assert!(pending.0 > 0);
            pending.0 -= 1;
        }
        SetLastUsedMove { side, move_, .. } => {
            state.side_mut(*side).last_used_move = *move_;
        }
        SetLockedMove { side, move_, .. } => {
            state
                .side_mut(*side)
                .active_mut()
                .expect("SetLockedMove requires an active Pokemon")
                .locked_move = *move_;
        }
        SetSubstituteHealth { side, new_hp, .. } => {
            state
                .side_mut(*side)
                .active_mut()
                .expect("SetSubstituteHealth requires an active Pokemon")
                .substitute_hp = *new_hp;
        }
    }
}

/// Undo one instruction. Only valid in exact LIFO order relative to `apply`;
/// out-of-order reversal is outside the contract.
pub fn reverse(state: &mut BattleState, instruction: &BattleInstruction) {
    use BattleInstruction::*;

    match instruction {
        Damage { side, amount } => apply(state, &Heal {
            side: *side,
            amount: *amount,
        }),
        Heal { side, amount } => apply(state, &Damage {
            side: *side,
            amount: *amount,
        }),
        Boost { side, stat, delta } => apply(state, &Boost {
            side: *side,
            stat: *stat,
            delta: -delta,
        }),
        ApplyStatus { side, status } => apply(state, &RemoveStatus {
            side: *side,
            status: *status,
        }),
        RemoveStatus { side, status } => apply(state, &ApplyStatus {
            side: *side,
            status: *status,
        }),
        ApplyVolatile { side, volatile } => apply(state, &RemoveVolatile {
            side: *side,
            volatile: *volatile,
        }),
        RemoveVolatile { side, volatile } => apply(state, &ApplyVolatile {
            side: *side,
            volatile: *volatile,
        }),
        Switch {
            side,
            from_slot,
            to_slot,
        } => apply(state, &Switch {
            side: *side,
            from_slot: *to_slot,
            to_slot: *from_slot,
        }),
        SideConditionStart {
            side,
            condition,
            amount,
        } => apply(state, &SideConditionEnd {
            side: *side,
            condition: *condition,
            amount: *amount,
        }),
        SideConditionEnd {
            side,
            condition,
            amount,
        } => apply(state, &SideConditionStart {
            side: *side,
            condition: *condition,
            amount: *amount,
        }),
        WeatherStart { previous, .. } => {
            state.weather = *previous;
        }
        FieldStart { previous, .. } => {
            state.terrain = *previous;
        }
        FieldEnd { terrain } => {
            state.terrain = Some(*terrain);
        }
        ToggleTrickRoom => {
            state.trick_room = !state.trick_room;
        }
        ChangeType {
            side, old_types, ..
        } => {
            state
                .side_mut(*side)
                .active_mut()
                .expect("ChangeType requires an active Pokemon")
                .types = old_types.clone();
        }
        ChangeItem { side, old_item, .. } => {
            state
                .side_mut(*side)
                .active_mut()
                .expect("ChangeItem requires an active Pokemon")
                .item = *old_item;
        }
        ChangeStats {
            side, old_stats, ..
        } => {
            state
                .side_mut(*side)
                .active_mut()
                .expect("ChangeStats requires an active Pokemon")
                .stats = *old_stats;
        }
        DisableMove { side, move_ } => apply(state, &EnableMove {
            side: *side,
            move_: *move_,
        }),
        EnableMove { side, move_ } => apply(state, &DisableMove {
            side: *side,
            move_: *move_,
        }),
        DecrementPP {
            side,
            move_,
            amount,
        } => {
            state
                .side_mut(*side)
                .active_mut()
                .expect("DecrementPP requires an active Pokemon")
                .move_slot_mut(*move_)
                .expect("DecrementPP targets a known move")
                .pp += amount;
        }
        StartWish { side, previous, .. } => {
            state.side_mut(*side).wish = *previous;
        }
        DecrementWish { side } => {
            let wish = state
                .side_mut(*side)
                .wish
                .as_mut()
                .expect("DecrementWish requires a pending wish");
            wish.0 += 1;
        }
        StartFutureSight { side, previous, .. } => {
            state.side_mut(*side).future_sight = *previous;
        }
        DecrementFutureSight { side } => {
            let pending = state
                .side_mut(*side)
                .future_sight
                .as_mut()
                .expect("DecrementFutureSight requires a pending future sight");
            pending.0 += 1;
        }
        SetLastUsedMove { side, previous, .. } => {
            state.side_mut(*side).last_used_move = *previous;
        }
        SetLockedMove { side, previous, .. } => {
            state
                .side_mut(*side)
                .active_mut()
                .expect("SetLockedMove requires an active Pokemon")
                .locked_move = *previous;
        }
        SetSubstituteHealth { side, old_hp, .. } => {
            state
                .side_mut(*side)
                .active_mut()
                .expect("SetSubstituteHealth requires an active Pokemon")
                .substitute_hp = *old_hp;
        }
    }
}

/// Apply a list of instructions in order.
pub fn apply_sequence(state: &mut BattleState, instructions: &[BattleInstruction]) {
    for instruction in instructions {
        apply(state, instruction);
    }
}

/// Reverse a list of applied instructions, last first.
pub fn reverse_sequence(state: &mut BattleState, instructions: &[BattleInstruction]) {
    for instruction in instructions.iter().rev() {
        reverse(state, instruction);
    }
}
