use crate::battle::instructions::BattleInstruction;
use ordered_float::OrderedFloat;
use rand::Rng;
use std::collections::HashMap;

/// One hypothetical future reachable from the turn's start: the probability
/// of getting there, the exact edit sequence that produces it, and whether
/// the branch terminated early (faint, phase-out, or a dead-end miss).
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedOutcome {
    pub probability: f64,
    pub instructions: Vec<BattleInstruction>,
    pub frozen: bool,
}

impl WeightedOutcome {
    pub fn new(probability: f64) -> Self {
        Self {
            probability,
            instructions: Vec::new(),
            frozen: false,
        }
    }
}

/// Merge outcomes with byte-identical edit sequences, summing probabilities.
///
/// This is required for correctness, not just compactness: independent forks
/// frequently converge on identical futures (e.g. a secondary effect that
/// cannot apply) and the caller is promised one leaf per distinct future.
/// Merging is associative and commutative; the result is sorted by descending
/// probability so output order never depends on fork order.
pub fn merge_duplicates(outcomes: Vec<WeightedOutcome>) -> Vec<WeightedOutcome> {
    let mut index: HashMap<(Vec<BattleInstruction>, bool), usize> = HashMap::new();
    let mut merged: Vec<WeightedOutcome> = Vec::new();

    for outcome in outcomes {
        let key = (outcome.instructions.clone(), outcome.frozen);
        match index.get(&key) {
            Some(&i) => merged[i].probability += outcome.probability,
            None => {
                index.insert(key, merged.len());
                merged.push(outcome);
            }
        }
    }

    merged.sort_by_key(|o| OrderedFloat(-o.probability));
    merged
}

/// Sum of all leaf probabilities; 1.0 within tolerance for a full turn.
pub fn total_probability(outcomes: &[WeightedOutcome]) -> f64 {
    outcomes.iter().map(|o| o.probability).sum()
}

/// Sample one outcome according to the leaf weights. Used by consumers that
/// want to play a battle forward rather than search it.
pub fn sample_outcome<'a, R: Rng>(
    outcomes: &'a [WeightedOutcome],
    rng: &mut R,
) -> &'a WeightedOutcome {
    assert!(!outcomes.is_empty(), "cannot sample from an empty outcome set");
    let total = total_probability(outcomes);
    let mut roll = rng.random_range(0.0..total);
    for outcome in outcomes {
        if roll < outcome.probability {
            return outcome;
        }
        roll -= outcome.probability;
    }
    outcomes.last().unwrap()
}
