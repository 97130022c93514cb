//! Randomized schedule generation.
//!
//! One [`generate`] call produces one classified
//! [`Section`]: sample the value parameters, then shuffle + sequence +
//! filter candidate orderings until one is novel (not in the session
//! history) and satisfies the anomaly policy, or the retry budget runs
//! out. The sequencer and classifier it drives are pure; all randomness is
//! concentrated here.

use anomtrain_core::classify::{classify, classify_ignoring_attributes};
use anomtrain_core::op::{Attribute, OpKind, Operation};
use anomtrain_core::section::{fingerprint, Section, TxnParams};
use anomtrain_core::sequencer::{sequence, CyclicConstraints};
use derive_more::From;
use hashbrown::HashSet;
use rand::distr::{Distribution, Uniform};
use rand::seq::SliceRandom;
use rand::RngExt;

use crate::spec::{FixedSchedule, ScheduleSpec};

/// Hard cap on shuffle-and-filter attempts per section.
pub const RETRY_BUDGET: usize = 500;

/// Error producing a section.
#[derive(Debug, From)]
pub enum Error {
    /// The precedence rules admit no valid order. Configuration bug,
    /// never retried.
    Cyclic(CyclicConstraints<Operation>),
    /// No novel, policy-satisfying schedule was found within
    /// [`RETRY_BUDGET`] attempts. `last` is the final candidate (already
    /// classified), so the caller can choose between accepting it and
    /// restarting the session.
    RetryBudgetExhausted { last: Box<Section> },
}

/// Generate one classified section.
///
/// `history` is the set of step-sequence fingerprints already revealed in
/// this session; any candidate whose fingerprint is in it gets rejected.
/// When rule sets are configured, a Bernoulli draw with
/// `spec.anomaly_bias` decides whether this section must exhibit at least
/// one anomaly; candidates are then retried until one of the rule sets
/// matches (evaluated ignoring the attribute assignment, which is fixed
/// before the retry loop).
///
/// The returned section carries its ground-truth verdicts; appending it to
/// the session is the caller's job.
///
/// # Errors
///
/// [`Error::Cyclic`] if the precedence rules are cyclic over the pool;
/// [`Error::RetryBudgetExhausted`] when the budget runs out, carrying the
/// last candidate for the caller's accept-or-restart policy.
///
/// # Panics
///
/// Panics if a configured probability is outside `0.0..=1.0` or a range
/// has `min > max`.
pub fn generate<R: RngExt>(
    spec: &ScheduleSpec,
    history: &HashSet<String>,
    rng: &mut R,
) -> Result<Section, Error> {
    let value = Uniform::new_inclusive(spec.value_range.0, spec.value_range.1).unwrap();
    let a = value.sample(rng);
    let b = value.sample(rng);

    let mut pick_attribute = |rng: &mut R| {
        if rng.random_bool(spec.second_attribute) {
            Attribute::B
        } else {
            Attribute::A
        }
    };
    let t1_attribute = pick_attribute(rng);
    let t2_attribute = pick_attribute(rng);

    let (s1, s2) = distinct_summands(spec.summand_range, rng);
    let t1 = TxnParams {
        attribute: t1_attribute,
        summand: s1,
    };
    let t2 = TxnParams {
        attribute: t2_attribute,
        summand: s2,
    };

    let rule_pairs = spec.rule_pairs();
    let anomaly_wanted = !spec.rule_sets.is_empty() && rng.random_bool(spec.anomaly_bias);

    let mut steps: Vec<Operation> = Vec::new();
    let mut accepted = false;
    for attempt in 1..=RETRY_BUDGET {
        let mut pool = spec.pool();
        pool.shuffle(rng);
        let ordered = sequence(&pool, &rule_pairs)?;
        steps = filter_steps(ordered, spec, rng);

        if history.contains(&fingerprint(&steps)) {
            continue;
        }
        if anomaly_wanted
            && !classify_ignoring_attributes(&steps, &spec.rule_sets).contains(&true)
        {
            continue;
        }

        tracing::debug!(attempt, steps = steps.len(), "schedule accepted");
        accepted = true;
        break;
    }

    let verdicts = classify(&steps, t1.attribute == t2.attribute, &spec.rule_sets);
    let section = Section {
        a,
        b,
        steps,
        t1,
        t2,
        verdicts,
        input: None,
        score: None,
    };

    if accepted {
        Ok(section)
    } else {
        tracing::debug!(budget = RETRY_BUDGET, "retry budget exhausted");
        Err(Error::RetryBudgetExhausted {
            last: Box::new(section),
        })
    }
}

/// Build a classified section from a preset schedule, skipping generation.
#[must_use]
pub fn section_from_fixed(spec: &ScheduleSpec, fixed: &FixedSchedule) -> Section {
    let verdicts = classify(
        &fixed.steps,
        fixed.t1.attribute == fixed.t2.attribute,
        &spec.rule_sets,
    );
    Section {
        a: fixed.a,
        b: fixed.b,
        steps: fixed.steps.clone(),
        t1: fixed.t1,
        t2: fixed.t2,
        verdicts,
        input: None,
        score: None,
    }
}

/// Two summands, resampled until they differ.
///
/// Equal summands would make value-based anomaly spotting ambiguous, so
/// they are ruled out by construction. A single-point range cannot yield
/// distinct values and is passed through as-is.
fn distinct_summands<R: RngExt>((min, max): (u32, u32), rng: &mut R) -> (u32, u32) {
    let summand = Uniform::new_inclusive(min, max).unwrap();
    let first = summand.sample(rng);
    let mut second = summand.sample(rng);
    while first == second && min < max {
        second = summand.sample(rng);
    }
    (first, second)
}

/// One left-to-right pass applying the probabilistic filters.
///
/// A pre-read survives with `spec.pre_read`. A rollback survives with
/// `spec.rollback` (independently per transaction); once kept, every later
/// step of the same transaction is discarded.
fn filter_steps<R: RngExt>(
    ordered: Vec<Operation>,
    spec: &ScheduleSpec,
    rng: &mut R,
) -> Vec<Operation> {
    let mut rolled_back = [false, false];
    ordered
        .into_iter()
        .filter(|step| {
            if rolled_back[step.txn.index()] {
                return false;
            }
            match step.kind {
                OpKind::PreRead => rng.random_bool(spec.pre_read),
                OpKind::Rollback => {
                    if rng.random_bool(spec.rollback) {
                        rolled_back[step.txn.index()] = true;
                        true
                    } else {
                        false
                    }
                }
                _ => true,
            }
        })
        .collect()
}
