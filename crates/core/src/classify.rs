//! Anomaly classification over a realized schedule.
//!
//! Classification is a pure function of the step sequence and the rule
//! sets: no randomness, no state. A [`PrecedenceRule`] *holds* on a
//! schedule iff both of its operations occur in the schedule and the
//! `before` one occurs first; a rule naming an operation the schedule does
//! not contain is simply unsatisfied.

use alloc::vec::Vec;

use crate::op::Operation;
use crate::rules::{AnomalyRuleSet, PrecedenceRule};

/// Evaluate every rule set against `steps`, one verdict per rule set.
///
/// `attributes_match` reports whether both transactions worked on the same
/// database attribute. When they did not, no anomaly between them is
/// observable under this model and every verdict is `false`, regardless of
/// the ordering.
#[must_use]
pub fn classify(
    steps: &[Operation],
    attributes_match: bool,
    rule_sets: &[AnomalyRuleSet],
) -> Vec<bool> {
    if attributes_match {
        classify_ignoring_attributes(steps, rule_sets)
    } else {
        tracing::trace!("attribute mismatch, all verdicts forced false");
        alloc::vec![false; rule_sets.len()]
    }
}

/// Evaluate every rule set against `steps`, skipping the attribute check.
///
/// Only meant for the generator's trial evaluation, where it decides
/// whether a candidate ordering is *capable* of an anomaly before the
/// attributes are taken into account. Final verdicts always go through
/// [`classify`].
#[must_use]
pub fn classify_ignoring_attributes(
    steps: &[Operation],
    rule_sets: &[AnomalyRuleSet],
) -> Vec<bool> {
    rule_sets
        .iter()
        .map(|rule_set| verdict(steps, rule_set))
        .collect()
}

fn verdict(steps: &[Operation], rule_set: &AnomalyRuleSet) -> bool {
    let whitelisted = rule_set.whitelists.is_empty()
        || rule_set
            .whitelists
            .iter()
            .any(|alternative| alternative.iter().all(|rule| rule_holds(steps, rule)));

    let blacklisted = rule_set
        .blacklist
        .iter()
        .any(|rule| rule_holds(steps, rule));

    let verdict = whitelisted && !blacklisted;
    tracing::trace!(label = %rule_set.label, whitelisted, blacklisted, "rule set evaluated");
    verdict
}

/// Both operations occur in `steps` and `before` comes first.
fn rule_holds(steps: &[Operation], rule: &PrecedenceRule) -> bool {
    let position = |op: &Operation| steps.iter().position(|step| step == op);
    match (position(&rule.before), position(&rule.after)) {
        (Some(before), Some(after)) => before < after,
        _ => false,
    }
}
