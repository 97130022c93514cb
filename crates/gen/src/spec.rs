//! The schedule specification: generation policy for one exercise series.

use anomtrain_core::op::{OpKind, Operation, Txn};
use anomtrain_core::render::OpTexts;
use anomtrain_core::rules::{AnomalyRuleSet, PrecedenceRule};
use anomtrain_core::section::TxnParams;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

const fn op(txn: Txn, kind: OpKind) -> Operation {
    Operation::new(txn, kind)
}

const fn rule(before: Operation, after: Operation) -> PrecedenceRule {
    PrecedenceRule::new(before, after)
}

/// The per-transaction chain: read0 < read < add < write < rollback,
/// for both transactions.
fn default_rules() -> Vec<PrecedenceRule> {
    let mut rules = Vec::with_capacity(8);
    for txn in Txn::BOTH {
        rules.extend([
            rule(op(txn, OpKind::PreRead), op(txn, OpKind::Read)),
            rule(op(txn, OpKind::Read), op(txn, OpKind::Add)),
            rule(op(txn, OpKind::Add), op(txn, OpKind::Write)),
            rule(op(txn, OpKind::Write), op(txn, OpKind::Rollback)),
        ]);
    }
    rules
}

/// The trainer's stock anomaly patterns, each with the T1/T2-mirrored
/// alternative.
fn default_rule_sets() -> Vec<AnomalyRuleSet> {
    let mirrored = |pattern: fn(Txn, Txn) -> Vec<PrecedenceRule>| {
        vec![pattern(Txn::T1, Txn::T2), pattern(Txn::T2, Txn::T1)]
    };

    vec![
        AnomalyRuleSet::new(
            "Lost Update",
            mirrored(|victim, other| {
                vec![
                    rule(op(victim, OpKind::Read), op(other, OpKind::Write)),
                    rule(op(other, OpKind::Write), op(victim, OpKind::Write)),
                ]
            }),
        ),
        AnomalyRuleSet::new(
            "Non-Repeatable Read",
            mirrored(|victim, other| {
                vec![
                    rule(op(victim, OpKind::PreRead), op(other, OpKind::Write)),
                    rule(op(other, OpKind::Write), op(victim, OpKind::Read)),
                ]
            }),
        ),
        AnomalyRuleSet::new(
            "Dirty Read",
            mirrored(|writer, reader| {
                vec![
                    rule(op(writer, OpKind::Write), op(reader, OpKind::Read)),
                    rule(op(reader, OpKind::Read), op(writer, OpKind::Rollback)),
                ]
            }),
        ),
    ]
}

/// A preset schedule consumed instead of generating one.
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct FixedSchedule {
    pub a: u32,
    pub b: u32,
    pub steps: Vec<Operation>,
    pub t1: TxnParams,
    pub t2: TxnParams,
}

/// Generation policy for one exercise series.
///
/// The default value reproduces the stock trainer: the full five-kind pool
/// for both transactions, the per-transaction ordering chain, the Lost
/// Update / Non-Repeatable Read / Dirty Read rule sets, and the stock
/// probabilities and value ranges.
///
/// Probabilities are in `0.0..=1.0`. Ranges are inclusive `[min, max]`
/// pairs.
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, TypedBuilder)]
#[serde(default)]
pub struct ScheduleSpec {
    /// Operation kinds per transaction, in pool order. `None` gives both
    /// transactions the full pool.
    #[builder(default)]
    pub txn_ops: Option<[Vec<OpKind>; 2]>,
    /// Precedence constraints every schedule must satisfy.
    #[builder(default = default_rules())]
    pub rules: Vec<PrecedenceRule>,
    /// Anomaly rule sets to classify and quiz on. Empty turns the trainer
    /// into a plain schedule generator.
    #[builder(default = default_rule_sets())]
    pub rule_sets: Vec<AnomalyRuleSet>,
    /// Probability that a pre-read step survives.
    #[builder(default = 0.5)]
    pub pre_read: f64,
    /// Probability that a rollback step survives (truncating the rest of
    /// its transaction).
    #[builder(default = 0.5)]
    pub rollback: f64,
    /// Probability that a generated schedule must contain at least one
    /// anomaly.
    #[builder(default = 0.9)]
    pub anomaly_bias: f64,
    /// Probability, per transaction, of working on attribute B instead
    /// of A.
    #[builder(default = 0.1)]
    pub second_attribute: f64,
    /// Inclusive range of the starting attribute values.
    #[builder(default = (10, 80))]
    pub value_range: (u32, u32),
    /// Inclusive range of the per-transaction summands.
    #[builder(default = (1, 9))]
    pub summand_range: (u32, u32),
    /// Fixed number of rounds; `None` runs an open-ended session.
    #[builder(default = Some(10))]
    pub rounds: Option<u32>,
    /// Display templates for the table rendering seam.
    #[builder(default)]
    pub ops: OpTexts,
    /// Preset schedules consumed round-by-round before any generation.
    #[builder(default)]
    pub fixed: Vec<FixedSchedule>,
}

impl Default for ScheduleSpec {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ScheduleSpec {
    /// The full candidate step pool: T1's kinds then T2's.
    #[must_use]
    pub fn pool(&self) -> Vec<Operation> {
        Txn::BOTH
            .into_iter()
            .flat_map(|txn| {
                let kinds = self.txn_ops.as_ref().map_or(
                    OpKind::ALL.as_slice(),
                    |per_txn| per_txn[txn.index()].as_slice(),
                );
                kinds.iter().map(move |&kind| op(txn, kind))
            })
            .collect()
    }

    /// Precedence rules as the ordered pairs the sequencer consumes.
    #[must_use]
    pub fn rule_pairs(&self) -> Vec<(Operation, Operation)> {
        self.rules.iter().map(PrecedenceRule::as_pair).collect()
    }

    /// Whether this exercise series can involve the second attribute (and
    /// the rendering should include its columns).
    #[must_use]
    pub fn uses_second_attribute(&self) -> bool {
        self.second_attribute > 0.0
    }
}
