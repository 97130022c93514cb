//! Exercise sections and session state.
//!
//! A [`Section`] is one revealed exercise instance: the realized step
//! sequence, the per-transaction parameters, the starting attribute values,
//! and the ground-truth verdicts computed at creation time. Submission
//! later fills in the user's input and the derived score; a section is
//! never removed from its session.
//!
//! [`SessionState`] is the aggregate the persistence boundary loads and
//! saves: the append-only section list, the running correct-count, and the
//! optional fixed round target. All mutation goes through an explicit
//! section cursor rather than "the last element".

use alloc::string::String;
use alloc::vec::Vec;

use derive_more::From;
use hashbrown::HashSet;

use crate::op::{Attribute, Operation, Txn};
use crate::score::{self, Answer, Score};

/// Per-transaction parameters of a section.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxnParams {
    /// Database attribute this transaction works on.
    #[cfg_attr(feature = "serde", serde(rename = "attr"))]
    pub attribute: Attribute,
    /// Summand of the transaction's arithmetic step.
    pub summand: u32,
}

/// One exercise instance, immutable once revealed except for the
/// submission fields.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Starting value of database attribute A.
    pub a: u32,
    /// Starting value of database attribute B.
    pub b: u32,
    /// The realized, ordered step sequence.
    pub steps: Vec<Operation>,
    pub t1: TxnParams,
    pub t2: TxnParams,
    /// Ground-truth verdicts, positionally aligned with the configured
    /// rule sets.
    pub verdicts: Vec<bool>,
    /// The user's answers, present once submitted.
    #[cfg_attr(feature = "serde", serde(default))]
    pub input: Option<Vec<Option<Answer>>>,
    /// Correctness summary, present once scored.
    #[cfg_attr(feature = "serde", serde(default))]
    pub score: Option<Score>,
}

impl Section {
    /// Parameters of the given transaction.
    #[must_use]
    pub const fn txn(&self, txn: Txn) -> &TxnParams {
        match txn {
            Txn::T1 => &self.t1,
            Txn::T2 => &self.t2,
        }
    }

    /// Whether both transactions work on the same database attribute.
    #[must_use]
    pub fn attributes_match(&self) -> bool {
        self.t1.attribute == self.t2.attribute
    }

    /// Canonical string form of the step sequence, the unit of
    /// session-level duplicate detection.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.steps)
    }
}

/// Canonical comma-joined token form of a step sequence.
#[must_use]
pub fn fingerprint(steps: &[Operation]) -> String {
    let tokens: Vec<String> = steps.iter().map(|step| step.token()).collect();
    tokens.join(",")
}

/// Error mutating a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, From)]
pub enum Error {
    /// The cursor does not name a section of this session.
    #[from(skip)]
    NoSuchSection { cursor: usize },
    /// The section was already scored; a revealed solution is final.
    #[from(skip)]
    AlreadyScored { cursor: usize },
    /// The submission was rejected by the scorer.
    Incomplete(score::Error),
}

/// Session-long aggregate of sections and correctness.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Number of fully correct submissions.
    pub correct: u32,
    /// Fixed number of rounds, if the session has one.
    #[cfg_attr(feature = "serde", serde(default))]
    pub total: Option<u32>,
    /// All revealed sections, in order.
    pub sections: Vec<Section>,
}

impl SessionState {
    /// Fresh session, optionally with a fixed round target.
    #[must_use]
    pub const fn new(total: Option<u32>) -> Self {
        Self {
            correct: 0,
            total,
            sections: Vec::new(),
        }
    }

    /// Fingerprints of every section so far, the generator's history input.
    #[must_use]
    pub fn fingerprints(&self) -> HashSet<String> {
        self.sections
            .iter()
            .map(Section::fingerprint)
            .collect()
    }

    /// Cursor of the most recently revealed section.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.sections.len().checked_sub(1)
    }

    /// Whether the fixed round target has been reached.
    #[must_use]
    pub fn finished(&self) -> bool {
        self.total
            .is_some_and(|total| self.sections.len() >= total as usize)
    }

    /// Score the section at `cursor` against `inputs` and record the
    /// result. A fully correct submission bumps the session's
    /// correct-count.
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchSection`] for an out-of-range cursor,
    /// [`Error::AlreadyScored`] when the solution was already revealed, and
    /// [`Error::Incomplete`] when the input vector does not answer every
    /// label exactly once (unanswered positions, too short, too long).
    pub fn submit(&mut self, cursor: usize, inputs: Vec<Option<Answer>>) -> Result<Score, Error> {
        let section = self
            .sections
            .get_mut(cursor)
            .ok_or(Error::NoSuchSection { cursor })?;
        if section.score.is_some() {
            return Err(Error::AlreadyScored { cursor });
        }

        let score = score::score(&inputs, &section.verdicts)?;
        section.input = Some(inputs);
        section.score = Some(score);
        if score.all_correct {
            self.correct += 1;
        }
        tracing::debug!(cursor, points = score.points, total = score.total, "section scored");
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::{OpKind, Operation, Txn};

    fn section(steps: &[(Txn, OpKind)], verdicts: &[bool]) -> Section {
        Section {
            a: 10,
            b: 20,
            steps: steps
                .iter()
                .map(|&(txn, kind)| Operation::new(txn, kind))
                .collect(),
            t1: TxnParams {
                attribute: Attribute::A,
                summand: 4,
            },
            t2: TxnParams {
                attribute: Attribute::A,
                summand: 5,
            },
            verdicts: verdicts.to_vec(),
            input: None,
            score: None,
        }
    }

    #[test]
    fn fingerprint_joins_tokens() {
        let section = section(&[(Txn::T1, OpKind::Read), (Txn::T2, OpKind::Write)], &[]);
        assert_eq!(section.fingerprint(), "T1,read,T2,write");
    }

    #[test]
    fn submit_scores_and_counts_correct() {
        let mut state = SessionState::new(Some(2));
        state
            .sections
            .push(section(&[(Txn::T1, OpKind::Read)], &[true, false]));

        let score = state
            .submit(0, alloc::vec![Some(Answer::Yes), Some(Answer::No)])
            .unwrap();
        assert!(score.all_correct);
        assert_eq!(state.correct, 1);
    }

    #[test]
    fn submit_rejects_resubmission() {
        let mut state = SessionState::new(None);
        state
            .sections
            .push(section(&[(Txn::T1, OpKind::Read)], &[true]));

        state.submit(0, alloc::vec![Some(Answer::Yes)]).unwrap();
        let result = state.submit(0, alloc::vec![Some(Answer::No)]);
        assert_eq!(result, Err(Error::AlreadyScored { cursor: 0 }));
    }

    #[test]
    fn submit_rejects_short_input() {
        let mut state = SessionState::new(None);
        state
            .sections
            .push(section(&[(Txn::T1, OpKind::Read)], &[true, false]));

        let result = state.submit(0, alloc::vec![Some(Answer::Yes)]);
        assert_eq!(
            result,
            Err(Error::Incomplete(score::Error::IncompleteAnswer {
                index: 1
            }))
        );
    }

    #[test]
    fn submit_rejects_excess_input() {
        let mut state = SessionState::new(None);
        state
            .sections
            .push(section(&[(Txn::T1, OpKind::Read)], &[true]));

        let result = state.submit(
            0,
            alloc::vec![Some(Answer::Yes), Some(Answer::No)],
        );
        assert_eq!(
            result,
            Err(Error::Incomplete(score::Error::ExcessAnswer { index: 1 }))
        );
        assert!(state.sections[0].score.is_none());
    }

    #[test]
    fn submit_rejects_unknown_cursor() {
        let mut state = SessionState::new(None);
        let result = state.submit(3, alloc::vec![]);
        assert_eq!(result, Err(Error::NoSuchSection { cursor: 3 }));
    }
}
