//! Scoring user answers against computed verdicts.

use alloc::vec::Vec;

/// A user's answer for one anomaly label.
///
/// `Neither` is a committed answer ("cannot be determined") and never
/// matches a boolean verdict. An unanswered position is `None` at the
/// [`score`] boundary and blocks submission.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Neither,
}

impl Answer {
    /// The boolean this answer claims, if any.
    #[must_use]
    pub const fn as_bool(self) -> Option<bool> {
        match self {
            Self::Yes => Some(true),
            Self::No => Some(false),
            Self::Neither => None,
        }
    }
}

/// Correctness summary of one submission.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub points: usize,
    pub total: usize,
    pub all_correct: bool,
}

/// Error rejecting a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A position was left unanswered; submission stays blocked until every
    /// label has an answer.
    IncompleteAnswer { index: usize },
    /// More answers than verdicts; `index` is the first position with no
    /// matching verdict.
    ExcessAnswer { index: usize },
}

/// Compare answers to verdicts position by position.
///
/// A point is awarded only for a strict match: `Yes` against `true`, `No`
/// against `false`. `Neither` earns a point for neither verdict.
///
/// # Errors
///
/// Returns [`Error::IncompleteAnswer`] with the first unanswered index if
/// any position of `inputs` is `None` or `inputs` is shorter than
/// `verdicts`, and [`Error::ExcessAnswer`] if it is longer.
pub fn score(inputs: &[Option<Answer>], verdicts: &[bool]) -> Result<Score, Error> {
    if let Some(index) = inputs.iter().position(Option::is_none) {
        return Err(Error::IncompleteAnswer { index });
    }
    if inputs.len() < verdicts.len() {
        return Err(Error::IncompleteAnswer {
            index: inputs.len(),
        });
    }
    if inputs.len() > verdicts.len() {
        return Err(Error::ExcessAnswer {
            index: verdicts.len(),
        });
    }

    let answered: Vec<Answer> = inputs.iter().filter_map(|input| *input).collect();
    let points = answered
        .iter()
        .zip(verdicts)
        .filter(|(answer, verdict)| answer.as_bool() == Some(**verdict))
        .count();

    Ok(Score {
        points,
        total: verdicts.len(),
        all_correct: points == verdicts.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_answers_score_full() {
        let score = score(
            &[Some(Answer::Yes), Some(Answer::No)],
            &[true, false],
        )
        .unwrap();
        assert_eq!(
            score,
            Score {
                points: 2,
                total: 2,
                all_correct: true
            }
        );
    }

    #[test]
    fn one_wrong_answer_drops_a_point() {
        let score = score(
            &[Some(Answer::Yes), Some(Answer::Yes)],
            &[true, false],
        )
        .unwrap();
        assert_eq!(
            score,
            Score {
                points: 1,
                total: 2,
                all_correct: false
            }
        );
    }

    #[test]
    fn neither_never_matches_a_verdict() {
        let score = score(
            &[Some(Answer::Neither), Some(Answer::Neither)],
            &[true, false],
        )
        .unwrap();
        assert_eq!(score.points, 0);
    }

    #[test]
    fn missing_answer_blocks_submission() {
        let result = score(&[Some(Answer::Yes), None], &[true, false]);
        assert_eq!(result, Err(Error::IncompleteAnswer { index: 1 }));
    }

    #[test]
    fn short_input_is_incomplete() {
        let result = score(&[Some(Answer::Yes)], &[true, false]);
        assert_eq!(result, Err(Error::IncompleteAnswer { index: 1 }));
    }

    #[test]
    fn extra_answers_are_rejected() {
        let result = score(
            &[Some(Answer::Yes), Some(Answer::No), Some(Answer::Neither)],
            &[true, false],
        );
        assert_eq!(result, Err(Error::ExcessAnswer { index: 2 }));
    }
}
