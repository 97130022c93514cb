//! Session lifecycle: revealing sections, scoring, batch generation.

use anomtrain_core::op::Operation;
use anomtrain_core::score::{Answer, Score};
use anomtrain_core::section::{self, Section, SessionState};
use anomtrain_core::sequencer::CyclicConstraints;
use chrono::Local;
use derive_more::From;
use rand::RngExt;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::generator;
use crate::spec::ScheduleSpec;
use crate::store::StoredSession;

/// Error driving a session.
#[derive(Debug, From)]
pub enum Error {
    /// The precedence rules admit no valid order (configuration bug).
    Cyclic(CyclicConstraints<Operation>),
    /// The retry budget ran out in an open-ended session; the state has
    /// been reset and the caller should start over.
    SessionRestarted,
    /// The fixed round target has been reached; no further section will be
    /// revealed.
    Finished,
    /// The current section has not been answered yet.
    Unanswered,
    /// No section has been revealed yet.
    NothingRevealed,
    /// The submission was rejected.
    Submit(section::Error),
}

/// The session driver: a schedule specification plus the session state it
/// mutates.
///
/// Sections are revealed one at a time with [`next`](Self::next) and
/// answered with [`submit`](Self::submit); the state is the caller's to
/// persist between the two.
#[derive(Debug, Clone)]
pub struct Trainer {
    pub spec: ScheduleSpec,
    pub state: SessionState,
}

impl Trainer {
    /// Fresh session for `spec`.
    #[must_use]
    pub fn new(spec: ScheduleSpec) -> Self {
        let state = SessionState::new(spec.rounds);
        Self { spec, state }
    }

    /// Resume a previously persisted session.
    #[must_use]
    pub const fn resume(spec: ScheduleSpec, state: SessionState) -> Self {
        Self { spec, state }
    }

    /// Whether the spec quizzes on anomalies (as opposed to being a plain
    /// schedule generator).
    #[must_use]
    pub fn is_quiz(&self) -> bool {
        !self.spec.rule_sets.is_empty()
    }

    /// Reveal the next section.
    ///
    /// Preset schedules from `spec.fixed` are consumed first, in order;
    /// after that, sections are generated. On retry-budget exhaustion the
    /// policy from the spec applies: with a fixed round count the last
    /// candidate is accepted even if it violates the anomaly policy
    /// (deliberate escape valve); without one the session restarts.
    ///
    /// # Errors
    ///
    /// [`Error::Finished`] once the round target is reached,
    /// [`Error::Unanswered`] while a quiz section awaits submission,
    /// [`Error::SessionRestarted`] after an open-ended session reset, and
    /// [`Error::Cyclic`] for unsatisfiable precedence rules.
    pub fn next<R: RngExt>(&mut self, rng: &mut R) -> Result<&Section, Error> {
        if self.state.finished() {
            return Err(Error::Finished);
        }
        if self.is_quiz()
            && self
                .state
                .sections
                .last()
                .is_some_and(|section| section.score.is_none())
        {
            return Err(Error::Unanswered);
        }

        let index = self.reveal(rng)?;
        Ok(&self.state.sections[index])
    }

    /// Reveal the next section without the answered-section gate; returns
    /// its cursor.
    fn reveal<R: RngExt>(&mut self, rng: &mut R) -> Result<usize, Error> {
        let index = self.state.sections.len();
        let section = if let Some(fixed) = self.spec.fixed.get(index) {
            generator::section_from_fixed(&self.spec, fixed)
        } else {
            match generator::generate(&self.spec, &self.state.fingerprints(), rng) {
                Ok(section) => section,
                Err(generator::Error::RetryBudgetExhausted { last })
                    if self.spec.rounds.is_some() =>
                {
                    // Escape valve: with a fixed round count the last
                    // candidate is accepted even when it violates the
                    // anomaly policy.
                    *last
                }
                Err(generator::Error::RetryBudgetExhausted { .. }) => {
                    tracing::debug!("open-ended session restarts after exhausted budget");
                    self.state = SessionState::new(self.spec.rounds);
                    return Err(Error::SessionRestarted);
                }
                Err(generator::Error::Cyclic(cycle)) => return Err(Error::Cyclic(cycle)),
            }
        };

        self.state.sections.push(section);
        Ok(index)
    }

    /// Submit answers for the current section.
    ///
    /// # Errors
    ///
    /// [`Error::NothingRevealed`] before the first section, otherwise the
    /// scoring errors of [`SessionState::submit`].
    pub fn submit(&mut self, inputs: Vec<Option<Answer>>) -> Result<Score, Error> {
        let cursor = self.state.cursor().ok_or(Error::NothingRevealed)?;
        self.state.submit(cursor, inputs).map_err(Error::Submit)
    }
}

/// Drive one full session to its round target, answering nothing.
///
/// Used by batch generation, where sections are exported as worksheets
/// rather than quizzed interactively.
fn run_session<R: RngExt>(
    spec: &ScheduleSpec,
    rounds: u32,
    rng: &mut R,
) -> Result<SessionState, Error> {
    let mut spec = spec.clone();
    spec.rounds = Some(rounds);
    let mut trainer = Trainer::new(spec);
    while !trainer.state.finished() {
        match trainer.reveal(rng) {
            Ok(_) | Err(Error::SessionRestarted) => {}
            Err(err) => return Err(err),
        }
    }
    Ok(trainer.state)
}

/// Generate `n_sessions` independent full sessions in parallel.
///
/// Each session runs to `spec.rounds` (or 10 when open-ended) with its own
/// thread-local RNG and gets a timestamped [`StoredSession`] envelope.
///
/// # Errors
///
/// Propagates [`Error::Cyclic`] from any session.
pub fn generate_sessions(spec: &ScheduleSpec, n_sessions: u64) -> Result<Vec<StoredSession>, Error> {
    let rounds = spec.rounds.unwrap_or(10);
    (0..n_sessions)
        .into_par_iter()
        .map(|id| {
            let start = Local::now();
            let state = run_session(spec, rounds, &mut rand::rng())?;
            let end = Local::now();
            Ok(StoredSession {
                info: format!("generated #{id}"),
                start,
                end,
                state,
            })
        })
        .collect()
}
