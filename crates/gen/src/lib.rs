//! Randomized schedule generation and session driving for the anomaly
//! trainer.
//!
//! This crate is the impure half of the system. [`spec::ScheduleSpec`] is
//! the generation policy for one exercise series; [`generator::generate`]
//! turns it into novel [`Section`](anomtrain_core::Section)s by repeatedly
//! shuffling the step pool, sequencing it under the precedence constraints,
//! applying the probabilistic pre-read/rollback filters, and rejecting
//! duplicates and anomaly-free candidates until the retry budget runs out.
//! [`session::Trainer`] wraps that into the session lifecycle (fixed
//! presets, the budget-exhaustion policy, submission), and [`store`]
//! defines the persistence boundary.

pub mod generator;
pub mod session;
pub mod spec;
pub mod store;

pub use generator::{generate, RETRY_BUDGET};
pub use session::Trainer;
pub use spec::ScheduleSpec;
pub use store::{SessionStore, StoredSession};
