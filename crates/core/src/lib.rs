//! Core engine for transaction-schedule anomaly exercises.
//!
//! `anomtrain_core` models small two-transaction schedules used to teach
//! database concurrency anomalies (Lost Update, Non-Repeatable Read,
//! Dirty Read) and decides which anomalies a realized schedule actually
//! exhibits. It contains the pure half of the trainer:
//!
//! 1. **Operations** -- a schedule step is an [`Operation`]: a transaction
//!    ([`Txn`]) paired with an operation kind ([`OpKind`]). Its canonical
//!    token form `"T1,read"` is the identity used by constraints, rule sets,
//!    and session fingerprints.
//! 2. **Sequencer** -- [`sequencer::sequence`] turns a (shuffled) step pool
//!    into one valid order under a set of precedence constraints, failing
//!    with [`CyclicConstraints`](sequencer::CyclicConstraints) when the
//!    constraints admit no order.
//! 3. **Classifier** -- [`classify::classify`] evaluates named
//!    whitelist/blacklist rule sets ([`rules::AnomalyRuleSet`]) against a
//!    finalized step sequence and returns one verdict per rule set.
//! 4. **Scorer** -- [`score::score`] compares yes/no/neither answers
//!    against the computed verdicts.
//! 5. **Sections** -- [`section::Section`] is one revealed exercise
//!    instance; [`section::SessionState`] is the append-only list of
//!    sections with the running correctness count.
//! 6. **Rendering seam** -- [`render::section_rows`] replays a section's
//!    value semantics into table-ready rows; how those rows are painted is
//!    a caller concern.
//!
//! Everything in this crate is deterministic: randomness (shuffling,
//! probabilistic filters, value sampling) lives in `anomtrain_gen`, which
//! repeatedly drives the sequencer and classifier to produce novel,
//! policy-satisfying sections.
//!
//! # Crate features
//!
//! - **`serde`** -- `Serialize`/`Deserialize` on all model types. Operations
//!   and precedence rules keep their compact JSON shapes (`"T1,read"`,
//!   `["T1,read","T2,write"]`), and legacy rule-set layouts are normalized
//!   during deserialization.
//! - **`schemars`** -- JSON Schema generation for the model types.
//!
//! This crate is `no_std` compatible (requires `alloc`).

#![cfg_attr(not(any(test, feature = "schemars")), no_std)]
extern crate alloc;

pub mod classify;
pub mod op;
pub mod render;
pub mod rules;
pub mod score;
pub mod section;
pub mod sequencer;

pub use classify::{classify, classify_ignoring_attributes};
pub use op::{Attribute, OpKind, Operation, Txn};
pub use rules::{AnomalyRuleSet, PrecedenceRule};
pub use score::{score, Answer, Score};
pub use section::{Section, SessionState, TxnParams};
