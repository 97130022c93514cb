//! wasm boundary for the anomaly trainer.
//!
//! The web embedding owns rendering and storage; this module exposes the
//! classifier, scorer, table replay, and section generation as JSON-string
//! functions. Generation takes an explicit seed, since wasm has no ambient
//! entropy source.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), no_main)]

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use anomtrain_core::op::Operation;
use anomtrain_core::render::{section_rows, OpTexts};
use anomtrain_core::rules::AnomalyRuleSet;
use anomtrain_core::score::Answer;
use anomtrain_core::section::{Section, SessionState};
use anomtrain_gen::session::Trainer;
use anomtrain_gen::ScheduleSpec;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

fn ok(value: &serde_json::Value) -> String {
    serde_json::json!({ "ok": true, "value": value }).to_string()
}

fn err(message: &str) -> String {
    serde_json::json!({ "ok": false, "error": message }).to_string()
}

/// Classify a step sequence against rule sets.
///
/// `steps` is a JSON array of operation tokens, `rule_sets` a JSON array
/// of rule-set objects (legacy layouts accepted). Returns
/// `{"ok":true,"value":[bool,...]}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn classify(steps: &str, rule_sets: &str, attributes_match: bool) -> String {
    let steps: Vec<Operation> = match serde_json::from_str(steps) {
        Ok(steps) => steps,
        Err(e) => return err(&e.to_string()),
    };
    let rule_sets: Vec<AnomalyRuleSet> = match serde_json::from_str(rule_sets) {
        Ok(rule_sets) => rule_sets,
        Err(e) => return err(&e.to_string()),
    };

    let verdicts = anomtrain_core::classify(&steps, attributes_match, &rule_sets);
    match serde_json::to_value(verdicts) {
        Ok(value) => ok(&value),
        Err(e) => err(&e.to_string()),
    }
}

/// Score yes/no/neither answers against verdicts.
///
/// `inputs` is a JSON array of `"yes" | "no" | "neither" | null`,
/// `verdicts` a JSON array of booleans.
#[wasm_bindgen]
pub fn score(inputs: &str, verdicts: &str) -> String {
    let inputs: Vec<Option<Answer>> = match serde_json::from_str(inputs) {
        Ok(inputs) => inputs,
        Err(e) => return err(&e.to_string()),
    };
    let verdicts: Vec<bool> = match serde_json::from_str(verdicts) {
        Ok(verdicts) => verdicts,
        Err(e) => return err(&e.to_string()),
    };

    match anomtrain_core::score(&inputs, &verdicts) {
        Ok(score) => match serde_json::to_value(score) {
            Ok(value) => ok(&value),
            Err(e) => err(&e.to_string()),
        },
        Err(e) => err(&alloc::format!("{e:?}")),
    }
}

/// Replay a section into table rows.
///
/// `section` is a section object as persisted by the session state;
/// `include_b` selects the attribute-B columns.
#[wasm_bindgen]
pub fn rows(section: &str, include_b: bool) -> String {
    let section: Section = match serde_json::from_str(section) {
        Ok(section) => section,
        Err(e) => return err(&e.to_string()),
    };

    let rows = section_rows(&section, &OpTexts::default(), include_b);
    match serde_json::to_value(rows) {
        Ok(value) => ok(&value),
        Err(e) => err(&e.to_string()),
    }
}

/// Reveal the next section of a session.
///
/// `config` is a schedule specification (legacy layouts accepted), `state`
/// the persisted session state or `null` for a fresh session. `seed` drives
/// a deterministic RNG. Returns the updated state; the revealed section is
/// its last element, and persisting it is the host's job.
#[wasm_bindgen]
pub fn next_section(config: &str, state: &str, seed: u64) -> String {
    let spec: ScheduleSpec = match serde_json::from_str(config) {
        Ok(spec) => spec,
        Err(e) => return err(&e.to_string()),
    };
    let state: Option<SessionState> = match serde_json::from_str(state) {
        Ok(state) => state,
        Err(e) => return err(&e.to_string()),
    };

    let mut trainer = match state {
        Some(state) => Trainer::resume(spec, state),
        None => Trainer::new(spec),
    };
    let mut rng = SmallRng::seed_from_u64(seed);
    if let Err(e) = trainer.next(&mut rng) {
        return err(&alloc::format!("{e:?}"));
    }

    match serde_json::to_value(&trainer.state) {
        Ok(value) => ok(&value),
        Err(e) => err(&e.to_string()),
    }
}
