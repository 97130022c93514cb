//! Table-ready row structure for a section.
//!
//! The core does not paint anything; it replays a section's value
//! semantics step by step and emits one [`Row`] per step. Working values
//! that are currently empty come out as `None` and are typically rendered
//! as a dash.
//!
//! Value semantics per step, on the transaction's working attribute:
//!
//! - `read0`/`read`: working value := database value
//! - `add`: working value += summand
//! - `write`: database value := working value, working value cleared
//! - `rollback`: the transaction's addition (if any) is compensated on the
//!   database value, working value cleared

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::op::{Attribute, OpKind, Txn};
use crate::section::Section;

fn template_read() -> String {
    "read({A},{a})".into()
}

fn template_add() -> String {
    "{a} = {a} + {x}".into()
}

fn template_write() -> String {
    "write({A},{a})".into()
}

fn template_rollback() -> String {
    "rollback".into()
}

/// Display templates per operation kind.
///
/// Placeholders: `{a}` working attribute (lower case), `{A}` database
/// attribute (upper case), `{x}` the transaction's summand.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpTexts {
    #[cfg_attr(feature = "serde", serde(rename = "read0"))]
    pub pre_read: String,
    pub read: String,
    pub add: String,
    pub write: String,
    pub rollback: String,
}

impl Default for OpTexts {
    fn default() -> Self {
        Self {
            pre_read: template_read(),
            read: template_read(),
            add: template_add(),
            write: template_write(),
            rollback: template_rollback(),
        }
    }
}

impl OpTexts {
    /// Template of the given kind.
    #[must_use]
    pub fn text(&self, kind: OpKind) -> &str {
        match kind {
            OpKind::PreRead => &self.pre_read,
            OpKind::Read => &self.read,
            OpKind::Add => &self.add,
            OpKind::Write => &self.write,
            OpKind::Rollback => &self.rollback,
        }
    }

    /// Template with all placeholders substituted.
    #[must_use]
    pub fn render(&self, kind: OpKind, attribute: Attribute, summand: u32) -> String {
        self.text(kind)
            .replace("{a}", attribute.name())
            .replace("{A}", attribute.upper())
            .replace("{x}", &summand.to_string())
    }
}

/// Values of the second-attribute columns of a row.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecondAttribute {
    /// Database value of attribute B after this step.
    pub b: u32,
    /// T1's working value of `b`, if any.
    pub b1: Option<u32>,
    /// T2's working value of `b`, if any.
    pub b2: Option<u32>,
}

/// One table row: the state after one schedule step.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// 1-based step number.
    pub step: usize,
    /// Rendered operation text, when this step belongs to T1.
    pub t1_text: Option<String>,
    /// Rendered operation text, when this step belongs to T2.
    pub t2_text: Option<String>,
    /// Database value of attribute A after this step.
    pub a: u32,
    /// T1's working value of `a`, if any.
    pub a1: Option<u32>,
    /// T2's working value of `a`, if any.
    pub a2: Option<u32>,
    /// Attribute-B columns, when the exercise uses a second attribute.
    pub second: Option<SecondAttribute>,
}

#[derive(Debug, Default, Clone, Copy)]
struct WorkingState {
    a: Option<u32>,
    b: Option<u32>,
    added: bool,
}

impl WorkingState {
    fn get_mut(&mut self, attribute: Attribute) -> &mut Option<u32> {
        match attribute {
            Attribute::A => &mut self.a,
            Attribute::B => &mut self.b,
        }
    }
}

/// Replay `section` into table rows.
///
/// `include_b` selects whether the attribute-B columns are emitted; an
/// exercise that never diverts a transaction to the second attribute leaves
/// them out.
#[must_use]
pub fn section_rows(section: &Section, ops: &OpTexts, include_b: bool) -> Vec<Row> {
    let mut db_a = section.a;
    let mut db_b = section.b;
    let mut working = [WorkingState::default(), WorkingState::default()];

    section
        .steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let params = *section.txn(step.txn);
            let attribute = params.attribute;
            let db = match attribute {
                Attribute::A => &mut db_a,
                Attribute::B => &mut db_b,
            };
            let state = &mut working[step.txn.index()];

            match step.kind {
                OpKind::PreRead | OpKind::Read => *state.get_mut(attribute) = Some(*db),
                OpKind::Add => {
                    let value = state.get_mut(attribute);
                    *value = Some(value.unwrap_or(0) + params.summand);
                    state.added = true;
                }
                OpKind::Write => {
                    *db = state.get_mut(attribute).take().unwrap_or(0);
                }
                OpKind::Rollback => {
                    if state.added {
                        *db = db.saturating_sub(params.summand);
                    }
                    *state.get_mut(attribute) = None;
                }
            }

            let text = ops.render(step.kind, attribute, params.summand);
            Row {
                step: i + 1,
                t1_text: (step.txn == Txn::T1).then(|| text.clone()),
                t2_text: (step.txn == Txn::T2).then_some(text),
                a: db_a,
                a1: working[0].a,
                a2: working[1].a,
                second: include_b.then_some(SecondAttribute {
                    b: db_b,
                    b1: working[0].b,
                    b2: working[1].b,
                }),
            }
        })
        .collect()
}
