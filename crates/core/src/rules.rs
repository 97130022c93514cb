//! Precedence rules and anomaly rule sets.
//!
//! A [`PrecedenceRule`] is the single ordering primitive: "this operation
//! must come before that one". The same primitive serves two roles:
//!
//! - as a *constraint* fed to the sequencer, shaping which schedules are
//!   valid at all, and
//! - as a *pattern* inside an [`AnomalyRuleSet`], probing whether a realized
//!   schedule exhibits a named anomaly.
//!
//! Rule-set configuration grew several layouts over time (a single rule
//! list, multiple whitelist alternatives, an optional blacklist). The serde
//! representation accepts all of them and normalizes to the one canonical
//! shape at ingestion time, so the classifier only ever sees
//! `whitelists` + `blacklist`.

use alloc::string::String;
use alloc::vec::Vec;

use crate::op::Operation;

/// Ordering constraint: `before` must occur before `after`.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(from = "(Operation, Operation)", into = "(Operation, Operation)")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrecedenceRule {
    pub before: Operation,
    pub after: Operation,
}

impl PrecedenceRule {
    #[must_use]
    pub const fn new(before: Operation, after: Operation) -> Self {
        Self { before, after }
    }

    /// The rule as an ordered pair, the form the sequencer consumes.
    #[must_use]
    pub const fn as_pair(&self) -> (Operation, Operation) {
        (self.before, self.after)
    }
}

impl From<(Operation, Operation)> for PrecedenceRule {
    fn from((before, after): (Operation, Operation)) -> Self {
        Self { before, after }
    }
}

impl From<PrecedenceRule> for (Operation, Operation) {
    fn from(rule: PrecedenceRule) -> Self {
        (rule.before, rule.after)
    }
}

#[cfg(feature = "schemars")]
impl ::schemars::JsonSchema for PrecedenceRule {
    fn schema_name() -> alloc::borrow::Cow<'static, str> {
        "PrecedenceRule".into()
    }

    fn json_schema(generator: &mut ::schemars::SchemaGenerator) -> ::schemars::Schema {
        let op = generator.subschema_for::<Operation>();
        ::schemars::json_schema!({
            "type": "array",
            "items": op,
            "minItems": 2,
            "maxItems": 2
        })
    }
}

/// A labeled anomaly detector over a realized schedule.
///
/// The verdict for a schedule is:
///
/// > (no whitelist alternatives, OR at least one alternative whose rules
/// > all hold) AND NOT (any blacklist rule holds)
///
/// Whitelist alternatives are OR-combined; rules within one alternative are
/// AND-combined. An empty `whitelists` is vacuously true, an empty
/// `blacklist` vacuously harmless.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "RuleSetRepr"))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnomalyRuleSet {
    /// Display name, e.g. `"Lost Update"`.
    pub label: String,
    /// Alternative orderings, any one of which proves the anomaly.
    pub whitelists: Vec<Vec<PrecedenceRule>>,
    /// Orderings that disqualify the anomaly regardless of the whitelists.
    pub blacklist: Vec<PrecedenceRule>,
}

impl AnomalyRuleSet {
    /// Rule set with whitelist alternatives and no blacklist.
    #[must_use]
    pub fn new(label: impl Into<String>, whitelists: Vec<Vec<PrecedenceRule>>) -> Self {
        Self {
            label: label.into(),
            whitelists,
            blacklist: Vec::new(),
        }
    }
}

/// Accepted configuration layouts for a rule set.
///
/// `rules` (alias `solution`) is the legacy single rule list; it becomes the
/// sole whitelist alternative when `whitelists` is absent.
#[cfg(feature = "serde")]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(::serde::Deserialize)]
struct RuleSetRepr {
    label: String,
    #[serde(default)]
    whitelists: Option<Vec<Vec<PrecedenceRule>>>,
    #[serde(default, alias = "solution")]
    rules: Option<Vec<PrecedenceRule>>,
    #[serde(default)]
    blacklist: Option<Vec<PrecedenceRule>>,
}

#[cfg(feature = "serde")]
impl From<RuleSetRepr> for AnomalyRuleSet {
    fn from(repr: RuleSetRepr) -> Self {
        let whitelists = repr
            .whitelists
            .or_else(|| repr.rules.map(|list| alloc::vec![list]))
            .unwrap_or_default();
        Self {
            label: repr.label,
            whitelists,
            blacklist: repr.blacklist.unwrap_or_default(),
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn rule_serde_shape_is_a_token_pair() {
        let rule: PrecedenceRule = serde_json::from_str(r#"["T1,read","T2,write"]"#).unwrap();
        assert_eq!(rule.before.token(), "T1,read");
        assert_eq!(rule.after.token(), "T2,write");
        assert_eq!(
            serde_json::to_string(&rule).unwrap(),
            r#"["T1,read","T2,write"]"#
        );
    }

    #[test]
    fn legacy_single_rule_list_becomes_one_whitelist() {
        let set: AnomalyRuleSet = serde_json::from_str(
            r#"{
                "label": "Lost Update",
                "rules": [["T1,read","T2,write"],["T2,write","T1,write"]]
            }"#,
        )
        .unwrap();
        assert_eq!(set.whitelists.len(), 1);
        assert_eq!(set.whitelists[0].len(), 2);
        assert!(set.blacklist.is_empty());
    }

    #[test]
    fn solution_alias_is_accepted() {
        let set: AnomalyRuleSet = serde_json::from_str(
            r#"{"label": "Dirty Read", "solution": [["T1,write","T2,read"]]}"#,
        )
        .unwrap();
        assert_eq!(set.whitelists.len(), 1);
    }

    #[test]
    fn whitelists_and_blacklist_pass_through() {
        let set: AnomalyRuleSet = serde_json::from_str(
            r#"{
                "label": "Non-Repeatable Read",
                "whitelists": [
                    [["T1,read0","T2,write"],["T2,write","T1,read"]],
                    [["T2,read0","T1,write"],["T1,write","T2,read"]]
                ],
                "blacklist": [["T1,rollback","T2,read"]]
            }"#,
        )
        .unwrap();
        assert_eq!(set.whitelists.len(), 2);
        assert_eq!(set.blacklist.len(), 1);
    }
}
