//! Schedule step identity: transactions, operation kinds, attributes.
//!
//! The canonical token `"T{n},{kind}"` is load-bearing: precedence rules,
//! anomaly rule sets, and session fingerprints all compare operations by
//! this identity. [`Operation`] keeps it as a value type and derives the
//! token only for display, parsing, and fingerprinting.

use alloc::string::String;
use core::fmt;
use core::str::FromStr;

/// One of the two concurrent transactions of an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Txn {
    T1,
    T2,
}

impl Txn {
    /// Both transactions, in display order.
    pub const BOTH: [Self; 2] = [Self::T1, Self::T2];

    /// 0-based index, used for per-transaction bookkeeping arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::T1 => 0,
            Self::T2 => 1,
        }
    }

    /// Token prefix (`"T1"` or `"T2"`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::T1 => "T1",
            Self::T2 => "T2",
        }
    }
}

/// Kind of database operation a schedule step performs.
///
/// The five kinds cover the trainer's operation pool. `PreRead` is the
/// optional extra read before the main one (its survival is probabilistic),
/// `Add` is the arithmetic step on the read value, and `Rollback` undoes
/// the transaction and truncates its remaining steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OpKind {
    PreRead,
    Read,
    Add,
    Write,
    Rollback,
}

impl OpKind {
    /// All kinds in canonical pool order.
    pub const ALL: [Self; 5] = [
        Self::PreRead,
        Self::Read,
        Self::Add,
        Self::Write,
        Self::Rollback,
    ];

    /// Canonical token suffix of this kind.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::PreRead => "read0",
            Self::Read => "read",
            Self::Add => "add",
            Self::Write => "write",
            Self::Rollback => "rollback",
        }
    }
}

/// Which database attribute a transaction works on.
///
/// Both transactions normally operate on `A`; the generator may divert one
/// (or both) to `B`. Anomalies are only observable when both transactions
/// landed on the same attribute.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    A,
    B,
}

impl Attribute {
    /// Lower-case name (`"a"` / `"b"`), the working-value placeholder.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
        }
    }

    /// Upper-case name (`"A"` / `"B"`), the database-attribute placeholder.
    #[must_use]
    pub const fn upper(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }
}

/// One labeled step of a transaction schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Operation {
    pub txn: Txn,
    pub kind: OpKind,
}

impl Operation {
    #[must_use]
    pub const fn new(txn: Txn, kind: OpKind) -> Self {
        Self { txn, kind }
    }

    /// Canonical token, e.g. `"T1,read"`.
    #[must_use]
    pub fn token(self) -> String {
        alloc::format!("{self}")
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.txn.label(), self.kind.token())
    }
}

/// Error parsing an operation token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOperationError {
    pub token: String,
}

impl fmt::Display for ParseOperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid operation token `{}`", self.token)
    }
}

impl FromStr for Txn {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "T1" => Ok(Self::T1),
            "T2" => Ok(Self::T2),
            _ => Err(()),
        }
    }
}

impl FromStr for OpKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read0" => Ok(Self::PreRead),
            "read" => Ok(Self::Read),
            "add" => Ok(Self::Add),
            "write" => Ok(Self::Write),
            "rollback" => Ok(Self::Rollback),
            _ => Err(()),
        }
    }
}

impl FromStr for Operation {
    type Err = ParseOperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseOperationError { token: s.into() };
        let (txn, kind) = s.split_once(',').ok_or_else(err)?;
        Ok(Self {
            txn: txn.parse().map_err(|()| err())?,
            kind: kind.parse().map_err(|()| err())?,
        })
    }
}

#[cfg(feature = "serde")]
impl ::serde::Serialize for Operation {
    fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> ::serde::Deserialize<'de> for Operation {
    fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(::serde::de::Error::custom)
    }
}

#[cfg(feature = "serde")]
impl ::serde::Serialize for OpKind {
    fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

#[cfg(feature = "serde")]
impl<'de> ::serde::Deserialize<'de> for OpKind {
    fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        token
            .parse()
            .map_err(|()| ::serde::de::Error::custom(ParseOperationError { token }))
    }
}

#[cfg(feature = "serde")]
impl ::serde::Serialize for Txn {
    fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[cfg(feature = "serde")]
impl<'de> ::serde::Deserialize<'de> for Txn {
    fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        token
            .parse()
            .map_err(|()| ::serde::de::Error::custom(ParseOperationError { token }))
    }
}

#[cfg(feature = "schemars")]
impl ::schemars::JsonSchema for Operation {
    fn schema_name() -> alloc::borrow::Cow<'static, str> {
        "Operation".into()
    }

    fn json_schema(_: &mut ::schemars::SchemaGenerator) -> ::schemars::Schema {
        ::schemars::json_schema!({
            "type": "string",
            "pattern": "^T[12],(read0|read|add|write|rollback)$"
        })
    }
}

#[cfg(feature = "schemars")]
impl ::schemars::JsonSchema for OpKind {
    fn schema_name() -> alloc::borrow::Cow<'static, str> {
        "OpKind".into()
    }

    fn json_schema(_: &mut ::schemars::SchemaGenerator) -> ::schemars::Schema {
        ::schemars::json_schema!({
            "type": "string",
            "enum": ["read0", "read", "add", "write", "rollback"]
        })
    }
}

#[cfg(feature = "schemars")]
impl ::schemars::JsonSchema for Txn {
    fn schema_name() -> alloc::borrow::Cow<'static, str> {
        "Txn".into()
    }

    fn json_schema(_: &mut ::schemars::SchemaGenerator) -> ::schemars::Schema {
        ::schemars::json_schema!({
            "type": "string",
            "enum": ["T1", "T2"]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        for txn in Txn::BOTH {
            for kind in OpKind::ALL {
                let op = Operation::new(txn, kind);
                assert_eq!(op.token().parse::<Operation>(), Ok(op));
            }
        }
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!("T3,read".parse::<Operation>().is_err());
        assert!("T1".parse::<Operation>().is_err());
        assert!("T1,commit".parse::<Operation>().is_err());
    }
}
