//! Intermediate Representation (IR) handed to the query compiler.
//!
//! A rule arrives here already parsed: the condition is a plain boolean tree of
//! [`ConditionNode`]s whose leaves are [`AtomicMatch`]es, and the descriptive
//! part of the rule is a [`RuleMetadata`] record. Nothing in this module knows
//! how the tree was produced.

use crate::error::Result;
use serde::Deserialize;
use std::borrow::Cow;
use std::fmt;

/// A single value on the right-hand side of a match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Literal text. `*` and `?` carry no wildcard meaning. May be empty.
    String(String),
    /// Text in which unescaped `*` and `?` are wildcards; `\*`, `\?` and `\\`
    /// stand for the literal characters.
    Wildcard(String),
    /// Regular expression source without delimiters.
    Regex(String),
    /// Network block in CIDR notation, e.g. `192.168.0.0/16`.
    Cidr(String),
    Number(i64),
    Boolean(bool),
}

impl Value {
    /// Build a string value from SIGMA wildcard syntax.
    ///
    /// Text with an unescaped `*` or `?` becomes a [`Value::Wildcard`].
    /// Anything else becomes a [`Value::String`] with `\*`, `\?` and `\\`
    /// resolved to the characters they stand for.
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        if has_unescaped_wildcard(&text) {
            Value::Wildcard(text)
        } else {
            Value::String(unescape_wildcard_syntax(&text))
        }
    }

    /// Raw source text of the value, without any escaping applied.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Value::String(s) | Value::Wildcard(s) | Value::Regex(s) | Value::Cidr(s) => {
                Cow::Borrowed(s)
            }
            Value::Number(n) => Cow::Owned(n.to_string()),
            Value::Boolean(b) => Cow::Owned(b.to_string()),
        }
    }
}

fn has_unescaped_wildcard(text: &str) -> bool {
    let mut escaped = false;
    for c in text.chars() {
        match c {
            '\\' if !escaped => escaped = true,
            '*' | '?' if !escaped => return true,
            _ => escaped = false,
        }
    }
    false
}

fn unescape_wildcard_syntax(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('\\', Some(&next @ ('*' | '?' | '\\'))) => {
                chars.next();
                out.push(next);
            }
            _ => out.push(c),
        }
    }
    out
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::plain(text)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

/// Numeric comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
        }
    }
}

/// Match kind of an atomic node, resolved upstream from field modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Equality,
    /// Implicit OR over the values of one field.
    ValueList,
    Regex,
    Cidr,
    /// Field is present.
    Exists,
    /// Field is absent.
    Null,
    Compare(CompareOp),
    /// Full-text search for the values, not bound to any field.
    Keyword,
    /// Value names another field whose content must match.
    FieldReference,
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparator::Equality => write!(f, "equality"),
            Comparator::ValueList => write!(f, "value_list"),
            Comparator::Regex => write!(f, "re"),
            Comparator::Cidr => write!(f, "cidr"),
            Comparator::Exists => write!(f, "exists"),
            Comparator::Null => write!(f, "null"),
            Comparator::Compare(CompareOp::Lt) => write!(f, "lt"),
            Comparator::Compare(CompareOp::Lte) => write!(f, "lte"),
            Comparator::Compare(CompareOp::Gt) => write!(f, "gt"),
            Comparator::Compare(CompareOp::Gte) => write!(f, "gte"),
            Comparator::Keyword => write!(f, "keyword"),
            Comparator::FieldReference => write!(f, "fieldref"),
        }
    }
}

/// Field name plus the modifiers it was written with.
///
/// The modifiers are informational only; the comparator has already been
/// derived from them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldRef {
    pub name: String,
    pub modifiers: Vec<String>,
}

impl FieldRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modifiers: Vec::new(),
        }
    }

    pub fn with_modifiers(name: impl Into<String>, modifiers: &[&str]) -> Self {
        Self {
            name: name.into(),
            modifiers: modifiers.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// One field-to-value(s) comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AtomicMatch {
    pub field: FieldRef,
    pub comparator: Comparator,
    pub values: Vec<Value>,
}

impl AtomicMatch {
    pub fn new(field: FieldRef, comparator: Comparator, values: Vec<Value>) -> Self {
        Self {
            field,
            comparator,
            values,
        }
    }

    pub fn equals(field: &str, value: impl Into<Value>) -> Self {
        Self::new(FieldRef::new(field), Comparator::Equality, vec![value.into()])
    }

    pub fn any_of<V: Into<Value>>(field: &str, values: impl IntoIterator<Item = V>) -> Self {
        Self::new(
            FieldRef::new(field),
            Comparator::ValueList,
            values.into_iter().map(Into::into).collect(),
        )
    }

    pub fn regex(field: &str, pattern: &str) -> Self {
        Self::new(
            FieldRef::with_modifiers(field, &["re"]),
            Comparator::Regex,
            vec![Value::Regex(pattern.to_string())],
        )
    }

    pub fn cidr(field: &str, block: &str) -> Self {
        Self::new(
            FieldRef::with_modifiers(field, &["cidr"]),
            Comparator::Cidr,
            vec![Value::Cidr(block.to_string())],
        )
    }

    pub fn exists(field: &str) -> Self {
        Self::new(FieldRef::new(field), Comparator::Exists, Vec::new())
    }

    pub fn null(field: &str) -> Self {
        Self::new(FieldRef::new(field), Comparator::Null, Vec::new())
    }

    pub fn compare(field: &str, op: CompareOp, value: i64) -> Self {
        Self::new(
            FieldRef::new(field),
            Comparator::Compare(op),
            vec![Value::Number(value)],
        )
    }

    pub fn keywords<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::new(
            FieldRef::default(),
            Comparator::Keyword,
            values.into_iter().map(Into::into).collect(),
        )
    }
}

/// Boolean condition tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConditionNode {
    Match(AtomicMatch),
    And(Vec<ConditionNode>),
    Or(Vec<ConditionNode>),
    Not(Box<ConditionNode>),
}

impl ConditionNode {
    pub fn and(operands: impl IntoIterator<Item = ConditionNode>) -> Self {
        ConditionNode::And(operands.into_iter().collect())
    }

    pub fn or(operands: impl IntoIterator<Item = ConditionNode>) -> Self {
        ConditionNode::Or(operands.into_iter().collect())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(operand: ConditionNode) -> Self {
        ConditionNode::Not(Box::new(operand))
    }
}

impl From<AtomicMatch> for ConditionNode {
    fn from(m: AtomicMatch) -> Self {
        ConditionNode::Match(m)
    }
}

/// Descriptive fields of a rule, carried verbatim into envelopes.
///
/// Deserializes straight from a SIGMA rule document; the detection and
/// logsource sections are ignored.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct RuleMetadata {
    pub id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub level: Option<String>,
    pub status: Option<String>,
    pub author: Option<String>,
    pub references: Vec<String>,
    pub falsepositives: Vec<String>,
    pub tags: Vec<String>,
}

impl RuleMetadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn from_yaml(rule_yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(rule_yaml)?)
    }
}

/// A rule as consumed by the backend: its condition and its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct SigmaRule {
    pub metadata: RuleMetadata,
    pub condition: ConditionNode,
}

impl SigmaRule {
    pub fn new(metadata: RuleMetadata, condition: ConditionNode) -> Self {
        Self {
            metadata,
            condition,
        }
    }
}
