//! Lucene query generation from condition trees.
//!
//! Each node renders to a [`Fragment`] that remembers whether its text exposes
//! a top-level `AND`/`OR`. A parent wraps such fragments in parentheses; all
//! other fragments are emitted bare.

use crate::error::{Result, SigmaError};
use crate::ir::{AtomicMatch, Comparator, ConditionNode, Value};

use super::escape::{escape_cidr, escape_regex, escape_value, quote_field};

pub const AND_TOKEN: &str = " AND ";
pub const OR_TOKEN: &str = " OR ";
pub const NOT_TOKEN: &str = "NOT ";
pub const EQ_TOKEN: &str = ":";
pub const EXISTS_FIELD: &str = "_exists_";

/// Rendered query text plus its grouping requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Fragment {
    pub(crate) text: String,
    pub(crate) compound: bool,
}

impl Fragment {
    fn simple(text: String) -> Self {
        Self {
            text,
            compound: false,
        }
    }

    fn compound(text: String) -> Self {
        Self {
            text,
            compound: true,
        }
    }

    /// Text as it must appear when embedded as an operand.
    fn grouped(self) -> String {
        if self.compound {
            format!("({})", self.text)
        } else {
            self.text
        }
    }
}

/// Generate the query string for a whole condition tree.
pub(crate) fn generate_query(node: &ConditionNode) -> Result<String> {
    Ok(generate_fragment(node)?.text)
}

fn generate_fragment(node: &ConditionNode) -> Result<Fragment> {
    match node {
        ConditionNode::Match(m) => render_match(m),
        ConditionNode::And(operands) => join_operands(operands, AND_TOKEN, "AND"),
        ConditionNode::Or(operands) => join_operands(operands, OR_TOKEN, "OR"),
        ConditionNode::Not(operand) => {
            let inner = generate_fragment(operand)?;
            Ok(Fragment::simple(format!("{NOT_TOKEN}{}", inner.grouped())))
        }
    }
}

fn join_operands(operands: &[ConditionNode], token: &str, name: &str) -> Result<Fragment> {
    match operands {
        [] => Err(SigmaError::MalformedCondition(format!(
            "empty {name} operand list"
        ))),
        [single] => generate_fragment(single),
        _ => {
            let parts = operands
                .iter()
                .map(|op| generate_fragment(op).map(Fragment::grouped))
                .collect::<Result<Vec<_>>>()?;
            Ok(Fragment::compound(parts.join(token)))
        }
    }
}

/// Render one field/value(s) comparison.
pub(crate) fn render_match(m: &AtomicMatch) -> Result<Fragment> {
    let field = quote_field(&m.field.name);

    let fragment = match m.comparator {
        Comparator::Exists => Fragment::simple(format!("{EXISTS_FIELD}{EQ_TOKEN}{field}")),
        Comparator::Null => {
            Fragment::simple(format!("{NOT_TOKEN}{EXISTS_FIELD}{EQ_TOKEN}{field}"))
        }
        Comparator::Equality | Comparator::ValueList => render_in_list(&field, values_of(m)?),
        Comparator::Regex => render_each(values_of(m)?, |v| {
            format!("{field}{EQ_TOKEN}{}", escape_regex(&v.as_text()))
        }),
        Comparator::Cidr => render_each(values_of(m)?, |v| {
            format!("{field}{EQ_TOKEN}{}", escape_cidr(&v.as_text()))
        }),
        Comparator::Compare(op) => render_each(values_of(m)?, |v| {
            format!("{field}{EQ_TOKEN}{}{}", op.symbol(), escape_value(v))
        }),
        Comparator::Keyword => render_each(values_of(m)?, escape_value),
        Comparator::FieldReference => {
            return Err(SigmaError::UnsupportedComparator {
                field: m.field.name.clone(),
                comparator: m.comparator.to_string(),
            })
        }
    };

    Ok(fragment)
}

fn values_of(m: &AtomicMatch) -> Result<&[Value]> {
    if m.values.is_empty() {
        return Err(SigmaError::MalformedCondition(format!(
            "no values for {} match on field '{}'",
            m.comparator, m.field.name
        )));
    }
    Ok(&m.values)
}

/// `field:value` for one value, `field:(v1 OR v2 ...)` for several.
fn render_in_list(field: &str, values: &[Value]) -> Fragment {
    match values {
        [single] => Fragment::simple(format!("{field}{EQ_TOKEN}{}", escape_value(single))),
        _ => {
            let list = values
                .iter()
                .map(escape_value)
                .collect::<Vec<_>>()
                .join(OR_TOKEN);
            Fragment::compound(format!("{field}{EQ_TOKEN}({list})"))
        }
    }
}

/// One full expression per value, OR-ed together.
fn render_each(values: &[Value], render: impl Fn(&Value) -> String) -> Fragment {
    match values {
        [single] => Fragment::simple(render(single)),
        _ => Fragment::compound(values.iter().map(render).collect::<Vec<_>>().join(OR_TOKEN)),
    }
}
