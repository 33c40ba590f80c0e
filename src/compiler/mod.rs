//! SIGMA condition to Lucene query compiler.
//!
//! This module turns a parsed condition tree into a single Lucene
//! query-string expression.
//!
//! The compiler is organized into two sub-modules:
//! - [`escape`] - Value escaping and field-name quoting
//! - [`codegen`] - Atomic match rendering and boolean grouping
//!
//! # Grouping
//!
//! Operands are joined with ` AND ` / ` OR `. An operand whose own rendering
//! contains a top-level boolean operator is parenthesized; everything else is
//! emitted bare. A compound node with a single operand collapses into that
//! operand, and a value list with a single value renders as plain equality.
//!
//! # Examples
//!
//! ```rust
//! use sigma_lucene::compiler::compile;
//! use sigma_lucene::{AtomicMatch, ConditionNode};
//!
//! let tree = ConditionNode::and([
//!     AtomicMatch::any_of("fieldA", ["valueA1", "valueA2"]).into(),
//!     AtomicMatch::any_of("fieldB", ["valueB1", "valueB2"]).into(),
//! ]);
//!
//! assert_eq!(
//!     compile(&tree)?,
//!     "(fieldA:(valueA1 OR valueA2)) AND (fieldB:(valueB1 OR valueB2))"
//! );
//! # Ok::<(), sigma_lucene::SigmaError>(())
//! ```

pub mod codegen;
pub mod escape;

use crate::error::Result;
use crate::ir::ConditionNode;
use tracing::debug;

/// Compile a condition tree into a Lucene query string.
///
/// # Errors
/// Returns an error if:
/// - A compound node has an empty operand list
/// - A match node has no values where its comparator needs one
/// - A match node uses a comparator Lucene cannot express
///
/// # Examples
///
/// ```rust
/// use sigma_lucene::compiler::compile;
/// use sigma_lucene::AtomicMatch;
///
/// let query = compile(&AtomicMatch::cidr("field", "192.168.0.0/16").into())?;
/// assert_eq!(query, r"field:192.168.0.0\/16");
/// # Ok::<(), sigma_lucene::SigmaError>(())
/// ```
pub fn compile(node: &ConditionNode) -> Result<String> {
    let query = codegen::generate_query(node)?;
    debug!(query = %query, "compiled condition");
    Ok(query)
}
