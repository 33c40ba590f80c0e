//! # SIGMA Lucene Backend
//!
//! A Rust library that compiles [SIGMA detection rule](https://github.com/SigmaHQ/sigma)
//! conditions into Lucene query-string syntax and wraps the result into the
//! documents Elasticsearch and Kibana import.
//!
//! The crate starts from an already-parsed rule: a boolean [`ConditionNode`]
//! tree and a [`RuleMetadata`] record. Parsing rule YAML into a condition tree
//! and mapping field names happen upstream.
//!
//! ## Quick Start
//!
//! ```rust
//! use sigma_lucene::{AtomicMatch, ConditionNode, LuceneBackend, OutputFormat, RuleMetadata, SigmaRule};
//!
//! let rule = SigmaRule::new(
//!     RuleMetadata::new("Suspicious Shell"),
//!     ConditionNode::and([
//!         AtomicMatch::any_of("process.name", ["cmd.exe", "powershell.exe"]).into(),
//!         AtomicMatch::regex("process.args", "-enc(odedcommand)?").into(),
//!     ]),
//! );
//!
//! let backend = LuceneBackend::new();
//! let query = backend.convert_rule(&rule, OutputFormat::Plain)?;
//! assert_eq!(
//!     query.as_query(),
//!     Some("(process.name:(cmd.exe OR powershell.exe)) AND process.args:/-enc(odedcommand)?/")
//! );
//! # Ok::<(), sigma_lucene::SigmaError>(())
//! ```
//!
//! ## Output Formats
//!
//! ```rust
//! use sigma_lucene::{AtomicMatch, LuceneBackend, OutputFormat, RuleMetadata, SigmaRule};
//!
//! let rule = SigmaRule::new(
//!     RuleMetadata::new("Test"),
//!     AtomicMatch::cidr("source.ip", "10.0.0.0/8").into(),
//! );
//!
//! let document = LuceneBackend::new().convert_rule(&rule, OutputFormat::DetectionRule)?;
//! let json = document.as_json().unwrap();
//! assert_eq!(json["params"]["query"], r"source.ip:10.0.0.0\/8");
//! assert_eq!(json["params"]["riskScore"], 21);
//! # Ok::<(), sigma_lucene::SigmaError>(())
//! ```

pub mod backend;
pub mod compiler;
pub mod config;
pub mod error;
pub mod ir;
pub mod output;

pub use backend::LuceneBackend;
pub use compiler::compile;
pub use config::{RenderOptions, DEFAULT_INDEX};
pub use error::{Result, SigmaError};
pub use ir::{
    AtomicMatch, CompareOp, Comparator, ConditionNode, FieldRef, RuleMetadata, SigmaRule, Value,
};
pub use output::{finalize_ndjson, render, Document, OutputFormat};
