//! Primary SIGMA Lucene backend interface.
//!
//! [`LuceneBackend`] compiles a rule's condition tree into a Lucene query and
//! wraps it into the selected [`OutputFormat`]. It holds only the immutable
//! [`RenderOptions`], so one backend can serve any number of threads.

use crate::compiler;
use crate::config::RenderOptions;
use crate::error::{Result, SigmaError};
use crate::ir::{ConditionNode, SigmaRule};
use crate::output::{self, Document, OutputFormat};
use rayon::prelude::*;
use tracing::{debug, warn};

/// Converts SIGMA rules into Lucene queries and Kibana/Elasticsearch envelopes.
///
/// # Examples
///
/// ```rust
/// use sigma_lucene::{AtomicMatch, ConditionNode, LuceneBackend, OutputFormat, RuleMetadata, SigmaRule};
///
/// let rule = SigmaRule::new(
///     RuleMetadata::new("Test"),
///     ConditionNode::and([
///         AtomicMatch::equals("fieldA", "valueA").into(),
///         AtomicMatch::equals("fieldB", "").into(),
///     ]),
/// );
///
/// let backend = LuceneBackend::new();
/// let document = backend.convert_rule(&rule, OutputFormat::Plain)?;
/// assert_eq!(document.as_query(), Some(r#"fieldA:valueA AND fieldB:"""#));
/// # Ok::<(), sigma_lucene::SigmaError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct LuceneBackend {
    options: RenderOptions,
}

impl LuceneBackend {
    /// Create a backend with default render options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend with custom render options.
    pub fn with_options(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Compile a condition tree into a Lucene query string.
    pub fn compile(&self, condition: &ConditionNode) -> Result<String> {
        compiler::compile(condition)
    }

    /// Compile one rule and render it in `format`.
    pub fn convert_rule(&self, rule: &SigmaRule, format: OutputFormat) -> Result<Document> {
        let query = self.compile(&rule.condition)?;
        output::render(format, &query, &rule.metadata, &self.options)
    }

    /// Convert many rules in parallel.
    ///
    /// Results are returned in input order, one per rule; a failing rule does
    /// not affect the others.
    pub fn convert(&self, rules: &[SigmaRule], format: OutputFormat) -> Vec<Result<Document>> {
        debug!(rules = rules.len(), format = %format, "converting rules");
        rules
            .par_iter()
            .map(|rule| {
                self.convert_rule(rule, format).map_err(|err| {
                    warn!(title = %rule.metadata.title, error = %err, "rule conversion failed");
                    err
                })
            })
            .collect()
    }

    /// Convert many rules and join the successful documents as NDJSON.
    ///
    /// Failed rules are skipped and returned alongside the output, tagged with
    /// their position in `rules`.
    pub fn convert_ndjson(
        &self,
        rules: &[SigmaRule],
        format: OutputFormat,
    ) -> Result<(String, Vec<(usize, SigmaError)>)> {
        let mut documents = Vec::with_capacity(rules.len());
        let mut failures = Vec::new();
        for (idx, result) in self.convert(rules, format).into_iter().enumerate() {
            match result {
                Ok(document) => documents.push(document),
                Err(err) => failures.push((idx, err)),
            }
        }
        Ok((output::finalize_ndjson(&documents)?, failures))
    }
}
