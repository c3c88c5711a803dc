//! One oracle call per artifact

use crate::error::MatchError;
use crate::parser::parse_verdict;
use crate::prompt::{build_match_prompt, DEFAULT_MATCH_TEMPLATE};
use crate::table::ReferenceTable;
use docflow_domain::traits::ChatModel;
use docflow_domain::MatchVerdict;
use tracing::debug;

/// Asks the text model whether an artifact matches a reference row
pub struct Matcher<M> {
    model: M,
    template: String,
}

impl<M> Matcher<M>
where
    M: ChatModel,
    M::Error: std::fmt::Display,
{
    /// Create a matcher around a text model and a prompt template
    pub fn new(model: M, template: impl Into<String>) -> Self {
        let template = template.into();
        Self {
            model,
            template: if template.is_empty() {
                DEFAULT_MATCH_TEMPLATE.to_string()
            } else {
                template
            },
        }
    }

    /// Run one matching exchange and return the validated verdict
    ///
    /// Errors cover the oracle call failing and the response being
    /// unusable; both leave the artifact untouched at the caller.
    pub async fn evaluate(
        &self,
        text: &str,
        table: &ReferenceTable,
    ) -> Result<MatchVerdict, MatchError> {
        let prompt = build_match_prompt(&self.template, text, &table.render());
        debug!(prompt_chars = prompt.len(), "sending match prompt");

        let response = self
            .model
            .generate(&prompt)
            .await
            .map_err(|e| MatchError::Oracle(e.to_string()))?;

        parse_verdict(&response)
    }
}
