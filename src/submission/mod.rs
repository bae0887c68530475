pub mod attachments;
pub mod delivery;
pub mod normalize;
pub mod pipeline;
pub mod report;

use serde::Deserialize;
use std::collections::HashMap;

/// Rendered for every absent or empty form value.
pub const PLACEHOLDER: &str = "-";

/// The raw field map of one registration request. No field is required;
/// lookups on absent fields yield an empty string and the report renders a
/// placeholder instead.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(transparent)]
pub struct Submission {
    fields: HashMap<String, String>,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    /// Company name used in the mail subject, when the form provided one.
    pub fn company_name(&self) -> &str {
        self.field("razaoSocial").trim()
    }
}
