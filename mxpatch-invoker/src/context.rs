//! Invocation context: the serializable payload argument templates render from.

use serde::{Deserialize, Serialize};

use crate::error::InvokeError;

/// Flat rendering payload for one tool call.
///
/// Optional fields are omitted from the Tera context when absent, so
/// templates test them with `{% if field %}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationContext {
    /// Screen or table name.
    pub resource: String,
    /// Environment label, empty for environment-free tools (diff).
    pub environment: String,
    /// Vendor properties file of the environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<String>,
    /// Diff base export (the destination side).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Diff target export (the source side).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Output base name, without extension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outfile: Option<String>,
    /// Row filter for the insert generator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Directory the tool runs in.
    pub working_dir: String,
}

impl InvocationContext {
    /// Reject values that would split into extra argument lines.
    ///
    /// Templates render one argument per line, so a line break (or any other
    /// control character) inside a value would inject arguments.
    pub fn check_arguments(&self) -> Result<(), InvokeError> {
        let fields = [
            ("resource", Some(&self.resource)),
            ("environment", Some(&self.environment)),
            ("properties", self.properties.as_ref()),
            ("base", self.base.as_ref()),
            ("target", self.target.as_ref()),
            ("outfile", self.outfile.as_ref()),
            ("filter", self.filter.as_ref()),
            ("working directory", Some(&self.working_dir)),
        ];
        for (field, value) in fields {
            let Some(value) = value else { continue };
            if let Some(c) = value.chars().find(|c| c.is_control()) {
                return Err(InvokeError::InvalidArgument {
                    field,
                    value: value.clone(),
                    reason: format!("contains control character {c:?}"),
                });
            }
        }
        Ok(())
    }

    /// Convert to a Tera context for template rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, InvokeError> {
        tera::Context::from_serialize(self).map_err(InvokeError::from)
    }
}
