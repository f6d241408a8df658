//! Template error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template failed to parse or render
    #[error("Template error: {0}")]
    Render(String),

    /// Embedded template is not valid UTF-8
    #[error("Template {0} is not valid UTF-8")]
    Encoding(String),
}
