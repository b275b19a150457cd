//! AI field assist: fill one field of a draft from a prompt.
//!
//! Generation is a single request per field. There are no retries; a
//! failure is reported once and the user may ask again.

mod generator;
mod prompts;

pub use generator::{ClaudeGenerator, GenerateError, TextGenerator};
pub use prompts::{summarize, PromptContext, PromptTemplate};

use crate::world::FieldError;
use thiserror::Error;

/// Errors from a field-assist request.
#[derive(Debug, Error)]
pub enum AssistError {
    #[error("Generation for '{field}' failed: {source}")]
    Generator {
        field: String,
        #[source]
        source: GenerateError,
    },

    #[error("Generator returned nothing for '{0}'")]
    Empty(String),

    #[error("Field '{0}' cannot be generated")]
    UnknownField(String),

    #[error("Generated value for '{field}' was rejected: {source}")]
    Rejected {
        field: String,
        #[source]
        source: FieldError,
    },

    #[error("No editor is open")]
    NotOpen,
}

impl AssistError {
    /// The field the error belongs to, when there is one.
    pub fn field(&self) -> Option<&str> {
        match self {
            AssistError::Generator { field, .. } | AssistError::Rejected { field, .. } => {
                Some(field)
            }
            AssistError::Empty(field) | AssistError::UnknownField(field) => Some(field),
            AssistError::NotOpen => None,
        }
    }
}

/// Render `template` and generate text for `values.field`.
pub async fn request_field_assist<G: TextGenerator + ?Sized>(
    generator: &G,
    field_key: &str,
    values: &PromptContext,
    template: &PromptTemplate,
) -> Result<String, AssistError> {
    generate_field(generator, field_key, &template.render(values)).await
}

/// Send an already rendered prompt and clean up the reply.
pub(crate) async fn generate_field<G: TextGenerator + ?Sized>(
    generator: &G,
    field_key: &str,
    prompt: &str,
) -> Result<String, AssistError> {
    tracing::debug!(generator = generator.name(), field = field_key, "requesting field assist");

    let text = generator
        .generate(prompt)
        .await
        .map_err(|source| AssistError::Generator {
            field: field_key.to_string(),
            source,
        })?;

    let text = text.trim();
    if text.is_empty() {
        return Err(AssistError::Empty(field_key.to_string()));
    }
    Ok(text.to_string())
}
