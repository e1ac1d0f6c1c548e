//! Compilation Pipeline - Single Entry Point
//!
//! compile() validates first, every time. There is no path from an
//! unvalidated value to markup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::compiler;
use crate::document::Template;
use crate::hashing::{compute_document_hash, compute_markup_hash};
use crate::preview::{render_preview, MarkupEngine, PreviewResult};
use crate::validation::{ValidationResult, Validator};
use crate::ENGINE_VERSION;

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static VALIDATION_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_validation_call_count() -> u32 {
    VALIDATION_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_validation_call_count() {
    VALIDATION_CALL_COUNT.store(0, Ordering::SeqCst);
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl PipelineError {
    /// Validator messages, if this is a validation failure
    pub fn validation_errors(&self) -> Option<&[String]> {
        match self {
            PipelineError::ValidationFailed(errors) => Some(errors),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledTemplate {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub engine_version: String,
    pub template: Template,
    pub mjml: String,
    pub document_hash: String,
    pub markup_hash: String,
    pub validation: ValidationResult,
}

/// The pipeline - validate, then compile, then stamp
pub struct EmailPipeline {
    validator: Validator,
}

impl EmailPipeline {
    pub fn new() -> Self {
        Self { validator: Validator::new() }
    }

    /// This is the ONLY validation entry point.
    pub fn validate(&self, candidate: &Value) -> ValidationResult {
        #[cfg(feature = "test-hooks")]
        VALIDATION_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

        self.validator.validate(candidate)
    }

    /// Validate, deserialize and compile an untrusted document
    pub fn compile(&self, candidate: &Value) -> Result<CompiledTemplate, PipelineError> {
        let validation = self.validate(candidate);
        if !validation.valid {
            tracing::warn!(errors = validation.errors.len(), "template rejected by validator");
            return Err(PipelineError::ValidationFailed(validation.errors));
        }

        let template = Template::from_value(candidate.clone())?;
        let mjml = compiler::compile(&template);

        let compiled = CompiledTemplate {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
            document_hash: compute_document_hash(&template)?,
            markup_hash: compute_markup_hash(&mjml),
            template,
            mjml,
            validation,
        };

        tracing::debug!(
            id = %compiled.id,
            blocks = compiled.template.content.len(),
            bytes = compiled.mjml.len(),
            "template compiled"
        );
        Ok(compiled)
    }

    /// Typed documents go through the same gate
    pub fn compile_template(&self, template: &Template) -> Result<CompiledTemplate, PipelineError> {
        self.compile(&template.to_value()?)
    }

    /// Compile and hand the markup to an MJML → HTML engine
    pub fn preview(
        &self,
        candidate: &Value,
        engine: &dyn MarkupEngine,
    ) -> Result<PreviewResult, PipelineError> {
        let compiled = self.compile(candidate)?;
        Ok(render_preview(engine, &compiled.mjml))
    }
}

impl Default for EmailPipeline {
    fn default() -> Self {
        Self::new()
    }
}
