//! Visual Mailer Core - Email Template Compiler
//!
//! # The Contract
//! 1. Documents Are Data (typed blocks, JSON on the wire)
//! 2. The Catalog Is Closed (only email-client-safe values)
//! 3. Validation Gates Compilation
//! 4. Compilation Is Pure And Deterministic
//! 5. Untrusted Text Is Escaped

pub mod constraints;
pub mod document;
pub mod validation;
pub mod escape;
pub mod compiler;
pub mod preview;
pub mod editor;
pub mod host;
pub mod store;
pub mod hashing;
pub mod pipeline;
pub mod config;

pub use document::{Block, BlockKind, Metadata, Settings, Template};
pub use validation::{validate, ValidationResult, ValidationRule, Validator};
pub use compiler::compile;
pub use escape::{escape_html, unescape_html};
pub use preview::{render_preview, CommandEngine, MarkupEngine, MjmlDiagnostic, PreviewResult};
pub use editor::{from_editor, to_editor, EditorData, EditorSession};
pub use host::{ImageUpload, InboundEvent, OutboundEvent};
pub use store::TemplateStore;
pub use hashing::{canonical_json, compute_document_hash, compute_markup_hash};
pub use pipeline::{CompiledTemplate, EmailPipeline, PipelineError};
pub use config::{BuilderConfig, EditorConfig, PreviewConfig};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
