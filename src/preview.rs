//! Preview Boundary - MJML To HTML
//!
//! The MJML → HTML compiler is an external engine. Whatever it does, a
//! preview request comes back as a value: HTML plus diagnostics, or empty
//! HTML plus the diagnostic explaining why.

use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::PreviewConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MjmlDiagnostic {
    /// 0 when the engine gave no line
    pub line: u32,
    pub message: String,
    pub tag_name: String,
    pub formatted_message: String,
}

impl MjmlDiagnostic {
    fn engine_failure(error: &EngineError) -> Self {
        Self {
            line: 0,
            message: error.to_string(),
            tag_name: "mjml".to_string(),
            formatted_message: format!("MJML compilation error: {}", error),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOutput {
    pub html: String,
    pub diagnostics: Vec<MjmlDiagnostic>,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Engine exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Engine produced invalid output: {0}")]
    InvalidOutput(String),
}

/// An MJML → HTML compiler
pub trait MarkupEngine {
    fn name(&self) -> &str;
    fn render(&self, mjml: &str) -> Result<EngineOutput, EngineError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewResult {
    pub html: String,
    pub diagnostics: Vec<MjmlDiagnostic>,
}

impl PreviewResult {
    pub fn is_clean(&self) -> bool {
        !self.html.is_empty() && self.diagnostics.is_empty()
    }
}

/// Render a preview; engine failures become an empty render plus a diagnostic
pub fn render_preview(engine: &dyn MarkupEngine, mjml: &str) -> PreviewResult {
    match engine.render(mjml) {
        Ok(EngineOutput { html, diagnostics }) => {
            if !diagnostics.is_empty() {
                tracing::debug!(engine = engine.name(), count = diagnostics.len(), "engine reported diagnostics");
            }
            PreviewResult { html, diagnostics }
        }
        Err(e) => {
            tracing::warn!(engine = engine.name(), error = %e, "preview render failed");
            PreviewResult {
                html: String::new(),
                diagnostics: vec![MjmlDiagnostic::engine_failure(&e)],
            }
        }
    }
}

/// Runs an external `mjml` executable: markup on stdin, HTML on stdout
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
}

impl CommandEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }

    pub fn from_config(config: &PreviewConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
    }
}

impl MarkupEngine for CommandEngine {
    fn name(&self) -> &str {
        &self.program
    }

    fn render(&self, mjml: &str) -> Result<EngineOutput, EngineError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| EngineError::Launch {
                program: self.program.clone(),
                source,
            })?;

        // Feed stdin from its own thread so a streaming engine cannot
        // deadlock against a full stdout pipe.
        let stdin = child.stdin.take();
        let (written, output) = thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(mjml.as_bytes()),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
            (written, output)
        });
        let output = output?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(EngineError::Failed {
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }
        written?;

        let html = String::from_utf8(output.stdout)
            .map_err(|e| EngineError::InvalidOutput(e.to_string()))?;
        let diagnostics = stderr
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(parse_diagnostic)
            .collect();

        Ok(EngineOutput { html, diagnostics })
    }
}

/// Parse one engine warning line.
///
/// Recognizes `Line 8 of file (mj-text) — message`; anything else is kept
/// whole with line 0 and tag `mjml`.
pub fn parse_diagnostic(raw: &str) -> MjmlDiagnostic {
    let fallback = || MjmlDiagnostic {
        line: 0,
        message: raw.to_string(),
        tag_name: "mjml".to_string(),
        formatted_message: raw.to_string(),
    };

    let Some(rest) = raw.strip_prefix("Line ") else {
        return fallback();
    };
    let Some(line) = rest
        .split_whitespace()
        .next()
        .and_then(|n| n.parse::<u32>().ok())
    else {
        return fallback();
    };

    let tag_name = match (rest.find('('), rest.find(')')) {
        (Some(open), Some(close)) if open < close => rest[open + 1..close].to_string(),
        _ => "mjml".to_string(),
    };
    let message = ["—", " - "]
        .iter()
        .find_map(|sep| rest.split_once(*sep).map(|(_, m)| m.trim().to_string()))
        .unwrap_or_else(|| raw.to_string());

    MjmlDiagnostic {
        line,
        message,
        tag_name,
        formatted_message: raw.to_string(),
    }
}
