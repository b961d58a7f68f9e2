//! Text recognition for shopping-list photos.
//!
//! Recognition itself is delegated to an external engine behind the
//! [`OcrEngine`] trait. This module only owns the post-filter that turns the
//! raw multi-line output into candidate item strings.

use std::process::Stdio;
use std::sync::LazyLock;

use async_trait::async_trait;
use prixnc_core::AppConfig;
use regex::Regex;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::error::AssistantError;

/// A whole line made of one number, optionally with a single `.` or `,`
/// decimal part (`2`, `2.50`, `3,2`).
static NUMERIC_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+([.,]\d+)?$").expect("valid regex"));

/// Recognizes text in an image.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Returns the recognized text.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Ocr`] when recognition fails or the engine
    /// output is not text.
    async fn recognize(&self, image: &[u8]) -> Result<String, AssistantError>;
}

/// Raw recognized text plus the filtered candidate lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OcrOutput {
    pub raw_text: String,
    pub lines: Vec<String>,
}

/// Splits on line breaks, trims, and drops empty and pure-numeric lines.
#[must_use]
pub fn filter_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !NUMERIC_LINE_RE.is_match(line))
        .map(str::to_string)
        .collect()
}

/// Runs `engine` on `image` and filters the result.
///
/// # Errors
///
/// Propagates [`AssistantError::Ocr`] from the engine. No retry is attempted.
pub async fn extract(engine: &dyn OcrEngine, image: &[u8]) -> Result<OcrOutput, AssistantError> {
    let text = engine.recognize(image).await?;
    let raw_text = text.trim().to_string();
    let lines = filter_lines(&raw_text);

    tracing::debug!(
        bytes = image.len(),
        chars = raw_text.len(),
        lines = lines.len(),
        "ocr extraction complete"
    );

    Ok(OcrOutput { raw_text, lines })
}

/// Runs the `tesseract` CLI, feeding the image on stdin and reading text
/// from stdout.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    command: String,
    language: String,
}

impl TesseractEngine {
    #[must_use]
    pub fn new(command: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.ocr_command, &config.ocr_language)
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    async fn recognize(&self, image: &[u8]) -> Result<String, AssistantError> {
        if image.is_empty() {
            return Err(AssistantError::Ocr("empty image payload".to_string()));
        }

        let mut child = tokio::process::Command::new(&self.command)
            .args(["stdin", "stdout", "-l", &self.language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AssistantError::Ocr(format!("{} subprocess error: {e}", self.command)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AssistantError::Ocr("engine stdin unavailable".to_string()))?;
        let payload = image.to_vec();
        // stdin must be written concurrently with draining stdout, or a large
        // image can fill both pipes.
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&payload).await;
            drop(stdin);
            result
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| AssistantError::Ocr(format!("{} wait error: {e}", self.command)))?;

        match writer.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "failed to write image to ocr engine stdin");
            }
            Err(e) => {
                tracing::warn!(error = %e, "ocr stdin writer task failed");
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(
                command = %self.command,
                status = ?output.status.code(),
                stderr = %stderr.trim(),
                "ocr engine returned non-zero exit"
            );
            return Err(AssistantError::Ocr(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|_| AssistantError::Ocr("engine output is not valid UTF-8 text".to_string()))
    }
}
