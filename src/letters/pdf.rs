use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

use super::LetterError;
use crate::config::LetterConfig;

/// HTML in, PDF bytes out.
#[async_trait]
pub trait PdfConverter: Send + Sync {
    async fn convert(&self, html: &str) -> Result<Vec<u8>, LetterError>;
}

/// Runs an external converter that reads HTML on stdin and writes PDF on stdout.
pub struct CommandPdfConverter {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandPdfConverter {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &LetterConfig) -> Result<Self, String> {
        let (program, args) = config
            .pdf_command
            .split_first()
            .ok_or_else(|| "PDF command is empty".to_string())?;
        Ok(Self::new(program.clone(), args.to_vec(), config.pdf_timeout))
    }
}

#[async_trait]
impl PdfConverter for CommandPdfConverter {
    async fn convert(&self, html: &str) -> Result<Vec<u8>, LetterError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| LetterError::PdfRender(format!("failed to start {}: {e}", self.program)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| LetterError::PdfRender("converter stdin unavailable".to_string()))?;
        let input = html.as_bytes().to_vec();
        let writer = tokio::spawn(async move {
            stdin.write_all(&input).await?;
            stdin.shutdown().await
        });

        // Dropping the child on timeout kills it.
        let output = timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                LetterError::PdfRender(format!(
                    "{} timed out after {}s",
                    self.program,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| LetterError::PdfRender(format!("waiting for {} failed: {e}", self.program)))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(LetterError::PdfRender(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        if !stderr.trim().is_empty() {
            tracing::warn!("{} reported: {}", self.program, stderr.trim());
        }

        match writer.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(LetterError::PdfRender(format!("writing HTML to converter failed: {e}")));
            }
            Err(e) => {
                return Err(LetterError::PdfRender(format!("converter input task failed: {e}")));
            }
        }

        if output.stdout.is_empty() {
            return Err(LetterError::PdfRender(format!("{} produced no output", self.program)));
        }

        Ok(output.stdout)
    }
}
