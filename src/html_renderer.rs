//! HTML to PDF rendering.
//!
//! The production renderer shells out to `wkhtmltopdf`. Each render writes its
//! markup to a uniquely named file under the configured temp directory, so
//! concurrent requests never share a path. The file is a `NamedTempFile` and
//! is unlinked on every exit path, including when the request future is
//! dropped mid-render (the child process is `kill_on_drop`).

use crate::config::Config;
use crate::types::ConversionError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use uuid::Uuid;

const RENDER_OPTIONS: [&str; 4] = ["--quiet", "--encoding", "UTF-8", "--enable-local-file-access"];

#[async_trait]
pub trait HtmlRenderer: Send + Sync {
    async fn render(&self, html: &str) -> Result<Vec<u8>, ConversionError>;
}

#[derive(Debug, Clone)]
pub struct WkHtmlToPdf {
    binary: PathBuf,
    temp_dir: PathBuf,
    timeout: Option<Duration>,
}

impl WkHtmlToPdf {
    pub fn new(binary: impl Into<PathBuf>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            temp_dir: temp_dir.into(),
            timeout: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.wkhtmltopdf_path, &config.temp_dir).with_timeout(config.render_timeout())
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(&self, input: &Path) -> Result<Vec<u8>, ConversionError> {
        let child = Command::new(&self.binary)
            .args(RENDER_OPTIONS)
            .arg(input)
            .arg("-")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ConversionError::Render(format!(
                    "failed to start {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| {
                    let secs = limit.as_secs();
                    ConversionError::Render(format!("renderer timed out after {}s", secs))
                })??,
            None => child.wait_with_output().await?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConversionError::Render(format!(
                "{} exited with {}: {}",
                self.binary.display(),
                output.status,
                stderr.trim()
            )));
        }
        if !output.stdout.starts_with(b"%PDF-") {
            return Err(ConversionError::Render("renderer produced no PDF output".into()));
        }
        Ok(output.stdout)
    }
}

#[async_trait]
impl HtmlRenderer for WkHtmlToPdf {
    async fn render(&self, html: &str) -> Result<Vec<u8>, ConversionError> {
        let input = tempfile::Builder::new()
            .prefix(&format!("render-{}-", Uuid::new_v4()))
            .suffix(".html")
            .tempfile_in(&self.temp_dir)?;
        tokio::fs::write(input.path(), html).await?;

        let result = self.run(input.path()).await;

        if let Err(e) = input.close() {
            log::warn!("Failed to remove render input: {}", e);
        }
        result
    }
}
