use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Service settings. Layered from built-in defaults, an optional
/// `converter.{toml,yaml,json}` in the working directory, and `CONVERTER_*`
/// environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Directory receiving the per-request HTML files handed to the renderer.
    pub temp_dir: PathBuf,
    pub wkhtmltopdf_path: PathBuf,
    /// 0 disables the limit.
    pub render_timeout_secs: u64,
    pub jpeg_quality: u8,
    pub pdf_dpi: u32,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            temp_dir: std::env::temp_dir(),
            wkhtmltopdf_path: PathBuf::from("wkhtmltopdf"),
            render_timeout_secs: 60,
            jpeg_quality: 75,
            pdf_dpi: 72,
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config: Config = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(config::File::with_name("converter").required(false))
            .add_source(config::Environment::with_prefix("CONVERTER").try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(config::ConfigError::Message(format!(
                "jpeg_quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }
        if self.pdf_dpi == 0 {
            return Err(config::ConfigError::Message("pdf_dpi must be positive".into()));
        }
        if self.max_upload_bytes == 0 {
            return Err(config::ConfigError::Message(
                "max_upload_bytes must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }

    pub fn render_timeout(&self) -> Option<Duration> {
        match self.render_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
