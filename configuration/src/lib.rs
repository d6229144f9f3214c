use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type AppConfig = SpeakerConfig;

const ENV_PREFIX: &str = "SPEAKER_SERVICE__";
const CONFIG_FILE: &str = "speaker-service.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] figment::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeakerConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub verification: VerificationConfig,
    #[serde(default)]
    pub embedding: EmbeddingRuntimeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Canonical sample rate; every clip is resampled to this before
    /// embedding extraction.
    #[serde(default = "default_sample_rate")]
    pub sample_rate_hz: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Cosine-similarity decision threshold, in [-1, 1]. The boundary is
    /// inclusive: a score equal to the threshold authorizes.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Directory holding the authorized speaker's samples; scanned at
    /// startup and on re-enrollment requests without explicit sources.
    #[serde(default)]
    pub enrollment_dir: Option<String>,
    /// `strict` aborts enrollment on the first unreadable sample, `skip`
    /// drops it and continues.
    #[serde(default = "default_on_error")]
    pub on_error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRuntimeConfig {
    /// `spectral` (deterministic DSP backend) or `tdnn` (candle encoder,
    /// requires `model_path`).
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default)]
    pub model_path: Option<String>,
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,
    #[serde(default = "default_n_mels")]
    pub n_mels: usize,
    #[serde(default = "default_n_fft")]
    pub n_fft: usize,
    #[serde(default = "default_hop_length")]
    pub hop_length: usize,
    #[serde(default = "default_win_length")]
    pub win_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: default_sample_rate(),
        }
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            enrollment_dir: None,
            on_error: default_on_error(),
        }
    }
}

impl Default for EmbeddingRuntimeConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            model_path: None,
            embedding_dim: default_embedding_dim(),
            n_mels: default_n_mels(),
            n_fft: default_n_fft(),
            hop_length: default_hop_length(),
            win_length: default_win_length(),
        }
    }
}

/// Layered load: defaults, then `speaker-service.toml` if present, then
/// `SPEAKER_SERVICE__*` environment overrides.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(Path::new(CONFIG_FILE))
}

pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let mut figment = Figment::new().merge(Serialized::defaults(SpeakerConfig::default()));
    if path.exists() {
        figment = figment.merge(Toml::file(path));
    }
    let config = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?;
    Ok(config)
}

/// Installs the global tracing subscriber. `RUST_LOG` wins over the
/// configured level when set.
pub fn setup_logging(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_sample_rate() -> u32 {
    16_000
}

fn default_threshold() -> f64 {
    0.75
}

fn default_on_error() -> String {
    "strict".to_string()
}

fn default_backend() -> String {
    "spectral".to_string()
}

fn default_embedding_dim() -> usize {
    192
}

fn default_n_mels() -> usize {
    80
}

fn default_n_fft() -> usize {
    512
}

fn default_hop_length() -> usize {
    160
}

fn default_win_length() -> usize {
    400
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn config_defaults_are_deterministic() {
        let cfg = SpeakerConfig::default();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.service.audio.sample_rate_hz, 16_000);
        assert_eq!(cfg.service.verification.threshold, 0.75);
        assert_eq!(cfg.service.verification.on_error, "strict");
        assert_eq!(cfg.service.embedding.backend, "spectral");
        assert_eq!(cfg.service.embedding.embedding_dim, 192);
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("speaker-service.toml");
        let mut file = std::fs::File::create(&path).expect("create config");
        writeln!(
            file,
            "[service.verification]\nthreshold = 0.6\nenrollment_dir = \"voices\""
        )
        .expect("write config");

        let cfg = load_config_from(&path).expect("load");
        assert_eq!(cfg.service.verification.threshold, 0.6);
        assert_eq!(
            cfg.service.verification.enrollment_dir.as_deref(),
            Some("voices")
        );
        // Untouched sections keep their defaults.
        assert_eq!(cfg.server.port, 8080);
    }
}
