//! Configuration loading from TOML.
//!
//! Reads an optional `config.toml` and deserializes into strongly-typed
//! structs. Every field has a default mirroring the reference deployment,
//! so a missing file is a normal default run; command-line flags override
//! file values in `main`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::SamplingOptions;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub sampling: SamplingOptions,
    pub io: IoConfig,
}

/// Generation engine deployment.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the OpenAI-compatible serving endpoint.
    pub endpoint: String,
    /// Model identifier, as served.
    pub model: String,
    /// Tensor-parallel size of the serving deployment. Informational: GPU
    /// placement is owned by the server.
    pub num_gpus: u32,
    /// Number of drugs submitted per engine call.
    pub batch_size: usize,
    pub request_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000".to_string(),
            model: "meta-llama/Meta-Llama-3-8B-Instruct".to_string(),
            num_gpus: 1,
            batch_size: 4,
            request_timeout_secs: 600,
        }
    }
}

/// Input and output locations.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IoConfig {
    pub input_path: PathBuf,
    /// Name of the input column holding the drug names.
    pub drug_column: String,
    pub output_dir: PathBuf,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("drugs_15980.parquet"),
            drug_column: "values".to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, or defaults if it is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.engine.endpoint, "http://localhost:8000");
        assert_eq!(cfg.engine.model, "meta-llama/Meta-Llama-3-8B-Instruct");
        assert_eq!(cfg.engine.batch_size, 4);
        assert_eq!(cfg.io.drug_column, "values");
        assert!((cfg.sampling.temperature - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_missing_file_is_default() {
        let cfg = AppConfig::load(Path::new("/tmp/medscreen_no_such_config.toml")).unwrap();
        assert_eq!(cfg.engine.batch_size, AppConfig::default().engine.batch_size);
    }

    #[test]
    fn test_partial_toml() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [engine]
            model = "mistralai/Mistral-7B-Instruct-v0.2"
            batch_size = 16

            [sampling]
            temperature = 0.2
            "#,
        )
        .unwrap();
        assert_eq!(cfg.engine.model, "mistralai/Mistral-7B-Instruct-v0.2");
        assert_eq!(cfg.engine.batch_size, 16);
        // Unspecified fields keep their defaults.
        assert_eq!(cfg.engine.endpoint, "http://localhost:8000");
        assert!((cfg.sampling.temperature - 0.2).abs() < 1e-12);
        assert!((cfg.sampling.top_p - 0.9).abs() < 1e-12);
    }
}
