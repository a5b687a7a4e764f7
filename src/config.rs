use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use crate::models::ModelKind;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MODELS_DIR: &str = "models";
const DEFAULT_ENABLED_MODELS: &str = "foods,gym";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_WELCOME_MESSAGE: &str = "Welcome to the Prediction API!";

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub models_dir: PathBuf,
    pub enabled_models: Vec<ModelKind>,
    /// Model answering `POST /api/predict`.
    pub default_model: ModelKind,
    pub max_upload_bytes: usize,
    pub welcome_message: String,
}

/// On-disk files backing one model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifacts {
    pub model_path: PathBuf,
    pub labels_path: PathBuf,
    pub metrics_path: PathBuf,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let models_dir = PathBuf::from(
            lookup("MODELS_DIR").unwrap_or_else(|| DEFAULT_MODELS_DIR.to_string()),
        );

        let enabled_raw =
            lookup("ENABLED_MODELS").unwrap_or_else(|| DEFAULT_ENABLED_MODELS.to_string());
        let mut enabled_models = Vec::new();
        for key in enabled_raw.split(',').map(str::trim).filter(|k| !k.is_empty()) {
            let kind: ModelKind = key
                .parse()
                .with_context(|| format!("invalid entry in ENABLED_MODELS: '{}'", key))?;
            if !enabled_models.contains(&kind) {
                enabled_models.push(kind);
            }
        }
        let first_enabled = *enabled_models
            .first()
            .context("ENABLED_MODELS must name at least one model")?;

        let default_model = match lookup("DEFAULT_MODEL") {
            Some(key) => {
                let kind: ModelKind = key
                    .parse()
                    .with_context(|| format!("invalid DEFAULT_MODEL: '{}'", key))?;
                if !enabled_models.contains(&kind) {
                    anyhow::bail!("DEFAULT_MODEL '{}' is not listed in ENABLED_MODELS", kind);
                }
                kind
            }
            None => first_enabled,
        };

        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("invalid MAX_UPLOAD_BYTES: '{}'", raw))?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let welcome_message =
            lookup("WELCOME_MESSAGE").unwrap_or_else(|| DEFAULT_WELCOME_MESSAGE.to_string());

        Ok(Self {
            bind_addr,
            models_dir,
            enabled_models,
            default_model,
            max_upload_bytes,
            welcome_message,
        })
    }

    /// `<models_dir>/<key>_model.onnx`, `<key>_labels.txt` and `<key>_metrics.json`.
    pub fn artifacts_for(&self, kind: ModelKind) -> ModelArtifacts {
        let key = kind.as_str();
        ModelArtifacts {
            model_path: self.models_dir.join(format!("{}_model.onnx", key)),
            labels_path: self.models_dir.join(format!("{}_labels.txt", key)),
            metrics_path: self.models_dir.join(format!("{}_metrics.json", key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.bind_addr, "0.0.0.0:8080");
        assert_eq!(s.models_dir, PathBuf::from("models"));
        assert_eq!(s.enabled_models, vec![ModelKind::Foods, ModelKind::Gym]);
        assert_eq!(s.default_model, ModelKind::Foods);
        assert_eq!(s.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(s.welcome_message, "Welcome to the Prediction API!");
    }

    #[test]
    fn test_single_model_deployment() {
        let s = settings(&[("ENABLED_MODELS", "disease"), ("MODELS_DIR", "/srv/models")]).unwrap();
        assert_eq!(s.enabled_models, vec![ModelKind::Disease]);
        assert_eq!(s.default_model, ModelKind::Disease);

        let artifacts = s.artifacts_for(ModelKind::Disease);
        assert_eq!(artifacts.model_path, PathBuf::from("/srv/models/disease_model.onnx"));
        assert_eq!(artifacts.labels_path, PathBuf::from("/srv/models/disease_labels.txt"));
        assert_eq!(artifacts.metrics_path, PathBuf::from("/srv/models/disease_metrics.json"));
    }

    #[test]
    fn test_duplicates_and_blanks_are_ignored() {
        let s = settings(&[("ENABLED_MODELS", " gym, ,foods,gym ")]).unwrap();
        assert_eq!(s.enabled_models, vec![ModelKind::Gym, ModelKind::Foods]);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(settings(&[("ENABLED_MODELS", "foods,cars")]).is_err());
        assert!(settings(&[("ENABLED_MODELS", " , ")]).is_err());
        assert!(settings(&[("MAX_UPLOAD_BYTES", "lots")]).is_err());
        assert!(settings(&[("DEFAULT_MODEL", "disease")]).is_err());
    }

    #[test]
    fn test_explicit_default_model() {
        let s = settings(&[("DEFAULT_MODEL", "gym")]).unwrap();
        assert_eq!(s.default_model, ModelKind::Gym);
    }
}
