use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::models::ModelKind;
use crate::services::error::PipelineError;

/// Index-aligned class names for one model, plus the per-class metric lookup.
#[derive(Debug, Clone)]
pub struct ClassCatalog {
    kind: ModelKind,
    class_names: Vec<String>,
    metrics: HashMap<String, f64>,
}

impl ClassCatalog {
    pub fn new(kind: ModelKind, class_names: Vec<String>, metrics: HashMap<String, f64>) -> Self {
        Self {
            kind,
            class_names,
            metrics,
        }
    }

    /// Read `labels_path` (one class per line) and, if present, `metrics_path`
    /// (a JSON object of class name to number).
    pub fn load(kind: ModelKind, labels_path: &Path, metrics_path: &Path) -> Result<Self> {
        let labels = fs::read_to_string(labels_path)
            .with_context(|| format!("failed to read labels file {}", labels_path.display()))?;
        let class_names = parse_labels(&labels);
        if class_names.is_empty() {
            anyhow::bail!("labels file {} has no classes", labels_path.display());
        }
        if let Some(name) = first_duplicate(&class_names) {
            anyhow::bail!(
                "labels file {} lists '{}' more than once",
                labels_path.display(),
                name
            );
        }

        let metrics = if metrics_path.exists() {
            let raw = fs::read_to_string(metrics_path).with_context(|| {
                format!("failed to read metrics file {}", metrics_path.display())
            })?;
            serde_json::from_str::<HashMap<String, f64>>(&raw)
                .with_context(|| format!("invalid metrics file {}", metrics_path.display()))?
        } else {
            log::info!("ℹ️ No metrics file for '{}', every class defaults to 0", kind);
            HashMap::new()
        };

        for name in metrics.keys() {
            if !class_names.contains(name) {
                log::warn!(
                    "⚠️ Metric for '{}' in {} matches no class label",
                    name,
                    metrics_path.display()
                );
            }
        }

        Ok(Self::new(kind, class_names, metrics))
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn len(&self) -> usize {
        self.class_names.len()
    }

    pub fn resolve(&self, class_index: usize) -> Result<&str, PipelineError> {
        self.class_names
            .get(class_index)
            .map(String::as_str)
            .ok_or(PipelineError::IndexOutOfRange {
                model: self.kind,
                index: class_index,
                len: self.class_names.len(),
            })
    }

    /// Unknown classes count as zero.
    pub fn metric_for(&self, class_name: &str) -> f64 {
        self.metrics.get(class_name).copied().unwrap_or(0.0)
    }

    pub fn metric_field(&self) -> Option<&'static str> {
        self.kind.metric_field()
    }

    /// First label that appears twice, if any.
    pub fn duplicate_label(&self) -> Option<&str> {
        first_duplicate(&self.class_names)
    }
}

fn first_duplicate(names: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    names
        .iter()
        .find(|name| !seen.insert(name.as_str()))
        .map(String::as_str)
}

fn parse_labels(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
