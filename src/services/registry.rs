use anyhow::{Context, Result};
use std::collections::HashMap;

use crate::config::Settings;
use crate::models::ModelKind;
use crate::services::catalog::ClassCatalog;
use crate::services::classifier::{Classifier, OnnxClassifier};
use crate::services::error::PipelineError;
use crate::services::preprocessor::ImageTensor;

struct ModelEntry {
    classifier: Box<dyn Classifier>,
    catalog: ClassCatalog,
}

/// Classifiers and catalogs loaded at startup, read-only afterwards.
pub struct ModelRegistry {
    entries: HashMap<ModelKind, ModelEntry>,
}

#[derive(Default)]
pub struct ModelRegistryBuilder {
    entries: HashMap<ModelKind, ModelEntry>,
}

impl ModelRegistryBuilder {
    /// Bind a classifier and its catalog to `kind`.
    ///
    /// Fails when the classifier reports an output length different from the
    /// number of labels, when a label is listed twice, or when `kind` is
    /// already registered.
    pub fn register(
        mut self,
        kind: ModelKind,
        classifier: Box<dyn Classifier>,
        catalog: ClassCatalog,
    ) -> Result<Self> {
        if self.entries.contains_key(&kind) {
            anyhow::bail!("model '{}' registered twice", kind);
        }
        if let Some(name) = catalog.duplicate_label() {
            anyhow::bail!("model '{}' lists class '{}' more than once", kind, name);
        }

        match classifier.num_classes() {
            Some(n) if n != catalog.len() => anyhow::bail!(
                "model '{}' outputs {} classes but its catalog lists {} labels",
                kind,
                n,
                catalog.len()
            ),
            Some(_) => {}
            None => log::warn!(
                "⚠️ Output size of model '{}' is not static, class count checked per request",
                kind
            ),
        }

        self.entries.insert(kind, ModelEntry { classifier, catalog });
        Ok(self)
    }

    pub fn build(self) -> ModelRegistry {
        ModelRegistry {
            entries: self.entries,
        }
    }
}

impl ModelRegistry {
    pub fn builder() -> ModelRegistryBuilder {
        ModelRegistryBuilder::default()
    }

    /// Load every enabled model from `settings.models_dir`.
    pub fn load(settings: &Settings) -> Result<Self> {
        let mut builder = Self::builder();

        for &kind in &settings.enabled_models {
            let artifacts = settings.artifacts_for(kind);

            let classifier = OnnxClassifier::load(&artifacts.model_path)
                .with_context(|| format!("failed to load model '{}'", kind))?;
            let catalog =
                ClassCatalog::load(kind, &artifacts.labels_path, &artifacts.metrics_path)?;
            let class_count = catalog.len();

            builder = builder.register(kind, Box::new(classifier), catalog)?;
            log::info!("✅ Model '{}' loaded ({} classes)", kind, class_count);
        }

        Ok(builder.build())
    }

    pub fn contains(&self, kind: ModelKind) -> bool {
        self.entries.contains_key(&kind)
    }

    pub fn kinds(&self) -> Vec<ModelKind> {
        let mut kinds: Vec<ModelKind> = self.entries.keys().copied().collect();
        kinds.sort_by_key(|k| k.as_str());
        kinds
    }

    pub fn infer(&self, kind: ModelKind, tensor: &ImageTensor) -> Result<Vec<f32>, PipelineError> {
        self.entry(kind)?.classifier.infer(tensor)
    }

    pub fn catalog(&self, kind: ModelKind) -> Result<&ClassCatalog, PipelineError> {
        Ok(&self.entry(kind)?.catalog)
    }

    pub fn resolve(&self, kind: ModelKind, class_index: usize) -> Result<&str, PipelineError> {
        self.catalog(kind)?.resolve(class_index)
    }

    pub fn metric_for(&self, kind: ModelKind, class_name: &str) -> Result<f64, PipelineError> {
        Ok(self.catalog(kind)?.metric_for(class_name))
    }

    fn entry(&self, kind: ModelKind) -> Result<&ModelEntry, PipelineError> {
        self.entries
            .get(&kind)
            .ok_or(PipelineError::UnknownModelKey(kind))
    }
}
