use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::models::ModelKind;
use crate::services::error::PipelineError;
use crate::services::preprocessor;
use crate::services::registry::ModelRegistry;

/// Outcome of one classification request.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub model: ModelKind,
    pub predicted_index: usize,
    pub predicted_label: String,
    /// `(class name, probability)` in catalog order.
    pub probabilities: Vec<(String, f64)>,
    pub metric_value: f64,
    pub metric_field_name: Option<&'static str>,
}

impl Serialize for PredictionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Probabilities<'a>(&'a [(String, f64)]);

        impl Serialize for Probabilities<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (name, p) in self.0 {
                    map.serialize_entry(name, p)?;
                }
                map.end()
            }
        }

        let len = if self.metric_field_name.is_some() { 3 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("prediction", &self.predicted_label)?;
        map.serialize_entry("probabilities", &Probabilities(&self.probabilities))?;
        if let Some(field) = self.metric_field_name {
            map.serialize_entry(field, &metric_number(self.metric_value))?;
        }
        map.end()
    }
}

/// Whole metrics are emitted as JSON integers (`300`, not `300.0`).
fn metric_number(value: f64) -> serde_json::Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        serde_json::Value::from(value as i64)
    } else {
        serde_json::Value::from(value)
    }
}

/// Preprocess, infer, normalize and label one upload.
pub struct PredictionPipeline {
    registry: ModelRegistry,
}

impl PredictionPipeline {
    pub fn new(registry: ModelRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn predict(
        &self,
        kind: ModelKind,
        raw_bytes: &[u8],
    ) -> Result<PredictionResult, PipelineError> {
        if !self.registry.contains(kind) {
            return Err(PipelineError::UnknownModelKey(kind));
        }
        if raw_bytes.is_empty() {
            return Err(PipelineError::NoFileProvided);
        }

        let tensor = preprocessor::preprocess(raw_bytes)?;
        let scores = self.registry.infer(kind, &tensor)?;

        let catalog = self.registry.catalog(kind)?;
        if scores.len() != catalog.len() {
            return Err(PipelineError::CatalogMismatch {
                model: kind,
                expected: catalog.len(),
                actual: scores.len(),
            });
        }

        let predicted_index = argmax(&scores)?;
        let probs = softmax(&scores)?;

        let predicted_label = self.registry.resolve(kind, predicted_index)?.to_string();
        let metric_value = self.registry.metric_for(kind, &predicted_label)?;

        let probabilities = catalog
            .class_names()
            .iter()
            .cloned()
            .zip(probs)
            .collect();

        let result = PredictionResult {
            model: kind,
            predicted_index,
            predicted_label,
            probabilities,
            metric_value,
            metric_field_name: catalog.metric_field(),
        };

        log::info!(
            "🔮 {} -> #{} {} (metric={})",
            result.model,
            result.predicted_index,
            result.predicted_label,
            result.metric_value
        );

        Ok(result)
    }
}

/// Index of the largest score. Ties go to the lowest index.
pub fn argmax(scores: &[f32]) -> Result<usize, PipelineError> {
    check_scores(scores)?;

    let mut best = 0;
    for (i, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best] {
            best = i;
        }
    }
    Ok(best)
}

/// Softmax with the maximum subtracted before exponentiating.
///
/// Infinite maxima split the mass evenly among the entries that reach them.
pub fn softmax(scores: &[f32]) -> Result<Vec<f64>, PipelineError> {
    check_scores(scores)?;

    let max = scores
        .iter()
        .map(|&s| s as f64)
        .fold(f64::NEG_INFINITY, f64::max);

    if max.is_infinite() {
        let hits = scores.iter().filter(|&&s| s as f64 == max).count();
        return Ok(scores
            .iter()
            .map(|&s| if s as f64 == max { 1.0 / hits as f64 } else { 0.0 })
            .collect());
    }

    let exps: Vec<f64> = scores.iter().map(|&s| (s as f64 - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    Ok(exps.into_iter().map(|e| e / sum).collect())
}

fn check_scores(scores: &[f32]) -> Result<(), PipelineError> {
    if scores.is_empty() {
        return Err(PipelineError::Inference("model returned no scores".to_string()));
    }
    if scores.iter().any(|s| s.is_nan()) {
        return Err(PipelineError::Inference("model returned NaN scores".to_string()));
    }
    Ok(())
}
