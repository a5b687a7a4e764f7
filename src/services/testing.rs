//! Fakes and fixtures shared by the unit tests.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;

use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};

use crate::models::ModelKind;
use crate::services::catalog::ClassCatalog;
use crate::services::classifier::Classifier;
use crate::services::error::PipelineError;
use crate::services::preprocessor::{ImageTensor, CHANNELS, INPUT_SIZE};

/// Returns the same scores for every input.
pub struct FixedScores {
    scores: Vec<f32>,
    declared: Option<usize>,
}

impl FixedScores {
    pub fn new(scores: Vec<f32>) -> Self {
        let declared = Some(scores.len());
        Self { scores, declared }
    }

    /// Does not report a class count, like a model with a dynamic output shape.
    pub fn without_class_count(scores: Vec<f32>) -> Self {
        Self {
            scores,
            declared: None,
        }
    }
}

impl Classifier for FixedScores {
    fn infer(&self, _tensor: &ImageTensor) -> Result<Vec<f32>, PipelineError> {
        Ok(self.scores.clone())
    }

    fn num_classes(&self) -> Option<usize> {
        self.declared
    }
}

/// Two classes, `[dark, bright]`, scored from the mean pixel value.
pub struct MeanBrightness;

impl Classifier for MeanBrightness {
    fn infer(&self, tensor: &ImageTensor) -> Result<Vec<f32>, PipelineError> {
        let data = tensor.data();
        let mean = data.iter().sum::<f32>() / data.len() as f32;
        Ok(vec![1.0 - mean, mean])
    }

    fn num_classes(&self) -> Option<usize> {
        Some(2)
    }
}

/// Always fails, as a runtime would on a shape mismatch.
pub struct Broken;

impl Classifier for Broken {
    fn infer(&self, _tensor: &ImageTensor) -> Result<Vec<f32>, PipelineError> {
        Err(PipelineError::Inference("shape mismatch".to_string()))
    }

    fn num_classes(&self) -> Option<usize> {
        None
    }
}

pub fn blank_tensor() -> ImageTensor {
    ImageTensor::from_data(vec![0.0; INPUT_SIZE * INPUT_SIZE * CHANNELS])
}

pub fn catalog_of(kind: ModelKind, labels: &[&str], metrics: &[(&str, f64)]) -> ClassCatalog {
    ClassCatalog::new(
        kind,
        labels.iter().map(|l| l.to_string()).collect(),
        metrics
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect::<HashMap<_, _>>(),
    )
}

pub fn shipped(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("models").join(file)
}

/// Files under `testdata/`.
pub fn fixture(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata").join(file)
}

pub fn foods_catalog() -> ClassCatalog {
    ClassCatalog::load(
        ModelKind::Foods,
        &shipped("foods_labels.txt"),
        &shipped("foods_metrics.json"),
    )
    .unwrap()
}

pub fn gym_catalog() -> ClassCatalog {
    ClassCatalog::load(
        ModelKind::Gym,
        &shipped("gym_labels.txt"),
        &shipped("gym_metrics.json"),
    )
    .unwrap()
}

/// Logits that put `label` clearly ahead of every other class.
pub fn peaked_scores(catalog: &ClassCatalog, label: &str) -> Vec<f32> {
    catalog
        .class_names()
        .iter()
        .map(|name| if name == label { 8.0 } else { 0.5 })
        .collect()
}

pub fn encode_png(img: &DynamicImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .unwrap();
    bytes
}

pub fn solid_png(rgb: [u8; 3]) -> Vec<u8> {
    encode_png(&DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 24, Rgb(rgb))))
}
