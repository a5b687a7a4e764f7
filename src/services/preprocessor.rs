use image::imageops::{self, FilterType};

use super::error::PipelineError;

/// Square input resolution every served model was trained on.
pub const INPUT_SIZE: usize = 224;
pub const CHANNELS: usize = 3;

/// NHWC float tensor with a batch dimension of one.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    data: Vec<f32>,
}

impl ImageTensor {
    pub fn shape(&self) -> [usize; 4] {
        [1, INPUT_SIZE, INPUT_SIZE, CHANNELS]
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[cfg(test)]
    pub fn from_data(data: Vec<f32>) -> Self {
        assert_eq!(data.len(), INPUT_SIZE * INPUT_SIZE * CHANNELS);
        Self { data }
    }
}

/// Decode an uploaded image and turn it into a `[1, 224, 224, 3]` tensor in `[0, 1]`.
///
/// Alpha is dropped and grayscale is replicated across channels, so any
/// decodable color mode is accepted.
pub fn preprocess(raw_bytes: &[u8]) -> Result<ImageTensor, PipelineError> {
    let img = image::load_from_memory(raw_bytes)?;
    if img.width() == 0 || img.height() == 0 {
        return Err(PipelineError::Decode("image has no pixels".to_string()));
    }

    let rgb = img.to_rgb8();
    let resized = imageops::resize(&rgb, INPUT_SIZE as u32, INPUT_SIZE as u32, FilterType::Nearest);

    // Row-major pixels with interleaved channels is exactly NHWC for a batch of one.
    let data: Vec<f32> = resized
        .into_raw()
        .into_iter()
        .map(|c| c as f32 / 255.0)
        .collect();

    Ok(ImageTensor { data })
}
