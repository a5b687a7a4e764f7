pub mod error;
pub mod predict;
pub mod upload;

pub use predict::{predict_default, predict_with_model};
