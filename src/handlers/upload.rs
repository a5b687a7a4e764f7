use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::body::Bytes;

use super::error::ApiError;

/// Multipart field carrying the uploaded picture.
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Pull the `image` file out of a multipart body.
///
/// A body that is not multipart counts as a missing field. A field without a
/// file name or content counts as no file selected.
pub async fn read_image_field(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Upload, ApiError> {
    let mut multipart = match multipart {
        Ok(m) => m,
        Err(rejection) => {
            log::debug!("Request body is not multipart: {}", rejection);
            return Err(ApiError::NoFilePart);
        }
    };

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(ApiError::NoFilePart),
            Err(e) => return Err(ApiError::Multipart(e)),
        };

        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        if file_name.is_empty() {
            return Err(ApiError::NoSelectedFile);
        }

        let bytes = field.bytes().await.map_err(ApiError::Multipart)?;
        if bytes.is_empty() {
            return Err(ApiError::NoSelectedFile);
        }

        log::debug!("📥 Received '{}' ({} bytes)", file_name, bytes.len());
        return Ok(Upload { file_name, bytes });
    }
}
