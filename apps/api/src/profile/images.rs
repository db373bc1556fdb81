//! Profile image validation and the object storage they are written to.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use uuid::Uuid;

use crate::errors::AppError;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Accepted extensions and the content type each must arrive with.
const ALLOWED_IMAGE_TYPES: &[(&str, &str)] = &[
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
];

/// A file pulled out of a multipart upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl ImageUpload {
    /// Checks size, extension and content type. Returns the normalized
    /// extension used in the storage key.
    pub fn validate(&self) -> Result<&'static str, AppError> {
        if self.data.is_empty() {
            return Err(AppError::Validation("No image file provided".to_string()));
        }
        if self.data.len() > MAX_IMAGE_BYTES {
            return Err(AppError::PayloadTooLarge(format!(
                "Image must be at most {} MB",
                MAX_IMAGE_BYTES / (1024 * 1024)
            )));
        }

        let extension = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let content_type = self.content_type.to_ascii_lowercase();

        ALLOWED_IMAGE_TYPES
            .iter()
            .find(|(ext, mime)| *ext == extension && *mime == content_type)
            .map(|(ext, _)| *ext)
            .ok_or_else(|| {
                AppError::Validation(
                    "Only image files (jpeg, jpg, png, gif, webp) are allowed".to_string(),
                )
            })
    }
}

/// `profile-images/{userId}_{unixMillis}.{ext}`
pub fn profile_image_key(user_id: Uuid, unix_millis: i64, extension: &str) -> String {
    format!("profile-images/{user_id}_{unix_millis}.{extension}")
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), AppError>;

    async fn remove(&self, key: &str) -> Result<(), AppError>;
}

/// S3 / MinIO bucket holding profile images.
pub struct S3ImageStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ImageStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ImageStore for S3ImageStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("put {key}: {e}")))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("delete {key}: {e}")))?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn upload(file_name: &str, content_type: &str, len: usize) -> ImageUpload {
        ImageUpload {
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            data: Bytes::from(vec![0u8; len]),
        }
    }

    #[test]
    fn test_accepts_known_image_types() {
        assert_eq!(upload("me.PNG", "image/png", 10).validate().unwrap(), "png");
        assert_eq!(upload("me.jpg", "image/jpeg", 10).validate().unwrap(), "jpg");
        assert_eq!(upload("a.b.webp", "image/webp", 10).validate().unwrap(), "webp");
    }

    #[test]
    fn test_rejects_non_images_and_mismatches() {
        assert!(matches!(
            upload("notes.pdf", "application/pdf", 10).validate(),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            upload("me.png", "text/plain", 10).validate(),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            upload("noextension", "image/png", 10).validate(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_oversize_and_empty_files() {
        assert!(matches!(
            upload("big.png", "image/png", MAX_IMAGE_BYTES + 1).validate(),
            Err(AppError::PayloadTooLarge(_))
        ));
        assert!(upload("edge.png", "image/png", MAX_IMAGE_BYTES).validate().is_ok());
        assert!(matches!(
            upload("empty.png", "image/png", 0).validate(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_profile_image_key_layout() {
        let id = Uuid::nil();
        assert_eq!(
            profile_image_key(id, 1_700_000_000_000, "gif"),
            "profile-images/00000000-0000-0000-0000-000000000000_1700000000000.gif"
        );
    }
}
