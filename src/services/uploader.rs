use async_trait::async_trait;

use crate::domain::payload::UploadPayload;
use crate::error::AppResult;

#[async_trait]
pub trait UploadService: Send + Sync {
    async fn upload(&self, payload: &UploadPayload) -> AppResult<()>;
}
