use std::sync::Arc;

use crate::config::Settings;
use crate::services::{UploadService, VersionControlService};

#[derive(Clone)]
pub struct HookContext {
    pub settings: Settings,
    pub version_control: Arc<dyn VersionControlService>,
    pub uploader: Arc<dyn UploadService>,
}

impl HookContext {
    pub fn new(
        settings: Settings,
        version_control: Arc<dyn VersionControlService>,
        uploader: Arc<dyn UploadService>,
    ) -> Self {
        Self {
            settings,
            version_control,
            uploader,
        }
    }
}
