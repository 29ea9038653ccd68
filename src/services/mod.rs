pub mod uploader;
pub mod version_control;

pub use uploader::UploadService;
pub use version_control::VersionControlService;
