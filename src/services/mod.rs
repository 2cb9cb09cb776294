pub mod auth_service;
pub mod export;
pub mod report_service;
pub mod upload_service;

pub use auth_service::AuthService;
pub use upload_service::{UploadStore, UploadedFile};
