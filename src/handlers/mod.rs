pub mod auth;
pub mod form;
pub mod pic;
pub mod proposal;
pub mod report;
pub mod schedule;
pub mod stakeholder;

use serde::{Deserialize, Serialize};

/// Plain confirmation body for deletes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
