use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Person in charge of proposals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Pic {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPic {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PicPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl PicPatch {
    pub fn apply(self, pic: &mut Pic) {
        if let Some(name) = self.name {
            pic.name = name;
        }
        if self.email.is_some() {
            pic.email = self.email;
        }
        if self.phone.is_some() {
            pic.phone = self.phone;
        }
    }
}
