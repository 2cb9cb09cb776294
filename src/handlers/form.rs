use axum::extract::Multipart;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::str::FromStr;

use crate::{
    error::{AppError, Result},
    services::UploadedFile,
};

/// Text fields and the optional file of a multipart form
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    file: Option<UploadedFile>,
}

impl FormData {
    /// Drain the multipart stream. `file_field` names the part holding the upload;
    /// a file part without content is treated as absent.
    pub async fn read(mut multipart: Multipart, file_field: &str) -> Result<Self> {
        let mut form = FormData::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == file_field {
                let original_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    form.file = Some(UploadedFile {
                        original_name,
                        bytes: bytes.to_vec(),
                    });
                }
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            file: None,
        }
    }

    /// Trimmed text value; blank values count as absent
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn parse<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
    {
        match self.text(name) {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| AppError::BadRequest(format!("{name} has an invalid value '{raw}'"))),
        }
    }

    pub fn require<T>(&self, name: &str) -> Result<T>
    where
        T: FromStr,
    {
        self.parse(name)?
            .ok_or_else(|| AppError::BadRequest(format!("{name} is required")))
    }

    /// Calendar date; a full ISO timestamp is cut to its date part
    pub fn date(&self, name: &str) -> Result<Option<NaiveDate>> {
        match self.text(name) {
            None => Ok(None),
            Some(raw) => {
                let day = raw.get(..10).unwrap_or(&raw);
                NaiveDate::parse_from_str(day, "%Y-%m-%d")
                    .map(Some)
                    .map_err(|_| AppError::BadRequest(format!("{name} must be a YYYY-MM-DD date, got '{raw}'")))
            }
        }
    }

    pub fn take_file(&mut self) -> Option<UploadedFile> {
        self.file.take()
    }
}
