use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};

use super::schedule::Schedule;

/// An institution that periodically receives donated goods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Stakeholder {
    pub id: i64,
    pub institution_name: String,
    pub receiving_agency: Option<String>,
    pub branch: Option<String>,
    pub default_quantity: i64,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Stakeholder {
    /// Column list used when a stakeholder is joined onto another table.
    /// Every column is aliased with the `st_` prefix read by `from_joined_row`.
    pub const JOINED_COLUMNS: &'static str = "st.id AS st_id, \
        st.institution_name AS st_institution_name, \
        st.receiving_agency AS st_receiving_agency, \
        st.branch AS st_branch, \
        st.default_quantity AS st_default_quantity, \
        st.contact_person AS st_contact_person, \
        st.phone AS st_phone, \
        st.address AS st_address, \
        st.is_active AS st_is_active, \
        st.created_at AS st_created_at, \
        st.updated_at AS st_updated_at";

    pub fn from_joined_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("st_id")?,
            institution_name: row.try_get("st_institution_name")?,
            receiving_agency: row.try_get("st_receiving_agency")?,
            branch: row.try_get("st_branch")?,
            default_quantity: row.try_get("st_default_quantity")?,
            contact_person: row.try_get("st_contact_person")?,
            phone: row.try_get("st_phone")?,
            address: row.try_get("st_address")?,
            is_active: row.try_get("st_is_active")?,
            created_at: row.try_get("st_created_at")?,
            updated_at: row.try_get("st_updated_at")?,
        })
    }
}

/// Payload for creating a stakeholder
#[derive(Debug, Clone, Deserialize)]
pub struct NewStakeholder {
    pub institution_name: String,
    pub receiving_agency: Option<String>,
    pub branch: Option<String>,
    #[serde(default)]
    pub default_quantity: i64,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Partial update. Absent fields keep their stored value; an explicit `null`
/// clears a nullable field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StakeholderPatch {
    pub institution_name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub receiving_agency: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub branch: Option<Option<String>>,
    pub default_quantity: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub contact_person: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub address: Option<Option<String>>,
    pub is_active: Option<bool>,
}

/// A present key becomes `Some`, even when its value is `null`
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl StakeholderPatch {
    pub fn apply(self, stakeholder: &mut Stakeholder) {
        if let Some(name) = self.institution_name {
            stakeholder.institution_name = name;
        }
        if let Some(agency) = self.receiving_agency {
            stakeholder.receiving_agency = agency;
        }
        if let Some(branch) = self.branch {
            stakeholder.branch = branch;
        }
        if let Some(quantity) = self.default_quantity {
            stakeholder.default_quantity = quantity;
        }
        if let Some(contact) = self.contact_person {
            stakeholder.contact_person = contact;
        }
        if let Some(phone) = self.phone {
            stakeholder.phone = phone;
        }
        if let Some(address) = self.address {
            stakeholder.address = address;
        }
        if let Some(active) = self.is_active {
            stakeholder.is_active = active;
        }
    }
}

/// Query string filters for the stakeholder list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StakeholderFilter {
    pub search: Option<String>,
    pub branch: Option<String>,
    pub is_active: Option<String>,
}

impl StakeholderFilter {
    /// Only the literal "true" selects active stakeholders; any other value selects inactive ones
    pub fn active_flag(&self) -> Option<bool> {
        self.is_active.as_deref().map(|value| value == "true")
    }
}

/// A stakeholder together with its schedules for one year
#[derive(Debug, Clone, Serialize)]
pub struct StakeholderWithSchedules {
    #[serde(flatten)]
    pub stakeholder: Stakeholder,
    pub schedules: Vec<Schedule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_tells_null_apart_from_absent() {
        let patch: StakeholderPatch =
            serde_json::from_str(r#"{"branch": null, "phone": "0812"}"#).unwrap();
        assert_eq!(patch.branch, Some(None));
        assert_eq!(patch.phone, Some(Some("0812".to_string())));
        assert_eq!(patch.address, None);
        assert_eq!(patch.institution_name, None);
    }
}
