use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};
use std::fmt;
use std::str::FromStr;

/// Pickup state of a proposal's donation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum ProposalStatus {
    #[serde(rename = "In Progress")]
    #[sqlx(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Siap Diambil")]
    #[sqlx(rename = "Siap Diambil")]
    ReadyForPickup,
    #[serde(rename = "Done")]
    #[sqlx(rename = "Done")]
    Done,
}

impl Default for ProposalStatus {
    fn default() -> Self {
        Self::InProgress
    }
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "In Progress",
            Self::ReadyForPickup => "Siap Diambil",
            Self::Done => "Done",
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProposalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "In Progress" => Ok(Self::InProgress),
            "Siap Diambil" => Ok(Self::ReadyForPickup),
            "Done" => Ok(Self::Done),
            other => Err(format!("unknown proposal status '{other}'")),
        }
    }
}

/// A CSR funding or donation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Proposal {
    pub id: i64,
    pub case_id: String,
    pub name: String,
    pub origin: Option<String>,
    pub status: ProposalStatus,
    pub pic_id: Option<i64>,
    pub entry_date: NaiveDate,
    pub donation_form: Option<String>,
    pub product_quantity: Option<i64>,
    pub proposal_type: Option<String>,
    pub product_detail: Option<String>,
    pub total_price: f64,
    pub notes: Option<String>,
    pub supporting_file: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Short form of the PIC embedded in proposal responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PicRef {
    pub id: i64,
    pub name: String,
}

/// A proposal with its PIC joined in
#[derive(Debug, Clone, Serialize)]
pub struct ProposalView {
    #[serde(flatten)]
    pub proposal: Proposal,
    pub pic: Option<PicRef>,
}

impl ProposalView {
    pub fn pic_name(&self) -> &str {
        self.pic.as_ref().map(|pic| pic.name.as_str()).unwrap_or("")
    }
}

impl<'r> FromRow<'r, SqliteRow> for ProposalView {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let pic_id: Option<i64> = row.try_get("pic_ref_id")?;
        let pic_name: Option<String> = row.try_get("pic_name")?;

        Ok(Self {
            proposal: Proposal::from_row(row)?,
            pic: pic_id.zip(pic_name).map(|(id, name)| PicRef { id, name }),
        })
    }
}

/// Values for a new proposal, after form parsing
#[derive(Debug, Clone)]
pub struct NewProposal {
    pub case_id: Option<String>,
    pub name: String,
    pub origin: Option<String>,
    pub status: ProposalStatus,
    pub pic_id: Option<i64>,
    pub entry_date: NaiveDate,
    pub donation_form: Option<String>,
    pub product_quantity: Option<i64>,
    pub proposal_type: Option<String>,
    pub product_detail: Option<String>,
    pub total_price: f64,
    pub notes: Option<String>,
    pub supporting_file: Option<String>,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default)]
pub struct ProposalPatch {
    pub case_id: Option<String>,
    pub name: Option<String>,
    pub origin: Option<String>,
    pub status: Option<ProposalStatus>,
    pub pic_id: Option<i64>,
    pub entry_date: Option<NaiveDate>,
    pub donation_form: Option<String>,
    pub product_quantity: Option<i64>,
    pub proposal_type: Option<String>,
    pub product_detail: Option<String>,
    pub total_price: Option<f64>,
    pub notes: Option<String>,
    pub supporting_file: Option<String>,
}

impl ProposalPatch {
    pub fn apply(self, proposal: &mut Proposal) {
        if let Some(case_id) = self.case_id {
            proposal.case_id = case_id;
        }
        if let Some(name) = self.name {
            proposal.name = name;
        }
        if self.origin.is_some() {
            proposal.origin = self.origin;
        }
        if let Some(status) = self.status {
            proposal.status = status;
        }
        if self.pic_id.is_some() {
            proposal.pic_id = self.pic_id;
        }
        if let Some(date) = self.entry_date {
            proposal.entry_date = date;
        }
        if self.donation_form.is_some() {
            proposal.donation_form = self.donation_form;
        }
        if self.product_quantity.is_some() {
            proposal.product_quantity = self.product_quantity;
        }
        if self.proposal_type.is_some() {
            proposal.proposal_type = self.proposal_type;
        }
        if self.product_detail.is_some() {
            proposal.product_detail = self.product_detail;
        }
        if let Some(price) = self.total_price {
            proposal.total_price = price;
        }
        if self.notes.is_some() {
            proposal.notes = self.notes;
        }
        if self.supporting_file.is_some() {
            proposal.supporting_file = self.supporting_file;
        }
    }
}

/// Column a proposal list can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalSortKey {
    EntryDate,
    Name,
    Pic,
    TotalPrice,
    CaseId,
    Status,
    Origin,
}

impl ProposalSortKey {
    /// SQL expression for ORDER BY. Text columns compare case-insensitively.
    pub fn sql(&self) -> &'static str {
        match self {
            Self::EntryDate => "p.entry_date",
            Self::Name => "LOWER(p.name)",
            Self::Pic => "LOWER(COALESCE(pc.name, ''))",
            Self::TotalPrice => "p.total_price",
            Self::CaseId => "LOWER(p.case_id)",
            Self::Status => "p.status",
            Self::Origin => "LOWER(COALESCE(p.origin, ''))",
        }
    }
}

impl FromStr for ProposalSortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entry_date" | "tanggal" => Ok(Self::EntryDate),
            "name" | "nama" => Ok(Self::Name),
            "pic" => Ok(Self::Pic),
            "total_price" | "total_harga" => Ok(Self::TotalPrice),
            "case_id" => Ok(Self::CaseId),
            "status" => Ok(Self::Status),
            "origin" => Ok(Self::Origin),
            other => Err(format!("cannot sort proposals by '{other}'")),
        }
    }
}

/// Query string filters, ordering and paging for the proposal list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProposalQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ProposalQuery {
    pub fn status_filter(&self) -> Result<Option<ProposalStatus>, String> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("all") => Ok(None),
            Some(raw) => raw.parse().map(Some),
        }
    }

    pub fn sort_key(&self) -> Result<ProposalSortKey, String> {
        match self.sort_by.as_deref() {
            None | Some("") => Ok(ProposalSortKey::EntryDate),
            Some(raw) => raw.parse(),
        }
    }

    /// Newest first unless "asc" is requested
    pub fn descending(&self) -> bool {
        !matches!(self.sort_order.as_deref(), Some("asc"))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProposalPage {
    pub data: Vec<ProposalView>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

/// Dashboard summary cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalSummary {
    pub total_proposals: i64,
    pub in_progress: i64,
    pub ready_for_pickup: i64,
    pub done: i64,
    pub total_budget: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkIds {
    pub ids: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProposalBulkStatus {
    pub ids: Vec<i64>,
    pub status: ProposalStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkResult {
    pub affected: u64,
}

/// Case identifier in the form `CSR-<year>-<NNN>`
pub fn generate_case_id(year: i32) -> String {
    let number: u32 = rand::rng().random_range(0..1000);
    format!("CSR-{year}-{number:03}")
}
