/// Provides constants and utilities for working with
/// the "master_stakeholders" database table.
pub struct StakeholderTable;

impl StakeholderTable {
    /// The name of the database table
    pub const TABLE_NAME: &'static str = "master_stakeholders";

    /// SQL statement for creating the stakeholders table with the defined schema.
    pub fn create_table() -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                institution_name TEXT NOT NULL,
                receiving_agency TEXT,
                branch TEXT,
                default_quantity INTEGER NOT NULL DEFAULT 0,
                contact_person TEXT,
                phone TEXT,
                address TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            Self::TABLE_NAME
        )
    }
}

/// Provides constants and utilities for working with
/// the "routine_schedules" database table.
pub struct ScheduleTable;

impl ScheduleTable {
    /// The name of the database table
    pub const TABLE_NAME: &'static str = "routine_schedules";

    /// SQL statement for creating the schedules table. Schedules are removed
    /// together with their stakeholder.
    pub fn create_table() -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                stakeholder_id INTEGER NOT NULL,
                pickup_date TEXT NOT NULL,
                quantity INTEGER NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'scheduled'
                    CHECK (status IN ('scheduled', 'completed', 'pending', 'cancelled')),
                pic TEXT,
                notes TEXT,
                proof_file TEXT,
                created_by INTEGER,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (stakeholder_id) REFERENCES {}(id) ON DELETE CASCADE
            )",
            Self::TABLE_NAME,
            StakeholderTable::TABLE_NAME
        )
    }

    pub fn create_indexes() -> String {
        format!(
            "CREATE INDEX IF NOT EXISTS idx_routine_schedules_stakeholder_date
                ON {} (stakeholder_id, pickup_date)",
            Self::TABLE_NAME
        )
    }
}

/// Provides constants and utilities for working with
/// the "pics" (person in charge) database table.
pub struct PicTable;

impl PicTable {
    /// The name of the database table
    pub const TABLE_NAME: &'static str = "pics";

    pub fn create_table() -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT,
                phone TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            Self::TABLE_NAME
        )
    }
}

/// Provides constants and utilities for working with
/// the "proposals" database table.
pub struct ProposalTable;

impl ProposalTable {
    /// The name of the database table
    pub const TABLE_NAME: &'static str = "proposals";

    /// SQL statement for creating the proposals table. A removed PIC
    /// leaves its proposals unassigned.
    pub fn create_table() -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                case_id TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                origin TEXT,
                status TEXT NOT NULL DEFAULT 'In Progress'
                    CHECK (status IN ('In Progress', 'Siap Diambil', 'Done')),
                pic_id INTEGER,
                entry_date TEXT NOT NULL,
                donation_form TEXT,
                product_quantity INTEGER,
                proposal_type TEXT,
                product_detail TEXT,
                total_price REAL NOT NULL DEFAULT 0,
                notes TEXT,
                supporting_file TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (pic_id) REFERENCES {}(id) ON DELETE SET NULL
            )",
            Self::TABLE_NAME,
            PicTable::TABLE_NAME
        )
    }
}

/// Provides constants and utilities for working with
/// the "admins" database table.
pub struct AdminTable;

impl AdminTable {
    /// The name of the database table
    pub const TABLE_NAME: &'static str = "admins";

    pub fn create_table() -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            Self::TABLE_NAME
        )
    }
}
