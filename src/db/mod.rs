use anyhow::Result;
use sqlx::{
    migrate::MigrateDatabase,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use std::str::FromStr;
use std::time::Duration;

use crate::config::AdminSeed;

pub mod admin_store;
pub mod pic_store;
pub mod proposal_store;
pub mod schedule_store;
pub mod stakeholder_store;
pub mod tables;

use tables::{AdminTable, PicTable, ProposalTable, ScheduleTable, StakeholderTable};

pub type DbPool = Pool<Sqlite>;

/// Initialize the database connection pool
pub async fn init_db_pool(database_url: &str, max_connections: u32) -> Result<DbPool> {
    // Create the database if it doesn't exist
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        Sqlite::create_database(database_url).await?;
    }

    // Cascades on schedules and proposals rely on foreign key enforcement
    let options = SqliteConnectOptions::from_str(database_url)?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(options)
        .await?;

    // Run migrations
    setup_database(&pool).await?;

    Ok(pool)
}

/// Set up the database schema
async fn setup_database(pool: &DbPool) -> Result<()> {
    let statements = [
        StakeholderTable::create_table(),
        ScheduleTable::create_table(),
        ScheduleTable::create_indexes(),
        PicTable::create_table(),
        ProposalTable::create_table(),
        AdminTable::create_table(),
    ];

    for statement in statements {
        sqlx::query(&statement).execute(pool).await?;
    }

    tracing::debug!("database schema ready");
    Ok(())
}

/// Create the initial admin account if no admin exists yet
pub async fn seed_admin(pool: &DbPool, seed: &AdminSeed) -> Result<()> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admins")
        .fetch_one(pool)
        .await?;

    if count.0 == 0 {
        let store = admin_store::AdminStore::new(pool.clone());
        let admin = store.create_admin(&seed.email, &seed.name, &seed.password).await?;
        tracing::info!(email = %admin.email, "seeded initial admin account");
    }

    Ok(())
}
