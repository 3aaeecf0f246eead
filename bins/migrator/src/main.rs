//! Schema migration runner for the Tourbook ledger.
//!
//! Usage:
//!   migrator up      - Apply pending migrations
//!   migrator down    - Roll back the last migration
//!   migrator status  - List applied and pending migrations
//!   migrator fresh   - Drop every ledger table and re-apply

use sea_orm_migration::prelude::*;
use tourbook_db::migration::Migrator;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // DATABASE_URL is read by the CLI itself, which also installs tracing
    cli::run_cli(Migrator).await;
}
