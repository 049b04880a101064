//! Database migration command.
//!
//! ```bash
//! rb-cli migrate
//! ```
//!
//! Migrations live in `crates/admin/migrations/` and are embedded at
//! compile time.
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string

use super::{CommandError, connect};

/// Run the admin database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running admin migrations...");
    sqlx::migrate!("../admin/migrations").run(&pool).await?;

    tracing::info!("Admin migrations complete!");
    Ok(())
}
