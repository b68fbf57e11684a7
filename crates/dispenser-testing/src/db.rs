//! In-memory SQLite database with a service's migrations applied.

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

/// Connect to a fresh in-memory SQLite database and run `M`'s migrations.
///
/// The pool is pinned to one connection: each SQLite connection to
/// `:memory:` is a separate database.
///
/// Panics if the connection or a migration fails.
pub async fn migrated_sqlite<M: MigratorTrait>() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(opt)
        .await
        .expect("failed to connect to in-memory sqlite");
    M::up(&db, None).await.expect("failed to apply migrations");
    db
}
