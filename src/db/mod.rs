use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

pub async fn get_db_pool(database_url: &str) -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .expect("Failed to create pool")
}
