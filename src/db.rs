use dotenv::dotenv;
use sqlx::{MySql, Pool};
use std::env;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

pub async fn establish_connection() -> Result<Pool<MySql>, sqlx::Error> {
    dotenv().ok();

    let database_url = env::var("DATABASE_URL")
        .map_err(|_| sqlx::Error::Configuration("DATABASE_URL tidak ditemukan di .env".into()))?;

    let max_connections = max_connections_from(env::var("DB_MAX_CONNECTIONS").ok().as_deref());
    log::info!("Membuka pool database ({} koneksi)", max_connections);

    let pool = sqlx::mysql::MySqlPoolOptions::new()
        .max_connections(max_connections)
        .connect(&database_url)
        .await
        .map_err(|e| {
            log::error!("Gagal membuat pool database: {:?}", e);
            e
        })?;

    Ok(pool)
}

fn max_connections_from(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_MAX_CONNECTIONS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_connections_defaults_to_ten() {
        assert_eq!(max_connections_from(None), 10);
        assert_eq!(max_connections_from(Some("abc")), 10);
        assert_eq!(max_connections_from(Some("0")), 10);
        assert_eq!(max_connections_from(Some(" 25 ")), 25);
    }
}
