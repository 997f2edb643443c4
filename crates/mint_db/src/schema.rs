use rust_embed::RustEmbed;
use sqlx::{Executor, PgPool};
use tracing::info;

use mint_core::{Error, Result};

use crate::error::db_error;

#[derive(RustEmbed)]
#[folder = "schema/"]
struct SchemaAssets;

const BUILD_ORDER: &str = "00_build_order.sql";

/// Reads the build order and applies all SQL files in a single transaction.
/// With `reset`, the public schema is dropped first.
pub async fn rebuild_database(pool: &PgPool, reset: bool) -> Result<()> {
    let script = build_script()?;

    let mut tx = pool.begin().await.map_err(db_error)?;
    if reset {
        info!("Dropping public schema");
        (&mut *tx)
            .execute("DROP SCHEMA public CASCADE; CREATE SCHEMA public;")
            .await
            .map_err(db_error)?;
    }
    (&mut *tx).execute(script.as_str()).await.map_err(db_error)?;
    tx.commit().await.map_err(db_error)?;

    Ok(())
}

/// Concatenates every `-- @include` target in build order.
pub fn build_script() -> Result<String> {
    // 1. Read the Manifest
    let manifest = file_content(BUILD_ORDER)?;

    // 2. Parse and Aggregate SQL
    let mut full_script = String::new();
    for line in manifest.lines() {
        let trimmed = line.trim();

        if let Some(path) = parse_include_directive(trimmed) {
            info!(path, "Including schema file");
            full_script.push_str(&file_content(path)?);
            full_script.push('\n');
        } else if !trimmed.starts_with("--") {
            full_script.push_str(line);
            full_script.push('\n');
        }
    }
    Ok(full_script)
}

fn file_content(path: &str) -> Result<String> {
    let file = SchemaAssets::get(path)
        .ok_or_else(|| Error::Storage(format!("missing schema file: {}", path)))?;
    String::from_utf8(file.data.into_owned())
        .map_err(|_| Error::Storage(format!("schema file is not UTF-8: {}", path)))
}

fn parse_include_directive(line: &str) -> Option<&str> {
    if line.starts_with("--") && line.contains("@include") {
        line.split_whitespace().last()
    } else {
        None
    }
}
