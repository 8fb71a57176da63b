use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

pub fn conn(database_path: &Path) -> Result<Connection> {
    lotto_draws::database::open_database(database_path)
        .with_context(|| format!("cannot open database {}", database_path.display()))
}
