use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its subdirectories and:
/// - Creates an initial `config.json` file with default settings
/// - Creates an empty SQLite database
///
/// # Arguments
/// - `betbook_home` - The directory that will be the root of data directory, e.g. `$HOME/betbook`
///
/// # Errors
/// - Returns an error if any file operations fail or if the directory was already initialized.
pub async fn init(betbook_home: &Path) -> Result<Out<()>> {
    let config = Config::create(betbook_home)
        .await
        .context("Unable to create the data directory and configs")?;
    Ok(format!(
        "Successfully created the betbook directory at {}",
        config.root().display()
    )
    .into())
}
