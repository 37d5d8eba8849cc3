use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

pub struct Config {
    pub db_path: PathBuf,
}

impl Config {
    /// Resolve the data directory and database path. Each profile keeps its
    /// own database file, so separate people (or experiments) stay separate.
    pub fn load(profile: Option<&str>) -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", "taper").context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = match profile {
            Some(name) => data_dir.join(format!("taper-{name}.db")),
            None => data_dir.join("taper.db"),
        };

        Ok(Config { db_path })
    }
}
