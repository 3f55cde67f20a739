use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub fn store_file_path() -> Result<PathBuf> {
    if let Ok(custom) = env::var("REELTRACK_DATA_DIR")
        && !custom.trim().is_empty()
    {
        return Ok(PathBuf::from(custom).join("reeltrack.db"));
    }

    let base = dirs::data_dir().context("unable to resolve data directory")?;
    Ok(base.join("reeltrack").join("reeltrack.db"))
}
