use anyhow::Result;
use ron::ser::PrettyConfig;
use std::fs;

use super::{Options, OPTIONS_FILE};

pub fn save_options(options: &Options) -> Result<()> {
    let pretty = PrettyConfig::new();
    let serialized = ron::ser::to_string_pretty(options, pretty)?;
    fs::write(OPTIONS_FILE, serialized)?;
    Ok(())
}
