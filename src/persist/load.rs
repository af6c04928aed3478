use anyhow::Result;
use std::fs;
use std::io::ErrorKind;

use super::{Options, OPTIONS_FILE};

pub fn load_options() -> Result<Option<Options>> {
    match fs::read_to_string(OPTIONS_FILE) {
        Ok(content) => {
            let options = ron::from_str(&content)?;
            Ok(Some(options))
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}
