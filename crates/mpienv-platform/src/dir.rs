use crate::error::{Error, Result};
use std::path::PathBuf;

pub fn user_home() -> Result<PathBuf> {
    home::home_dir().ok_or(Error::NoHome)
}
