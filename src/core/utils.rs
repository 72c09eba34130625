use dirs::home_dir;
use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::errors::Result;

const DEFAULT_DIR_NAME: &str = ".rent_ledger";
const HOME_ENV: &str = "RENT_LEDGER_HOME";
const DATA_DIR: &str = "data";
const BACKUP_DIR: &str = "backups";
const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";

/// Resolves the on-disk layout below the application base directory.
pub struct PathResolver;

impl PathResolver {
    /// `RENT_LEDGER_HOME` when set, otherwise `~/.rent_ledger`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return PathBuf::from(custom);
        }
        home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn resolve_base(custom: Option<PathBuf>) -> PathBuf {
        custom.unwrap_or_else(Self::base_dir)
    }

    pub fn data_dir_in(base: &Path) -> PathBuf {
        base.join(DATA_DIR)
    }

    pub fn backup_dir_in(data_dir: &Path) -> PathBuf {
        data_dir.join(BACKUP_DIR)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        base.join(CONFIG_FILE)
    }
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Writes `data` to a sibling temp file and renames it over `path`, so readers
/// see either the old contents or the new ones.
pub fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_hangs_off_the_base_dir() {
        let base = PathBuf::from("/srv/rent");
        assert_eq!(PathResolver::data_dir_in(&base), base.join("data"));
        assert_eq!(
            PathResolver::backup_dir_in(&PathResolver::data_dir_in(&base)),
            base.join("data").join("backups")
        );
        assert_eq!(PathResolver::config_file_in(&base), base.join("config.json"));
        assert_eq!(
            PathResolver::resolve_base(Some(base.clone())),
            base
        );
    }

    #[test]
    fn tmp_path_keeps_the_original_extension() {
        assert_eq!(
            tmp_path(Path::new("/d/x_renters.json")),
            PathBuf::from("/d/x_renters.json.tmp")
        );
        assert_eq!(tmp_path(Path::new("/d/plain")), PathBuf::from("/d/plain.tmp"));
    }
}
