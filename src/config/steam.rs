use std::path::{Path, PathBuf};

pub const GRID_FILE_NAME: &str = "hero_grid_config.json";

const DOTA_APP_ID: &str = "570";

/// Candidate locations of Steam's `userdata` directory on this platform.
fn userdata_candidates() -> Vec<PathBuf> {
    if cfg!(target_os = "windows") {
        vec![PathBuf::from(r"C:\Program Files (x86)\Steam\userdata")]
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("Steam").join("userdata"))
            .into_iter()
            .collect()
    } else {
        let home = dirs::home_dir();
        [
            home.as_ref().map(|h| h.join(".steam").join("steam").join("userdata")),
            dirs::data_dir().map(|d| d.join("Steam").join("userdata")),
            home.as_ref().map(|h| h.join("Steam").join("userdata")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

pub fn userdata_dir() -> Option<PathBuf> {
    userdata_candidates().into_iter().find(|p| p.is_dir())
}

/// Where the client keeps the hero grid file for one Steam account.
pub fn grid_path_for_account(account_dir: &Path) -> PathBuf {
    account_dir
        .join(DOTA_APP_ID)
        .join("remote")
        .join("cfg")
        .join(GRID_FILE_NAME)
}

pub fn account_dirs(userdata: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(userdata) else {
        return Vec::new();
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    dirs
}

/// The grid file path, if `userdata` holds exactly one account.
pub fn detect_grid_path(userdata: &Path) -> Option<PathBuf> {
    match account_dirs(userdata).as_slice() {
        [only] => Some(grid_path_for_account(only)),
        [] => {
            tracing::debug!("No Steam accounts found in {}", userdata.display());
            None
        }
        many => {
            tracing::info!(
                "Found {} Steam accounts in {}; set 'path' in the config to pick one",
                many.len(),
                userdata.display()
            );
            None
        }
    }
}

pub fn default_grid_path() -> Option<PathBuf> {
    detect_grid_path(&userdata_dir()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_single_account() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("123456")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not an account").unwrap();

        let path = detect_grid_path(dir.path()).unwrap();
        assert!(path.starts_with(dir.path().join("123456")));
        assert!(path.ends_with("570/remote/cfg/hero_grid_config.json"));
    }

    #[test]
    fn test_ambiguous_or_empty_userdata() {
        let dir = TempDir::new().unwrap();
        assert_eq!(detect_grid_path(dir.path()), None);

        std::fs::create_dir(dir.path().join("1")).unwrap();
        std::fs::create_dir(dir.path().join("2")).unwrap();
        assert_eq!(detect_grid_path(dir.path()), None);
        assert_eq!(account_dirs(dir.path()).len(), 2);
    }

    #[test]
    fn test_missing_userdata() {
        assert!(account_dirs(Path::new("/definitely/not/here")).is_empty());
    }
}
