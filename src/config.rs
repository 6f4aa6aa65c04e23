// ⚙️ Runtime configuration
// Where the datasets and the user database live. The locale is fixed
// (es-AR) and deliberately not part of this.

use crate::datasets::DatasetKind;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

pub const DATA_DIR_ENV: &str = "TRIBUNAL_DATA_DIR";
pub const USERS_DB_ENV: &str = "TRIBUNAL_USERS_DB";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the dataset CSV files
    pub data_dir: PathBuf,

    /// SQLite file backing the user store
    pub users_db: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_dir: PathBuf::from("data"),
            users_db: PathBuf::from("data").join("usuarios.db"),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `TRIBUNAL_DATA_DIR` / `TRIBUNAL_USERS_DB`.
    /// When only the data dir is set, the user db follows it.
    pub fn from_env() -> Self {
        Self::from_vars(env::var(DATA_DIR_ENV).ok(), env::var(USERS_DB_ENV).ok())
    }

    fn from_vars(data_dir: Option<String>, users_db: Option<String>) -> Self {
        let data_dir = data_dir
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| AppConfig::default().data_dir);

        let users_db = users_db
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("usuarios.db"));

        AppConfig { data_dir, users_db }
    }

    pub fn dataset_path(&self, kind: DatasetKind) -> PathBuf {
        self.data_dir.join(kind.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = AppConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.users_db, PathBuf::from("data/usuarios.db"));
        assert_eq!(
            config.dataset_path(DatasetKind::Jus),
            PathBuf::from("data/Dataset_JUS.csv")
        );
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_vars(Some("/srv/tribunal".to_string()), None);
        assert_eq!(config.users_db, PathBuf::from("/srv/tribunal/usuarios.db"));
        assert_eq!(
            config.dataset_path(DatasetKind::TasaActiva),
            PathBuf::from("/srv/tribunal/dataset_tasa.csv")
        );

        let config = AppConfig::from_vars(None, Some("/tmp/users.db".to_string()));
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.users_db, PathBuf::from("/tmp/users.db"));
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = AppConfig::from_vars(Some("  ".to_string()), Some(String::new()));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_serde_round_trip() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
