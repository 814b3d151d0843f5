use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "gojuon";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    pub fn config_path() -> PathBuf {
        Self::project()
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("gojuon_config.json"))
    }

    pub fn history_db_path() -> Option<PathBuf> {
        Self::project().map(|pd| pd.data_local_dir().join("history.db"))
    }

    pub fn log_path() -> Option<PathBuf> {
        Self::project().map(|pd| pd.data_local_dir().join("gojuon.log"))
    }
}
