use crate::error::QuestError;
use crate::model::QuestSnapshot;
use crate::storage::PersistenceAdapter;
use std::path::{Path, PathBuf};

const STORE_FILE_NAME: &str = "quests.json";
pub const STORE_ENV_VAR: &str = "QUESTLOG_STORE_PATH";

/// Quest snapshots stored as a pretty-printed JSON array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn env_store_path() -> Option<PathBuf> {
    match std::env::var(STORE_ENV_VAR) {
        Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
        _ => None,
    }
}

pub fn default_store_path() -> Result<PathBuf, QuestError> {
    if cfg!(windows) {
        let appdata = std::env::var("APPDATA")
            .map_err(|_| QuestError::invalid_config("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("questlog")
            .join(STORE_FILE_NAME))
    } else {
        let home =
            std::env::var("HOME").map_err(|_| QuestError::invalid_config("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("questlog")
            .join(STORE_FILE_NAME))
    }
}

impl PersistenceAdapter for JsonFileStore {
    fn load(&self) -> Result<Option<Vec<QuestSnapshot>>, QuestError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|err| QuestError::io(format!("{}: {}", self.path.display(), err)))?;
        let snapshots = serde_json::from_str(&content).map_err(|err| {
            QuestError::corrupt_snapshot(format!("{}: {}", self.path.display(), err))
        })?;

        Ok(Some(snapshots))
    }

    fn save(&self, snapshots: &[QuestSnapshot]) -> Result<(), QuestError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|err| QuestError::io(err.to_string()))?;
        }

        let content = serde_json::to_string_pretty(snapshots)
            .map_err(|err| QuestError::io(err.to_string()))?;
        std::fs::write(&self.path, content)
            .map_err(|err| QuestError::io(format!("{}: {}", self.path.display(), err)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, permissions)
                .map_err(|err| QuestError::io(err.to_string()))?;
        }

        Ok(())
    }
}
