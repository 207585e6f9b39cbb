use std::path::{Path, PathBuf};

use authgate_common::{Error, Result};
use tracing::{debug, info};

use crate::model::AppConfig;
use crate::paths::ProjectPaths;

pub struct ConfigLoader {
    project_dir: PathBuf,
}

impl ConfigLoader {
    pub fn with_dir(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn paths(&self) -> ProjectPaths {
        ProjectPaths::new(&self.project_dir)
    }

    /// Returns true if a config file (YAML or TOML) exists on disk.
    pub fn config_file_exists(&self) -> bool {
        self.project_dir.join("authgate.yml").exists()
            || self.project_dir.join("authgate.toml").exists()
    }

    pub fn load(&self) -> Result<AppConfig> {
        let yaml_path = self.project_dir.join("authgate.yml");
        let toml_path = self.project_dir.join("authgate.toml");

        if yaml_path.exists() {
            info!("loading config from {}", yaml_path.display());
            let contents = std::fs::read_to_string(&yaml_path)?;
            serde_yaml::from_str(&contents)
                .map_err(|e| Error::Config(format!("failed to parse YAML config: {e}")))
        } else if toml_path.exists() {
            info!("loading config from {}", toml_path.display());
            let contents = std::fs::read_to_string(&toml_path)?;
            toml::from_str(&contents)
                .map_err(|e| Error::Config(format!("failed to parse TOML config: {e}")))
        } else {
            info!("no config file found, using defaults");
            Ok(AppConfig::default())
        }
    }

    /// Load the project's `.env` into the process environment.
    ///
    /// Variables already set in the environment keep their value. Returns
    /// `false` when there is no `.env` file.
    pub fn load_env_file(&self) -> Result<bool> {
        let env_path = self.paths().env_file();
        if !env_path.exists() {
            debug!("no .env file at {}", env_path.display());
            return Ok(false);
        }

        dotenvy::from_path(&env_path).map_err(|e| {
            Error::Config(format!("failed to load {}: {e}", env_path.display()))
        })?;
        info!("loaded environment from {}", env_path.display());
        Ok(true)
    }
}
