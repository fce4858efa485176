use crate::generator::Distribution;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DURATION_SECS: u32 = 1800;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub easy: usize,
    pub moderate: usize,
    pub expert: usize,
    pub duration_secs: u32,
    pub bank_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            easy: 20,
            moderate: 10,
            expert: 10,
            duration_secs: DEFAULT_DURATION_SECS,
            bank_path: None,
        }
    }
}

impl Config {
    pub fn distribution(&self) -> Distribution {
        Distribution {
            easy: self.easy,
            moderate: self.moderate,
            expert: self.expert,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "examen") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("examen_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
