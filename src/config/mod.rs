use crate::core::urgency::UrgencyThresholds;
use crate::errors::{AppError, AppResult};
use crate::models::client_type::ClientType;
use crate::models::intervention_type::InterventionType;
use crate::utils::path::resolve_in;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

pub mod migrate;

pub const APP_DIR: &str = "rchantier";
pub const CONFIG_FILE_NAME: &str = "rchantier.conf";
pub const DATABASE_FILE_NAME: &str = "rchantier.sqlite";
pub const ATTACHMENTS_DIR_NAME: &str = "attachments";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_attachments_dir")]
    pub attachments_dir: String,
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default = "default_separator_char")]
    pub separator_char: String,
}

/// Urgency thresholds per client type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub residential: ServiceThresholds,
    pub professional: ServiceThresholds,
}

/// Green/orange limits (in days) for each service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServiceThresholds {
    pub mow: UrgencyThresholds,
    pub trim: UrgencyThresholds,
    pub weed: UrgencyThresholds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub user_agent: String,
}

fn default_attachments_dir() -> String {
    Config::config_dir()
        .join(ATTACHMENTS_DIR_NAME)
        .to_string_lossy()
        .to_string()
}

fn default_separator_char() -> String {
    "-".to_string()
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            residential: ServiceThresholds {
                mow: UrgencyThresholds::new(15, 21),
                trim: UrgencyThresholds::new(120, 180),
                weed: UrgencyThresholds::new(30, 45),
            },
            professional: ServiceThresholds {
                mow: UrgencyThresholds::new(10, 15),
                trim: UrgencyThresholds::new(90, 150),
                weed: UrgencyThresholds::new(21, 30),
            },
        }
    }
}

impl Thresholds {
    pub fn for_client(&self, client_type: ClientType) -> &ServiceThresholds {
        match client_type {
            ClientType::Residential => &self.residential,
            ClientType::Professional => &self.professional,
        }
    }

    /// Every pair must satisfy `green_max < orange_max`.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();

        for (client, set) in [("residential", &self.residential), ("professional", &self.professional)] {
            for kind in InterventionType::ALL {
                let t = set.get(kind);
                if t.green_max < 0 || t.green_max >= t.orange_max {
                    problems.push(format!(
                        "thresholds.{}.{}: green_max ({}) must be >= 0 and lower than orange_max ({})",
                        client,
                        kind.to_db_str(),
                        t.green_max,
                        t.orange_max
                    ));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

impl ServiceThresholds {
    pub fn get(&self, kind: InterventionType) -> UrgencyThresholds {
        match kind {
            InterventionType::Mow => self.mow,
            InterventionType::Trim => self.trim,
            InterventionType::Weed => self.weed,
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://nominatim.openstreetmap.org/search".to_string(),
            user_agent: format!("rchantier/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            attachments_dir: default_attachments_dir(),
            dark_mode: false,
            thresholds: Thresholds::default(),
            geocoding: GeocodingConfig::default(),
            separator_char: default_separator_char(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join(APP_DIR)
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(format!(".{APP_DIR}"))
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join(CONFIG_FILE_NAME)
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join(DATABASE_FILE_NAME)
    }

    /// Read the config file without validating it, or return defaults if not found.
    pub fn load_unchecked() -> AppResult<Self> {
        let path = Self::config_file();

        if path.exists() {
            let content =
                fs::read_to_string(&path).map_err(|e| AppError::ConfigLoad(e.to_string()))?;
            Self::from_yaml(&content)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        let cfg = Self::load_unchecked()?;

        if let Err(problems) = cfg.thresholds.validate() {
            return Err(AppError::Config(problems.join("; ")));
        }

        Ok(cfg)
    }

    pub fn from_yaml(content: &str) -> AppResult<Self> {
        serde_yaml::from_str(content).map_err(|e| AppError::ConfigLoad(e.to_string()))
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        serde_yaml::to_string(self).map_err(|e| AppError::ConfigSave(e.to_string()))
    }

    /// Write the configuration to the standard config file.
    pub fn save(&self) -> AppResult<()> {
        fs::create_dir_all(Self::config_dir())?;
        fs::write(Self::config_file(), self.to_yaml()?)?;
        Ok(())
    }

    /// Initialize configuration, attachments folder and database file.
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> AppResult<Config> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        // DB name: user provided or default
        let db_path = match custom_db {
            Some(name) => resolve_in(&dir, &name),
            None => dir.join(DATABASE_FILE_NAME),
        };

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Config::default()
        };

        if !is_test {
            config.save()?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        fs::create_dir_all(&config.attachments_dir)?;

        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        println!("✅ Database:    {:?}", db_path);

        Ok(config)
    }
}
