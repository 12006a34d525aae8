use crate::config::Config;
use crate::config::migrate::{migrate_file, missing_keys};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};
use std::fs;
use std::path::Path;
use std::process::Command;

/// Operations behind `config --print | --check | --migrate | --edit`.
pub struct ConfigLogic;

fn default_editor() -> String {
    std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(target_os = "windows") {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        })
}

impl ConfigLogic {
    pub fn print(cfg: &Config) -> AppResult<()> {
        println!("📄 Current configuration:\n");
        println!("{}", cfg.to_yaml()?);
        Ok(())
    }

    /// Report missing keys and threshold problems. Returns `true` when clean.
    pub fn check(path: &Path) -> AppResult<bool> {
        if !path.exists() {
            warning(format!(
                "No configuration file at {} (defaults in use).",
                path.display()
            ));
            return Ok(false);
        }

        let content = fs::read_to_string(path).map_err(|e| AppError::ConfigLoad(e.to_string()))?;
        let missing = missing_keys(&content)?;
        let mut clean = true;

        if missing.is_empty() {
            success("All configuration keys are present.");
        } else {
            clean = false;
            warning(format!("Missing keys: {}", missing.join(", ")));
            info("Run `rchantier config --migrate` to add them with default values.");
        }

        match Config::from_yaml(&content) {
            Ok(cfg) => {
                if let Err(problems) = cfg.thresholds.validate() {
                    clean = false;
                    for p in problems {
                        warning(p);
                    }
                }
            }
            Err(e) => {
                clean = false;
                warning(e);
            }
        }

        Ok(clean)
    }

    pub fn migrate(path: &Path) -> AppResult<()> {
        if !path.exists() {
            return Err(AppError::ConfigLoad(format!(
                "{} not found (run `rchantier init` first)",
                path.display()
            )));
        }

        if migrate_file(path)?.is_empty() {
            info("Configuration already up to date.");
        }
        Ok(())
    }

    /// Open the file in `editor`, falling back to $EDITOR / $VISUAL / nano.
    pub fn edit(path: &Path, editor: Option<&str>) -> AppResult<()> {
        let fallback = default_editor();
        let wanted = editor.map(str::to_string).unwrap_or_else(|| fallback.clone());

        match Command::new(&wanted).arg(path).status() {
            Ok(s) if s.success() => {
                success(format!("Configuration edited with '{}'", wanted));
                return Ok(());
            }
            _ if wanted == fallback => {
                return Err(AppError::Config(format!("editor '{}' failed", wanted)));
            }
            _ => warning(format!(
                "Editor '{}' not available, falling back to '{}'",
                wanted, fallback
            )),
        }

        let status = Command::new(&fallback)
            .arg(path)
            .status()
            .map_err(|e| AppError::Config(format!("editor '{}': {}", fallback, e)))?;

        if status.success() {
            success(format!("Configuration edited with fallback '{}'", fallback));
            Ok(())
        } else {
            Err(AppError::Config(format!("editor '{}' failed", fallback)))
        }
    }
}
