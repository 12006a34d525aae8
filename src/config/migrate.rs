//! Configuration file upgrades: detect keys missing from an older
//! `rchantier.conf` and fill them in with their default values, leaving
//! every value the user already set untouched.

use super::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::info;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

/// Dotted paths (e.g. `thresholds.residential.mow.green_max`) present in the
/// default configuration but absent from `content`.
pub fn missing_keys(content: &str) -> AppResult<Vec<String>> {
    let current = parse_mapping(content)?;
    let defaults = default_mapping()?;

    let mut out = Vec::new();
    collect_missing(&defaults, &current, "", &mut out);
    Ok(out)
}

/// Merge defaults into the config file at `path`, returning the keys added.
/// The file is only rewritten when something was missing.
pub fn migrate_file(path: &Path) -> AppResult<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| AppError::ConfigLoad(e.to_string()))?;

    let mut current = parse_mapping(&content)?;
    let defaults = default_mapping()?;

    let mut added = Vec::new();
    merge_missing(&defaults, &mut current, "", &mut added);

    if !added.is_empty() {
        let serialized = serde_yaml::to_string(&Value::Mapping(current))
            .map_err(|e| AppError::ConfigSave(e.to_string()))?;
        fs::write(path, serialized).map_err(|e| AppError::ConfigSave(e.to_string()))?;

        info(format!(
            "Config migration performed: added {}",
            added.join(", ")
        ));
    }

    Ok(added)
}

fn parse_mapping(content: &str) -> AppResult<Mapping> {
    if content.trim().is_empty() {
        return Ok(Mapping::new());
    }

    match serde_yaml::from_str::<Value>(content) {
        Ok(Value::Mapping(m)) => Ok(m),
        Ok(Value::Null) => Ok(Mapping::new()),
        Ok(_) => Err(AppError::Config(
            "configuration root must be a mapping".into(),
        )),
        Err(e) => Err(AppError::ConfigLoad(e.to_string())),
    }
}

fn default_mapping() -> AppResult<Mapping> {
    let value = serde_yaml::to_value(Config::default())
        .map_err(|e| AppError::Config(e.to_string()))?;

    match value {
        Value::Mapping(m) => Ok(m),
        _ => Err(AppError::Other("default config is not a mapping".into())),
    }
}

fn join_key(prefix: &str, key: &Value) -> String {
    let k = key.as_str().unwrap_or("?");
    if prefix.is_empty() {
        k.to_string()
    } else {
        format!("{prefix}.{k}")
    }
}

fn collect_missing(defaults: &Mapping, current: &Mapping, prefix: &str, out: &mut Vec<String>) {
    for (key, default_val) in defaults {
        let path = join_key(prefix, key);

        match (current.get(key), default_val) {
            (None, _) => out.push(path),
            (Some(Value::Mapping(cur)), Value::Mapping(def)) => {
                collect_missing(def, cur, &path, out)
            }
            _ => {}
        }
    }
}

fn merge_missing(defaults: &Mapping, current: &mut Mapping, prefix: &str, added: &mut Vec<String>) {
    for (key, default_val) in defaults {
        let path = join_key(prefix, key);

        match current.get_mut(key) {
            None => {
                current.insert(key.clone(), default_val.clone());
                added.push(path);
            }
            Some(Value::Mapping(cur)) => {
                if let Value::Mapping(def) = default_val {
                    merge_missing(def, cur, &path, added);
                }
            }
            Some(_) => {}
        }
    }
}
