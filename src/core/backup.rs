//! Zip backup and restore of everything the application owns.
//!
//! Archive layout:
//!
//! ```text
//! database/<db file>        (+ <db file>-wal / -shm when present)
//! attachments/<...>         (PDF reports and any other file, recursively)
//! rchantier.conf
//! ```
//!
//! Restore is a destructive overwrite with no rollback: a failure midway
//! leaves whatever was already written.

use crate::config::{CONFIG_FILE_NAME, Config};
use crate::db::log::audit_quiet;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const DATABASE_PREFIX: &str = "database/";
const ATTACHMENTS_PREFIX: &str = "attachments/";
const SIDECAR_SUFFIXES: [&str; 2] = ["-wal", "-shm"];

/// Files a backup is made of, and where a restore puts them back.
#[derive(Debug, Clone)]
pub struct BackupSources {
    pub database: PathBuf,
    pub attachments_dir: PathBuf,
    pub config_file: PathBuf,
}

impl BackupSources {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            database: PathBuf::from(&cfg.database),
            attachments_dir: PathBuf::from(&cfg.attachments_dir),
            config_file: Config::config_file(),
        }
    }

    fn sidecar(&self, suffix: &str) -> PathBuf {
        let mut name = self.database.as_os_str().to_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }

    fn db_file_name(&self) -> AppResult<String> {
        self.database
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| AppError::Backup(format!("invalid database path {}", self.database.display())))
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BackupReport {
    pub database_files: usize,
    pub attachments: usize,
    pub config: bool,
}

pub struct BackupLogic;

impl BackupLogic {
    /// Write the archive to `dest`. An existing file is only replaced with `force`.
    pub fn create(sources: &BackupSources, dest: &Path, force: bool) -> AppResult<BackupReport> {
        if !sources.database.exists() {
            return Err(AppError::Backup(format!(
                "database not found: {}",
                sources.database.display()
            )));
        }
        if dest.exists() && !force {
            return Err(AppError::Backup(format!(
                "{} already exists (use --force to overwrite)",
                dest.display()
            )));
        }
        if let Some(parent) = dest.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        // Fold the WAL into the main file so the copy is self-contained.
        {
            let pool = DbPool::new(&sources.database.to_string_lossy())?;
            if let Err(e) = pool.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);") {
                warn!(error = %e, "wal checkpoint failed before backup");
            }
        }

        let result = write_archive(sources, dest);

        match &result {
            Ok(report) => {
                if let Ok(pool) = DbPool::new(&sources.database.to_string_lossy()) {
                    audit_quiet(
                        &pool.conn,
                        "backup",
                        &dest.to_string_lossy(),
                        &format!(
                            "Backup created ({} db files, {} attachments)",
                            report.database_files, report.attachments
                        ),
                    );
                }
            }
            Err(e) => warn!(error = %e, dest = %dest.display(), "backup failed"),
        }

        result
    }

    /// Overwrite the database, attachments and config with the archive content.
    pub fn restore(sources: &BackupSources, src: &Path) -> AppResult<BackupReport> {
        if !src.exists() {
            return Err(AppError::Backup(format!("backup not found: {}", src.display())));
        }

        let result = read_archive(sources, src);

        match &result {
            Ok(_) => {
                if let Ok(pool) = DbPool::new(&sources.database.to_string_lossy()) {
                    audit_quiet(&pool.conn, "restore", &src.to_string_lossy(), "Backup restored");
                }
            }
            Err(e) => warn!(error = %e, src = %src.display(), "restore failed"),
        }

        result
    }
}

fn write_archive(sources: &BackupSources, dest: &Path) -> AppResult<BackupReport> {
    let file = fs::File::create(dest)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut report = BackupReport::default();
    let db_name = sources.db_file_name()?;

    add_file(&mut zip, &sources.database, &format!("{DATABASE_PREFIX}{db_name}"), options)?;
    report.database_files += 1;

    for suffix in SIDECAR_SUFFIXES {
        let path = sources.sidecar(suffix);
        if path.exists() {
            add_file(&mut zip, &path, &format!("{DATABASE_PREFIX}{db_name}{suffix}"), options)?;
            report.database_files += 1;
        }
    }

    zip.add_directory(ATTACHMENTS_PREFIX, options)?;
    if sources.attachments_dir.is_dir() {
        for path in walk_files(&sources.attachments_dir)? {
            let rel = path
                .strip_prefix(&sources.attachments_dir)
                .map_err(|e| AppError::Backup(e.to_string()))?;
            let name = format!(
                "{ATTACHMENTS_PREFIX}{}",
                rel.to_string_lossy().replace('\\', "/")
            );
            add_file(&mut zip, &path, &name, options)?;
            report.attachments += 1;
        }
    }

    if sources.config_file.exists() {
        add_file(&mut zip, &sources.config_file, CONFIG_FILE_NAME, options)?;
        report.config = true;
    } else {
        debug!(path = %sources.config_file.display(), "no config file to back up");
    }

    zip.finish()?;
    Ok(report)
}

fn add_file(
    zip: &mut ZipWriter<fs::File>,
    path: &Path,
    name: &str,
    options: SimpleFileOptions,
) -> AppResult<()> {
    let mut f = fs::File::open(path)?;
    zip.start_file(name, options)?;
    io::copy(&mut f, zip)?;
    Ok(())
}

fn walk_files(dir: &Path) -> AppResult<Vec<PathBuf>> {
    let mut out = Vec::new();
    let mut stack = vec![dir.to_path_buf()];

    while let Some(d) = stack.pop() {
        for entry in fs::read_dir(&d)? {
            let path = entry?.path();
            if path.is_dir() {
                stack.push(path);
            } else {
                out.push(path);
            }
        }
    }

    out.sort();
    Ok(out)
}

/// Strip a known prefix and reject anything that could escape the target dir.
fn safe_relative(name: &Path, prefix: &str) -> Option<PathBuf> {
    let rel = name.strip_prefix(prefix.trim_end_matches('/')).ok()?;
    if rel.as_os_str().is_empty() {
        return None;
    }
    rel.components()
        .all(|c| matches!(c, Component::Normal(_)))
        .then(|| rel.to_path_buf())
}

fn read_archive(sources: &BackupSources, src: &Path) -> AppResult<BackupReport> {
    let mut archive = ZipArchive::new(fs::File::open(src)?)?;

    let has_db = archive
        .file_names()
        .any(|n| n.starts_with(DATABASE_PREFIX) && n.len() > DATABASE_PREFIX.len());
    if !has_db {
        return Err(AppError::Backup(format!(
            "{} does not contain a database entry",
            src.display()
        )));
    }

    let db_name = sources.db_file_name()?;
    let mut report = BackupReport::default();

    // Stale sidecars would be replayed over the restored database.
    for suffix in SIDECAR_SUFFIXES {
        let path = sources.sidecar(suffix);
        if path.exists() {
            fs::remove_file(&path)?;
        }
    }

    if sources.attachments_dir.exists() {
        fs::remove_dir_all(&sources.attachments_dir)?;
    }
    fs::create_dir_all(&sources.attachments_dir)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let Some(name) = entry.enclosed_name() else {
            warn!(entry = entry.name(), "skipping unsafe archive entry");
            continue;
        };

        let target = if let Some(rel) = safe_relative(&name, DATABASE_PREFIX) {
            // The archived file name may differ from the configured one.
            let file = rel.to_string_lossy().to_string();
            let suffix = SIDECAR_SUFFIXES
                .iter()
                .find(|s| file.ends_with(*s))
                .copied()
                .unwrap_or("");
            report.database_files += 1;
            if suffix.is_empty() {
                sources.database.clone()
            } else {
                sources.database.with_file_name(format!("{db_name}{suffix}"))
            }
        } else if let Some(rel) = safe_relative(&name, ATTACHMENTS_PREFIX) {
            report.attachments += 1;
            sources.attachments_dir.join(rel)
        } else if name == Path::new(CONFIG_FILE_NAME) {
            report.config = true;
            sources.config_file.clone()
        } else {
            debug!(entry = %name.display(), "ignoring unknown archive entry");
            continue;
        };

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = fs::File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_paths_escaping_the_prefix() {
        assert_eq!(
            safe_relative(Path::new("attachments/reports/a.pdf"), ATTACHMENTS_PREFIX),
            Some(PathBuf::from("reports/a.pdf"))
        );
        assert_eq!(safe_relative(Path::new("attachments"), ATTACHMENTS_PREFIX), None);
        assert_eq!(safe_relative(Path::new("database/x.sqlite"), ATTACHMENTS_PREFIX), None);
    }
}
