#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::NaiveDate;
use rchantier::db::pool::DbPool;
use rchantier::models::client_type::ClientType;
use rchantier::models::intervention::Intervention;
use rchantier::models::intervention_type::InterventionType;
use rchantier::models::job_site::JobSite;
use std::path::PathBuf;
use tempfile::TempDir;

pub fn rch() -> Command {
    cargo_bin_cmd!("rchantier")
}

/// One isolated HOME with its own database; removed on drop.
pub struct TestEnv {
    pub home: TempDir,
    pub db: String,
}

impl TestEnv {
    pub fn new() -> Self {
        let home = tempfile::tempdir().expect("temp home");
        let db = home
            .path()
            .join("rchantier_test.sqlite")
            .to_string_lossy()
            .to_string();
        Self { home, db }
    }

    /// Create the schema the way a user would (`--test` keeps the config file out).
    pub fn initialized() -> Self {
        let env = Self::new();
        env.cmd().args(["--test", "init"]).assert().success();
        env
    }

    /// The binary with HOME (and APPDATA) pointed at the temp dir and `--db` set.
    pub fn cmd(&self) -> Command {
        let mut cmd = rch();
        cmd.env("HOME", self.home.path())
            .env("APPDATA", self.home.path())
            .env_remove("RCHANTIER_LOG")
            .args(["--db", &self.db]);
        cmd
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.home.path().join(name)
    }

    /// Where the binary looks for `rchantier.conf` under this HOME.
    pub fn config_file(&self) -> PathBuf {
        let dir = if cfg!(target_os = "windows") { "rchantier" } else { ".rchantier" };
        self.home.path().join(dir).join("rchantier.conf")
    }

    pub fn write_config(&self, yaml: &str) {
        let path = self.config_file();
        std::fs::create_dir_all(path.parent().expect("config dir")).expect("create config dir");
        std::fs::write(path, yaml).expect("write config");
    }

    pub fn path_str(&self, name: &str) -> String {
        self.path(name).to_string_lossy().to_string()
    }

    /// Add a residential site without network lookup.
    pub fn add_site(&self, client: &str, address: &str) {
        self.cmd()
            .args(["site", "add", client, "--address", address, "--no-geocode"])
            .assert()
            .success();
    }
}

/// A fresh, migrated database in its own temp dir.
pub fn temp_pool() -> (TempDir, DbPool) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("lib_test.sqlite");
    let pool = DbPool::open_initialized(&path.to_string_lossy()).expect("open db");
    (dir, pool)
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

/// Site value for pure view tests; nothing is persisted.
pub fn site(id: i64, name: &str, client_type: ClientType) -> JobSite {
    let mut s = JobSite::new(name, client_type, &format!("{id} rue des Tilleuls"));
    s.id = id;
    s
}

pub fn visit(id: i64, site_id: i64, kind: InterventionType, on: &str) -> Intervention {
    let mut iv = Intervention::completed(site_id, kind, date(on));
    iv.id = id;
    iv
}
