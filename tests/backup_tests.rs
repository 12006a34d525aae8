use rchantier::core::backup::{BackupLogic, BackupSources};
use rchantier::db::job_sites;
use rchantier::db::pool::DbPool;
use rchantier::errors::AppError;
use rchantier::models::client_type::ClientType;
use rchantier::models::job_site::JobSite;
use std::fs;
use std::path::Path;

fn sources(root: &Path) -> BackupSources {
    BackupSources {
        database: root.join("data").join("chantiers.sqlite"),
        attachments_dir: root.join("attachments"),
        config_file: root.join("rchantier.conf"),
    }
}

fn seed(src: &BackupSources) {
    fs::create_dir_all(src.database.parent().unwrap()).unwrap();
    let pool = DbPool::open_initialized(&src.database.to_string_lossy()).unwrap();
    job_sites::insert(
        &pool.conn,
        &JobSite::new("Martin", ClientType::Residential, "5 rue Haute"),
    )
    .unwrap();

    fs::create_dir_all(src.attachments_dir.join("reports")).unwrap();
    fs::write(src.attachments_dir.join("reports").join("juin.pdf"), b"%PDF-1.7").unwrap();
    fs::write(src.attachments_dir.join("plan.txt"), "massif nord").unwrap();
    fs::write(&src.config_file, "dark_mode: true\n").unwrap();
}

fn site_names(src: &BackupSources) -> Vec<String> {
    let pool = DbPool::new(&src.database.to_string_lossy()).unwrap();
    job_sites::list_all(&pool.conn)
        .unwrap()
        .into_iter()
        .map(|s| s.client_name)
        .collect()
}

#[test]
fn restore_brings_back_database_attachments_and_config() {
    let dir = tempfile::tempdir().unwrap();
    let src = sources(dir.path());
    seed(&src);

    let archive = dir.path().join("out").join("backup.zip");
    let report = BackupLogic::create(&src, &archive, false).unwrap();
    assert_eq!(report.database_files, 1);
    assert_eq!(report.attachments, 2);
    assert!(report.config);

    // Diverge after the backup.
    {
        let pool = DbPool::new(&src.database.to_string_lossy()).unwrap();
        job_sites::insert(
            &pool.conn,
            &JobSite::new("Dupont", ClientType::Professional, "9 avenue Foch"),
        )
        .unwrap();
    }
    fs::write(src.attachments_dir.join("stray.tmp"), "x").unwrap();
    fs::remove_file(src.attachments_dir.join("plan.txt")).unwrap();
    fs::write(&src.config_file, "dark_mode: false\n").unwrap();

    let restored = BackupLogic::restore(&src, &archive).unwrap();
    assert_eq!(restored, report);

    assert_eq!(site_names(&src), vec!["Martin"]);
    assert!(src.attachments_dir.join("reports").join("juin.pdf").exists());
    assert_eq!(
        fs::read_to_string(src.attachments_dir.join("plan.txt")).unwrap(),
        "massif nord"
    );
    assert!(!src.attachments_dir.join("stray.tmp").exists());
    assert_eq!(fs::read_to_string(&src.config_file).unwrap(), "dark_mode: true\n");
}

#[test]
fn existing_archive_needs_force() {
    let dir = tempfile::tempdir().unwrap();
    let src = sources(dir.path());
    seed(&src);

    let archive = dir.path().join("backup.zip");
    BackupLogic::create(&src, &archive, false).unwrap();

    let refused = BackupLogic::create(&src, &archive, false);
    assert!(matches!(refused, Err(AppError::Backup(_))));

    assert!(BackupLogic::create(&src, &archive, true).is_ok());
}

#[test]
fn backup_without_database_fails() {
    let dir = tempfile::tempdir().unwrap();
    let src = sources(dir.path());

    let result = BackupLogic::create(&src, &dir.path().join("b.zip"), false);
    assert!(matches!(result, Err(AppError::Backup(_))));
    assert!(!dir.path().join("b.zip").exists());
}

#[test]
fn restore_rejects_archives_without_a_database() {
    let dir = tempfile::tempdir().unwrap();
    let src = sources(dir.path());
    seed(&src);

    let bogus = dir.path().join("bogus.zip");
    {
        let mut zip = zip::ZipWriter::new(fs::File::create(&bogus).unwrap());
        zip.start_file("attachments/a.txt", zip::write::SimpleFileOptions::default())
            .unwrap();
        std::io::Write::write_all(&mut zip, b"a").unwrap();
        zip.finish().unwrap();
    }

    let result = BackupLogic::restore(&src, &bogus);
    assert!(matches!(result, Err(AppError::Backup(_))));
    // Nothing was touched.
    assert!(src.attachments_dir.join("plan.txt").exists());
    assert_eq!(site_names(&src), vec!["Martin"]);
}
