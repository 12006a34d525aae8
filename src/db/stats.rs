use crate::db::pool::DbPool;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

fn count(pool: &DbPool, sql: &str) -> rusqlite::Result<i64> {
    pool.conn.query_row(sql, [], |row| row.get(0))
}

pub fn print_db_info(pool: &DbPool, db_path: &str) -> rusqlite::Result<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) RECORD COUNTS
    //
    let rows = [
        ("Job sites", count(pool, "SELECT COUNT(*) FROM job_sites")?),
        ("Interventions", count(pool, "SELECT COUNT(*) FROM interventions")?),
        (
            "  in progress",
            count(
                pool,
                "SELECT COUNT(*) FROM interventions WHERE status = 'in_progress'",
            )?,
        ),
        (
            "Planned weedings (pending)",
            count(pool, "SELECT COUNT(*) FROM planned_weedings WHERE done = 0")?,
        ),
        ("Extras", count(pool, "SELECT COUNT(*) FROM extras")?),
    ];

    for (label, n) in rows {
        println!("{}• {}:{} {}{}{}", CYAN, label, RESET, GREEN, n, RESET);
    }

    //
    // 3) INTERVENTION DATE RANGE
    //
    let first_date: Option<String> = pool
        .conn
        .query_row(
            "SELECT date FROM interventions ORDER BY date ASC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    let last_date: Option<String> = pool
        .conn
        .query_row(
            "SELECT date FROM interventions ORDER BY date DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    let grey_dash = || format!("{GREY}--{RESET}");

    println!("{}• Interventions range:{}", CYAN, RESET);
    println!("    from: {}", first_date.unwrap_or_else(grey_dash));
    println!("    to:   {}", last_date.unwrap_or_else(grey_dash));

    //
    // 4) AMOUNT STILL TO INVOICE
    //
    let to_invoice: f64 = pool.conn.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM extras WHERE status = 'to_invoice'",
        [],
        |row| row.get(0),
    )?;
    println!("{}• Extras to invoice:{} {:.2}", CYAN, RESET, to_invoice);

    println!();
    Ok(())
}
