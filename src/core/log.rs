use crate::db::pool::DbPool;
use crate::errors::AppResult;
use ansi_term::Colour;
use regex::Regex;
use std::sync::LazyLock;

const TARGET_WIDTH: usize = 60;

static ANSI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1B\[[0-9;]*[mK]").expect("static ANSI regex"));

fn strip_ansi(s: &str) -> String {
    ANSI_RE.replace_all(s, "").into_owned()
}

/// Colour by verb: `*_add` green, `*_del` red, `*_edit` yellow, and so on.
fn color_for_operation(op: &str) -> Colour {
    match op {
        "migration_applied" => Colour::Purple,
        "backup" | "restore" => Colour::Blue,
        "init" => Colour::RGB(255, 153, 51),
        "timer_start" | "timer_stop" => Colour::Cyan,
        o if o.ends_with("_add") || o.ends_with("_plan") => Colour::Green,
        o if o.ends_with("_del") => Colour::Red,
        o if o.ends_with("_edit") || o.ends_with("_finish") => Colour::Yellow,
        o if o.ends_with("_done") || o.ends_with("_invoice") => Colour::Green,
        _ => Colour::White,
    }
}

pub struct LogEntry {
    pub id: i64,
    pub date: String,
    pub operation: String,
    pub target: String,
    pub message: String,
}

pub struct LogLogic;

impl LogLogic {
    pub fn load(pool: &DbPool, limit: Option<usize>) -> AppResult<Vec<LogEntry>> {
        let mut stmt = pool.conn.prepare_cached(
            "SELECT id, date, operation, target, message FROM log ORDER BY id DESC LIMIT ?1",
        )?;

        let cap = limit.map(|n| n as i64).unwrap_or(-1);
        let rows = stmt.query_map([cap], |row| {
            Ok(LogEntry {
                id: row.get(0)?,
                date: row.get(1)?,
                operation: row.get(2)?,
                target: row.get(3)?,
                message: row.get(4)?,
            })
        })?;

        let mut entries = rows.collect::<Result<Vec<_>, _>>()?;
        entries.reverse();
        Ok(entries)
    }

    pub fn print_log(pool: &DbPool, limit: Option<usize>) -> AppResult<()> {
        let entries = Self::load(pool, limit)?;

        if entries.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        let id_w = entries.iter().map(|e| e.id.to_string().len()).max().unwrap_or(1);

        println!("📜 Internal log:\n");

        for e in &entries {
            let date = chrono::DateTime::parse_from_rfc3339(&e.date)
                .map(|dt| dt.format("%F %T").to_string())
                .unwrap_or_else(|_| e.date.clone());

            let color = color_for_operation(&e.operation);

            // Message text may carry colours of its own; width is measured without them.
            let mut visible = if e.target.is_empty() {
                e.operation.clone()
            } else {
                format!("{} ({})", e.operation, strip_ansi(&e.target))
            };
            if visible.chars().count() > TARGET_WIDTH {
                visible = visible.chars().take(TARGET_WIDTH - 3).collect::<String>() + "...";
            }

            let padding = " ".repeat(TARGET_WIDTH.saturating_sub(visible.chars().count()));
            let painted = match visible.split_once(' ') {
                Some((op, rest)) => format!("{} {}", color.paint(op), rest),
                None => color.paint(visible.as_str()).to_string(),
            };

            println!(
                "{:>id_w$}: {} | {}{} => {}",
                e.id,
                date,
                painted,
                padding,
                strip_ansi(&e.message),
                id_w = id_w
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_colour_sequences() {
        assert_eq!(strip_ansi("\x1b[31mred\x1b[0m"), "red");
    }

    #[test]
    fn verbs_pick_colours() {
        assert_eq!(color_for_operation("site_add"), Colour::Green);
        assert_eq!(color_for_operation("visit_del"), Colour::Red);
        assert_eq!(color_for_operation("backup"), Colour::Blue);
    }
}
