//! Status command for showing where the journal lives and what it holds.

use std::io::Write;
use std::path::Path;

use aj_core::{LogKind, resolve_weekend_mode};
use aj_db::Database;
use anyhow::Result;

pub fn run<W: Write>(writer: &mut W, db: &Database, database_path: &Path) -> Result<()> {
    writeln!(writer, "Activity journal status")?;
    writeln!(writer, "Database: {}", database_path.display())?;
    writeln!(writer, "Weekend mode: {}", resolve_weekend_mode(db)?)?;

    writeln!(writer, "Entries:")?;
    for kind in LogKind::ALL {
        writeln!(writer, "- {kind}: {}", db.count_logs(kind)?)?;
    }

    Ok(())
}
