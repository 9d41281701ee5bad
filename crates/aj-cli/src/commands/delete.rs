//! Delete command: removes one entry addressed by kind and id.

use std::io::Write;

use aj_core::{Journal, LogId, LogKind, LogStore};
use anyhow::Result;

pub fn run<W: Write, S: LogStore>(
    writer: &mut W,
    journal: &Journal<S>,
    kind: LogKind,
    id: LogId,
) -> Result<()> {
    journal.refresh()?;
    let Some(entry) = journal
        .feed()
        .into_iter()
        .find(|entry| entry.kind() == kind && entry.id() == id)
    else {
        writeln!(writer, "No {kind} entry with id {id}.")?;
        return Ok(());
    };

    journal.delete_log(&entry)?;
    writeln!(writer, "Deleted {kind} #{id} from {}", entry.display_date())?;
    Ok(())
}
