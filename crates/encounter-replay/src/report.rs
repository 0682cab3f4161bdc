//! Plain-text rendering of the retained history.

use core::fmt;

use encounter_types::EncounterRecord;

/// Table of records, oldest first, under a header.
pub struct Report<'a, P> {
    records: Vec<&'a EncounterRecord<P>>,
}

impl<'a, P> Report<'a, P> {
    /// Collect the rows to render.
    pub fn new(records: impl IntoIterator<Item = &'a EncounterRecord<P>>) -> Self {
        Self {
            records: records.into_iter().collect(),
        }
    }
}

impl<P> fmt::Display for Report<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>6}  {:<28}  {:>8}  {:>10}", "ID", "ENCOUNTER", "STARTED", "DURATION")?;
        for record in &self.records {
            let summary = &record.summary;
            writeln!(
                f,
                "{:>6}  {:<28}  {:>8}  {:>10}",
                record.tracker_id.into_inner(),
                summary.display_name(),
                summary.started_at.format("%H:%M:%S").to_string(),
                format_duration(summary.duration_ms()),
            )?;
        }
        Ok(())
    }
}

/// Format milliseconds as `m:ss.mmm`.
fn format_duration(millis: u64) -> String {
    let minutes = millis / 60_000;
    let seconds = (millis % 60_000) / 1_000;
    let remainder = millis % 1_000;
    format!("{minutes}:{seconds:02}.{remainder:03}")
}
