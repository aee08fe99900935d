//! Output file naming: `{prefix}_{YYYYMMDD}_{HHMM}_{NN}.pdf`, where `NN` counts
//! the PDFs already written under the same prefix on the same day.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Utc};

use crate::error::{Error, Result};

/// The current time at a fixed offset from UTC.
pub fn local_now(offset_hours: i32) -> Result<DateTime<FixedOffset>> {
    let offset = offset_hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| Error::ConfigError(format!("UTC offset out of range: {offset_hours}h")))?;
    Ok(Utc::now().with_timezone(&offset))
}

pub fn date_stamp(now: &DateTime<FixedOffset>) -> String {
    now.format("%Y%m%d").to_string()
}

pub fn time_stamp(now: &DateTime<FixedOffset>) -> String {
    now.format("%H%M").to_string()
}

/// Number of PDFs in `dir` already written for `prefix` on `date`.
pub fn count_existing(dir: &Path, prefix: &str, date: &str) -> Result<usize> {
    let stem = format!("{prefix}_{date}");
    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let name = entry?.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(&stem) && name.ends_with(".pdf") {
            count += 1;
        }
    }
    Ok(count)
}

pub fn pdf_file_name(prefix: &str, now: &DateTime<FixedOffset>, sequence: usize) -> String {
    format!(
        "{prefix}_{}_{}_{sequence:02}.pdf",
        date_stamp(now),
        time_stamp(now)
    )
}

/// Full path of the next PDF for `prefix` in `dir`.
pub fn next_output_path(dir: &Path, prefix: &str, now: &DateTime<FixedOffset>) -> Result<PathBuf> {
    let sequence = count_existing(dir, prefix, &date_stamp(now))? + 1;
    Ok(dir.join(pdf_file_name(prefix, now, sequence)))
}
