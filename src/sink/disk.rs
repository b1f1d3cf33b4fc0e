use chrono::Local;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::SinkError;
use crate::records::ArticleRecord;

pub(super) const COLUMNS: [&str; 10] = [
    "title",
    "content",
    "outlet",
    "url",
    "created_at",
    "modified_at",
    "byline",
    "comment_count",
    "related_titles",
    "related_urls",
];

/// UTF-8 byte-order mark; spreadsheet applications need it to pick the
/// right encoding for Korean text.
const BOM: &[u8] = b"\xef\xbb\xbf";

pub(super) fn write_records(path: &Path, records: &[ArticleRecord]) -> Result<(), SinkError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(path)?;
    file.write_all(BOM)?;

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(COLUMNS)?;
    for record in records {
        let comment_count = record.comment_count.to_string();
        let related_titles = record.related_titles();
        let related_urls = record.related_urls();
        writer.write_record([
            record.title.as_str(),
            record.body.as_str(),
            record.outlet.as_str(),
            record.source_url.as_str(),
            record.created_at.as_deref().unwrap_or(""),
            record.modified_at.as_deref().unwrap_or(""),
            record.byline.as_deref().unwrap_or(""),
            comment_count.as_str(),
            related_titles.as_str(),
            related_urls.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Alternate destination next to the primary one, stamped so repeated
/// rescue attempts never collide.
pub(super) fn fallback_path(primary: &Path) -> PathBuf {
    let stem = primary
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "records".to_string());
    let stamped = format!("{stem}_{}.csv", Local::now().format("%Y%m%d_%H%M%S"));
    match primary.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(stamped),
        _ => PathBuf::from(stamped),
    }
}
