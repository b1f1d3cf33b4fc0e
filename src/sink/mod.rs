//! In-memory record accumulation and the end-of-run CSV flush.

mod disk;

use log::{debug, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::records::ArticleRecord;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("flush failed at the primary destination ({primary}) and the fallback ({fallback})")]
    FlushFailed {
        primary: Box<SinkError>,
        fallback: Box<SinkError>,
    },
}

/// Collects accepted records in discovery order and writes them out once at
/// the end of a run.
///
/// `source_url` is the per-run unique key: re-adding an already-collected
/// URL is a no-op, which is what keeps a listing page replayed after a
/// session restart from producing duplicate rows.
#[derive(Debug, Default)]
pub struct RecordSink {
    records: Vec<ArticleRecord>,
    seen: HashSet<String>,
}

impl RecordSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `record`; returns `false` if its `source_url` was already
    /// collected this run.
    pub fn add(&mut self, record: ArticleRecord) -> bool {
        if !self.seen.insert(record.source_url.clone()) {
            debug!("already collected, dropping duplicate: {}", record.source_url);
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn records(&self) -> &[ArticleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Writes all records to `path`. If that fails, one rescue attempt goes
    /// to a timestamped alternate path next to it; if both fail the error is
    /// surfaced and the in-memory records stay available for a retry.
    ///
    /// Returns the path actually written.
    pub fn flush(&self, path: &Path) -> Result<PathBuf, SinkError> {
        match disk::write_records(path, &self.records) {
            Ok(()) => Ok(path.to_path_buf()),
            Err(primary) => {
                let alternate = disk::fallback_path(path);
                warn!(
                    "flush to {} failed ({primary}); retrying at {}",
                    path.display(),
                    alternate.display()
                );
                match disk::write_records(&alternate, &self.records) {
                    Ok(()) => Ok(alternate),
                    Err(fallback) => Err(SinkError::FlushFailed {
                        primary: Box::new(primary),
                        fallback: Box::new(fallback),
                    }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::RelatedLink;
    use std::fs;

    fn record(n: u32) -> ArticleRecord {
        ArticleRecord {
            title: format!("기사 {n}"),
            body: format!("본문 {n}"),
            outlet: "한겨레".to_string(),
            source_url: format!("https://n.news.naver.com/article/028/{n:07}"),
            created_at: Some("2024.03.05. 오전 9:12".to_string()),
            modified_at: None,
            byline: Some("김기자".to_string()),
            comment_count: n,
            related: if n % 2 == 0 {
                vec![
                    RelatedLink {
                        title: "관련 기사".to_string(),
                        url: "https://n.news.naver.com/article/028/0000009".to_string(),
                    },
                    RelatedLink {
                        title: "다른 기사".to_string(),
                        url: "https://n.news.naver.com/article/028/0000010".to_string(),
                    },
                ]
            } else {
                Vec::new()
            },
        }
    }

    #[test]
    fn round_trips_through_csv_with_bom_and_fixed_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut sink = RecordSink::new();
        for n in 1..=3 {
            assert!(sink.add(record(n)));
        }
        let written = sink.flush(&path).unwrap();
        assert_eq!(written, path);

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..3], b"\xef\xbb\xbf");

        let mut reader = csv::Reader::from_reader(&bytes[3..]);
        assert_eq!(
            reader.headers().unwrap(),
            &csv::StringRecord::from(disk::COLUMNS.to_vec())
        );
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][0], "기사 1");
        assert_eq!(&rows[1][8], "관련 기사|다른 기사");
        assert_eq!(&rows[2][7], "3");
    }

    #[test]
    fn zero_related_links_serialize_as_empty_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut sink = RecordSink::new();
        sink.add(record(1));
        sink.flush(&path).unwrap();

        let bytes = fs::read(&path).unwrap();
        let mut reader = csv::Reader::from_reader(&bytes[3..]);
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[8], "");
        assert_eq!(&row[9], "");
    }

    #[test]
    fn duplicate_source_urls_are_dropped() {
        let mut sink = RecordSink::new();
        assert!(sink.add(record(1)));
        assert!(!sink.add(record(1)));
        assert!(sink.add(record(2)));
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn falls_back_to_an_alternate_destination() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the primary path makes File::create fail.
        let path = dir.path().join("blocked.csv");
        fs::create_dir(&path).unwrap();

        let mut sink = RecordSink::new();
        sink.add(record(1));

        let written = sink.flush(&path).unwrap();
        assert_ne!(written, path);
        assert!(written.starts_with(dir.path()));
        assert!(fs::read(&written).unwrap().len() > 3);
        // Records stay in memory either way.
        assert_eq!(sink.len(), 1);
    }
}
