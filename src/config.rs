use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::{CrawlError, CrawlResult};

/// Run configuration for one crawl.
///
/// The pacing delays are a deliberate throttling policy: pages get a moment
/// to settle before element queries run, which both steadies extraction and
/// keeps the request rhythm unremarkable. They are not tuning knobs for
/// throughput.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Closed lower bound of the walk; the start date itself is crawled.
    /// Without a bound the walk continues until a listing stops rendering.
    pub start_date: Option<NaiveDate>,
    /// Most recent date to crawl; the cursor starts here.
    pub end_date: NaiveDate,
    /// How long a listing page gets to render its items.
    pub listing_timeout: Duration,
    /// Settle delay after navigating to a listing page.
    pub listing_pause: Duration,
    /// Settle delay after navigating to an article.
    pub article_pause: Duration,
    /// Directory the CSV report is written to.
    pub out_dir: PathBuf,
}

impl CrawlConfig {
    pub fn new(end_date: NaiveDate) -> Self {
        Self {
            start_date: None,
            end_date,
            listing_timeout: Duration::from_secs(20),
            listing_pause: Duration::from_secs(3),
            article_pause: Duration::from_secs(2),
            out_dir: PathBuf::from("data"),
        }
    }

    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn with_listing_timeout(mut self, timeout: Duration) -> Self {
        self.listing_timeout = timeout;
        self
    }

    pub fn with_pacing(mut self, listing_pause: Duration, article_pause: Duration) -> Self {
        self.listing_pause = listing_pause;
        self.article_pause = article_pause;
        self
    }

    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = out_dir.into();
        self
    }

    /// Report path for this run, named after the outlet and date range.
    pub fn output_path(&self, outlet: &str) -> PathBuf {
        let start = self.start_date.unwrap_or(self.end_date);
        self.out_dir.join(format!(
            "{outlet}_politics_news_{start}_to_{}.csv",
            self.end_date
        ))
    }
}

/// Parses a `YYYY-MM-DD` operator input; anything else is a validation
/// failure before any navigation happens.
pub fn parse_date(input: &str) -> CrawlResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| CrawlError::InvalidDate {
        input: input.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_iso_dates() {
        assert_eq!(
            parse_date("2024-03-05").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
        assert_eq!(
            parse_date(" 2024-12-31 ").unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
        );
    }

    #[test]
    fn rejects_malformed_dates() {
        for bad in ["2024/03/05", "05-03-2024", "2024-13-01", "today", ""] {
            assert!(matches!(
                parse_date(bad),
                Err(CrawlError::InvalidDate { .. })
            ));
        }
    }

    #[test]
    fn output_path_names_the_outlet_and_range() {
        let end = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let config = CrawlConfig::new(end)
            .with_start_date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
            .with_out_dir("reports");
        assert_eq!(
            config.output_path("한겨레"),
            PathBuf::from("reports/한겨레_politics_news_2024-03-01_to_2024-03-05.csv")
        );
    }
}
