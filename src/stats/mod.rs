use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlSnapshot {
    pub listing_pages: usize,
    pub date_rollbacks: usize,
    pub articles_seen: usize,
    pub accepted: usize,
    pub off_topic: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub session_restarts: usize,
}

/// Progress counters for one crawl run.
#[derive(Debug)]
pub struct CrawlStats {
    start_time: DateTime<Utc>,
    counters: RwLock<CrawlSnapshot>,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self {
            start_time: Utc::now(),
            counters: RwLock::new(CrawlSnapshot::default()),
        }
    }

    pub fn record_listing_page(&self) {
        self.counters.write().listing_pages += 1;
    }

    pub fn record_date_rollback(&self) {
        self.counters.write().date_rollbacks += 1;
    }

    pub fn record_article_seen(&self) {
        self.counters.write().articles_seen += 1;
    }

    pub fn record_accepted(&self) {
        self.counters.write().accepted += 1;
    }

    pub fn record_off_topic(&self) {
        self.counters.write().off_topic += 1;
    }

    pub fn record_duplicate(&self) {
        self.counters.write().duplicates += 1;
    }

    pub fn record_failed(&self) {
        self.counters.write().failed += 1;
    }

    pub fn record_session_restart(&self) {
        self.counters.write().session_restarts += 1;
    }

    pub fn snapshot(&self) -> CrawlSnapshot {
        self.counters.read().clone()
    }

    pub fn print_summary(&self) {
        let stats = self.snapshot();
        let elapsed = Utc::now().signed_duration_since(self.start_time);

        println!("\nCrawl Statistics:");
        println!("=================");
        println!("Duration: {} seconds", elapsed.num_seconds());
        println!("Listing Pages: {}", stats.listing_pages);
        println!("Date Rollbacks: {}", stats.date_rollbacks);
        println!("Articles Seen: {}", stats.articles_seen);
        println!("Accepted: {}", stats.accepted);
        println!("Off Topic: {}", stats.off_topic);
        if stats.duplicates > 0 {
            println!("Duplicates Dropped: {}", stats.duplicates);
        }
        println!("Failed: {}", stats.failed);
        if stats.session_restarts > 0 {
            println!("Session Restarts: {}", stats.session_restarts);
        }
    }
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let stats = CrawlStats::new();
        stats.record_article_seen();
        stats.record_article_seen();
        stats.record_accepted();
        stats.record_session_restart();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.articles_seen, 2);
        assert_eq!(snapshot.accepted, 1);
        assert_eq!(snapshot.session_restarts, 1);
        assert_eq!(snapshot.failed, 0);
    }
}
