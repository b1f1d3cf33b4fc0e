use chrono::NaiveDate;

use crate::extract::POLITICS_SECTION_ID;

/// Which transition [`TraversalCursor::advance`] took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    NextPage,
    PreviousDate,
}

/// The controller's position in the crawl space: one calendar date and one
/// 1-based page number within it.
///
/// Pages strictly increase within a date; when a date runs out of pages the
/// cursor moves exactly one day back and the page resets to 1. The cursor
/// never moves forward in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalCursor {
    date: NaiveDate,
    page: u32,
}

impl TraversalCursor {
    pub fn starting_at(date: NaiveDate) -> Self {
        Self { date, page: 1 }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Listing address for the current position.
    pub fn listing_url(&self, office_id: &str) -> String {
        format!(
            "https://news.naver.com/main/list.naver?mode=LPOD&mid=sec&oid={office_id}&sid1={POLITICS_SECTION_ID}&date={}&page={}",
            self.date.format("%Y%m%d"),
            self.page
        )
    }

    /// The single transition out of a finished listing page: follow the next
    /// page when one exists, otherwise roll back one day and restart at
    /// page 1. Both "no next-page control" and "next-page lookup failed"
    /// funnel through here.
    pub fn advance(&mut self, has_next_page: bool) -> Advance {
        if has_next_page {
            self.page += 1;
            Advance::NextPage
        } else {
            self.date = self.date.pred_opt().expect("calendar underflow");
            self.page = 1;
            Advance::PreviousDate
        }
    }
}
