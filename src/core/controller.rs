//! The crawl session controller: walks an outlet's listing pages backward
//! through calendar dates and dispatches every teaser to the classifier and
//! extractor in its own short-lived browsing context.

use log::{debug, info, warn};
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::cancel::CancelToken;
use super::cursor::{Advance, TraversalCursor};
use super::errors::CrawlResult;
use super::recovery;
use crate::config::CrawlConfig;
use crate::engine::{BrowserEngine, EngineFactory};
use crate::extract::layout::element_text;
use crate::extract::{article, classify, OutletLayout};
use crate::records::ArticleRecord;
use crate::sink::RecordSink;
use crate::stats::CrawlStats;

/// The outlet being crawled, already resolved to its portal office id.
#[derive(Debug, Clone)]
pub struct Outlet {
    pub name: String,
    pub oid: String,
}

#[derive(Debug, Clone)]
struct Teaser {
    title: String,
    url: String,
}

enum ArticleOutcome {
    Accepted,
    OffTopic,
    Duplicate,
}

pub struct Crawler {
    config: CrawlConfig,
    outlet: Outlet,
    layout: &'static OutletLayout,
    stats: Arc<CrawlStats>,
    cancel: CancelToken,
}

impl Crawler {
    pub fn new(config: CrawlConfig, outlet: Outlet) -> Self {
        Self {
            config,
            outlet,
            layout: OutletLayout::naver(),
            stats: Arc::new(CrawlStats::new()),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_layout(mut self, layout: &'static OutletLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn stats(&self) -> Arc<CrawlStats> {
        Arc::clone(&self.stats)
    }

    /// Runs the full crawl under session recovery: the cursor starts at the
    /// configured end date and the traversal survives browser losses by
    /// relaunching from the factory and resuming in place.
    pub async fn run(
        &self,
        factory: &dyn EngineFactory,
        sink: &mut RecordSink,
    ) -> CrawlResult<()> {
        let mut cursor = TraversalCursor::starting_at(self.config.end_date);
        recovery::run_with_recovery(self, factory, &mut cursor, sink).await
    }

    /// Drives one engine from `cursor` until the traversal terminates.
    /// Returns `Ok` on every graceful end (bound crossed, listing render
    /// timeout, cancellation); errors bubble up, dead-session faults
    /// included, for the recovery loop to sort out.
    pub(crate) async fn drive(
        &self,
        engine: &mut dyn BrowserEngine,
        cursor: &mut TraversalCursor,
        sink: &mut RecordSink,
    ) -> CrawlResult<()> {
        loop {
            if let Some(start) = self.config.start_date {
                if cursor.date() < start {
                    info!("crossed the start bound {start}; run complete");
                    return Ok(());
                }
            }
            if self.cancel.is_cancelled() {
                info!("cancelled; stopping before the next listing page");
                return Ok(());
            }

            let listing_url = cursor.listing_url(&self.outlet.oid);
            info!(
                "listing {} page {} for {}",
                cursor.date(),
                cursor.page(),
                self.outlet.name
            );
            engine.navigate(&listing_url).await?;
            self.pause(self.config.listing_pause).await;

            match engine
                .wait_for(self.layout.listing_items, self.config.listing_timeout)
                .await
            {
                Ok(()) => {}
                Err(e) if e.is_wait_timeout() => {
                    warn!(
                        "listing did not render in time; ending the run with {} record(s)",
                        sink.len()
                    );
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }

            let html = engine.page_html().await?;
            let base = Url::parse(&listing_url)?;
            let teasers = teasers_on(&html, &base, self.layout);
            debug!("{} teaser(s) on this page", teasers.len());

            for teaser in &teasers {
                if self.cancel.is_cancelled() {
                    info!("cancelled; stopping after the current article");
                    return Ok(());
                }
                self.stats.record_article_seen();
                match self.visit_article(engine, teaser, sink).await {
                    Ok(ArticleOutcome::Accepted) => self.stats.record_accepted(),
                    Ok(ArticleOutcome::OffTopic) => {
                        self.stats.record_off_topic();
                        debug!("not a politics article: {}", teaser.url);
                    }
                    Ok(ArticleOutcome::Duplicate) => self.stats.record_duplicate(),
                    Err(e) if e.is_session_gone() => return Err(e),
                    Err(e) => {
                        self.stats.record_failed();
                        warn!("skipping article {}: {e}", teaser.url);
                    }
                }
            }
            self.stats.record_listing_page();

            let has_next = has_next_page(&html, self.layout, cursor.page() + 1);
            match cursor.advance(has_next) {
                Advance::NextPage => debug!("advancing to page {}", cursor.page()),
                Advance::PreviousDate => {
                    self.stats.record_date_rollback();
                    debug!("no further pages; rolling back to {}", cursor.date());
                }
            }
        }
    }

    /// Processes one teaser inside its own browsing context. The context is
    /// closed on every path out of here; only a context that dies with the
    /// session is allowed to stay behind, and that session is discarded
    /// wholesale by the recovery loop.
    async fn visit_article(
        &self,
        engine: &mut dyn BrowserEngine,
        teaser: &Teaser,
        sink: &mut RecordSink,
    ) -> CrawlResult<ArticleOutcome> {
        let context = engine.open_context().await?;
        let outcome = self.read_article(engine, teaser).await;
        if let Err(close_err) = engine.close_context(context).await {
            if close_err.is_session_gone() {
                return Err(close_err.into());
            }
            warn!("article context did not close cleanly: {close_err}");
        }

        match outcome? {
            Some(record) => {
                let accepted = sink.add(record);
                if accepted {
                    info!("[{}] {}", sink.len(), teaser.title);
                    Ok(ArticleOutcome::Accepted)
                } else {
                    Ok(ArticleOutcome::Duplicate)
                }
            }
            None => Ok(ArticleOutcome::OffTopic),
        }
    }

    async fn read_article(
        &self,
        engine: &mut dyn BrowserEngine,
        teaser: &Teaser,
    ) -> CrawlResult<Option<ArticleRecord>> {
        engine.navigate(&teaser.url).await?;
        self.pause(self.config.article_pause).await;

        if !classify::is_politics(engine, self.layout).await {
            return Ok(None);
        }

        let mut record = article::extract(engine, self.layout, self.config.article_pause).await?;
        record.outlet = self.outlet.name.clone();
        record.source_url = teaser.url.clone();
        Ok(Some(record))
    }

    async fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Enumerates the article teasers on a listing page, in page order. Items
/// without a usable link or a non-empty title are dropped here.
fn teasers_on(html: &str, base: &Url, layout: &OutletLayout) -> Vec<Teaser> {
    let document = Html::parse_document(html);
    let Ok(items) = Selector::parse(layout.listing_items) else {
        return Vec::new();
    };

    let mut teasers = Vec::new();
    for item in document.select(&items) {
        let anchor = layout
            .teaser_link
            .0
            .iter()
            .filter_map(|s| Selector::parse(s).ok())
            .flat_map(|sel| item.select(&sel).collect::<Vec<_>>())
            .find_map(|a| {
                let title = element_text(a);
                let href = a.value().attr("href")?;
                (!title.is_empty()).then(|| (title, href.to_string()))
            });
        let Some((title, href)) = anchor else {
            continue;
        };
        let Ok(url) = base.join(&href) else {
            debug!("unresolvable teaser link: {href}");
            continue;
        };
        teasers.push(Teaser {
            title,
            url: url.to_string(),
        });
    }
    teasers
}

/// True when the listing's pagination block carries a control for `page`.
fn has_next_page(html: &str, layout: &OutletLayout, page: u32) -> bool {
    let document = Html::parse_document(html);
    let Ok(links) = Selector::parse(layout.paging_links) else {
        return false;
    };
    let wanted = page.to_string();
    document.select(&links).any(|a| element_text(a) == wanted)
}
