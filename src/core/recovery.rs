//! Restart-and-resume handling for dead browsing sessions.
//!
//! The traversal cursor and the record sink live outside the loop, so a
//! restart costs nothing but the relaunch itself: the fresh engine picks up
//! at the exact (date, page) position the dead one reached, and everything
//! already collected stays in the sink. Recovery retries unconditionally —
//! the dominant cause is a browser or network crash hours into a run, not a
//! logical error, so giving up after N attempts would only throw work away.

use log::warn;

use super::controller::Crawler;
use super::cursor::TraversalCursor;
use super::errors::CrawlResult;
use crate::engine::EngineFactory;
use crate::sink::RecordSink;

pub async fn run_with_recovery(
    crawler: &Crawler,
    factory: &dyn EngineFactory,
    cursor: &mut TraversalCursor,
    sink: &mut RecordSink,
) -> CrawlResult<()> {
    loop {
        let mut engine = factory.launch().await?;
        let outcome = crawler.drive(engine.as_mut(), cursor, sink).await;
        engine.shutdown().await;

        match outcome {
            Err(e) if e.is_session_gone() => {
                crawler.stats().record_session_restart();
                warn!(
                    "browsing session lost at {} page {} ({e}); relaunching and resuming",
                    cursor.date(),
                    cursor.page()
                );
            }
            other => return other,
        }
    }
}
