pub mod config;
pub mod core;
pub mod engine;
pub mod extract;
pub mod outlets;
pub mod records;
pub mod sink;
pub mod stats;

pub use config::CrawlConfig;
pub use core::{CancelToken, CrawlError, CrawlResult, Crawler, Outlet, TraversalCursor};
pub use engine::{BrowserEngine, ChromeEngineFactory, EngineError, EngineFactory};
pub use extract::OutletLayout;
pub use records::{ArticleRecord, RelatedLink};
pub use sink::RecordSink;
pub use stats::CrawlStats;
