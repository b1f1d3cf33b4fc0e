mod cancel;
mod controller;
mod cursor;
mod errors;
pub mod recovery;

pub use cancel::CancelToken;
pub use controller::{Crawler, Outlet};
pub use cursor::{Advance, TraversalCursor};
pub use errors::{CrawlError, CrawlResult};
