pub mod chrome;
pub mod mock;

mod browser;

pub use browser::{BrowserEngine, ContextHandle, EngineError, EngineFactory, EngineResult};
pub use chrome::{ChromeEngine, ChromeEngineFactory};
pub use mock::{MockEngine, MockEngineFactory};
