//! Scripted in-memory engine for tests and downstream consumers.
//!
//! Pages are registered up front as url → HTML fixtures; every engine
//! operation is appended to a journal that outlives the engine, so a test
//! can assert on traversal order after the crawl consumed the instance.

use async_trait::async_trait;
use parking_lot::Mutex;
use scraper::{Html, Selector};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use super::{BrowserEngine, ContextHandle, EngineError, EngineFactory, EngineResult};
use crate::core::CancelToken;

/// Shared operation journal. Entries are `navigate:<url>`, `open:<ctx>`,
/// `close:<ctx>` and `shutdown`.
pub type Journal = Arc<Mutex<Vec<String>>>;

const EMPTY_PAGE: &str = "<html><head></head><body></body></html>";

struct Frame {
    handle: ContextHandle,
    url: String,
    html: String,
}

pub struct MockEngine {
    pages: HashMap<String, String>,
    frames: Vec<Frame>,
    current: usize,
    next_id: u32,
    /// Remaining operations before every further call fails with a dead
    /// session. `None` means the engine never dies.
    ops_before_fault: Option<u32>,
    cancel_on_navigate: Option<(String, CancelToken)>,
    journal: Journal,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            frames: vec![Frame {
                handle: ContextHandle::new("ctx-0"),
                url: "about:blank".to_string(),
                html: EMPTY_PAGE.to_string(),
            }],
            current: 0,
            next_id: 1,
            ops_before_fault: None,
            cancel_on_navigate: None,
            journal: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// The first `ops` operations succeed; every later one fails with
    /// `EngineError::SessionGone`.
    pub fn fail_after(mut self, ops: u32) -> Self {
        self.ops_before_fault = Some(ops);
        self
    }

    /// Trips `token` when a navigation to `url` happens, for cancellation
    /// tests that need the flag flipped mid-run.
    pub fn cancel_when_navigating(mut self, url: impl Into<String>, token: CancelToken) -> Self {
        self.cancel_on_navigate = Some((url.into(), token));
        self
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    pub fn journal(&self) -> Journal {
        Arc::clone(&self.journal)
    }

    fn tick(&mut self) -> EngineResult<()> {
        match self.ops_before_fault {
            Some(0) => Err(EngineError::SessionGone(
                "scripted session loss".to_string(),
            )),
            Some(ref mut n) => {
                *n -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn record(&self, entry: String) {
        self.journal.lock().push(entry);
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrowserEngine for MockEngine {
    async fn navigate(&mut self, url: &str) -> EngineResult<()> {
        self.tick()?;
        if let Some((trigger, token)) = &self.cancel_on_navigate {
            if trigger == url {
                token.cancel();
            }
        }
        self.record(format!("navigate:{url}"));
        let html = self
            .pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| EMPTY_PAGE.to_string());
        let frame = &mut self.frames[self.current];
        frame.url = url.to_string();
        frame.html = html;
        Ok(())
    }

    async fn current_url(&mut self) -> EngineResult<String> {
        self.tick()?;
        Ok(self.frames[self.current].url.clone())
    }

    async fn page_html(&mut self) -> EngineResult<String> {
        self.tick()?;
        Ok(self.frames[self.current].html.clone())
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> EngineResult<()> {
        self.tick()?;
        let document = Html::parse_document(&self.frames[self.current].html);
        let matched = Selector::parse(selector)
            .ok()
            .map(|sel| document.select(&sel).next().is_some())
            .unwrap_or(false);
        if matched {
            Ok(())
        } else {
            Err(EngineError::WaitTimeout {
                selector: selector.to_string(),
                timeout,
            })
        }
    }

    async fn open_context(&mut self) -> EngineResult<ContextHandle> {
        self.tick()?;
        let handle = ContextHandle::new(format!("ctx-{}", self.next_id));
        self.next_id += 1;
        self.record(format!("open:{}", handle.id()));
        self.frames.push(Frame {
            handle: handle.clone(),
            url: "about:blank".to_string(),
            html: EMPTY_PAGE.to_string(),
        });
        self.current = self.frames.len() - 1;
        Ok(handle)
    }

    async fn close_context(&mut self, handle: ContextHandle) -> EngineResult<()> {
        self.tick()?;
        let idx = self
            .frames
            .iter()
            .position(|f| f.handle == handle)
            .ok_or_else(|| EngineError::UnknownContext(handle.id().to_string()))?;
        if idx == 0 {
            return Err(EngineError::UnknownContext(
                "refusing to close the primary context".to_string(),
            ));
        }
        self.record(format!("close:{}", handle.id()));
        self.frames.remove(idx);
        self.current = 0;
        Ok(())
    }

    async fn switch_to(&mut self, handle: &ContextHandle) -> EngineResult<()> {
        self.tick()?;
        let idx = self
            .frames
            .iter()
            .position(|f| &f.handle == handle)
            .ok_or_else(|| EngineError::UnknownContext(handle.id().to_string()))?;
        self.current = idx;
        Ok(())
    }

    async fn context_handles(&mut self) -> EngineResult<Vec<ContextHandle>> {
        self.tick()?;
        Ok(self.frames.iter().map(|f| f.handle.clone()).collect())
    }

    async fn shutdown(&mut self) {
        self.record("shutdown".to_string());
    }
}

/// Hands out pre-built engines in order, one per recovery launch.
pub struct MockEngineFactory {
    engines: Mutex<VecDeque<MockEngine>>,
    launches: Mutex<u32>,
}

impl MockEngineFactory {
    pub fn new(engines: Vec<MockEngine>) -> Self {
        Self {
            engines: Mutex::new(engines.into()),
            launches: Mutex::new(0),
        }
    }

    pub fn launches(&self) -> u32 {
        *self.launches.lock()
    }
}

#[async_trait]
impl EngineFactory for MockEngineFactory {
    async fn launch(&self) -> EngineResult<Box<dyn BrowserEngine>> {
        *self.launches.lock() += 1;
        self.engines
            .lock()
            .pop_front()
            .map(|engine| Box::new(engine) as Box<dyn BrowserEngine>)
            .ok_or_else(|| EngineError::Launch("mock factory has no engines left".to_string()))
    }
}
