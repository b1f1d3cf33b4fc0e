//! Chromium-backed implementation of the browsing engine.
//!
//! Each isolated browsing context maps to one DevTools page. The CDP
//! transport runs on a background task; when that transport drops mid-run
//! (typically a browser crash during a long crawl), every pending command
//! fails and the fault is surfaced as `EngineError::SessionGone` so the
//! recovery loop can relaunch.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::Page;
use futures::StreamExt;
use log::{debug, warn};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::{BrowserEngine, ContextHandle, EngineError, EngineFactory, EngineResult};

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Masks the automation fingerprint before any site script runs.
const WEBDRIVER_MASK: &str = r#"
    Object.defineProperty(navigator, 'webdriver', {
        get: () => undefined
    })
"#;

const LAUNCH_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--disable-blink-features=AutomationControlled",
];

fn classify(err: impl std::fmt::Display) -> EngineError {
    let msg = err.to_string();
    let lower = msg.to_lowercase();
    if lower.contains("receiver is gone")
        || lower.contains("channel")
        || lower.contains("connection")
        || lower.contains("websocket")
    {
        EngineError::SessionGone(msg)
    } else {
        EngineError::Protocol(msg)
    }
}

pub struct ChromeEngine {
    browser: Browser,
    handler_task: JoinHandle<()>,
    pages: Vec<(ContextHandle, Page)>,
    current: usize,
    next_id: u32,
}

impl ChromeEngine {
    pub async fn launch(headless: bool) -> EngineResult<Self> {
        let mut builder = BrowserConfig::builder()
            .window_size(1920, 1080)
            .args(LAUNCH_ARGS.iter().copied());
        if !headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(EngineError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| EngineError::Launch(e.to_string()))?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("browser event loop: {e}");
                }
            }
        });

        let page = browser.new_page("about:blank").await.map_err(classify)?;
        install_mask(&page).await?;

        Ok(Self {
            browser,
            handler_task,
            pages: vec![(ContextHandle::new("page-0"), page)],
            current: 0,
            next_id: 1,
        })
    }

    fn page(&self) -> &Page {
        &self.pages[self.current].1
    }

    fn position(&self, handle: &ContextHandle) -> EngineResult<usize> {
        self.pages
            .iter()
            .position(|(h, _)| h == handle)
            .ok_or_else(|| EngineError::UnknownContext(handle.id().to_string()))
    }
}

async fn install_mask(page: &Page) -> EngineResult<()> {
    page.execute(AddScriptToEvaluateOnNewDocumentParams::new(WEBDRIVER_MASK))
        .await
        .map_err(classify)?;
    Ok(())
}

#[async_trait]
impl BrowserEngine for ChromeEngine {
    async fn navigate(&mut self, url: &str) -> EngineResult<()> {
        self.page().goto(url).await.map_err(|e| match classify(e) {
            gone @ EngineError::SessionGone(_) => gone,
            other => EngineError::Navigation {
                url: url.to_string(),
                reason: other.to_string(),
            },
        })?;
        Ok(())
    }

    async fn current_url(&mut self) -> EngineResult<String> {
        self.page()
            .evaluate("window.location.href")
            .await
            .map_err(classify)?
            .into_value::<String>()
            .map_err(classify)
    }

    async fn page_html(&mut self) -> EngineResult<String> {
        match self.page().content().await {
            Ok(html) => Ok(html),
            Err(e) => {
                let err = classify(e);
                if err.is_session_gone() {
                    return Err(err);
                }
                // The DOM snapshot sometimes succeeds where Page.content
                // stumbles on half-settled documents.
                self.page()
                    .evaluate("document.documentElement.outerHTML")
                    .await
                    .map_err(classify)?
                    .into_value::<String>()
                    .map_err(classify)
            }
        }
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> EngineResult<()> {
        let probe = format!(
            "document.querySelector({}) !== null",
            serde_json::to_string(selector).unwrap_or_else(|_| "\"\"".to_string())
        );
        let deadline = Instant::now() + timeout;
        loop {
            let present = self
                .page()
                .evaluate(probe.as_str())
                .await
                .map_err(classify)?
                .into_value::<bool>()
                .unwrap_or(false);
            if present {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(EngineError::WaitTimeout {
                    selector: selector.to_string(),
                    timeout,
                });
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
    }

    async fn open_context(&mut self) -> EngineResult<ContextHandle> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(classify)?;
        install_mask(&page).await?;
        let handle = ContextHandle::new(format!("page-{}", self.next_id));
        self.next_id += 1;
        self.pages.push((handle.clone(), page));
        self.current = self.pages.len() - 1;
        Ok(handle)
    }

    async fn close_context(&mut self, handle: ContextHandle) -> EngineResult<()> {
        let idx = self.position(&handle)?;
        if idx == 0 {
            return Err(EngineError::UnknownContext(
                "refusing to close the primary context".to_string(),
            ));
        }
        let (_, page) = self.pages.remove(idx);
        self.current = 0;
        page.close().await.map_err(classify)?;
        Ok(())
    }

    async fn switch_to(&mut self, handle: &ContextHandle) -> EngineResult<()> {
        self.current = self.position(handle)?;
        Ok(())
    }

    async fn context_handles(&mut self) -> EngineResult<Vec<ContextHandle>> {
        Ok(self.pages.iter().map(|(h, _)| h.clone()).collect())
    }

    async fn shutdown(&mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("browser did not close cleanly: {e}");
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
    }
}

#[derive(Debug, Clone)]
pub struct ChromeEngineFactory {
    headless: bool,
}

impl ChromeEngineFactory {
    pub fn new(headless: bool) -> Self {
        Self { headless }
    }
}

#[async_trait]
impl EngineFactory for ChromeEngineFactory {
    async fn launch(&self) -> EngineResult<Box<dyn BrowserEngine>> {
        Ok(Box::new(ChromeEngine::launch(self.headless).await?))
    }
}
