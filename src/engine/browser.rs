use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("timed out after {timeout:?} waiting for `{selector}`")]
    WaitTimeout { selector: String, timeout: Duration },

    #[error("no such browsing context: {0}")]
    UnknownContext(String),

    #[error("browser protocol error: {0}")]
    Protocol(String),

    #[error("browsing session is no longer valid: {0}")]
    SessionGone(String),
}

impl EngineError {
    /// A dead session is the only fault class the recovery loop restarts on;
    /// everything else propagates to normal error handling.
    pub fn is_session_gone(&self) -> bool {
        matches!(self, EngineError::SessionGone(_))
    }

    pub fn is_wait_timeout(&self) -> bool {
        matches!(self, EngineError::WaitTimeout { .. })
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Identifier for an isolated browsing context (a tab) held by an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextHandle(String);

impl ContextHandle {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// The browser automation collaborator.
///
/// One engine instance drives one logical crawl; access is strictly
/// sequential, so every method takes `&mut self`. The engine always has a
/// current context: the primary one it was launched with, or the secondary
/// context most recently opened. `open_context` switches to the new context
/// and `close_context` switches back to the primary one, mirroring how the
/// controller uses tabs (one article per secondary context, closed before
/// the next article begins).
#[async_trait]
pub trait BrowserEngine: Send {
    async fn navigate(&mut self, url: &str) -> EngineResult<()>;

    async fn current_url(&mut self) -> EngineResult<String>;

    /// Snapshot of the current context's rendered document.
    async fn page_html(&mut self) -> EngineResult<String>;

    /// Blocks until `selector` matches in the current context or the
    /// timeout elapses, whichever comes first.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> EngineResult<()>;

    async fn open_context(&mut self) -> EngineResult<ContextHandle>;

    async fn close_context(&mut self, handle: ContextHandle) -> EngineResult<()>;

    async fn switch_to(&mut self, handle: &ContextHandle) -> EngineResult<()>;

    async fn context_handles(&mut self) -> EngineResult<Vec<ContextHandle>>;

    /// Best-effort teardown; errors are swallowed because shutdown runs on
    /// both healthy and already-dead sessions.
    async fn shutdown(&mut self);
}

/// Launches engines with a fixed configuration, so a recovery restart gets
/// an instance identical to the one it lost.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    async fn launch(&self) -> EngineResult<Box<dyn BrowserEngine>>;
}
