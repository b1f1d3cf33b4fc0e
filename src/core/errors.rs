use crate::engine::EngineError;
use crate::sink::SinkError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("invalid date `{input}`: expected YYYY-MM-DD")]
    InvalidDate { input: String },

    #[error("unknown outlet `{0}`")]
    UnknownOutlet(String),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("browser engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("article is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("storage error: {0}")]
    Sink(#[from] SinkError),
}

impl CrawlError {
    /// True for the fault class the recovery loop handles by relaunching
    /// the browser and resuming at the current cursor.
    pub fn is_session_gone(&self) -> bool {
        matches!(self, CrawlError::Engine(e) if e.is_session_gone())
    }
}

pub type CrawlResult<T> = Result<T, CrawlError>;
