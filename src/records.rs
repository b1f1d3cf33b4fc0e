use serde::Serialize;

/// A related-article reference found at the bottom of an article page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedLink {
    pub title: String,
    pub url: String,
}

/// One crawled article.
///
/// `title` and `body` are guaranteed non-empty by the extractor; the
/// controller fills in `outlet` and `source_url` before the record reaches
/// the sink, after which it is never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleRecord {
    pub title: String,
    pub body: String,
    pub outlet: String,
    pub source_url: String,
    /// Publication timestamp as displayed on the page. The site does not
    /// guarantee a parseable format, so this stays free-form text.
    pub created_at: Option<String>,
    pub modified_at: Option<String>,
    pub byline: Option<String>,
    pub comment_count: u32,
    pub related: Vec<RelatedLink>,
}

impl ArticleRecord {
    pub fn related_titles(&self) -> String {
        self.related
            .iter()
            .map(|r| r.title.as_str())
            .collect::<Vec<_>>()
            .join("|")
    }

    pub fn related_urls(&self) -> String {
        self.related
            .iter()
            .map(|r| r.url.as_str())
            .collect::<Vec<_>>()
            .join("|")
    }
}
