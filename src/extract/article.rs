//! Field extraction for a loaded article page.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use std::time::Duration;

use super::layout::{element_text, OutletLayout};
use crate::core::{CrawlError, CrawlResult};
use crate::engine::BrowserEngine;
use crate::records::{ArticleRecord, RelatedLink};

/// Mobile article addresses; captures the office id and article id.
static MOBILE_ARTICLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[^/]+/mnews/article/(\d+)/(\d+)").expect("mobile article pattern")
});

static NON_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9]").expect("digit filter"));

/// Reads an [`ArticleRecord`] out of the engine's current context.
///
/// Mobile-layout addresses are first rewritten to the desktop article URL
/// (several fields only render reliably there), which costs one extra
/// navigation. Title and body are required; every other field degrades to
/// its default when the page does not carry it.
///
/// The returned record still has empty `outlet` and `source_url`; the
/// caller owns those.
pub async fn extract(
    engine: &mut dyn BrowserEngine,
    layout: &OutletLayout,
    settle: Duration,
) -> CrawlResult<ArticleRecord> {
    let current = engine.current_url().await?;
    if let Some(desktop) = desktop_url(&current) {
        debug!("rewriting mobile address to desktop layout: {desktop}");
        engine.navigate(&desktop).await?;
        tokio::time::sleep(settle).await;
    }

    let html = engine.page_html().await?;
    extract_from_html(&html, layout)
}

fn desktop_url(current: &str) -> Option<String> {
    MOBILE_ARTICLE
        .captures(current)
        .map(|caps| format!("https://n.news.naver.com/article/{}/{}", &caps[1], &caps[2]))
}

fn extract_from_html(html: &str, layout: &OutletLayout) -> CrawlResult<ArticleRecord> {
    let document = Html::parse_document(html);

    let title = layout
        .title
        .first_text(&document)
        .ok_or(CrawlError::MissingField("title"))?;
    let body = layout
        .body
        .first_text(&document)
        .ok_or(CrawlError::MissingField("body"))?;

    let datestamps: Vec<String> = layout
        .datestamps
        .all(&document)
        .into_iter()
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect();
    let created_at = datestamps.first().cloned();
    let modified_at = datestamps.get(1).cloned();

    let byline = layout.byline.first_text(&document);

    let comment_count = layout
        .comment_count
        .first_text(&document)
        .map(|raw| parse_comment_count(&raw))
        .unwrap_or(0);

    let mut related = Vec::new();
    for item in layout.related_items.all(&document) {
        let title = layout.related_link.first_text_in(item);
        let url = layout.related_link.first_attr_in(item, "href");
        match (title, url) {
            (Some(title), Some(url)) if !url.is_empty() => {
                related.push(RelatedLink { title, url });
            }
            // A malformed list entry is dropped without giving up on the rest.
            _ => continue,
        }
    }

    Ok(ArticleRecord {
        title,
        body,
        outlet: String::new(),
        source_url: String::new(),
        created_at,
        modified_at,
        byline,
        comment_count,
        related,
    })
}

fn parse_comment_count(raw: &str) -> u32 {
    NON_DIGITS.replace_all(raw, "").parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MockEngine;

    const URL: &str = "https://n.news.naver.com/article/028/0000001";

    fn full_article() -> String {
        concat!(
            "<html><body>",
            "<h2 class=\"media_end_head_headline\">예산안 협상 타결</h2>",
            "<span class=\"media_end_head_info_datestamp_time\">2024.03.05. 오전 9:12</span>",
            "<span class=\"media_end_head_info_datestamp_time\">2024.03.05. 오전 11:40</span>",
            "<em class=\"media_end_head_journalist_name\">김기자</em>",
            "<a class=\"media_end_head_cmtcount_button\">댓글 1,234</a>",
            "<article id=\"dic_area\">여야가 예산안에 합의했다.</article>",
            "<li class=\"media_end_linked_item\">",
            "<a class=\"media_end_linked_item_inner\" href=\"https://n.news.naver.com/article/028/0000002\">후속 보도</a>",
            "</li>",
            "<li class=\"media_end_linked_item\"><span>링크 없는 항목</span></li>",
            "</body></html>",
        )
        .to_string()
    }

    async fn engine_with(html: &str) -> MockEngine {
        let mut engine = MockEngine::new().with_page(URL, html);
        engine.navigate(URL).await.unwrap();
        engine
    }

    #[tokio::test]
    async fn extracts_every_field() {
        let mut engine = engine_with(&full_article()).await;
        let record = extract(&mut engine, OutletLayout::naver(), Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(record.title, "예산안 협상 타결");
        assert_eq!(record.body, "여야가 예산안에 합의했다.");
        assert_eq!(record.created_at.as_deref(), Some("2024.03.05. 오전 9:12"));
        assert_eq!(record.modified_at.as_deref(), Some("2024.03.05. 오전 11:40"));
        assert_eq!(record.byline.as_deref(), Some("김기자"));
        assert_eq!(record.comment_count, 1234);
        // The entry without a link was skipped, not fatal.
        assert_eq!(record.related.len(), 1);
        assert_eq!(record.related[0].title, "후속 보도");
        assert!(record.outlet.is_empty());
        assert!(record.source_url.is_empty());
    }

    #[tokio::test]
    async fn optional_fields_degrade_to_defaults() {
        let mut engine = engine_with(
            "<h3 class=\"tit_view\">단신</h3><div id=\"articeBody\">본문.</div>",
        )
        .await;
        let record = extract(&mut engine, OutletLayout::naver(), Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(record.created_at, None);
        assert_eq!(record.modified_at, None);
        assert_eq!(record.byline, None);
        assert_eq!(record.comment_count, 0);
        assert!(record.related.is_empty());
    }

    #[tokio::test]
    async fn missing_body_fails_the_extraction() {
        let mut engine =
            engine_with("<h2 class=\"media_end_head_headline\">제목만</h2>").await;
        let err = extract(&mut engine, OutletLayout::naver(), Duration::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, CrawlError::MissingField("body")));
    }

    #[tokio::test]
    async fn extraction_is_idempotent() {
        let mut engine = engine_with(&full_article()).await;
        let first = extract(&mut engine, OutletLayout::naver(), Duration::ZERO)
            .await
            .unwrap();
        let second = extract(&mut engine, OutletLayout::naver(), Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn mobile_addresses_are_rewritten_before_reading() {
        let mobile = "https://n.news.naver.com/mnews/article/028/0000001";
        let mut engine = MockEngine::new()
            .with_page(mobile, "<div>mobile shell</div>")
            .with_page(URL, &full_article());
        engine.navigate(mobile).await.unwrap();

        let record = extract(&mut engine, OutletLayout::naver(), Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(record.title, "예산안 협상 타결");

        let journal = engine.journal();
        let log = journal.lock();
        assert!(log.contains(&format!("navigate:{URL}")));
    }

    #[test]
    fn comment_count_strips_decorations() {
        assert_eq!(parse_comment_count("댓글 1,234"), 1234);
        assert_eq!(parse_comment_count("댓글"), 0);
        assert_eq!(parse_comment_count(""), 0);
    }
}
