//! Topic classification for loaded article pages.

use log::debug;
use scraper::Html;

use super::layout::{OutletLayout, POLITICS_SECTION_ID};
use crate::engine::BrowserEngine;

const TOPIC_NAME: &str = "정치";

const TOPIC_KEYWORDS: &[&str] = &[
    "정치",
    "대통령",
    "국회",
    "여야",
    "여당",
    "야당",
    "장관",
    "총리",
];

/// Decides whether the article in the engine's current context belongs to
/// the politics section. Never fails: any error while probing the page is
/// treated as "not a match".
pub async fn is_politics(engine: &mut dyn BrowserEngine, layout: &OutletLayout) -> bool {
    match classify(engine, layout).await {
        Ok(decision) => decision,
        Err(e) => {
            debug!("classification fell back to exclusion: {e}");
            false
        }
    }
}

async fn classify(
    engine: &mut dyn BrowserEngine,
    layout: &OutletLayout,
) -> crate::core::CrawlResult<bool> {
    // Tier 1: the section id in the page address is authoritative.
    let url = engine.current_url().await?;
    if url.contains(&format!("sid1={POLITICS_SECTION_ID}")) {
        return Ok(true);
    }

    let html = engine.page_html().await?;
    let document = Html::parse_document(&html);

    // Tier 2: an explicit category label decides either way.
    if let Some(label) = layout.category_label.first_text(&document) {
        return Ok(label.contains(TOPIC_NAME));
    }

    // Tier 3: keyword scan over headline and body text.
    let mut haystack = layout.title.first_text(&document).unwrap_or_default();
    if let Some(body) = layout.body.first_text(&document) {
        haystack.push('\n');
        haystack.push_str(&body);
    }
    Ok(TOPIC_KEYWORDS.iter().any(|kw| haystack.contains(kw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MockEngine;

    const URL: &str = "https://n.news.naver.com/article/028/0001";

    async fn load(html: &str) -> MockEngine {
        let mut engine = MockEngine::new().with_page(URL, html);
        engine.navigate(URL).await.unwrap();
        engine
    }

    #[tokio::test]
    async fn url_section_marker_wins() {
        let marked = "https://news.naver.com/main/read.naver?sid1=100&oid=028";
        let mut engine = MockEngine::new().with_page(marked, "<div>no markup at all</div>");
        engine.navigate(marked).await.unwrap();
        assert!(is_politics(&mut engine, OutletLayout::naver()).await);
    }

    #[tokio::test]
    async fn category_label_decides_both_ways() {
        let mut engine =
            load("<em class=\"media_end_categorize_item\">정치</em>").await;
        assert!(is_politics(&mut engine, OutletLayout::naver()).await);

        // A non-politics label is decisive even though the body would match
        // the keyword scan.
        let mut engine = load(
            "<em class=\"media_end_categorize_item\">경제</em>\
             <article id=\"dic_area\">대통령이 언급했다</article>",
        )
        .await;
        assert!(!is_politics(&mut engine, OutletLayout::naver()).await);
    }

    #[tokio::test]
    async fn keyword_scan_is_the_last_resort() {
        let mut engine = load(
            "<h2 class=\"media_end_head_headline\">오늘의 소식</h2>\
             <article id=\"dic_area\">국회 본회의가 열렸다</article>",
        )
        .await;
        assert!(is_politics(&mut engine, OutletLayout::naver()).await);
    }

    #[tokio::test]
    async fn no_signal_excludes_the_article() {
        let mut engine = load(
            "<h2 class=\"media_end_head_headline\">날씨</h2>\
             <article id=\"dic_area\">내일은 맑겠습니다</article>",
        )
        .await;
        assert!(!is_politics(&mut engine, OutletLayout::naver()).await);
    }

    #[tokio::test]
    async fn engine_fault_fails_closed() {
        let mut engine = MockEngine::new().fail_after(0);
        assert!(!is_politics(&mut engine, OutletLayout::naver()).await);
    }
}
