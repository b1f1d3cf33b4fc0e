//! Per-outlet page layouts as prioritized selector chains.
//!
//! The portal has shipped several article layouts over the years and old
//! articles keep rendering with the markup they were published under, so
//! every field is read through a chain of alternatives: current layout
//! first, then the legacy ones. The first alternative that yields non-empty
//! text wins. Supporting another outlet's layout means adding a new
//! `OutletLayout` value; the traversal code never changes.

use scraper::{ElementRef, Html, Selector};

/// Section id the portal uses for politics listings and article URLs.
pub const POLITICS_SECTION_ID: &str = "100";

/// Ordered selector alternatives for one field.
#[derive(Debug, Clone, Copy)]
pub struct SelectorChain(pub &'static [&'static str]);

impl SelectorChain {
    fn selectors(&self) -> impl Iterator<Item = Selector> + '_ {
        self.0.iter().filter_map(|s| Selector::parse(s).ok())
    }

    /// First non-empty text match in the document.
    pub fn first_text(&self, document: &Html) -> Option<String> {
        for selector in self.selectors() {
            if let Some(text) = document
                .select(&selector)
                .map(element_text)
                .find(|t| !t.is_empty())
            {
                return Some(text);
            }
        }
        None
    }

    /// First non-empty text match under `scope`.
    pub fn first_text_in(&self, scope: ElementRef<'_>) -> Option<String> {
        for selector in self.selectors() {
            if let Some(text) = scope
                .select(&selector)
                .map(element_text)
                .find(|t| !t.is_empty())
            {
                return Some(text);
            }
        }
        None
    }

    /// First attribute value under `scope`.
    pub fn first_attr_in(&self, scope: ElementRef<'_>, attr: &str) -> Option<String> {
        for selector in self.selectors() {
            if let Some(value) = scope
                .select(&selector)
                .find_map(|el| el.value().attr(attr))
            {
                return Some(value.to_string());
            }
        }
        None
    }

    /// All matches of the first alternative that matches anything.
    pub fn all<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        for selector in self.selectors() {
            let matches: Vec<_> = document.select(&selector).collect();
            if !matches.is_empty() {
                return matches;
            }
        }
        Vec::new()
    }
}

pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Selector set for one outlet's listing and article pages.
#[derive(Debug, Clone, Copy)]
pub struct OutletLayout {
    /// Teaser rows on a listing page.
    pub listing_items: &'static str,
    /// Article link inside a teaser row.
    pub teaser_link: SelectorChain,
    /// Numbered pagination links on a listing page.
    pub paging_links: &'static str,
    pub title: SelectorChain,
    pub body: SelectorChain,
    /// Publication and edit timestamps, in display order.
    pub datestamps: SelectorChain,
    pub byline: SelectorChain,
    pub comment_count: SelectorChain,
    pub related_items: SelectorChain,
    pub related_link: SelectorChain,
    pub category_label: SelectorChain,
}

const NAVER: OutletLayout = OutletLayout {
    listing_items: "ul.type06_headline li, ul.type06 li",
    teaser_link: SelectorChain(&["dt a"]),
    paging_links: "div.paging a",
    title: SelectorChain(&[
        "h2.media_end_head_headline",
        "h3.tit_view",
        "div.article_info h3",
    ]),
    body: SelectorChain(&[
        "article#dic_area",
        "div#newsct_article",
        "div#articeBody",
        "div#articleBodyContents",
    ]),
    datestamps: SelectorChain(&[
        "span.media_end_head_info_datestamp_time",
        "span.date",
        "span.t11",
    ]),
    byline: SelectorChain(&["em.media_end_head_journalist_name", "span.writer"]),
    comment_count: SelectorChain(&["a.media_end_head_cmtcount_button", "a.cmt_count"]),
    related_items: SelectorChain(&["li.media_end_linked_item", "li.related_item"]),
    related_link: SelectorChain(&["a.media_end_linked_item_inner", "a.related_tit"]),
    category_label: SelectorChain(&["em.media_end_categorize_item", "a.category_link"]),
};

impl OutletLayout {
    pub fn naver() -> &'static OutletLayout {
        &NAVER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_prefers_earlier_alternatives() {
        let html = Html::parse_document(
            "<h3 class=\"tit_view\">legacy</h3><h2 class=\"media_end_head_headline\">current</h2>",
        );
        assert_eq!(
            OutletLayout::naver().title.first_text(&html),
            Some("current".to_string())
        );
    }

    #[test]
    fn chain_falls_through_empty_matches() {
        let html = Html::parse_document(
            "<h2 class=\"media_end_head_headline\">  </h2><h3 class=\"tit_view\">old layout</h3>",
        );
        assert_eq!(
            OutletLayout::naver().title.first_text(&html),
            Some("old layout".to_string())
        );
    }

    #[test]
    fn chain_yields_none_when_nothing_matches() {
        let html = Html::parse_document("<div>unrelated</div>");
        assert_eq!(OutletLayout::naver().title.first_text(&html), None);
    }
}
