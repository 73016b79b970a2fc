use scraper::{ElementRef, Html, Selector};
use snip_core::metadata::NO_TITLE;
use snip_core::WebsiteMetadata;
use std::sync::LazyLock;
use url::Url;

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("title selector is valid"));
static LINK_WITH_REL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("link[rel]").expect("link selector is valid"));
static BASE_WITH_HREF: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("base[href]").expect("base selector is valid"));

/// Extracts the title and favicon from an HTML document.
///
/// `page_url` is the URL the document was served from. Relative favicon
/// paths are resolved against it, or against the document's `<base href>`
/// when present.
pub fn parse_metadata(html: &str, page_url: &Url) -> WebsiteMetadata {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE)
        .next()
        .map(|title| title.text().collect::<String>().trim().to_string())
        .unwrap_or_else(|| NO_TITLE.to_string());

    let base = base_url(&document, page_url);
    let favicon = document
        .select(&LINK_WITH_REL)
        .find(is_shortcut_icon)
        .and_then(|link| link.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .and_then(|href| base.join(href).ok())
        .map(String::from);

    WebsiteMetadata { title, favicon }
}

fn base_url(document: &Html, page_url: &Url) -> Url {
    document
        .select(&BASE_WITH_HREF)
        .next()
        .and_then(|base| base.value().attr("href"))
        .and_then(|href| page_url.join(href.trim()).ok())
        .unwrap_or_else(|| page_url.clone())
}

fn is_shortcut_icon(link: &ElementRef<'_>) -> bool {
    let Some(rel) = link.value().attr("rel") else {
        return false;
    };
    let mut tokens = rel.split_ascii_whitespace();
    matches!(
        (tokens.next(), tokens.next(), tokens.next()),
        (Some(first), Some(second), None)
            if first.eq_ignore_ascii_case("shortcut") && second.eq_ignore_ascii_case("icon")
    )
}
