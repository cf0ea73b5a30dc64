use anyhow::anyhow;
use scraper::{ElementRef, Selector};

/// Compiles a CSS selector, keeping the parse error as text.
pub fn parse_selector(css: &str) -> anyhow::Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {css:?}: {e:?}"))
}

/// All text under `node`, trimmed, with non-breaking spaces folded to spaces.
pub fn extract_text(node: ElementRef) -> String {
    node.text()
        .collect::<String>()
        .replace('\u{a0}', " ")
        .trim()
        .to_string()
}

pub fn extract_optional_text(node: Option<ElementRef>) -> Option<String> {
    node.map(extract_text)
}
