use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use super::links::{MAPS_HREF, TRIMBLE_HREF, location_from_href, map_embed_from_href};
use crate::domain::TrailRecord;
use crate::error::ExtractionError;

const CONTAINER: &str = "div.primary";
const ITEM: &str = "li.detail-list__item";
const CONTENT: &str = ".detail-list__content";
const ACTIONS_CLASS: &str = "detail-list__actions-list";

static CONTAINER_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(CONTAINER).unwrap());
static ITEM_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(ITEM).unwrap());
static CONTENT_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(CONTENT).unwrap());
static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
static HREF_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("[href]").unwrap());

/// Parse a hikes listing page into trail records
///
/// # Algorithm
/// 1. Find the primary content container and its trail list items
/// 2. For each item:
///    - Name from the first link's text
///    - Description from the content block, skipping the actions list
///    - Location from the first Google Maps link (item dropped if none)
///    - Map embed from the first Trimble Outdoors link
///
/// Records come back in document order.
pub fn extract_trails(html: &str) -> Result<Vec<TrailRecord>, ExtractionError> {
    let document = Html::parse_document(html);

    let container = document
        .select(&CONTAINER_SEL)
        .next()
        .ok_or(ExtractionError::MissingContainer(CONTAINER))?;

    let items: Vec<ElementRef> = container.select(&ITEM_SEL).collect();
    if items.is_empty() {
        return Err(ExtractionError::NoItems(ITEM));
    }

    let mut trails = Vec::with_capacity(items.len());
    let mut dropped = 0;

    for item in items {
        match trail_from_item(item) {
            Some(trail) => trails.push(trail),
            None => dropped += 1,
        }
    }

    tracing::info!(kept = trails.len(), dropped, "extracted trails from listing");
    Ok(trails)
}

fn trail_from_item(item: ElementRef) -> Option<TrailRecord> {
    let name = item
        .select(&LINK_SEL)
        .next()
        .map(|link| normalize_whitespace(link.text()))
        .unwrap_or_default();

    let Some(content) = item.select(&CONTENT_SEL).next() else {
        tracing::debug!(%name, "trail item has no content block, skipping");
        return None;
    };

    let Some(location) = first_href(content, |href| MAPS_HREF.is_match(href))
        .and_then(location_from_href)
    else {
        tracing::debug!(%name, "no usable map link, skipping");
        return None;
    };

    let map_embed =
        first_href(content, |href| TRIMBLE_HREF.is_match(href)).and_then(map_embed_from_href);

    Some(
        TrailRecord::new(name, location)
            .with_description(description_from_content(content))
            .with_map_embed(map_embed),
    )
}

/// Description fragments in document order.
///
/// Direct text children are kept as-is (trimmed), the actions list is skipped
/// entirely, and any other element contributes all of its nested text.
fn description_from_content(content: ElementRef) -> Vec<String> {
    let mut fragments = Vec::new();

    for child in content.children() {
        match child.value() {
            Node::Text(text) => fragments.push(text.trim().to_string()),
            Node::Element(el) if el.classes().any(|c| c == ACTIONS_CLASS) => {}
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    fragments.extend(el.text().map(|s| s.trim().to_string()));
                }
            }
            _ => {}
        }
    }

    fragments.retain(|s| !s.is_empty());
    fragments
}

// Only the first matching link counts, even if it turns out to be unusable.
fn first_href<'a>(content: ElementRef<'a>, matches: impl Fn(&str) -> bool) -> Option<&'a str> {
    content
        .select(&HREF_SEL)
        .filter_map(|el| el.value().attr("href"))
        .find(|href| matches(href))
}

fn normalize_whitespace<'a>(pieces: impl Iterator<Item = &'a str>) -> String {
    pieces
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
