//! Fills the attributes the engine relies on for raw catalog records.
//!
//! Present values are never overwritten and brand is never invented.

use crate::domain::CatalogItem;

const COLOR_WORDS: &[&str] = &[
    "black", "white", "blue", "red", "green", "pink", "purple", "gray", "grey", "beige", "brown",
    "yellow", "orange", "navy", "teal", "burgundy", "ivory", "olive", "cream", "charcoal",
];

const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("tops", &["tee", "shirt", "top", "blouse", "sweater", "sweatshirt", "hoodie", "tank"]),
    ("bottoms", &["jean", "pant", "trouser", "legging", "short", "skirt", "jogger"]),
    ("dresses", &["dress", "romper", "jumpsuit"]),
    ("activewear", &["sport", "active", "yoga", "gym", "workout", "run", "performance"]),
    ("outerwear", &["jacket", "coat", "bomber", "cardigan"]),
];

const BRAND_STYLES: &[(&str, &str)] = &[
    ("alo yoga", "athletic"),
    ("gymshark", "athletic"),
    ("vuori", "athletic"),
    ("princess polly", "casual"),
    ("edikted", "streetwear"),
    ("nakd", "minimalist"),
    ("cupshe", "casual"),
    ("altardstate", "bohemian"),
];

pub fn normalize_item(mut item: CatalogItem) -> CatalogItem {
    if is_blank(&item.color) {
        item.color = Some(color_from_name(&item.name).unwrap_or("unknown").to_owned());
    }
    if is_blank(&item.category) {
        item.category = Some(category_from_name(&item.name).to_owned());
    }
    if is_blank(&item.style) {
        item.style = Some(style_from_brand(item.brand.as_deref()).to_owned());
    }
    if is_blank(&item.fit) {
        item.fit = Some("regular".to_owned());
    }
    if is_blank(&item.subcategory) {
        item.subcategory = Some("other".to_owned());
    }
    if is_blank(&item.price_range) {
        item.price_range = Some(price_range(item.price).to_owned());
    }
    item
}

pub fn color_from_name(name: &str) -> Option<&'static str> {
    let lowered = name.to_lowercase();
    COLOR_WORDS.iter().copied().find(|color| lowered.contains(color))
}

pub fn category_from_name(name: &str) -> &'static str {
    let lowered = name.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| lowered.contains(keyword)))
        .map(|(category, _)| *category)
        .unwrap_or("other")
}

pub fn style_from_brand(brand: Option<&str>) -> &'static str {
    let Some(brand) = brand else {
        return "casual";
    };
    let lowered = brand.to_lowercase();
    BRAND_STYLES
        .iter()
        .find(|(name, _)| lowered.contains(name))
        .map(|(_, style)| *style)
        .unwrap_or("casual")
}

pub fn price_range(price: Option<f64>) -> &'static str {
    match price {
        Some(value) if value.is_finite() && value > 0.0 => {
            if value <= 30.0 {
                "budget"
            } else if value <= 75.0 {
                "mid-range"
            } else if value <= 150.0 {
                "premium"
            } else {
                "luxury"
            }
        }
        _ => "unknown",
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(|value| value.trim().is_empty()).unwrap_or(true)
}
