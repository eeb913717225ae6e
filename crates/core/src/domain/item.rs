use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Attribute dimensions that drive preference learning and similarity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Category,
    Subcategory,
    Brand,
    Style,
    Color,
    PriceRange,
}

impl Attribute {
    pub const ALL: [Attribute; 6] = [
        Attribute::Category,
        Attribute::Subcategory,
        Attribute::Brand,
        Attribute::Style,
        Attribute::Color,
        Attribute::PriceRange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Category => "category",
            Attribute::Subcategory => "subcategory",
            Attribute::Brand => "brand",
            Attribute::Style => "style",
            Attribute::Color => "color",
            Attribute::PriceRange => "price_range",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub price_range: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub fit: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub product_url: Option<String>,
}

impl CatalogItem {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            brand: None,
            category: None,
            subcategory: None,
            style: None,
            color: None,
            price_range: None,
            price: None,
            fit: None,
            image_url: None,
            product_url: None,
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match attribute {
            Attribute::Category => self.category = value,
            Attribute::Subcategory => self.subcategory = value,
            Attribute::Brand => self.brand = value,
            Attribute::Style => self.style = value,
            Attribute::Color => self.color = value,
            Attribute::PriceRange => self.price_range = value,
        }
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Attribute value, or `None` when absent or blank.
    pub fn attribute(&self, attribute: Attribute) -> Option<&str> {
        let raw = match attribute {
            Attribute::Category => self.category.as_deref(),
            Attribute::Subcategory => self.subcategory.as_deref(),
            Attribute::Brand => self.brand.as_deref(),
            Attribute::Style => self.style.as_deref(),
            Attribute::Color => self.color.as_deref(),
            Attribute::PriceRange => self.price_range.as_deref(),
        };
        raw.filter(|value| !value.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::{Attribute, CatalogItem, ItemId};

    #[test]
    fn blank_attributes_read_as_missing() {
        let item = CatalogItem::new("a", "Ribbed Tank")
            .with_attribute(Attribute::Brand, "  ")
            .with_attribute(Attribute::Color, "black");

        assert_eq!(item.attribute(Attribute::Brand), None);
        assert_eq!(item.attribute(Attribute::Color), Some("black"));
        assert_eq!(item.attribute(Attribute::Style), None);
    }

    #[test]
    fn item_id_serializes_as_plain_string() {
        let encoded = serde_json::to_string(&ItemId::new("sku-1")).expect("encode");
        assert_eq!(encoded, "\"sku-1\"");
    }

    #[test]
    fn sparse_catalog_record_deserializes() {
        let item: CatalogItem =
            serde_json::from_str(r#"{"id":"x1","name":"Linen Shirt","category":"tops"}"#)
                .expect("decode");
        assert_eq!(item.id, ItemId::new("x1"));
        assert_eq!(item.attribute(Attribute::Category), Some("tops"));
        assert_eq!(item.price, None);
    }
}
