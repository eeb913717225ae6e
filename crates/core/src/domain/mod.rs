pub mod item;

pub use item::{Attribute, CatalogItem, ItemId};
