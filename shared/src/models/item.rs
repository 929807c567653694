//! Option line items

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product types that classify an item as packaging or branding
/// (packaging, branding, cataloging)
pub const PACKAGING_TYPE_KEYWORDS: &[&str] = &["אריזה", "מיתוג", "קיטלוג"];

/// Which cost bucket an item rolls into
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    #[default]
    Product,
    Packaging,
}

impl ItemKind {
    /// Classify a catalog product type. Substring match, so "אריזה ממותגת"
    /// counts as packaging.
    pub fn from_product_type(product_type: Option<&str>) -> Self {
        match product_type {
            Some(t) if PACKAGING_TYPE_KEYWORDS.iter().any(|k| t.contains(k)) => {
                ItemKind::Packaging
            }
            _ => ItemKind::Product,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Product => "product",
            ItemKind::Packaging => "packaging",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "product" => Some(ItemKind::Product),
            "packaging" => Some(ItemKind::Packaging),
            _ => None,
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One line (product or packaging) inside an option
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Item {
    /// Record id for catalog items, locally generated for custom rows
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub name: String,
    pub details: String,
    pub price: Decimal,
    pub product_type: Option<String>,
    pub boxes_per_carton: Option<u32>,
    pub is_custom: bool,
    /// Name, details and price can be edited in place
    pub is_editable: bool,
}

impl Item {
    /// An empty free-text row
    pub fn custom(kind: ItemKind) -> Self {
        Self {
            id: format!("custom-{}-{}", kind, Uuid::new_v4().simple()),
            kind,
            is_custom: true,
            is_editable: true,
            ..Default::default()
        }
    }

    /// Copy of this row with a new id derived from the original
    pub fn duplicate(&self) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self {
            id: format!("{}-copy-{}", self.id, &suffix[..8]),
            ..self.clone()
        }
    }

    pub fn is_packaging(&self) -> bool {
        self.kind == ItemKind::Packaging
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_product_type() {
        assert_eq!(ItemKind::from_product_type(Some("אריזה")), ItemKind::Packaging);
        assert_eq!(ItemKind::from_product_type(Some("מיתוג לוגו")), ItemKind::Packaging);
        assert_eq!(ItemKind::from_product_type(Some("קיטלוג")), ItemKind::Packaging);
        assert_eq!(ItemKind::from_product_type(Some("יין")), ItemKind::Product);
        assert_eq!(ItemKind::from_product_type(Some("")), ItemKind::Product);
        assert_eq!(ItemKind::from_product_type(None), ItemKind::Product);
    }

    #[test]
    fn test_custom_item_is_editable() {
        let item = Item::custom(ItemKind::Packaging);
        assert!(item.id.starts_with("custom-packaging-"));
        assert!(item.is_custom);
        assert!(item.is_editable);
        assert_eq!(item.price, Decimal::ZERO);
    }

    #[test]
    fn test_duplicate_derives_id() {
        let item = Item {
            id: "recAAAAAAAAAAAAAA".to_string(),
            name: "Olive oil".to_string(),
            price: Decimal::new(25, 0),
            ..Default::default()
        };
        let copy = item.duplicate();
        assert!(copy.id.starts_with("recAAAAAAAAAAAAAA-copy-"));
        assert_ne!(copy.id, item.id);
        assert_eq!(copy.name, item.name);
        assert_eq!(copy.price, item.price);
    }
}
