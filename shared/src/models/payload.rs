//! Catalog drag-and-drop payloads

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Item, ItemKind, Package, Product};

/// Product type of the outer carton/wrap. Dropping an item of exactly this
/// type sets the option's packaging name and units per carton.
pub const CARTON_PACKAGING_TYPE: &str = "אריזה";

/// A single catalog product dropped onto an option
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SingleItemPayload {
    pub id: String,
    pub name: String,
    pub marketing_description: Option<String>,
    pub details: String,
    pub price: Decimal,
    pub product_type: Option<String>,
    pub boxes_per_carton: Option<u32>,
}

/// A whole package dropped onto an option
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PackagePayload {
    pub id: String,
    pub name: String,
    pub package_price: Decimal,
    pub image_url: Option<String>,
    pub items: Vec<SingleItemPayload>,
    pub packaging_items: Vec<SingleItemPayload>,
    pub package_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropPayload {
    SingleItem(SingleItemPayload),
    Package(PackagePayload),
}

impl SingleItemPayload {
    pub fn kind(&self) -> ItemKind {
        ItemKind::from_product_type(self.product_type.as_deref())
    }

    /// Whether this is the outer carton that determines units per carton
    pub fn is_carton(&self) -> bool {
        self.product_type.as_deref() == Some(CARTON_PACKAGING_TYPE)
    }

    pub fn to_item(&self) -> Item {
        self.to_item_as(self.kind())
    }

    /// Builds the item in a fixed cost bucket, ignoring its product type
    pub fn to_item_as(&self, kind: ItemKind) -> Item {
        let name = match self.marketing_description.as_deref() {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => self.name.clone(),
        };
        Item {
            id: self.id.clone(),
            kind,
            name,
            details: self.details.clone(),
            price: self.price,
            product_type: self.product_type.clone(),
            boxes_per_carton: self.boxes_per_carton,
            is_custom: false,
            is_editable: false,
        }
    }
}

impl PackagePayload {
    /// Products first, then packaging, each in catalog order. The list an
    /// entry comes from decides its kind.
    pub fn to_items(&self) -> Vec<Item> {
        let products = self.items.iter().map(|p| p.to_item_as(ItemKind::Product));
        let packaging = self
            .packaging_items
            .iter()
            .map(|p| p.to_item_as(ItemKind::Packaging));
        products.chain(packaging).collect()
    }

    /// The outer carton, looked up among packaging items only
    pub fn carton(&self) -> Option<&SingleItemPayload> {
        self.packaging_items.iter().find(|p| p.is_carton())
    }
}

impl From<&Product> for SingleItemPayload {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            marketing_description: p.marketing_description.clone(),
            details: p.details.clone(),
            price: p.price,
            product_type: p.product_type.clone(),
            boxes_per_carton: Some(p.boxes_per_carton),
        }
    }
}

impl From<&Package> for PackagePayload {
    fn from(p: &Package) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            package_price: p.package_price,
            image_url: p.image_url.clone(),
            items: p.items.iter().map(SingleItemPayload::from).collect(),
            packaging_items: p.packaging_items.iter().map(SingleItemPayload::from).collect(),
            package_number: p.package_number.clone(),
        }
    }
}
