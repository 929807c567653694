//! Catalog models: products, packages and catalogs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::ItemKind;
use crate::types::SortOrder;

/// A catalog product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub details: String,
    pub marketing_description: Option<String>,
    /// Price before VAT
    pub price: Decimal,
    pub product_type: Option<String>,
    /// Over/under stock note
    pub inventory: Option<String>,
    pub boxes_per_carton: u32,
    #[serde(rename = "type")]
    pub kind: ItemKind,
}

impl Product {
    /// Name shown on an option row: marketing description when present
    pub fn display_name(&self) -> &str {
        match self.marketing_description.as_deref() {
            Some(d) if !d.is_empty() => d,
            _ => &self.name,
        }
    }
}

/// A ready-made bundle of products and packaging
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Package {
    pub id: String,
    pub name: String,
    pub package_number: Option<String>,
    pub package_price: Decimal,
    pub items: Vec<Product>,
    pub packaging_items: Vec<Product>,
    pub parallel_packages: Vec<String>,
    pub image_url: Option<String>,
}

/// A named catalog grouping packages
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Catalog {
    pub id: String,
    pub name: String,
}

fn matches_search(haystacks: &[&str], price: Decimal, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    haystacks
        .iter()
        .any(|h| h.to_lowercase().contains(&needle))
        || price.normalize().to_string() == search.trim()
}

/// Search and sort products for the sidebar
pub fn filter_products(products: &[Product], search: &str, sort: SortOrder) -> Vec<Product> {
    let mut filtered: Vec<Product> = products
        .iter()
        .filter(|p| matches_search(&[&p.name, &p.details], p.price, search))
        .cloned()
        .collect();

    match sort {
        SortOrder::PriceHighToLow => filtered.sort_by(|a, b| b.price.cmp(&a.price)),
        SortOrder::PriceLowToHigh => filtered.sort_by(|a, b| a.price.cmp(&b.price)),
        SortOrder::All => {}
    }
    filtered
}

/// Search and sort packages by name and package price
pub fn filter_packages(packages: &[Package], search: &str, sort: SortOrder) -> Vec<Package> {
    let mut filtered: Vec<Package> = packages
        .iter()
        .filter(|p| matches_search(&[&p.name], p.package_price, search))
        .cloned()
        .collect();

    match sort {
        SortOrder::PriceHighToLow => {
            filtered.sort_by(|a, b| b.package_price.cmp(&a.package_price))
        }
        SortOrder::PriceLowToHigh => {
            filtered.sort_by(|a, b| a.package_price.cmp(&b.package_price))
        }
        SortOrder::All => {}
    }
    filtered
}

/// Split products into (regular, packaging/branding)
pub fn split_by_kind(products: &[Product]) -> (Vec<&Product>, Vec<&Product>) {
    products.iter().partition(|p| p.kind != ItemKind::Packaging)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, price: i64, kind: ItemKind) -> Product {
        Product {
            id: format!("rec{:0>14}", name.len()),
            name: name.to_string(),
            price: Decimal::new(price, 0),
            boxes_per_carton: 1,
            kind,
            ..Default::default()
        }
    }

    #[test]
    fn test_filter_products_by_name_case_insensitive() {
        let products = vec![
            product("Red Wine", 80, ItemKind::Product),
            product("Honey", 30, ItemKind::Product),
        ];
        let found = filter_products(&products, "wine", SortOrder::All);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Red Wine");
    }

    #[test]
    fn test_filter_products_by_exact_price() {
        let products = vec![
            product("Red Wine", 80, ItemKind::Product),
            product("Honey", 30, ItemKind::Product),
        ];
        let found = filter_products(&products, "30", SortOrder::All);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Honey");
    }

    #[test]
    fn test_sort_products_by_price() {
        let products = vec![
            product("A", 50, ItemKind::Product),
            product("B", 10, ItemKind::Product),
            product("C", 90, ItemKind::Product),
        ];
        let high = filter_products(&products, "", SortOrder::PriceHighToLow);
        assert_eq!(
            high.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            vec!["C", "A", "B"]
        );
        let low = filter_products(&products, "", SortOrder::PriceLowToHigh);
        assert_eq!(
            low.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            vec!["B", "A", "C"]
        );
    }

    #[test]
    fn test_filter_packages() {
        let packages = vec![
            Package {
                name: "Holiday Box".to_string(),
                package_price: Decimal::new(150, 0),
                ..Default::default()
            },
            Package {
                name: "Mini".to_string(),
                package_price: Decimal::new(60, 0),
                ..Default::default()
            },
        ];
        let found = filter_packages(&packages, "box", SortOrder::All);
        assert_eq!(found.len(), 1);
        let sorted = filter_packages(&packages, "", SortOrder::PriceLowToHigh);
        assert_eq!(sorted[0].name, "Mini");
    }

    #[test]
    fn test_split_by_kind() {
        let products = vec![
            product("Wine", 80, ItemKind::Product),
            product("Box", 8, ItemKind::Packaging),
            product("Honey", 30, ItemKind::Product),
        ];
        let (regular, packaging) = split_by_kind(&products);
        assert_eq!(regular.len(), 2);
        assert_eq!(packaging.len(), 1);
        assert_eq!(packaging[0].name, "Box");
    }

    #[test]
    fn test_display_name_prefers_marketing_description() {
        let mut p = product("Wine", 80, ItemKind::Product);
        assert_eq!(p.display_name(), "Wine");
        p.marketing_description = Some("Cabernet 750ml".to_string());
        assert_eq!(p.display_name(), "Cabernet 750ml");
        p.marketing_description = Some(String::new());
        assert_eq!(p.display_name(), "Wine");
    }
}
