//! Quote option: one priced bundle of items

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Item;

/// Outputs of the pricing derivation. Owned by the engine; never edited by hand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DerivedFields {
    pub products_cost: Decimal,
    pub packaging_items_cost: Decimal,
    pub product_quantity: u32,
    pub packaging_work_cost: Decimal,
    pub effective_budget_per_package: Decimal,
    pub cost_price: Decimal,
    pub shipping_cost_per_package: Decimal,
    pub delivery_boxes_count: u32,
    /// Final delivery boxes when overridden, else the computed count
    pub effective_delivery_boxes: u32,
    pub budget_remaining_for_products: Decimal,
    #[serde(alias = "actualProfit")]
    pub profit_per_deal: Decimal,
    /// Fraction of the effective budget (0.5833 means 58.33%)
    pub actual_profit_percentage: Decimal,
    pub total_deal_profit: Decimal,
    #[serde(rename = "revenueWithoutVAT")]
    pub revenue_without_vat: Decimal,
    pub project_price_with_vat: Decimal,
    #[serde(rename = "projectPriceToClientBeforeVAT")]
    pub project_price_to_client_before_vat: Decimal,
    #[serde(rename = "projectPriceToClientWithVAT")]
    pub project_price_to_client_with_vat: Decimal,
    pub items_total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteOption {
    /// Stable local key used to address the option while editing
    pub key: Uuid,
    /// "A", "B", ... by position
    pub label: String,
    /// Record store id, absent until the first save
    pub record_id: Option<String>,
    pub title: String,
    pub package_id: Option<String>,
    pub package_number: Option<String>,
    pub image: Option<String>,
    pub items: Vec<Item>,

    /// `Some` once edited on the option itself; otherwise the quote default applies
    pub profit_target: Option<Decimal>,
    pub agent_commission: Option<Decimal>,
    pub agent: String,
    pub additional_expenses: Decimal,
    pub units_per_carton: Option<u32>,
    pub packaging: String,
    pub delivery_company: String,
    pub shipping_price_to_client: Decimal,
    #[serde(rename = "projectPriceBeforeVAT")]
    pub project_price_before_vat: Decimal,
    pub final_delivery_boxes: Option<u32>,

    pub status: String,
    pub internal_status: String,
    pub comments: String,

    pub derived: DerivedFields,

    pub is_collapsed: bool,
    pub is_irrelevant: bool,

    #[serde(skip)]
    pub(crate) fingerprint: Option<u64>,
}

impl Default for QuoteOption {
    fn default() -> Self {
        Self {
            key: Uuid::new_v4(),
            label: String::new(),
            record_id: None,
            title: String::new(),
            package_id: None,
            package_number: None,
            image: None,
            items: Vec::new(),
            profit_target: None,
            agent_commission: None,
            agent: String::new(),
            additional_expenses: Decimal::ZERO,
            units_per_carton: None,
            packaging: String::new(),
            delivery_company: String::new(),
            shipping_price_to_client: Decimal::ZERO,
            project_price_before_vat: Decimal::ZERO,
            final_delivery_boxes: None,
            status: String::new(),
            internal_status: String::new(),
            comments: String::new(),
            derived: DerivedFields::default(),
            is_collapsed: false,
            is_irrelevant: false,
            fingerprint: None,
        }
    }
}

impl QuoteOption {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Copy for the "duplicate option" action: new key, no record id
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.key = Uuid::new_v4();
        copy.record_id = None;
        copy.title = format!("{} (עותק)", self.title);
        copy.fingerprint = None;
        copy
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn item_position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    /// Whether the option has a record in the store already
    pub fn is_saved(&self) -> bool {
        self.record_id
            .as_deref()
            .is_some_and(crate::validation::is_valid_record_id)
    }

    /// Forget the last seen pricing inputs so the next pass re-derives
    pub fn invalidate(&mut self) {
        self.fingerprint = None;
    }
}

/// Option label for a zero-based position: A..Z, then AA, AB, ...
pub fn option_label(position: usize) -> String {
    let mut n = position;
    let mut label = Vec::new();
    loop {
        label.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    label.reverse();
    String::from_utf8(label).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_labels() {
        assert_eq!(option_label(0), "A");
        assert_eq!(option_label(1), "B");
        assert_eq!(option_label(25), "Z");
        assert_eq!(option_label(26), "AA");
        assert_eq!(option_label(27), "AB");
    }

    #[test]
    fn test_duplicate_drops_record_id() {
        let mut option = QuoteOption::new("A");
        option.title = "Holiday".to_string();
        option.record_id = Some("recAAAAAAAAAAAAAA".to_string());
        option.package_id = Some("recPPPPPPPPPPPPPP".to_string());

        let copy = option.duplicate();
        assert_ne!(copy.key, option.key);
        assert_eq!(copy.record_id, None);
        assert_eq!(copy.title, "Holiday (עותק)");
        assert_eq!(copy.package_id, option.package_id);
    }

    #[test]
    fn test_option_json_uses_camel_case() {
        let option = QuoteOption::new("A");
        let json = serde_json::to_value(&option).unwrap();
        assert!(json.get("unitsPerCarton").is_some());
        assert!(json.get("projectPriceBeforeVAT").is_some());
        assert!(json["derived"].get("budgetRemainingForProducts").is_some());
        assert!(json.get("fingerprint").is_none());
    }

    #[test]
    fn test_is_saved() {
        let mut option = QuoteOption::new("A");
        assert!(!option.is_saved());
        option.record_id = Some("temp-1".to_string());
        assert!(!option.is_saved());
        option.record_id = Some("recAbCdEfGhIjKlMn".to_string());
        assert!(option.is_saved());
    }
}
