//! Quote record

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{option_label, QuoteOption};
use crate::types::DEFAULT_PROFIT_TARGET;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub notes: String,
    pub preferences: String,
    pub celebration: String,
    pub gift_recipients: String,
    pub card: String,
    pub sticker: String,
    pub preferred_packaging: String,
    pub occasion: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryDetails {
    pub address: String,
    pub date: String,
    pub time: String,
    pub distribution: String,
}

/// Budget inputs shared by every option of a quote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase", default)]
pub struct BudgetContext {
    pub package_quantity: u32,
    /// VAT-inclusive when `include_vat` is set
    pub budget_per_package: Decimal,
    #[serde(rename = "includeVAT")]
    pub include_vat: bool,
    pub include_shipping: bool,
    /// Whole percent (36 means 36%)
    pub profit_target: Decimal,
    pub agent_commission: Decimal,
}

impl Default for BudgetContext {
    fn default() -> Self {
        Self {
            package_quantity: 0,
            budget_per_package: Decimal::ZERO,
            include_vat: false,
            include_shipping: false,
            profit_target: DEFAULT_PROFIT_TARGET,
            agent_commission: Decimal::ZERO,
        }
    }
}

impl BudgetContext {
    /// Profit target of an option, falling back to the quote default
    pub fn profit_target_for(&self, option: &QuoteOption) -> Decimal {
        option.profit_target.unwrap_or(self.profit_target)
    }

    pub fn agent_commission_for(&self, option: &QuoteOption) -> Decimal {
        option.agent_commission.unwrap_or(self.agent_commission)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Quote {
    /// Record store id, absent until the first save
    pub id: Option<String>,
    pub quote_number: String,
    pub customer: Customer,
    pub delivery: DeliveryDetails,
    #[serde(flatten)]
    pub budget: BudgetContext,
    #[serde(rename = "budgetBeforeVAT")]
    pub budget_before_vat: Option<Decimal>,
    #[serde(rename = "budgetWithVAT")]
    pub budget_with_vat: Option<Decimal>,
    pub agent: String,
    pub status: String,
    pub comments: String,
    pub opportunity_id: Option<String>,
    /// Never empty; the first option is the primary one
    pub options: Vec<QuoteOption>,
}

impl Default for Quote {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl Quote {
    /// A new unsaved quote with a single empty option "A"
    pub fn new(quote_number: impl Into<String>) -> Self {
        Self {
            id: None,
            quote_number: quote_number.into(),
            customer: Customer::default(),
            delivery: DeliveryDetails::default(),
            budget: BudgetContext::default(),
            budget_before_vat: None,
            budget_with_vat: None,
            agent: String::new(),
            status: String::new(),
            comments: String::new(),
            opportunity_id: None,
            options: vec![QuoteOption::new("A")],
        }
    }

    /// Restore the non-empty invariant after deserialization
    pub fn ensure_option(&mut self) {
        if self.options.is_empty() {
            self.options.push(QuoteOption::new("A"));
        }
    }

    pub fn relabel_options(&mut self) {
        for (i, option) in self.options.iter_mut().enumerate() {
            option.label = option_label(i);
        }
    }

    pub fn option(&self, key: Uuid) -> Option<&QuoteOption> {
        self.options.iter().find(|o| o.key == key)
    }

    pub fn option_mut(&mut self, key: Uuid) -> Option<&mut QuoteOption> {
        self.options.iter_mut().find(|o| o.key == key)
    }

    pub fn option_position(&self, key: Uuid) -> Option<usize> {
        self.options.iter().position(|o| o.key == key)
    }

    pub fn relevant_options(&self) -> impl Iterator<Item = &QuoteOption> {
        self.options.iter().filter(|o| !o.is_irrelevant)
    }

    pub fn irrelevant_options(&self) -> impl Iterator<Item = &QuoteOption> {
        self.options.iter().filter(|o| o.is_irrelevant)
    }

    pub fn is_saved(&self) -> bool {
        self.id
            .as_deref()
            .is_some_and(crate::validation::is_valid_record_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_quote_has_one_option() {
        let quote = Quote::new("Q-1001");
        assert_eq!(quote.options.len(), 1);
        assert_eq!(quote.options[0].label, "A");
        assert_eq!(quote.budget.profit_target, Decimal::new(36, 0));
        assert!(!quote.is_saved());
    }

    #[test]
    fn test_budget_is_flattened() {
        let json = r#"{
            "quoteNumber": "Q-7",
            "packageQuantity": 50,
            "budgetPerPackage": "120",
            "includeVAT": true,
            "options": []
        }"#;
        let mut quote: Quote = serde_json::from_str(json).unwrap();
        assert_eq!(quote.budget.package_quantity, 50);
        assert_eq!(quote.budget.budget_per_package, Decimal::new(120, 0));
        assert!(quote.budget.include_vat);
        assert_eq!(quote.budget.profit_target, Decimal::new(36, 0));
        assert!(quote.options.is_empty());

        quote.ensure_option();
        assert_eq!(quote.options.len(), 1);
    }

    #[test]
    fn test_override_falls_back_to_quote_default() {
        let ctx = BudgetContext {
            agent_commission: Decimal::new(5, 0),
            ..Default::default()
        };
        let mut option = QuoteOption::new("A");
        assert_eq!(ctx.profit_target_for(&option), Decimal::new(36, 0));
        assert_eq!(ctx.agent_commission_for(&option), Decimal::new(5, 0));

        option.profit_target = Some(Decimal::new(20, 0));
        assert_eq!(ctx.profit_target_for(&option), Decimal::new(20, 0));
    }

    #[test]
    fn test_relevant_grouping() {
        let mut quote = Quote::new("Q-1");
        quote.options.push(QuoteOption::new("B"));
        quote.options[1].is_irrelevant = true;
        assert_eq!(quote.relevant_options().count(), 1);
        assert_eq!(quote.irrelevant_options().count(), 1);
    }
}
