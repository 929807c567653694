//! Recalculation trigger
//!
//! Re-runs the derivation for an option only when the inputs it reads have
//! changed since the last pass, and merges just the derived fields back.

use crate::models::{BudgetContext, DerivedFields, Quote, QuoteOption};
use crate::pricing::{derive, PricingInputs};

/// What a recalculation pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecalcReport {
    pub recomputed: usize,
    pub skipped: usize,
}

/// Replace the derived subset of an option, leaving every other field alone
pub fn apply_derived(option: &mut QuoteOption, derived: DerivedFields) {
    option.derived = derived;
}

/// Returns true when the option was re-derived
pub fn recalculate_option(option: &mut QuoteOption, ctx: &BudgetContext) -> bool {
    let inputs = PricingInputs::capture(option, ctx);
    let fingerprint = inputs.fingerprint();
    if option.fingerprint == Some(fingerprint) {
        return false;
    }
    apply_derived(option, derive(&inputs));
    option.fingerprint = Some(fingerprint);
    true
}

/// Bring every option of the quote up to date with its current inputs
pub fn recalculate(quote: &mut Quote) -> RecalcReport {
    let ctx = &quote.budget;
    let mut report = RecalcReport::default();
    for option in quote.options.iter_mut() {
        if recalculate_option(option, ctx) {
            report.recomputed += 1;
        } else {
            report.skipped += 1;
        }
    }
    report
}

/// Drop cached fingerprints so the next pass re-derives everything
pub fn invalidate(quote: &mut Quote) {
    for option in quote.options.iter_mut() {
        option.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Item, ItemKind};
    use rust_decimal::Decimal;

    fn quote_with_items() -> Quote {
        let mut quote = Quote::new("Q-1");
        quote.budget.package_quantity = 10;
        quote.budget.budget_per_package = Decimal::new(100, 0);
        quote.options[0].items.push(Item {
            id: "p1".to_string(),
            kind: ItemKind::Product,
            name: "Wine".to_string(),
            price: Decimal::new(30, 0),
            ..Default::default()
        });
        quote
    }

    #[test]
    fn test_skips_when_inputs_unchanged() {
        let mut quote = quote_with_items();
        assert_eq!(recalculate(&mut quote).recomputed, 1);

        let second = recalculate(&mut quote);
        assert_eq!(second.recomputed, 0);
        assert_eq!(second.skipped, 1);
    }

    #[test]
    fn test_reruns_on_item_change() {
        let mut quote = quote_with_items();
        recalculate(&mut quote);
        assert_eq!(quote.options[0].derived.products_cost, Decimal::new(30, 0));

        quote.options[0].items[0].price = Decimal::new(45, 0);
        assert_eq!(recalculate(&mut quote).recomputed, 1);
        assert_eq!(quote.options[0].derived.products_cost, Decimal::new(45, 0));
    }

    #[test]
    fn test_reruns_on_quote_context_change() {
        let mut quote = quote_with_items();
        recalculate(&mut quote);
        quote.budget.package_quantity = 20;
        assert_eq!(recalculate(&mut quote).recomputed, 1);
        assert_eq!(quote.options[0].derived.delivery_boxes_count, 20);
    }

    #[test]
    fn test_terminates_after_one_pass() {
        let mut quote = quote_with_items();
        quote.options.push(QuoteOption::new("B"));
        let mut passes = 0;
        while recalculate(&mut quote).recomputed > 0 {
            passes += 1;
            assert!(passes < 3, "recalculation did not settle");
        }
        assert_eq!(passes, 1);
    }

    #[test]
    fn test_merge_keeps_non_derived_fields() {
        let mut quote = quote_with_items();
        recalculate(&mut quote);

        // package identity set between passes, alongside an input change
        let option = &mut quote.options[0];
        option.package_id = Some("recPPPPPPPPPPPPPP".to_string());
        option.image = Some("https://cdn/pkg.png".to_string());
        option.additional_expenses = Decimal::new(4, 0);
        recalculate(&mut quote);

        let option = &quote.options[0];
        assert_eq!(option.package_id.as_deref(), Some("recPPPPPPPPPPPPPP"));
        assert_eq!(option.image.as_deref(), Some("https://cdn/pkg.png"));
        assert_eq!(option.additional_expenses, Decimal::new(4, 0));
    }

    #[test]
    fn test_invalidate_forces_rerun() {
        let mut quote = quote_with_items();
        recalculate(&mut quote);
        quote.options[0].derived = DerivedFields::default();
        invalidate(&mut quote);
        assert_eq!(recalculate(&mut quote).recomputed, 1);
        assert_eq!(quote.options[0].derived.products_cost, Decimal::new(30, 0));
    }
}
