//! Pricing derivation engine
//!
//! Pure functions from an option's inputs and its quote's budget context to
//! the option's derived fields. Every division is guarded: a zero denominator
//! yields zero. Arithmetic that would overflow `Decimal` also yields zero.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rust_decimal::Decimal;

use crate::models::{BudgetContext, DerivedFields, ItemKind, QuoteOption};
use crate::types::VAT_MULTIPLIER;

/// Packaging item name marker ("box") that raises the packaging work tariff
pub const BOX_KEYWORD: &str = "קופסה";

/// Project prices below this get the small-project margin
pub const SMALL_PROJECT_THRESHOLD: Decimal = Decimal::from_parts(600, 0, 0, false, 0);

/// Margin applied to small project prices
pub const SMALL_PROJECT_MARGIN: Decimal = Decimal::from_parts(11, 0, 0, false, 1);

const WORK_COST_PER_PRODUCT: Decimal = Decimal::from_parts(5, 0, 0, false, 1);
const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// The subset of an item the engine reads
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemSnapshot {
    pub id: String,
    pub kind: ItemKind,
    pub name: String,
    pub price: Decimal,
}

/// Every value the derivation reads, and nothing else
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PricingInputs {
    pub items: Vec<ItemSnapshot>,
    /// Resolved: option override or quote default, whole percent
    pub profit_target: Decimal,
    pub agent_commission: Decimal,
    pub additional_expenses: Decimal,
    pub units_per_carton: Option<u32>,
    pub shipping_price_to_client: Decimal,
    pub project_price_before_vat: Decimal,
    pub final_delivery_boxes: Option<u32>,
    pub budget: BudgetContext,
}

impl PricingInputs {
    pub fn capture(option: &QuoteOption, ctx: &BudgetContext) -> Self {
        Self {
            items: option
                .items
                .iter()
                .map(|i| ItemSnapshot {
                    id: i.id.clone(),
                    kind: i.kind,
                    name: i.name.clone(),
                    price: i.price,
                })
                .collect(),
            profit_target: ctx.profit_target_for(option),
            agent_commission: ctx.agent_commission_for(option),
            additional_expenses: option.additional_expenses,
            units_per_carton: option.units_per_carton,
            shipping_price_to_client: option.shipping_price_to_client,
            project_price_before_vat: option.project_price_before_vat,
            final_delivery_boxes: option.final_delivery_boxes,
            budget: ctx.clone(),
        }
    }

    /// Content hash used to detect input changes between passes
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

fn div_or_zero(numerator: Decimal, denominator: Decimal) -> Decimal {
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}

fn mul_or_zero(a: Decimal, b: Decimal) -> Decimal {
    a.checked_mul(b).unwrap_or(Decimal::ZERO)
}

fn sum_or_zero<I: IntoIterator<Item = Decimal>>(terms: I) -> Decimal {
    terms
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, t| acc.checked_add(t))
        .unwrap_or(Decimal::ZERO)
}

/// `minuend` less every term, zero on overflow
fn less_or_zero(minuend: Decimal, terms: &[Decimal]) -> Decimal {
    terms
        .iter()
        .try_fold(minuend, |acc, t| acc.checked_sub(*t))
        .unwrap_or(Decimal::ZERO)
}

/// VAT-exclusive working budget per package
pub fn effective_budget(ctx: &BudgetContext) -> Decimal {
    if ctx.include_vat {
        div_or_zero(ctx.budget_per_package, VAT_MULTIPLIER)
    } else {
        ctx.budget_per_package
    }
}

/// Fixed tariff: half a unit per product plus 2 with a box, else 1
pub fn packaging_work_cost(items: &[ItemSnapshot]) -> Decimal {
    let product_quantity = items.iter().filter(|i| i.kind != ItemKind::Packaging).count();
    let has_box = items
        .iter()
        .any(|i| i.kind == ItemKind::Packaging && i.name.contains(BOX_KEYWORD));
    let base = if has_box { Decimal::TWO } else { Decimal::ONE };
    sum_or_zero([mul_or_zero(Decimal::from(product_quantity), WORK_COST_PER_PRODUCT), base])
}

/// Cartons needed, rounding up. Missing or zero units per carton count as 1.
pub fn delivery_boxes(package_quantity: u32, units_per_carton: Option<u32>) -> u32 {
    let units = match units_per_carton {
        Some(u) if u > 0 => u,
        _ => 1,
    };
    package_quantity.div_ceil(units)
}

pub fn shipping_cost_per_package(ctx: &BudgetContext, shipping_price_to_client: Decimal) -> Decimal {
    if !ctx.include_shipping {
        return Decimal::ZERO;
    }
    div_or_zero(shipping_price_to_client, Decimal::from(ctx.package_quantity))
}

/// Target cost envelope after profit target and agent commission
pub fn cost_price(effective_budget: Decimal, profit_target: Decimal, agent_commission: Decimal) -> Decimal {
    let share = less_or_zero(
        Decimal::ONE,
        &[div_or_zero(profit_target, HUNDRED), div_or_zero(agent_commission, HUNDRED)],
    );
    mul_or_zero(effective_budget, share)
}

/// Small-project margin on the raw project price
pub fn project_price_to_client(project_price_before_vat: Decimal) -> Decimal {
    if project_price_before_vat < SMALL_PROJECT_THRESHOLD {
        mul_or_zero(project_price_before_vat, SMALL_PROJECT_MARGIN)
    } else {
        project_price_before_vat
    }
}

pub fn with_vat(amount: Decimal) -> Decimal {
    mul_or_zero(amount, VAT_MULTIPLIER)
}

/// VAT-inclusive budget shown next to a VAT-exclusive entry, rounded to agorot
pub fn budget_with_vat(before_vat: Decimal) -> Decimal {
    with_vat(before_vat).round_dp(2)
}

pub fn budget_before_vat(with_vat: Decimal) -> Decimal {
    div_or_zero(with_vat, VAT_MULTIPLIER).round_dp(2)
}

/// Compute every derived field from a snapshot of the inputs
pub fn derive(inputs: &PricingInputs) -> DerivedFields {
    let ctx = &inputs.budget;

    let (packaging, products): (Vec<&ItemSnapshot>, Vec<&ItemSnapshot>) = inputs
        .items
        .iter()
        .partition(|i| i.kind == ItemKind::Packaging);
    let products_cost = sum_or_zero(products.iter().map(|i| i.price));
    let packaging_items_cost = sum_or_zero(packaging.iter().map(|i| i.price));
    let product_quantity = products.len() as u32;

    let effective = effective_budget(ctx);
    let work_cost = packaging_work_cost(&inputs.items);

    let delivery_boxes_count = delivery_boxes(ctx.package_quantity, inputs.units_per_carton);
    let effective_delivery_boxes = inputs.final_delivery_boxes.unwrap_or(delivery_boxes_count);

    let shipping = shipping_cost_per_package(ctx, inputs.shipping_price_to_client);
    let cost_price = cost_price(effective, inputs.profit_target, inputs.agent_commission);

    let budget_remaining_for_products = less_or_zero(
        cost_price,
        &[
            shipping,
            products_cost,
            packaging_items_cost,
            inputs.additional_expenses,
            work_cost,
        ],
    );

    let commission_amount = mul_or_zero(div_or_zero(inputs.agent_commission, HUNDRED), effective);
    let profit_per_deal = less_or_zero(
        effective,
        &[
            shipping,
            products_cost,
            inputs.additional_expenses,
            packaging_items_cost,
            work_cost,
            commission_amount,
        ],
    );

    let actual_profit_percentage = div_or_zero(profit_per_deal, effective);
    let quantity = Decimal::from(ctx.package_quantity);
    let total_deal_profit = mul_or_zero(quantity, profit_per_deal);

    let to_client_before_vat = project_price_to_client(inputs.project_price_before_vat);
    let revenue_without_vat = sum_or_zero([mul_or_zero(effective, quantity), to_client_before_vat]);

    DerivedFields {
        products_cost,
        packaging_items_cost,
        product_quantity,
        packaging_work_cost: work_cost,
        effective_budget_per_package: effective,
        cost_price,
        shipping_cost_per_package: shipping,
        delivery_boxes_count,
        effective_delivery_boxes,
        budget_remaining_for_products,
        profit_per_deal,
        actual_profit_percentage,
        total_deal_profit,
        revenue_without_vat,
        project_price_with_vat: with_vat(inputs.project_price_before_vat),
        project_price_to_client_before_vat: to_client_before_vat,
        project_price_to_client_with_vat: with_vat(to_client_before_vat),
        items_total: sum_or_zero([products_cost, packaging_items_cost]),
    }
}

/// Derive from an option in place of building the snapshot by hand
pub fn derive_option(option: &QuoteOption, ctx: &BudgetContext) -> DerivedFields {
    derive(&PricingInputs::capture(option, ctx))
}
