//! Mapping between quote records in the store and the in-memory quote tree
//!
//! Field names are the store's (Hebrew) column names. Percentages are stored
//! as fractions (0.36) and held in memory as whole percents (36). Only input
//! columns are ever written; formula and lookup columns are read-only on the
//! store side.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use shared::{
    is_valid_record_id, option_label, BudgetContext, Catalog, Customer, DeliveryDetails, Item,
    ItemKind, Package, Product, Quote, QuoteOption, DEFAULT_PROFIT_TARGET,
};

use crate::external::record_store::{
    attachment_url, count, decimal_value, flag, links, number, opt_number, opt_text, text, Fields,
    Record,
};

pub mod quote_fields {
    pub const QUOTE_NUMBER: &str = "מספר הצעה";
    pub const CUSTOMER_NAME: &str = "שם לקוח";
    pub const CONTACT_PHONE: &str = "מספר טלפון איש קשר";
    pub const CONTACT: &str = "איש קשר";
    pub const DELIVERY_DATE: &str = "תאריך אספקה";
    pub const PACKAGE_QUANTITY: &str = "כמות מארזים";
    pub const BUDGET_PER_PACKAGE: &str = "תקציב למארז";
    pub const AGENT_COMMISSION: &str = "עמלת סוכן";
    pub const AGENT: &str = "סוכן";
    pub const CARD: &str = "גלוית לקוח";
    pub const STICKER: &str = "מדבקת לקוח";
    pub const STATUS: &str = "סטאטוס";
    pub const COMMENTS: &str = "חידודי לקוח להצעה";
    pub const OPPORTUNITIES: &str = "הזדמנויות מכירה";
    pub const OPTIONS: &str = "אופציות להצעת מחיר 4";
}

pub mod opportunity_fields {
    pub const FULL_NAME: &str = "שם מלא";
    pub const EMAIL: &str = "Email";
    pub const PHONE: &str = "טלפון";
    pub const COMPANY: &str = "שם חברה";
    pub const REQUESTED_DELIVERY_DATE: &str = "תאריך אספקה מבוקש";
    pub const DELIVERY_TIME: &str = "שעת אספקה";
    pub const PACKAGE_QUANTITY: &str = "כמות מארזים";
    pub const BUDGET: &str = "תקציב";
    pub const BUDGET_BEFORE_VAT: &str = "תקציב למארז לפני מע\"מ";
    pub const BUDGET_WITH_VAT: &str = "תקציב למארז כולל מעמ";
    pub const INCLUDE_VAT: &str = "מחירים כולל מע\"מ";
    pub const INCLUDE_SHIPPING: &str = "תקציב כולל משלוח";
    pub const AGENT: &str = "סוכן";
    pub const DELIVERY_ADDRESS: &str = "כתובת אספקה";
    pub const DISTRIBUTION: &str = "הפצה";
    pub const NOTES: &str = "דגשים מהלקוח";
    pub const PREFERENCES: &str = "דגשים והעדפות";
    pub const CELEBRATION: &str = "מה חוגגים";
    pub const GIFT_RECIPIENTS: &str = "מי מקבל את המתנות";
    pub const CARD: &str = "גלוית לקוח";
    pub const STICKER: &str = "מדבקת לקוח";
    pub const PREFERRED_PACKAGING: &str = "סוג אריזה מועדף";
    pub const OCCASION: &str = "מועד";
}

pub mod option_fields {
    pub const OPTION_LETTER: &str = "Option Letter";
    pub const TITLE: &str = "כותרת אופציה";
    pub const QUOTE_LINK: &str = "קישור להצעת מחיר";
    pub const CUSTOMER_NAME: &str = "שם לקוח";
    pub const PACKAGE: &str = "שם מארז";
    pub const PRODUCTS: &str = "מוצרים";
    pub const PACKAGING_PRODUCTS: &str = "מוצרי אריזה ומיתוג copy";
    pub const PROFIT_TARGET: &str = "יעד רווחיות";
    pub const AGENT: &str = "סוכן";
    pub const AGENT_COMMISSION: &str = "עמלת סוכן %";
    pub const ADDITIONAL_EXPENSES: &str = "הוצאות נוספות";
    pub const DELIVERY_COMPANY: &str = "חברת משלוחים";
    /// Lookup from the packaging product
    pub const PACKAGING: &str = "אריזה";
    /// Lookup from the packaging product
    pub const UNITS_PER_CARTON: &str = "כמות שנכנסת בקרטון";
    pub const FINAL_DELIVERY_BOXES: &str = "כמות קרטונים סופית להובלה";
    pub const SHIPPING_PRICE_TO_CLIENT: &str = "תמחור משלוח ללקוח";
    pub const PROJECT_PRICE_BEFORE_VAT: &str = "תמחור לפרויקט לפני מע\"מ";
    pub const PACKAGE_NUMBER: &str = "מספר מארז";
    pub const PACKAGE_IMAGE: &str = "תמונת מארז";
    pub const STATUS: &str = "סטאטוס";
    pub const INTERNAL_STATUS: &str = "סטטוס פנימי";
    pub const COMMENTS: &str = "חידודי לקוח לאופציה";
}

pub mod product_fields {
    pub const NAME: &str = "מוצר";
    pub const ALT_NAME: &str = "שם מוצר";
    pub const DETAILS: &str = "פירוט";
    pub const SIZE: &str = "גודל";
    pub const MARKETING_DESCRIPTION: &str = "תיאור שיווקי";
    pub const PRICE_BEFORE_VAT: &str = "מחיר לפני מעמ";
    pub const PRODUCT_TYPE: &str = "סוג מוצר";
    pub const INVENTORY: &str = "מלאי יתר/חסר";
    pub const BOXES_PER_CARTON: &str = "כמות בקרטון";
}

pub mod package_fields {
    pub const NAME: &str = "שם";
    pub const PACKAGE_NUMBER: &str = "מספר מארז";
    pub const PRICE: &str = "מחיר בש\"ח";
    pub const PRODUCTS: &str = "מוצרים";
    pub const PACKAGING_PRODUCTS: &str = "מוצרי מיתוג ואריזה";
    pub const PARALLEL: &str = "מארז מקביל";
    pub const IMAGE: &str = "Attachments";
    pub const ACTIVE: &str = "פעיל";
}

pub mod catalog_fields {
    pub const NAME: &str = "שם הקטלוג";
    pub const PACKAGES: &str = "מארזים";
}

/// Filter selecting packages marked active
pub const ACTIVE_PACKAGES_FORMULA: &str = "{פעיל} = TRUE()";

/// Cap on the unfiltered package listing used when the active filter is rejected
pub const PACKAGE_FALLBACK_LIMIT: usize = 20;

const DEFAULT_CUSTOMER_NAME: &str = "לקוח חדש";
const UNNAMED_PRODUCT: &str = "מוצר ללא שם";
const UNNAMED_PACKAGE: &str = "מארז ללא שם";
const UNNAMED_CATALOG: &str = "קטלוג ללא שם";

fn to_percent(fraction: Decimal) -> Decimal {
    fraction * Decimal::ONE_HUNDRED
}

fn to_fraction(percent: Decimal) -> Decimal {
    percent / Decimal::ONE_HUNDRED
}

/// First non-empty text among the record's fields, in order
fn first_text(sources: &[(&Fields, &str)]) -> String {
    sources
        .iter()
        .find_map(|(fields, name)| opt_text(fields, name))
        .unwrap_or_default()
}

fn first_number(sources: &[(&Fields, &str)]) -> Option<Decimal> {
    sources
        .iter()
        .find_map(|(fields, name)| opt_number(fields, name).filter(|n| !n.is_zero()))
}

/// `OR(RECORD_ID()='a',RECORD_ID()='b')`
pub fn record_id_formula(ids: &[String]) -> String {
    let clauses: Vec<String> = ids
        .iter()
        .map(|id| format!("RECORD_ID()='{}'", id.replace('\'', "")))
        .collect();
    format!("OR({})", clauses.join(","))
}

/// Listed packages restricted to the active ones
pub fn active_among_formula(ids: &[String]) -> String {
    format!("AND({}, {})", record_id_formula(ids), ACTIVE_PACKAGES_FORMULA)
}

// ============================================================================
// Catalog
// ============================================================================

pub fn product_from_record(record: &Record) -> Product {
    use product_fields::*;
    let f = &record.fields;
    let product_type = opt_text(f, PRODUCT_TYPE);
    Product {
        id: record.id.clone(),
        name: opt_text(f, NAME).unwrap_or_else(|| UNNAMED_PRODUCT.to_string()),
        details: first_text(&[(f, DETAILS), (f, SIZE)]),
        marketing_description: opt_text(f, MARKETING_DESCRIPTION),
        price: number(f, PRICE_BEFORE_VAT),
        kind: ItemKind::from_product_type(product_type.as_deref()),
        product_type,
        inventory: opt_text(f, INVENTORY),
        boxes_per_carton: count(f, BOXES_PER_CARTON).filter(|n| *n > 0).unwrap_or(1),
    }
}

/// Linked (product ids, packaging ids) of a package record
pub fn package_links(record: &Record) -> (Vec<String>, Vec<String>) {
    (
        links(&record.fields, package_fields::PRODUCTS),
        links(&record.fields, package_fields::PACKAGING_PRODUCTS),
    )
}

pub fn package_from_record(record: &Record, items: Vec<Product>, packaging_items: Vec<Product>) -> Package {
    use package_fields::*;
    let f = &record.fields;
    Package {
        id: record.id.clone(),
        name: opt_text(f, NAME).unwrap_or_else(|| UNNAMED_PACKAGE.to_string()),
        package_number: opt_text(f, PACKAGE_NUMBER),
        package_price: number(f, PRICE),
        items,
        packaging_items,
        parallel_packages: links(f, PARALLEL),
        image_url: attachment_url(f, IMAGE),
    }
}

pub fn is_active_package(record: &Record) -> bool {
    flag(&record.fields, package_fields::ACTIVE)
}

pub fn catalog_from_record(record: &Record) -> Catalog {
    Catalog {
        id: record.id.clone(),
        name: opt_text(&record.fields, catalog_fields::NAME)
            .unwrap_or_else(|| UNNAMED_CATALOG.to_string()),
    }
}

pub fn catalog_package_ids(record: &Record) -> Vec<String> {
    links(&record.fields, catalog_fields::PACKAGES)
}

// ============================================================================
// Quote Load
// ============================================================================

/// A product record as a line of an option
pub fn item_from_record(record: &Record, kind: ItemKind) -> Item {
    use product_fields::*;
    let f = &record.fields;
    Item {
        id: record.id.clone(),
        kind,
        name: first_text(&[(f, NAME), (f, ALT_NAME)]),
        details: text(f, MARKETING_DESCRIPTION),
        price: number(f, PRICE_BEFORE_VAT),
        product_type: opt_text(f, PRODUCT_TYPE),
        boxes_per_carton: count(f, BOXES_PER_CARTON),
        is_custom: false,
        is_editable: false,
    }
}

/// Linked (product ids, packaging ids) of an option record
pub fn option_links(record: &Record) -> (Vec<String>, Vec<String>) {
    (
        links(&record.fields, option_fields::PRODUCTS),
        links(&record.fields, option_fields::PACKAGING_PRODUCTS),
    )
}

pub fn option_package_id(record: &Record) -> Option<String> {
    links(&record.fields, option_fields::PACKAGE).into_iter().next()
}

pub fn option_from_record(record: &Record, items: Vec<Item>) -> QuoteOption {
    use option_fields::*;
    let f = &record.fields;
    let letter = opt_text(f, OPTION_LETTER).unwrap_or_else(|| "A".to_string());
    let mut option = QuoteOption::default();
    option.label = letter.clone();
    option.record_id = Some(record.id.clone());
    option.title = opt_text(f, TITLE).unwrap_or_else(|| format!("אופציה {}", letter));
    option.package_id = option_package_id(record);
    option.package_number = opt_text(f, PACKAGE_NUMBER);
    option.image = attachment_url(f, PACKAGE_IMAGE);
    option.items = items;
    option.profit_target = opt_number(f, PROFIT_TARGET).map(to_percent);
    option.agent_commission = opt_number(f, AGENT_COMMISSION).map(to_percent);
    option.agent = text(f, AGENT);
    option.additional_expenses = number(f, ADDITIONAL_EXPENSES);
    option.units_per_carton = count(f, UNITS_PER_CARTON);
    option.packaging = text(f, PACKAGING);
    option.delivery_company = text(f, DELIVERY_COMPANY);
    option.shipping_price_to_client = number(f, SHIPPING_PRICE_TO_CLIENT);
    option.project_price_before_vat = number(f, PROJECT_PRICE_BEFORE_VAT);
    option.final_delivery_boxes = count(f, FINAL_DELIVERY_BOXES);
    option.status = text(f, STATUS);
    option.internal_status = text(f, INTERNAL_STATUS);
    option.comments = text(f, COMMENTS);
    option
}

pub fn opportunity_id(quote: &Record) -> Option<String> {
    links(&quote.fields, quote_fields::OPPORTUNITIES).into_iter().next()
}

pub fn quote_option_ids(quote: &Record) -> Vec<String> {
    links(&quote.fields, quote_fields::OPTIONS)
}

/// Build the quote tree. Quote columns win over opportunity columns.
pub fn quote_from_records(quote: &Record, opportunity: Option<&Record>, options: Vec<QuoteOption>) -> Quote {
    use opportunity_fields as opp;
    use quote_fields as q;

    let empty = Fields::new();
    let qf = &quote.fields;
    let of = opportunity.map(|r| &r.fields).unwrap_or(&empty);

    let customer = Customer {
        name: first_text(&[(qf, q::CUSTOMER_NAME), (of, opp::FULL_NAME)]),
        email: text(of, opp::EMAIL),
        phone: first_text(&[(qf, q::CONTACT_PHONE), (of, opp::PHONE)]),
        company: text(of, opp::COMPANY),
        notes: first_text(&[(qf, q::CONTACT), (of, opp::NOTES)]),
        preferences: text(of, opp::PREFERENCES),
        celebration: text(of, opp::CELEBRATION),
        gift_recipients: text(of, opp::GIFT_RECIPIENTS),
        card: first_text(&[(qf, q::CARD), (of, opp::CARD)]),
        sticker: first_text(&[(qf, q::STICKER), (of, opp::STICKER)]),
        preferred_packaging: text(of, opp::PREFERRED_PACKAGING),
        occasion: match of.get(opp::OCCASION) {
            Some(Value::Array(values)) => values
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect(),
            Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        },
    };

    let delivery = DeliveryDetails {
        address: text(of, opp::DELIVERY_ADDRESS),
        date: first_text(&[(qf, q::DELIVERY_DATE), (of, opp::REQUESTED_DELIVERY_DATE)]),
        time: text(of, opp::DELIVERY_TIME),
        distribution: text(of, opp::DISTRIBUTION),
    };

    let budget = BudgetContext {
        package_quantity: first_number(&[(qf, q::PACKAGE_QUANTITY), (of, opp::PACKAGE_QUANTITY)])
            .and_then(|n| n.trunc().to_u32())
            .unwrap_or(0),
        budget_per_package: first_number(&[(qf, q::BUDGET_PER_PACKAGE), (of, opp::BUDGET)])
            .unwrap_or(Decimal::ZERO),
        include_vat: flag(of, opp::INCLUDE_VAT),
        include_shipping: flag(of, opp::INCLUDE_SHIPPING),
        profit_target: DEFAULT_PROFIT_TARGET,
        agent_commission: to_percent(number(qf, q::AGENT_COMMISSION)),
    };

    let mut result = Quote {
        id: Some(quote.id.clone()),
        quote_number: text(qf, q::QUOTE_NUMBER),
        customer,
        delivery,
        budget,
        budget_before_vat: opt_number(of, opp::BUDGET_BEFORE_VAT),
        budget_with_vat: opt_number(of, opp::BUDGET_WITH_VAT),
        agent: first_text(&[(qf, q::AGENT), (of, opp::AGENT)]),
        status: text(qf, q::STATUS),
        comments: text(qf, q::COMMENTS),
        opportunity_id: opportunity_id(quote),
        options,
    };
    result.ensure_option();
    result
}

// ============================================================================
// Quote Save
// ============================================================================

fn valid_ids(items: &[Item], kind: ItemKind) -> Vec<Value> {
    items
        .iter()
        .filter(|i| i.kind == kind && is_valid_record_id(&i.id))
        .map(|i| Value::String(i.id.clone()))
        .collect()
}

/// Fields for a brand new quote record
pub fn quote_create_fields(quote: &Quote) -> Fields {
    let name = if quote.customer.name.is_empty() {
        DEFAULT_CUSTOMER_NAME
    } else {
        quote.customer.name.as_str()
    };
    let mut fields = Fields::new();
    fields.insert(quote_fields::CUSTOMER_NAME.into(), json!(name));
    fields
}

/// Input columns of an option; `new_for` links a created option to its quote
pub fn option_write_fields(option: &QuoteOption, position: usize, quote: &Quote, new_for: Option<&str>) -> Fields {
    use option_fields::*;
    let label = option_label(position);
    let mut f = Fields::new();

    let title = if option.title.is_empty() {
        format!("אופציה {}", label)
    } else {
        option.title.clone()
    };
    f.insert(TITLE.into(), json!(title));
    f.insert(OPTION_LETTER.into(), json!(label));
    f.insert(PRODUCTS.into(), Value::Array(valid_ids(&option.items, ItemKind::Product)));
    f.insert(
        PACKAGING_PRODUCTS.into(),
        Value::Array(valid_ids(&option.items, ItemKind::Packaging)),
    );
    if let Some(package_id) = option.package_id.as_deref().filter(|id| is_valid_record_id(id)) {
        f.insert(PACKAGE.into(), json!([package_id]));
    }
    if let Some(p) = option.profit_target {
        f.insert(PROFIT_TARGET.into(), decimal_value(to_fraction(p)));
    }
    if let Some(c) = option.agent_commission {
        f.insert(AGENT_COMMISSION.into(), decimal_value(to_fraction(c)));
    }
    if !option.agent.is_empty() {
        f.insert(AGENT.into(), json!(option.agent));
    }
    if !option.delivery_company.is_empty() {
        f.insert(DELIVERY_COMPANY.into(), json!(option.delivery_company));
    }
    if !option.comments.is_empty() {
        f.insert(COMMENTS.into(), json!(option.comments));
    }
    f.insert(ADDITIONAL_EXPENSES.into(), decimal_value(option.additional_expenses));
    f.insert(
        SHIPPING_PRICE_TO_CLIENT.into(),
        decimal_value(option.shipping_price_to_client),
    );
    f.insert(
        PROJECT_PRICE_BEFORE_VAT.into(),
        decimal_value(option.project_price_before_vat),
    );
    if let Some(boxes) = option.final_delivery_boxes {
        f.insert(FINAL_DELIVERY_BOXES.into(), json!(boxes));
    }

    if let Some(quote_id) = new_for {
        f.insert(QUOTE_LINK.into(), json!([quote_id]));
        f.insert(CUSTOMER_NAME.into(), json!(quote.customer.name));
    }
    f
}

/// Writable customer and budget columns of the linked opportunity
pub fn opportunity_update_fields(quote: &Quote) -> Fields {
    use opportunity_fields::*;
    let mut f = Fields::new();
    f.insert(FULL_NAME.into(), json!(quote.customer.name));
    f.insert(EMAIL.into(), json!(quote.customer.email));
    f.insert(PHONE.into(), json!(quote.customer.phone));
    f.insert(PACKAGE_QUANTITY.into(), json!(quote.budget.package_quantity));
    f.insert(BUDGET.into(), decimal_value(quote.budget.budget_per_package));
    f.insert(INCLUDE_VAT.into(), json!(quote.budget.include_vat));
    f.insert(INCLUDE_SHIPPING.into(), json!(quote.budget.include_shipping));
    f.insert(NOTES.into(), json!(quote.customer.notes));
    f.insert(STICKER.into(), json!(quote.customer.sticker));
    f.insert(CARD.into(), json!(quote.customer.card));
    f.insert(PREFERRED_PACKAGING.into(), json!(quote.customer.preferred_packaging));
    f.insert(DELIVERY_ADDRESS.into(), json!(quote.delivery.address));
    f.insert(REQUESTED_DELIVERY_DATE.into(), json!(quote.delivery.date));
    f
}

pub fn quote_options_link_fields(option_ids: &[String]) -> Fields {
    let mut f = Fields::new();
    f.insert(quote_fields::OPTIONS.into(), json!(option_ids));
    f
}

pub fn status_fields(status: &str) -> Fields {
    let mut f = Fields::new();
    f.insert(quote_fields::STATUS.into(), json!(status));
    f
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, fields: Value) -> Record {
        Record {
            id: id.to_string(),
            fields: match fields {
                Value::Object(map) => map,
                _ => Fields::new(),
            },
            created_time: None,
        }
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_product_mapping_defaults() {
        let product = product_from_record(&record(
            "recPROD0000000001",
            json!({ "גודל": "750ml", "סוג מוצר": "אריזה", "מחיר לפני מעמ": 12.5 }),
        ));
        assert_eq!(product.name, "מוצר ללא שם");
        assert_eq!(product.details, "750ml");
        assert_eq!(product.price, dec("12.5"));
        assert_eq!(product.boxes_per_carton, 1);
        assert_eq!(product.kind, ItemKind::Packaging);
    }

    #[test]
    fn test_record_id_formula() {
        let formula = record_id_formula(&["recA".to_string(), "recB".to_string()]);
        assert_eq!(formula, "OR(RECORD_ID()='recA',RECORD_ID()='recB')");
        assert_eq!(
            active_among_formula(&["recA".to_string()]),
            "AND(OR(RECORD_ID()='recA'), {פעיל} = TRUE())"
        );
    }

    #[test]
    fn test_option_percentages_convert() {
        let option = option_from_record(
            &record(
                "recOPT00000000001",
                json!({
                    "Option Letter": "B",
                    "יעד רווחיות": 0.3,
                    "שם מארז": ["recPKG00000000001"],
                    "כמות שנכנסת בקרטון": [12]
                }),
            ),
            vec![],
        );
        assert_eq!(option.profit_target, Some(dec("30")));
        assert_eq!(option.agent_commission, None);
        assert_eq!(option.title, "אופציה B");
        assert_eq!(option.package_id.as_deref(), Some("recPKG00000000001"));
        assert_eq!(option.units_per_carton, Some(12));
    }

    #[test]
    fn test_quote_fields_win_over_opportunity() {
        let quote = record(
            "recQUOTE000000001",
            json!({
                "מספר הצעה": "Q-100",
                "שם לקוח": "Quote Name",
                "כמות מארזים": 40,
                "עמלת סוכן": 0.05,
                "הזדמנויות מכירה": ["recOPP0000000001x"]
            }),
        );
        let opportunity = record(
            "recOPP0000000001x",
            json!({
                "שם מלא": "Opp Name",
                "Email": "dana@example.com",
                "כמות מארזים": 99,
                "תקציב": 150,
                "מחירים כולל מע\"מ": true,
                "מועד": ["ראש השנה"]
            }),
        );
        let q = quote_from_records(&quote, Some(&opportunity), vec![]);
        assert_eq!(q.customer.name, "Quote Name");
        assert_eq!(q.customer.email, "dana@example.com");
        assert_eq!(q.budget.package_quantity, 40);
        assert_eq!(q.budget.budget_per_package, dec("150"));
        assert!(q.budget.include_vat);
        assert_eq!(q.budget.agent_commission, dec("5"));
        assert_eq!(q.budget.profit_target, dec("36"));
        assert_eq!(q.customer.occasion, vec!["ראש השנה"]);
        assert_eq!(q.opportunity_id.as_deref(), Some("recOPP0000000001x"));
        assert_eq!(q.options.len(), 1);
    }

    #[test]
    fn test_option_fields_write_inputs_only() {
        let quote = Quote::new("Q-1");
        let mut option = QuoteOption::new("A");
        option.items = vec![
            Item {
                id: "recPROD0000000001".to_string(),
                ..Default::default()
            },
            Item {
                id: "custom-product-abc".to_string(),
                ..Default::default()
            },
            Item {
                id: "recPACK0000000001".to_string(),
                kind: ItemKind::Packaging,
                ..Default::default()
            },
        ];
        option.profit_target = Some(dec("25"));
        option.units_per_carton = Some(10);

        let f = option_write_fields(&option, 0, &quote, None);
        assert_eq!(f[option_fields::PRODUCTS], json!(["recPROD0000000001"]));
        assert_eq!(f[option_fields::PACKAGING_PRODUCTS], json!(["recPACK0000000001"]));
        assert_eq!(f[option_fields::PROFIT_TARGET], json!(0.25));
        assert_eq!(f[option_fields::TITLE], json!("אופציה A"));
        assert!(!f.contains_key(option_fields::AGENT_COMMISSION));
        assert!(!f.contains_key(option_fields::UNITS_PER_CARTON));
        assert!(!f.contains_key(option_fields::PACKAGING));
        assert!(!f.contains_key(option_fields::QUOTE_LINK));

        let created = option_write_fields(&option, 1, &quote, Some("recQUOTE000000001"));
        assert_eq!(created[option_fields::QUOTE_LINK], json!(["recQUOTE000000001"]));
        assert_eq!(created[option_fields::OPTION_LETTER], json!("B"));
    }

    #[test]
    fn test_quote_create_fields_default_name() {
        let quote = Quote::new("Q-1");
        let f = quote_create_fields(&quote);
        assert_eq!(f[quote_fields::CUSTOMER_NAME], json!("לקוח חדש"));
    }
}
