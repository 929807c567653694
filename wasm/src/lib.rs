//! WebAssembly module for the Quote Builder
//!
//! Runs the quote editor in the browser. Every value crosses the boundary
//! as a JSON string; rejected commands come back as string errors and are
//! also logged to the console.

use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    derive_option, filter_packages, filter_products, option_label, BudgetContext, DropPayload,
    ItemKind, Package, PackagePayload, Product, Quote, QuoteEditor, QuoteOption, SaveOutcome,
    SingleItemPayload, SortOrder,
};
use uuid::Uuid;
use wasm_bindgen::prelude::*;

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization failed: {}", e))
}

fn from_json<T: serde::de::DeserializeOwned>(what: &str, json: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn parse_key(key: &str) -> Result<Uuid, String> {
    Uuid::parse_str(key).map_err(|_| format!("Invalid option key: {}", key))
}

fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|_| format!("Invalid amount: {}", raw))
}

/// Report a rejected command and hand it to JavaScript
fn reject(message: String) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}

// ============================================================================
// Editor session
// ============================================================================

/// One quote being edited, with its undo history and save/load state
#[wasm_bindgen]
pub struct QuoteSession {
    editor: QuoteEditor,
}

impl QuoteSession {
    pub fn from_quote_json(quote_json: &str) -> Result<Self, String> {
        let quote: Quote = from_json("quote", quote_json)?;
        Ok(Self {
            editor: QuoteEditor::new(quote),
        })
    }

    fn snapshot(&self) -> Result<String, String> {
        to_json(self.editor.quote())
    }

    pub fn try_edit_quote(&mut self, field: &str, value: &str) -> Result<String, String> {
        self.editor
            .edit_quote_raw(field, value)
            .map_err(|e| e.to_string())?;
        self.snapshot()
    }

    pub fn try_edit_option(&mut self, key: &str, field: &str, value: &str) -> Result<String, String> {
        self.editor
            .edit_option_raw(parse_key(key)?, field, value)
            .map_err(|e| e.to_string())?;
        self.snapshot()
    }

    pub fn try_edit_item(
        &mut self,
        key: &str,
        item_id: &str,
        field: &str,
        value: &str,
    ) -> Result<String, String> {
        self.editor
            .edit_item_raw(parse_key(key)?, item_id, field, value)
            .map_err(|e| e.to_string())?;
        self.snapshot()
    }

    pub fn try_drop_payload(&mut self, key: &str, payload_json: &str) -> Result<String, String> {
        let payload: DropPayload = from_json("drop payload", payload_json)?;
        self.editor
            .drop_payload(parse_key(key)?, payload)
            .map_err(|e| e.to_string())?;
        self.snapshot()
    }

    pub fn try_add_custom_item(&mut self, key: &str, kind: &str) -> Result<String, String> {
        let kind = ItemKind::from_str(kind).ok_or_else(|| format!("Unknown item kind: {}", kind))?;
        self.editor
            .add_custom_item(parse_key(key)?, kind)
            .map_err(|e| e.to_string())
    }

    pub fn try_remove_item(&mut self, key: &str, item_id: &str) -> Result<String, String> {
        self.editor
            .remove_item(parse_key(key)?, item_id)
            .map_err(|e| e.to_string())?;
        self.snapshot()
    }

    pub fn try_duplicate_item(&mut self, key: &str, item_id: &str) -> Result<String, String> {
        self.editor
            .duplicate_item(parse_key(key)?, item_id)
            .map_err(|e| e.to_string())
    }

    pub fn try_move_item(&mut self, key: &str, dragged_id: &str, target_id: &str) -> Result<String, String> {
        self.editor
            .move_item(parse_key(key)?, dragged_id, target_id)
            .map_err(|e| e.to_string())?;
        self.snapshot()
    }

    pub fn try_duplicate_option(&mut self, key: &str) -> Result<String, String> {
        self.editor
            .duplicate_option(parse_key(key)?)
            .map(|k| k.to_string())
            .map_err(|e| e.to_string())
    }

    pub fn try_delete_option(&mut self, key: &str) -> Result<bool, String> {
        self.editor
            .delete_option(parse_key(key)?)
            .map_err(|e| e.to_string())
    }

    pub fn try_toggle_collapsed(&mut self, key: &str) -> Result<String, String> {
        self.editor
            .toggle_collapsed(parse_key(key)?)
            .map_err(|e| e.to_string())?;
        self.snapshot()
    }

    pub fn try_set_irrelevant(&mut self, key: &str, irrelevant: bool) -> Result<String, String> {
        self.editor
            .set_irrelevant(parse_key(key)?, irrelevant)
            .map_err(|e| e.to_string())?;
        self.snapshot()
    }

    pub fn try_begin_save(&mut self) -> Result<String, String> {
        let snapshot = self.editor.begin_save().map_err(|e| e.to_string())?;
        to_json(&snapshot)
    }

    pub fn try_complete_save(&mut self, outcome_json: &str) -> Result<String, String> {
        let outcome: SaveOutcome = from_json("save outcome", outcome_json)?;
        self.editor
            .complete_save(&outcome)
            .map_err(|e| e.to_string())?;
        self.snapshot()
    }

    pub fn try_abort_partial_save(&mut self, saved_json: &str) -> Result<String, String> {
        let saved: SaveOutcome = from_json("saved records", saved_json)?;
        self.editor
            .abort_partial_save(&saved)
            .map_err(|e| e.to_string())?;
        self.snapshot()
    }

    pub fn try_finish_load(&mut self, quote_json: &str) -> Result<String, String> {
        let quote: Quote = from_json("quote", quote_json)?;
        self.editor.finish_load(quote);
        self.snapshot()
    }
}

#[wasm_bindgen]
impl QuoteSession {
    #[wasm_bindgen(constructor)]
    pub fn new(quote_json: &str) -> Result<QuoteSession, JsValue> {
        Self::from_quote_json(quote_json).map_err(reject)
    }

    /// Session over a new unsaved quote with one empty option
    pub fn blank(quote_number: &str) -> QuoteSession {
        QuoteSession {
            editor: QuoteEditor::new(Quote::new(quote_number)),
        }
    }

    pub fn quote(&self) -> Result<String, JsValue> {
        self.snapshot().map_err(reject)
    }

    #[wasm_bindgen(js_name = editQuote)]
    pub fn edit_quote(&mut self, field: &str, value: &str) -> Result<String, JsValue> {
        self.try_edit_quote(field, value).map_err(reject)
    }

    #[wasm_bindgen(js_name = editOption)]
    pub fn edit_option(&mut self, key: &str, field: &str, value: &str) -> Result<String, JsValue> {
        self.try_edit_option(key, field, value).map_err(reject)
    }

    #[wasm_bindgen(js_name = editItem)]
    pub fn edit_item(
        &mut self,
        key: &str,
        item_id: &str,
        field: &str,
        value: &str,
    ) -> Result<String, JsValue> {
        self.try_edit_item(key, item_id, field, value).map_err(reject)
    }

    #[wasm_bindgen(js_name = dropPayload)]
    pub fn drop_payload(&mut self, key: &str, payload_json: &str) -> Result<String, JsValue> {
        self.try_drop_payload(key, payload_json).map_err(reject)
    }

    /// Returns the id of the new row
    #[wasm_bindgen(js_name = addCustomItem)]
    pub fn add_custom_item(&mut self, key: &str, kind: &str) -> Result<String, JsValue> {
        self.try_add_custom_item(key, kind).map_err(reject)
    }

    #[wasm_bindgen(js_name = removeItem)]
    pub fn remove_item(&mut self, key: &str, item_id: &str) -> Result<String, JsValue> {
        self.try_remove_item(key, item_id).map_err(reject)
    }

    /// Returns the id of the copy
    #[wasm_bindgen(js_name = duplicateItem)]
    pub fn duplicate_item(&mut self, key: &str, item_id: &str) -> Result<String, JsValue> {
        self.try_duplicate_item(key, item_id).map_err(reject)
    }

    #[wasm_bindgen(js_name = moveItem)]
    pub fn move_item(&mut self, key: &str, dragged_id: &str, target_id: &str) -> Result<String, JsValue> {
        self.try_move_item(key, dragged_id, target_id).map_err(reject)
    }

    /// Returns the key of the new option
    #[wasm_bindgen(js_name = addOption)]
    pub fn add_option(&mut self) -> String {
        self.editor.add_option().to_string()
    }

    #[wasm_bindgen(js_name = duplicateOption)]
    pub fn duplicate_option(&mut self, key: &str) -> Result<String, JsValue> {
        self.try_duplicate_option(key).map_err(reject)
    }

    /// False when the option was the last one and was kept
    #[wasm_bindgen(js_name = deleteOption)]
    pub fn delete_option(&mut self, key: &str) -> Result<bool, JsValue> {
        self.try_delete_option(key).map_err(reject)
    }

    #[wasm_bindgen(js_name = toggleCollapsed)]
    pub fn toggle_collapsed(&mut self, key: &str) -> Result<String, JsValue> {
        self.try_toggle_collapsed(key).map_err(reject)
    }

    #[wasm_bindgen(js_name = setIrrelevant)]
    pub fn set_irrelevant(&mut self, key: &str, irrelevant: bool) -> Result<String, JsValue> {
        self.try_set_irrelevant(key, irrelevant).map_err(reject)
    }

    pub fn undo(&mut self) -> bool {
        self.editor.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.editor.redo()
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    /// Quote JSON to send to the gateway; fails while another save runs
    #[wasm_bindgen(js_name = beginSave)]
    pub fn begin_save(&mut self) -> Result<String, JsValue> {
        self.try_begin_save().map_err(reject)
    }

    #[wasm_bindgen(js_name = completeSave)]
    pub fn complete_save(&mut self, outcome_json: &str) -> Result<String, JsValue> {
        self.try_complete_save(outcome_json).map_err(reject)
    }

    #[wasm_bindgen(js_name = abortSave)]
    pub fn abort_save(&mut self) {
        self.editor.abort_save();
    }

    /// Takes the `saved` object of a PARTIAL_SAVE error response
    #[wasm_bindgen(js_name = abortPartialSave)]
    pub fn abort_partial_save(&mut self, saved_json: &str) -> Result<String, JsValue> {
        self.try_abort_partial_save(saved_json).map_err(reject)
    }

    #[wasm_bindgen(js_name = isSaving)]
    pub fn is_saving(&self) -> bool {
        self.editor.is_saving()
    }

    /// False when this quote was already requested
    #[wasm_bindgen(js_name = requestLoad)]
    pub fn request_load(&mut self, quote_id: &str) -> bool {
        self.editor.request_load(quote_id)
    }

    #[wasm_bindgen(js_name = finishLoad)]
    pub fn finish_load(&mut self, quote_json: &str) -> Result<String, JsValue> {
        self.try_finish_load(quote_json).map_err(reject)
    }

    #[wasm_bindgen(js_name = loadFailed)]
    pub fn load_failed(&mut self, quote_id: &str) {
        self.editor.load_failed(quote_id);
    }
}

// ============================================================================
// Stateless helpers
// ============================================================================

fn derive_option_json(option_json: &str, budget_json: &str) -> Result<String, String> {
    let option: QuoteOption = from_json("option", option_json)?;
    let budget: BudgetContext = from_json("budget", budget_json)?;
    to_json(&derive_option(&option, &budget))
}

fn recalculate_quote_json(quote_json: &str) -> Result<String, String> {
    let mut quote: Quote = from_json("quote", quote_json)?;
    quote.ensure_option();
    shared::recalculate(&mut quote);
    to_json(&quote)
}

fn filter_products_json(products_json: &str, search: &str, sort: &str) -> Result<String, String> {
    let products: Vec<Product> = from_json("products", products_json)?;
    to_json(&filter_products(&products, search, SortOrder::from_str(sort)))
}

fn filter_packages_json(packages_json: &str, search: &str, sort: &str) -> Result<String, String> {
    let packages: Vec<Package> = from_json("packages", packages_json)?;
    to_json(&filter_packages(&packages, search, SortOrder::from_str(sort)))
}

fn product_payload_json(product_json: &str) -> Result<String, String> {
    let product: Product = from_json("product", product_json)?;
    to_json(&DropPayload::SingleItem(SingleItemPayload::from(&product)))
}

fn package_payload_json(package_json: &str) -> Result<String, String> {
    let package: Package = from_json("package", package_json)?;
    to_json(&DropPayload::Package(PackagePayload::from(&package)))
}

/// Derived fields of one option under a quote's budget context
#[wasm_bindgen(js_name = deriveOption)]
pub fn derive_option_js(option_json: &str, budget_json: &str) -> Result<String, JsValue> {
    derive_option_json(option_json, budget_json).map_err(reject)
}

/// Re-derive every option whose inputs changed
#[wasm_bindgen(js_name = recalculateQuote)]
pub fn recalculate_quote_js(quote_json: &str) -> Result<String, JsValue> {
    recalculate_quote_json(quote_json).map_err(reject)
}

#[wasm_bindgen(js_name = filterProducts)]
pub fn filter_products_js(products_json: &str, search: &str, sort: &str) -> Result<String, JsValue> {
    filter_products_json(products_json, search, sort).map_err(reject)
}

#[wasm_bindgen(js_name = filterPackages)]
pub fn filter_packages_js(packages_json: &str, search: &str, sort: &str) -> Result<String, JsValue> {
    filter_packages_json(packages_json, search, sort).map_err(reject)
}

/// Drag payload for a catalog product
#[wasm_bindgen(js_name = productPayload)]
pub fn product_payload_js(product_json: &str) -> Result<String, JsValue> {
    product_payload_json(product_json).map_err(reject)
}

/// Drag payload for a catalog package
#[wasm_bindgen(js_name = packagePayload)]
pub fn package_payload_js(package_json: &str) -> Result<String, JsValue> {
    package_payload_json(package_json).map_err(reject)
}

#[wasm_bindgen(js_name = budgetWithVat)]
pub fn budget_with_vat_js(before_vat: &str) -> Result<String, JsValue> {
    parse_decimal(before_vat)
        .map(|d| shared::budget_with_vat(d).to_string())
        .map_err(reject)
}

#[wasm_bindgen(js_name = budgetBeforeVat)]
pub fn budget_before_vat_js(with_vat: &str) -> Result<String, JsValue> {
    parse_decimal(with_vat)
        .map(|d| shared::budget_before_vat(d).to_string())
        .map_err(reject)
}

/// Lenient amount parsing used by the input fields
#[wasm_bindgen(js_name = parseAmount)]
pub fn parse_amount_js(raw: &str) -> String {
    shared::parse_amount(raw).to_string()
}

#[wasm_bindgen(js_name = isValidRecordId)]
pub fn is_valid_record_id_js(id: &str) -> bool {
    shared::is_valid_record_id(id)
}

#[wasm_bindgen(js_name = optionLabel)]
pub fn option_label_js(position: usize) -> String {
    option_label(position)
}

#[wasm_bindgen(js_name = sortLabel)]
pub fn sort_label_js(sort: &str) -> String {
    SortOrder::from_str(sort).label().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_key(session: &QuoteSession) -> String {
        session.editor.quote().options[0].key.to_string()
    }

    fn blank_json() -> String {
        serde_json::to_string(&Quote::new("Q-7")).unwrap()
    }

    #[test]
    fn test_session_edits_return_quote_json() {
        let mut session = QuoteSession::from_quote_json(&blank_json()).unwrap();
        let key = first_key(&session);

        session.try_edit_quote("packageQuantity", "10").unwrap();
        session.try_edit_quote("budgetPerPackage", "200").unwrap();
        let json = session.try_edit_option(&key, "title", "Premium").unwrap();

        let quote: Quote = serde_json::from_str(&json).unwrap();
        assert_eq!(quote.budget.package_quantity, 10);
        assert_eq!(quote.options[0].title, "Premium");
        assert!(session.can_undo());
    }

    #[test]
    fn test_session_rejects_bad_key() {
        let mut session = QuoteSession::blank("Q-1");
        let err = session.try_edit_option("nope", "title", "x").unwrap_err();
        assert!(err.contains("Invalid option key"));

        let unknown = Uuid::new_v4().to_string();
        let err = session.try_remove_item(&unknown, "recPRODUCT0000001").unwrap_err();
        assert!(err.contains("Unknown option"));
    }

    #[test]
    fn test_session_rejects_bad_json() {
        assert!(QuoteSession::from_quote_json("{not json").is_err());
        let mut session = QuoteSession::blank("Q-1");
        let key = first_key(&session);
        let err = session.try_drop_payload(&key, "[]").unwrap_err();
        assert!(err.starts_with("Invalid drop payload JSON"));
    }

    #[test]
    fn test_drop_product_then_undo() {
        let mut session = QuoteSession::blank("Q-1");
        let key = first_key(&session);
        let product = Product {
            id: "recPRODUCT0000001".to_string(),
            name: "Honey".to_string(),
            price: Decimal::from(25),
            boxes_per_carton: 1,
            ..Default::default()
        };
        let payload = product_payload_json(&serde_json::to_string(&product).unwrap()).unwrap();

        let json = session.try_drop_payload(&key, &payload).unwrap();
        let quote: Quote = serde_json::from_str(&json).unwrap();
        assert_eq!(quote.options[0].items.len(), 1);
        assert_eq!(quote.options[0].derived.products_cost, Decimal::from(25));

        assert!(session.undo());
        assert!(session.editor.quote().options[0].items.is_empty());
        assert!(session.redo());
        assert_eq!(session.editor.quote().options[0].items.len(), 1);
    }

    #[test]
    fn test_custom_item_kind() {
        let mut session = QuoteSession::blank("Q-1");
        let key = first_key(&session);
        let id = session.try_add_custom_item(&key, "packaging").unwrap();
        assert!(id.starts_with("custom-"));
        assert!(session.try_add_custom_item(&key, "gadget").is_err());
    }

    #[test]
    fn test_save_cycle_through_session() {
        let mut session = QuoteSession::blank("Q-1");
        let snapshot = session.try_begin_save().unwrap();
        assert!(serde_json::from_str::<Quote>(&snapshot).is_ok());
        assert!(session.try_begin_save().is_err());

        let outcome = r#"{"quoteRecordId":"recQUOTE000000001","optionIds":["recOPTION00000001"]}"#;
        let json = session.try_complete_save(outcome).unwrap();
        let quote: Quote = serde_json::from_str(&json).unwrap();
        assert_eq!(quote.id.as_deref(), Some("recQUOTE000000001"));
        assert_eq!(quote.options[0].record_id.as_deref(), Some("recOPTION00000001"));
        assert!(!session.is_saving());
    }

    #[test]
    fn test_partial_save_through_session() {
        let mut session = QuoteSession::blank("Q-1");
        session.try_begin_save().unwrap();

        let saved = r#"{"quoteRecordId":"recQUOTE000000001","optionIds":[]}"#;
        let json = session.try_abort_partial_save(saved).unwrap();
        let quote: Quote = serde_json::from_str(&json).unwrap();
        assert_eq!(quote.id.as_deref(), Some("recQUOTE000000001"));
        assert_eq!(quote.options[0].record_id, None);
        assert!(!session.is_saving());
    }

    #[test]
    fn test_options_add_duplicate_delete() {
        let mut session = QuoteSession::blank("Q-1");
        let key = first_key(&session);
        let copy = session.try_duplicate_option(&key).unwrap();
        session.add_option();
        assert_eq!(session.editor.quote().options.len(), 3);
        assert_eq!(session.editor.quote().options[1].key.to_string(), copy);

        assert!(session.try_delete_option(&copy).unwrap());
        let labels: Vec<&str> = session
            .editor
            .quote()
            .options
            .iter()
            .map(|o| o.label.as_str())
            .collect();
        assert_eq!(labels, vec!["A", "B"]);
    }

    #[test]
    fn test_derive_option_json() {
        let mut option = QuoteOption::new("A");
        option.items.push(shared::Item {
            id: "recPRODUCT0000001".to_string(),
            price: Decimal::from(40),
            ..Default::default()
        });
        let budget = BudgetContext {
            package_quantity: 10,
            budget_per_package: Decimal::from(200),
            ..Default::default()
        };
        let json = derive_option_json(
            &serde_json::to_string(&option).unwrap(),
            &serde_json::to_string(&budget).unwrap(),
        )
        .unwrap();
        let derived: shared::DerivedFields = serde_json::from_str(&json).unwrap();
        assert_eq!(derived.products_cost, Decimal::from(40));
        assert_eq!(derived.product_quantity, 1);
    }

    #[test]
    fn test_recalculate_quote_json_fills_empty_quote() {
        let json = recalculate_quote_json(r#"{"quoteNumber":"Q-3","options":[]}"#).unwrap();
        let quote: Quote = serde_json::from_str(&json).unwrap();
        assert_eq!(quote.options.len(), 1);
    }

    #[test]
    fn test_stateless_helpers() {
        assert_eq!(parse_amount_js("12.5abc"), "12.5");
        assert!(is_valid_record_id_js("recABCDEFGHIJKLMN"));
        assert!(!is_valid_record_id_js("rec123"));
        assert_eq!(option_label_js(1), "B");
        assert_eq!(sort_label_js("all"), "הכל");
    }
}
