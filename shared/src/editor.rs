//! Quote editing session
//!
//! Every mutation entry point applies its change to the current tree, then
//! runs the recalculation trigger before returning, so derived fields are
//! never stale once a call completes.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::history::History;
use crate::models::{DropPayload, Item, ItemKind, Quote, QuoteOption, SingleItemPayload};
use crate::pricing::{budget_before_vat, budget_with_vat};
use crate::recalc::{invalidate, recalculate};
use crate::types::SaveOutcome;
use crate::validation::{parse_amount, parse_count, parse_optional_count};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("Unknown option: {0}")]
    UnknownOption(Uuid),

    #[error("Unknown item: {0}")]
    UnknownItem(String),

    #[error("Item is read-only catalog data: {0}")]
    ItemNotEditable(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid option key: {0}")]
    InvalidKey(String),

    #[error("A save is already in progress")]
    SaveInFlight,

    #[error("No save in progress")]
    NoSaveInFlight,
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim(), "true" | "1" | "on" | "yes")
}

// ============================================================================
// Edit Commands
// ============================================================================

/// Edit to a quote-level field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum QuoteEdit {
    QuoteNumber(String),
    CustomerName(String),
    CustomerEmail(String),
    CustomerPhone(String),
    CustomerCompany(String),
    CustomerNotes(String),
    Preferences(String),
    Celebration(String),
    GiftRecipients(String),
    Card(String),
    Sticker(String),
    PreferredPackaging(String),
    Occasion(Vec<String>),
    PackageQuantity(u32),
    BudgetPerPackage(Decimal),
    #[serde(rename = "budgetBeforeVAT")]
    BudgetBeforeVat(Decimal),
    #[serde(rename = "budgetWithVAT")]
    BudgetWithVat(Decimal),
    #[serde(rename = "includeVAT")]
    IncludeVat(bool),
    IncludeShipping(bool),
    ProfitTarget(Decimal),
    AgentCommission(Decimal),
    Agent(String),
    Status(String),
    Comments(String),
    DeliveryAddress(String),
    DeliveryDate(String),
    DeliveryTime(String),
    Distribution(String),
}

impl QuoteEdit {
    /// Build an edit from a form field name and the raw text typed into it
    pub fn from_raw(field: &str, raw: &str) -> Option<Self> {
        let text = raw.to_string();
        let edit = match field {
            "quoteNumber" => QuoteEdit::QuoteNumber(text),
            "customerName" => QuoteEdit::CustomerName(text),
            "customerEmail" => QuoteEdit::CustomerEmail(text),
            "customerPhone" => QuoteEdit::CustomerPhone(text),
            "customerCompany" => QuoteEdit::CustomerCompany(text),
            "customerNotes" => QuoteEdit::CustomerNotes(text),
            "preferences" => QuoteEdit::Preferences(text),
            "celebration" => QuoteEdit::Celebration(text),
            "giftRecipients" => QuoteEdit::GiftRecipients(text),
            "card" => QuoteEdit::Card(text),
            "sticker" => QuoteEdit::Sticker(text),
            "preferredPackaging" => QuoteEdit::PreferredPackaging(text),
            "occasion" => QuoteEdit::Occasion(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            ),
            "packageQuantity" => QuoteEdit::PackageQuantity(parse_count(raw)),
            "budgetPerPackage" => QuoteEdit::BudgetPerPackage(parse_amount(raw)),
            "budgetBeforeVAT" => QuoteEdit::BudgetBeforeVat(parse_amount(raw)),
            "budgetWithVAT" => QuoteEdit::BudgetWithVat(parse_amount(raw)),
            "includeVAT" => QuoteEdit::IncludeVat(parse_flag(raw)),
            "includeShipping" => QuoteEdit::IncludeShipping(parse_flag(raw)),
            "profitTarget" => QuoteEdit::ProfitTarget(parse_amount(raw)),
            "agentCommission" => QuoteEdit::AgentCommission(parse_amount(raw)),
            "agent" => QuoteEdit::Agent(text),
            "status" => QuoteEdit::Status(text),
            "comments" => QuoteEdit::Comments(text),
            "deliveryAddress" => QuoteEdit::DeliveryAddress(text),
            "deliveryDate" => QuoteEdit::DeliveryDate(text),
            "deliveryTime" => QuoteEdit::DeliveryTime(text),
            "distribution" => QuoteEdit::Distribution(text),
            _ => return None,
        };
        Some(edit)
    }
}

/// Edit to an option's input fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum OptionEdit {
    Title(String),
    Agent(String),
    /// Marks the option as overriding the quote default
    ProfitTarget(Decimal),
    /// Back to the quote default
    ClearProfitTarget,
    AgentCommission(Decimal),
    ClearAgentCommission,
    AdditionalExpenses(Decimal),
    UnitsPerCarton(u32),
    Packaging(String),
    ShippingPriceToClient(Decimal),
    #[serde(rename = "projectPriceBeforeVAT")]
    ProjectPriceBeforeVat(Decimal),
    FinalDeliveryBoxes(Option<u32>),
    DeliveryCompany(String),
    Status(String),
    InternalStatus(String),
    Comments(String),
}

impl OptionEdit {
    pub fn from_raw(field: &str, raw: &str) -> Option<Self> {
        let text = raw.to_string();
        let edit = match field {
            "title" => OptionEdit::Title(text),
            "agent" => OptionEdit::Agent(text),
            "profitTarget" if raw.trim().is_empty() => OptionEdit::ClearProfitTarget,
            "profitTarget" => OptionEdit::ProfitTarget(parse_amount(raw)),
            "agentCommission" if raw.trim().is_empty() => OptionEdit::ClearAgentCommission,
            "agentCommission" => OptionEdit::AgentCommission(parse_amount(raw)),
            "additionalExpenses" => OptionEdit::AdditionalExpenses(parse_amount(raw)),
            "unitsPerCarton" => OptionEdit::UnitsPerCarton(parse_count(raw)),
            "packaging" => OptionEdit::Packaging(text),
            "shippingPriceToClient" => OptionEdit::ShippingPriceToClient(parse_amount(raw)),
            "projectPriceBeforeVAT" => OptionEdit::ProjectPriceBeforeVat(parse_amount(raw)),
            "finalDeliveryBoxes" => OptionEdit::FinalDeliveryBoxes(parse_optional_count(raw)),
            "deliveryCompany" => OptionEdit::DeliveryCompany(text),
            "status" => OptionEdit::Status(text),
            "internalStatus" => OptionEdit::InternalStatus(text),
            "comments" => OptionEdit::Comments(text),
            _ => return None,
        };
        Some(edit)
    }

    fn apply(self, option: &mut QuoteOption) {
        match self {
            OptionEdit::Title(v) => option.title = v,
            OptionEdit::Agent(v) => option.agent = v,
            OptionEdit::ProfitTarget(v) => option.profit_target = Some(v),
            OptionEdit::ClearProfitTarget => option.profit_target = None,
            OptionEdit::AgentCommission(v) => option.agent_commission = Some(v),
            OptionEdit::ClearAgentCommission => option.agent_commission = None,
            OptionEdit::AdditionalExpenses(v) => option.additional_expenses = v,
            OptionEdit::UnitsPerCarton(v) => option.units_per_carton = Some(v),
            OptionEdit::Packaging(v) => option.packaging = v,
            OptionEdit::ShippingPriceToClient(v) => option.shipping_price_to_client = v,
            OptionEdit::ProjectPriceBeforeVat(v) => option.project_price_before_vat = v,
            OptionEdit::FinalDeliveryBoxes(v) => option.final_delivery_boxes = v,
            OptionEdit::DeliveryCompany(v) => option.delivery_company = v,
            OptionEdit::Status(v) => option.status = v,
            OptionEdit::InternalStatus(v) => option.internal_status = v,
            OptionEdit::Comments(v) => option.comments = v,
        }
    }
}

/// Edit to an editable item row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum ItemEdit {
    Name(String),
    Details(String),
    Price(Decimal),
}

impl ItemEdit {
    pub fn from_raw(field: &str, raw: &str) -> Option<Self> {
        match field {
            "name" => Some(ItemEdit::Name(raw.to_string())),
            "details" => Some(ItemEdit::Details(raw.to_string())),
            "price" => Some(ItemEdit::Price(parse_amount(raw))),
            _ => None,
        }
    }
}

// ============================================================================
// Editor
// ============================================================================

/// One editing session over a quote
#[derive(Debug, Clone)]
pub struct QuoteEditor {
    quote: Quote,
    history: History<Vec<QuoteOption>>,
    save_in_flight: bool,
    pending_save_keys: Vec<Uuid>,
    requested_loads: HashSet<String>,
}

impl Default for QuoteEditor {
    fn default() -> Self {
        Self::new(Quote::default())
    }
}

/// Index right after the last row of `kind`, or `fallback` when there is none
fn insertion_index(items: &[Item], kind: ItemKind, fallback: usize) -> usize {
    items
        .iter()
        .rposition(|i| i.kind == kind)
        .map(|p| p + 1)
        .unwrap_or(fallback)
}

fn insert_grouped(option: &mut QuoteOption, item: Item) {
    let index = match item.kind {
        ItemKind::Product => insertion_index(&option.items, ItemKind::Product, 0),
        ItemKind::Packaging => {
            insertion_index(&option.items, ItemKind::Packaging, option.items.len())
        }
    };
    option.items.insert(index, item);
}

fn apply_carton(option: &mut QuoteOption, carton: &SingleItemPayload) {
    option.packaging = carton.to_item().name;
    if let Some(units) = carton.boxes_per_carton.filter(|u| *u > 0) {
        option.units_per_carton = Some(units);
    }
}

impl QuoteEditor {
    pub fn new(mut quote: Quote) -> Self {
        quote.ensure_option();
        quote.relabel_options();
        invalidate(&mut quote);
        recalculate(&mut quote);
        let history = History::new(quote.options.clone());
        Self {
            quote,
            history,
            save_in_flight: false,
            pending_save_keys: Vec::new(),
            requested_loads: HashSet::new(),
        }
    }

    pub fn quote(&self) -> &Quote {
        &self.quote
    }

    pub fn into_quote(self) -> Quote {
        self.quote
    }

    /// Recalculate, then snapshot the options when the edit should be undoable
    fn commit(&mut self, undoable: bool) {
        self.quote.relabel_options();
        recalculate(&mut self.quote);
        if undoable {
            self.history.record(self.quote.options.clone());
        }
    }

    fn option_mut(&mut self, key: Uuid) -> Result<&mut QuoteOption, EditorError> {
        self.quote
            .option_mut(key)
            .ok_or(EditorError::UnknownOption(key))
    }

    // ------------------------------------------------------------------
    // Quote fields
    // ------------------------------------------------------------------

    pub fn edit_quote(&mut self, edit: QuoteEdit) {
        let q = &mut self.quote;
        match edit {
            QuoteEdit::QuoteNumber(v) => q.quote_number = v,
            QuoteEdit::CustomerName(v) => q.customer.name = v,
            QuoteEdit::CustomerEmail(v) => q.customer.email = v,
            QuoteEdit::CustomerPhone(v) => q.customer.phone = v,
            QuoteEdit::CustomerCompany(v) => q.customer.company = v,
            QuoteEdit::CustomerNotes(v) => q.customer.notes = v,
            QuoteEdit::Preferences(v) => q.customer.preferences = v,
            QuoteEdit::Celebration(v) => q.customer.celebration = v,
            QuoteEdit::GiftRecipients(v) => q.customer.gift_recipients = v,
            QuoteEdit::Card(v) => q.customer.card = v,
            QuoteEdit::Sticker(v) => q.customer.sticker = v,
            QuoteEdit::PreferredPackaging(v) => q.customer.preferred_packaging = v,
            QuoteEdit::Occasion(v) => q.customer.occasion = v,
            QuoteEdit::PackageQuantity(v) => q.budget.package_quantity = v,
            QuoteEdit::BudgetPerPackage(v) => {
                q.budget.budget_per_package = v;
                if q.budget.include_vat {
                    q.budget_with_vat = Some(v);
                    q.budget_before_vat = Some(budget_before_vat(v));
                } else {
                    q.budget_before_vat = Some(v);
                    q.budget_with_vat = Some(budget_with_vat(v));
                }
            }
            QuoteEdit::BudgetBeforeVat(v) => {
                q.budget_before_vat = Some(v);
                q.budget_with_vat = Some(budget_with_vat(v));
                sync_budget_per_package(q);
            }
            QuoteEdit::BudgetWithVat(v) => {
                q.budget_with_vat = Some(v);
                q.budget_before_vat = Some(budget_before_vat(v));
                sync_budget_per_package(q);
            }
            QuoteEdit::IncludeVat(v) => {
                q.budget.include_vat = v;
                sync_budget_per_package(q);
            }
            QuoteEdit::IncludeShipping(v) => q.budget.include_shipping = v,
            QuoteEdit::ProfitTarget(v) => q.budget.profit_target = v,
            QuoteEdit::AgentCommission(v) => q.budget.agent_commission = v,
            QuoteEdit::Agent(v) => q.agent = v,
            QuoteEdit::Status(v) => q.status = v,
            QuoteEdit::Comments(v) => q.comments = v,
            QuoteEdit::DeliveryAddress(v) => q.delivery.address = v,
            QuoteEdit::DeliveryDate(v) => q.delivery.date = v,
            QuoteEdit::DeliveryTime(v) => q.delivery.time = v,
            QuoteEdit::Distribution(v) => q.delivery.distribution = v,
        }
        self.commit(false);
    }

    pub fn edit_quote_raw(&mut self, field: &str, raw: &str) -> Result<(), EditorError> {
        let edit =
            QuoteEdit::from_raw(field, raw).ok_or_else(|| EditorError::UnknownField(field.into()))?;
        self.edit_quote(edit);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Option fields
    // ------------------------------------------------------------------

    pub fn edit_option(&mut self, key: Uuid, edit: OptionEdit) -> Result<(), EditorError> {
        edit.apply(self.option_mut(key)?);
        self.commit(true);
        Ok(())
    }

    pub fn edit_option_raw(&mut self, key: Uuid, field: &str, raw: &str) -> Result<(), EditorError> {
        let edit =
            OptionEdit::from_raw(field, raw).ok_or_else(|| EditorError::UnknownField(field.into()))?;
        self.edit_option(key, edit)
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    pub fn edit_item(&mut self, key: Uuid, item_id: &str, edit: ItemEdit) -> Result<(), EditorError> {
        let option = self.option_mut(key)?;
        let item = option
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| EditorError::UnknownItem(item_id.to_string()))?;
        if !item.is_editable {
            return Err(EditorError::ItemNotEditable(item_id.to_string()));
        }
        match edit {
            ItemEdit::Name(v) => item.name = v,
            ItemEdit::Details(v) => item.details = v,
            ItemEdit::Price(v) => item.price = v,
        }
        self.commit(true);
        Ok(())
    }

    pub fn edit_item_raw(
        &mut self,
        key: Uuid,
        item_id: &str,
        field: &str,
        raw: &str,
    ) -> Result<(), EditorError> {
        let edit =
            ItemEdit::from_raw(field, raw).ok_or_else(|| EditorError::UnknownField(field.into()))?;
        self.edit_item(key, item_id, edit)
    }

    /// A single product is added to the option; a package replaces its items
    pub fn drop_payload(&mut self, key: Uuid, payload: DropPayload) -> Result<(), EditorError> {
        let option = self.option_mut(key)?;
        match payload {
            DropPayload::SingleItem(single) => {
                if single.is_carton() {
                    apply_carton(option, &single);
                }
                insert_grouped(option, single.to_item());
            }
            DropPayload::Package(package) => {
                option.items = package.to_items();
                option.package_id = Some(package.id.clone());
                option.package_number = package.package_number.clone();
                option.image = package.image_url.clone();
                option.title = package.name.clone();
                let carton = package.carton();
                option.packaging = carton.map(|c| c.to_item().name).unwrap_or_default();
                option.units_per_carton = carton
                    .and_then(|c| c.boxes_per_carton)
                    .filter(|u| *u > 0);
            }
        }
        self.commit(true);
        Ok(())
    }

    /// Returns the new row's id
    pub fn add_custom_item(&mut self, key: Uuid, kind: ItemKind) -> Result<String, EditorError> {
        let option = self.option_mut(key)?;
        let item = Item::custom(kind);
        let id = item.id.clone();
        insert_grouped(option, item);
        self.commit(true);
        Ok(id)
    }

    pub fn remove_item(&mut self, key: Uuid, item_id: &str) -> Result<(), EditorError> {
        let option = self.option_mut(key)?;
        let index = option
            .item_position(item_id)
            .ok_or_else(|| EditorError::UnknownItem(item_id.to_string()))?;
        option.items.remove(index);
        self.commit(true);
        Ok(())
    }

    /// Copy inserted right after the original; returns the copy's id
    pub fn duplicate_item(&mut self, key: Uuid, item_id: &str) -> Result<String, EditorError> {
        let option = self.option_mut(key)?;
        let index = option
            .item_position(item_id)
            .ok_or_else(|| EditorError::UnknownItem(item_id.to_string()))?;
        let copy = option.items[index].duplicate();
        let id = copy.id.clone();
        option.items.insert(index + 1, copy);
        self.commit(true);
        Ok(id)
    }

    /// Drag-reorder: the dragged row takes the target row's position
    pub fn move_item(&mut self, key: Uuid, dragged_id: &str, target_id: &str) -> Result<(), EditorError> {
        let option = self.option_mut(key)?;
        let from = option
            .item_position(dragged_id)
            .ok_or_else(|| EditorError::UnknownItem(dragged_id.to_string()))?;
        let to = option
            .item_position(target_id)
            .ok_or_else(|| EditorError::UnknownItem(target_id.to_string()))?;
        if from == to {
            return Ok(());
        }
        let item = option.items.remove(from);
        option.items.insert(to, item);
        self.commit(true);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Options
    // ------------------------------------------------------------------

    pub fn add_option(&mut self) -> Uuid {
        let option = QuoteOption::default();
        let key = option.key;
        self.quote.options.push(option);
        self.commit(true);
        key
    }

    /// Copy inserted right after the original; returns the copy's key
    pub fn duplicate_option(&mut self, key: Uuid) -> Result<Uuid, EditorError> {
        let index = self
            .quote
            .option_position(key)
            .ok_or(EditorError::UnknownOption(key))?;
        let copy = self.quote.options[index].duplicate();
        let copy_key = copy.key;
        self.quote.options.insert(index + 1, copy);
        self.commit(true);
        Ok(copy_key)
    }

    /// Returns false, changing nothing, when `key` is the only option
    pub fn delete_option(&mut self, key: Uuid) -> Result<bool, EditorError> {
        let index = self
            .quote
            .option_position(key)
            .ok_or(EditorError::UnknownOption(key))?;
        if self.quote.options.len() <= 1 {
            return Ok(false);
        }
        self.quote.options.remove(index);
        self.commit(true);
        Ok(true)
    }

    pub fn toggle_collapsed(&mut self, key: Uuid) -> Result<(), EditorError> {
        let option = self.option_mut(key)?;
        option.is_collapsed = !option.is_collapsed;
        self.commit(false);
        Ok(())
    }

    /// Irrelevant options are collapsed as well
    pub fn set_irrelevant(&mut self, key: Uuid, irrelevant: bool) -> Result<(), EditorError> {
        let option = self.option_mut(key)?;
        option.is_irrelevant = irrelevant;
        if irrelevant {
            option.is_collapsed = true;
        }
        self.commit(true);
        Ok(())
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(options) => {
                self.quote.options = options.clone();
                self.commit(false);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(options) => {
                self.quote.options = options.clone();
                self.commit(false);
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Save / load
    // ------------------------------------------------------------------

    pub fn is_saving(&self) -> bool {
        self.save_in_flight
    }

    /// Snapshot to send to the gateway. Refused while another save runs.
    pub fn begin_save(&mut self) -> Result<Quote, EditorError> {
        if self.save_in_flight {
            return Err(EditorError::SaveInFlight);
        }
        self.save_in_flight = true;
        self.pending_save_keys = self.quote.options.iter().map(|o| o.key).collect();
        Ok(self.quote.clone())
    }

    /// Store the returned record ids on the options that were saved,
    /// matched by position in the snapshot. Nothing else is touched.
    pub fn complete_save(&mut self, outcome: &SaveOutcome) -> Result<(), EditorError> {
        if !self.save_in_flight {
            return Err(EditorError::NoSaveInFlight);
        }
        self.quote.id = Some(outcome.quote_record_id.clone());
        let assigned: Vec<(Uuid, String)> = self
            .pending_save_keys
            .drain(..)
            .zip(outcome.option_ids.iter().cloned())
            .collect();
        for (key, record_id) in &assigned {
            if let Some(option) = self.quote.option_mut(*key) {
                option.record_id = Some(record_id.clone());
            }
        }
        self.history.update_all(|options| {
            for option in options.iter_mut() {
                if let Some((_, id)) = assigned.iter().find(|(k, _)| *k == option.key) {
                    option.record_id = Some(id.clone());
                }
            }
        });
        self.save_in_flight = false;
        Ok(())
    }

    /// Failed save: clear the flag and leave the tree as it was
    pub fn abort_save(&mut self) {
        self.save_in_flight = false;
        self.pending_save_keys.clear();
    }

    /// End a save that failed after writing some records. The written ids
    /// are kept so the next save updates those records.
    pub fn abort_partial_save(&mut self, saved: &SaveOutcome) -> Result<(), EditorError> {
        self.complete_save(saved)
    }

    /// Returns false when a load of this quote was already requested
    pub fn request_load(&mut self, quote_id: &str) -> bool {
        self.requested_loads.insert(quote_id.to_string())
    }

    /// Replace the working tree with a loaded quote and start a new history
    pub fn finish_load(&mut self, quote: Quote) {
        let requested = std::mem::take(&mut self.requested_loads);
        *self = Self::new(quote);
        self.requested_loads = requested;
    }

    /// Allow the load to be retried
    pub fn load_failed(&mut self, quote_id: &str) {
        self.requested_loads.remove(quote_id);
    }
}

fn sync_budget_per_package(q: &mut Quote) {
    let value = if q.budget.include_vat {
        q.budget_with_vat
    } else {
        q.budget_before_vat
    };
    if let Some(v) = value {
        q.budget.budget_per_package = v;
    }
}
