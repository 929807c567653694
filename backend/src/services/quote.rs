//! Quote persistence gateway
//!
//! Loads a quote tree from the record store and writes it back. Saves are
//! single-flight per quote: a second save of the same quote while one is
//! running is rejected.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use futures::future::join_all;
use shared::{
    is_valid_record_id, recalculate, validate_quote, ItemKind, Item, Quote, QuoteOption,
    SaveOutcome,
};

use crate::config::TableConfig;
use crate::error::{AppError, AppResult};
use crate::external::record_store::attachment_url;
use crate::external::RecordStore;
use crate::services::mapping::{self, package_fields};

/// Quote gateway over a record store
pub struct QuoteGateway<S> {
    store: Arc<S>,
    tables: TableConfig,
    saving: Mutex<HashSet<String>>,
}

/// Marks a quote as being saved until dropped
struct SaveGuard<'a> {
    saving: &'a Mutex<HashSet<String>>,
    key: String,
}

impl<'a> SaveGuard<'a> {
    fn acquire(saving: &'a Mutex<HashSet<String>>, key: String) -> AppResult<Self> {
        let mut in_flight = saving
            .lock()
            .map_err(|_| AppError::Internal("save registry poisoned".to_string()))?;
        if !in_flight.insert(key.clone()) {
            return Err(AppError::SaveInProgress(key));
        }
        Ok(Self { saving, key })
    }
}

impl Drop for SaveGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.saving.lock() {
            in_flight.remove(&self.key);
        }
    }
}

/// Key identifying a quote across concurrent saves
fn save_key(quote: &Quote) -> Option<String> {
    match quote.id.as_deref() {
        Some(id) if is_valid_record_id(id) => Some(id.to_string()),
        _ if !quote.quote_number.is_empty() => Some(format!("new:{}", quote.quote_number)),
        _ => None,
    }
}

fn require_record_id(field: &str, id: &str) -> AppResult<()> {
    if is_valid_record_id(id) {
        Ok(())
    } else {
        Err(AppError::validation(
            field,
            &format!("'{}' is not a valid record id", id),
            "מזהה רשומה לא תקין",
        ))
    }
}

impl<S: RecordStore> QuoteGateway<S> {
    pub fn new(store: Arc<S>, tables: TableConfig) -> Self {
        Self {
            store,
            tables,
            saving: Mutex::new(HashSet::new()),
        }
    }

    // ------------------------------------------------------------------
    // Load
    // ------------------------------------------------------------------

    /// Load a quote with its opportunity, options and option items
    pub async fn load_quote(&self, quote_id: &str) -> AppResult<Quote> {
        require_record_id("quote_id", quote_id)?;
        let record = self.store.get_record(&self.tables.quotes, quote_id).await?;
        tracing::info!(quote_id, "Loaded quote record");

        let opportunity = match mapping::opportunity_id(&record) {
            Some(opportunity_id) => {
                match self
                    .store
                    .get_record(&self.tables.opportunities, &opportunity_id)
                    .await
                {
                    Ok(r) => Some(r),
                    Err(e) => {
                        tracing::warn!(%opportunity_id, error = %e, "Opportunity unreadable, continuing without it");
                        None
                    }
                }
            }
            None => None,
        };

        let option_ids = mapping::quote_option_ids(&record);
        let loaded = join_all(option_ids.iter().map(|id| self.load_option(id))).await;
        let options: Vec<QuoteOption> = loaded.into_iter().flatten().collect();
        tracing::info!(quote_id, options = options.len(), linked = option_ids.len(), "Loaded options");

        let mut quote = mapping::quote_from_records(&record, opportunity.as_ref(), options);
        quote.relabel_options();
        recalculate(&mut quote);
        Ok(quote)
    }

    /// One option with its items, or None when the option record is unreadable
    async fn load_option(&self, option_id: &str) -> Option<QuoteOption> {
        let record = match self.store.get_record(&self.tables.options, option_id).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(option_id, error = %e, "Skipping unreadable option");
                return None;
            }
        };

        let (product_ids, packaging_ids) = mapping::option_links(&record);
        let (mut items, packaging) = futures::join!(
            self.load_items(&product_ids, ItemKind::Product),
            self.load_items(&packaging_ids, ItemKind::Packaging),
        );
        items.extend(packaging);

        let mut option = mapping::option_from_record(&record, items);
        if option.image.is_none() {
            if let Some(package_id) = option.package_id.clone() {
                option.image = self.package_image(&package_id).await;
            }
        }
        Some(option)
    }

    /// Items in linked order; unreadable product records are skipped
    async fn load_items(&self, ids: &[String], kind: ItemKind) -> Vec<Item> {
        let records = join_all(
            ids.iter()
                .map(|id| self.store.get_record(&self.tables.products, id)),
        )
        .await;

        records
            .into_iter()
            .zip(ids)
            .filter_map(|(result, id)| match result {
                Ok(record) => Some(mapping::item_from_record(&record, kind)),
                Err(e) => {
                    tracing::warn!(product_id = %id, error = %e, "Skipping unreadable item");
                    None
                }
            })
            .collect()
    }

    async fn package_image(&self, package_id: &str) -> Option<String> {
        match self.store.get_record(&self.tables.packages, package_id).await {
            Ok(record) => attachment_url(&record.fields, package_fields::IMAGE),
            Err(e) => {
                tracing::warn!(package_id, error = %e, "Package image unavailable");
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Save
    // ------------------------------------------------------------------

    /// Create or update the quote and each option, update the opportunity,
    /// then link the options on the quote. The first store failure aborts.
    ///
    /// A failure after records were created comes back as
    /// [`AppError::PartialSave`] carrying their ids, so a retry can update
    /// them instead of creating duplicates.
    pub async fn save_quote(&self, quote: &Quote) -> AppResult<SaveOutcome> {
        validate_quote(quote).map_err(|msg| AppError::ValidationError(msg.to_string()))?;
        let _guard = save_key(quote)
            .map(|key| SaveGuard::acquire(&self.saving, key))
            .transpose()?;

        let (quote_record_id, quote_created) = match quote.id.as_deref() {
            Some(id) if is_valid_record_id(id) => (id.to_string(), false),
            _ => {
                let created = self
                    .store
                    .create_record(&self.tables.quotes, mapping::quote_create_fields(quote))
                    .await?;
                tracing::info!(quote_id = %created.id, quote_number = %quote.quote_number, "Created quote record");
                (created.id, true)
            }
        };

        let mut option_ids = Vec::with_capacity(quote.options.len());
        if let Err(err) = self.write_tree(quote, &quote_record_id, &mut option_ids).await {
            if !quote_created && option_ids.is_empty() {
                return Err(err);
            }
            tracing::error!(
                quote_id = %quote_record_id,
                saved_options = option_ids.len(),
                error = %err,
                "Save failed after records were written"
            );
            return Err(AppError::PartialSave {
                saved: SaveOutcome {
                    quote_record_id,
                    option_ids,
                },
                message: err.to_string(),
            });
        }

        tracing::info!(quote_id = %quote_record_id, options = option_ids.len(), "Saved quote");
        Ok(SaveOutcome {
            quote_record_id,
            option_ids,
        })
    }

    /// Options, opportunity and option links of a quote whose record exists.
    /// Each option id is pushed as soon as its record is written.
    async fn write_tree(
        &self,
        quote: &Quote,
        quote_record_id: &str,
        option_ids: &mut Vec<String>,
    ) -> AppResult<()> {
        for (position, option) in quote.options.iter().enumerate() {
            let record_id = match option.record_id.as_deref() {
                Some(id) if is_valid_record_id(id) => {
                    let fields = mapping::option_write_fields(option, position, quote, None);
                    self.store
                        .update_record(&self.tables.options, id, fields)
                        .await?;
                    id.to_string()
                }
                _ => {
                    let fields =
                        mapping::option_write_fields(option, position, quote, Some(quote_record_id));
                    self.store
                        .create_record(&self.tables.options, fields)
                        .await?
                        .id
                }
            };
            option_ids.push(record_id);
        }

        if let Some(opportunity_id) = quote
            .opportunity_id
            .as_deref()
            .filter(|id| is_valid_record_id(id))
        {
            self.store
                .update_record(
                    &self.tables.opportunities,
                    opportunity_id,
                    mapping::opportunity_update_fields(quote),
                )
                .await?;
        } else {
            tracing::debug!(quote_id = %quote_record_id, "No opportunity linked, skipping opportunity update");
        }

        if !option_ids.is_empty() {
            self.store
                .update_record(
                    &self.tables.quotes,
                    quote_record_id,
                    mapping::quote_options_link_fields(option_ids.as_slice()),
                )
                .await?;
        }
        Ok(())
    }

    /// Write the quote status column only
    pub async fn update_status(&self, quote_id: &str, status: &str) -> AppResult<()> {
        require_record_id("quote_id", quote_id)?;
        self.store
            .update_record(&self.tables.quotes, quote_id, mapping::status_fields(status))
            .await?;
        tracing::info!(quote_id, status, "Updated quote status");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_guard_rejects_second_acquire() {
        let saving = Mutex::new(HashSet::new());
        let first = SaveGuard::acquire(&saving, "recQQQQQQQQQQQQQQ".to_string()).unwrap();
        let second = SaveGuard::acquire(&saving, "recQQQQQQQQQQQQQQ".to_string());
        assert!(matches!(second, Err(AppError::SaveInProgress(_))));

        drop(first);
        assert!(SaveGuard::acquire(&saving, "recQQQQQQQQQQQQQQ".to_string()).is_ok());
    }

    #[test]
    fn test_save_key() {
        let mut quote = Quote::new("Q-5");
        assert_eq!(save_key(&quote).as_deref(), Some("new:Q-5"));
        quote.id = Some("recQQQQQQQQQQQQQQ".to_string());
        assert_eq!(save_key(&quote).as_deref(), Some("recQQQQQQQQQQQQQQ"));
        let blank = Quote::new("");
        assert_eq!(save_key(&blank), None);
    }
}
