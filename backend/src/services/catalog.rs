//! Catalog reads: products, active packages and curated catalogs

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::try_join_all;
use shared::{Catalog, Package, Product};

use crate::config::TableConfig;
use crate::error::{AppError, AppResult};
use crate::external::{ListQuery, Record, RecordStore};
use crate::services::mapping::{self, ACTIVE_PACKAGES_FORMULA, PACKAGE_FALLBACK_LIMIT};

pub struct CatalogService<S> {
    store: Arc<S>,
    tables: TableConfig,
}

impl<S: RecordStore> CatalogService<S> {
    pub fn new(store: Arc<S>, tables: TableConfig) -> Self {
        Self { store, tables }
    }

    /// Every product row
    pub async fn load_catalog_products(&self) -> AppResult<Vec<Product>> {
        let records = self
            .store
            .list_records(&self.tables.products, &ListQuery::default())
            .await?;
        tracing::debug!(count = records.len(), "Loaded products");
        Ok(records.iter().map(mapping::product_from_record).collect())
    }

    /// Products for the given ids, in the order the ids were given.
    /// Ids with no matching row are dropped.
    pub async fn fetch_products_by_ids(&self, ids: &[String]) -> AppResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let records = self
            .store
            .list_records(
                &self.tables.products,
                &ListQuery::filter(mapping::record_id_formula(ids)),
            )
            .await?;

        let mut by_id: HashMap<String, Product> = records
            .iter()
            .map(|r| (r.id.clone(), mapping::product_from_record(r)))
            .collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    /// Active packages with their products resolved. When the store rejects
    /// the active filter, falls back to an unfiltered capped listing.
    pub async fn load_active_packages(&self) -> AppResult<Vec<Package>> {
        let records = match self
            .store
            .list_records(&self.tables.packages, &ListQuery::filter(ACTIVE_PACKAGES_FORMULA))
            .await
        {
            Ok(records) => records,
            Err(AppError::RecordStore { status, message }) => {
                tracing::warn!(status, %message, "Active package filter rejected, listing without it");
                self.store
                    .list_records(
                        &self.tables.packages,
                        &ListQuery::limit(PACKAGE_FALLBACK_LIMIT),
                    )
                    .await?
            }
            Err(e) => return Err(e),
        };
        self.hydrate_packages(&records).await
    }

    pub async fn load_catalogs(&self) -> AppResult<Vec<Catalog>> {
        let records = self
            .store
            .list_records(&self.tables.catalogs, &ListQuery::default())
            .await?;
        Ok(records.iter().map(mapping::catalog_from_record).collect())
    }

    /// Active packages linked from one catalog
    pub async fn load_catalog_packages(&self, catalog_id: &str) -> AppResult<Vec<Package>> {
        if !shared::is_valid_record_id(catalog_id) {
            return Err(AppError::validation(
                "catalog_id",
                &format!("'{}' is not a valid record id", catalog_id),
                "מזהה קטלוג לא תקין",
            ));
        }
        let catalog = self
            .store
            .get_record(&self.tables.catalogs, catalog_id)
            .await?;
        let package_ids = mapping::catalog_package_ids(&catalog);
        if package_ids.is_empty() {
            return Ok(Vec::new());
        }

        let records = self
            .store
            .list_records(
                &self.tables.packages,
                &ListQuery::filter(mapping::active_among_formula(&package_ids)),
            )
            .await?;
        self.hydrate_packages(&records).await
    }

    /// Cheap read proving the store is reachable with the configured credentials
    pub async fn check_connection(&self) -> bool {
        match self
            .store
            .list_records(&self.tables.products, &ListQuery::limit(1))
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Record store connection check failed");
                false
            }
        }
    }

    async fn hydrate_packages(&self, records: &[Record]) -> AppResult<Vec<Package>> {
        try_join_all(records.iter().map(|record| self.hydrate_package(record))).await
    }

    async fn hydrate_package(&self, record: &Record) -> AppResult<Package> {
        let (product_ids, packaging_ids) = mapping::package_links(record);
        let (items, packaging_items) = futures::try_join!(
            self.fetch_products_by_ids(&product_ids),
            self.fetch_products_by_ids(&packaging_ids),
        )?;
        Ok(mapping::package_from_record(record, items, packaging_items))
    }
}
