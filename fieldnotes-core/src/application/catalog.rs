use std::fmt;
use std::sync::Arc;

use fieldnotes_model::{
    LOW_STOCK_THRESHOLD, NewSparePart, Page, SEARCH_LIMIT, SparePart,
    SparePartId, SparePartPatch, SparePartSearch,
};

use crate::application::unit_of_work::AppUnitOfWork;
use crate::database::ports::spare_parts::SparePartsRepository;
use crate::error::{CoreError, Result};

/// Spare-part inventory: picker search, paging, low-stock report and CRUD.
#[derive(Clone)]
pub struct SparePartCatalog {
    spare_parts: Arc<dyn SparePartsRepository>,
}

impl fmt::Debug for SparePartCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparePartCatalog").finish_non_exhaustive()
    }
}

impl SparePartCatalog {
    pub fn new(uow: &AppUnitOfWork) -> Self {
        Self {
            spare_parts: Arc::clone(&uow.spare_parts),
        }
    }

    /// At most [`SEARCH_LIMIT`] parts whose code or model contains the term,
    /// ignoring case. A blank term yields the newest parts.
    pub async fn search(
        &self,
        query: &SparePartSearch,
    ) -> Result<Vec<SparePart>> {
        self.spare_parts.search(query.term(), SEARCH_LIMIT).await
    }

    pub async fn list(&self, page: Page) -> Result<Vec<SparePart>> {
        self.spare_parts.list(page.normalized()).await
    }

    pub async fn low_stock(&self) -> Result<Vec<SparePart>> {
        self.spare_parts.low_stock(LOW_STOCK_THRESHOLD).await
    }

    pub async fn get(&self, id: SparePartId) -> Result<SparePart> {
        self.spare_parts
            .get(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, part: NewSparePart) -> Result<SparePart> {
        part.validate()?;
        self.spare_parts.create(part).await
    }

    pub async fn update(
        &self,
        id: SparePartId,
        patch: SparePartPatch,
    ) -> Result<SparePart> {
        patch.validate()?;
        self.spare_parts
            .update(id, patch)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn delete(&self, id: SparePartId) -> Result<()> {
        if self.spare_parts.delete(id).await? {
            Ok(())
        } else {
            Err(not_found(id))
        }
    }
}

fn not_found(id: SparePartId) -> CoreError {
    CoreError::NotFound(format!("Spare part #{id}"))
}
