use async_trait::async_trait;
use fieldnotes_model::{
    NewSparePart, Page, SparePart, SparePartId, SparePartPatch,
};

use crate::error::Result;

#[async_trait]
pub trait SparePartsRepository: Send + Sync {
    async fn create(&self, part: NewSparePart) -> Result<SparePart>;

    async fn get(&self, id: SparePartId) -> Result<Option<SparePart>>;

    /// Apply a partial update and bump `updated_at`. Returns `None` when no
    /// row has the given id.
    async fn update(
        &self,
        id: SparePartId,
        patch: SparePartPatch,
    ) -> Result<Option<SparePart>>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: SparePartId) -> Result<bool>;

    /// Case-insensitive substring match on part code or model, newest first.
    /// `None` returns the newest rows unfiltered.
    async fn search(
        &self,
        term: Option<&str>,
        limit: i64,
    ) -> Result<Vec<SparePart>>;

    /// Newest first.
    async fn list(&self, page: Page) -> Result<Vec<SparePart>>;

    /// Parts with `quantity <= threshold`, lowest quantity first.
    async fn low_stock(&self, threshold: i32) -> Result<Vec<SparePart>>;
}
