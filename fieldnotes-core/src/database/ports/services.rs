use async_trait::async_trait;
use fieldnotes_model::{
    MachineId, ServiceId, ServicePatch, ServiceRecord, SparePartId, UserId,
};

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct NewService {
    pub machine_id: MachineId,
    pub spare_part_id: Option<SparePartId>,
    pub performed_by: UserId,
    pub notes: String,
}

#[async_trait]
pub trait ServicesRepository: Send + Sync {
    async fn create(&self, service: NewService) -> Result<ServiceRecord>;

    async fn get(&self, id: ServiceId) -> Result<Option<ServiceRecord>>;

    /// Newest first.
    async fn list(&self) -> Result<Vec<ServiceRecord>>;

    async fn update(
        &self,
        id: ServiceId,
        patch: ServicePatch,
    ) -> Result<Option<ServiceRecord>>;

    async fn delete(&self, id: ServiceId) -> Result<bool>;
}
