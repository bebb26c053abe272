use std::fmt;
use std::sync::Arc;

use fieldnotes_model::{
    NewServiceRequest, ServiceId, ServicePatch, ServiceRecord, UserId,
};
use tracing::info;

use crate::application::unit_of_work::AppUnitOfWork;
use crate::database::ports::services::{NewService, ServicesRepository};
use crate::error::{CoreError, Result};

/// Service events logged against machines.
///
/// Every mutation takes the acting user explicitly; `None` is rejected with
/// `Unauthorized` before the repository is touched.
#[derive(Clone)]
pub struct ServiceLog {
    services: Arc<dyn ServicesRepository>,
}

impl fmt::Debug for ServiceLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceLog").finish_non_exhaustive()
    }
}

fn require_actor(actor: Option<UserId>) -> Result<UserId> {
    actor.ok_or_else(|| CoreError::Unauthorized("Authentication required".into()))
}

impl ServiceLog {
    pub fn new(uow: &AppUnitOfWork) -> Self {
        Self {
            services: Arc::clone(&uow.services),
        }
    }

    pub async fn create(
        &self,
        actor: Option<UserId>,
        request: NewServiceRequest,
    ) -> Result<ServiceRecord> {
        let performed_by = require_actor(actor)?;
        request.validate()?;

        let record = self
            .services
            .create(NewService {
                machine_id: request.machine_id,
                spare_part_id: request.spare_part_id,
                performed_by,
                notes: request.notes.trim().to_string(),
            })
            .await?;

        info!(
            service_id = %record.id,
            machine_id = %record.machine_id,
            performed_by = %performed_by,
            "service logged"
        );
        Ok(record)
    }

    pub async fn get(&self, id: ServiceId) -> Result<ServiceRecord> {
        self.services
            .get(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn list(&self) -> Result<Vec<ServiceRecord>> {
        self.services.list().await
    }

    pub async fn update(
        &self,
        actor: Option<UserId>,
        id: ServiceId,
        patch: ServicePatch,
    ) -> Result<ServiceRecord> {
        require_actor(actor)?;
        patch.validate()?;
        self.services
            .update(id, patch)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn delete(
        &self,
        actor: Option<UserId>,
        id: ServiceId,
    ) -> Result<()> {
        require_actor(actor)?;
        if self.services.delete(id).await? {
            Ok(())
        } else {
            Err(not_found(id))
        }
    }
}

fn not_found(id: ServiceId) -> CoreError {
    CoreError::NotFound(format!("Service #{id}"))
}
