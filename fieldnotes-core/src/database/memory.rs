//! Process-local repository adapters.
//!
//! All five ports share one [`InMemoryStore`] so the relational rules of the
//! PostgreSQL schema (unique codes, foreign keys, cascade and set-null on
//! delete) hold across them.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fieldnotes_model::{
    MachineCode, MachineId, MachineRecord, NewMachine, NewSparePart, Page,
    ServiceId, ServicePatch, ServiceRecord, SparePart, SparePartId,
    SparePartPatch, User, UserId, UserUpsert,
};
use tokio::sync::RwLock;

use crate::database::ports::{
    machines::MachinesRepository,
    services::{NewService, ServicesRepository},
    sessions::{NewSession, SessionRecord, SessionsRepository},
    spare_parts::SparePartsRepository,
    users::UsersRepository,
};
use crate::error::{CoreError, Result};

#[derive(Debug, Default)]
struct Tables {
    machines: Vec<MachineRecord>,
    spare_parts: Vec<SparePart>,
    services: Vec<ServiceRecord>,
    users: Vec<User>,
    sessions: Vec<SessionRecord>,
    next_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Shared backing state for every in-memory repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of logged service events.
    pub async fn service_count(&self) -> usize {
        self.tables.read().await.services.len()
    }

    /// Overwrite a spare part's creation time, for ordering tests.
    pub async fn set_spare_part_created_at(
        &self,
        id: SparePartId,
        created_at: DateTime<Utc>,
    ) {
        let mut tables = self.tables.write().await;
        if let Some(part) = tables.spare_parts.iter_mut().find(|p| p.id == id) {
            part.created_at = created_at;
        }
    }
}

fn newest_first<T>(rows: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, i32)) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl MachinesRepository for InMemoryStore {
    async fn find_by_code(
        &self,
        code: &MachineCode,
    ) -> Result<Option<MachineRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .machines
            .iter()
            .find(|m| m.machine_code == code.as_str())
            .cloned())
    }

    async fn get(&self, id: MachineId) -> Result<Option<MachineRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.machines.iter().find(|m| m.id == id).cloned())
    }

    async fn create(&self, machine: NewMachine) -> Result<MachineRecord> {
        let mut tables = self.tables.write().await;
        if tables
            .machines
            .iter()
            .any(|m| m.machine_code == machine.machine_code.as_str())
        {
            return Err(CoreError::Conflict(format!(
                "machine code {} already exists",
                machine.machine_code
            )));
        }
        let record = MachineRecord {
            id: MachineId::new(tables.next_id()),
            machine_code: machine.machine_code.into(),
            category: machine.category,
            brand: machine.brand,
            model: machine.model,
            arrived_date: machine.arrived_date,
            location: machine.location,
            sub_location: machine.sub_location,
            created_at: Utc::now(),
            updated_at: None,
        };
        tables.machines.push(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl SparePartsRepository for InMemoryStore {
    async fn create(&self, part: NewSparePart) -> Result<SparePart> {
        let mut tables = self.tables.write().await;
        if tables
            .spare_parts
            .iter()
            .any(|p| p.part_code == part.part_code)
        {
            return Err(CoreError::Conflict(format!(
                "part code {} already exists",
                part.part_code
            )));
        }
        let record = SparePart {
            id: SparePartId::new(tables.next_id()),
            part_code: part.part_code,
            category: part.category,
            brand: part.brand,
            model: part.model,
            arrived_date: part.arrived_date,
            quantity: part.quantity,
            created_at: Utc::now(),
            updated_at: None,
        };
        tables.spare_parts.push(record.clone());
        Ok(record)
    }

    async fn get(&self, id: SparePartId) -> Result<Option<SparePart>> {
        let tables = self.tables.read().await;
        Ok(tables.spare_parts.iter().find(|p| p.id == id).cloned())
    }

    async fn update(
        &self,
        id: SparePartId,
        patch: SparePartPatch,
    ) -> Result<Option<SparePart>> {
        let mut tables = self.tables.write().await;
        if let Some(code) = &patch.part_code
            && tables
                .spare_parts
                .iter()
                .any(|p| p.id != id && &p.part_code == code)
        {
            return Err(CoreError::Conflict(format!(
                "part code {code} already exists"
            )));
        }
        let Some(part) = tables.spare_parts.iter_mut().find(|p| p.id == id)
        else {
            return Ok(None);
        };
        patch.apply(part);
        part.updated_at = Some(Utc::now());
        Ok(Some(part.clone()))
    }

    async fn delete(&self, id: SparePartId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.spare_parts.len();
        tables.spare_parts.retain(|p| p.id != id);
        let removed = tables.spare_parts.len() != before;
        if removed {
            for service in &mut tables.services {
                if service.spare_part_id == Some(id) {
                    service.spare_part_id = None;
                }
            }
        }
        Ok(removed)
    }

    async fn search(
        &self,
        term: Option<&str>,
        limit: i64,
    ) -> Result<Vec<SparePart>> {
        let tables = self.tables.read().await;
        let needle = term.map(str::to_lowercase);
        let mut rows: Vec<SparePart> = tables
            .spare_parts
            .iter()
            .filter(|p| match &needle {
                Some(needle) => {
                    p.part_code.to_lowercase().contains(needle)
                        || p.model.to_lowercase().contains(needle)
                }
                None => true,
            })
            .cloned()
            .collect();
        newest_first(&mut rows, |p| (p.created_at, p.id.get()));
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn list(&self, page: Page) -> Result<Vec<SparePart>> {
        let tables = self.tables.read().await;
        let mut rows = tables.spare_parts.clone();
        newest_first(&mut rows, |p| (p.created_at, p.id.get()));
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(0);
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn low_stock(&self, threshold: i32) -> Result<Vec<SparePart>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<SparePart> = tables
            .spare_parts
            .iter()
            .filter(|p| p.quantity <= threshold)
            .cloned()
            .collect();
        rows.sort_by_key(|p| (p.quantity, p.id));
        Ok(rows)
    }
}

#[async_trait]
impl ServicesRepository for InMemoryStore {
    async fn create(&self, service: NewService) -> Result<ServiceRecord> {
        let mut tables = self.tables.write().await;
        if !tables.machines.iter().any(|m| m.id == service.machine_id) {
            return Err(CoreError::Validation(
                "Failed to create service: referenced record does not exist"
                    .into(),
            ));
        }
        if let Some(part) = service.spare_part_id
            && !tables.spare_parts.iter().any(|p| p.id == part)
        {
            return Err(CoreError::Validation(
                "Failed to create service: referenced record does not exist"
                    .into(),
            ));
        }
        if !tables.users.iter().any(|u| u.id == service.performed_by) {
            return Err(CoreError::Validation(
                "Failed to create service: referenced record does not exist"
                    .into(),
            ));
        }
        let record = ServiceRecord {
            id: ServiceId::new(tables.next_id()),
            machine_id: service.machine_id,
            spare_part_id: service.spare_part_id,
            performed_by: service.performed_by,
            notes: service.notes,
            created_at: Utc::now(),
            updated_at: None,
        };
        tables.services.push(record.clone());
        Ok(record)
    }

    async fn get(&self, id: ServiceId) -> Result<Option<ServiceRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.services.iter().find(|s| s.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<ServiceRecord>> {
        let tables = self.tables.read().await;
        let mut rows = tables.services.clone();
        newest_first(&mut rows, |s| (s.created_at, s.id.get()));
        Ok(rows)
    }

    async fn update(
        &self,
        id: ServiceId,
        patch: ServicePatch,
    ) -> Result<Option<ServiceRecord>> {
        let mut tables = self.tables.write().await;
        if let Some(machine_id) = patch.machine_id
            && !tables.machines.iter().any(|m| m.id == machine_id)
        {
            return Err(CoreError::Validation(
                "Failed to update service: referenced record does not exist"
                    .into(),
            ));
        }
        let Some(record) = tables.services.iter_mut().find(|s| s.id == id)
        else {
            return Ok(None);
        };
        patch.apply(record);
        record.updated_at = Some(Utc::now());
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: ServiceId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.services.len();
        tables.services.retain(|s| s.id != id);
        Ok(tables.services.len() != before)
    }
}

#[async_trait]
impl UsersRepository for InMemoryStore {
    async fn upsert(&self, user: UserUpsert) -> Result<User> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        if let Some(existing) = tables
            .users
            .iter_mut()
            .find(|u| u.external_id == user.external_id)
        {
            existing.full_name = user.full_name;
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let record = User {
            id: UserId::new(tables.next_id()),
            external_id: user.external_id,
            full_name: user.full_name,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(record.clone());
        Ok(record)
    }

    async fn get(&self, id: UserId) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.external_id == external_id)
            .cloned())
    }
}

#[async_trait]
impl SessionsRepository for InMemoryStore {
    async fn create(&self, session: NewSession) -> Result<SessionRecord> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == session.user_id) {
            return Err(CoreError::Validation(
                "Failed to create session: referenced record does not exist"
                    .into(),
            ));
        }
        let record = SessionRecord {
            id: tables.next_id(),
            user_id: session.user_id,
            token_hash: session.token_hash,
            created_at: Utc::now(),
            expires_at: session.expires_at,
            revoked_at: None,
        };
        tables.sessions.push(record.clone());
        Ok(record)
    }

    async fn find_active_by_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .sessions
            .iter()
            .find(|s| s.token_hash == token_hash && s.is_active(now))
            .cloned())
    }

    async fn revoke(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables
            .sessions
            .iter_mut()
            .find(|s| s.token_hash == token_hash && s.revoked_at.is_none())
        {
            Some(session) => {
                session.revoked_at = Some(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
