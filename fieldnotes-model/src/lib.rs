//! Core data model definitions shared across Fieldnotes crates.
#![allow(missing_docs)]

pub mod api;
pub mod error;
pub mod ids;
pub mod machine;
pub mod service;
pub mod spare_part;
pub mod user;

pub use api::{ApiResponse, ErrorBody, ErrorEnvelope};
pub use error::{ModelError, Result as ModelResult};
pub use ids::{MachineId, ServiceId, SparePartId, UserId};
pub use machine::{MACHINE_CODE_MAX_LEN, MachineCode, MachineRecord, NewMachine};
pub use service::{NewServiceRequest, ServicePatch, ServiceRecord};
pub use spare_part::{
    DEFAULT_PAGE_SIZE, LOW_STOCK_THRESHOLD, MAX_PAGE_SIZE, NewSparePart, Page,
    SEARCH_LIMIT, SparePart, SparePartPatch, SparePartSearch,
};
pub use user::{User, UserUpsert};
