use std::fmt;
use std::sync::Arc;

use fieldnotes_model::{MachineCode, MachineId, MachineRecord, NewMachine};
use tracing::debug;

use crate::application::unit_of_work::AppUnitOfWork;
use crate::database::ports::machines::MachinesRepository;
use crate::error::{CoreError, Result};

/// Resolves scanned identifiers to machine records.
///
/// No caching and no retries: every call is one repository round-trip.
#[derive(Clone)]
pub struct MachineLookup {
    machines: Arc<dyn MachinesRepository>,
}

impl fmt::Debug for MachineLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineLookup").finish_non_exhaustive()
    }
}

impl MachineLookup {
    pub fn new(uow: &AppUnitOfWork) -> Self {
        Self {
            machines: Arc::clone(&uow.machines),
        }
    }

    /// Look up the machine whose QR label carries `identifier`.
    ///
    /// Scanners forward the decoded payload as is; it is validated here.
    /// A payload that cannot be a machine code (blank, too long, control
    /// characters) resolves to nothing, the same as an unknown code.
    pub async fn resolve(&self, identifier: &str) -> Result<MachineRecord> {
        let code = match MachineCode::parse(identifier) {
            Ok(code) => code,
            Err(err) => {
                debug!(error = %err, "scanned payload is not a machine code");
                return Err(CoreError::NotFound(format!(
                    "Machine {}",
                    identifier.trim().escape_debug()
                )));
            }
        };
        debug!(machine_code = %code, "resolving machine");

        self.machines
            .find_by_code(&code)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Machine {code}")))
    }

    pub async fn get(&self, id: MachineId) -> Result<MachineRecord> {
        self.machines
            .get(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Machine #{id}")))
    }

    pub async fn register(&self, machine: NewMachine) -> Result<MachineRecord> {
        machine.validate()?;
        self.machines.create(machine).await
    }
}
