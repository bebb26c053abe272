use async_trait::async_trait;
use fieldnotes_model::{MachineCode, MachineId, MachineRecord, NewMachine};

use crate::error::Result;

#[async_trait]
pub trait MachinesRepository: Send + Sync {
    /// Exact match on the code printed on the machine's QR label.
    async fn find_by_code(
        &self,
        code: &MachineCode,
    ) -> Result<Option<MachineRecord>>;

    async fn get(&self, id: MachineId) -> Result<Option<MachineRecord>>;

    async fn create(&self, machine: NewMachine) -> Result<MachineRecord>;
}
