use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::ids::{MachineId, ServiceId, SparePartId, UserId};

/// A logged service event against a machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub id: ServiceId,
    pub machine_id: MachineId,
    pub spare_part_id: Option<SparePartId>,
    pub performed_by: UserId,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload submitted from the service form. The performer is never part of
/// the payload; it is taken from the authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewServiceRequest {
    pub machine_id: MachineId,
    #[serde(default)]
    pub spare_part_id: Option<SparePartId>,
    pub notes: String,
}

impl NewServiceRequest {
    pub fn validate(&self) -> Result<()> {
        if self.machine_id.get() < 1 {
            return Err(ModelError::MissingField("machine_id"));
        }
        if self.notes.trim().is_empty() {
            return Err(ModelError::MissingField("notes"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_id: Option<MachineId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spare_part_id: Option<SparePartId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ServicePatch {
    pub fn validate(&self) -> Result<()> {
        if let Some(notes) = &self.notes
            && notes.trim().is_empty()
        {
            return Err(ModelError::MissingField("notes"));
        }
        Ok(())
    }

    pub fn apply(&self, record: &mut ServiceRecord) {
        if let Some(machine_id) = self.machine_id {
            record.machine_id = machine_id;
        }
        if let Some(part) = self.spare_part_id {
            record.spare_part_id = Some(part);
        }
        if let Some(notes) = &self.notes {
            record.notes = notes.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_are_required() {
        let request = NewServiceRequest {
            machine_id: MachineId::new(1),
            spare_part_id: None,
            notes: "  ".into(),
        };
        assert_eq!(request.validate(), Err(ModelError::MissingField("notes")));
    }

    #[test]
    fn spare_part_is_optional_on_the_wire() {
        let request: NewServiceRequest =
            serde_json::from_str(r#"{"machine_id":3,"notes":"replaced belt"}"#)
                .unwrap();
        assert_eq!(request.spare_part_id, None);
        assert!(request.validate().is_ok());
    }
}
