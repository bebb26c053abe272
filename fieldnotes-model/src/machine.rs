use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result, ensure_len};
use crate::ids::MachineId;

/// Upper bound of the `machine_code` column.
pub const MACHINE_CODE_MAX_LEN: usize = 50;

/// The identifier printed on a machine's QR label.
///
/// Scanned payloads are opaque to the client; this type is the validation
/// boundary applied before the value reaches a query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MachineCode(String);

impl MachineCode {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidIdentifier(
                "machine code cannot be empty".to_string(),
            ));
        }
        if trimmed.chars().count() > MACHINE_CODE_MAX_LEN {
            return Err(ModelError::InvalidIdentifier(format!(
                "machine code exceeds {MACHINE_CODE_MAX_LEN} characters"
            )));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(ModelError::InvalidIdentifier(
                "machine code contains control characters".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MachineCode {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<MachineCode> for String {
    fn from(code: MachineCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for MachineCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A machine on the floor, as resolved from its QR label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineRecord {
    pub id: MachineId,
    pub machine_code: String,
    pub category: String,
    pub brand: String,
    pub model: String,
    pub arrived_date: NaiveDate,
    pub location: String,
    pub sub_location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl MachineRecord {
    /// `"<location> - <sub_location>"`, or just the location when the
    /// secondary field is absent or blank.
    pub fn location_label(&self) -> String {
        match self.sub_location.as_deref().map(str::trim) {
            Some(sub) if !sub.is_empty() => {
                format!("{} - {}", self.location, sub)
            }
            _ => self.location.clone(),
        }
    }
}

/// Registration payload for a new machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMachine {
    pub machine_code: MachineCode,
    pub category: String,
    pub brand: String,
    pub model: String,
    pub arrived_date: NaiveDate,
    pub location: String,
    #[serde(default)]
    pub sub_location: Option<String>,
}

impl NewMachine {
    pub fn validate(&self) -> Result<()> {
        ensure_len("category", &self.category, 100)?;
        ensure_len("brand", &self.brand, 100)?;
        ensure_len("model", &self.model, 100)?;
        ensure_len("location", &self.location, 100)?;
        if let Some(sub) = &self.sub_location
            && sub.chars().count() > 100
        {
            return Err(ModelError::FieldTooLong {
                field: "sub_location",
                max: 100,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sub_location: Option<&str>) -> MachineRecord {
        MachineRecord {
            id: MachineId::new(1),
            machine_code: "MCH-001".into(),
            category: "Press".into(),
            brand: "Amada".into(),
            model: "HG-1003".into(),
            arrived_date: NaiveDate::from_ymd_opt(2023, 4, 2).unwrap(),
            location: "Hall B".into(),
            sub_location: sub_location.map(str::to_string),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn machine_code_trims_and_accepts_plain_identifiers() {
        let code = MachineCode::parse("  MCH-001 ").unwrap();
        assert_eq!(code.as_str(), "MCH-001");
    }

    #[test]
    fn machine_code_rejects_blank_long_and_control_input() {
        assert!(MachineCode::parse("   ").is_err());
        assert!(MachineCode::parse(&"X".repeat(51)).is_err());
        assert!(MachineCode::parse("MCH\n001").is_err());
    }

    #[test]
    fn location_label_joins_secondary_location() {
        assert_eq!(record(Some("Bay 4")).location_label(), "Hall B - Bay 4");
        assert_eq!(record(None).location_label(), "Hall B");
        assert_eq!(record(Some("  ")).location_label(), "Hall B");
    }
}
