use serde::{Deserialize, Serialize};

macro_rules! serial_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i32);

        impl $name {
            pub fn new(raw: i32) -> Self {
                Self(raw)
            }

            pub fn get(self) -> i32 {
                self.0
            }
        }

        impl From<i32> for $name {
            fn from(raw: i32) -> Self {
                Self(raw)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

serial_id!(
    /// Database key of a machine row (not the QR-encoded machine code)
    MachineId
);
serial_id!(
    /// Database key of a spare part row
    SparePartId
);
serial_id!(
    /// Database key of a logged service event
    ServiceId
);
serial_id!(
    /// Database key of a local user mirrored from the identity provider
    UserId
);
