use serde::{Deserialize, Serialize};

/// Standard API envelope used by every JSON endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn error(error: String) -> Self {
        Self {
            status: "error".to_string(),
            data: None,
            error: Some(error),
            message: None,
        }
    }

    pub fn with_message(mut self, message: String) -> Self {
        self.message = Some(message);
        self
    }
}

/// Body of a non-2xx response: `{"error": {"message": .., "status": ..}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub status: u16,
}

macro_rules! v1_path {
    ($path:literal) => {
        concat!("/api/v1", $path)
    };
}

/// Versioned API route definitions shared by the server and the scanner client
pub mod routes {
    pub mod v1 {
        pub const ROOT: &str = "/api/v1";
        pub const VERSION: &str = "v1";
        pub const HEALTH: &str = v1_path!("/health");

        pub mod auth {
            pub const LOGOUT: &str = v1_path!("/auth/logout");
        }

        pub mod users {
            pub const ME: &str = v1_path!("/users/me");
        }

        pub mod machines {
            pub const LOOKUP: &str = v1_path!("/machines/lookup");
            pub const ITEM: &str = v1_path!("/machines/{id}");
        }

        pub mod spare_parts {
            pub const COLLECTION: &str = v1_path!("/spareparts");
            pub const SEARCH: &str = v1_path!("/spareparts/search");
            pub const LOW_STOCK: &str = v1_path!("/spareparts/low-stock");
            pub const ITEM: &str = v1_path!("/spareparts/{id}");
        }

        pub mod services {
            pub const COLLECTION: &str = v1_path!("/services");
            pub const ITEM: &str = v1_path!("/services/{id}");
        }
    }

    /// Substitute the `{id}` segment of an item route.
    pub fn item(route: &str, id: impl std::fmt::Display) -> String {
        route.replace("{id}", &id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::routes;

    #[test]
    fn item_routes_substitute_ids() {
        assert_eq!(
            routes::item(routes::v1::services::ITEM, 42),
            "/api/v1/services/42"
        );
    }
}
