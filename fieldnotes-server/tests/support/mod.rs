use std::{sync::Arc, time::Duration};

use axum_test::TestServer;
use chrono::NaiveDate;
use fieldnotes_config::{
    AuthConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig,
    ServerConfig,
};
use fieldnotes_core::{
    AppUnitOfWork, MachineLookup, database::InMemoryStore,
};
use fieldnotes_model::{MachineCode, MachineRecord, NewMachine, User, UserUpsert};
use fieldnotes_server::{AppState, create_app};

#[allow(unused)]
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub store: InMemoryStore,
    pub user: User,
    pub token: String,
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseConfig {
            primary_url: None,
            max_connections: 1,
            min_connections: 1,
        },
        cors: CorsConfig {
            allowed_origins: vec!["http://localhost:5173".into()],
            allowed_methods: vec!["GET".into(), "POST".into()],
            allowed_headers: vec!["Authorization".into()],
            allow_credentials: false,
        },
        auth: AuthConfig {
            token_key: "integration-test-token-key-0123456789".into(),
            session_ttl: Duration::from_secs(3600),
        },
        dev_mode: false,
        metadata: ConfigMetadata::default(),
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// In-memory app with one signed-in technician.
pub async fn build_test_app() -> TestApp {
    let store = InMemoryStore::new();
    let uow = Arc::new(AppUnitOfWork::in_memory(store.clone()));
    let state = AppState::new(uow, Arc::new(test_config()))
        .expect("state builds");

    let user = state
        .users
        .upsert(UserUpsert {
            external_id: "idp|tech-1".into(),
            full_name: "Dana Okafor".into(),
        })
        .await
        .expect("user upsert");
    let token = state.sessions.issue(user.id).await.expect("session").token;

    let server = TestServer::new(create_app(state.clone())).unwrap();

    TestApp {
        server,
        state,
        store,
        user,
        token,
    }
}

#[allow(unused)]
pub async fn register_machine(
    state: &AppState,
    code: &str,
    sub_location: Option<&str>,
) -> MachineRecord {
    MachineLookup::new(&state.unit_of_work)
        .register(NewMachine {
            machine_code: MachineCode::parse(code).unwrap(),
            category: "Press".into(),
            brand: "Amada".into(),
            model: "HG-1003".into(),
            arrived_date: NaiveDate::from_ymd_opt(2023, 4, 2).unwrap(),
            location: "Hall B".into(),
            sub_location: sub_location.map(str::to_string),
        })
        .await
        .unwrap()
}
