use fieldnotes_model::{MachineId, NewServiceRequest, SparePartId};
use fieldnotes_scanner::{ApiClient, ClientError, UserSession};

mod support;

use support::{TOKEN, spawn_api};

async fn signed_in_client() -> (ApiClient, std::sync::Arc<support::MockApi>) {
    let (base_url, api) = spawn_api().await;
    let client = ApiClient::new(&base_url).unwrap();
    client.set_token(Some(TOKEN.to_string())).await;
    (client, api)
}

#[tokio::test]
async fn lookup_resolves_known_machine() {
    let (client, _) = signed_in_client().await;

    let machine = client.lookup_machine("MCH-001").await.unwrap();

    assert_eq!(machine.brand, "Amada");
    assert_eq!(machine.location_label(), "Hall B - Bay 4");
}

#[tokio::test]
async fn unknown_machine_is_not_found() {
    let (client, _) = signed_in_client().await;

    let err = client.lookup_machine("UNKNOWN").await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Machine UNKNOWN not found");
}

#[tokio::test]
async fn payload_reaches_server_verbatim() {
    let (client, api) = signed_in_client().await;

    let _ = client.lookup_machine("A&B 7/x?").await;

    assert_eq!(api.lookups(), vec!["A&B 7/x?".to_string()]);
}

#[tokio::test]
async fn server_errors_carry_envelope_message() {
    let (client, _) = signed_in_client().await;

    let err = client.lookup_machine("BOOM").await.unwrap_err();

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Internal server error");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn missing_session_is_unauthorized() {
    let (base_url, api) = spawn_api().await;
    let client = ApiClient::new(&base_url).unwrap();

    let err = client
        .submit_service(&NewServiceRequest {
            machine_id: MachineId::new(7),
            spare_part_id: None,
            notes: "replaced belt".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized));
    assert!(api.services().is_empty());
}

#[tokio::test]
async fn search_forwards_query_and_omits_blank_one() {
    let (client, _) = signed_in_client().await;

    let codes: Vec<String> = client
        .search_spare_parts(Some("bolt"))
        .await
        .unwrap()
        .into_iter()
        .map(|part| part.part_code)
        .collect();
    assert_eq!(codes, vec!["BOLT-22", "SEAL-01"]);

    assert_eq!(client.search_spare_parts(Some("  ")).await.unwrap().len(), 3);
    assert_eq!(client.search_spare_parts(None).await.unwrap().len(), 3);
}

#[tokio::test]
async fn submit_service_returns_created_record() {
    let (client, api) = signed_in_client().await;

    let record = client
        .submit_service(&NewServiceRequest {
            machine_id: MachineId::new(7),
            spare_part_id: Some(SparePartId::new(11)),
            notes: "replaced belt".into(),
        })
        .await
        .unwrap();

    assert_eq!(record.machine_id, MachineId::new(7));
    assert_eq!(api.services().len(), 1);
}

#[tokio::test]
async fn ending_the_session_logs_out_and_forgets_token() {
    let (client, api) = signed_in_client().await;

    client.end_session().await.unwrap();

    assert_eq!(api.logouts(), 1);
    assert!(!client.has_token().await);
    assert!(matches!(
        client.lookup_machine("MCH-001").await,
        Err(ClientError::Unauthorized)
    ));
}
