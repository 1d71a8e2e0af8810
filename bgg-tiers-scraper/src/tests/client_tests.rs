use super::*;

fn creds() -> Credentials {
    Credentials {
        user: "alice".to_string(),
        api_key: "token".to_string(),
    }
}

#[test]
fn test_collection_query_requests_owned_without_expansions() {
    let query = collection_query("alice");
    assert_eq!(
        query,
        vec![
            ("username", "alice".to_string()),
            ("own", "1".to_string()),
            ("excludesubtype", "boardgameexpansion".to_string()),
        ]
    );
}

#[test]
fn test_status_ok() {
    assert!(check_collection_status(StatusCode::OK, "<items/>", "alice").is_ok());
}

#[test]
fn test_status_accepted_is_queued() {
    let err = check_collection_status(StatusCode::ACCEPTED, "<message>queued</message>", "alice")
        .unwrap_err();
    assert!(matches!(err, ScrapeError::CollectionQueued(ref u) if u == "alice"));
}

#[test]
fn test_status_unauthorized() {
    for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
        let err = check_collection_status(status, "", "alice").unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidCredentials(_)));
    }
}

#[test]
fn test_status_server_error_truncates_body() {
    let body = "x".repeat(500);
    let err = check_collection_status(StatusCode::SERVICE_UNAVAILABLE, &body, "alice").unwrap_err();
    match err {
        ScrapeError::ServerError { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message.len(), 200);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_client_construction() {
    let client = BggClient::new(creds()).unwrap();
    assert_eq!(client.credentials().user, "alice");
}

#[test]
fn test_request_timeout_is_thirty_seconds() {
    assert_eq!(REQUEST_TIMEOUT, Duration::from_secs(30));
}
