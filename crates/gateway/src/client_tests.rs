use super::*;

#[test]
fn classifies_auth_and_quota_as_non_retryable() {
    assert!(matches!(classify_status(401, "no".into(), None), GatewayError::Auth));
    assert!(matches!(classify_status(403, "no".into(), None), GatewayError::Auth));
    assert!(matches!(classify_status(402, "no".into(), None), GatewayError::Quota));
}

#[test]
fn classifies_rate_limit_with_retry_after() {
    let err = classify_status(429, "slow down".into(), Some(2000));
    match err {
        GatewayError::RateLimit { retry_after_ms } => assert_eq!(retry_after_ms, Some(2000)),
        other => panic!("expected RateLimit, got {other:?}"),
    }
}

#[test]
fn classifies_server_errors_as_transient() {
    assert!(matches!(classify_status(503, "oops".into(), None), GatewayError::Transient(_)));
}

#[test]
fn classifies_bad_request_as_invalid() {
    assert!(matches!(classify_status(400, "bad".into(), None), GatewayError::Invalid(_)));
}

#[tokio::test]
async fn fake_client_repeats_last_response_after_exhaustion() {
    let fake = FakeLlmClient::new(vec![Ok("first".to_string()), Ok("second".to_string())]);
    assert_eq!(fake.complete("p").await.unwrap(), "first");
    assert_eq!(fake.complete("p").await.unwrap(), "second");
    assert_eq!(fake.complete("p").await.unwrap(), "second");
    assert_eq!(fake.call_count(), 3);
}
