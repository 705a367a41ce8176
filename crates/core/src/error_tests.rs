use super::*;

#[test]
fn cancelled_is_not_a_failure() {
    assert!(!ErrorKind::Cancelled.is_failure());
}

#[test]
fn everything_else_is_a_failure() {
    for kind in [
        ErrorKind::Invalid,
        ErrorKind::NotFound,
        ErrorKind::QueueFull,
        ErrorKind::PromptTooLarge,
        ErrorKind::LlmTimeout,
        ErrorKind::LlmRateLimit,
        ErrorKind::LlmTransient,
        ErrorKind::LlmAuth,
        ErrorKind::LlmQuota,
        ErrorKind::Io,
        ErrorKind::Internal,
    ] {
        assert!(kind.is_failure(), "{kind} should be a failure");
    }
}

#[test]
fn display_matches_snake_case_serde() {
    assert_eq!(ErrorKind::PromptTooLarge.to_string(), "prompt_too_large");
    let json = serde_json::to_string(&ErrorKind::PromptTooLarge).unwrap();
    assert_eq!(json, "\"prompt_too_large\"");
}
