use super::*;

#[test]
fn round_1_drafts_with_writer() {
    assert_eq!(Role::drafting_role_for(1), Role::Writer);
}

#[test]
fn later_rounds_draft_with_modifier() {
    assert_eq!(Role::drafting_role_for(2), Role::Modifier);
    assert_eq!(Role::drafting_role_for(10), Role::Modifier);
}

#[test]
fn role_display_matches_serde_tag() {
    for (role, text) in [
        (Role::Writer, "writer"),
        (Role::Modifier, "modifier"),
        (Role::Reviewer, "reviewer"),
    ] {
        assert_eq!(role.to_string(), text);
        assert_eq!(serde_json::to_string(&role).unwrap(), format!("\"{text}\""));
    }
}

#[test]
fn round_view_serializes_only_present_fields() {
    let view = RoundView {
        writer: Some(Round::new("job-1", 1, Role::Writer, "p", "r", 1, 2)),
        modifier: None,
        reviewer: None,
    };
    let json = serde_json::to_value(&view).unwrap();
    assert!(json.get("writer").is_some());
    assert!(json.get("modifier").is_none());
    assert!(json.get("reviewer").is_none());
}
