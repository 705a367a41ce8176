use patentloom_core::ErrorKind;

use super::*;

#[test]
fn too_large_maps_to_prompt_too_large() {
    assert_eq!(PromptError::TooLarge.kind(), ErrorKind::PromptTooLarge);
}

#[test]
fn invalid_template_maps_to_invalid() {
    let err = PromptError::InvalidTemplate { role: "writer", reason: "empty role line".into() };
    assert_eq!(err.kind(), ErrorKind::Invalid);
}
