use patentloom_core::ErrorKind;
use patentloom_gateway::GatewayError;

use super::*;

#[test]
fn cancelled_maps_to_cancelled_kind() {
    assert_eq!(EngineError::Cancelled.kind(), ErrorKind::Cancelled);
}

#[test]
fn gateway_error_kind_is_delegated() {
    let err = EngineError::Gateway(GatewayError::Auth);
    assert_eq!(err.kind(), GatewayError::Auth.kind());
}
