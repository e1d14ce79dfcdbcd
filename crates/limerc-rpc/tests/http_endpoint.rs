//! End-to-end tests of the HTTP transport against a mock RemoteControl endpoint.

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use limerc_core::{CallRequest, Credentials, RpcOutcome, SessionState, TransportFaultKind};
use limerc_rpc::{HttpTransport, RpcDispatcher, RpcError};

const ENDPOINT: &str = "/index.php/admin/remotecontrol";

fn reply(id: u64, result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"id": id, "result": result, "error": null}))
}

fn rpc(method_name: &str) -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_partial_json(json!({"method": method_name})))
}

fn dispatcher(server: &MockServer, timeout: Duration) -> RpcDispatcher {
    let transport = HttpTransport::new(format!("{}{ENDPOINT}", server.uri()), "limerc-test").unwrap();
    RpcDispatcher::new(Arc::new(transport), timeout)
}

fn creds() -> Credentials {
    Credentials::new("admin", "s3cret")
}

async fn mount_login(server: &MockServer) {
    rpc("get_session_key")
        .respond_with(reply(1, json!("abcd1234")))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_release(server: &MockServer, times: u64) {
    rpc("release_session_key")
        .and(body_partial_json(json!({"params": ["abcd1234"]})))
        .respond_with(reply(3, json!("OK")))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn full_session_over_http() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    rpc("get_survey_properties")
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({"params": ["abcd1234", 123]})))
        .respond_with(reply(2, json!({"sid": 123, "active": "Y"})))
        .expect(1)
        .mount(&server)
        .await;
    mount_release(&server, 1).await;

    let mut client = dispatcher(&server, Duration::from_secs(5));
    let outcome = client
        .execute(CallRequest::freeform("get_survey_properties 123"), &creds())
        .await
        .unwrap();

    assert_eq!(outcome, RpcOutcome::Success(json!({"sid": 123, "active": "Y"})));
    assert_eq!(client.session_state(), SessionState::None);

    let requests = server.received_requests().await.unwrap();
    let bodies: Vec<Value> = requests
        .iter()
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect();
    assert_eq!(
        bodies[0],
        json!({"method": "get_session_key", "params": ["admin", "s3cret"], "id": 1})
    );
    assert_eq!(bodies[1]["id"], json!(2));
    assert_eq!(bodies[2]["id"], json!(3));
}

#[tokio::test]
async fn remote_error_member_is_fault_and_releases() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    rpc("list_participants")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 2,
            "result": null,
            "error": {"message": "Invalid survey ID", "code": 2}
        })))
        .mount(&server)
        .await;
    mount_release(&server, 1).await;

    let mut client = dispatcher(&server, Duration::from_secs(5));
    let outcome = client
        .execute(CallRequest::freeform("list_participants 9"), &creds())
        .await
        .unwrap();

    assert_matches!(outcome, RpcOutcome::Fault(fault) => {
        assert_eq!(fault.message, "Invalid survey ID");
        assert_eq!(fault.code, Some(json!(2)));
    });
}

#[tokio::test]
async fn http_500_is_protocol_error_and_releases() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    rpc("export_responses")
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;
    mount_release(&server, 1).await;

    let mut client = dispatcher(&server, Duration::from_secs(5));
    let err = client
        .execute(CallRequest::freeform("export_responses 5 json"), &creds())
        .await
        .unwrap_err();

    assert_matches!(err, RpcError::Transport(fault) => {
        assert_eq!(fault.kind, TransportFaultKind::ProtocolError);
        assert!(fault.detail.starts_with("HTTP 500"));
        assert!(fault.detail.contains("Internal Server Error"));
    });
}

#[tokio::test]
async fn html_body_is_protocol_error() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    rpc("list_surveys")
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;
    mount_release(&server, 1).await;

    let mut client = dispatcher(&server, Duration::from_secs(5));
    let err = client
        .execute(CallRequest::freeform("list_surveys"), &creds())
        .await
        .unwrap_err();
    assert_eq!(err.transport_kind(), Some(TransportFaultKind::ProtocolError));
}

#[tokio::test]
async fn slow_method_times_out_and_still_releases() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    rpc("list_surveys")
        .respond_with(reply(2, json!([])).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;
    mount_release(&server, 1).await;

    let mut client = dispatcher(&server, Duration::from_millis(300));
    let err = client
        .execute(CallRequest::freeform("list_surveys"), &creds())
        .await
        .unwrap_err();

    assert_eq!(err.transport_kind(), Some(TransportFaultKind::Timeout));
    assert_eq!(err.category(), "timeout");
}

#[tokio::test]
async fn invalid_credentials_status_skips_release() {
    let server = MockServer::start().await;
    rpc("get_session_key")
        .respond_with(reply(1, json!({"status": "Invalid user name or password"})))
        .expect(1)
        .mount(&server)
        .await;
    rpc("release_session_key")
        .respond_with(reply(2, json!("OK")))
        .expect(0)
        .mount(&server)
        .await;

    let mut client = dispatcher(&server, Duration::from_secs(5));
    let err = client
        .execute(CallRequest::freeform("list_surveys"), &creds())
        .await
        .unwrap_err();
    assert_matches!(err, RpcError::Authentication { .. });
}

#[tokio::test]
async fn closed_port_is_connection_refused() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let transport =
        HttpTransport::new(format!("http://127.0.0.1:{port}{ENDPOINT}"), "limerc-test").unwrap();
    let mut client = RpcDispatcher::new(Arc::new(transport), Duration::from_secs(5));

    let err = client
        .execute(CallRequest::freeform("list_surveys"), &creds())
        .await
        .unwrap_err();
    assert_eq!(err.transport_kind(), Some(TransportFaultKind::ConnectionRefused));
}

#[tokio::test]
async fn unresolvable_host_is_dns_failure() {
    let transport =
        HttpTransport::new(format!("http://limerc-test.invalid{ENDPOINT}"), "limerc-test").unwrap();
    let mut client = RpcDispatcher::new(Arc::new(transport), Duration::from_secs(10));

    let err = client
        .execute(CallRequest::freeform("list_surveys"), &creds())
        .await
        .unwrap_err();
    assert_eq!(err.transport_kind(), Some(TransportFaultKind::DnsFailure));
}
