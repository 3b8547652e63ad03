use super::*;

#[test]
fn page_path_defaults_to_root() {
    assert_eq!(page_path(""), "/");
    assert_eq!(page_path("/capture"), "/capture");
}

#[test]
fn read_body_failed_message_includes_status() {
    assert_eq!(
        read_body_failed_message(502, "stream closed"),
        "failed to read response body (status 502): stream closed"
    );
}

#[test]
fn analysis_client_uses_configured_endpoints() {
    let mut config = ClientConfig::default();
    config.endpoints.analyze_answer = "/v2/answer".to_owned();
    let client = analysis_client(&config);
    assert_eq!(client.endpoints().analyze_answer, "/v2/answer");
}
