use functional_jobs::transport::{
    HttpTransport, MethodOverride, Paging, RequestOptions, Transport, TransportError,
};
use wiremock::matchers::{body_string, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn get_sends_bearer_and_paging_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/gradings"))
        .and(header("authorization", "Bearer tok-1"))
        .and(header("navigationPage", "2"))
        .and(header("navigationPageSize", "25"))
        .and(header_exists("requestId"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"jobs":[]}"#))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let url = format!("{}/services/gradings", server.uri());
    let body = transport
        .get(
            &url,
            "tok-1",
            Some(Paging {
                page: 2,
                page_size: 25,
            }),
        )
        .await
        .unwrap();
    assert_eq!(body, r#"{"jobs":[]}"#);
}

#[tokio::test]
async fn post_with_override_and_media_types() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/gradings"))
        .and(header("X-HTTP-Method-Override", "GET"))
        .and(header("content-type", "application/xml"))
        .and(header("accept", "application/xml"))
        .and(body_string("<job/>"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<jobs/>"))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let options = RequestOptions {
        method_override: Some(MethodOverride::Get),
        content_type: Some("application/xml".into()),
        accept: Some("application/xml".into()),
    };
    let url = format!("{}/services/gradings", server.uri());
    let body = transport.post(&url, "tok", "<job/>", &options).await.unwrap();
    assert_eq!(body, "<jobs/>");
}

#[tokio::test]
async fn put_with_delete_override() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/services/gradings"))
        .and(header("X-HTTP-Method-Override", "DELETE"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"deletes":[]}"#))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let url = format!("{}/services/gradings", server.uri());
    let options = RequestOptions::overriding(MethodOverride::Delete);
    let body = transport
        .put(&url, "tok", r#"{"deletes":[]}"#, &options)
        .await
        .unwrap();
    assert_eq!(body, r#"{"deletes":[]}"#);
}

#[tokio::test]
async fn not_found_is_distinguished() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let url = format!("{}/services/gradings/abc-123", server.uri());
    let err = transport.get(&url, "tok", None).await.unwrap_err();
    match err {
        TransportError::NotFound { url: reported } => assert_eq!(reported, url),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database down"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let url = format!("{}/services/gradings/abc-123", server.uri());
    let err = transport
        .delete(&url, "tok", None, &RequestOptions::default())
        .await
        .unwrap_err();
    match err {
        TransportError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database down");
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn connection_failure_is_network_error() {
    let transport = HttpTransport::new().unwrap();
    // Port 9 (discard) is not expected to accept HTTP connections.
    let err = transport
        .get("http://127.0.0.1:9/services/gradings", "tok", None)
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Network(_)));
}
