//! Mock tests for the QQ processor client
//!
//! These tests use WireMock to simulate the processor endpoints and verify
//! headers, signing, endpoint routing and the retry behaviour of the client.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_partial_json, body_string, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::TransformConfig;
    use crate::core::TransformService;
    use crate::error::{ErrorKind, TransformError};
    use crate::services::qq::{Capability, QqClient, TransformRequest, ORIGIN, REFERER};
    use crate::signing::SignedPayload;
    use crate::tests::mock_config;

    /// Creates a test client configured to use the mock server
    fn create_test_client(mock_server: &MockServer) -> QqClient {
        QqClient::new(mock_config(&mock_server.uri()), None)
            .expect("Failed to build QQ client")
    }

    fn payload(capability: Capability) -> SignedPayload {
        let request = TransformRequest::new(capability, b"not really a jpeg".to_vec());
        SignedPayload::from_request(&request).expect("Failed to sign request")
    }

    fn success_body(base: &str) -> serde_json::Value {
        let extra = json!({
            "img_urls": [format!("{}/img/0.jpg", base), format!("{}/img/1.jpg", base)]
        });
        json!({"code": 0, "msg": "", "extra": extra.to_string()})
    }

    #[tokio::test]
    async fn test_upload_sends_signed_request() {
        let mock_server = MockServer::start().await;
        let payload = payload(Capability::DifferentDimensionMe);

        Mock::given(method("POST"))
            .and(path("/overseas/process"))
            .and(header("Origin", ORIGIN))
            .and(header("Referer", REFERER))
            .and(header_exists("User-Agent"))
            .and(header("Content-Type", "application/json"))
            .and(header("x-sign-version", "v1"))
            .and(header("x-sign-value", payload.signature.as_str()))
            .and(body_string(payload.body.clone()))
            .and(body_partial_json(json!({"busiId": "different_dimension_me_img_entry"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("https://cdn")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let output = client.upload(Capability::DifferentDimensionMe, &payload).await.unwrap();

        assert_eq!(output.img_urls, vec!["https://cdn/img/0.jpg", "https://cdn/img/1.jpg"]);
        assert_eq!(output.result_url().unwrap(), "https://cdn/img/1.jpg");
    }

    #[tokio::test]
    async fn test_ai_painting_uses_its_own_endpoint() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/process"))
            .and(body_partial_json(json!({"busiId": "ai_painting_anime_img_entry"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("https://cdn")))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/overseas/process"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client.upload(Capability::AiPaintingAnime, &payload(Capability::AiPaintingAnime)).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_face_not_found_is_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/overseas/process"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 1001, "msg": "no face"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let err = client
            .upload(Capability::DifferentDimensionMe, &payload(Capability::DifferentDimensionMe))
            .await
            .unwrap_err();

        assert_eq!(err, TransformError::face_not_found());
    }

    #[tokio::test]
    async fn test_blocked_is_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 2119})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let err = client
            .upload(Capability::DifferentDimensionMe, &payload(Capability::DifferentDimensionMe))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Blocked);
        assert_eq!(err.to_string(), "Blocked by qq. Change ip location.");
    }

    #[tokio::test]
    async fn test_rate_limit_exhausts_upload_attempts() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/overseas/process"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"msg": "VOLUMN_LIMIT"})))
            .expect(4)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let err = client
            .upload(Capability::DifferentDimensionMe, &payload(Capability::DifferentDimensionMe))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ExhaustedRetries);
        assert_eq!(err.to_string(), "QQ rate limit caught");
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .up_to_n_times(2)
            .expect(2)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("https://cdn")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let output = client
            .upload(Capability::DifferentDimensionMe, &payload(Capability::DifferentDimensionMe))
            .await
            .unwrap();

        assert_eq!(output.img_urls.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_and_garbled_bodies_are_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0, "msg": "busy"})))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("https://cdn")))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client
            .upload(Capability::DifferentDimensionMe, &payload(Capability::DifferentDimensionMe))
            .await;

        assert!(result.is_ok());
        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 3);
    }

    #[tokio::test]
    async fn test_slow_upload_attempt_times_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(success_body("https://cdn"))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let config = TransformConfig {
            upload_attempts: 2,
            upload_timeout: Duration::from_millis(100),
            ..mock_config(&mock_server.uri())
        };
        let client = QqClient::new(config, None).unwrap();

        let err = client
            .upload(Capability::DifferentDimensionMe, &payload(Capability::DifferentDimensionMe))
            .await
            .unwrap_err();

        assert!(matches!(err, TransformError::ExhaustedRetries { attempts: 2, .. }));
        assert_eq!(err.to_string(), "QQ file upload attempt exceeded 100ms");
    }

    #[tokio::test]
    async fn test_download_returns_bytes() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/img/1.jpg"))
            .and(header("Origin", ORIGIN))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0]))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let bytes = client
            .download(&format!("{}/img/1.jpg", mock_server.uri()))
            .await
            .unwrap();

        assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[tokio::test]
    async fn test_download_retries_until_result_is_ready() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/img/1.jpg"))
            .respond_with(ResponseTemplate::new(404))
            .up_to_n_times(3)
            .expect(3)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/img/1.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg".to_vec()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let bytes = client
            .download(&format!("{}/img/1.jpg", mock_server.uri()))
            .await
            .unwrap();

        assert_eq!(bytes, b"jpeg".to_vec());
    }

    #[tokio::test]
    async fn test_download_exhausts_attempts_on_empty_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/img/1.jpg"))
            .respond_with(ResponseTemplate::new(200))
            .expect(11)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let err = client
            .download(&format!("{}/img/1.jpg", mock_server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, TransformError::ExhaustedRetries { attempts: 11, .. }));
        assert_eq!(err.to_string(), "Unable to download media: No data");
    }
}
