//! Tests for configuration loading and validation

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use crate::config::{MemoryConfigProvider, ServiceConfig, TransformConfig};
    use crate::error::ErrorKind;
    use crate::tests::mock_config;

    fn load(pairs: &[(&str, &str)]) -> crate::error::Result<TransformConfig> {
        let mut provider = MemoryConfigProvider::new();
        for (key, value) in pairs {
            provider.set(*key, value);
        }
        TransformConfig::from_provider(&provider)
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("ai_painting_url", "http://localhost:9000/process"),
            ("upload_attempts", "6"),
            ("download_timeout", "2500ms"),
            ("retry_interval", "2s"),
            ("backoff_factor", "1.5"),
            ("marker_path", "/tmp/marker.png"),
        ])
        .unwrap();

        assert_eq!(config.ai_painting_url, "http://localhost:9000/process");
        assert_eq!(config.upload_attempts, 6);
        assert_eq!(config.download_attempts, 11);
        assert_eq!(config.marker_path, Some(PathBuf::from("/tmp/marker.png")));

        let upload = config.upload_policy();
        assert_eq!(upload.max_attempts, 6);
        assert_eq!(upload.min_interval, Duration::from_secs(2));
        assert_eq!(upload.backoff_factor, 1.5);
        assert_eq!(upload.per_attempt_timeout, Duration::from_secs(30));

        let download = config.download_policy();
        assert_eq!(download.per_attempt_timeout, Duration::from_millis(2500));
    }

    #[test]
    fn test_unparsable_values_are_rejected() {
        let cases = [
            ("upload_attempts", "many"),
            ("upload_attempts", "-1"),
            ("download_attempts", "0"),
            ("upload_timeout", "soon"),
            ("upload_timeout", "0s"),
            ("backoff_factor", "0.5"),
            ("backoff_factor", "fast"),
            ("different_dimension_url", "ftp://example.com/process"),
            ("ai_painting_url", "not a url"),
        ];

        for (key, value) in cases {
            let err = load(&[(key, value)]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidConfiguration, "{}={}", key, value);
        }
    }

    #[test]
    fn test_service_config() {
        let config = TransformConfig::default();
        assert!(config.validate().is_ok());

        assert!(mock_config("http://127.0.0.1:8080").validate().is_ok());
    }
}
