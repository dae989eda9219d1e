//! Error handling unit tests

#[cfg(test)]
mod tests {
    use crate::errors::{Result, SupportRagError};

    #[test]
    fn test_error_variants_display() {
        let errors = vec![
            SupportRagError::InvalidQuery,
            SupportRagError::ServiceUnavailable("no key".to_string()),
            SupportRagError::EmbeddingError("embedding".to_string()),
            SupportRagError::VectorStoreError("store".to_string()),
            SupportRagError::LlmError("llm".to_string()),
            SupportRagError::ConfigError("config".to_string()),
            SupportRagError::IngestError("ingest".to_string()),
        ];

        for error in &errors {
            let display = format!("{error}");
            assert!(!display.is_empty());
        }
    }

    #[test]
    fn test_client_error_classification() {
        assert!(SupportRagError::InvalidQuery.is_client_error());
        assert!(SupportRagError::InvalidRequest("bad".to_string()).is_client_error());
        assert!(!SupportRagError::LlmError("boom".to_string()).is_client_error());
        assert!(!SupportRagError::ServiceUnavailable("x".to_string()).is_client_error());
    }

    #[test]
    fn test_unavailable_classification() {
        assert!(SupportRagError::ServiceUnavailable("x".to_string()).is_unavailable());
        assert!(!SupportRagError::InvalidQuery.is_unavailable());
    }

    #[test]
    fn test_invalid_query_message() {
        assert_eq!(
            SupportRagError::InvalidQuery.to_string(),
            "Query cannot be empty"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        use std::io;

        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: SupportRagError = io_err.into();

        match err {
            SupportRagError::Io(e) => {
                assert_eq!(e.kind(), io::ErrorKind::PermissionDenied);
            }
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: SupportRagError = json_err.into();

        assert!(matches!(err, SupportRagError::Serialization(_)));
    }

    #[test]
    fn test_url_error_conversion() {
        let parse_err = url::Url::parse("not a url").unwrap_err();
        let err: SupportRagError = parse_err.into();

        assert!(matches!(err, SupportRagError::InvalidUrl(_)));
    }

    #[test]
    fn test_result_combinators() {
        let ok_result: Result<i32> = Ok(42);
        let err_result: Result<i32> = Err(SupportRagError::LlmError("fail".to_string()));

        assert_eq!(ok_result.map(|v| v * 2).unwrap(), 84);

        let recovered = err_result.or_else(|_| Ok::<i32, SupportRagError>(100));
        assert_eq!(recovered.unwrap(), 100);
    }
}
