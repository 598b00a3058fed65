//! Environment-driven server configuration.

mod support;

use eventpass::config::ServerConfig;

#[test]
fn test_defaults_with_secret() {
    support::with_scoped_env(
        &[("HOST", None), ("PORT", None), ("JWT_SECRET", Some("s3cret"))],
        || {
            let config = ServerConfig::from_env().unwrap();
            assert_eq!(config.host, "0.0.0.0");
            assert_eq!(config.port, 8080);
            assert_eq!(config.jwt_secret, "s3cret");
            assert_eq!(config.bind_addr().unwrap().to_string(), "0.0.0.0:8080");
        },
    );
}

#[test]
fn test_overrides() {
    support::with_scoped_env(
        &[
            ("HOST", Some("127.0.0.1")),
            ("PORT", Some("5000")),
            ("JWT_SECRET", Some("s3cret")),
        ],
        || {
            let config = ServerConfig::from_env().unwrap();
            assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:5000");
        },
    );
}

#[test]
fn test_missing_secret_is_error() {
    support::with_scoped_env(&[("JWT_SECRET", None)], || {
        let err = ServerConfig::from_env().unwrap_err();
        assert!(err.contains("JWT_SECRET"));
    });
}

#[test]
fn test_empty_secret_is_error() {
    support::with_scoped_env(&[("JWT_SECRET", Some(""))], || {
        assert!(ServerConfig::from_env().is_err());
    });
}

#[test]
fn test_invalid_port_is_error() {
    support::with_scoped_env(
        &[("PORT", Some("eighty")), ("JWT_SECRET", Some("s3cret"))],
        || {
            let err = ServerConfig::from_env().unwrap_err();
            assert!(err.contains("PORT"));
        },
    );
}
