// ABOUTME: Integration tests for configuration parsing and validation.
// ABOUTME: Tests YAML parsing, defaults, discovery and registration settings.

use compose_adapter::config::*;
use compose_adapter::error::Error;
use compose_adapter::runtime::RuntimeType;
use std::time::Duration;
use tempfile::TempDir;

mod parsing {
    use super::*;

    #[test]
    fn parse_full_config() {
        let yaml = r#"
listen: 127.0.0.1:6000
root: /var/lib/compose-adapter
workers: 4
stop_timeout: 30s
runtime: docker
socket: /var/run/docker.sock
registration:
  controller: epm.internal
  compose_address: adapter.internal
  epm_port: 7000
"#;
        let config = AdapterConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.listen.to_string(), "127.0.0.1:6000");
        assert_eq!(config.root.to_str(), Some("/var/lib/compose-adapter"));
        assert_eq!(config.workers, 4);
        assert_eq!(config.stop_timeout, Duration::from_secs(30));
        assert_eq!(config.runtime.runtime, Some(RuntimeType::Docker));

        let registration = config.registration.unwrap();
        assert_eq!(registration.epm_endpoint(), "http://epm.internal:7000");
        assert_eq!(registration.advertised_address(6000), "adapter.internal:6000");
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = AdapterConfig::from_yaml("").unwrap();
        assert_eq!(config.listen.to_string(), DEFAULT_LISTEN);
        assert_eq!(config.workers, DEFAULT_WORKERS);
        assert!(config.runtime.runtime.is_none());
        assert!(config.registration.is_none());
    }

    #[test]
    fn registration_section_fills_defaults() {
        let config = AdapterConfig::from_yaml("registration: {}\n").unwrap();
        let registration = config.registration.unwrap();
        assert_eq!(registration.controller, DEFAULT_CONTROLLER);
        assert_eq!(registration.compose_address, DEFAULT_COMPOSE_ADDRESS);
        assert_eq!(registration.epm_port, DEFAULT_EPM_PORT);
    }

    #[test]
    fn invalid_listen_address() {
        let err = AdapterConfig::from_yaml("listen: not-an-address\n").unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
    }

    #[test]
    fn invalid_duration() {
        assert!(AdapterConfig::from_yaml("stop_timeout: soon\n").is_err());
    }

    #[test]
    fn zero_workers_rejected() {
        let err = AdapterConfig::from_yaml("workers: 0\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}

mod discovery {
    use super::*;

    #[test]
    fn discovers_primary_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(CONFIG_FILENAME), "workers: 3\n").unwrap();

        let config = AdapterConfig::discover(temp.path()).unwrap();
        assert_eq!(config.workers, 3);
    }

    #[test]
    fn discovers_alternate_extension() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(CONFIG_FILENAME_ALT), "workers: 5\n").unwrap();

        let config = AdapterConfig::discover(temp.path()).unwrap();
        assert_eq!(config.workers, 5);
    }

    #[test]
    fn missing_file_means_defaults() {
        let temp = TempDir::new().unwrap();
        let config = AdapterConfig::discover(temp.path()).unwrap();
        assert_eq!(config.workers, DEFAULT_WORKERS);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = AdapterConfig::load(&temp.path().join("nope.yml")).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }
}

mod registration_flag {
    use super::*;

    fn values(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_flag_uses_default_hosts() {
        let mut config = AdapterConfig::default();
        config.register_with(&[]);
        assert_eq!(config.registration, Some(RegistrationConfig::default()));
    }

    #[test]
    fn two_values_name_both_hosts() {
        let mut config = AdapterConfig::default();
        config.register_with(&values(&["10.0.0.2", "10.0.0.3"]));

        let registration = config.registration.unwrap();
        assert_eq!(registration.controller, "10.0.0.2");
        assert_eq!(registration.compose_address, "10.0.0.3");
        assert_eq!(registration.epm_port, DEFAULT_EPM_PORT);
    }
}
