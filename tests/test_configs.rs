use agri_gateway::configs::GatewayConfig;
use agri_gateway::loggers::LogLevel;
use agri_gateway::upstreams::target::{Capability, TargetCatalog, PEST_ENDPOINT};
use agri_gateway::GatewayError;
use figment::Jail;
use std::time::Duration;

#[test]
fn test_defaults_without_sources() {
    Jail::expect_with(|_jail| {
        let cfg = GatewayConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:3000");
        assert_eq!(cfg.upstream_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.timezone, "Asia/Seoul");
        assert!(cfg.api_key.is_none());
        assert!(!cfg.strict_keys);
        Ok(())
    });
}

#[test]
fn test_unprefixed_key_names_are_read() {
    Jail::expect_with(|jail| {
        jail.set_env("API_KEY", "general");
        jail.set_env("PEST_API_KEY", "pest");

        let cfg = GatewayConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(cfg.api_key.as_deref(), Some("general"));
        assert_eq!(cfg.pest_api_key.as_deref(), Some("pest"));
        Ok(())
    });
}

#[test]
fn test_file_then_prefixed_env_override() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "gateway.toml",
            r#"
                port = 8080
                api_key = "from-file"
                log_level = "debug"

                [endpoints]
                pest_url = "http://file.example/pest"
            "#,
        )?;
        jail.set_env("AGRI_PORT", "9090");
        jail.set_env("AGRI_ENDPOINTS__PEST_URL", "http://env.example/pest");
        jail.set_env("AGRI_UPSTREAM_TIMEOUT_MS", "2500");

        let cfg = GatewayConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(cfg.port, 9090);
        assert_eq!(cfg.api_key.as_deref(), Some("from-file"));
        assert_eq!(cfg.log_level, LogLevel::Debug);
        assert_eq!(cfg.endpoints.pest_url.as_deref(), Some("http://env.example/pest"));
        assert_eq!(cfg.upstream_timeout(), Duration::from_millis(2500));
        Ok(())
    });
}

#[test]
fn test_explicit_config_path() {
    Jail::expect_with(|jail| {
        jail.create_file("custom.toml", "port = 7000")?;
        jail.set_env("AGRI_CONFIG", "custom.toml");

        let cfg = GatewayConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(cfg.port, 7000);

        match GatewayConfig::load_from("missing.toml") {
            Err(GatewayError::ConfigError(msg)) => assert!(msg.contains("missing.toml")),
            other => panic!("Expected ConfigError, got {:?}", other),
        }
        Ok(())
    });
}

#[test]
fn test_blank_keys_count_as_absent() {
    Jail::expect_with(|jail| {
        jail.set_env("API_KEY", "   ");
        let cfg = GatewayConfig::load().map_err(|e| e.to_string())?;
        assert!(cfg.api_key.is_none());
        Ok(())
    });
}

#[test]
fn test_timezone_parsing() {
    let cfg = GatewayConfig::default();
    assert_eq!(cfg.timezone().unwrap(), chrono_tz::Asia::Seoul);

    let bad = GatewayConfig { timezone: "Mars/Olympus".to_string(), ..GatewayConfig::default() };
    assert!(matches!(bad.timezone(), Err(GatewayError::ConfigError(_))));
}

#[test]
fn test_catalog_marks_missing_keys_unavailable() {
    let cfg = GatewayConfig { api_key: Some("k".to_string()), ..GatewayConfig::default() };
    let catalog = TargetCatalog::from_config(&cfg).unwrap();

    assert!(catalog.get(Capability::Fertilizer).is_ok());
    assert!(catalog.get(Capability::WeatherObservation).is_ok());
    assert!(matches!(
        catalog.get(Capability::Pest),
        Err(GatewayError::Unavailable { .. })
    ));
    assert_eq!(catalog.unavailable(), vec![(Capability::Pest, "PEST_API_KEY is not set".to_string())]);
}

#[test]
fn test_catalog_uses_defaults_and_overrides() {
    let mut cfg = GatewayConfig {
        api_key: Some("k".to_string()),
        pest_api_key: Some("p".to_string()),
        ..GatewayConfig::default()
    };
    cfg.endpoints.fertilizer_url = Some("http://127.0.0.1:1234/fert".to_string());

    let catalog = TargetCatalog::from_config(&cfg).unwrap();
    assert_eq!(catalog.get(Capability::Fertilizer).unwrap().base_url.as_str(), "http://127.0.0.1:1234/fert");
    assert_eq!(catalog.get(Capability::Pest).unwrap().base_url.as_str(), PEST_ENDPOINT);
    assert_eq!(catalog.get(Capability::Pest).unwrap().auth_key, "p");
    assert!(catalog.unavailable().is_empty());
}

#[test]
fn test_catalog_rejects_invalid_url() {
    let mut cfg = GatewayConfig { api_key: Some("k".to_string()), ..GatewayConfig::default() };
    cfg.endpoints.forecast_url = Some("not a url".to_string());

    match TargetCatalog::from_config(&cfg) {
        Err(GatewayError::ConfigError(msg)) => assert!(msg.contains("weather_forecast")),
        other => panic!("Expected ConfigError, got {:?}", other.map(|_| ())),
    }
}
