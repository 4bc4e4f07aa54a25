use std::collections::HashMap;

use config::FileFormat;

use super::*;

fn layered(file: &str, env: &[(&str, &str)]) -> RawSettings {
    let env: HashMap<String, String> = env
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

    Config::builder()
        .add_source(File::from_str(file, FileFormat::Toml))
        .add_source(
            Environment::with_prefix("REELSHELF")
                .separator("__")
                .source(Some(env)),
        )
        .build()
        .expect("config builds")
        .try_deserialize()
        .expect("raw settings deserialize")
}

#[test]
fn defaults_match_documented_values() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.to_string(), "127.0.0.1:3000");
    assert_eq!(settings.server.graceful_shutdown, Duration::from_secs(30));
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
    assert!(settings.database.url.is_none());
    assert_eq!(settings.database.max_connections.get(), 8);
    assert_eq!(settings.cache.backend, CacheBackend::Memory);
    assert_eq!(settings.cache.page_ttl, Duration::from_secs(3600));
    assert_eq!(settings.cache.op_timeout, Duration::from_millis(50));
    assert_eq!(settings.cache.memory_capacity.get(), 1024);
    assert_eq!(settings.cache.key_namespace, "reelshelf");
    assert!(!settings.cache.invalidate_on_rating);
    assert_eq!(settings.catalog.default_page_size.get(), 10);
    assert_eq!(settings.catalog.max_page_size.get(), 100);
    assert_eq!(settings.catalog.max_sample_size.get(), 5);
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = layered(
        "[server]\nport = 4000\n[cache]\npage_ttl_seconds = 60\n",
        &[("REELSHELF__CACHE__PAGE_TTL_SECONDS", "120")],
    );
    assert_eq!(raw.cache.page_ttl_seconds, Some(120));

    let overrides = ServeOverrides {
        server_port: Some(4321),
        cache_page_ttl_seconds: Some(30),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.cache.page_ttl, Duration::from_secs(30));
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn environment_overrides_file() {
    let raw = layered(
        "[cache]\nkey_namespace = \"from-file\"\n",
        &[("REELSHELF__CACHE__KEY_NAMESPACE", "from-env")],
    );
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.cache.key_namespace, "from-env");
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn redis_backend_requires_url() {
    let mut raw = RawSettings::default();
    raw.cache.backend = Some("redis".to_string());

    let err = Settings::from_raw(raw).expect_err("missing redis url");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.redis_url",
            ..
        }
    ));
}

#[test]
fn redis_backend_carries_url() {
    let raw = layered(
        "[cache]\nbackend = \"Redis\"\nredis_url = \"redis://cache:6379/3\"\n",
        &[],
    );
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(
        settings.cache.backend,
        CacheBackend::Redis {
            url: "redis://cache:6379/3".to_string()
        }
    );
}

#[test]
fn unknown_backend_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.backend = Some("memcached".to_string());
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "cache.backend",
            ..
        })
    ));
}

#[test]
fn zero_ttl_and_timeout_are_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.page_ttl_seconds = Some(0);
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "cache.page_ttl_seconds",
            ..
        })
    ));

    let mut raw = RawSettings::default();
    raw.cache.op_timeout_ms = Some(0);
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "cache.op_timeout_ms",
            ..
        })
    ));
}

#[test]
fn page_ttl_has_an_upper_bound() {
    let raw = layered("[cache]\npage_ttl_seconds = 9223372036854775807\n", &[]);
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "cache.page_ttl_seconds",
            ..
        })
    ));

    let mut raw = RawSettings::default();
    raw.cache.page_ttl_seconds = Some(MAX_CACHE_PAGE_TTL_SECS);
    let settings = Settings::from_raw(raw).expect("thirty days is accepted");
    assert_eq!(
        settings.cache.page_ttl,
        Duration::from_secs(MAX_CACHE_PAGE_TTL_SECS)
    );
}

#[test]
fn key_namespace_is_restricted() {
    let too_long = "x".repeat(65);
    for namespace in ["", "has:colon", "white space", too_long.as_str()] {
        let mut raw = RawSettings::default();
        raw.cache.key_namespace = Some(namespace.to_string());
        assert!(
            matches!(
                Settings::from_raw(raw),
                Err(LoadError::Invalid {
                    key: "cache.key_namespace",
                    ..
                })
            ),
            "namespace {namespace:?} should be rejected"
        );
    }
}

#[test]
fn default_page_size_cannot_exceed_max() {
    let mut raw = RawSettings::default();
    raw.catalog.default_page_size = Some(50);
    raw.catalog.max_page_size = Some(20);
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "catalog.default_page_size",
            ..
        })
    ));
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["reelshelf"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_migrate_arguments() {
    let args = CliArgs::parse_from([
        "reelshelf",
        "migrate",
        "--database-url",
        "postgres://example",
    ]);

    match args.command.expect("migrate command") {
        Command::Migrate(migrate) => {
            assert_eq!(
                migrate.database.database_url.as_deref(),
                Some("postgres://example")
            );
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "reelshelf",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--database-url",
        "postgres://override",
        "--cache-backend",
        "redis",
        "--cache-redis-url",
        "redis://localhost:6379/1",
        "--cache-invalidate-on-rating=true",
        "--catalog-max-sample-size",
        "8",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.database_url.as_deref(),
                Some("postgres://override")
            );
            assert_eq!(serve.overrides.cache_backend.as_deref(), Some("redis"));
            assert_eq!(
                serve.overrides.cache_redis_url.as_deref(),
                Some("redis://localhost:6379/1")
            );
            assert_eq!(serve.overrides.cache_invalidate_on_rating, Some(true));
            assert_eq!(serve.overrides.catalog_max_sample_size, Some(8));
        }
        _ => panic!("wrong command parsed"),
    }
}
