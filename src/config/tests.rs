use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn defaults_match_documented_values() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.to_string(), "127.0.0.1:3000");
    assert_eq!(settings.server.graceful_shutdown, Duration::from_secs(30));
    assert!(matches!(settings.logging.format, LogFormat::Compact));
    assert!(settings.public.base_url.is_none());
    assert!(settings.public.allowed_hosts.is_empty());
    assert!(settings.public.spa_entry_path.is_none());
    assert_eq!(settings.public.spa_root_id, "root");
    assert_eq!(settings.public.spa_fetch_timeout, Duration::from_millis(1500));
    assert_eq!(settings.public.spa_entry_ttl, Duration::from_secs(3600));
    assert!(settings.cache.redis_url.is_none());
    assert_eq!(settings.cache.ttl_seconds, 21_600);
    assert_eq!(settings.cache.memory_limit, 1000);
    assert_eq!(settings.directory.mode, DirectoryMode::Snapshot);
    assert_eq!(
        settings.directory.snapshot_path,
        PathBuf::from("data/directory.json")
    );
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
fn base_url_trailing_slash_is_stripped() {
    let mut raw = RawSettings::default();
    raw.public.base_url = Some("https://pymerp.cl/".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.public.base_url.as_deref(), Some("https://pymerp.cl"));
}

#[test]
fn invalid_base_url_is_rejected() {
    let mut raw = RawSettings::default();
    raw.public.base_url = Some("ftp://pymerp.cl".to_string());
    let err = Settings::from_raw(raw).expect_err("invalid scheme");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "public.base_url",
            ..
        }
    ));
}

#[test]
fn allowed_hosts_accept_lists_and_comma_strings() {
    let mut raw = RawSettings::default();
    raw.public.allowed_hosts = Some(HostList::Many(vec![
        "PyMerp.cl".to_string(),
        "localhost:3000".to_string(),
    ]));
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.public.allowed_hosts, ["pymerp.cl", "localhost:3000"]);

    let mut raw = RawSettings::default();
    raw.public.allowed_hosts = Some(HostList::One("pymerp.cl, www.pymerp.cl,".to_string()));
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.public.allowed_hosts, ["pymerp.cl", "www.pymerp.cl"]);
}

#[test]
fn allowed_hosts_reject_urls() {
    for value in ["https://pymerp.cl", "pymerp.cl/path", "user@pymerp.cl"] {
        let mut raw = RawSettings::default();
        raw.public.allowed_hosts = Some(HostList::Many(vec![value.to_string()]));
        let err = Settings::from_raw(raw).expect_err("not a host");
        assert!(
            matches!(
                err,
                LoadError::Invalid {
                    key: "public.allowed_hosts",
                    ..
                }
            ),
            "{value}"
        );
    }
}

#[test]
fn cli_allowed_hosts_replace_configured_ones() {
    let mut raw = RawSettings::default();
    raw.public.allowed_hosts = Some(HostList::One("old.example".to_string()));
    let overrides = ServeOverrides {
        public_allowed_hosts: vec!["pymerp.cl".to_string()],
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.public.allowed_hosts, ["pymerp.cl"]);
}

#[test]
fn blank_values_are_treated_as_unset() {
    let mut raw = RawSettings::default();
    raw.public.spa_entry_path = Some("   ".to_string());
    raw.public.spa_root_id = Some("".to_string());
    raw.cache.redis_url = Some(" ".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(settings.public.spa_entry_path.is_none());
    assert_eq!(settings.public.spa_root_id, "root");
    assert!(settings.cache.redis_url.is_none());
}

#[test]
fn directory_mode_parses_and_validates() {
    let mut raw = RawSettings::default();
    raw.directory.mode = Some("STUB".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.directory.mode, DirectoryMode::Stub);

    let mut raw = RawSettings::default();
    raw.directory.mode = Some("firestore".to_string());
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn zero_cache_ttl_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.ttl_seconds = Some(0);
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["vitrina"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "vitrina",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--cache-redis-url",
        "redis://cache:6379",
        "--directory-mode",
        "stub",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.cache_redis_url.as_deref(),
                Some("redis://cache:6379")
            );
            assert_eq!(
                serve.overrides.directory.directory_mode.as_deref(),
                Some("stub")
            );
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_render_arguments() {
    let args = CliArgs::parse_from([
        "vitrina",
        "render",
        "barberia-central",
        "--service",
        "corte-clasico",
        "--base-url",
        "https://pymerp.cl",
    ]);

    match args.command.expect("render command") {
        Command::Render(render) => {
            assert_eq!(render.slug, "barberia-central");
            assert_eq!(render.service.as_deref(), Some("corte-clasico"));
            assert_eq!(render.base_url.as_deref(), Some("https://pymerp.cl"));
            assert_eq!(render.category, "barberias");
            assert_eq!(render.locale, "es");
        }
        _ => panic!("wrong command parsed"),
    }
}
