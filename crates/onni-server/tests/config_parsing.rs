use std::{env, fs};

use onni_server::StorageBackend;
use onni_server::config::loader::load_config;

#[test]
fn config_parsing_and_env_overrides_and_validation() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("onni.toml");

    let toml_content = r#"
[server]
host = "127.0.0.1"
port = 8081

[logging]
level = "debug"

[worldstate]
url = "http://127.0.0.1:9000/worldState.php"
interval_ms = 500
timeout_ms = 1000

[redis]
enabled = false

[lock]
name = "test:fetcher_lock"
ttl_ms = 3000

[storage]
backend = "memory"

[storage.postgres]
idle_timeout_ms = 0
run_migrations = false
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert_eq!(cfg.server.port, 8081);
    assert_eq!(cfg.logging.level, "debug");
    assert_eq!(cfg.worldstate.interval_ms, 500);
    assert_eq!(cfg.worldstate.marker_field, "WorldSeed");
    assert!(!cfg.redis.enabled);
    assert_eq!(cfg.lock.name, "test:fetcher_lock");
    assert_eq!(cfg.storage.backend, StorageBackend::Memory);
    assert_eq!(cfg.storage.postgres.idle_timeout_ms, Some(0));
    assert!(!cfg.storage.postgres.run_migrations);
    assert_eq!(cfg.storage.postgres.pool_size, 5);

    // 2) Env override wins over file
    unsafe {
        env::set_var("ONNI__WORLDSTATE__INTERVAL_MS", "750");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.worldstate.interval_ms, 750);
    unsafe {
        env::remove_var("ONNI__WORLDSTATE__INTERVAL_MS");
    }

    // 3) Zero TTL is rejected
    let invalid_path = dir.path().join("invalid.toml");
    let invalid_toml = r#"
[lock]
ttl_ms = 0

[storage]
backend = "memory"
"#;
    fs::write(&invalid_path, invalid_toml).expect("write invalid toml");
    let err = load_config(invalid_path.to_str()).expect_err("expected validation error");
    assert!(err.contains("lock.ttl_ms"));
}
