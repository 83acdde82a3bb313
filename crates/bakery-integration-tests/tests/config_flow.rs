//! Building a working oven from a config file.

use std::io::Write;
use std::sync::Arc;

use bakery_config::BakeryConfig;
use bakery_core::Op;
use bakery_oven::config::{minting_version, oven_from_config};
use bakery_oven::{MacaroonId, Version};
use bakery_rootkeys::RootKeyCache;
use bakery_storage::{MemoryBacking, MemoryOpsStore};
use bakery_telemetry::{LogConfig, LogFormat};
use chrono::Utc;

const CONFIG: &str = r#"
[cache]
max_cache_size = 64

[oven]
location = "https://auth.example.com"
policy = "standard"
version = 2
legacy_op = { entity = "legacy", action = "access" }

[oven.routes]
"admin-" = "strict"

[policies.standard]
generate_interval_secs = 3600
expiry_secs = 86400

[policies.strict]
generate_interval_secs = 60
expiry_secs = 900

[logging]
level = "debug"
format = "json"
directives = ["bakery_rootkeys=trace"]
"#;

fn load() -> BakeryConfig {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();
    BakeryConfig::load_file(file.path()).unwrap()
}

#[tokio::test]
async fn test_configured_oven_round_trip() {
    let config = load();
    let cache = Arc::new(RootKeyCache::new(config.cache.max_cache_size));
    let backing = Arc::new(MemoryBacking::new());
    let ops_store = Arc::new(MemoryOpsStore::new());
    let oven = oven_from_config(&config, &cache, backing.clone(), Some(ops_store.clone())).unwrap();

    let version = minting_version(&config).unwrap();
    assert_eq!(version, Version::V2);
    assert_eq!(oven.legacy_macaroon_op(), &Op::new("legacy", "access"));

    let expiry = Utc::now() + chrono::Duration::minutes(10);
    let admin = oven
        .new_macaroon(version, expiry, &[], &[Op::new("admin-users", "delete")])
        .await
        .unwrap();
    let ops = vec![Op::new("doc-1", "read"), Op::new("doc-2", "write")];
    let user = oven.new_macaroon(version, expiry, &[], &ops).await.unwrap();

    // Each policy owns its own key.
    assert_eq!(backing.len(), 2);
    let admin_key = MacaroonId::decode(admin.id()).unwrap().storage_id().to_vec();
    let user_key = MacaroonId::decode(user.id()).unwrap().storage_id().to_vec();
    assert_ne!(admin_key, user_key);
    assert_eq!(ops_store.len(), 1);

    assert_eq!(
        oven.macaroon_ops(&[admin]).await.unwrap().ops,
        vec![Op::new("admin-users", "delete")]
    );
    assert_eq!(oven.macaroon_ops(&[user]).await.unwrap().ops, ops);
}

#[test]
fn test_logging_section_converts() {
    let config = load();
    let log = LogConfig::try_from(&config.logging).unwrap();
    assert_eq!(log.level, "debug");
    assert_eq!(log.format, LogFormat::Json);
    assert_eq!(log.directives, vec!["bakery_rootkeys=trace"]);
}

#[test]
fn test_route_to_missing_policy_fails_to_load() {
    let broken = CONFIG.replace("\"admin-\" = \"strict\"", "\"admin-\" = \"lenient\"");
    let err = BakeryConfig::from_toml_str(&broken).unwrap_err();
    assert!(err.to_string().contains("oven.routes.admin-"));
}
