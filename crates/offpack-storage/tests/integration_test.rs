use offpack_core::{
    Architecture, HISTORY_LIMIT, HistoryEntry, PackageFormat, SettingsPatch, SourceDraft,
    SourcePatch, SourceType,
};
use offpack_storage::{FileStore, StateStore};
use std::sync::Arc;
use time::OffsetDateTime;
use time::macros::datetime;

#[tokio::test]
async fn test_state_lifecycle_across_reopen() {
    let temp_dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(FileStore::new(temp_dir.path().to_path_buf()).unwrap());

    let mut store = StateStore::open(backend.clone(), "downloadState").await;

    // Sources
    let official = SourceDraft {
        name: "Kylin Official".to_string(),
        url: "https://archive.kylinos.cn/kylin".to_string(),
        enabled: true,
        ..Default::default()
    }
    .into_new_source(0)
    .unwrap();
    let mirror = SourceDraft {
        name: "  Local mirror ".to_string(),
        url: "http://10.0.0.5/repo".to_string(),
        source_type: SourceType::Yum,
        username: "ops".to_string(),
        password: "secret".to_string(),
        enabled: false,
    }
    .into_new_source(1)
    .unwrap();

    let official_id = store.add_source(official);
    let mirror_id = store.add_source(mirror);
    assert_ne!(official_id, mirror_id);

    assert!(store.update_source(
        &mirror_id,
        SourcePatch {
            enabled: Some(true),
            password: Some(None),
            ..Default::default()
        }
    ));
    assert!(store.move_source(&mirror_id, 0));

    // Selection and settings
    store.select_all_packages(vec!["vim".into(), "gcc".into(), "vim".into()]);
    store.select_package("curl");
    store.deselect_package("gcc");
    store.update_settings(SettingsPatch {
        target_architecture: Some(Architecture::X86_64),
        save_directory: Some("/data/offline".to_string()),
        package_format: Some(PackageFormat::Zip),
        ..Default::default()
    });

    store.close().await;

    let store = StateStore::open(backend, "downloadState").await;
    let state = store.state();

    let ids: Vec<_> = state.sources.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec![mirror_id.as_str(), official_id.as_str()]);

    let mirror = &state.sources[0];
    assert_eq!(mirror.name, "Local mirror");
    assert_eq!(mirror.source_type, SourceType::Yum);
    assert_eq!(mirror.username.as_deref(), Some("ops"));
    assert_eq!(mirror.password, None);
    assert!(mirror.enabled);

    let selected: Vec<_> = state.selected_packages.iter().cloned().collect();
    assert_eq!(selected, vec!["vim", "curl"]);

    assert_eq!(state.settings.target_architecture, Architecture::X86_64);
    assert_eq!(state.settings.save_directory, "/data/offline");
    assert_eq!(state.settings.package_format, PackageFormat::Zip);
    assert_eq!(state.settings.target_system_version, "10");

    store.close().await;
}

#[tokio::test]
async fn test_history_is_capped_and_newest_first() {
    let temp_dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(FileStore::new(temp_dir.path().to_path_buf()).unwrap());

    let mut store = StateStore::open(backend.clone(), "downloadState").await;
    let start = datetime!(2024-03-01 08:00 UTC);

    for i in 0..(HISTORY_LIMIT as i64 + 5) {
        let at: OffsetDateTime = start + time::Duration::minutes(i);
        store.add_history_entry(HistoryEntry::at(
            at,
            vec![format!("pkg-{i}")],
            format!("/out/run-{i}.tar.gz"),
        ));
    }
    store.close().await;

    let store = StateStore::open(backend, "downloadState").await;
    let history = &store.state().download_history;

    assert_eq!(history.len(), HISTORY_LIMIT);
    assert_eq!(history[0].output_path, "/out/run-54.tar.gz");
    assert_eq!(history[HISTORY_LIMIT - 1].output_path, "/out/run-5.tar.gz");
    assert!(history.windows(2).all(|w| w[0].timestamp > w[1].timestamp));

    store.close().await;
}

#[tokio::test]
async fn test_snapshot_json_layout() {
    let temp_dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(FileStore::new(temp_dir.path().to_path_buf()).unwrap());

    let mut store = StateStore::open(backend, "downloadState").await;
    store.select_package("vim");
    store.update_settings(SettingsPatch {
        save_directory: Some("/tmp/out".to_string()),
        ..Default::default()
    });
    store.close().await;

    let raw = std::fs::read_to_string(temp_dir.path().join("downloadState.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(json["sources"], serde_json::json!([]));
    assert_eq!(json["selectedPackages"], serde_json::json!(["vim"]));
    assert_eq!(json["downloadHistory"], serde_json::json!([]));
    assert_eq!(json["settings"]["saveDirectory"], "/tmp/out");
    assert_eq!(json["settings"]["targetSystem"], "kylin");
    assert_eq!(json["settings"]["targetArchitecture"], "arm64");
    assert_eq!(json["settings"]["packageFormat"], "tar.gz");
    assert_eq!(json["settings"]["autoPackAfterDownload"], true);
}

#[tokio::test]
async fn test_separate_keys_do_not_share_state() {
    let temp_dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(FileStore::new(temp_dir.path().to_path_buf()).unwrap());

    let mut first = StateStore::open(backend.clone(), "first").await;
    first.select_package("vim");
    first.close().await;

    let second = StateStore::open(backend, "second").await;
    assert!(second.state().selected_packages.is_empty());
    second.close().await;
}
