//! End-to-end indexing of a project directory.

use keyscope_indexer::{ConfigEntry, FileEvent, KeyscopeConfig, ProjectIndexer};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn entry<'a>(keys: &'a [ConfigEntry], path: &str) -> Option<&'a ConfigEntry> {
    keys.iter().find(|e| e.path == path)
}

#[tokio::test]
async fn indexes_server_example() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.yaml", "server:\n  port: 8080\n  name: \"prod\"\n");

    let project = ProjectIndexer::open(dir.path()).unwrap();
    let stats = project.index().await.unwrap();
    assert_eq!(stats.files, 1);
    assert_eq!(stats.indexed, 1);
    assert_eq!(stats.entries, 3);

    let file = project.keys().file_index("a.yaml").unwrap();
    assert_eq!(
        file.entries(),
        [
            ConfigEntry::container("server"),
            ConfigEntry::new("server/port", "8080"),
            ConfigEntry::new("server/name", "prod"),
        ]
    );

    let keys = project.keys().keys();
    assert_eq!(
        keys.to_vec(),
        vec![
            ConfigEntry::new("server", "port: 8080 | name: prod"),
            ConfigEntry::new("server.name", "prod"),
            ConfigEntry::new("server.port", "8080"),
        ]
    );
}

#[tokio::test]
async fn malformed_file_does_not_block_others() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "bad.yaml", "db: [unclosed\n");
    write(dir.path(), "conf/good.yaml", "db:\n  host: x\n");
    write(dir.path(), "notes.txt", "db: ignored\n");
    write(dir.path(), "node_modules/pkg/x.yaml", "vendored: 1\n");

    let project = ProjectIndexer::open(dir.path()).unwrap();
    let stats = project.index().await.unwrap();
    assert_eq!(stats.files, 3);
    assert_eq!(stats.indexed, 2);
    assert_eq!(stats.parse_failures, 1);
    assert_eq!(stats.skipped, 1);

    assert!(project.keys().file_index("bad.yaml").unwrap().is_empty());
    let keys = project.keys().keys();
    assert_eq!(entry(&keys, "db.host").unwrap().item, "x");
    assert!(entry(&keys, "vendored").is_none());
}

#[tokio::test]
async fn values_from_several_files_are_concatenated() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "dev.yaml", "db:\n  host: x\n");
    write(dir.path(), "prod.yaml", "db:\n  host: y\n");

    let project = ProjectIndexer::open(dir.path()).unwrap();
    project.index().await.unwrap();
    let keys = project.keys().keys();
    assert_eq!(entry(&keys, "db.host").unwrap().item, "x | y");
    assert_eq!(entry(&keys, "db").unwrap().item, "host: x | host: y");
}

#[tokio::test]
async fn reindexing_unchanged_file_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.yaml", "a:\n  b: 1\n  c:\n    d: two\n");

    let project = ProjectIndexer::open(dir.path()).unwrap();
    project.index().await.unwrap();
    let first = project.keys().file_index("a.yaml").unwrap();
    let keys_first = project.keys().keys();

    project.index().await.unwrap();
    let second = project.keys().file_index("a.yaml").unwrap();
    assert!(first.same_entries(&second));
    assert_eq!(keys_first.to_vec(), project.keys().keys().to_vec());
}

#[tokio::test]
async fn host_events_drive_the_index() {
    let dir = tempfile::tempdir().unwrap();
    let project = ProjectIndexer::open(dir.path()).unwrap();

    project.apply(FileEvent::Created {
        identity: "f.yaml".into(),
        contents: b"db:\n  host: x\n".to_vec(),
    });
    project.apply(FileEvent::Created {
        identity: "g.yaml".into(),
        contents: b"name: app\n".to_vec(),
    });
    project.apply(FileEvent::Deleted {
        identity: "f.yaml".into(),
    });
    let keys = project.keys().keys();
    assert!(entry(&keys, "db.host").is_none());
    assert!(entry(&keys, "db").is_none());
    assert_eq!(entry(&keys, "name").unwrap().item, "app");

    project.apply(FileEvent::Modified {
        identity: "g.yaml".into(),
        contents: b"name: renamed-app\n".to_vec(),
    });
    assert!(project.apply(FileEvent::Renamed {
        from: "g.yaml".into(),
        to: "h.yaml".into(),
    }));
    assert!(!project.apply(FileEvent::Renamed {
        from: "g.yaml".into(),
        to: "i.yaml".into(),
    }));
    assert_eq!(project.keys().store().identities(), vec!["h.yaml"]);
    assert_eq!(entry(&project.keys().keys(), "name").unwrap().item, "renamed-app");
}

#[tokio::test]
async fn config_controls_extensions_and_exclusions() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.yml", "short: 1\n");
    write(dir.path(), "b.YAML", "long: 1\n");
    write(dir.path(), "fixtures/c.yaml", "fixture: 1\n");

    let config = KeyscopeConfig {
        extensions: vec!["yaml".into(), "yml".into()],
        exclude: vec!["fixtures/**".into()],
        ..KeyscopeConfig::default()
    };
    let project = ProjectIndexer::with_config(dir.path(), config).unwrap();
    project.index().await.unwrap();
    assert_eq!(project.keys().store().identities(), vec!["a.yml", "b.YAML"]);
}

#[tokio::test]
async fn config_file_under_root_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), ".keyscope.toml", "extensions = [\"yml\"]\n");
    write(dir.path(), "a.yml", "short: 1\n");
    write(dir.path(), "b.yaml", "long: 1\n");

    let project = ProjectIndexer::open(dir.path()).unwrap();
    project.index().await.unwrap();
    assert_eq!(project.keys().store().identities(), vec!["a.yml"]);
}
