//! Tests for document persistence.

use tempfile::TempDir;

use crate::document::NetplanDocument;
use crate::network::IpFamily;
use crate::store::{DocumentStore, FileDocumentStore, LoadError, SaveError};

/// A document for eth0 with one address and one route.
fn sample_document() -> NetplanDocument {
    let mut doc = NetplanDocument::skeleton("eth0");
    doc.set_ip(["192.168.1.5/24"], ["dhcp6"]).unwrap();
    doc.set_route("10.0.0.0/8=192.168.1.1m20").unwrap();
    doc
}

mod file_document_store {
    use super::*;

    #[test]
    fn paths_follow_prefix_convention() {
        let store = FileDocumentStore::new("/etc/netplan", "90-vz-");

        assert_eq!(
            store.path_for("eth0").to_str(),
            Some("/etc/netplan/90-vz-eth0.yaml")
        );
        assert_eq!(
            store.backup_path_for("eth0").to_str(),
            Some("/etc/netplan/90-vz-eth0.yaml.bkp")
        );
    }

    #[test]
    fn load_returns_skeleton_for_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = FileDocumentStore::new(dir.path(), "90-vz-");

        let doc = store.load("eth0").unwrap();

        assert_eq!(doc, NetplanDocument::skeleton("eth0"));
        assert!(!store.path_for("eth0").exists());
    }

    #[test]
    fn load_fails_on_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let store = FileDocumentStore::new(dir.path(), "90-vz-");
        std::fs::write(store.path_for("eth0"), "network: [unterminated").unwrap();

        match store.load("eth0") {
            Err(LoadError::Parse { path, .. }) => assert_eq!(path, store.path_for("eth0")),
            other => panic!("Expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn load_fails_when_path_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let store = FileDocumentStore::new(dir.path(), "90-vz-");
        std::fs::create_dir(store.path_for("eth0")).unwrap();

        assert!(matches!(store.load("eth0"), Err(LoadError::Read { .. })));
    }

    #[test]
    fn load_reads_legacy_document() {
        let dir = TempDir::new().unwrap();
        let store = FileDocumentStore::new(dir.path(), "90-vz-");
        std::fs::write(
            store.path_for("eth0"),
            "network:\n  ethernets:\n    eth0:\n      dhcp4: 'yes'\n      routes:\n      - metric: '100'\n        to: 10.0.0.0/24\n        via: 10.0.0.1\n  version: 2\n",
        )
        .unwrap();

        let doc = store.load("eth0").unwrap();

        assert!(doc.entry().dhcp(IpFamily::V4).unwrap());
        assert_eq!(doc.entry().routes().unwrap()[0].metric, Some(100));
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FileDocumentStore::new(dir.path(), "90-vz-");
        let doc = sample_document();

        store.save(&doc).await.unwrap();

        assert!(store.path_for("eth0").exists());
        assert!(!store.backup_path_for("eth0").exists());
        assert_eq!(store.load("eth0").unwrap(), doc);
    }

    #[tokio::test]
    async fn second_save_keeps_previous_document_as_backup() {
        let dir = TempDir::new().unwrap();
        let store = FileDocumentStore::new(dir.path(), "90-vz-");

        store.save(&sample_document()).await.unwrap();
        let first = std::fs::read_to_string(store.path_for("eth0")).unwrap();

        let mut updated = sample_document();
        updated.set_gateway(["192.168.1.254"]);
        store.save(&updated).await.unwrap();

        let backup = std::fs::read_to_string(store.backup_path_for("eth0")).unwrap();
        assert_eq!(backup, first);
        assert_eq!(store.load("eth0").unwrap(), updated);
    }

    #[tokio::test]
    async fn only_one_backup_generation_is_kept() {
        let dir = TempDir::new().unwrap();
        let store = FileDocumentStore::new(dir.path(), "90-vz-");

        let mut doc = NetplanDocument::skeleton("eth0");
        store.save(&doc).await.unwrap();
        doc.set_dhcp("4");
        store.save(&doc).await.unwrap();
        let second = std::fs::read_to_string(store.path_for("eth0")).unwrap();
        doc.set_dhcp("6");
        store.save(&doc).await.unwrap();

        let backup = std::fs::read_to_string(store.backup_path_for("eth0")).unwrap();
        assert_eq!(backup, second);

        let files = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, 2, "canonical and backup only, no leftover temp file");
    }

    #[tokio::test]
    async fn failed_save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = FileDocumentStore::new(dir.path(), "90-vz-");
        std::fs::create_dir(store.path_for("eth0")).unwrap();

        let result = store.save(&sample_document()).await;

        assert!(matches!(result, Err(SaveError::Backup { .. })));
        let files = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, 1, "only the directory standing in the way");
    }

    #[tokio::test]
    async fn save_creates_config_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("etc").join("netplan");
        let store = FileDocumentStore::new(&nested, "90-vz-");

        store.save(&sample_document()).await.unwrap();

        assert!(nested.join("90-vz-eth0.yaml").exists());
    }
}

mod mock_document_store {
    use super::*;
    use crate::store::mock::MockDocumentStore;

    #[test]
    fn empty_serves_skeleton() {
        let store = MockDocumentStore::empty();
        assert_eq!(
            store.load("eth1").unwrap(),
            NetplanDocument::skeleton("eth1")
        );
    }

    #[test]
    fn corrupted_fails_load() {
        let store = MockDocumentStore::corrupted();
        assert!(store.load("eth0").is_err());
    }

    #[tokio::test]
    async fn save_records_documents() {
        let store = MockDocumentStore::with_document(sample_document());

        store.save(&sample_document()).await.unwrap();

        assert_eq!(store.saved(), vec![sample_document()]);
    }

    #[tokio::test]
    async fn failing_save_records_nothing() {
        let store = MockDocumentStore::empty().failing_save();

        assert!(store.save(&sample_document()).await.is_err());
        assert!(store.saved().is_empty());
    }
}
