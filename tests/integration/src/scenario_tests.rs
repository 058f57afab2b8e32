//! End-to-end scenarios over the fixture configuration set
//!
//! Each scenario copies `test-fixtures/configs` into a temporary directory,
//! points the active link at one variant and drives the engine the way the
//! command-line tool does. Results are compared with `test-fixtures/expected`.

#![cfg(unix)]

use std::fs;
use std::path::PathBuf;

use cfgsync_core::{IssueKind, SyncConfig, SyncEngine, Verdict};
use cfgsync_sections::MissingSectionPolicy;
use cfgsync_test_utils::TestConfigDir;
use pretty_assertions::assert_eq;

const VARIANTS: [&str; 3] = ["config.home.ron", "config.travel.ron", "config.work.ron"];

fn fixtures_dir() -> PathBuf {
    // tests/integration -> ../../test-fixtures
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures")
}

fn fixture(path: &str) -> String {
    let full = fixtures_dir().join(path);
    fs::read_to_string(&full).unwrap_or_else(|_| panic!("missing fixture {}", full.display()))
}

/// Copy the fixture set and make `config.work.ron` active.
fn setup() -> TestConfigDir {
    let dir = TestConfigDir::new();
    for name in VARIANTS.iter().copied().chain(["cfgsync.toml"]) {
        dir.write(name, &fixture(&format!("configs/{name}")));
    }
    dir.activate("config.work.ron");
    dir
}

fn engine(dir: &TestConfigDir) -> SyncEngine {
    SyncEngine::new(SyncConfig::load(dir.root()).unwrap()).unwrap()
}

// =============================================================================
// S1: Propagation
// =============================================================================

mod s1_propagation {
    use super::*;
    use pretty_assertions::assert_eq;

    /// S1.1: Variants match the golden files after one sync
    #[test]
    fn s1_1_sync_matches_expected_output() {
        let dir = setup();

        let report = engine(&dir).sync().unwrap();

        assert!(report.is_committed());
        assert_eq!(report.active, "config.work.ron");
        assert_eq!(report.changed_files(), ["config.home.ron", "config.travel.ron"]);
        dir.assert_content("config.home.ron", &fixture("expected/config.home.ron"));
        dir.assert_content("config.travel.ron", &fixture("expected/config.travel.ron"));
        dir.assert_content("config.work.ron", &fixture("configs/config.work.ron"));
    }

    /// S1.2: Sections a variant lacks are reported, not invented
    #[test]
    fn s1_2_missing_sections_reported() {
        let dir = setup();

        let report = engine(&dir).sync().unwrap();

        let skipped: Vec<_> = report
            .issues_of(IssueKind::SectionNotFound)
            .map(|issue| (issue.file.as_str(), issue.section.as_deref()))
            .collect();
        assert_eq!(
            skipped,
            vec![
                ("config.travel.ron", Some("tags")),
                ("config.travel.ron", Some("window_rules")),
            ]
        );
    }

    /// S1.3: Append policy inserts missing sections before the closing parenthesis
    #[test]
    fn s1_3_append_policy_completes_variant() {
        let dir = setup();
        let mut config = SyncConfig::load(dir.root()).unwrap();
        config.missing_section = MissingSectionPolicy::Append;

        let report = SyncEngine::new(config).unwrap().sync().unwrap();

        assert!(report.is_committed());
        assert_eq!(report.issues_of(IssueKind::SectionNotFound).count(), 0);
        dir.assert_content(
            "config.travel.ron",
            &fixture("expected/config.travel.append.ron"),
        );
    }

    /// S1.4: Switching the active variant propagates in the other direction
    #[test]
    fn s1_4_switching_active_variant() {
        let dir = setup();
        engine(&dir).sync().unwrap();

        dir.write("config.home.ron", &fixture("configs/config.home.ron"));
        dir.activate("config.home.ron");
        let report = engine(&dir).sync().unwrap();

        assert_eq!(report.active, "config.home.ron");
        dir.assert_file_contains("config.work.ron", "value: \"st\"");
        dir.assert_file_contains("config.work.ron", "modkey: \"Mod4\"");
        dir.assert_file_contains("config.travel.ron", "value: \"st\"");
    }
}

// =============================================================================
// S2: Safety
// =============================================================================

mod s2_safety {
    use super::*;
    use pretty_assertions::assert_eq;

    /// S2.1: A second run finds nothing to do and takes no backups
    #[test]
    fn s2_1_second_run_is_idempotent() {
        let dir = setup();
        engine(&dir).sync().unwrap();
        let before = dir.snapshot();

        let report = engine(&dir).sync().unwrap();

        assert_eq!(report.verdict, Verdict::Committed { changed: vec![] });
        assert!(report.backups.is_empty());
        assert_eq!(dir.snapshot(), before);
    }

    /// S2.2: Check reports pending changes and writes nothing
    #[test]
    fn s2_2_check_is_read_only() {
        let dir = setup();
        let before = dir.snapshot();

        let report = engine(&dir).check().unwrap();

        assert!(!report.is_in_sync());
        assert!(report.changes.iter().all(|change| change.diff.is_some()));
        assert_eq!(dir.snapshot(), before);
    }

    /// S2.3: Every overwritten variant has a backup of its previous content
    #[test]
    fn s2_3_backups_hold_previous_content() {
        let dir = setup();

        engine(&dir).sync().unwrap();

        for name in ["config.home.ron", "config.travel.ron"] {
            let backups = dir.backups(name);
            assert_eq!(backups.len(), 1, "{name}");
            dir.assert_content(
                &format!("{}/{}", cfgsync_test_utils::dir::BACKUPS_DIR, backups[0]),
                &fixture(&format!("configs/{name}")),
            );
        }
        assert!(dir.backups("config.work.ron").is_empty());
    }

    /// S2.4: Retention from the settings file bounds the backup count
    #[test]
    fn s2_4_retention_bounds_backups() {
        let dir = setup();

        for _ in 0..5 {
            dir.write("config.home.ron", &fixture("configs/config.home.ron"));
            engine(&dir).sync().unwrap();
        }

        assert_eq!(dir.backups("config.home.ron").len(), 3);
    }

    /// S2.5: Restoring the backup undoes a sync
    #[test]
    fn s2_5_restore_undoes_sync() {
        let dir = setup();
        engine(&dir).sync().unwrap();
        let backup = dir.backups("config.home.ron").remove(0);

        let report = engine(&dir).restore_backup(&backup).unwrap();

        assert_eq!(report.restored.target, "config.home.ron");
        assert!(report.previous.is_some());
        dir.assert_content("config.home.ron", &fixture("configs/config.home.ron"));
    }
}

// =============================================================================
// S3: Status
// =============================================================================

mod s3_status {
    use super::*;
    use pretty_assertions::assert_eq;

    /// S3.1: Status marks stale variants until they are synced
    #[test]
    fn s3_1_status_tracks_sync_state() {
        let dir = setup();

        let stale: Vec<String> = engine(&dir)
            .status()
            .unwrap()
            .variants
            .into_iter()
            .filter(|v| v.is_out_of_sync())
            .map(|v| v.file)
            .collect();
        assert_eq!(stale, vec!["config.home.ron", "config.travel.ron"]);

        engine(&dir).sync().unwrap();

        let status = engine(&dir).status().unwrap();
        assert!(status.variants.iter().all(|v| !v.is_out_of_sync()));
        assert_eq!(
            status.variants.iter().map(|v| v.backups).collect::<Vec<_>>(),
            vec![1, 1, 0]
        );
    }

    /// S3.2: The status report serializes for machine consumers
    #[test]
    fn s3_2_status_serializes() {
        let dir = setup();

        let status = engine(&dir).status().unwrap();
        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["active"], "config.work.ron");
        assert_eq!(json["variants"].as_array().unwrap().len(), VARIANTS.len());
        assert_eq!(json["sections"][0], "keybind");
    }
}
