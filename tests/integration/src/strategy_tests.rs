//! The rsync and software syncers must be interchangeable inside a lifecycle.
//!
//! Skipped when rsync is not installed.
#![cfg(unix)]

use std::sync::Arc;

use pretty_assertions::assert_eq;
use stager_core::{Lifecycle, StagerConfig};
use stager_fs::{HostOs, PathFactory, PathList};
use stager_process::{ExecutableFinder, PathExecutableFinder};
use stager_sync::FileSyncerStrategy;
use stager_test_utils::{Snapshot, TestTree};

fn run_cycle(strategy: FileSyncerStrategy) -> (Snapshot, Snapshot) {
    let tree = TestTree::new();
    tree.write("site/composer.json", "{}")
        .write("site/src/Kernel.php", "<?php")
        .write("site/var/cache/a.php", "cached")
        .mkdir("site/empty")
        .symlink("src/Kernel.php", "site/kernel.php");

    let config = StagerConfig {
        stage_executable: "sh".to_string(),
        file_syncer: strategy,
        ..Default::default()
    };
    let paths = PathFactory::with_working_dir(HostOs::current(), tree.root().to_string_lossy());
    let lifecycle = Lifecycle::with_finder(config, paths, Arc::new(PathExecutableFinder::new())).unwrap();
    let active = lifecycle.path("site");
    let staging = lifecycle.path("site/.stager");
    let exclusions = PathList::new(["var/cache"]).unwrap();

    lifecycle
        .beginner()
        .begin(&active, &staging, Some(&exclusions), None, None)
        .unwrap();
    let staged = tree.snapshot("site/.stager");

    let command: Vec<String> = vec![
        "-c".into(),
        "rm src/Kernel.php && echo '<?php // v2' > src/App.php && rmdir empty".into(),
    ];
    lifecycle
        .stager()
        .stage(&command, &active, &staging, None, None)
        .unwrap();
    lifecycle
        .committer()
        .commit(&staging, &active, Some(&exclusions), None, None)
        .unwrap();
    lifecycle
        .cleaner()
        .clean(&active, &staging, None, None)
        .unwrap();

    (staged, tree.snapshot("site"))
}

#[test]
fn rsync_and_software_cycles_agree() {
    if PathExecutableFinder::new().find("rsync").is_err() {
        eprintln!("rsync is not installed; skipping");
        return;
    }

    let by_rsync = run_cycle(FileSyncerStrategy::Rsync);
    let by_software = run_cycle(FileSyncerStrategy::Software);

    assert_eq!(by_rsync, by_software);
    assert!(by_software.1.contains("var/cache/a.php"));
    assert!(!by_software.1.contains("empty"));
    assert!(!by_software.1.contains(".stager"));
}
