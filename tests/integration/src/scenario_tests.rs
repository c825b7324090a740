//! End-to-end lifecycle scenarios
//!
//! Each test drives a host-style flow: load a config file, build the
//! lifecycle, and run begin/stage/commit/clean against a real tree.
#![cfg(unix)]

use std::sync::Arc;

use assert_fs::prelude::*;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use stager_core::{ErrorKind, Lifecycle, StagerConfig};
use stager_fs::{HostOs, PathFactory, PathList};
use stager_process::{BufferedOutputCallback, PathExecutableFinder};
use stager_test_utils::TestTree;
use stager_translation::{DefaultTranslator, Domain};

fn write_config(tree: &TestTree, body: &str) -> StagerConfig {
    tree.write("stager.toml", body);
    StagerConfig::load(&tree.path("stager.toml")).unwrap()
}

fn lifecycle(tree: &TestTree, config: StagerConfig) -> Lifecycle {
    let paths = PathFactory::with_working_dir(HostOs::current(), tree.root().to_string_lossy());
    Lifecycle::with_finder(config, paths, Arc::new(PathExecutableFinder::new())).unwrap()
}

fn site(tree: &TestTree) {
    tree.write("site/composer.json", r#"{"require": {"acme/core": "^1.0"}}"#)
        .write("site/composer.lock", "lock v1")
        .write("site/vendor/acme/core/Core.php", "<?php class Core {}")
        .write("site/public/index.php", "<?php require '../vendor/autoload.php';")
        .write("site/var/cache/routes.php", "<?php return [];")
        .write("site/var/log/app.log", "line 1\n")
        .symlink("public/index.php", "site/index.php");
}

#[test]
fn package_update_goes_live_and_leaves_excluded_paths_alone() {
    let tree = TestTree::new();
    site(&tree);
    let config = write_config(
        &tree,
        "stage_executable = \"sh\"\nfile_syncer = \"software\"\ntimeout_secs = 60\n",
    );
    let lifecycle = lifecycle(&tree, config);
    let timeout = lifecycle.config().timeout();
    let active = lifecycle.path("site");
    let staging = lifecycle.path("site.staging");
    let exclusions = PathList::new(["var/log", "var/cache"]).unwrap();

    lifecycle
        .beginner()
        .begin(&active, &staging, Some(&exclusions), None, timeout)
        .unwrap();

    let update: Vec<String> = vec![
        "-c".into(),
        "echo 'lock v2' > composer.lock && mkdir -p vendor/acme/extra && \
         echo '<?php' > vendor/acme/extra/Extra.php && rm -r vendor/acme/core"
            .into(),
    ];
    let mut output = BufferedOutputCallback::new();
    lifecycle
        .stager()
        .stage(&update, &active, &staging, Some(&mut output), timeout)
        .unwrap();

    // Logs written while the update ran must survive the commit
    tree.write("site/var/log/app.log", "line 1\nline 2\n");

    lifecycle
        .committer()
        .commit(&staging, &active, Some(&exclusions), None, timeout)
        .unwrap();
    lifecycle
        .cleaner()
        .clean(&active, &staging, None, timeout)
        .unwrap();

    let site = assert_fs::fixture::ChildPath::new(tree.path("site"));
    site.child("composer.lock").assert(predicate::str::contains("lock v2"));
    site.child("vendor/acme/extra/Extra.php").assert(predicate::path::exists());
    site.child("vendor/acme/core").assert(predicate::path::missing());
    site.child("var/log/app.log").assert("line 1\nline 2\n");
    site.child("var/cache/routes.php").assert(predicate::path::exists());
    tree.assert_symlink("site/index.php", "public/index.php");
    tree.assert_not_exists("site.staging");
}

#[test]
fn failed_stage_leaves_the_active_codebase_untouched() {
    let tree = TestTree::new();
    site(&tree);
    let config = write_config(&tree, "stage_executable = \"sh\"\nfile_syncer = \"software\"\n");
    let lifecycle = lifecycle(&tree, config);
    let active = lifecycle.path("site");
    let staging = lifecycle.path("site.staging");
    let before = tree.snapshot("site");

    lifecycle
        .beginner()
        .begin(&active, &staging, None, None, None)
        .unwrap();
    let broken: Vec<String> = vec!["-c".into(), "rm composer.json; exit 1".into()];
    let err = lifecycle
        .stager()
        .stage(&broken, &active, &staging, None, None)
        .unwrap_err();
    lifecycle
        .cleaner()
        .clean(&active, &staging, None, None)
        .unwrap();

    assert_eq!(err.kind(), ErrorKind::Runtime);
    assert_eq!(tree.snapshot("site"), before);
}

#[test]
fn commit_from_a_staging_dir_inside_the_codebase() {
    let tree = TestTree::new();
    site(&tree);
    let config = write_config(&tree, "stage_executable = \"sh\"\n");
    let lifecycle = lifecycle(&tree, config);
    let active = lifecycle.path("site");
    let staging = lifecycle.path("site/.stager");

    lifecycle
        .beginner()
        .begin(&active, &staging, None, None, None)
        .unwrap();
    tree.write("site/.stager/public/health.php", "<?php echo 'ok';");
    lifecycle
        .committer()
        .commit(&staging, &active, None, None, None)
        .unwrap();

    tree.assert_file_contains("site/public/health.php", "ok");
    tree.assert_exists("site/.stager/public/health.php");
    assert_eq!(
        tree.snapshot_excluding("site", &[".stager"]),
        tree.snapshot("site/.stager")
    );
}

#[test]
fn unfulfilled_precondition_renders_in_the_configured_locale() {
    let tree = TestTree::new();
    site(&tree);
    let config = write_config(&tree, "stage_executable = \"sh\"\nlocale = \"de_DE\"\n");
    let mut translator = DefaultTranslator::new("de_DE");
    translator.add_translation(
        "de_DE",
        Domain::Messages,
        "The %codebase% directory does not exist at %path%.",
        "Das Verzeichnis %codebase% existiert nicht unter %path%.",
    );
    let lifecycle = lifecycle(&tree, config).with_translator(Arc::new(translator));
    let active = lifecycle.path("site");
    let staging = lifecycle.path("missing-staging");

    let err = lifecycle
        .committer()
        .commit(&staging, &active, None, None, None)
        .unwrap_err();

    assert_eq!(err.precondition_name(), Some("StagingDirExists"));
    assert_eq!(
        lifecycle.render(err.translatable_message()),
        format!(
            "Das Verzeichnis staging existiert nicht unter {}.",
            tree.path("missing-staging").display()
        )
    );
}

#[test]
fn precondition_status_tracks_the_filesystem() {
    let tree = TestTree::new();
    site(&tree);
    let config = write_config(&tree, "stage_executable = \"sh\"\n");
    let lifecycle = lifecycle(&tree, config);
    let active = lifecycle.path("site");
    let staging = lifecycle.path("site.staging");
    let ctx = stager_precondition::CheckContext::new(&active, &staging);
    let cleaner_tree = lifecycle.cleaner().preconditions();

    assert!(!cleaner_tree.is_fulfilled(&ctx));
    lifecycle
        .beginner()
        .begin(&active, &staging, None, None, None)
        .unwrap();
    assert!(cleaner_tree.is_fulfilled(&ctx));
    assert_eq!(
        cleaner_tree.status_message(&ctx).message(),
        "The preconditions for removing the staging directory are fulfilled."
    );
    assert!(!lifecycle.beginner().preconditions().is_fulfilled(&ctx));
}
