use std::time::Duration;

use pretty_assertions::assert_eq;
use rstest::rstest;
use stager_fs::{HostOs, NormalizedPath, PathFactory, PathList};
use stager_process::{BufferedOutputCallback, OutputType};
use stager_sync::{FileSyncer, SoftwareFileSyncer};
use stager_test_utils::TestTree;
use stager_translation::ErrorKind;

fn codebase() -> TestTree {
    let tree = TestTree::new();
    tree.write("active/composer.json", r#"{"name": "acme/site"}"#)
        .write("active/src/index.php", "<?php echo 'hi';")
        .write("active/vendor/autoload.php", "<?php // autoload")
        .write("active/cache/page.html", "cached")
        .mkdir("active/empty");
    tree
}

fn paths(tree: &TestTree, source: &str, destination: &str) -> (NormalizedPath, NormalizedPath) {
    let factory = PathFactory::with_working_dir(HostOs::current(), tree.root().to_string_lossy());
    (factory.create(source), factory.create(destination))
}

fn sync(tree: &TestTree, source: &str, destination: &str, exclusions: Option<&PathList>) {
    let (source, destination) = paths(tree, source, destination);
    SoftwareFileSyncer::new()
        .sync(&source, &destination, exclusions, None, None)
        .unwrap();
}

#[test]
fn creates_missing_destination_as_mirror() {
    let tree = codebase();

    sync(&tree, "active", "deeply/nested/staging", None);

    assert_eq!(tree.snapshot("deeply/nested/staging"), tree.snapshot("active"));
}

#[test]
fn second_sync_changes_nothing() {
    let tree = codebase();

    sync(&tree, "active", "staging", None);
    let first = tree.snapshot("staging");
    sync(&tree, "active", "staging", None);

    assert_eq!(tree.snapshot("staging"), first);
    assert_eq!(tree.snapshot("active"), first);
}

#[test]
fn overwrites_changed_files_and_deletes_extraneous_ones() {
    let tree = codebase();
    tree.write("staging/composer.json", "stale")
        .write("staging/obsolete.txt", "gone soon")
        .write("staging/old/dir/file.txt", "gone soon");

    sync(&tree, "active", "staging", None);

    assert_eq!(tree.snapshot("staging"), tree.snapshot("active"));
    tree.assert_not_exists("staging/obsolete.txt");
    tree.assert_not_exists("staging/old");
}

#[test]
fn excluded_paths_are_neither_copied_nor_deleted() {
    let tree = codebase();
    tree.write("staging/cache/local.html", "keep me");
    let exclusions = PathList::new(["cache"]).unwrap();

    sync(&tree, "active", "staging", Some(&exclusions));

    tree.assert_not_exists("staging/cache/page.html");
    tree.assert_file_contains("staging/cache/local.html", "keep me");
    assert_eq!(
        tree.snapshot_excluding("staging", &["cache"]),
        tree.snapshot_excluding("active", &["cache"])
    );
}

#[test]
fn nested_exclusions_apply_to_subtrees() {
    let tree = codebase();
    tree.write("active/vendor/bin/tool", "binary");
    let exclusions = PathList::new(["vendor/bin"]).unwrap();

    sync(&tree, "active", "staging", Some(&exclusions));

    tree.assert_exists("staging/vendor/autoload.php");
    tree.assert_not_exists("staging/vendor/bin");
}

#[rstest]
#[case::file_replaces_dir("composer.json", true)]
#[case::dir_replaces_file("src", false)]
fn type_conflicts_are_resolved(#[case] rel: &str, #[case] dest_is_dir: bool) {
    let tree = codebase();
    let in_staging = format!("staging/{rel}");
    if dest_is_dir {
        tree.write(&format!("{in_staging}/inner.txt"), "wrong type");
    } else {
        tree.write(&in_staging, "wrong type");
    }

    sync(&tree, "active", "staging", None);

    assert_eq!(tree.snapshot("staging"), tree.snapshot("active"));
}

#[test]
fn destination_nested_in_source_is_not_copied_into_itself() {
    let tree = codebase();

    sync(&tree, "active", "active/.staging", None);

    tree.assert_not_exists("active/.staging/.staging");
    assert_eq!(
        tree.snapshot("active/.staging"),
        tree.snapshot_excluding("active", &[".staging"])
    );
}

#[test]
fn source_nested_in_destination_is_not_deleted() {
    let tree = codebase();
    sync(&tree, "active", "active/.staging", None);
    tree.write("active/.staging/src/new.php", "<?php // new");

    sync(&tree, "active/.staging", "active", None);

    tree.assert_file_contains("active/src/new.php", "new");
    tree.assert_file_contains("active/.staging/src/new.php", "new");
    assert_eq!(
        tree.snapshot_excluding("active", &[".staging"]),
        tree.snapshot("active/.staging")
    );
}

#[cfg(unix)]
#[test]
fn symlinks_are_copied_as_symlinks() {
    let tree = codebase();
    tree.symlink("../composer.json", "active/src/composer.json")
        .symlink("vendor", "active/vendor-link")
        .symlink("missing-target", "active/dangling");

    sync(&tree, "active", "staging", None);

    tree.assert_symlink("staging/src/composer.json", "../composer.json");
    tree.assert_symlink("staging/vendor-link", "vendor");
    tree.assert_symlink("staging/dangling", "missing-target");
    assert_eq!(tree.snapshot("staging"), tree.snapshot("active"));
}

#[cfg(unix)]
#[test]
fn symlink_in_destination_is_replaced_not_followed() {
    let tree = codebase();
    tree.write("outside/composer.json", "outside")
        .symlink("../outside/composer.json", "staging/composer.json");

    sync(&tree, "active", "staging", None);

    tree.assert_file_contains("outside/composer.json", "outside");
    assert_eq!(tree.snapshot("staging"), tree.snapshot("active"));
}

#[cfg(unix)]
#[test]
fn special_files_are_skipped() {
    use std::os::unix::net::UnixListener;
    use stager_test_utils::Entry;

    let tree = codebase();
    let _listener = UnixListener::bind(tree.path("active/src/app.sock")).unwrap();
    tree.write("staging/src/app.sock", "stale regular file");
    let mut output = BufferedOutputCallback::new();
    let (source, destination) = paths(&tree, "active", "staging");

    SoftwareFileSyncer::new()
        .sync(&source, &destination, None, Some(&mut output), None)
        .unwrap();

    assert_eq!(tree.snapshot("active").get("src/app.sock"), Some(&Entry::Special));
    tree.assert_not_exists("staging/src/app.sock");
    assert_eq!(
        tree.snapshot("staging"),
        tree.snapshot_excluding("active", &["src/app.sock"])
    );
    assert!(output.output().contains(&"deleting src/app.sock"));
}

#[test]
fn reports_each_transfer_on_stdout() {
    let tree = codebase();
    tree.write("staging/obsolete.txt", "x");
    let (source, destination) = paths(&tree, "active", "staging");
    let mut output = BufferedOutputCallback::new();

    SoftwareFileSyncer::new()
        .sync(&source, &destination, None, Some(&mut output), None)
        .unwrap();

    assert!(output.lines().iter().all(|(kind, _)| *kind == OutputType::Out));
    let lines = output.output();
    assert!(lines.contains(&"deleting obsolete.txt"));
    assert!(lines.contains(&"composer.json"));
    assert!(lines.contains(&"src/"));
}

#[test]
fn exceeding_the_timeout_is_runtime_error() {
    let tree = codebase();
    let (source, destination) = paths(&tree, "active", "staging");

    let err = SoftwareFileSyncer::new()
        .sync(&source, &destination, None, None, Some(Duration::from_nanos(1)))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Runtime);
}

#[test]
fn missing_source_is_logic_error_and_touches_nothing() {
    let tree = TestTree::new();
    let (source, destination) = paths(&tree, "absent", "staging");

    let err = SoftwareFileSyncer::new()
        .sync(&source, &destination, None, None, None)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Logic);
    tree.assert_not_exists("staging");
}
