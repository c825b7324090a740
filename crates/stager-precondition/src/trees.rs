//! The precondition tree guarding each lifecycle stage

use std::fmt;
use std::sync::Arc;

use stager_fs::HostOs;
use stager_process::ExecutableFinder;
use stager_translation::TranslatableMessage;

use crate::directories::{
    ActiveAndStagingDirsAreDifferent, ActiveDirExists, ActiveDirIsWritable, StagingDirDoesNotExist,
    StagingDirExists, StagingDirIsWritable,
};
use crate::host::{ExecutableIsAvailable, NoNestingOnWindows};
use crate::links::{
    Codebases, NoAbsoluteSymlinksExist, NoHardLinksExist, NoLinksExistOnWindows,
    NoSymlinksPointOutsideTheCodebase,
};
use crate::precondition::Precondition;

/// What the trees need to know about the host.
#[derive(Clone)]
pub struct Environment {
    pub host: HostOs,
    pub finder: Arc<dyn ExecutableFinder>,
    /// The executable run during staging
    pub stage_executable: String,
}

impl Environment {
    pub fn new(host: HostOs, finder: Arc<dyn ExecutableFinder>, stage_executable: impl Into<String>) -> Self {
        Self {
            host,
            finder,
            stage_executable: stage_executable.into(),
        }
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("host", &self.host)
            .field("stage_executable", &self.stage_executable)
            .finish_non_exhaustive()
    }
}

fn composite(name: &'static str, description: &str, fulfilled: &str, children: Vec<Precondition>) -> Precondition {
    Precondition::composite(
        name,
        TranslatableMessage::new(description),
        TranslatableMessage::new(fulfilled),
        children,
    )
}

pub fn active_dir_is_ready() -> Precondition {
    composite(
        "ActiveDirIsReady",
        "The active directory must be ready to use.",
        "The active directory is ready to use.",
        vec![
            Precondition::leaf(ActiveDirExists),
            Precondition::leaf(ActiveDirIsWritable),
        ],
    )
}

pub fn staging_dir_is_ready() -> Precondition {
    composite(
        "StagingDirIsReady",
        "The staging directory must be ready to use.",
        "The staging directory is ready to use.",
        vec![
            Precondition::leaf(StagingDirExists),
            Precondition::leaf(StagingDirIsWritable),
        ],
    )
}

/// Checks shared by every stage.
pub fn common_preconditions(env: &Environment) -> Precondition {
    composite(
        "CommonPreconditions",
        "The preconditions common to all operations must be fulfilled.",
        "The preconditions common to all operations are fulfilled.",
        vec![
            Precondition::leaf(ActiveAndStagingDirsAreDifferent),
            active_dir_is_ready(),
            Precondition::leaf(ExecutableIsAvailable::new(
                env.stage_executable.clone(),
                Arc::clone(&env.finder),
            )),
            Precondition::leaf(NoNestingOnWindows::new(env.host)),
        ],
    )
}

pub fn no_unsupported_links_exist(host: HostOs, codebases: Codebases) -> Precondition {
    composite(
        "NoUnsupportedLinksExist",
        "The codebase must not contain any unsupported links.",
        "There are no unsupported links in the codebase.",
        vec![
            Precondition::leaf(NoAbsoluteSymlinksExist::new(codebases)),
            Precondition::leaf(NoHardLinksExist::new(codebases)),
            Precondition::leaf(NoLinksExistOnWindows::new(host, codebases)),
            Precondition::leaf(NoSymlinksPointOutsideTheCodebase::new(codebases)),
        ],
    )
}

/// Guards `begin`: the active codebase is safe to copy and no staging
/// directory exists yet.
pub fn beginner_preconditions(env: &Environment) -> Precondition {
    composite(
        "BeginnerPreconditions",
        "The preconditions for beginning the staging process must be fulfilled.",
        "The preconditions for beginning the staging process are fulfilled.",
        vec![
            common_preconditions(env),
            no_unsupported_links_exist(env.host, Codebases::Active),
            Precondition::leaf(StagingDirDoesNotExist),
        ],
    )
}

/// Guards `stage`.
pub fn stager_preconditions(env: &Environment) -> Precondition {
    composite(
        "StagerPreconditions",
        "The preconditions for staging changes must be fulfilled.",
        "The preconditions for staging changes are fulfilled.",
        vec![common_preconditions(env), staging_dir_is_ready()],
    )
}

/// Guards `commit`: both codebases are safe to copy.
pub fn committer_preconditions(env: &Environment) -> Precondition {
    composite(
        "CommitterPreconditions",
        "The preconditions for making staged changes live must be fulfilled.",
        "The preconditions for making staged changes live are fulfilled.",
        vec![
            common_preconditions(env),
            staging_dir_is_ready(),
            no_unsupported_links_exist(env.host, Codebases::ActiveAndStaging),
        ],
    )
}

/// Guards `clean`.
pub fn cleaner_preconditions(env: &Environment) -> Precondition {
    composite(
        "CleanerPreconditions",
        "The preconditions for removing the staging directory must be fulfilled.",
        "The preconditions for removing the staging directory are fulfilled.",
        vec![common_preconditions(env), staging_dir_is_ready()],
    )
}
