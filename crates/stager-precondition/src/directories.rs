//! Checks on the active and staging directories

use stager_fs::filesystem;
use stager_translation::TranslatableMessage;

use crate::check::{Check, CheckContext, Outcome};

/// The active and staging directories resolve to different paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveAndStagingDirsAreDifferent;

impl Check for ActiveAndStagingDirsAreDifferent {
    fn name(&self) -> &'static str {
        "ActiveAndStagingDirsAreDifferent"
    }

    fn description(&self) -> TranslatableMessage {
        TranslatableMessage::new("The active and staging directories must be different.")
    }

    fn fulfilled_message(&self) -> TranslatableMessage {
        TranslatableMessage::new("The active and staging directories are different.")
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Outcome {
        if ctx.active_dir == ctx.staging_dir {
            return Err(TranslatableMessage::new(
                "The active and staging directories are the same at %path%.",
            )
            .with_parameter("%path%", ctx.active_dir));
        }
        Ok(())
    }
}

/// Which of the two lifecycle directories a check looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Codebase {
    Active,
    Staging,
}

impl Codebase {
    fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Staging => "staging",
        }
    }

    fn dir<'a>(self, ctx: &CheckContext<'a>) -> &'a stager_fs::NormalizedPath {
        match self {
            Self::Active => ctx.active_dir,
            Self::Staging => ctx.staging_dir,
        }
    }
}

fn dir_exists(codebase: Codebase, ctx: &CheckContext<'_>) -> Outcome {
    let dir = codebase.dir(ctx);
    if dir.is_dir() {
        return Ok(());
    }
    Err(
        TranslatableMessage::new("The %codebase% directory does not exist at %path%.")
            .with_parameter("%codebase%", codebase.label())
            .with_parameter("%path%", dir),
    )
}

fn dir_is_writable(codebase: Codebase, ctx: &CheckContext<'_>) -> Outcome {
    let dir = codebase.dir(ctx);
    if filesystem::is_writable(dir) {
        return Ok(());
    }
    Err(
        TranslatableMessage::new("The %codebase% directory is not writable at %path%.")
            .with_parameter("%codebase%", codebase.label())
            .with_parameter("%path%", dir),
    )
}

/// The active directory exists and is a directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveDirExists;

impl Check for ActiveDirExists {
    fn name(&self) -> &'static str {
        "ActiveDirExists"
    }

    fn description(&self) -> TranslatableMessage {
        TranslatableMessage::new("The active directory must exist.")
    }

    fn fulfilled_message(&self) -> TranslatableMessage {
        TranslatableMessage::new("The active directory exists.")
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Outcome {
        dir_exists(Codebase::Active, ctx)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveDirIsWritable;

impl Check for ActiveDirIsWritable {
    fn name(&self) -> &'static str {
        "ActiveDirIsWritable"
    }

    fn description(&self) -> TranslatableMessage {
        TranslatableMessage::new("The active directory must be writable.")
    }

    fn fulfilled_message(&self) -> TranslatableMessage {
        TranslatableMessage::new("The active directory is writable.")
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Outcome {
        dir_is_writable(Codebase::Active, ctx)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StagingDirExists;

impl Check for StagingDirExists {
    fn name(&self) -> &'static str {
        "StagingDirExists"
    }

    fn description(&self) -> TranslatableMessage {
        TranslatableMessage::new("The staging directory must exist.")
    }

    fn fulfilled_message(&self) -> TranslatableMessage {
        TranslatableMessage::new("The staging directory exists.")
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Outcome {
        dir_exists(Codebase::Staging, ctx)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StagingDirIsWritable;

impl Check for StagingDirIsWritable {
    fn name(&self) -> &'static str {
        "StagingDirIsWritable"
    }

    fn description(&self) -> TranslatableMessage {
        TranslatableMessage::new("The staging directory must be writable.")
    }

    fn fulfilled_message(&self) -> TranslatableMessage {
        TranslatableMessage::new("The staging directory is writable.")
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Outcome {
        dir_is_writable(Codebase::Staging, ctx)
    }
}

/// Nothing, not even a dangling symlink, exists at the staging path.
#[derive(Debug, Clone, Copy, Default)]
pub struct StagingDirDoesNotExist;

impl Check for StagingDirDoesNotExist {
    fn name(&self) -> &'static str {
        "StagingDirDoesNotExist"
    }

    fn description(&self) -> TranslatableMessage {
        TranslatableMessage::new("The staging directory must not already exist.")
    }

    fn fulfilled_message(&self) -> TranslatableMessage {
        TranslatableMessage::new("The staging directory does not already exist.")
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Outcome {
        if ctx.staging_dir.exists() {
            return Err(
                TranslatableMessage::new("The staging directory already exists at %path%.")
                    .with_parameter("%path%", ctx.staging_dir),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use stager_fs::{HostOs, PathFactory};
    use tempfile::TempDir;

    fn evaluate(check: &dyn Check, temp: &TempDir, active: &str, staging: &str) -> Outcome {
        let factory = PathFactory::with_working_dir(HostOs::current(), temp.path().to_string_lossy());
        let (active, staging) = (factory.create(active), factory.create(staging));
        check.evaluate(&CheckContext::new(&active, &staging))
    }

    #[rstest]
    #[case("active", "staging", true)]
    #[case("active", "./active/", false)]
    #[case("active", "active/../active", false)]
    fn dirs_are_different(#[case] active: &str, #[case] staging: &str, #[case] expected: bool) {
        let temp = TempDir::new().unwrap();
        let outcome = evaluate(&ActiveAndStagingDirsAreDifferent, &temp, active, staging);
        assert_eq!(outcome.is_ok(), expected);
    }

    #[test]
    fn existence_checks() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("active")).unwrap();
        std::fs::write(temp.path().join("file"), "x").unwrap();

        assert!(evaluate(&ActiveDirExists, &temp, "active", "staging").is_ok());
        assert!(evaluate(&ActiveDirExists, &temp, "file", "staging").is_err());
        assert!(evaluate(&StagingDirExists, &temp, "active", "staging").is_err());
        assert!(evaluate(&StagingDirDoesNotExist, &temp, "active", "staging").is_ok());
        assert!(evaluate(&StagingDirDoesNotExist, &temp, "staging", "file").is_err());
    }

    #[test]
    fn unfulfilled_message_names_the_directory() {
        let temp = TempDir::new().unwrap();
        let message = evaluate(&StagingDirExists, &temp, "active", "staging").unwrap_err();
        let rendered = message.to_string();
        assert!(rendered.starts_with("The staging directory does not exist at "));
        assert!(rendered.ends_with("staging."));
    }

    #[cfg(unix)]
    #[test]
    fn writability_checks() {
        let temp = TempDir::new().unwrap();
        let staging = temp.path().join("staging");
        std::fs::create_dir(temp.path().join("active")).unwrap();
        std::fs::create_dir(&staging).unwrap();
        let mut permissions = std::fs::metadata(&staging).unwrap().permissions();
        permissions.set_readonly(true);
        std::fs::set_permissions(&staging, permissions).unwrap();

        assert!(evaluate(&ActiveDirIsWritable, &temp, "active", "staging").is_ok());
        assert!(evaluate(&StagingDirIsWritable, &temp, "active", "staging").is_err());

        let mut permissions = std::fs::metadata(&staging).unwrap().permissions();
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);
        std::fs::set_permissions(&staging, permissions).unwrap();
    }
}
