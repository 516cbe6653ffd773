//! Implementation of the `release list` command.
//!
//! Prints the plan without rendering templates or running actions.

use release_runner::config::{Action, ReleaseConfig, Step};
use release_runner::error::Result;
use std::path::Path;

pub fn cmd_list(file: &Path) -> Result<()> {
    let config = ReleaseConfig::load(file)?;
    for (index, step) in config.steps.iter().enumerate() {
        println!("{}", format_step(index + 1, step));
    }
    Ok(())
}

fn format_step(number: usize, step: &Step) -> String {
    let mut line = format!("{}. {}", number, step.title());

    let action = match step.action() {
        Action::None => None,
        Action::Git(git) => Some(format!("git shortlog since {}", git.get_shortlog.since)),
        Action::Command(command) => Some(format!("run `{}`", command.command)),
    };
    if let Some(action) = action {
        line.push_str(&format!("  [{}", action));
        if let Some(name) = step.set_variable() {
            line.push_str(&format!(" -> ${{{}}}", name));
        }
        line.push(']');
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use release_runner::config::CommandConfig;

    #[test]
    fn instruction_step() {
        assert_eq!(format_step(1, &Step::new("Announce")), "1. Announce");
    }

    #[test]
    fn command_step_with_variable() {
        let step = Step::new("Record ${version}")
            .with_action(Action::Command(CommandConfig::new("git rev-parse HEAD")))
            .with_set_variable("rev");
        assert_eq!(
            format_step(2, &step),
            "2. Record ${version}  [run `git rev-parse HEAD` -> ${rev}]"
        );
    }

    #[test]
    fn git_step() {
        let config = ReleaseConfig::from_yaml(
            "version:\n  from_time: \"%Y\"\nsteps:\n  - title: Changes\n    git:\n      repo: .\n      get_shortlog:\n        since: LATEST_ANNOTATED_TAG\n        include_merge_commits: false\n",
        )
        .unwrap();
        assert_eq!(
            format_step(1, &config.steps[0]),
            "1. Changes  [git shortlog since latest annotated tag]"
        );
    }
}
