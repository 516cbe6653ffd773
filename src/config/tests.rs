//! Tests for release file parsing and validation.

use crate::config::{Action, FromTime, ReleaseConfig, SinceWhat, Step};
use crate::error::ReleaseError;
use crate::version::{Timezone, VersionStrategy};
use tempfile::TempDir;

const FULL_RELEASE: &str = r#"
version:
  from_time: "%Y.%m.%d"
variables:
  project: "${env.HOME}/src/app"
  changelog: "${project}/CHANGELOG.md"
steps:
  - title: "  Collect changes since ${version}  "
    description: Review the shortlog.
    git:
      repo: ${project}
      get_shortlog:
        since: LATEST_TAG
        include_merge_commits: true
    set_variable: shortlog
  - title: Record revision
    run:
      command: git rev-parse HEAD
      chdir: ${project}
      env:
        GIT_PAGER: cat
        LANG: C
    set_variable: rev
  - title: Announce
    checklist:
      - Post ${version} in the release channel
      - Close milestone
    open_url: https://example.com/releases/${version}
"#;

#[test]
fn test_parse_full_release() {
    let config = ReleaseConfig::from_yaml(FULL_RELEASE).unwrap();

    assert_eq!(config.version.strategy(), VersionStrategy::from_time("%Y.%m.%d"));

    let names: Vec<_> = config.variables.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["project", "changelog"]);

    assert_eq!(config.steps.len(), 3);

    let collect = &config.steps[0];
    assert_eq!(collect.title(), "Collect changes since ${version}");
    assert_eq!(collect.description(), Some("Review the shortlog.\n"));
    assert_eq!(collect.set_variable(), Some("shortlog"));
    match collect.action() {
        Action::Git(git) => {
            assert_eq!(git.repo, "${project}");
            assert_eq!(git.get_shortlog.since, SinceWhat::LatestTag);
            assert!(git.get_shortlog.include_merge_commits);
        }
        other => panic!("expected git action, got {:?}", other),
    }

    let record = &config.steps[1];
    match record.action() {
        Action::Command(run) => {
            assert_eq!(run.command, "git rev-parse HEAD");
            assert_eq!(run.chdir.as_deref(), Some("${project}"));
            let keys: Vec<_> = run.env.keys().map(String::as_str).collect();
            assert_eq!(keys, vec!["GIT_PAGER", "LANG"]);
            assert!(run.shell.is_none());
        }
        other => panic!("expected run action, got {:?}", other),
    }

    let announce = &config.steps[2];
    assert_eq!(announce.action(), &Action::None);
    assert_eq!(announce.checklist().len(), 2);
    assert_eq!(
        announce.open_url(),
        Some("https://example.com/releases/${version}")
    );
}

#[test]
fn test_minimal_release() {
    let config = ReleaseConfig::from_yaml("version:\n  from_time: \"%Y\"\n").unwrap();
    assert!(config.variables.is_empty());
    assert!(config.steps.is_empty());
}

#[test]
fn test_since_strategies_parse() {
    for (raw, expected) in [
        ("LATEST_TAG", SinceWhat::LatestTag),
        ("LATEST_ANNOTATED_TAG", SinceWhat::LatestAnnotatedTag),
        ("LATEST_MERGE", SinceWhat::LatestMerge),
    ] {
        let since: SinceWhat = serde_yaml::from_str(raw).unwrap();
        assert_eq!(since, expected);
    }
    assert!(serde_yaml::from_str::<SinceWhat>("EVERYTHING").is_err());
}

#[test]
fn test_include_merge_commits_is_required() {
    let yaml = r#"
version:
  from_time: "%Y"
steps:
  - title: Shortlog
    git:
      repo: .
      get_shortlog:
        since: LATEST_ANNOTATED_TAG
"#;
    let err = ReleaseConfig::from_yaml(yaml).unwrap_err();
    assert!(matches!(err, ReleaseError::Config(_)));
    assert!(err.to_string().contains("include_merge_commits"), "got {}", err);
}

#[test]
fn test_version_detailed_form_with_timezone() {
    let yaml = r#"
version:
  from_time:
    format: "%Y%m%d"
    timezone: utc
"#;
    let config = ReleaseConfig::from_yaml(yaml).unwrap();
    assert_eq!(
        config.version.from_time,
        Some(FromTime::Detailed {
            format: Some("%Y%m%d".to_string()),
            timezone: Timezone::Utc,
        })
    );
    assert_eq!(
        config.version.strategy(),
        VersionStrategy::FromTime {
            format: Some("%Y%m%d".to_string()),
            timezone: Timezone::Utc,
        }
    );
}

#[test]
fn test_missing_version_format_fails_at_derive_time() {
    let config = ReleaseConfig::from_yaml("version: {}\n").unwrap();
    let err = config.version.strategy().derive().unwrap_err();
    assert!(matches!(err, ReleaseError::Version(_)));
}

#[test]
fn test_missing_version_section_is_rejected() {
    let err = ReleaseConfig::from_yaml("steps: []\n").unwrap_err();
    assert!(matches!(err, ReleaseError::Config(_)));
}

#[test]
fn test_git_and_run_together_are_rejected() {
    let yaml = r#"
version:
  from_time: "%Y"
steps:
  - title: Both
    git:
      repo: .
      get_shortlog:
        since: LATEST_TAG
        include_merge_commits: false
    run:
      command: echo hi
"#;
    let err = ReleaseConfig::from_yaml(yaml).unwrap_err();
    assert!(matches!(err, ReleaseError::Config(_)));
    assert!(err.to_string().contains("only 1 action"));
}

#[test]
fn test_set_variable_without_action_is_rejected() {
    let yaml = r#"
version:
  from_time: "%Y"
steps:
  - title: Nothing to capture
    set_variable: foo
"#;
    let err = ReleaseConfig::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("has no action"));
    assert!(err.to_string().contains("foo"));
}

#[test]
fn test_blank_title_is_rejected() {
    let yaml = r#"
version:
  from_time: "%Y"
steps:
  - title: "   "
"#;
    let err = ReleaseConfig::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("title must not be empty"));
}

#[test]
fn test_unknown_step_fields_are_ignored() {
    let yaml = r#"
version:
  from_time: "%Y"
steps:
  - title: Deploy
    gitlab:
      pipeline: 42
    environments: [staging, production]
"#;
    let config = ReleaseConfig::from_yaml(yaml).unwrap();
    assert_eq!(config.steps[0].title(), "Deploy");
}

#[test]
fn test_description_gets_exactly_one_trailing_newline() {
    assert_eq!(
        Step::new("t").with_description("text").description(),
        Some("text\n")
    );
    assert_eq!(
        Step::new("t").with_description("text\n").description(),
        Some("text\n")
    );
    assert_eq!(
        Step::new("t").with_description("line1\nline2\n\n\n").description(),
        Some("line1\nline2\n")
    );
}

#[test]
fn test_blank_description_is_dropped() {
    let yaml = r#"
version:
  from_time: "%Y"
steps:
  - title: Quiet
    description: ""
"#;
    let config = ReleaseConfig::from_yaml(yaml).unwrap();
    assert_eq!(config.steps[0].description(), None);
}

#[test]
fn test_validate_reports_step_number() {
    let config = ReleaseConfig {
        version: Default::default(),
        variables: Default::default(),
        steps: vec![Step::new("ok"), Step::new("bad").with_set_variable("x")],
    };
    let err = config.validate().unwrap_err();
    assert!(err.to_string().starts_with("step 2:"));
}

#[test]
fn test_load_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("release.yaml");
    std::fs::write(&path, FULL_RELEASE).unwrap();

    let config = ReleaseConfig::load(&path).unwrap();
    assert_eq!(config.steps.len(), 3);
}

#[test]
fn test_load_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let err = ReleaseConfig::load(temp_dir.path().join("missing.yaml")).unwrap_err();
    assert!(matches!(err, ReleaseError::Config(_)));
    assert!(err.to_string().contains("failed to read release file"));
}
