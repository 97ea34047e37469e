//! Expansion of a resolved entry's path rules into download jobs.

use crate::core::{Condition, Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::pattern::PathRule;
use crate::resolver::DependencyEntry;
use serde::Serialize;
use tracing::debug;

/// Copy one remote artifact file to one local path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    /// Fully qualified download URL
    pub source_url: String,
    /// Path of the file within the build's artifacts
    pub source_path: String,
    /// Local path, relative to the destination root
    pub destination: String,
    pub condition: Condition,
    pub clean_destination: bool,
}

impl Job {
    /// Whether the job applies when building `variant`.
    pub fn applies_to(&self, variant: Condition) -> bool {
        self.condition.applies_to(variant)
    }
}

/// Expands an entry's rules against the artifact listing of its build.
///
/// Jobs follow rule order, then listing order. Nothing is deduplicated: two
/// rules matching the same file produce two jobs. A rule that matches nothing
/// or whose condition excludes the entry's yields no jobs and no diagnostic;
/// an unparsable rule yields a format diagnostic and is skipped.
pub fn expand_jobs(entry: &DependencyEntry, files: &[String], sink: &mut dyn DiagnosticSink) -> Vec<Job> {
    let spec = entry.to_spec();
    let mut jobs = Vec::new();

    for line in spec.rule_lines() {
        let rule = match PathRule::parse(line) {
            Ok(rule) => rule,
            Err(e) => {
                sink.report(Diagnostic::error(
                    DiagnosticKind::Format,
                    format!("{e} in rule '{}' of {}", line.trim(), spec.key()),
                ));
                continue;
            }
        };

        let Some(condition) = entry.condition.intersect(rule.condition) else {
            debug!("Rule '{}' is excluded by condition {}", line.trim(), entry.condition);
            continue;
        };

        let before = jobs.len();
        jobs.extend(files.iter().filter(|path| rule.matches(path)).map(|path| Job {
            source_url: entry.server.artifact_url(entry.build_configuration_id(), &entry.revision, path),
            source_path: path.clone(),
            destination: rule.destination_for(path),
            condition,
            clean_destination: entry.clean_destination,
        }));
        debug!("Rule '{}' matched {} file(s)", line.trim(), jobs.len() - before);
    }

    jobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DependencySpec;
    use crate::server::{BuildConfiguration, Project, Server, ServerType};
    use std::sync::Arc;

    fn entry(rules: &str, condition: Condition) -> DependencyEntry {
        let spec = DependencySpec::new("ServerA", "cfg1").with_path_rules(rules).with_condition(condition);
        DependencyEntry::new(
            &spec,
            Arc::new(Server::new("ServerA", ServerType::TeamCity, "https://ci")),
            Project {
                id: "P".to_string(),
                name: "Product".to_string(),
            },
            BuildConfiguration {
                id: "cfg1".to_string(),
                name: "Build".to_string(),
                project_id: "P".to_string(),
            },
        )
        .unwrap()
    }

    fn listing(files: &[&str]) -> Vec<String> {
        files.iter().map(|f| (*f).to_string()).collect()
    }

    #[test]
    fn test_single_zip_into_lib() {
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let jobs = expand_jobs(
            &entry("build/*.zip=>lib/", Condition::Always),
            &listing(&["build/x.zip", "build/y.txt"]),
            &mut diagnostics,
        );

        assert!(diagnostics.is_empty());
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].source_path, "build/x.zip");
        assert_eq!(jobs[0].destination, "lib/x.zip");
        assert_eq!(jobs[0].source_url, "https://ci/repository/download/cfg1/.lastSuccessful/build/x.zip");
    }

    #[test]
    fn test_order_and_no_dedup() {
        let files = listing(&["b.txt", "a.txt", "c.bin"]);
        let jobs = expand_jobs(&entry("*.txt\n*\n", Condition::Always), &files, &mut Vec::<Diagnostic>::new());
        let sources: Vec<_> = jobs.iter().map(|j| j.source_path.as_str()).collect();
        assert_eq!(sources, vec!["b.txt", "a.txt", "b.txt", "a.txt", "c.bin"]);
    }

    #[test]
    fn test_zero_matches_is_silent() {
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let jobs = expand_jobs(&entry("nothing/*.zip", Condition::Always), &listing(&["a.zip"]), &mut diagnostics);
        assert!(jobs.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_conditions() {
        let files = listing(&["bin/a.dll", "bin/a.pdb"]);
        let rules = "bin/*.dll=>out/\n@Debug: bin/*.pdb=>out/\n@Release: bin/*.dll=>release/";

        let jobs = expand_jobs(&entry(rules, Condition::Always), &files, &mut Vec::<Diagnostic>::new());
        let tagged: Vec<_> = jobs.iter().map(|j| (j.destination.as_str(), j.condition)).collect();
        assert_eq!(
            tagged,
            vec![
                ("out/a.dll", Condition::Always),
                ("out/a.pdb", Condition::Debug),
                ("release/a.dll", Condition::Release)
            ]
        );
        assert!(jobs[1].applies_to(Condition::Debug));
        assert!(!jobs[1].applies_to(Condition::Release));

        // A Debug entry never produces Release-only jobs.
        let jobs = expand_jobs(&entry(rules, Condition::Debug), &files, &mut Vec::<Diagnostic>::new());
        assert_eq!(jobs.len(), 2);
        assert!(jobs.iter().all(|j| j.condition == Condition::Debug));
    }

    #[test]
    fn test_bad_rule_reported_and_skipped() {
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let jobs =
            expand_jobs(&entry("../escape/*\nbuild/*.zip", Condition::Always), &listing(&["build/x.zip"]), &mut diagnostics);
        assert_eq!(jobs.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::Format);
        assert!(diagnostics[0].message.contains("ServerA::cfg1"));
    }

    #[test]
    fn test_clean_destination_and_literal_destination() {
        let mut e = entry("build/*.zip=>lib/package.zip", Condition::Always);
        e.clean_destination = true;
        let jobs = expand_jobs(&e, &listing(&["build/x.zip", "build/y.zip"]), &mut Vec::<Diagnostic>::new());
        assert!(jobs.iter().all(|j| j.clean_destination && j.destination == "lib/package.zip"));
    }
}
