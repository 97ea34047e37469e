//! End-to-end resolution: descriptor text in, entries and jobs out.

use artdeps::core::{Condition, Diagnostic, DiagnosticKind, Severity, TracingSink, error_count};
use artdeps::descriptor::{DependencySpec, parse, save};
use artdeps::resolver::{resolve, resolve_jobs};
use artdeps::server::connector::FixedConnectors;
use artdeps::server::memory::Operation;
use artdeps::server::{DefaultConnectors, MemoryServer, ServerRegistry};
use artdeps::test_utils::{DescriptorFixture, SnapshotFixture, TestEnvironment, init_test_logging, memory_server};
use std::path::Path;
use std::sync::Arc;

fn memory_registry(servers: &[artdeps::server::Server], named: Vec<(&str, MemoryServer)>) -> ServerRegistry {
    let factory = named
        .into_iter()
        .fold(FixedConnectors::new(DefaultConnectors), |factory, (name, server)| factory.with_memory(name, server));
    ServerRegistry::from_servers(servers, Arc::new(factory))
}

#[tokio::test]
async fn test_saved_entries_resolve_to_themselves() {
    init_test_logging(None);
    let parsed = parse(&DescriptorFixture::basic(Path::new("unused.json")).content);
    let ci = memory_server();
    let registry = memory_registry(&parsed.descriptor.servers, vec![("ci", ci.clone())]);

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let entries = resolve(&parsed.descriptor, &registry, &mut diagnostics).await;
    assert!(diagnostics.is_empty());
    assert_eq!(entries.len(), 2);

    let text = save(&parsed.descriptor.servers, &entries);
    assert!(text.contains("Name=Build"));

    let reparsed = parse(&text);
    assert!(reparsed.diagnostics.is_empty());
    let again = resolve(&reparsed.descriptor, &registry, &mut diagnostics).await;
    assert_eq!(again, entries);

    // Metadata is memoized across both passes over the same registry.
    assert_eq!(ci.calls(Operation::ListProjects), 1);
    assert_eq!(ci.calls(Operation::GetBuildConfiguration), 2);
}

#[test]
fn test_multi_line_path_survives_save_and_load() {
    let rules = "build/*.zip=>lib/\n  docs/**  \n@Debug: bin/*.pdb=>symbols/";
    let text = format!(
        "[[ci]]\nType=TeamCity\nUrl=https://ci\n\n[ci::Lib_Build]\nPath={rules}\n\n[ci::Other]\nPath=*\n"
    );
    let parsed = parse(&text);
    assert!(parsed.diagnostics.is_empty());
    assert_eq!(parsed.descriptor.dependencies[0].path_rules, rules);

    let saved = artdeps::descriptor::save_specs(&parsed.descriptor.servers, &parsed.descriptor.dependencies);
    let reparsed = parse(&saved);
    assert_eq!(reparsed.descriptor, parsed.descriptor);
}

#[test]
fn test_undeclared_server_yields_one_reference_error() {
    let text = "[[ci]]\nType=TeamCity\nUrl=https://ci\n\n[nowhere::Lib_Build]\nCondition=Debug\nPath=*\n";
    let parsed = parse(text);

    assert!(parsed.descriptor.dependencies.is_empty());
    assert_eq!(parsed.diagnostics.len(), 1);
    let diagnostic = &parsed.diagnostics[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::Reference);
    assert_eq!(diagnostic.line, Some(5));
    assert_eq!(diagnostic.source_line.as_deref(), Some("[nowhere::Lib_Build]"));
}

#[test]
fn test_unknown_condition_keeps_always() {
    let parsed = parse("[[ci]]\nType=TeamCity\nUrl=https://ci\n\n[ci::Lib_Build]\nCondition=Nightly\nPath=*\n");
    assert_eq!(parsed.diagnostics.len(), 1);
    assert_eq!(parsed.diagnostics[0].kind, DiagnosticKind::Format);
    assert_eq!(parsed.descriptor.dependencies[0].condition, Condition::Always);
}

#[tokio::test]
async fn test_example_section_yields_single_job() {
    let text = "[[ServerA]]\nType=TeamCity\nUrl=https://a.example.com\n\n[ServerA::cfg1]\nPath=build/*.zip=>lib/\n";
    let parsed = parse(text);
    let server = MemoryServer::new()
        .with_project("P", "Product")
        .with_build_configuration("cfg1", "Build", "P")
        .with_artifacts("cfg1", ".lastSuccessful", ["build/x.zip", "build/y.txt"]);
    let registry = memory_registry(&parsed.descriptor.servers, vec![("ServerA", server)]);

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let resolution = resolve_jobs(&parsed.descriptor, &registry, &mut diagnostics).await;

    assert!(diagnostics.is_empty());
    assert_eq!(resolution.jobs.len(), 1);
    assert_eq!(resolution.jobs[0].source_path, "build/x.zip");
    assert_eq!(resolution.jobs[0].destination, "lib/x.zip");
}

#[tokio::test]
async fn test_transport_failure_is_isolated_to_its_server() {
    let text = "\
[[healthy]]
Type=TeamCity
Url=https://healthy

[[broken]]
Type=TeamCity
Url=https://broken

[broken::Lib_Build]
Path=*

[healthy::Lib_Build]
Path=build/*.zip
";
    let parsed = parse(text);
    let broken = memory_server().failing(Operation::GetBuildConfiguration);
    let healthy = memory_server();
    let registry =
        memory_registry(&parsed.descriptor.servers, vec![("healthy", healthy.clone()), ("broken", broken)]);

    let mut sink = TracingSink::new(Vec::<Diagnostic>::new());
    let resolution = resolve_jobs(&parsed.descriptor, &registry, &mut sink).await;
    let diagnostics = sink.into_inner();

    assert_eq!(resolution.entries.len(), 1);
    assert_eq!(resolution.entries[0].server.name, "healthy");
    assert_eq!(resolution.jobs.len(), 2);

    assert_eq!(error_count(&diagnostics), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::Transport);
    assert!(
        diagnostics
            .iter()
            .any(|d| d.severity == Severity::Verbose && d.message.contains("connection refused"))
    );
    assert_eq!(healthy.calls(Operation::ListArtifactFiles), 1);
}

#[tokio::test]
async fn test_unconfigured_teamcity_server_is_a_transport_error() {
    let parsed = parse("[[ci]]\nType=TeamCity\nUrl=https://ci\n\n[ci::Lib_Build]\nPath=*\n");
    let registry = ServerRegistry::from_servers(&parsed.descriptor.servers, Arc::new(DefaultConnectors));

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let entries = resolve(&parsed.descriptor, &registry, &mut diagnostics).await;
    assert!(entries.is_empty());
    assert_eq!(diagnostics[0].kind, DiagnosticKind::Transport);
    assert!(diagnostics[1].message.contains("no transport is configured"));
}

#[tokio::test]
async fn test_snapshot_server_end_to_end() {
    let env = TestEnvironment::with_basic_descriptor().unwrap();
    let parsed = artdeps::descriptor::load_file(&env.descriptor_path()).await.unwrap();
    let registry = ServerRegistry::from_servers(&parsed.descriptor.servers, Arc::new(DefaultConnectors));

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let resolution = resolve_jobs(&parsed.descriptor, &registry, &mut diagnostics).await;
    assert!(diagnostics.is_empty(), "{diagnostics:?}");

    let jobs: Vec<_> =
        resolution.jobs.iter().map(|j| (j.source_path.as_str(), j.destination.as_str(), j.condition)).collect();
    assert_eq!(
        jobs,
        vec![
            ("build/x.zip", "lib/x.zip", Condition::Always),
            ("build/z.zip", "lib/z.zip", Condition::Always),
            ("bin/tool.exe", "tools/tool.exe", Condition::Debug),
        ]
    );
    assert!(resolution.jobs[2].source_url.ends_with("/repository/download/Tools_Build/42/bin/tool.exe"));
}

#[tokio::test]
async fn test_import_from_snapshot() {
    let env = TestEnvironment::new().unwrap();
    let snapshot = SnapshotFixture::basic().write_to(env.temp_dir.path()).unwrap();
    let parsed = parse(&format!("[[ci]]\nType=Snapshot\nUrl={}\n", snapshot.display()));
    let registry = ServerRegistry::from_servers(&parsed.descriptor.servers, Arc::new(DefaultConnectors));

    let specs = artdeps::resolver::import_dependencies(&registry, "ci", "App_Build").await.unwrap();
    assert_eq!(specs.len(), 1);
    assert_eq!(specs[0].key(), DependencySpec::new("ci", "Lib_Build").key());
    assert_eq!(specs[0].revision.path_segment(), ".lastPinned");
    assert!(specs[0].clean_destination);
}
