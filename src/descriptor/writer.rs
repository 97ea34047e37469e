//! Descriptor serialization.
//!
//! Output order: header comment, server blocks, dependency sections, each
//! followed by a blank line. `Path` is always the last key of a section and
//! blank lines inside the rules are dropped, so the blank-line terminator
//! stays unambiguous when the text is read back.

use crate::descriptor::DependencySpec;
use crate::resolver::DependencyEntry;
use crate::server::Server;
use std::fmt::Write;

const HEADER: &str = "\
# Artifact dependencies.
#
# [[server]] blocks declare build servers (Type, Url).
# [server::buildConfigId] sections declare dependencies on their artifacts.
# Path rules: [@Condition:]pattern[=>destination], one per line, ended by a blank line.
";

/// Serializes servers and resolved entries; `Name` carries the build configuration name.
pub fn save(servers: &[Server], entries: &[DependencyEntry]) -> String {
    let mut out = begin(servers);
    for entry in entries {
        write_section(&mut out, &entry.to_spec(), Some(&entry.build_configuration.name));
    }
    out
}

/// Serializes servers and unresolved sections; `Name` is omitted.
pub fn save_specs(servers: &[Server], specs: &[DependencySpec]) -> String {
    let mut out = begin(servers);
    for spec in specs {
        write_section(&mut out, spec, None);
    }
    out
}

fn begin(servers: &[Server]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for server in servers {
        // Writing into a String cannot fail.
        let _ = write!(out, "[[{}]]\nType={}\nUrl={}\n\n", server.name, server.server_type, server.url);
    }
    out
}

fn write_section(out: &mut String, spec: &DependencySpec, name: Option<&str>) {
    let _ = writeln!(out, "[{}]", spec.key());
    if let Some(name) = name {
        let _ = writeln!(out, "Name={name}");
    }
    let _ = writeln!(out, "RevisionName={}", spec.revision.name);
    let _ = writeln!(out, "RevisionValue={}", spec.revision.value);
    let _ = writeln!(out, "Condition={}", spec.condition);
    let _ = writeln!(out, "CleanDestination={}", spec.clean_destination);
    let rules: Vec<&str> = spec.path_rules.lines().filter(|l| !l.trim().is_empty()).collect();
    let _ = writeln!(out, "Path={}", rules.join("\n"));
    out.push('\n');
}
