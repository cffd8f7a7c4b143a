//! Validation engine for organization policy files.
//!
//! A run goes through four steps:
//! 1. Discovery: every `*.yml|*.yaml` regular file under `<workspace>/policies`.
//! 2. Parse: each candidate becomes a `PolicyEntry`, either `Valid` with the
//!    parsed YAML document or `Invalid` with a single parse-error issue.
//! 3. Rule passes over the complete entry list: duplicate ids, then required
//!    keys, then regrouping of issues so errors precede warnings.
//! 4. `summarize` derives counts from the final issue lists.
//!
//! The engine only produces facts; pass/fail is decided by `report`.

use crate::error::ValidateError;
use crate::models::policy::{Mode, CANDIDATE_EXTENSIONS, ID_KEY, REQUIRED_KEYS};
use crate::models::{CountSummary, Issue, IssueKind, ParsedEntry, PolicyEntry, Status};
use glob::glob;
use rayon::prelude::*;
use serde_yaml::Value as Yaml;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Final state of a validation run.
pub struct Validation {
    pub mode: Mode,
    pub root: PathBuf,
    pub entries: Vec<PolicyEntry>,
}

impl Validation {
    /// Counts computed fresh from the current entries.
    pub fn summary(&self) -> CountSummary {
        summarize(&self.entries)
    }
}

/// Validate the policies of `workspace` under the given mode string.
///
/// Fails with `InvalidMode` before touching the filesystem when `mode` is not
/// supported, and with `MissingRoot` when the discovery root is not a
/// directory. Malformed files never fail the run.
pub fn validate(mode: &str, workspace: &Path) -> Result<Validation, ValidateError> {
    let mode: Mode = mode.parse()?;
    let root = workspace.join(mode.policies_dir());
    if !root.is_dir() {
        return Err(ValidateError::MissingRoot(root));
    }
    let entries = discover_and_parse(workspace, &root);
    Ok(Validation {
        mode,
        root,
        entries: validate_entries(entries),
    })
}

/// Run all rule passes over a fully parsed entry list.
pub fn validate_entries(entries: Vec<PolicyEntry>) -> Vec<PolicyEntry> {
    check_duplicate_identifiers(entries)
        .into_iter()
        .map(check_required_keys)
        .map(group_issues_by_status)
        .collect()
}

/// List candidate files under `root`, sorted by path.
pub fn discover_candidates(root: &Path) -> Vec<PathBuf> {
    let base = glob::Pattern::escape(&root.to_string_lossy());
    let mut targets: Vec<PathBuf> = Vec::new();
    for ext in CANDIDATE_EXTENSIONS {
        let pattern = Path::new(&base)
            .join("**")
            .join(format!("*.{}", ext))
            .to_string_lossy()
            .to_string();
        let paths = match glob(&pattern) {
            Ok(paths) => paths,
            Err(_) => continue,
        };
        for entry in paths.flatten() {
            if entry.is_file() && is_candidate(&entry) {
                targets.push(entry);
            }
        }
    }
    targets.sort();
    targets.dedup();
    targets
}

fn is_candidate(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| CANDIDATE_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

/// Discover and parse every candidate under `root`.
///
/// Entry files are named relative to `workspace`. Parsing runs in parallel;
/// the returned list keeps discovery order.
pub fn discover_and_parse(workspace: &Path, root: &Path) -> Vec<PolicyEntry> {
    discover_candidates(root)
        .par_iter()
        .map(|path| {
            let file = display_path(path, workspace);
            match fs::read_to_string(path) {
                Ok(content) => parse_source(file, &content),
                Err(e) => invalid_entry(file, &e.to_string()),
            }
        })
        .collect()
}

fn display_path(path: &Path, workspace: &Path) -> String {
    let rel = match path.strip_prefix(workspace) {
        Ok(p) => p.to_path_buf(),
        Err(_) => pathdiff::diff_paths(path, workspace).unwrap_or_else(|| path.to_path_buf()),
    };
    rel.to_string_lossy().to_string()
}

/// Parse one file's contents into an entry with no content issues yet.
pub fn parse_source(file: String, content: &str) -> PolicyEntry {
    if content.trim().is_empty() {
        return PolicyEntry {
            file,
            document: ParsedEntry::Valid(Yaml::Null),
            issues: Vec::new(),
        };
    }
    // `<<` merge keys are resolved before any rule looks at the document
    let parsed = serde_yaml::from_str::<Yaml>(content).and_then(|mut doc| {
        doc.apply_merge()?;
        Ok(doc)
    });
    match parsed {
        Ok(doc) => PolicyEntry {
            file,
            document: ParsedEntry::Valid(doc),
            issues: Vec::new(),
        },
        Err(e) => invalid_entry(file, &e.to_string()),
    }
}

fn invalid_entry(file: String, cause: &str) -> PolicyEntry {
    PolicyEntry {
        file,
        document: ParsedEntry::Invalid(cause.to_string()),
        issues: vec![Issue::parse_error(cause)],
    }
}

/// Flag every parsed entry whose `id` is shared with another parsed entry.
pub fn check_duplicate_identifiers(mut entries: Vec<PolicyEntry>) -> Vec<PolicyEntry> {
    let keys: Vec<Option<String>> = entries
        .iter()
        .map(|e| e.document().and_then(|d| d.get(ID_KEY)).and_then(id_key))
        .collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for key in keys.iter().flatten() {
        *counts.entry(key.as_str()).or_insert(0) += 1;
    }
    for (entry, key) in entries.iter_mut().zip(keys.iter()) {
        if let Some(id) = key {
            if counts.get(id.as_str()).copied().unwrap_or(0) > 1 {
                entry.issues.push(Issue::duplicate_id(id));
            }
        }
    }
    entries
}

/// Grouping key for an `id` value. Missing and null ids don't group.
fn id_key(value: &Yaml) -> Option<String> {
    match value {
        Yaml::Null => None,
        Yaml::String(s) => Some(s.clone()),
        Yaml::Bool(b) => Some(b.to_string()),
        Yaml::Number(n) => Some(n.to_string()),
        other => serde_yaml::to_string(other)
            .ok()
            .map(|s| s.trim_end().to_string()),
    }
}

/// Append one issue per required key that is missing or falsy.
pub fn check_required_keys(mut entry: PolicyEntry) -> PolicyEntry {
    let missing: Vec<&'static str> = match entry.document() {
        Some(doc) => REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| !doc.get(*key).map(is_truthy).unwrap_or(false))
            .collect(),
        None => Vec::new(),
    };
    entry
        .issues
        .extend(missing.into_iter().map(Issue::missing_key));
    entry
}

/// Null, false, zero, NaN and the empty string count as absent.
fn is_truthy(value: &Yaml) -> bool {
    match value {
        Yaml::Null => false,
        Yaml::Bool(b) => *b,
        Yaml::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Yaml::String(s) => !s.is_empty(),
        Yaml::Sequence(_) | Yaml::Mapping(_) => true,
        Yaml::Tagged(t) => is_truthy(&t.value),
    }
}

/// Stable partition of an entry's issues: errors first, then warnings.
pub fn group_issues_by_status(mut entry: PolicyEntry) -> PolicyEntry {
    let (mut errors, warnings): (Vec<Issue>, Vec<Issue>) = entry
        .issues
        .into_iter()
        .partition(|i| i.status == Status::Error);
    errors.extend(warnings);
    entry.issues = errors;
    entry
}

/// Derive counts from the entries' current issue lists.
pub fn summarize(entries: &[PolicyEntry]) -> CountSummary {
    let mut summary = CountSummary {
        total: entries.len(),
        ..CountSummary::default()
    };
    for entry in entries {
        if entry.is_invalid() {
            summary.invalid += 1;
            continue;
        }
        if !entry.issues.is_empty() {
            summary.problem_policy += 1;
        }
        for issue in entry.issues.iter().filter(|i| i.kind != IssueKind::Parse) {
            match issue.status {
                Status::Error => summary.error += 1,
                Status::Warning => summary.warning += 1,
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, content).unwrap();
    }

    fn parsed(sources: &[(&str, &str)]) -> Vec<PolicyEntry> {
        let entries = sources
            .iter()
            .map(|(f, c)| parse_source(f.to_string(), c))
            .collect();
        validate_entries(entries)
    }

    fn messages(entry: &PolicyEntry) -> Vec<&str> {
        entry.issues.iter().map(|i| i.message.as_str()).collect()
    }

    #[test]
    fn test_valid_files_produce_clean_summary() {
        let entries = parsed(&[
            ("a.yaml", "{ id: foo, name: fooName, for: repositories }"),
            ("b.yml", "id: bar\nname: barName\nfor: repositories\nextra: 1\n"),
        ]);
        let s = summarize(&entries);
        assert_eq!(
            s,
            CountSummary {
                total: 2,
                invalid: 0,
                problem_policy: 0,
                error: 0,
                warning: 0
            }
        );
        assert!(entries.iter().all(|e| e.issues.is_empty()));
    }

    #[test]
    fn test_invalid_yaml_counts_only_as_invalid() {
        let entries = parsed(&[("foo.yaml", "iditor: ies:")]);
        assert_eq!(entries[0].issues.len(), 1);
        assert!(entries[0].issues[0].message.starts_with("YAML parse error:"));
        assert_eq!(entries[0].issues[0].status, Status::Error);
        assert!(entries[0].document().is_none());
        let s = summarize(&entries);
        assert_eq!(s.total, 1);
        assert_eq!(s.invalid, 1);
        assert_eq!(s.problem_policy, 0);
        assert_eq!(s.error, 0);
        assert_eq!(s.warning, 0);
    }

    #[test]
    fn test_parse_error_message_carries_parser_text() {
        let cause = serde_yaml::from_str::<Yaml>("a: [1, 2").unwrap_err().to_string();
        let entry = parse_source("x.yaml".into(), "a: [1, 2");
        assert_eq!(entry.document, ParsedEntry::Invalid(cause.clone()));
        assert_eq!(messages(&entry), vec![format!("YAML parse error: {}", cause)]);
    }

    #[test]
    fn test_missing_keys_in_fixed_order() {
        let one = parsed(&[("foo.yaml", "{ id: foo, for: repositories }")]);
        assert_eq!(messages(&one[0]), vec!["Policy missing 'name' clause"]);
        let s = summarize(&one);
        assert_eq!((s.problem_policy, s.error), (1, 1));

        let two = parsed(&[("foo.yaml", "{ for: repositories }")]);
        assert_eq!(
            messages(&two[0]),
            vec!["Policy missing 'id' clause", "Policy missing 'name' clause"]
        );
        let s = summarize(&two);
        assert_eq!((s.problem_policy, s.error), (1, 2));

        let three = parsed(&[("foo.yaml", "other: value")]);
        assert_eq!(
            messages(&three[0]),
            vec![
                "Policy missing 'for' clause",
                "Policy missing 'id' clause",
                "Policy missing 'name' clause"
            ]
        );
        assert_eq!(summarize(&three).error, 3);
    }

    #[test]
    fn test_falsy_values_count_as_missing() {
        let entries = parsed(&[
            ("a.yaml", "for: ''\nid: a\nname: n"),
            ("b.yaml", "for: ~\nid: b\nname: n"),
            ("c.yaml", "for: 0\nid: c\nname: n"),
            ("d.yaml", "for: false\nid: d\nname: n"),
            ("e.yaml", "for: .nan\nid: e\nname: n"),
            ("f.yaml", "for: []\nid: f\nname: n"),
            ("g.yaml", "for: true\nid: g\nname: 0.5"),
        ]);
        for e in &entries[..5] {
            assert_eq!(messages(e), vec!["Policy missing 'for' clause"], "{}", e.file);
        }
        assert!(entries[5].issues.is_empty());
        assert!(entries[6].issues.is_empty());
    }

    #[test]
    fn test_merge_keys_supply_required_clauses() {
        let entries = parsed(&[
            ("a.yaml", "base: &b\n  for: repositories\n<<: *b\nid: a\nname: n\n"),
            ("b.yaml", "defaults: &d\n  for: teams\n  name: shared\n<<: [*d]\nid: b\n"),
        ]);
        assert!(entries[0].issues.is_empty());
        assert!(entries[1].issues.is_empty());
        let doc = entries[1].document().unwrap();
        assert_eq!(doc.get("name").and_then(Yaml::as_str), Some("shared"));
    }

    #[test]
    fn test_bad_merge_value_is_a_parse_error() {
        let entries = parsed(&[("a.yaml", "<<: just-a-string\nid: a\nname: n\nfor: r\n")]);
        assert!(entries[0].is_invalid());
        assert!(entries[0].issues[0].message.starts_with("YAML parse error: "));
        assert_eq!(summarize(&entries).invalid, 1);
    }

    #[test]
    fn test_non_mapping_and_empty_documents_lack_every_key() {
        let entries = parsed(&[("list.yaml", "- a\n- b\n"), ("empty.yaml", "  \n")]);
        for e in &entries {
            assert!(e.document().is_some());
            assert_eq!(e.issues.len(), 3);
        }
        let s = summarize(&entries);
        assert_eq!((s.invalid, s.problem_policy, s.error), (0, 2, 6));
    }

    #[test]
    fn test_duplicate_ids_flag_every_member() {
        let entries = parsed(&[
            ("a.yaml", "{ id: same, name: a, for: repositories }"),
            ("b.yaml", "{ id: same, name: b, for: repositories }"),
            ("c.yaml", "{ id: same, name: c, for: repositories }"),
            ("d.yaml", "{ id: other, name: d, for: repositories }"),
        ]);
        for e in &entries[..3] {
            assert_eq!(messages(e), vec!["Policy has duplicate id: same"]);
        }
        assert!(entries[3].issues.is_empty());
        let s = summarize(&entries);
        assert_eq!((s.problem_policy, s.error), (3, 3));
    }

    #[test]
    fn test_invalid_and_idless_entries_do_not_group() {
        let entries = parsed(&[
            ("a.yaml", "{ id: x, name: a, for: r }"),
            ("b.yaml", "id: x\nname: [unclosed"),
            ("c.yaml", "{ name: c, for: r }"),
            ("d.yaml", "{ name: d, for: r }"),
        ]);
        assert!(entries[0].issues.is_empty());
        assert!(entries[1].is_invalid());
        assert_eq!(messages(&entries[2]), vec!["Policy missing 'id' clause"]);
        assert_eq!(messages(&entries[3]), vec!["Policy missing 'id' clause"]);
    }

    #[test]
    fn test_scalar_ids_compare_by_text() {
        let entries = parsed(&[
            ("a.yaml", "{ id: 1, name: a, for: r }"),
            ("b.yaml", "{ id: '1', name: b, for: r }"),
        ]);
        assert_eq!(messages(&entries[0]), vec!["Policy has duplicate id: 1"]);
        assert_eq!(messages(&entries[1]), vec!["Policy has duplicate id: 1"]);
    }

    #[test]
    fn test_group_issues_by_status_is_stable() {
        let warn = |m: &str| Issue {
            status: Status::Warning,
            kind: IssueKind::MissingKey,
            message: m.to_string(),
        };
        let entry = PolicyEntry {
            file: "x.yaml".into(),
            document: ParsedEntry::Valid(Yaml::Null),
            issues: vec![
                warn("w1"),
                Issue::missing_key("for"),
                warn("w2"),
                Issue::duplicate_id("x"),
            ],
        };
        let grouped = group_issues_by_status(entry);
        assert_eq!(
            messages(&grouped),
            vec![
                "Policy missing 'for' clause",
                "Policy has duplicate id: x",
                "w1",
                "w2"
            ]
        );
        let s = summarize(&[grouped]);
        assert_eq!((s.error, s.warning, s.problem_policy), (2, 2, 1));
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let entries = parsed(&[
            ("a.yaml", "{ id: a, for: r }"),
            ("b.yaml", "::: nope: :"),
        ]);
        assert_eq!(summarize(&entries), summarize(&entries));
    }

    #[test]
    fn test_validate_rejects_unknown_mode_without_touching_disk() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        match validate("repo", &missing) {
            Err(ValidateError::InvalidMode(m)) => assert_eq!(m, "repo"),
            _ => panic!("expected InvalidMode"),
        }
    }

    #[test]
    fn test_validate_requires_policies_dir() {
        let dir = tempdir().unwrap();
        match validate("org", dir.path()) {
            Err(ValidateError::MissingRoot(p)) => assert_eq!(p, dir.path().join("policies")),
            _ => panic!("expected MissingRoot"),
        }
    }

    #[test]
    fn test_discovery_filters_extensions_and_recurses() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "policies/b.yaml", "{ id: b, name: b, for: r }");
        write(root, "policies/a.yml", "{ id: a, name: a, for: r }");
        write(root, "policies/nested/deep/c.yaml", "{ id: c, name: c, for: r }");
        write(root, "policies/readme.md", "# not a policy");
        write(root, "policies/upper.YAML", "{ id: u }");
        write(root, "policies/notes.yaml.bak", "x");
        write(root, "outside.yaml", "{ id: o }");
        fs::create_dir_all(root.join("policies/dir.yaml")).unwrap();

        let found = discover_candidates(&root.join("policies"));
        let rel: Vec<String> = found
            .iter()
            .map(|p| display_path(p, root))
            .collect();
        assert_eq!(
            rel,
            vec![
                Path::new("policies/a.yml").to_string_lossy().to_string(),
                Path::new("policies/b.yaml").to_string_lossy().to_string(),
                Path::new("policies/nested/deep/c.yaml")
                    .to_string_lossy()
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_validate_end_to_end_duplicates_and_missing_keys() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "policies/foo.yaml", "{ id: foo, name: fooName, for: repositories }");
        write(root, "policies/bar.yaml", "{ id: bar, for: repositories }");
        write(root, "policies/test/bar.yaml", "{ id: bar, name: barName, for: repositories }");

        let v = validate("org", root).unwrap();
        assert_eq!(v.mode, Mode::Org);
        let s = v.summary();
        assert_eq!(s.total, 3);
        assert_eq!(s.invalid, 0);
        assert_eq!(s.problem_policy, 2);
        assert_eq!(s.warning, 0);
        assert_eq!(s.error, 3);

        let bar = &v.entries[0];
        assert_eq!(bar.file, Path::new("policies/bar.yaml").to_string_lossy());
        assert_eq!(
            messages(bar),
            vec!["Policy has duplicate id: bar", "Policy missing 'name' clause"]
        );
        assert!(v.entries[1].issues.is_empty());
        assert_eq!(messages(&v.entries[2]), vec!["Policy has duplicate id: bar"]);
    }

    #[test]
    fn test_unreadable_content_becomes_invalid_entry() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("policies")).unwrap();
        fs::write(root.join("policies/bin.yaml"), [0xff, 0xfe, 0x00]).unwrap();
        let v = validate("org", root).unwrap();
        assert_eq!(v.summary().invalid, 1);
        assert!(v.entries[0].issues[0].message.starts_with("YAML parse error: "));
    }
}
