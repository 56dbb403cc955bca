//! Property-based tests with proptest.
//!
//! The pipeline is a pure function of the input text, so the
//! properties worth machine-checking are the extraction invariants:
//! emission order tracks textual order regardless of nesting, group
//! names accumulate down the nesting path, repeated runs are
//! byte-identical, and no input can make the pipeline panic.

use gemfile_rs::{ExtractOptions, extract_str, to_json_pretty, tokenize};
use proptest::prelude::*;

// -- Leaf strategies --

/// Safe gem name: lowercase alpha start, then alphanumeric + _ -
fn gem_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,12}"
}

/// Version constraint in the common operator forms.
fn constraint() -> impl Strategy<Value = String> {
    (
        prop_oneof![
            Just("~> "),
            Just(">= "),
            Just("<= "),
            Just("> "),
            Just("< "),
            Just("= "),
            Just(""),
        ],
        0u8..20,
        0u8..20,
        0u8..20,
    )
        .prop_map(|(op, major, minor, patch)| format!("{op}{major}.{minor}.{patch}"))
}

/// Group name: plain lowercase identifier.
fn group_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}"
}

/// One manifest entry: a gem with an optional constraint, wrapped in
/// zero to three nested group blocks.
fn entry() -> impl Strategy<Value = (String, Option<String>, Vec<String>)> {
    (
        gem_name(),
        prop::option::of(constraint()),
        prop::collection::vec(group_name(), 0..=3),
    )
}

fn render_entry(name: &str, version: Option<&str>, groups: &[String], index: usize) -> String {
    let mut text = String::new();
    for group in groups {
        text.push_str(&format!("group :{group} do\n"));
    }
    // index suffix keeps names unique so order checks are exact
    match version {
        Some(v) => text.push_str(&format!("gem '{name}-{index}', '{v}'\n")),
        None => text.push_str(&format!("gem '{name}-{index}'\n")),
    }
    for _ in groups {
        text.push_str("end\n");
    }
    text
}

proptest! {
    // -- Order preservation --

    #[test]
    fn emission_order_matches_textual_order(
        entries in prop::collection::vec(entry(), 1..8)
    ) {
        let mut manifest = String::new();
        for (index, (name, version, groups)) in entries.iter().enumerate() {
            manifest.push_str(&render_entry(name, version.as_deref(), groups, index));
        }

        let extraction = extract_str(&manifest, &ExtractOptions::default())
            .expect("generated manifest should extract");

        let expected: Vec<String> = entries
            .iter()
            .enumerate()
            .map(|(index, (name, _, _))| format!("{name}-{index}"))
            .collect();
        let actual: Vec<String> = extraction
            .dependencies
            .iter()
            .map(|record| record.name.clone())
            .collect();
        prop_assert_eq!(actual, expected);
        prop_assert!(extraction.warnings.is_empty());
    }

    // -- Group accumulation --

    #[test]
    fn groups_accumulate_down_the_nesting_path(
        name in gem_name(),
        groups in prop::collection::vec(group_name(), 1..5)
    ) {
        let manifest = render_entry(&name, None, &groups, 0);
        let extraction = extract_str(&manifest, &ExtractOptions::default())
            .expect("generated manifest should extract");

        // expected: nesting path order, first occurrence wins
        let mut expected: Vec<String> = Vec::new();
        for group in &groups {
            if !expected.contains(group) {
                expected.push(group.clone());
            }
        }

        prop_assert_eq!(&extraction.dependencies[0].groups, &expected);
    }

    #[test]
    fn constraints_survive_verbatim(
        name in gem_name(),
        version in constraint()
    ) {
        let manifest = format!("gem '{name}', '{version}'\n");
        let extraction = extract_str(&manifest, &ExtractOptions::default())
            .expect("generated manifest should extract");
        prop_assert_eq!(&extraction.dependencies[0].requirement, &vec![version]);
    }

    // -- Determinism --

    #[test]
    fn repeated_runs_are_byte_identical(
        entries in prop::collection::vec(entry(), 0..6)
    ) {
        let mut manifest = String::new();
        for (index, (name, version, groups)) in entries.iter().enumerate() {
            manifest.push_str(&render_entry(name, version.as_deref(), groups, index));
        }

        let first = to_json_pretty(
            &extract_str(&manifest, &ExtractOptions::default()).expect("extract"),
        )
        .expect("serialize");
        let second = to_json_pretty(
            &extract_str(&manifest, &ExtractOptions::default()).expect("extract"),
        )
        .expect("serialize");
        prop_assert_eq!(first, second);
    }

    // -- Totality --

    #[test]
    fn lexing_never_fails(input in "\\PC*") {
        let tokens = tokenize(&input);
        prop_assert!(tokens.iter().all(|t| t.span.line >= 1 && t.span.column >= 1));
    }

    #[test]
    fn pipeline_never_panics(input in "\\PC*") {
        // Extraction may reject the input, but must not panic.
        let _ = extract_str(&input, &ExtractOptions::default());
        let _ = extract_str(&input, &ExtractOptions { strict: true });
    }
}
