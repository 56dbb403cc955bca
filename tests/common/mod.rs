#![allow(dead_code)]

use gemfile_rs::{ExtractOptions, Extraction, ParseError, extract_str};

pub fn extract_input(input: &str) -> Extraction {
    extract_str(input, &ExtractOptions::default()).expect("extract failed")
}

pub fn extract_strict(input: &str) -> Result<Extraction, ParseError> {
    extract_str(input, &ExtractOptions { strict: true })
}

/// Helper: record names in emission order.
pub fn dependency_names(extraction: &Extraction) -> Vec<&str> {
    extraction
        .dependencies
        .iter()
        .map(|record| record.name.as_str())
        .collect()
}
