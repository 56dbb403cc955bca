//! CLI tool to extract dependency manifests from Gemfiles.

use std::fs;
use std::process::ExitCode;

use gemfile_rs::ExtractOptions;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        eprintln!("Usage: gemfile <command> [--strict] [files...]");
        eprintln!();
        eprintln!("Commands:");
        eprintln!("  extract   Extract dependency records and print them as JSON");
        eprintln!("  validate  Check that Gemfile(s) parse and report a summary");
        eprintln!();
        eprintln!("Options:");
        eprintln!("  --strict  Treat unsupported constructs as fatal errors");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  gemfile extract Gemfile");
        eprintln!("  gemfile extract --strict Gemfile");
        eprintln!("  gemfile validate Gemfile");
        return ExitCode::from(2);
    }

    let command = args[1].as_str();
    let strict = args[2..].iter().any(|arg| arg == "--strict");
    let files: Vec<&String> = args[2..].iter().filter(|arg| *arg != "--strict").collect();

    if files.is_empty() {
        eprintln!("Error: no files specified");
        return ExitCode::from(2);
    }

    let options = ExtractOptions { strict };
    let mut had_error = false;

    for path in files {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{path}: {e}");
                had_error = true;
                continue;
            }
        };

        match command {
            "extract" => match gemfile_rs::extract_str(&content, &options) {
                Ok(extraction) => match gemfile_rs::to_json_pretty(&extraction) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("{path}: {e}");
                        had_error = true;
                    }
                },
                Err(e) => {
                    eprintln!("{path}: {e}");
                    had_error = true;
                }
            },
            "validate" => match gemfile_rs::extract_str(&content, &options) {
                Ok(extraction) => {
                    let dependencies = extraction.dependencies.len();
                    let warnings = extraction.warnings.len();
                    let ruby = extraction
                        .ruby_version
                        .as_ref()
                        .map_or(String::new(), |v| format!(", ruby {v}"));
                    eprintln!(
                        "{path}: valid ({dependencies} dependencies, \
                         {warnings} warning(s){ruby})"
                    );
                }
                Err(e) => {
                    eprintln!("{path}: {e}");
                    had_error = true;
                }
            },
            _ => {
                eprintln!("Unknown command: {command}");
                return ExitCode::from(2);
            }
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
