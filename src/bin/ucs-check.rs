//! Validate `.ucs` files from the command line.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use ucs_language_server::lsp::server::init_logging;
use ucs_language_server::settings::{load_settings_file, Settings};
use ucs_language_server::{validate_document, Diagnostic, ValidationSettings};

#[derive(Debug, Parser)]
#[command(name = "ucs-check")]
#[command(about = "Check UCS localization string files")]
#[command(version)]
struct Args {
    /// Files to check
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Settings TOML file providing the diagnostic toggles
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, help = "Do not warn about empty lines")]
    no_empty_line_warning: bool,

    #[arg(long, help = "Do not warn about empty messages")]
    no_empty_message_warning: bool,

    #[arg(long, help = "Do not warn about duplicate messages")]
    no_duplicate_message_warning: bool,

    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    fn validation_settings(&self) -> Result<ValidationSettings> {
        let mut settings = Settings::default();
        if let Some(path) = &self.config {
            let file = load_settings_file(path)?
                .with_context(|| format!("settings file {} not found", path.display()))?;
            file.apply_to(&mut settings);
        }

        let mut validation = settings.validation;
        if self.no_empty_line_warning {
            validation.empty_line_warning = false;
        }
        if self.no_empty_message_warning {
            validation.empty_message_warning = false;
        }
        if self.no_duplicate_message_warning {
            validation.duplicate_message_warning = false;
        }
        Ok(validation)
    }
}

fn print_diagnostic(path: &Path, diagnostic: &Diagnostic) {
    println!(
        "{}:{}:{}: {}: {}",
        path.display(),
        diagnostic.span.line + 1,
        diagnostic.span.start + 1,
        diagnostic.severity,
        diagnostic.message
    );
    for related in &diagnostic.related {
        println!(
            "{}:{}:{}: note: {}",
            path.display(),
            related.span.line + 1,
            related.span.start + 1,
            related.message
        );
    }
}

fn check_file(path: &Path, settings: &ValidationSettings) -> Result<usize> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let result = validate_document(&content, settings);
    for diagnostic in &result.diagnostics {
        print_diagnostic(path, diagnostic);
    }
    log::info!(
        "{}: {} errors, {} warnings",
        path.display(),
        result.error_count(),
        result.warning_count()
    );

    Ok(result.error_count())
}

fn run(args: &Args) -> Result<bool> {
    let settings = args.validation_settings()?;

    let mut errors = 0;
    for path in &args.files {
        errors += check_file(path, &settings)?;
    }

    Ok(errors == 0)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ucs_language_server::Severity;

    #[test]
    fn test_flags_disable_warnings() {
        let args = Args::parse_from([
            "ucs-check",
            "--no-empty-line-warning",
            "--no-duplicate-message-warning",
            "strings.ucs",
        ]);
        let settings = args.validation_settings().unwrap();
        assert!(!settings.empty_line_warning);
        assert!(settings.empty_message_warning);
        assert!(!settings.duplicate_message_warning);
    }

    #[test]
    fn test_severity_label() {
        assert_eq!(Severity::Error.to_string(), "error");
    }
}
