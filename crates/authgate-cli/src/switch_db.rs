use anyhow::{Context, Result};
use authgate_common::{Error, ProviderTag};
use authgate_config::ProjectPaths;
use authgate_config::switcher::{StepNotice, SwitchReport, switch_to_with};
use colored::Colorize;

/// Outcome the caller turns into an exit code.
pub enum SwitchOutcome {
    Switched(SwitchReport),
    Usage,
}

pub fn usage() -> String {
    let names: Vec<&str> = ProviderTag::ALL.iter().map(ProviderTag::as_str).collect();
    format!(
        "usage: authgate switch-db <provider>\n  <provider> is one of: {}",
        names.join(", ")
    )
}

/// Run `switch-db`, printing one line per completed step.
///
/// A missing or unknown provider returns [`SwitchOutcome::Usage`] without
/// touching any file.
pub fn run(paths: &ProjectPaths, provider: Option<&str>) -> Result<SwitchOutcome> {
    let Some(provider) = provider else {
        eprintln!("{} no provider given", "error:".red().bold());
        eprintln!("{}", usage());
        return Ok(SwitchOutcome::Usage);
    };

    let target = match provider.parse::<ProviderTag>() {
        Ok(target) => target,
        Err(e @ Error::InvalidProvider(_)) => {
            eprintln!("{} {e}", "error:".red().bold());
            eprintln!("{}", usage());
            return Ok(SwitchOutcome::Usage);
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "Switching database provider to {} in {}",
        target.as_str().bold(),
        paths.root().display()
    );

    let report = switch_to_with(paths, target, print_notice).with_context(|| {
        format!(
            "provider switch to {target} did not finish; the lines above show what was already changed"
        )
    })?;

    print_summary(&report);
    Ok(SwitchOutcome::Switched(report))
}

fn print_notice(notice: &StepNotice) {
    if notice.destructive {
        println!("  {} {}", "!".yellow().bold(), notice.message);
    } else {
        println!("  {} {}", "✓".green().bold(), notice.message);
    }
}

fn print_summary(report: &SwitchReport) {
    println!();
    println!("Provider Switch Report");
    println!("──────────────────────");
    for line in report.summary_lines() {
        println!("{line}");
    }

    println!();
    println!("Next steps:");
    for (i, step) in report.next_steps().iter().enumerate() {
        println!("  {}. {step}", i + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn project() -> (tempfile::TempDir, ProjectPaths) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let paths = ProjectPaths::new(dir.path());
        fs::create_dir_all(paths.schema_dir()).unwrap();
        fs::write(
            paths.schema(),
            "datasource db {\n  provider = \"postgresql\"\n  url = env(\"DATABASE_URL\")\n}\n",
        )
        .unwrap();
        (dir, paths)
    }

    #[test]
    fn missing_provider_is_a_usage_error() {
        let (_dir, paths) = project();
        let outcome = run(&paths, None).unwrap();
        assert!(matches!(outcome, SwitchOutcome::Usage));
        assert!(!paths.env_file().exists());
    }

    #[test]
    fn unknown_provider_is_a_usage_error_without_changes() {
        let (_dir, paths) = project();
        let before = fs::read_to_string(paths.schema()).unwrap();

        let outcome = run(&paths, Some("mysql")).unwrap();

        assert!(matches!(outcome, SwitchOutcome::Usage));
        assert_eq!(fs::read_to_string(paths.schema()).unwrap(), before);
        assert!(!paths.env_file().exists());
    }

    #[test]
    fn valid_provider_switches() {
        let (_dir, paths) = project();
        let outcome = run(&paths, Some("sqlite")).unwrap();

        let SwitchOutcome::Switched(report) = outcome else {
            panic!("expected a completed switch");
        };
        assert_eq!(report.target, ProviderTag::EmbeddedFile);
        assert!(
            fs::read_to_string(paths.env_file())
                .unwrap()
                .starts_with("DATABASE_URL=\"file:./dev.db\"")
        );
    }

    #[test]
    fn switch_failure_is_an_error() {
        let (_dir, paths) = project();
        fs::write(paths.schema(), "no datasource here\n").unwrap();
        assert!(run(&paths, Some("postgresql")).is_err());
    }

    #[test]
    fn usage_lists_both_providers() {
        let text = usage();
        assert!(text.contains("sqlite"));
        assert!(text.contains("postgresql"));
    }
}
