//! Moves a project from one database provider to the other.
//!
//! The switch edits the schema declaration and `.env`, then clears the state
//! that only makes sense for the previous provider: the migration history and,
//! when moving to SQLite, the old database file. There is no cross-file
//! transaction. Steps run in a fixed order, each one is idempotent, and a
//! failure part-way returns [`Error::PartialSwitch`] naming what already
//! happened so the operator can finish or undo by hand.
//!
//! Must not run concurrently with itself or with a server using the same
//! project directory; no file locking is done.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::LazyLock;

use authgate_common::{Error, ProviderTag, Result, SwitchStep};
use regex::{NoExpand, Regex};
use tracing::{info, warn};

use crate::paths::ProjectPaths;
use crate::resolver::LOCATOR_VAR;

static PROVIDER_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"provider\s*=\s*"(sqlite|postgresql)""#).expect("provider pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaChange {
    Updated { from: ProviderTag },
    AlreadyCurrent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvChange {
    Created,
    Rewritten { preserved_lines: usize },
}

/// Progress notice emitted as each step finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepNotice {
    pub step: SwitchStep,
    pub message: String,
    /// Set when the step destroyed data the operator may care about.
    pub destructive: bool,
}

/// What a completed switch changed and what is left for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchReport {
    pub target: ProviderTag,
    pub schema: SchemaChange,
    pub env_file: EnvChange,
    pub migrations_removed: bool,
    pub database_removed: bool,
}

impl SwitchReport {
    /// Commands the operator still has to run; the switch never runs them.
    pub fn next_steps(&self) -> Vec<&'static str> {
        let mut steps = vec![
            "npx prisma generate",
            "npx prisma migrate dev --name init",
        ];
        if self.target == ProviderTag::RelationalNetwork {
            steps.push("make sure PostgreSQL is running and reachable (npm run db:up)");
        }
        steps
    }

    pub fn summary_lines(&self) -> Vec<String> {
        let schema = match self.schema {
            SchemaChange::Updated { from } => format!("updated ({from} -> {})", self.target),
            SchemaChange::AlreadyCurrent => format!("already {}", self.target),
        };
        let env = match self.env_file {
            EnvChange::Created => "created".to_string(),
            EnvChange::Rewritten { preserved_lines } => {
                format!("rewritten, {preserved_lines} other line(s) preserved")
            }
        };
        vec![
            format!("  Provider:   {} ({})", self.target, self.target.label()),
            format!("  Schema:     {schema}"),
            format!("  .env:       {env}"),
            format!("  Migrations: {}", removed_word(self.migrations_removed)),
            format!("  Database:   {}", removed_word(self.database_removed)),
        ]
    }
}

fn removed_word(removed: bool) -> &'static str {
    if removed { "removed" } else { "untouched" }
}

/// Parse `name` and switch to it. An unknown name fails before any file is read.
pub fn switch_by_name(paths: &ProjectPaths, name: &str) -> Result<SwitchReport> {
    let target = name.parse::<ProviderTag>()?;
    switch_to(paths, target)
}

pub fn switch_to(paths: &ProjectPaths, target: ProviderTag) -> Result<SwitchReport> {
    switch_to_with(paths, target, |_| {})
}

/// Run the switch, calling `on_step` after every step that completed.
pub fn switch_to_with<F>(
    paths: &ProjectPaths,
    target: ProviderTag,
    mut on_step: F,
) -> Result<SwitchReport>
where
    F: FnMut(&StepNotice),
{
    info!("switching database provider to {target}");
    let mut completed = Vec::with_capacity(4);

    // Nothing is written before the schema has been read and matched, so a
    // failure here leaves the project untouched.
    let schema = rewrite_schema(&paths.schema(), target)?;
    completed.push(SwitchStep::Schema);
    let message = match schema {
        SchemaChange::Updated { from } => format!("schema provider changed from {from} to {target}"),
        SchemaChange::AlreadyCurrent => format!("schema provider already {target}"),
    };
    notify(&mut on_step, SwitchStep::Schema, message, false);

    let env_file = rewrite_env_file(&paths.env_file(), target)
        .map_err(|e| partial(&completed, SwitchStep::Environment, e))?;
    completed.push(SwitchStep::Environment);
    notify(
        &mut on_step,
        SwitchStep::Environment,
        format!("{LOCATOR_VAR} set for {target} in .env"),
        false,
    );

    let migrations_removed = remove_migrations(&paths.migrations_dir())
        .map_err(|e| partial(&completed, SwitchStep::Migrations, e))?;
    completed.push(SwitchStep::Migrations);
    if migrations_removed {
        notify(
            &mut on_step,
            SwitchStep::Migrations,
            "removed migration history; migrations cannot be shared between providers".to_string(),
            true,
        );
    }

    let database_removed = if target == ProviderTag::EmbeddedFile {
        let removed = remove_embedded_database(paths)
            .map_err(|e| partial(&completed, SwitchStep::Database, e))?;
        if removed {
            notify(
                &mut on_step,
                SwitchStep::Database,
                "removed old SQLite database; the next migration creates a fresh one".to_string(),
                true,
            );
        }
        removed
    } else {
        false
    };

    info!("database provider switched to {target}");
    Ok(SwitchReport {
        target,
        schema,
        env_file,
        migrations_removed,
        database_removed,
    })
}

fn notify<F>(on_step: &mut F, step: SwitchStep, message: String, destructive: bool)
where
    F: FnMut(&StepNotice),
{
    if destructive {
        warn!("{step}: {message}");
    } else {
        info!("{step}: {message}");
    }
    on_step(&StepNotice {
        step,
        message,
        destructive,
    });
}

fn partial(completed: &[SwitchStep], failed: SwitchStep, source: io::Error) -> Error {
    Error::PartialSwitch {
        completed: completed.to_vec(),
        failed,
        source,
    }
}

fn rewrite_schema(path: &Path, target: ProviderTag) -> Result<SchemaChange> {
    let content = fs::read_to_string(path)?;

    let Some(captures) = PROVIDER_FIELD.captures(&content) else {
        return Err(Error::SchemaFormat(path.to_path_buf()));
    };
    let from = captures[1].parse::<ProviderTag>()?;

    let replacement = format!("provider = \"{}\"", target.as_str());
    let updated = PROVIDER_FIELD.replacen(&content, 1, NoExpand(&replacement));
    if updated == content {
        return Ok(SchemaChange::AlreadyCurrent);
    }

    fs::write(path, updated.as_bytes())?;
    Ok(SchemaChange::Updated { from })
}

fn rewrite_env_file(path: &Path, target: ProviderTag) -> io::Result<EnvChange> {
    let existing = match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(e),
    };

    let (content, preserved_lines) = compose_env(existing.as_deref(), target);
    fs::write(path, content)?;

    Ok(match existing {
        Some(_) => EnvChange::Rewritten { preserved_lines },
        None => EnvChange::Created,
    })
}

/// Build the new `.env`: the locator line first, then every other existing
/// line in its original order, byte for byte including its line ending.
/// Trailing blank lines are dropped so that repeated switches produce
/// identical files.
pub fn compose_env(existing: Option<&str>, target: ProviderTag) -> (String, usize) {
    let existing = existing.unwrap_or_default();
    let eol = if existing.contains("\r\n") { "\r\n" } else { "\n" };
    let mut out = format!("{LOCATOR_VAR}=\"{}\"{eol}", target.canonical_locator());

    let kept: Vec<&str> = existing
        .split_inclusive('\n')
        .filter(|line| !is_locator_line(line))
        .collect();
    let end = kept
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .map_or(0, |last| last + 1);

    for line in &kept[..end] {
        out.push_str(line);
        if !line.ends_with('\n') {
            out.push_str(eol);
        }
    }
    (out, end)
}

fn is_locator_line(line: &str) -> bool {
    let line = line.trim_start();
    let line = line
        .strip_prefix("export ")
        .map(str::trim_start)
        .unwrap_or(line);
    line.strip_prefix(LOCATOR_VAR)
        .is_some_and(|rest| rest.trim_start().starts_with('='))
}

fn remove_migrations(dir: &Path) -> io::Result<bool> {
    let mut entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if entries.next().is_none() {
        return Ok(false);
    }

    fs::remove_dir_all(dir)?;
    Ok(true)
}

fn remove_embedded_database(paths: &ProjectPaths) -> io::Result<bool> {
    let mut removed_db = false;
    for (i, file) in paths.embedded_database_files().iter().enumerate() {
        match fs::remove_file(file) {
            Ok(()) => removed_db |= i == 0,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }
    Ok(removed_db)
}
