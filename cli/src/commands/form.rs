//! Form definition commands
//!
//! `fill` is a headless user renderer: values given on the command line go
//! through the same session a rendered form uses, so validation, output
//! assembly and submit behave identically.

use crate::{config::Config, output::OutputFormat, FormCommands};
use colored::Colorize;
use formkit_client::form_source::FORM_CONFIG_ENV;
use formkit_client::{FormLocation, SubmissionClient};
use formkit_core::editor::split_comma_list;
use formkit_core::{ExportFormat, FieldKind, FieldValue, FormDocument, FormSession, NoticeKind, Severity};
use std::time::Instant;
use tabled::Tabled;
use tracing::debug;

#[derive(Tabled)]
struct FindingRow {
    severity: String,
    field: String,
    finding: String,
}

pub async fn handle(
    action: FormCommands,
    client: &SubmissionClient,
    config: &Config,
    format: OutputFormat,
) -> Result<(), String> {
    match action {
        FormCommands::Check { file } => {
            let document = load(file.as_deref(), client, config).await?;
            check(&document, format)
        }
        FormCommands::Export { file, with_groups } => {
            let document = load(file.as_deref(), client, config).await?;
            let export = if with_groups { ExportFormat::WithGroups } else { ExportFormat::FieldsOnly };
            let json = document.to_json(export).map_err(|e| e.to_string())?;
            println!("{}", json);
            Ok(())
        }
        FormCommands::Fill { file, sets, checks, submit, edit } => {
            let document = load(file.as_deref(), client, config).await?;
            let mut session = FormSession::new(document);

            if let Some(id) = edit {
                let submission = client.get(id).await.map_err(|e| e.to_string())?;
                for label in session.load_submission(&submission) {
                    eprintln!("{} {}", "warning:".yellow(), unloaded_entry(&label));
                }
            }

            apply_assignments(&mut session, &sets, &checks)?;

            if session.has_errors() {
                for (id, error) in session.errors() {
                    let label = session.document().field(id).map(|f| f.label()).unwrap_or(id);
                    eprintln!("{} {}: {}", "invalid".red(), label, error);
                }
                return Err(format!("{} field(s) failed validation", session.errors().len()));
            }

            if !submit {
                format.print(&session.assemble_output());
                return Ok(());
            }

            let request = session.begin_submit().map_err(|e| e.to_string())?;
            debug!(mode = ?session.mode(), fields = request.form_data().len(), "submitting form");
            let outcome = client.execute(&request).await;
            let failed = outcome.is_err();
            session.finish_submit(outcome, Instant::now());

            if let Some(notice) = session.notice(Instant::now()) {
                match notice.kind {
                    NoticeKind::Success => println!("{}", notice.message.green()),
                    NoticeKind::Failure => eprintln!("{}", notice.message.red()),
                }
            }
            if failed {
                return Err("submission was not stored".into());
            }
            Ok(())
        }
    }
}

/// Explicit `-f`, then the environment override, then the profile, then the default file
async fn load(file: Option<&str>, client: &SubmissionClient, config: &Config) -> Result<FormDocument, String> {
    let fallback = std::env::var(FORM_CONFIG_ENV).ok().or_else(|| config.form_config.clone());
    let location = FormLocation::resolve_with(file, fallback);
    debug!(%location, "loading form definition");
    location.load(client).await.map_err(|e| e.to_string())
}

fn check(document: &FormDocument, format: OutputFormat) -> Result<(), String> {
    let findings = document.lint();
    format.print_rows(&findings, || {
        findings
            .iter()
            .map(|f| FindingRow {
                severity: match f.severity() {
                    Severity::Error => "error".into(),
                    Severity::Warning => "warning".into(),
                },
                field: f.field_id.clone().unwrap_or_else(|| "-".into()),
                finding: f.to_string(),
            })
            .collect()
    });

    let errors = findings.iter().filter(|f| f.severity() == Severity::Error).count();
    if errors > 0 {
        return Err(format!("{} error(s) in form definition", errors));
    }
    Ok(())
}

/// Stored entries `load_submission` could not place
fn unloaded_entry(label: &str) -> String {
    format!("submission entry {:?} matches no field, or its value does not fit the field", label)
}

fn split_assignment(raw: &str) -> Result<(&str, &str), String> {
    raw.split_once('=')
        .filter(|(label, _)| !label.trim().is_empty())
        .map(|(label, value)| (label.trim(), value))
        .ok_or_else(|| format!("expected LABEL=VALUE, got {:?}", raw))
}

/// Field id and kind for a label; the last field wins, as in the output object
fn lookup(session: &FormSession, label: &str) -> Result<(String, FieldKind), String> {
    session
        .document()
        .field_by_label(label)
        .map(|f| (f.id().to_string(), f.kind()))
        .ok_or_else(|| format!("no field labelled {:?}", label))
}

fn apply_assignments(session: &mut FormSession, sets: &[String], checks: &[String]) -> Result<(), String> {
    for raw in sets {
        let (label, value) = split_assignment(raw)?;
        let (id, kind) = lookup(session, label)?;
        let applied = match kind {
            FieldKind::Text => session.set_text(&id, value),
            FieldKind::Radio => session.select_option(&id, value),
            FieldKind::List => session
                .add_list_entry(&id)
                .and_then(|index| session.set_list_entry(&id, index, value)),
            FieldKind::Map => {
                let (key, entry) = value
                    .split_once('=')
                    .ok_or_else(|| format!("map field {:?} expects LABEL=KEY=VALUE", label))?;
                session.set_map_entry(&id, key, entry)
            }
            FieldKind::Checkbox => return Err(format!("{:?} is a checkbox field; use --check", label)),
        };
        applied.map_err(|e| format!("{}: {}", label, e))?;
        debug!(field_id = %id, label, "value applied");
    }

    for raw in checks {
        let (label, value) = split_assignment(raw)?;
        let (id, kind) = lookup(session, label)?;
        if kind != FieldKind::Checkbox {
            return Err(format!("{:?} is a {} field; use --set", label, kind));
        }
        let selection = split_comma_list(value);
        let options = session.document().field(&id).and_then(|f| f.options()).unwrap_or_default();
        if let Some(unknown) = selection.iter().find(|s| !options.contains(*s)) {
            return Err(format!("{:?} is not an option of {:?}", unknown, label));
        }
        session
            .set_value(&id, FieldValue::Selection(selection))
            .map_err(|e| format!("{}: {}", label, e))?;
    }
    Ok(())
}
