//! Submission commands

use crate::{output::OutputFormat, SubmissionCommands};
use colored::Colorize;
use formkit_client::SubmissionClient;
use formkit_core::Submission;
use tabled::Tabled;

use super::read_form_data;

#[derive(Tabled)]
struct SubmissionRow {
    id: i64,
    created_at: String,
    fields: usize,
    data: String,
}

impl From<&Submission> for SubmissionRow {
    fn from(s: &Submission) -> Self {
        Self {
            id: s.id,
            created_at: s.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            fields: s.form_data.len(),
            data: preview(&serde_json::Value::Object(s.form_data.clone()).to_string()),
        }
    }
}

fn preview(text: &str) -> String {
    const MAX: usize = 60;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(MAX).collect::<String>())
    }
}

pub async fn handle(action: SubmissionCommands, client: &SubmissionClient, format: OutputFormat) -> Result<(), String> {
    match action {
        SubmissionCommands::List => {
            let submissions = client.list().await.map_err(|e| e.to_string())?;
            format.print_rows(&submissions, || submissions.iter().map(SubmissionRow::from).collect());
        }
        SubmissionCommands::Get { id } => {
            let submission = client.get(id).await.map_err(|e| e.to_string())?;
            format.print(&submission);
        }
        SubmissionCommands::Create { file } => {
            let form_data = read_form_data(&file)?;
            let id = client.create(&form_data).await.map_err(|e| e.to_string())?;
            println!("{} submission {}", "Created".green(), id);
        }
        SubmissionCommands::Update { id, file } => {
            let form_data = read_form_data(&file)?;
            let id = client.update(id, &form_data).await.map_err(|e| e.to_string())?;
            println!("{} submission {}", "Updated".green(), id);
        }
        SubmissionCommands::Delete { id } => {
            client.delete(id).await.map_err(|e| e.to_string())?;
            println!("{} submission {}", "Deleted".green(), id);
        }
    }
    Ok(())
}
