//! Output formatting

use clap::ValueEnum;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Print `data`; the table format falls back to pretty JSON
    pub fn print<T: Serialize + ?Sized>(&self, data: &T) {
        match self {
            OutputFormat::Json | OutputFormat::Table => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
            }
            OutputFormat::Yaml => {
                println!("{}", serde_yaml::to_string(data).unwrap_or_default());
            }
        }
    }

    /// Print `data`, rendering `rows` when the table format is selected
    pub fn print_rows<T, R>(&self, data: &T, rows: impl FnOnce() -> Vec<R>)
    where
        T: Serialize + ?Sized,
        R: Tabled,
    {
        match self {
            OutputFormat::Table => {
                let rows = rows();
                if rows.is_empty() {
                    println!("(none)");
                } else {
                    println!("{}", Table::new(rows).with(Style::rounded()));
                }
            }
            _ => self.print(data),
        }
    }
}
