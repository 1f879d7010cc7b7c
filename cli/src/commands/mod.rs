//! CLI Commands

pub mod config;
pub mod form;
pub mod submissions;

use formkit_client::{ClientConfig, SubmissionClient};
use formkit_core::FormData;

/// Submission client for `api_url`, or the default service address
pub fn client(api_url: Option<&str>) -> Result<SubmissionClient, String> {
    let config = api_url.map(ClientConfig::new).unwrap_or_default();
    SubmissionClient::new(config).map_err(|e| e.to_string())
}

/// Read a form output object from a JSON file
pub fn read_form_data(path: &str) -> Result<FormData, String> {
    let content = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?;
    match serde_json::from_str(&content).map_err(|e| format!("{}: {}", path, e))? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(format!("{}: form data must be a JSON object", path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_form_data_requires_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"["a", "b"]"#).unwrap();
        let err = read_form_data(file.path().to_str().unwrap()).unwrap_err();
        assert!(err.contains("JSON object"));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Name": "Alice"}}"#).unwrap();
        let data = read_form_data(file.path().to_str().unwrap()).unwrap();
        assert_eq!(data["Name"], "Alice");
    }
}
