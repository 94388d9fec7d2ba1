use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::error::ReportError;
use crate::service::Notice;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str, error_code: Option<&str>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(output_format: &OutputFormat, collection_name: &str, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ collection_name: [] }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Print the outcome notice of a failed command. Portal errors keep their
/// code; anything else is reported as-is.
pub fn output_failure(output_format: &OutputFormat, err: &anyhow::Error, verbose: bool) {
    let (message, code) = match err.downcast_ref::<ReportError>() {
        Some(report_err) => {
            let notice = Notice::failed(report_err);
            (notice.message, notice.error_code)
        }
        None if verbose => (format!("{:?}", err), None),
        None => (err.to_string(), None),
    };

    if output_error(output_format, &message, code).is_err() {
        eprintln!("Error: {}", message);
    }
}
