use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Print a success line, or a JSON object merging `data` into `{success, message}`
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&success_body(message, data))?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print aligned `key: value` rows in text mode; JSON mode prints `data` as is
pub fn output_details(output_format: OutputFormat, rows: &[(&str, String)], data: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Text => {
            let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
            for (key, value) in rows {
                println!("{:width$}  {}", key, value, width = width);
            }
        }
    }
    Ok(())
}

fn success_body(message: &str, data: Option<Value>) -> Value {
    let mut response = json!({
        "success": true,
        "message": message
    });

    match data {
        Some(Value::Object(fields)) => {
            if let Value::Object(map) = &mut response {
                map.extend(fields);
            }
        }
        Some(other) => response["data"] = other,
        None => {}
    }
    response
}
