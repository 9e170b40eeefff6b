//! Jupyter notebook → linear pseudo-Python text.
//!
//! This is a lossy projection for LLM consumption: code cells are kept
//! verbatim, their outputs are inlined as comments and prose cells become
//! triple-quoted blocks. It never fails; malformed documents turn into an
//! inline error line.

use serde_json::Value;
use tracing::{debug, warn};

pub const NOTEBOOK_HEADER: &str = "# Jupyter Notebook → pseudo Python\n";

const COMMENT_PREFIX: &str = "#   ";

pub fn normalize_notebook(raw_json: &str, path: &str) -> String {
    let notebook: Value = match serde_json::from_str(raw_json) {
        Ok(v) => v,
        Err(e) => {
            warn!(path, error = %e, "Failed to parse notebook");
            return format!("Error parsing notebook {path}: {e}");
        }
    };

    let cells = collect_cells(&notebook);
    debug!(path, cells = cells.len(), "Normalising notebook");

    let mut out = String::from(NOTEBOOK_HEADER);
    for cell in cells {
        let Some(cell_type) = truthy_str(cell.get("cell_type")) else {
            continue;
        };
        let Some(source) = cell.get("source").filter(|v| is_truthy(v)) else {
            continue;
        };
        let content = join_text(source);

        match cell_type {
            "code" => {
                out.push_str(&content);
                out.push('\n');
                if let Some(outputs) = cell.get("outputs").and_then(Value::as_array) {
                    if !outputs.is_empty() {
                        out.push_str("# Output:\n");
                        for output in outputs {
                            render_output(output, &mut out);
                        }
                    }
                }
            }
            "markdown" | "raw" => {
                out.push_str("\"\"\"\n");
                out.push_str(&content);
                out.push_str("\n\"\"\"\n");
            }
            _ => {}
        }
        out.push('\n');
    }
    out
}

/// Worksheets (nbformat 3) are concatenated in order; otherwise the flat
/// `cells` list is used. Anything else yields no cells.
fn collect_cells(notebook: &Value) -> Vec<&Value> {
    if let Some(worksheets) = notebook.get("worksheets").filter(|v| is_truthy(v)) {
        return worksheets
            .as_array()
            .map(|sheets| {
                sheets
                    .iter()
                    .filter_map(|ws| ws.get("cells").and_then(Value::as_array))
                    .flatten()
                    .collect()
            })
            .unwrap_or_default();
    }
    notebook
        .get("cells")
        .and_then(Value::as_array)
        .map(|cells| cells.iter().collect())
        .unwrap_or_default()
}

fn render_output(output: &Value, out: &mut String) {
    match output.get("output_type").and_then(Value::as_str) {
        Some("stream") => {
            let text = output.get("text").map(join_text).unwrap_or_default();
            push_commented(&text, out);
        }
        Some("execute_result") | Some("display_data") => {
            if let Some(plain) = output
                .get("data")
                .and_then(|d| d.get("text/plain"))
                .filter(|v| is_truthy(v))
            {
                push_commented(&join_text(plain), out);
            }
        }
        Some("error") => {
            let ename = output.get("ename").map(join_text).unwrap_or_default();
            let evalue = output.get("evalue").map(join_text).unwrap_or_default();
            out.push_str(&format!("{COMMENT_PREFIX}Error: {ename}: {evalue}\n"));
        }
        _ => {}
    }
}

fn push_commented(text: &str, out: &mut String) {
    out.push_str(COMMENT_PREFIX);
    out.push_str(&text.replace('\n', &format!("\n{COMMENT_PREFIX}")));
    out.push('\n');
}

/// Notebook text fields are either a string or a list of line strings.
fn join_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(parts) => parts
            .iter()
            .map(|p| match p {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn truthy_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::Array(_) | Value::Object(_) => true,
    }
}
