use relocost_core::inspect;

use crate::{report_error, OutputFormat};

/// Parse a formula without evaluating it.
pub(crate) fn cmd_check(formula: &str, output: OutputFormat, quiet: bool) -> i32 {
    let expr = match relocost_core::parse(formula) {
        Ok(e) => e,
        Err(e) => {
            match output {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::json!({ "valid": false, "error": e.to_json_value() })
                    );
                }
                OutputFormat::Text => {
                    report_error(&e.format_with_source(formula), output, quiet);
                }
            }
            return 1;
        }
    };

    let inputs = inspect::inputs(&expr);
    match output {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "valid": true,
                    "formula": expr.to_string(),
                    "variables": inputs.variables,
                    "lookup_tables": inputs.lookup_tables,
                })
            );
        }
        OutputFormat::Text => {
            if quiet {
                return 0;
            }
            println!("ok: {}", expr);
            if !inputs.variables.is_empty() {
                println!("variables: {}", inputs.variables.join(", "));
            }
            if !inputs.lookup_tables.is_empty() {
                println!("lookup tables: {}", inputs.lookup_tables.join(", "));
            }
        }
    }
    0
}
