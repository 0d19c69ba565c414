use std::path::PathBuf;

use relocost_eval::{Engine, FormulaResult, Variables};
use relocost_storage::MemoryTableStore;
use rust_decimal::Decimal;

use super::{load_store, tables_path};
use crate::config::Config;
use crate::{report_error, OutputFormat};

/// Evaluate a formula. Without a tables file, formulas that use LOOKUP
/// fail with "lookup table not found".
pub(crate) async fn cmd_eval(
    formula: &str,
    vars: Vec<(String, Decimal)>,
    tables: Option<PathBuf>,
    config: &Config,
    output: OutputFormat,
    quiet: bool,
) -> i32 {
    let store = match tables_path(tables, config) {
        Some(path) => match load_store(&path) {
            Ok(s) => s,
            Err(msg) => {
                report_error(&format!("error: {}", msg), output, quiet);
                return 1;
            }
        },
        None => MemoryTableStore::new(),
    };

    let variables: Variables = vars.into_iter().collect();
    let result = Engine::new(store).evaluate(formula, &variables).await;
    let code = if result.error.is_some() { 1 } else { 0 };

    match output {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&result)
                    .unwrap_or_else(|e| format!("serialization error: {}", e))
            );
        }
        OutputFormat::Text => print_text(&result, quiet),
    }
    code
}

fn print_text(result: &FormulaResult, quiet: bool) {
    if !quiet {
        for call in &result.lookup_calls {
            let outcome = match (&call.result, &call.error) {
                (Some(value), _) => value.to_string(),
                (None, Some(error)) => format!("error: {}", error),
                (None, None) => "-".to_string(),
            };
            println!(
                "lookup {}[{} = {}].{} -> {}",
                call.table, call.key_column, call.key, call.value_column, outcome
            );
        }
    }
    match &result.error {
        Some(error) => report_error(&format!("error: {}", error), OutputFormat::Text, quiet),
        None => println!("{}", result.value),
    }
}
