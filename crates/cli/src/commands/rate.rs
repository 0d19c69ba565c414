use std::path::PathBuf;

use relocost_eval::rate::parse_date;
use relocost_eval::{
    Engine, FilterCriteria, RateRequest, RateResolution, RateResponse, ScoredEntry, TableRef,
};

use super::{load_store, tables_path};
use crate::config::Config;
use crate::{report_error, OutputFormat};

pub(crate) struct RateArgs {
    pub table: Option<String>,
    pub table_id: Option<String>,
    pub customer: Option<String>,
    pub filters: Vec<FilterCriteria>,
    pub date: Option<String>,
    pub limit: Option<usize>,
    pub tenant: Option<String>,
    pub tables: Option<PathBuf>,
}

pub(crate) async fn cmd_rate(
    args: RateArgs,
    config: &Config,
    output: OutputFormat,
    quiet: bool,
) -> i32 {
    let request = match build_request(&args, config) {
        Ok(r) => r,
        Err(msg) => {
            report_error(&format!("error: {}", msg), output, quiet);
            return 1;
        }
    };
    let Some(path) = tables_path(args.tables, config) else {
        report_error(
            "error: no tables file; pass --tables or set [store] path",
            output,
            quiet,
        );
        return 1;
    };
    let store = match load_store(&path) {
        Ok(s) => s,
        Err(msg) => {
            report_error(&format!("error: {}", msg), output, quiet);
            return 1;
        }
    };

    let response = Engine::new(store).resolve_rate(&request).await;
    match (&response, output) {
        (RateResponse::Failed { error }, _) => {
            report_error(&format!("error: {}", error), output, quiet);
            1
        }
        (RateResponse::Resolved(_), OutputFormat::Json) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&response)
                    .unwrap_or_else(|e| format!("serialization error: {}", e))
            );
            0
        }
        (RateResponse::Resolved(resolution), OutputFormat::Text) => {
            print_text(resolution, quiet);
            0
        }
    }
}

fn build_request(args: &RateArgs, config: &Config) -> Result<RateRequest, String> {
    let table = match (&args.table, &args.table_id) {
        (_, Some(id)) => TableRef::Id(id.clone()),
        (Some(name), None) => TableRef::Name(name.clone()),
        (None, None) => return Err("pass --table or --table-id".to_string()),
    };
    let tenant = args
        .tenant
        .as_deref()
        .or(config.rates.tenant.as_deref())
        .ok_or("no tenant; pass --tenant or set [rates] tenant")?;

    let mut request = RateRequest::new(table, tenant);
    request.customer_code = args.customer.clone();
    request.filters = args.filters.clone();
    request.limit = args.limit.or(config.rates.default_limit).unwrap_or(0);
    if let Some(text) = &args.date {
        let date = parse_date(text)
            .map_err(|_| format!("invalid --date '{}', expected YYYY-MM-DD", text))?;
        request.effective_date = Some(date);
    }
    Ok(request)
}

fn print_text(resolution: &RateResolution, quiet: bool) {
    if !quiet {
        println!(
            "matches: {} (customer {}, standard {})",
            resolution.total_matches, resolution.customer_matches, resolution.standard_matches
        );
    }
    for scored in &resolution.content {
        println!("{}", entry_line(scored));
    }
}

fn entry_line(scored: &ScoredEntry) -> String {
    let entry = &scored.entry;
    let mut line = format!("{:>5}  {}", scored.score, entry.id);
    if let Some(amount) = entry.amount {
        line.push_str(&format!("  amount={}", amount));
    }
    if let Some(percentage) = entry.percentage {
        line.push_str(&format!("  percentage={}", percentage));
    }
    if let Some(currency) = &entry.currency {
        line.push_str(&format!("  {}", currency));
    }
    line
}
