//! Static inspection of parsed formulas.
//!
//! Lets authoring flows see what a formula needs (variables to supply,
//! tables that must exist) without evaluating it.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::ast::Expr;

/// Inputs referenced by a formula.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormulaInputs {
    /// Variable names, sorted and deduplicated.
    pub variables: Vec<String>,
    /// LOOKUP table names in order of first appearance.
    pub lookup_tables: Vec<String>,
}

pub fn inputs(expr: &Expr) -> FormulaInputs {
    let mut variables = BTreeSet::new();
    let mut lookup_tables = Vec::new();
    collect(expr, &mut variables, &mut lookup_tables);
    FormulaInputs {
        variables: variables.into_iter().collect(),
        lookup_tables,
    }
}

fn collect(expr: &Expr, variables: &mut BTreeSet<String>, tables: &mut Vec<String>) {
    match expr {
        Expr::Number(_) => {}
        Expr::Variable(name) => {
            variables.insert(name.clone());
        }
        Expr::Unary { operand, .. } => collect(operand, variables, tables),
        Expr::Binary { left, right, .. } => {
            collect(left, variables, tables);
            collect(right, variables, tables);
        }
        Expr::Lookup(call) => {
            if !tables.contains(&call.table) {
                tables.push(call.table.clone());
            }
            collect(&call.key, variables, tables);
        }
    }
}
