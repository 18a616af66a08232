//! SQL execution over the relations in a data directory.

use std::path::Path;
use std::time::Instant;

use polars::prelude::DataFrame;
use polars::sql::SQLContext;
use tracing::{debug, info};

use crate::discovery::discover_relations;
use crate::error::{QueryError, Result};
use crate::read::scan_artifact;

/// Runs `expression` against the relations discovered in `data_dir`.
///
/// Every relation is registered as a lazy scan, so only the artifacts the
/// expression references are read. Each call builds a fresh SQL context;
/// nothing is cached between calls.
pub fn query(expression: &str, data_dir: &Path) -> Result<DataFrame> {
    let start = Instant::now();
    let result = execute(expression, data_dir).map_err(|err| err.for_expression(expression))?;
    info!(
        row_count = result.height(),
        column_count = result.width(),
        duration_ms = start.elapsed().as_millis(),
        "query complete"
    );
    Ok(result)
}

fn execute(expression: &str, data_dir: &Path) -> Result<DataFrame> {
    let relations = discover_relations(data_dir)?;
    let mut context = SQLContext::new();
    for relation in &relations {
        let frame = scan_artifact(&relation.path)?;
        debug!(
            relation = %relation.name,
            format = %relation.format,
            path = %relation.path.display(),
            "relation registered"
        );
        context.register(&relation.name, frame);
    }

    context
        .execute(expression)
        .and_then(|plan| plan.collect())
        .map_err(|e| QueryError::Execution {
            expression: expression.to_string(),
            message: e.to_string(),
        })
}
