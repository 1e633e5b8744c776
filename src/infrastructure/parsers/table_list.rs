use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, error};
use crate::domain::{error::ValidationError, models::Backend};

pub fn read_table_list(path: &Path, backend: Backend) -> Result<Vec<String>, ValidationError> {
    debug!("Opening table list {}", path.display());
    let file = File::open(path).map_err(|e| {
        error!("Could not open the table list {}: {}", path.display(), e);
        ValidationError::TableList(format!("{}: {}", path.display(), e))
    })?;
    parse_table_list(file, backend)
}

/// Reads a headerless two-column CSV. Athena targets are `<schema>_<table>`,
/// DynamoDB targets are the second column as-is.
///
/// Both backends share the `<schema>,<table>` layout: a DynamoDB list must
/// still carry the schema column, and a one-column row is an error.
pub fn parse_table_list<R: Read>(source: R, backend: Backend) -> Result<Vec<String>, ValidationError> {
    let mut reader = ReaderBuilder::new().has_headers(false).from_reader(source);

    let mut tables = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            error!("Failed to read table list record at row {}: {}", row + 1, e);
            ValidationError::Csv(e)
        })?;

        let (schema, table) = match (record.get(0), record.get(1)) {
            (Some(schema), Some(table)) => (schema, table),
            _ => {
                error!("Table list row {} has {} column(s), expected 2", row + 1, record.len());
                return Err(ValidationError::TableList(format!(
                    "row {} has {} column(s), expected 2",
                    row + 1,
                    record.len()
                )));
            }
        };

        let target = match backend {
            Backend::Athena => format!("{}_{}", schema, table),
            Backend::Ddb => table.to_string(),
        };
        if target.trim().is_empty() || target == "_" {
            return Err(ValidationError::TableList(format!("row {} names no table", row + 1)));
        }

        debug!("Row {}: target '{}'", row + 1, target);
        tables.push(target);
    }

    info!("Read {} table(s) from table list", tables.len());
    Ok(tables)
}
