use csv::Writer;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};
use crate::domain::{
    error::ValidationError,
    models::{IngestionRecord, RowCount},
};

pub const ROW_COUNT_HEADER: [&str; 2] = ["table_name_athena", "row_count"];
pub const INGESTION_HEADER: [&str; 5] = [
    "table_name_ddb",
    "last_exec_as_date",
    "exec_time",
    "status",
    "total_rows",
];

pub fn write_row_counts(path: &Path, rows: &[RowCount]) -> Result<(), ValidationError> {
    info!("Writing Athena result set to {}", path.display());
    write_row_counts_to(create(path)?, rows)?;
    info!("Done writing {} row count(s)", rows.len());
    Ok(())
}

pub fn write_row_counts_to<W: Write>(sink: W, rows: &[RowCount]) -> Result<(), ValidationError> {
    let mut writer = Writer::from_writer(sink);
    writer.write_record(ROW_COUNT_HEADER)?;

    for row in rows {
        debug!("{} -> {}", row.table, row.count);
        writer.write_record([row.table.as_str(), row.count.to_string().as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_ingestion_records(path: &Path, records: &[IngestionRecord]) -> Result<(), ValidationError> {
    info!("Writing DDB result set to {}", path.display());
    write_ingestion_records_to(create(path)?, records)?;
    info!("Done writing {} ingestion record(s)", records.len());
    Ok(())
}

pub fn write_ingestion_records_to<W: Write>(sink: W, records: &[IngestionRecord]) -> Result<(), ValidationError> {
    let mut writer = Writer::from_writer(sink);
    writer.write_record(INGESTION_HEADER)?;

    for record in records {
        writer.write_record([
            record.table_name.as_str(),
            record.last_execution_date.as_str(),
            record.execution_time.as_str(),
            record.status.as_str(),
            record.total_rows.to_string().as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn create(path: &Path) -> Result<File, ValidationError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}
