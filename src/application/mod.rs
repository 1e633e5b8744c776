pub mod athena_validation;
pub mod ingestion_status;
