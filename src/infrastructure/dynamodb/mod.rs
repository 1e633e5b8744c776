pub mod ingestion_repo;
