pub mod query_engine;
