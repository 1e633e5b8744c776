pub mod athena;
pub mod aws;
pub mod dynamodb;
pub mod parsers;
pub mod report;
