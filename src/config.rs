use serde_yaml::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use crate::domain::{error::ValidationError, models::Environment};

const CONFIG_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// Layered settings: values from the YAML file, falling back to defaults.
///
/// Keys are dotted paths (`aws.athena.dev.database`) and are matched
/// case-insensitively.
#[derive(Debug, Clone)]
pub struct Settings {
    root: Value,
    defaults: HashMap<String, String>,
}

impl Settings {
    pub fn load(config_dir: &Path, config_name: &str, defaults: HashMap<String, String>) -> Result<Self, ValidationError> {
        let path = locate(config_dir, config_name)?;
        info!("Loading configuration from {}", path.display());

        let raw = fs::read_to_string(&path)
            .map_err(|e| ValidationError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&raw, defaults)
    }

    pub fn from_yaml_str(raw: &str, defaults: HashMap<String, String>) -> Result<Self, ValidationError> {
        let root: Value = serde_yaml::from_str(raw)
            .map_err(|e| ValidationError::Config(format!("cannot parse configuration: {}", e)))?;

        let defaults = defaults
            .into_iter()
            .map(|(key, value)| (key.to_lowercase(), value))
            .collect();

        Ok(Self { root, defaults })
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.lookup(key)
            .or_else(|| self.defaults.get(&key.to_lowercase()).cloned())
    }

    fn lookup(&self, key: &str) -> Option<String> {
        let mut node = &self.root;
        for segment in key.split('.') {
            let mapping = node.as_mapping()?;
            node = mapping.iter().find_map(|(k, v)| {
                k.as_str()
                    .filter(|k| k.eq_ignore_ascii_case(segment))
                    .map(|_| v)
            })?;
        }

        match node {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

fn locate(config_dir: &Path, config_name: &str) -> Result<PathBuf, ValidationError> {
    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| config_dir.join(format!("{}.{}", config_name, ext)))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| {
            ValidationError::Config(format!(
                "no {}.yaml or {}.yml found in {}",
                config_name,
                config_name,
                config_dir.display()
            ))
        })
}

pub fn default_settings() -> HashMap<String, String> {
    HashMap::from([
        ("aws.region".to_string(), "eu-west-1".to_string()),
        ("aws.athena.dev.database".to_string(), "defaultDB".to_string()),
        ("aws.athena.qa.database".to_string(), "defaultDB".to_string()),
        ("aws.athena.prd.database".to_string(), "defaultDB".to_string()),
        ("aws.athena.dev.outputBucket".to_string(), "defaultBucket".to_string()),
        ("aws.athena.qa.outputBucket".to_string(), "defaultBucket".to_string()),
        ("aws.athena.prd.outputBucket".to_string(), "defaultBucket".to_string()),
    ])
}

/// Settings resolved for one deployment environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub region: String,
    pub athena_database: String,
    pub athena_output_bucket: String,
    pub ddb_table: Option<String>,
    pub ddb_hash_key: String,
    pub ddb_sort_key: String,
    pub ddb_newest_first: bool,
}

impl Configuration {
    pub fn resolve(settings: &Settings, env: Environment) -> Result<Self, ValidationError> {
        let env = env.as_str();
        let required = |key: String| {
            settings
                .get_string(&key)
                .ok_or_else(|| ValidationError::Config(format!("missing setting '{}'", key)))
        };

        let ddb_newest_first = match settings.get_string(&format!("aws.ddb.{}.newestFirst", env)) {
            Some(value) => value.parse::<bool>().map_err(|_| {
                ValidationError::Config(format!("aws.ddb.{}.newestFirst must be true or false, got '{}'", env, value))
            })?,
            None => true,
        };

        let ddb_table = settings
            .get_string(&format!("aws.ddb.{}.table", env))
            .filter(|t| !t.is_empty());
        if ddb_table.is_none() {
            debug!("No DynamoDB table configured for environment {}", env);
        }

        let config = Self {
            region: required("aws.region".to_string())?,
            athena_database: required(format!("aws.athena.{}.database", env))?,
            athena_output_bucket: required(format!("aws.athena.{}.outputBucket", env))?,
            ddb_table,
            ddb_hash_key: settings
                .get_string(&format!("aws.ddb.{}.hashKey", env))
                .unwrap_or_else(|| "ingestor_name".to_string()),
            ddb_sort_key: settings
                .get_string(&format!("aws.ddb.{}.sortKey", env))
                .unwrap_or_else(|| "execution_time".to_string()),
            ddb_newest_first,
        };
        debug!("Resolved configuration for {}: {:?}", env, config);
        Ok(config)
    }

    pub fn require_ddb_table(&self) -> Result<&str, ValidationError> {
        self.ddb_table
            .as_deref()
            .ok_or_else(|| ValidationError::Config("no DynamoDB table configured".to_string()))
    }
}
