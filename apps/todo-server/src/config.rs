//! Server configuration.

use std::{env, fmt, path::PathBuf, str::FromStr, time::Duration};

use task_store::{UpdatePolicy, dynamodb::DynamoDbConfig, mongo::MongoConfig};

/// Which task store backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// In-process map; contents are lost on restart.
    #[default]
    Memory,
    /// Amazon DynamoDB table.
    DynamoDb,
    /// MongoDB collection.
    MongoDb,
}

impl StoreBackend {
    /// Converts the backend to its configuration string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::DynamoDb => "dynamodb",
            Self::MongoDb => "mongodb",
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "dynamodb" => Ok(Self::DynamoDb),
            "mongodb" | "mongo" => Ok(Self::MongoDb),
            other => Err(format!("unknown store backend: {other}")),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event, for log shippers.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Log level.
    pub log_level: String,
    /// Log output format.
    pub log_format: LogFormat,
    /// Task store backend.
    pub store_backend: StoreBackend,
    /// Behaviour of updates targeting a missing task.
    pub update_policy: UpdatePolicy,
    /// Timeout applied to the store client.
    pub store_timeout: Option<Duration>,
    /// DynamoDB table name.
    pub dynamodb_table: String,
    /// DynamoDB endpoint override.
    pub dynamodb_endpoint: Option<String>,
    /// AWS region.
    pub aws_region: Option<String>,
    /// MongoDB connection string.
    pub mongodb_uri: String,
    /// MongoDB database name.
    pub mongodb_database: String,
    /// MongoDB collection name.
    pub mongodb_collection: String,
    /// Directory holding the start page and other static files.
    pub static_dir: PathBuf,
    /// Deployment environment name reported by the health check.
    pub environment: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let dynamodb = DynamoDbConfig::default();
        let mongo = MongoConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_format: LogFormat::default(),
            store_backend: StoreBackend::default(),
            update_policy: UpdatePolicy::default(),
            store_timeout: None,
            dynamodb_table: dynamodb.table_name,
            dynamodb_endpoint: None,
            aws_region: None,
            mongodb_uri: mongo.uri,
            mongodb_database: mongo.database,
            mongodb_collection: mongo.collection,
            static_dir: PathBuf::from("static"),
            environment: None,
        }
    }
}

/// Parses an optional variable, keeping `default` when it is unset.
fn parse_or<T>(value: Option<String>, name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid value for {name}: {e}")),
        None => Ok(default),
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let store_timeout = lookup("TODO_STORE_TIMEOUT_SECS")
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| anyhow::anyhow!("invalid value for TODO_STORE_TIMEOUT_SECS: {e}"))
            })
            .transpose()?;

        Ok(Self {
            host: lookup("TODO_SERVER_HOST").unwrap_or(defaults.host),
            port: parse_or(lookup("TODO_SERVER_PORT"), "TODO_SERVER_PORT", defaults.port)?,
            log_level: lookup("TODO_LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format: parse_or(lookup("TODO_LOG_FORMAT"), "TODO_LOG_FORMAT", defaults.log_format)?,
            store_backend: parse_or(
                lookup("TODO_STORE_BACKEND"),
                "TODO_STORE_BACKEND",
                defaults.store_backend,
            )?,
            update_policy: parse_or(
                lookup("TODO_UPDATE_POLICY"),
                "TODO_UPDATE_POLICY",
                defaults.update_policy,
            )?,
            store_timeout,
            dynamodb_table: lookup("TODO_DYNAMODB_TABLE").unwrap_or(defaults.dynamodb_table),
            dynamodb_endpoint: lookup("TODO_DYNAMODB_ENDPOINT"),
            aws_region: lookup("AWS_REGION"),
            mongodb_uri: lookup("TODO_MONGODB_URI").unwrap_or(defaults.mongodb_uri),
            mongodb_database: lookup("TODO_MONGODB_DATABASE").unwrap_or(defaults.mongodb_database),
            mongodb_collection: lookup("TODO_MONGODB_COLLECTION")
                .unwrap_or(defaults.mongodb_collection),
            static_dir: lookup("TODO_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            environment: lookup("TODO_ENVIRONMENT"),
        })
    }

    /// Returns the server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the DynamoDB connection settings.
    pub fn dynamodb_config(&self) -> DynamoDbConfig {
        DynamoDbConfig {
            table_name: self.dynamodb_table.clone(),
            region: self.aws_region.clone(),
            endpoint_url: self.dynamodb_endpoint.clone(),
            timeout: self.store_timeout,
        }
    }

    /// Returns the MongoDB connection settings.
    pub fn mongo_config(&self) -> MongoConfig {
        MongoConfig {
            uri: self.mongodb_uri.clone(),
            database: self.mongodb_database.clone(),
            collection: self.mongodb_collection.clone(),
            timeout: self.store_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.update_policy, UpdatePolicy::Upsert);
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.dynamodb_table, "Tasks");
        assert_eq!(config.mongodb_database, "todoapp");
        assert!(config.store_timeout.is_none());
        assert!(config.environment.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("TODO_SERVER_PORT", "9000"),
            ("TODO_STORE_BACKEND", "MongoDB"),
            ("TODO_UPDATE_POLICY", "strict"),
            ("TODO_LOG_FORMAT", "json"),
            ("TODO_STORE_TIMEOUT_SECS", "5"),
            ("TODO_MONGODB_COLLECTION", "todos"),
            ("AWS_REGION", "eu-north-1"),
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.store_backend, StoreBackend::MongoDb);
        assert_eq!(config.update_policy, UpdatePolicy::Strict);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.store_timeout, Some(Duration::from_secs(5)));

        let mongo = config.mongo_config();
        assert_eq!(mongo.collection, "todos");
        assert_eq!(mongo.timeout, Some(Duration::from_secs(5)));

        let dynamodb = config.dynamodb_config();
        assert_eq!(dynamodb.region.as_deref(), Some("eu-north-1"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(config_from(&[("TODO_SERVER_PORT", "eighty")]).is_err());
        assert!(config_from(&[("TODO_STORE_BACKEND", "postgres")]).is_err());
        assert!(config_from(&[("TODO_UPDATE_POLICY", "merge")]).is_err());
        assert!(config_from(&[("TODO_STORE_TIMEOUT_SECS", "-1")]).is_err());
    }
}
