use std::path::Path;

use crate::config::schema::ProfilerConfig;
use crate::error::ConfigError;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ProfilerConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<ProfilerConfig, ConfigError> {
    let config: ProfilerConfig = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

pub fn validate_config(config: &ProfilerConfig) -> Result<(), ConfigError> {
    validate_prefix("inputPrefix", &config.input_prefix)?;
    validate_prefix("outputPrefix", &config.output_prefix)?;

    let table = &config.status_table_name;
    if table.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "statusTableName must not be empty".to_string(),
        });
    }
    if table.contains('"') || table.chars().any(char::is_control) {
        return Err(ConfigError::Validation {
            message: format!(
                "statusTableName '{}' must not contain quotes or control characters",
                table.escape_debug()
            ),
        });
    }

    if config.engine.program.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "engine.program must not be empty".to_string(),
        });
    }

    if config.logging.level.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "logging.level must not be empty".to_string(),
        });
    }

    Ok(())
}

fn validate_prefix(field: &str, prefix: &str) -> Result<(), ConfigError> {
    if prefix.is_empty() {
        return Err(ConfigError::Validation {
            message: format!("{} must not be empty", field),
        });
    }
    if !prefix.ends_with('/') {
        return Err(ConfigError::Validation {
            message: format!("{} '{}' must end with '/'", field, prefix),
        });
    }
    Ok(())
}
