//! # Config Command

use serde::Serialize;

use crate::error::ApiError;
use crate::state::{default_config_path, AppConfig};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigView {
    #[serde(flatten)]
    pub config: AppConfig,
    /// Where the database actually lives after defaults are applied.
    pub resolved_database_path: String,
    pub default_config_file: Option<String>,
}

pub fn get_config(config: &AppConfig) -> Result<ConfigView, ApiError> {
    let db_path = config
        .resolve_database_path()
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(ConfigView {
        config: config.clone(),
        resolved_database_path: db_path.display().to_string(),
        default_config_file: default_config_path().map(|p| p.display().to_string()),
    })
}
