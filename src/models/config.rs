use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils::error::{AppError, Result};

/// 单个数据库连接的配置
///
/// `driver` 取值同 webman 的连接类型：mysql/mariadb、pgsql、sqlite、sqlsrv。
/// SQLite 只使用 `database`（文件路径）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSettings {
    pub driver: String,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
}

/// 一个 `default` + `connections` 配置块
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub connections: BTreeMap<String, ConnectionSettings>,
}

/// 插件范围的配置块（可覆盖主配置的数据库连接）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginSettings {
    #[serde(default)]
    pub database: Option<DatabaseSettings>,
}

/// 应用配置：主数据库配置 + 按插件名划分的覆盖配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub plugin: BTreeMap<String, PluginSettings>,
}

impl AppSettings {
    /// 从 TOML 配置文件加载
    pub fn load(path: &Path) -> Result<Self> {
        let raw = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .map_err(|e| {
                AppError::Config(format!("Failed to load config {}: {}", path.display(), e))
            })?;

        raw.try_deserialize().map_err(|e| {
            AppError::Config(format!("Invalid config {}: {}", path.display(), e))
        })
    }
}
