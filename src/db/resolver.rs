use sqlx::mysql::{MySqlConnectOptions, MySqlSslMode};
use sqlx::postgres::PgConnectOptions;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{MySqlPool, PgPool, SqlitePool};

use crate::db::connection::{
    MySqlSchemaConnection, PgSchemaConnection, SchemaConnection, SqliteSchemaConnection,
};
use crate::models::{AppSettings, ConnectionSettings};
use crate::utils::error::{AppError, Result};

/// 连接名解析结果
///
/// `qualified` 是对外展示用的规范名：走了插件配置时为
/// `plugin.<plugin>.<name>`，否则就是连接名本身。
#[derive(Debug, Clone)]
pub struct ResolvedConnection {
    pub name: String,
    pub qualified: String,
    pub settings: ConnectionSettings,
}

/// 连接解析器：把逻辑连接名解析为可用的 SchemaConnection
///
/// 无状态，所有上下文（插件名、显式连接名、配置）都作为参数传入。
pub struct ConnectionResolver;

impl ConnectionResolver {
    /// 解析连接名
    ///
    /// 插件定义了自己的 connections 块时在插件块内解析（含插件自己的
    /// default），否则回落到主配置。显式给出的名字无效时直接报错，
    /// 绝不静默回落到默认连接。
    pub fn resolve_name(
        explicit: Option<&str>,
        plugin: Option<&str>,
        settings: &AppSettings,
    ) -> Result<ResolvedConnection> {
        let mut connections = &settings.database.connections;
        let mut default = settings.database.default.as_deref();
        let mut plugin_scope = None;

        if let Some(plugin_name) = plugin.map(str::trim).filter(|p| !p.is_empty()) {
            if let Some(block) = settings
                .plugin
                .get(plugin_name)
                .and_then(|p| p.database.as_ref())
                .filter(|db| !db.connections.is_empty())
            {
                connections = &block.connections;
                default = block.default.as_deref();
                plugin_scope = Some(plugin_name);
            }
        }

        let name = match explicit.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name,
            None => default.map(str::trim).filter(|d| !d.is_empty()).ok_or_else(|| {
                AppError::Config(
                    "Database connection name not provided and default connection is not set"
                        .to_string(),
                )
            })?,
        };

        let Some(connection) = connections.get(name) else {
            let available = connections.keys().cloned().collect::<Vec<_>>().join(", ");
            return Err(AppError::NotFound(format!(
                "Database connection not found: {}. Available connections: {}",
                name, available
            )));
        };

        let qualified = match plugin_scope {
            Some(plugin_name) => format!("plugin.{}.{}", plugin_name, name),
            None => name.to_string(),
        };

        Ok(ResolvedConnection {
            name: name.to_string(),
            qualified,
            settings: connection.clone(),
        })
    }

    /// 解析连接名并建立连接
    pub async fn resolve(
        explicit: Option<&str>,
        plugin: Option<&str>,
        settings: &AppSettings,
    ) -> Result<Box<dyn SchemaConnection>> {
        let resolved = Self::resolve_name(explicit, plugin, settings)?;
        tracing::info!("Resolved database connection: {}", resolved.qualified);
        Self::connect(&resolved.settings).await
    }

    /// 按驱动建立 sqlx 连接池并包装成 SchemaConnection
    pub async fn connect(settings: &ConnectionSettings) -> Result<Box<dyn SchemaConnection>> {
        let driver = settings.driver.trim().to_lowercase();
        match driver.as_str() {
            "mysql" | "mariadb" => {
                let opts = Self::build_mysql_options(settings);
                let pool = MySqlPool::connect_with(opts).await.map_err(|e| {
                    tracing::error!("Failed to connect to MySQL: {}", e);
                    e
                })?;
                Ok(Box::new(MySqlSchemaConnection::new(
                    pool,
                    driver,
                    settings.database.clone(),
                )))
            }
            "pgsql" | "postgres" | "postgresql" => {
                let opts = Self::build_postgres_options(settings);
                let pool = PgPool::connect_with(opts).await.map_err(|e| {
                    tracing::error!("Failed to connect to PostgreSQL: {}", e);
                    e
                })?;
                Ok(Box::new(PgSchemaConnection::new(
                    pool,
                    driver,
                    settings.database.clone(),
                )))
            }
            "sqlite" => {
                let path = settings.database.as_deref().ok_or_else(|| {
                    AppError::Config(
                        "SQLite connection requires `database` (file path)".to_string(),
                    )
                })?;
                let opts = SqliteConnectOptions::new().filename(path).read_only(true);
                let pool = SqlitePool::connect_with(opts).await.map_err(|e| {
                    tracing::error!("Failed to open SQLite database {}: {}", path, e);
                    e
                })?;
                Ok(Box::new(SqliteSchemaConnection::new(
                    pool,
                    driver,
                    settings.database.clone(),
                )))
            }
            // sqlx 没有 SQL Server 驱动；内省器只依赖 SchemaConnection，
            // 调用方可以自带实现。
            "sqlsrv" => Err(AppError::Config(
                "SQL Server connections require an external SchemaConnection implementation"
                    .to_string(),
            )),
            other => Err(AppError::InvalidInput(format!(
                "Unsupported database driver: {}",
                other
            ))),
        }
    }

    /// 构建 MySQL 连接选项（避免密码特殊字符问题）
    fn build_mysql_options(settings: &ConnectionSettings) -> MySqlConnectOptions {
        let mut opts = MySqlConnectOptions::new()
            .host(settings.host.as_deref().unwrap_or("127.0.0.1"))
            .port(settings.port.unwrap_or(3306))
            .ssl_mode(MySqlSslMode::Preferred);
        if let Some(username) = &settings.username {
            opts = opts.username(username);
        }
        if let Some(password) = &settings.password {
            opts = opts.password(password);
        }
        if let Some(database) = &settings.database {
            opts = opts.database(database);
        }
        opts
    }

    /// 构建 PostgreSQL 连接选项
    fn build_postgres_options(settings: &ConnectionSettings) -> PgConnectOptions {
        let mut opts = PgConnectOptions::new()
            .host(settings.host.as_deref().unwrap_or("127.0.0.1"))
            .port(settings.port.unwrap_or(5432));
        if let Some(username) = &settings.username {
            opts = opts.username(username);
        }
        if let Some(password) = &settings.password {
            opts = opts.password(password);
        }
        if let Some(database) = &settings.database {
            opts = opts.database(database);
        }
        opts
    }
}
