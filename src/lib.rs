//! 从数据库表结构生成验证器类
//!
//! 流程：连接解析 -> 目录内省 -> 规则推断 -> 类渲染。
//! 四种方言（MySQL/MariaDB、PostgreSQL、SQLite、SQL Server）统一
//! 归一化为方言无关的 [`models::TableDefinition`]。

pub mod db;
pub mod generators;
pub mod infer;
pub mod introspect;
pub mod models;
pub mod services;
pub mod utils;
