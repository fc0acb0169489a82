//! 命令行入口：从数据库表结构生成验证器类文件

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use db_validator_gen::db::ConnectionResolver;
use db_validator_gen::generators::{ValidatorClassRenderer, ValidatorFileWriter};
use db_validator_gen::infer::OrmFlavor;
use db_validator_gen::models::{AppSettings, InferOptions};
use db_validator_gen::services::GeneratorService;
use db_validator_gen::utils::error::{AppError, Result};
use db_validator_gen::utils::naming::split_validator_name;

#[derive(Parser, Debug)]
#[command(name = "db_validator_gen", version, about = "Generate validator classes from database tables")]
struct Cli {
    /// 验证器名称，支持目录段，如 user 或 admin/user_validator
    name: String,

    /// 数据表名，给出时按表结构推断规则
    #[arg(short = 't', long)]
    table: Option<String>,

    /// 配置中的连接名，缺省用默认连接
    #[arg(short = 'd', long)]
    database: Option<String>,

    /// 生成场景，目前仅支持 crud；必须与 --table 一起使用
    #[arg(short = 's', long, num_args = 0..=1, default_missing_value = "crud")]
    scenes: Option<String>,

    /// 插件名，生成到 plugin/<name>/app/validation 并优先用插件连接配置
    #[arg(short = 'p', long)]
    plugin: Option<String>,

    /// 自定义输出目录（相对路径）
    #[arg(short = 'P', long)]
    path: Option<String>,

    /// 覆盖已存在的文件
    #[arg(short = 'f', long)]
    force: bool,

    /// ORM 风味，决定默认排除的列：laravel 或 thinkorm
    #[arg(long, default_value = "laravel")]
    orm: String,

    /// 配置文件路径
    #[arg(long, default_value = "config/database.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    run(cli).await?;
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    // 场景必须依附于表结构，提前拦住，不做任何连接
    if cli.scenes.is_some() && cli.table.is_none() {
        return Err(AppError::InvalidInput(
            "--scenes requires --table".to_string(),
        ));
    }

    let (dirs, class) = split_validator_name(&cli.name)?;
    let base = resolve_base_dir(cli.plugin.as_deref(), cli.path.as_deref())?;
    let namespace = namespace_for(&base, &dirs);

    let mut file_path = base;
    for dir in &dirs {
        file_path.push(dir);
    }
    file_path.push(format!("{}.php", class));

    let content = match &cli.table {
        Some(table) => {
            let orm: OrmFlavor = cli.orm.parse()?;
            let settings = AppSettings::load(Path::new(&cli.config))?;
            let connection =
                ConnectionResolver::resolve(cli.database.as_deref(), cli.plugin.as_deref(), &settings)
                    .await?;

            let options = InferOptions {
                exclude_columns: orm.default_excluded_columns(),
                with_scenes: cli.scenes.is_some(),
                scenes: cli.scenes.clone().unwrap_or_default(),
            };
            let result =
                GeneratorService::infer_from_table(connection.as_ref(), table, &options).await?;

            println!("Table:   {}", table);
            println!("Rules:   {}", result.rules.len());
            println!("Scenes:  {}", result.scenes.len());
            ValidatorClassRenderer::render_result(&namespace, &class, &result)
        }
        None => {
            info!("No table given, generating empty validator skeleton");
            ValidatorClassRenderer::render_result(&namespace, &class, &Default::default())
        }
    };

    ValidatorFileWriter::write(&file_path, &content, cli.force)?;
    println!("Created: {}", file_path.display());
    println!("Class:   {}\\{}", namespace, class);
    Ok(())
}

/// 输出根目录：默认 app/validation；-p 时为 plugin/<p>/app/validation；
/// -P 显式指定时必须是相对路径，且与 -p 不冲突
fn resolve_base_dir(plugin: Option<&str>, path: Option<&str>) -> Result<PathBuf> {
    let plugin = plugin.map(str::trim).filter(|p| !p.is_empty());
    let path = path.map(str::trim).filter(|p| !p.is_empty());

    if let Some(path) = path {
        if Path::new(path).is_absolute() {
            return Err(AppError::InvalidInput(format!(
                "Output path must be relative: {}",
                path
            )));
        }
        if let Some(plugin) = plugin {
            let prefix = format!("plugin/{}/", plugin);
            if !path.replace('\\', "/").starts_with(&prefix) {
                return Err(AppError::InvalidInput(format!(
                    "Path {} conflicts with plugin {} (expected prefix {})",
                    path, plugin, prefix
                )));
            }
        }
        return Ok(PathBuf::from(path));
    }

    Ok(match plugin {
        Some(plugin) => PathBuf::from(format!("plugin/{}/app/validation", plugin)),
        None => PathBuf::from("app/validation"),
    })
}

/// PHP 命名空间跟着目录走：路径分隔符换成反斜杠，再接上名称里的目录段
fn namespace_for(base: &Path, dirs: &[String]) -> String {
    let mut segments: Vec<String> = base
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    segments.extend(dirs.iter().cloned());
    segments.join("\\")
}
