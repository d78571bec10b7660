use anyhow::Context;
use clap::Subcommand;
use sqlx::Executor;

use crate::cli::OutputFormat;
use crate::config;
use crate::database::manager::DatabaseManager;

const REGISTRY_SCHEMA: &str = include_str!("../../../schema/registry.sql");
const TENANT_TEMPLATE_SCHEMA: &str = include_str!("../../../schema/tenant_template.sql");

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Create the registry schema and the tenant template database")]
    Init,

    #[command(about = "Check database connectivity")]
    Ping,
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        DbCommands::Init => init(output_format).await,
        DbCommands::Ping => ping(output_format).await,
    }
}

async fn init(output_format: OutputFormat) -> anyhow::Result<()> {
    let db_config = &config::config().database;

    // Registry database and schema
    let created_registry = DatabaseManager::create_database_if_missing(&db_config.system_db_name)
        .await
        .context("creating registry database")?;

    let main_pool = DatabaseManager::main_pool().await.context("connecting to registry")?;
    main_pool
        .execute(REGISTRY_SCHEMA)
        .await
        .context("applying registry schema")?;

    // Template database and business schema
    let created_template = DatabaseManager::create_database_if_missing(&db_config.template_db_name)
        .await
        .context("creating template database")?;

    let template_pool = DatabaseManager::tenant_pool(&db_config.template_db_name)
        .await
        .context("connecting to template database")?;
    template_pool
        .execute(TENANT_TEMPLATE_SCHEMA)
        .await
        .context("applying tenant template schema")?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({
                "registry": db_config.system_db_name,
                "registry_created": created_registry,
                "template": db_config.template_db_name,
                "template_created": created_template,
            })
        ),
        OutputFormat::Text => {
            println!(
                "Registry '{}' {}",
                db_config.system_db_name,
                if created_registry { "created" } else { "already present" }
            );
            println!(
                "Template '{}' {}",
                db_config.template_db_name,
                if created_template { "created" } else { "already present" }
            );
        }
    }

    Ok(())
}

async fn ping(output_format: OutputFormat) -> anyhow::Result<()> {
    DatabaseManager::health_check().await.context("registry unreachable")?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "database": "ok" })),
        OutputFormat::Text => println!("Database: ok"),
    }

    Ok(())
}
