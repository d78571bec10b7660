use anyhow::Context;
use clap::Subcommand;

use crate::chart;
use crate::cli::OutputFormat;
use crate::database::manager::DatabaseManager;
use crate::services::{ChartService, TenantService};

#[derive(Subcommand)]
pub enum ChartCommands {
    #[command(about = "Import an account catalog into a tenant (built-in TT-133 by default)")]
    Import {
        #[arg(long, help = "Tenant slug")]
        tenant: String,
        #[arg(long, help = "YAML catalog file; omit for the built-in TT-133 catalog")]
        file: Option<std::path::PathBuf>,
    },
}

pub async fn handle(cmd: ChartCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ChartCommands::Import { tenant, file } => import(&tenant, file, output_format).await,
    }
}

async fn import(
    tenant_slug: &str,
    file: Option<std::path::PathBuf>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let catalog = match file {
        Some(path) => {
            let source = std::fs::read_to_string(&path)
                .with_context(|| format!("reading catalog file {}", path.display()))?;
            chart::parse_catalog_yaml(&source).context("parsing catalog YAML")?
        }
        None => chart::builtin_catalog(),
    };

    let tenants = TenantService::new().await?;
    let tenant = tenants
        .get_by_slug(tenant_slug)
        .await?
        .with_context(|| format!("tenant '{}' not found", tenant_slug))?;

    let pool = DatabaseManager::tenant_pool(&tenant.database).await?;
    let summary = ChartService::new(pool)
        .import_catalog(&catalog)
        .await
        .context("catalog import failed")?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => println!(
            "Imported catalog into '{}': {} inserted, {} skipped",
            tenant_slug, summary.inserted, summary.skipped
        ),
    }

    Ok(())
}
