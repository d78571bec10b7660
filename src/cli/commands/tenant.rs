use anyhow::{bail, Context};
use clap::Subcommand;

use crate::cli::OutputFormat;
use crate::database::manager::DatabaseManager;
use crate::database::models::Tenant;
use crate::services::{CreateTenant, TenantService, UserService};

#[derive(Subcommand)]
pub enum TenantCommands {
    #[command(about = "Create a tenant and provision its database")]
    Create {
        #[arg(long, help = "URL-safe tenant identifier")]
        slug: String,
        #[arg(long, help = "Company display name")]
        name: String,
        #[arg(long, help = "Vietnamese enterprise tax code")]
        tax_code: String,
        #[arg(long, help = "Email of the owner account")]
        owner: String,
        #[arg(long, help = "Business classification")]
        business_type: Option<String>,
    },

    #[command(about = "List all live tenants")]
    List,

    #[command(about = "Show one tenant by slug")]
    Show {
        slug: String,
    },

    #[command(about = "Soft delete a tenant; --hard also drops its database")]
    Delete {
        slug: String,
        #[arg(long, help = "Drop the tenant database as well")]
        hard: bool,
    },
}

pub async fn handle(cmd: TenantCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TenantCommands::Create { slug, name, tax_code, owner, business_type } => {
            create(slug, name, tax_code, owner, business_type, output_format).await
        }
        TenantCommands::List => list(output_format).await,
        TenantCommands::Show { slug } => show(&slug, output_format).await,
        TenantCommands::Delete { slug, hard } => delete(&slug, hard, output_format).await,
    }
}

fn print_tenant(tenant: &Tenant, output_format: OutputFormat) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(tenant)?),
        OutputFormat::Text => println!(
            "{}  {}  tax={}  db={}  step={}{}",
            tenant.slug,
            tenant.name,
            tenant.tax_code,
            tenant.database,
            tenant.onboarding_step,
            if tenant.trashed_at.is_some() { "  [trashed]" } else { "" },
        ),
    }
    Ok(())
}

async fn create(
    slug: String,
    name: String,
    tax_code: String,
    owner: String,
    business_type: Option<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let users = UserService::new().await?;
    let owner_user = users
        .find_by_email(owner.trim())
        .await?
        .with_context(|| format!("no account with email '{}'", owner))?;

    let tenants = TenantService::new().await?;
    let tenant = tenants
        .create_tenant(owner_user.id, CreateTenant { slug, name, tax_code, business_type })
        .await
        .context("tenant creation failed")?;

    print_tenant(&tenant, output_format)
}

async fn list(output_format: OutputFormat) -> anyhow::Result<()> {
    let main_pool = DatabaseManager::main_pool().await?;
    let tenants = sqlx::query_as::<_, Tenant>(
        "SELECT id, slug, name, tax_code, business_type, database, onboarding_step, \
                is_active, created_at, updated_at, trashed_at, deleted_at \
         FROM tenants WHERE deleted_at IS NULL ORDER BY created_at DESC",
    )
    .fetch_all(&main_pool)
    .await?;

    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&tenants)?);
        return Ok(());
    }

    for tenant in &tenants {
        print_tenant(tenant, output_format)?;
    }
    println!("{} tenant(s)", tenants.len());
    Ok(())
}

async fn show(slug: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let tenants = TenantService::new().await?;
    let tenant = tenants
        .get_by_slug(slug)
        .await?
        .with_context(|| format!("tenant '{}' not found", slug))?;

    print_tenant(&tenant, output_format)
}

async fn delete(slug: &str, hard: bool, output_format: OutputFormat) -> anyhow::Result<()> {
    let tenants = TenantService::new().await?;
    let tenant = tenants
        .get_by_slug(slug)
        .await?
        .with_context(|| format!("tenant '{}' not found", slug))?;

    if hard {
        if tenant.trashed_at.is_none() {
            bail!("refusing to drop database of a live tenant; soft delete '{}' first", slug);
        }

        DatabaseManager::drop_database(&tenant.database)
            .await
            .context("dropping tenant database")?;

        let main_pool = DatabaseManager::main_pool().await?;
        sqlx::query("UPDATE tenants SET deleted_at = now(), updated_at = now() WHERE id = $1")
            .bind(tenant.id)
            .execute(&main_pool)
            .await?;

        match output_format {
            OutputFormat::Json => {
                println!("{}", serde_json::json!({ "slug": slug, "deleted": "hard" }))
            }
            OutputFormat::Text => println!("Tenant '{}' deleted, database dropped", slug),
        }
        return Ok(());
    }

    let trashed = tenants.soft_delete(tenant.id).await?;
    print_tenant(&trashed, output_format)
}
