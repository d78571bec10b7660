use anyhow::{bail, Context};
use clap::Subcommand;

use crate::cli::OutputFormat;
use crate::services::UserService;
use crate::validate;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a platform account (for bootstrap and operations)")]
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
    },

    #[command(about = "Show an account by email")]
    Show {
        email: String,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Create { email, name, password } => {
            create(&email, &name, &password, output_format).await
        }
        UserCommands::Show { email } => show(&email, output_format).await,
    }
}

async fn create(
    email: &str,
    name: &str,
    password: &str,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    if let Err(msg) = validate::email(email) {
        bail!("invalid email: {msg}");
    }
    if let Err(msg) = validate::password(password) {
        bail!("invalid password: {msg}");
    }

    let users = UserService::new().await?;
    let user = users
        .register(email, name, password)
        .await
        .context("user creation failed")?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&user)?),
        OutputFormat::Text => println!("Created account {} ({})", user.email, user.id),
    }

    Ok(())
}

async fn show(email: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let users = UserService::new().await?;
    let user = users
        .find_by_email(email.trim())
        .await?
        .with_context(|| format!("no account with email '{}'", email))?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&user)?),
        OutputFormat::Text => println!(
            "{}  {}  active={}  created={}",
            user.email, user.name, user.is_active, user.created_at
        ),
    }

    Ok(())
}
