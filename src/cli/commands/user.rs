use anyhow::{anyhow, Context};
use clap::Subcommand;
use serde_json::json;

use crate::auth::normalize_email;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::models::Role;
use crate::database::{accounts, profiles, DatabaseManager};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Change a user's role (e.g. bootstrap the first admin)")]
    SetRole {
        #[arg(help = "Account email")]
        email: String,
        #[arg(help = "patient, counselor, nurse or admin")]
        role: String,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::SetRole { email, role } => {
            let role: Role = role.parse()?;
            let email = normalize_email(&email);

            let pool = DatabaseManager::pool().await?;
            let account = accounts::find_by_email(&pool, &email)
                .await?
                .ok_or_else(|| anyhow!("no account with email {}", email))?;

            let mut tx = DatabaseManager::begin().await?;
            profiles::set_role(&mut *tx, account.id, role)
                .await
                .with_context(|| format!("failed to update role for {}", email))?;
            tx.commit().await?;

            tracing::info!("Role of {} set to {} from the CLI", account.id, role);
            output_success(
                output_format,
                &format!("{} is now {}", email, role),
                Some(json!({ "user_id": account.id, "email": email, "role": role })),
            )
        }
    }
}
