use anyhow::bail;
use clap::{Subcommand, ValueEnum};
use serde_json::json;

use crate::cli::utils::{output_details, output_success};
use crate::cli::OutputFormat;
use crate::database::{accounts, schema, DatabaseManager};

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Apply the embedded schema (idempotent)")]
    Migrate,

    #[command(about = "Enable, disable or inspect row-level security")]
    Rls {
        #[arg(value_enum, help = "What to do")]
        action: RlsAction,
        #[arg(long = "table", help = "Limit to these tables (repeatable); defaults to all")]
        tables: Vec<String>,
    },

    #[command(about = "Count orphaned and inconsistent rows")]
    Check,

    #[command(about = "Delete revoked and expired auth sessions")]
    PruneSessions {
        #[arg(long, default_value_t = 0, help = "Keep sessions that ended within this many days")]
        grace_days: u16,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RlsAction {
    Enable,
    Disable,
    Status,
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::pool().await?;

    match cmd {
        DbCommands::Migrate => {
            schema::migrate(&pool).await?;
            output_success(
                output_format,
                "Schema is up to date",
                Some(json!({ "tables": schema::TABLES })),
            )
        }
        DbCommands::Rls { action: RlsAction::Status, .. } => {
            let statuses = schema::row_level_security_status(&pool).await?;
            let rows: Vec<(&str, String)> = statuses
                .iter()
                .map(|s| (s.table_name.as_str(), if s.rls_enabled { "enabled" } else { "disabled" }.to_string()))
                .collect();
            output_details(output_format, &rows, &json!({ "tables": statuses }))
        }
        DbCommands::Rls { action, tables } => {
            let enabled = matches!(action, RlsAction::Enable);
            let changed = schema::set_row_level_security(&pool, enabled, &tables).await?;
            let verb = if enabled { "enabled" } else { "disabled" };
            output_success(
                output_format,
                &format!("Row-level security {} on {} table(s)", verb, changed.len()),
                Some(json!({ "tables": changed, "enabled": enabled })),
            )
        }
        DbCommands::Check => {
            let report = schema::check_consistency(&pool).await?;
            let rows = [
                ("missing tables", report.missing_tables.join(", ")),
                ("users without profile", report.users_without_profile.to_string()),
                ("messages without session", report.messages_without_session.to_string()),
                ("messages from non-participants", report.messages_from_non_participants.to_string()),
                ("comments without post", report.comments_without_post.to_string()),
                ("approved applicants not counselors", report.approved_applicants_not_counselors.to_string()),
            ];
            output_details(output_format, &rows, &json!({ "clean": report.is_clean(), "report": report }))?;

            if !report.is_clean() {
                bail!("consistency check found problems");
            }
            Ok(())
        }
        DbCommands::PruneSessions { grace_days } => {
            let pruned = accounts::prune_sessions(&pool, i32::from(grace_days)).await?;
            output_success(
                output_format,
                &format!("Pruned {} auth session(s)", pruned),
                Some(json!({ "pruned": pruned, "graceDays": grace_days })),
            )
        }
    }
}
