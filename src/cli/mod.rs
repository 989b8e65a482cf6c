pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mindcare")]
#[command(about = "MindCare CLI - database maintenance and server checks for the MindCare API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Schema migration, row-level security, consistency checks and session pruning")]
    Db {
        #[command(subcommand)]
        cmd: commands::db::DbCommands,
    },

    #[command(about = "User account administration")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Check a running API server")]
    Server {
        #[command(subcommand)]
        cmd: commands::server::ServerCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Db { cmd } => commands::db::handle(cmd, output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, output_format).await,
        Commands::Server { cmd } => commands::server::handle(cmd, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_nested_subcommands() {
        let cli = Cli::try_parse_from(["mindcare", "--json", "user", "set-role", "a@b.co", "counselor"]).unwrap();
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
        assert!(matches!(cli.command, Commands::User { .. }));

        let cli = Cli::try_parse_from(["mindcare", "db", "rls", "enable", "--table", "users"]).unwrap();
        assert!(matches!(cli.command, Commands::Db { .. }));
    }

    #[test]
    fn prune_sessions_defaults_to_no_grace() {
        let cli = Cli::try_parse_from(["mindcare", "db", "prune-sessions"]).unwrap();
        let Commands::Db { cmd: commands::db::DbCommands::PruneSessions { grace_days } } = cli.command else {
            panic!("expected db prune-sessions");
        };
        assert_eq!(grace_days, 0);

        assert!(Cli::try_parse_from(["mindcare", "db", "prune-sessions", "--grace-days", "-1"]).is_err());
    }
}
