use clap::{Parser, Subcommand};

/// Job lifecycle tracking service
#[derive(Debug, Parser)]
#[command(name = "job-ledger", version)]
pub struct Cli {
    /// Override the HOST environment variable
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Override the PORT environment variable
    #[arg(long, global = true)]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default() {
        let cli = Cli::parse_from(["job-ledger"]);
        assert_eq!(cli.command(), Command::Serve);
    }

    #[test]
    fn migrate_with_overrides() {
        let cli = Cli::parse_from(["job-ledger", "migrate", "--port", "9090"]);
        assert_eq!(cli.command(), Command::Migrate);
        assert_eq!(cli.port, Some(9090));
        assert_eq!(cli.host, None);
    }
}
