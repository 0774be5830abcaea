//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};

/// Queue-triggered check image generator.
#[derive(Parser, Debug)]
#[command(name = "checkgen", version, about)]
pub struct Cli {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// What to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run as an Azure Functions custom handler for the `checksQueue` trigger.
    Serve {
        /// Listening port (defaults to `FUNCTIONS_CUSTOMHANDLER_PORT`, then config).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Render one check to a PNG file without storing it anywhere.
    Render {
        /// Amount text to draw on the check.
        #[arg(conflicts_with = "amount_file")]
        amount: Option<String>,

        /// Path to a file containing the amount text.
        #[arg(short = 'a', long, conflicts_with = "amount")]
        amount_file: Option<String>,

        /// Output file path (timestamped name if not specified).
        #[arg(short, long)]
        output: Option<String>,

        /// Font file override.
        #[arg(short, long)]
        font: Option<String>,
    },
}

/// Resolve the amount from either the positional argument or the file flag.
///
/// # Errors
///
/// Returns an error if neither amount nor amount-file is provided,
/// or if the file cannot be read.
pub fn resolve_amount(
    amount: Option<&str>,
    amount_file: Option<&str>,
) -> Result<String, std::io::Error> {
    if let Some(text) = amount {
        Ok(text.to_string())
    } else if let Some(path) = amount_file {
        std::fs::read_to_string(path)
    } else {
        Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Provide an amount string or use -a/--amount-file",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_with_port() {
        let cli = Cli::parse_from(["checkgen", "serve", "--port", "7071"]);
        assert!(matches!(cli.command, Command::Serve { port: Some(7071) }));
        assert!(cli.config.is_none());
    }

    #[test]
    fn render_positional_amount() {
        let cli = Cli::parse_from(["checkgen", "render", "$1,234.56", "-o", "out.png"]);
        match cli.command {
            Command::Render { amount, amount_file, output, font } => {
                assert_eq!(amount.as_deref(), Some("$1,234.56"));
                assert!(amount_file.is_none());
                assert_eq!(output.as_deref(), Some("out.png"));
                assert!(font.is_none());
                assert_eq!(resolve_amount(amount.as_deref(), None).unwrap(), "$1,234.56");
            }
            Command::Serve { .. } => panic!("expected render"),
        }
    }

    #[test]
    fn global_config_after_subcommand() {
        let cli = Cli::parse_from(["checkgen", "serve", "--config", "/tmp/c.toml"]);
        assert_eq!(cli.config.as_deref(), Some("/tmp/c.toml"));
    }

    #[test]
    fn amount_file_flag() {
        let dir = std::env::temp_dir().join("checkgen_cli_amount_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("amount.txt");
        std::fs::write(&path, "$42.00").unwrap();

        assert_eq!(resolve_amount(None, Some(path.to_str().unwrap())).unwrap(), "$42.00");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn no_amount_errors() {
        assert!(resolve_amount(None, None).is_err());
    }

    #[test]
    fn conflicting_amount_sources_rejected() {
        let result = Cli::try_parse_from(["checkgen", "render", "$1", "-a", "amount.txt"]);
        assert!(result.is_err());
    }
}
