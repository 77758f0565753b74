use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "netatmo-collector")]
#[command(about = "Collect Netatmo public weather station readings into InfluxDB")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        help = "Configuration file [default: config.json]"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the configured area, normalize the readings and push them to the backend
    Collect {
        #[arg(short, long, help = "Hide the progress spinner")]
        quiet: bool,
    },

    /// Normalize a saved getpublicdata response without touching any backend
    Parse {
        #[arg(short, long, help = "JSON file with a getpublicdata response or a station array")]
        input: PathBuf,

        #[arg(long, help = "Reference time in seconds since the epoch [default: now]")]
        now: Option<i64>,
    },

    /// Validate the configuration and print it without secrets
    CheckConfig,
}

impl Commands {
    /// Whether the command talks to the Netatmo API.
    pub fn needs_remote(&self) -> bool {
        matches!(self, Commands::Collect { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collect() {
        let cli =
            Cli::try_parse_from(["netatmo-collector", "collect", "-c", "conf.json", "-v"])
                .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("conf.json")));
        assert!(matches!(cli.command, Commands::Collect { quiet: false }));
        assert!(cli.command.needs_remote());
    }

    #[test]
    fn test_parse_parse_command() {
        let cli = Cli::try_parse_from([
            "netatmo-collector",
            "parse",
            "--input",
            "stations.json",
            "--now",
            "1574079600",
        ])
        .unwrap();

        match cli.command {
            Commands::Parse { input, now } => {
                assert_eq!(input, PathBuf::from("stations.json"));
                assert_eq!(now, Some(1_574_079_600));
            }
            _ => panic!("expected parse command"),
        }
    }

    #[test]
    fn test_check_config() {
        let cli = Cli::try_parse_from(["netatmo-collector", "check-config"]).unwrap();
        assert!(!cli.command.needs_remote());
    }
}
