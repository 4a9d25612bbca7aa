use std::path::PathBuf;

use clap::Parser;
use clap::ValueEnum;

/// Output format for the displayed page
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// gridstore - replay table actions against a definition and a payload
#[derive(Parser, Debug)]
#[command(name = "gridstore")]
#[command(version)]
#[command(about = "Load a table definition, replay actions and print the result", long_about = None)]
pub struct Cli {
    /// Table definition (JSON)
    #[arg(short = 'd', long = "definition")]
    pub definition: PathBuf,

    /// Payload to serve instead of reading the definition's url
    #[arg(long = "data")]
    pub data: Option<PathBuf>,

    /// Actions to replay after the initial load (JSON array of wire actions)
    #[arg(short = 'a', long = "actions")]
    pub actions: Option<PathBuf>,

    /// Store configuration (JSON)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Instance id the table is registered under
    #[arg(long = "id", default_value = "table")]
    pub id: String,

    /// Query parameters sent with the initial request (JSON object)
    #[arg(long = "filters")]
    pub filters: Option<String>,

    /// Output format
    #[arg(long = "format", default_value = "table")]
    pub format: OutputFormat,

    /// Log file (defaults to the platform cache directory)
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let cli = Cli::try_parse_from(["gridstore", "--definition", "def.json"]).unwrap();
        assert_eq!(cli.definition, PathBuf::from("def.json"));
        assert_eq!(cli.id, "table");
        assert_eq!(cli.format, OutputFormat::Table);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_full() {
        let cli = Cli::try_parse_from([
            "gridstore",
            "-d",
            "def.json",
            "--data",
            "rows.json",
            "-a",
            "script.json",
            "--id",
            "devices",
            "--format",
            "json",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.data, Some(PathBuf::from("rows.json")));
        assert_eq!(cli.actions, Some(PathBuf::from("script.json")));
        assert_eq!(cli.id, "devices");
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.verbose);
    }

    #[test]
    fn test_definition_is_required() {
        assert!(Cli::try_parse_from(["gridstore"]).is_err());
    }
}
