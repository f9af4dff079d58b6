//! CLI command definitions using clap.
//!
//! - list: every tool with its description
//! - schema: function-calling definitions
//! - call: invoke one tool with JSON arguments

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// wacloud - WhatsApp Cloud API tools from the command line
#[derive(Parser, Debug)]
#[command(name = "wacloud")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available tools
    List {
        /// Only tools whose name contains this text
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Print tool definitions as function-calling JSON
    Schema {
        /// Tool name; all tools when omitted
        name: Option<String>,
    },

    /// Call a tool and print its JSON result
    Call {
        /// Tool name
        name: String,

        /// Arguments as a JSON object
        #[arg(short, long, conflicts_with = "args_file")]
        args: Option<String>,

        /// Read arguments from a JSON file
        #[arg(long)]
        args_file: Option<PathBuf>,

        /// Write downloaded media bytes to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["wacloud"]).is_err());
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::try_parse_from(["wacloud", "list", "-v", "-c", "/tmp/wacloud.yml"]).unwrap();
        assert!(cli.is_verbose());
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/wacloud.yml")));
    }

    #[test]
    fn test_list_filter() {
        let cli = Cli::try_parse_from(["wacloud", "list", "--filter", "qr"]).unwrap();
        match cli.command {
            Commands::List { filter } => assert_eq!(filter.as_deref(), Some("qr")),
            _ => panic!("Expected list command"),
        }
    }

    #[test]
    fn test_schema_optional_name() {
        let cli = Cli::try_parse_from(["wacloud", "schema"]).unwrap();
        assert!(matches!(cli.command, Commands::Schema { name: None }));

        let cli = Cli::try_parse_from(["wacloud", "schema", "get_flow"]).unwrap();
        assert!(matches!(cli.command, Commands::Schema { name: Some(ref n) } if n == "get_flow"));
    }

    #[test]
    fn test_call_with_args() {
        let cli = Cli::try_parse_from([
            "wacloud",
            "call",
            "download_media",
            "--args",
            r#"{"mediaUrl":"m1"}"#,
            "-o",
            "out.jpg",
        ])
        .unwrap();
        match cli.command {
            Commands::Call {
                name,
                args,
                args_file,
                output,
            } => {
                assert_eq!(name, "download_media");
                assert_eq!(args.as_deref(), Some(r#"{"mediaUrl":"m1"}"#));
                assert!(args_file.is_none());
                assert_eq!(output, Some(PathBuf::from("out.jpg")));
            }
            _ => panic!("Expected call command"),
        }
    }

    #[test]
    fn test_call_args_sources_conflict() {
        let result = Cli::try_parse_from(["wacloud", "call", "get_flow", "--args", "{}", "--args-file", "a.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_help_works() {
        Cli::command().debug_assert();
    }
}
