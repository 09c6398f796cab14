mod commands;
mod csv_io;

use clap::{Parser, Subcommand, ValueEnum};
use std::process::ExitCode;
use table_diff::{ConfigError, ShapeError};

#[derive(Parser)]
#[command(name = "table-diff")]
#[command(about = "Compare and merge tabular CSV datasets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Compare two CSV files")]
    Diff {
        #[arg(help = "Path to the local/base CSV")]
        local: String,
        #[arg(help = "Path to the remote/changed CSV")]
        remote: String,
        #[arg(long, short, value_enum, default_value = "text", help = "Output format")]
        format: OutputFormat,
        #[arg(long, short, value_name = "PATH", help = "Write output to a file instead of stdout")]
        out: Option<String>,
        #[arg(long, help = "Treat row order as meaningful")]
        ordered: bool,
        #[arg(long, help = "Omit unchanged rows and columns from the output")]
        hide_unchanged: bool,
    },
    #[command(about = "Three-way merge: apply remote changes onto local")]
    Merge {
        #[arg(help = "Path to the common-ancestor CSV")]
        ancestor: String,
        #[arg(help = "Path to the local CSV")]
        local: String,
        #[arg(help = "Path to the remote CSV")]
        remote: String,
        #[arg(long, short, value_name = "PATH", help = "Where to write the merged CSV")]
        out: String,
        #[arg(long, value_name = "PATH", help = "Also write an HTML view of the three-way diff")]
        diff_out: Option<String>,
        #[arg(long, value_name = "PATH", help = "Also write the conflict records as JSON")]
        conflicts_json: Option<String>,
        #[arg(long, help = "Treat row order as meaningful")]
        ordered: bool,
    },
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Html,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Diff {
            local,
            remote,
            format,
            out,
            ordered,
            hide_unchanged,
        } => commands::diff::run(&local, &remote, format, out.as_deref(), ordered, hide_unchanged),
        Commands::Merge {
            ancestor,
            local,
            remote,
            out,
            diff_out,
            conflicts_json,
            ordered,
        } => commands::merge::run(
            &ancestor,
            &local,
            &remote,
            &out,
            diff_out.as_deref(),
            conflicts_json.as_deref(),
            ordered,
        ),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for_error(&e)
        }
    }
}

fn exit_code_for_error(err: &anyhow::Error) -> ExitCode {
    if is_input_error(err) {
        ExitCode::from(2)
    } else {
        ExitCode::from(3)
    }
}

fn is_input_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause.is::<ShapeError>()
            || cause.is::<ConfigError>()
            || cause.is::<csv::Error>()
            || cause.is::<std::io::Error>()
    })
}
