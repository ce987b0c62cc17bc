mod inspect;
mod lint;
mod report;

use clap::{Parser, Subcommand};

use crate::report::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Check ARB files and report diagnostics.
    Lint {
        /// Files or glob patterns to check
        #[arg(required = true)]
        paths: Vec<String>,

        /// Template ARB file to compare against, overriding discovery
        #[arg(short, long)]
        template: Option<String>,

        /// Diagnostic codes to suppress, or "all"
        #[arg(short, long)]
        suppress: Vec<String>,

        /// Output format for the report
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Skip l10n.yaml discovery
        #[arg(long)]
        no_config: bool,
    },

    /// List the placeholders referenced by each message in a file.
    Placeholders {
        /// The ARB file to inspect
        input: String,
    },
}

fn main() {
    let args = Args::parse();

    let outcome = match args.commands {
        Commands::Lint {
            paths,
            template,
            suppress,
            format,
            no_config,
        } => lint::run(&paths, template.as_deref(), &suppress, format, no_config),
        Commands::Placeholders { input } => inspect::run(&input).map(|()| 0),
    };

    match outcome {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}
