pub mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use self::commands::{eval, outline};

#[derive(Parser)]
#[command(name = "phpintel")]
#[command(about = "PHP code intelligence evaluator", version, author)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a completion, calltip or definition trigger against a CIT blob
    Eval {
        /// The CIT blob (JSON) of the current buffer
        #[arg(required = true)]
        input: PathBuf,

        /// Trigger kind (variables, functions, classes, interfaces,
        /// members, static-members, calltip, defn)
        #[arg(short, long)]
        trigger: String,

        /// The trigger expression, e.g. "parent.foo" or "strp"
        #[arg(short, long, default_value = "")]
        expr: String,

        /// Start scope as a dotted path into the blob (defaults to global)
        #[arg(short, long)]
        scope: Option<String>,

        /// Stdlib blob (JSON) with the builtins
        #[arg(long)]
        stdlib: Option<PathBuf>,

        /// Federation blobs (JSON). Multiple allowed.
        #[arg(long = "lib", value_name = "FILE", num_args = 0..)]
        libs: Vec<PathBuf>,

        /// Optional evaluator config file (JSON/TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format: json (compact) or pretty-json (default)
        #[arg(long, value_parser = ["json", "pretty-json"], default_value = "pretty-json")]
        format: String,
    },

    /// Print the symbol outline of a CIT blob
    Outline {
        /// The CIT blob (JSON) to outline
        #[arg(required = true)]
        input: PathBuf,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Eval {
            input,
            trigger,
            expr,
            scope,
            stdlib,
            libs,
            config,
            format,
        } => eval::execute(input, trigger, expr, scope, stdlib, libs, config, format),

        Commands::Outline { input } => outline::execute(input),
    }
}
