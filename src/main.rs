use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};

mod commands;

/// unidep - Maven-style dependency resolver for Unity plugins
#[derive(Parser)]
#[command(name = "unidep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve packages and copy the artifacts into the target directory
    Resolve {
        /// Semicolon-delimited package specs (e.g. "g:a:1.0;g:b:2.+")
        #[arg(short, long)]
        packages: Option<String>,

        /// Directory to copy resolved artifacts into
        #[arg(short, long)]
        target_dir: Option<String>,

        /// Repository location (directory or URL); repeatable, in priority order
        #[arg(short, long = "repo")]
        repos: Vec<String>,

        /// Consult the machine-local repository cache
        #[arg(long, overrides_with = "no_maven_local")]
        maven_local: bool,

        /// Skip the machine-local repository cache
        #[arg(long)]
        no_maven_local: bool,

        /// Allow remote (http/https) repositories
        #[arg(long, overrides_with = "no_remote")]
        remote: bool,

        /// Skip remote (http/https) repositories
        #[arg(long)]
        no_remote: bool,

        /// Remap legacy Android support libraries to AndroidX
        #[arg(long)]
        jetifier: bool,

        /// Databinding version hint for the Jetifier
        #[arg(long)]
        data_binding_version: Option<String>,

        /// Resolve and report without copying anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Resolve {
            packages,
            target_dir,
            repos,
            maven_local,
            no_maven_local,
            remote,
            no_remote,
            jetifier,
            data_binding_version,
            dry_run,
        } => commands::resolve::run(commands::resolve::Options {
            packages,
            target_dir,
            repos,
            maven_local: flag_override(maven_local, no_maven_local),
            remote: flag_override(remote, no_remote),
            jetifier,
            data_binding_version,
            dry_run,
        }),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(),
        },
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "unidep", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn flag_override(on: bool, off: bool) -> Option<bool> {
    if on {
        Some(true)
    } else if off {
        Some(false)
    } else {
        None
    }
}
