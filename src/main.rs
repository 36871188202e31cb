use assetmig::cli::{Cli, Commands};
use assetmig::output::Printer;
use clap::Parser;
use miette::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG overrides the level picked here
    if !cli.quiet {
        env_logger::Builder::new()
            .filter_level(if cli.verbose {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Warn
            })
            .parse_default_env()
            .init();
    }

    let printer = Printer::new().with_verbose(cli.verbose);

    match cli.command {
        Commands::Migrate(args) => {
            assetmig::cli::migrate::run(args, &printer)?;
        }
        Commands::Validate(args) => {
            assetmig::cli::validate::run(args, &printer)?;
        }
        Commands::Report(args) => {
            assetmig::cli::report::run(args, &printer)?;
        }
        Commands::Slice(args) => {
            assetmig::cli::slice::run(args, &printer)?;
        }
        Commands::Init(args) => assetmig::cli::init::run(args, &printer)?,
        Commands::Completions(args) => assetmig::cli::completions::run(args)?,
    }

    Ok(())
}
