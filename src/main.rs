use clap::Parser;
use tracing_subscriber::EnvFilter;

use gencore::cli::{self, Cli, Commands};
use gencore::core::types::InputFormat;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("gencore=debug,info")
    } else {
        EnvFilter::new("gencore=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Fa(args) => cli::extract::run(args, InputFormat::Fasta)?,
        Commands::Fq(args) => cli::extract::run(args, InputFormat::Fastq)?,
        Commands::Bam(args) => cli::extract::run(args, InputFormat::Bam)?,
        Commands::Read(args) => cli::extract::run(args, InputFormat::PersistedCores)?,
        Commands::Tree(args) => cli::tree::run(args)?,
    }

    Ok(())
}
