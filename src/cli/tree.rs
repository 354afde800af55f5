use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::matrix::Convention;
use crate::parsing::phylip::parse_phylip_file;
use crate::tree::upgma;

#[derive(Args)]
pub struct TreeArgs {
    /// PHYLIP-style matrix written by a comparison run
    pub input: PathBuf,

    /// Newick output file (default: standard output)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Convention the matrix was written with
    #[arg(long, value_enum, default_value_t)]
    pub convention: Convention,
}

/// Build a UPGMA tree from a matrix file and print or save it as Newick.
///
/// # Errors
///
/// Returns an error if the matrix cannot be read or the output cannot be written.
pub fn run(args: TreeArgs) -> anyhow::Result<()> {
    let mut matrix = parse_phylip_file(&args.input)
        .with_context(|| format!("Failed to read matrix {}", args.input.display()))?;

    if args.convention == Convention::Similarity {
        for row in &mut matrix.rows {
            for value in row.iter_mut() {
                *value = 1.0 - *value;
            }
        }
    }

    let tree = upgma(&matrix)?;
    info!(
        "Built UPGMA tree over {} taxa, height {:.6}",
        tree.leaf_count(),
        tree.height()
    );

    let newick = tree.to_newick();
    match &args.output {
        Some(path) => std::fs::write(path, format!("{newick}\n"))
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{newick}"),
    }
    Ok(())
}
