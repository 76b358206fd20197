use anyhow::Result;
use changelog_core::{render, GraphBuilder, Repository};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "changelog")]
#[command(about = "Render a Markdown changelog for a range of commits", long_about = None)]
struct Cli {
    /// Repository name used to build links, e.g. "owner/repo"
    repo_name: String,
    /// Start of the commit range (exclusive)
    from: String,
    /// End of the commit range (inclusive)
    to: String,
    /// Path to the repository (discovered from the environment if omitted)
    #[arg(long)]
    path: Option<PathBuf>,
    /// Walk the range in topological order instead of libgit2's natural order
    #[arg(long)]
    topo_order: bool,
    /// Emit the change list as JSON instead of Markdown
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!("Generating changelog for range {}..{}", cli.from, cli.to);

    let repo = match &cli.path {
        Some(path) => Repository::open(path)?,
        None => Repository::open_from_env()?,
    };

    let walk = repo.walk_range(&cli.from, &cli.to, cli.topo_order)?;
    let changes = GraphBuilder::build(walk);

    // The rendered document goes to stdout as one blob; everything else in
    // this program writes to stderr.
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&changes)?);
    } else {
        print!("{}", render(&cli.repo_name, &cli.from, &cli.to, &changes));
    }

    Ok(())
}
