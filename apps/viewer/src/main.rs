use binder_core::LayoutMode;
use binder_viewer::RunOptions;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "binder-viewer")]
#[command(about = "Lay out a binder file as pages of card faces", long_about = None)]
struct Cli {
    /// Binder specification file
    binder: PathBuf,

    /// JSON card catalog used to resolve lookups
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Page to print (repeatable, 1-based)
    #[arg(long = "page")]
    pages: Vec<usize>,

    /// Skip the local cache
    #[arg(long)]
    no_cache: bool,

    /// Override the layout (2x2, 3x3, 4x3, 4x4)
    #[arg(long, value_parser = parse_layout)]
    layout: Option<LayoutMode>,
}

fn parse_layout(token: &str) -> Result<LayoutMode, String> {
    LayoutMode::from_token(token).ok_or_else(|| format!("unknown layout '{token}'"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    binder_viewer::run(RunOptions {
        binder: cli.binder,
        catalog: cli.catalog,
        pages: cli.pages,
        no_cache: cli.no_cache,
        layout: cli.layout,
    })
}
