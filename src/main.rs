use anyhow::Result;
use clap::Parser;

use git_guide::cli::{Command, RootArgs};
use git_guide::config::Config;
use git_guide::geocode::NominatimGeocoder;
use git_guide::index;
use git_guide::tracker::GitHubTracker;
use git_guide::workflow;

fn main() -> Result<()> {
    init_tracing();
    let args = RootArgs::parse();
    match args.command {
        Command::Process(args) => {
            let config = Config::resolve(&args)?;
            let tracker = GitHubTracker::new(&config);
            let geocoder = NominatimGeocoder::new(config.geocoder_retries);
            workflow::run(&config, &tracker, &geocoder)?;
        }
        Command::Reindex(args) => {
            let summary = index::reindex_tree(&args.root)?;
            println!(
                "reindexed {} cities across {} countries under {}",
                summary.cities,
                summary.countries,
                args.root.display()
            );
        }
    }
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}
