//! Stream Features CLI - classify stream network nodes from GeoJSON lines

mod cli;
mod geojson;

use clap::Parser;

fn main() {
    let cli_args = cli::Cli::parse();

    let app = cli::StreamFeaturesApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
