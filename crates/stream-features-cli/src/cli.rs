//! Command-line interface for the stream-features utility
//!
//! Reads a GeoJSON line layer, extracts and associates endpoint nodes, and
//! writes the classified nodes as GeoJSON points or a text table.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use crate::geojson::{nodes_to_geojson, nodes_to_table, parse_lines};
use stream_features::core::logging::{init_logging, LOG_FORMAT_ENV, LOG_LEVEL_ENV};
use stream_features::{
    extract_nodes, AnalysisConfig, AssociationConfig, FeatureKind, IndexStrategy, Pipeline,
    DEFAULT_SQUARED_DISTANCE_THRESHOLD,
};

/// Stream Features - classify the endpoints of a stream line network
#[derive(Parser)]
#[command(name = "stream-features")]
#[command(about = "Extract and classify stream network nodes from GeoJSON line features")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// Output encodings for the node table
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Point FeatureCollection
    #[default]
    Geojson,
    /// Tab-separated text
    Table,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract, associate, and classify endpoint nodes
    Extract {
        /// Input GeoJSON file with LineString features (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Squared distance threshold for association
        #[arg(
            short,
            long,
            allow_negative_numbers = true,
            default_value_t = DEFAULT_SQUARED_DISTANCE_THRESHOLD,
            conflicts_with = "distance"
        )]
        threshold: f64,

        /// Linear association distance, squared before use
        #[arg(short, long)]
        distance: Option<f64>,

        /// Identify operations to run (defaults to every topology classifier)
        #[arg(short, long, value_delimiter = ',')]
        classify: Vec<FeatureKind>,

        /// Spatial index used for neighbor lookups
        #[arg(long, default_value_t = IndexStrategy::Grid)]
        strategy: IndexStrategy,

        /// Associate nodes on all cores
        #[arg(long)]
        parallel: bool,

        /// Feature property holding the line id
        #[arg(long, default_value = "id")]
        id_field: String,

        /// Output encoding
        #[arg(long, value_enum, default_value_t = OutputFormat::Geojson)]
        format: OutputFormat,
    },

    /// Show available identify operations
    Classifiers {
        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Validate that the input is a well-formed line layer
    Validate {
        /// Input file to validate (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Feature property holding the line id
        #[arg(long, default_value = "id")]
        id_field: String,
    },
}

/// Settings for one extract run, as parsed from the command line
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub threshold: f64,
    pub distance: Option<f64>,
    pub classify: Vec<FeatureKind>,
    pub strategy: IndexStrategy,
    pub parallel: bool,
}

impl ExtractOptions {
    /// Build the analysis config these options describe
    pub fn analysis_config(&self) -> AnalysisConfig {
        let association = match self.distance {
            Some(distance) => AssociationConfig::from_distance(distance),
            None => AssociationConfig::new(self.threshold),
        }
        .with_strategy(self.strategy)
        .with_parallel(self.parallel);

        let config = AnalysisConfig::new(association);
        if self.classify.is_empty() {
            config
        } else {
            config.with_features(self.classify.iter().copied())
        }
    }
}

/// Main CLI application
#[derive(Debug, Default)]
pub struct StreamFeaturesApp;

impl StreamFeaturesApp {
    pub fn new() -> Self {
        Self
    }

    /// Run the application with the given CLI arguments
    pub fn run(&self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over CLI flags
        let log_level_str = std::env::var(LOG_LEVEL_ENV)
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| cli.log_level.as_str().to_string());
        let log_format_str = std::env::var(LOG_FORMAT_ENV)
            .ok()
            .unwrap_or_else(|| cli.log_format.as_str().to_string());

        if let Err(e) = init_logging(Some(&log_level_str), Some(&log_format_str)) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("stream-features v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Extract {
                input,
                output,
                threshold,
                distance,
                classify,
                strategy,
                parallel,
                id_field,
                format,
            } => {
                let options = ExtractOptions {
                    threshold,
                    distance,
                    classify,
                    strategy,
                    parallel,
                };
                self.extract_command(input, output, &options, &id_field, format, cli.verbose)
            }
            Commands::Classifiers { json } => self.classifiers_command(json, cli.verbose),
            Commands::Validate { input, id_field } => {
                self.validate_command(input, &id_field, cli.verbose)
            }
        }
    }

    /// Handle the extract command
    fn extract_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        options: &ExtractOptions,
        id_field: &str,
        format: OutputFormat,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        let rendered = self.extract(&content, options, id_field, format)?;
        self.write_output(output, &rendered)
    }

    /// Run the full pipeline over GeoJSON text and render the result
    pub fn extract(
        &self,
        content: &str,
        options: &ExtractOptions,
        id_field: &str,
        format: OutputFormat,
    ) -> Result<String> {
        let lines = parse_lines(content, id_field)?;
        let store = Pipeline::new(options.analysis_config()).run(&lines)?;

        match format {
            OutputFormat::Geojson => nodes_to_geojson(&store),
            OutputFormat::Table => Ok(nodes_to_table(&store)),
        }
    }

    /// Handle the classifiers command
    fn classifiers_command(&self, json: bool, verbose: bool) -> Result<()> {
        if verbose {
            eprintln!("Listing identify operations");
        }
        println!("{}", self.classifiers_listing(json)?);
        Ok(())
    }

    /// Describe every identify operation, as JSON or human-readable text
    pub fn classifiers_listing(&self, json: bool) -> Result<String> {
        let supported = FeatureKind::ALL
            .iter()
            .filter(|kind| kind.is_supported())
            .count();

        if json {
            let classifiers: Vec<_> = FeatureKind::ALL
                .iter()
                .map(|kind| {
                    let status = if kind.is_supported() {
                        "supported"
                    } else {
                        "not supported"
                    };
                    serde_json::json!({
                        "name": kind.name(),
                        "description": kind.description(),
                        "status": status,
                    })
                })
                .collect();
            let listing = serde_json::json!({
                "classifiers": classifiers,
                "total": FeatureKind::ALL.len(),
                "supported": supported,
            });
            return Ok(serde_json::to_string_pretty(&listing)?);
        }

        let mut out = String::from("Identify operations:\n");
        for kind in FeatureKind::ALL {
            let marker = if kind.is_supported() { "" } else { " (not supported)" };
            out.push_str(&format!(
                "  {:<18} - {}{}\n",
                kind.name(),
                kind.description(),
                marker
            ));
        }
        out.push_str(&format!(
            "\nTotal: {} of {} supported",
            supported,
            FeatureKind::ALL.len()
        ));
        Ok(out)
    }

    /// Handle the validate command
    fn validate_command(&self, input: Option<PathBuf>, id_field: &str, verbose: bool) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        match self.validate(&content, id_field) {
            Ok(line_count) => {
                println!("✓ Valid line layer with {} lines", line_count);
                Ok(())
            }
            Err(e) => {
                println!("✗ Invalid line layer: {:#}", e);
                Err(e)
            }
        }
    }

    /// Check the input parses as a line layer and every line yields two nodes
    pub fn validate(&self, content: &str, id_field: &str) -> Result<usize> {
        let lines = parse_lines(content, id_field)?;
        extract_nodes(&lines)?;
        Ok(lines.len())
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(content.as_bytes())?;
                if !content.is_empty() && !content.ends_with('\n') {
                    stdout.write_all(b"\n")?;
                }
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    const CHAIN: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"id": 1},
             "geometry": {"type": "LineString", "coordinates": [[0, 0], [10, 0]]}},
            {"type": "Feature", "properties": {"id": 2},
             "geometry": {"type": "LineString", "coordinates": [[10, 0], [20, 0]]}}
        ]
    }"#;

    fn options(threshold: f64) -> ExtractOptions {
        ExtractOptions {
            threshold,
            distance: None,
            classify: Vec::new(),
            strategy: IndexStrategy::Grid,
            parallel: false,
        }
    }

    #[test]
    fn test_cli_parsing_extract_command() {
        let args = vec![
            "stream-features",
            "extract",
            "--input",
            "lines.geojson",
            "--output",
            "nodes.geojson",
            "--threshold",
            "2.5",
            "--classify",
            "well,sink",
            "--strategy",
            "brute-force",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Extract {
                input,
                output,
                threshold,
                distance,
                classify,
                strategy,
                parallel,
                id_field,
                format,
            } => {
                assert_eq!(input.unwrap().to_string_lossy(), "lines.geojson");
                assert_eq!(output.unwrap().to_string_lossy(), "nodes.geojson");
                assert_eq!(threshold, 2.5);
                assert!(distance.is_none());
                assert_eq!(classify, vec![FeatureKind::Well, FeatureKind::Sink]);
                assert_eq!(strategy, IndexStrategy::BruteForce);
                assert!(!parallel);
                assert_eq!(id_field, "id"); // default
                assert_eq!(format, OutputFormat::Geojson); // default
            }
            _ => panic!("Expected Extract command"),
        }
    }

    #[test]
    fn test_cli_parsing_extract_defaults() {
        let cli = Cli::try_parse_from(["stream-features", "extract"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Warn);

        match cli.command {
            Commands::Extract {
                threshold,
                classify,
                strategy,
                ..
            } => {
                assert_eq!(threshold, DEFAULT_SQUARED_DISTANCE_THRESHOLD);
                assert!(classify.is_empty());
                assert_eq!(strategy, IndexStrategy::Grid);
            }
            _ => panic!("Expected Extract command"),
        }
    }

    #[test]
    fn test_cli_parsing_negative_threshold() {
        let cli =
            Cli::try_parse_from(["stream-features", "extract", "--threshold", "-1"]).unwrap();
        match cli.command {
            Commands::Extract { threshold, .. } => assert_eq!(threshold, -1.0),
            _ => panic!("Expected Extract command"),
        }
    }

    #[test]
    fn test_cli_threshold_conflicts_with_distance() {
        let args = ["stream-features", "extract", "--threshold", "4", "--distance", "2"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_classifier() {
        let args = ["stream-features", "extract", "--classify", "lake"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_parsing_classifiers_command() {
        let cli = Cli::try_parse_from(["stream-features", "classifiers", "--json"]).unwrap();
        match cli.command {
            Commands::Classifiers { json } => assert!(json),
            _ => panic!("Expected Classifiers command"),
        }
    }

    #[test]
    fn test_cli_parsing_validate_command() {
        let cli = Cli::try_parse_from(["stream-features", "validate"]).unwrap();
        match cli.command {
            Commands::Validate { input, id_field } => {
                assert!(input.is_none());
                assert_eq!(id_field, "id");
            }
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_distance_option_is_squared() {
        let mut opts = options(100.0);
        opts.distance = Some(3.0);
        let config = opts.analysis_config();
        assert_eq!(config.association.squared_distance_threshold, 9.0);
        assert_eq!(config.features, FeatureKind::TOPOLOGY.to_vec());
    }

    #[test]
    fn test_extract_geojson() {
        let app = StreamFeaturesApp::new();
        let output = app
            .extract(CHAIN, &options(1.0), "id", OutputFormat::Geojson)
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        let features = parsed["features"].as_array().unwrap();
        assert_eq!(features.len(), 4);
        assert_eq!(features[0]["properties"]["sink"], 1);
        assert_eq!(features[2]["properties"]["pseudo"], 1);
        assert_eq!(features[3]["properties"]["well"], 1);
    }

    #[test]
    fn test_extract_only_requested_labels() {
        let app = StreamFeaturesApp::new();
        let mut opts = options(1.0);
        opts.classify = vec![FeatureKind::Well];
        let output = app.extract(CHAIN, &opts, "id", OutputFormat::Geojson).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        let properties = &parsed["features"][3]["properties"];
        assert_eq!(properties["well"], 1);
        assert!(properties.get("sink").is_none());
    }

    #[test]
    fn test_extract_unsupported_classifier_fails() {
        let app = StreamFeaturesApp::new();
        let mut opts = options(1.0);
        opts.classify = vec![FeatureKind::SelfIntersection];
        let err = app
            .extract(CHAIN, &opts, "id", OutputFormat::Table)
            .unwrap_err();
        assert!(err.to_string().contains("Not supported"));
    }

    #[test]
    fn test_validate_reports_line_count() {
        let app = StreamFeaturesApp::new();
        assert_eq!(app.validate(CHAIN, "id").unwrap(), 2);
    }

    #[test]
    fn test_validate_rejects_short_line() {
        let app = StreamFeaturesApp::new();
        let input = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"id": 3},
             "geometry": {"type": "LineString", "coordinates": [[0, 0]]}}
        ]}"#;
        let err = app.validate(input, "id").unwrap_err();
        assert!(err.to_string().contains("Malformed geometry"));
    }

    #[test]
    fn test_classifiers_listing() {
        let app = StreamFeaturesApp::new();
        let text = app.classifiers_listing(false).unwrap();
        assert!(text.contains("confluence"));
        assert!(text.contains("segment-center"));
        assert!(text.contains("Total: 6 of 8 supported"));

        let json: serde_json::Value =
            serde_json::from_str(&app.classifiers_listing(true).unwrap()).unwrap();
        assert_eq!(json["total"], 8);
        assert_eq!(json["supported"], 6);
        assert_eq!(json["classifiers"][6]["status"], "not supported");
    }

    #[test]
    fn test_read_input_from_file() {
        let app = StreamFeaturesApp::new();

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("lines.geojson");
        fs::write(&file_path, CHAIN).unwrap();

        let content = app.read_input(Some(file_path)).unwrap();
        assert_eq!(content, CHAIN);
    }

    #[test]
    fn test_read_input_missing_file() {
        let app = StreamFeaturesApp::new();
        let dir = tempdir().unwrap();
        let err = app
            .read_input(Some(dir.path().join("missing.geojson")))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read input file"));
    }

    #[test]
    fn test_write_output_to_file() {
        let app = StreamFeaturesApp::new();
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("nodes.txt");

        app.write_output(Some(file_path.clone()), "id\tline_id\n").unwrap();

        let read_content = fs::read_to_string(&file_path).unwrap();
        assert_eq!(read_content, "id\tline_id\n");
    }
}
