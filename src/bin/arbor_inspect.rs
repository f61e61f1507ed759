//! Inspect a persisted decision tree.
//!
//! The feature space is read from a JSON file of the form
//! `{"names": ["age", "income", ...]}`.

use anyhow::{Context, Result, bail};
use arbor::{DecisionTree, FeatureSet, FeatureSpace, NamedFeatureSpace, TreeConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "arbor-inspect")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Print, query and explain persisted decision trees", long_about = None)]
struct Args {
    /// Persisted decision tree record
    #[arg(short, long)]
    tree: PathBuf,

    /// JSON file listing the feature names
    #[arg(short, long)]
    features: PathBuf,

    /// Optional JSON tree config (max-depth, reject-trailing-bytes)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dump the whole tree
    Print,
    /// Describe the root split
    Summary,
    /// Predict the label distribution for `name=value` pairs
    Predict { values: Vec<String> },
    /// Explain one label's probability for `name=value` pairs
    Explain {
        #[arg(short, long)]
        label: usize,

        /// Number of contributions to show
        #[arg(short = 'n', long, default_value = "10")]
        top: usize,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,

        values: Vec<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let names = std::fs::read_to_string(&args.features)
        .with_context(|| format!("reading {}", args.features.display()))?;
    let feature_space = Arc::new(NamedFeatureSpace::from_json(&names)?);

    let config = match &args.config {
        Some(path) => TreeConfig::from_json(
            &std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?,
        )?,
        None => TreeConfig::default(),
    };

    let bytes = std::fs::read(&args.tree)
        .with_context(|| format!("reading {}", args.tree.display()))?;
    let classifier = DecisionTree::from_bytes_with_config(&bytes, feature_space.clone(), &config)
        .with_context(|| format!("loading {}", args.tree.display()))?;
    info!(path = %args.tree.display(), "loaded decision tree");

    match args.command {
        Command::Print => print!("{}", classifier.print()),
        Command::Summary => println!("{}", classifier.summary()),
        Command::Predict { values } => {
            let features = parse_features(&feature_space, &values)?;
            for (label, p) in classifier.predict(&features).iter().enumerate() {
                println!("{label}\t{p:.6}");
            }
        }
        Command::Explain {
            label,
            top,
            json,
            values,
        } => {
            let features = parse_features(&feature_space, &values)?;
            let explanation = classifier.explain(&features, label, 1.0)?;
            if json {
                println!("{}", explanation.to_json()?);
            } else {
                print!("{}", explanation.print(feature_space.as_ref(), top));
            }
        }
    }
    Ok(())
}

fn parse_features(feature_space: &NamedFeatureSpace, values: &[String]) -> Result<FeatureSet> {
    let mut features = FeatureSet::new();
    for pair in values {
        let Some((name, value)) = pair.split_once('=') else {
            bail!("expected name=value, got '{pair}'");
        };
        let Some(feature) = feature_space.feature(name) else {
            bail!("unknown feature '{name}'");
        };
        let value: f32 = value
            .parse()
            .with_context(|| format!("value for '{}'", feature_space.print_feature(feature)))?;
        features.insert(feature, value);
    }
    Ok(features)
}
