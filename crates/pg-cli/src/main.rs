//! pg - part generator command line
//!
//! Builds part requests stored as RON against the CSG-tree kernel and
//! reports the result.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

use pg_cad::{
    Adjustment, AppliedTreatment, BuildConfig, CsgTreeKernel, DocumentContext, GeometryKernel,
    KernelStats, Part,
};
use pg_parts::{GENERATORS, PartRequest};

#[derive(Parser)]
#[command(name = "pg")]
#[command(about = "Parametric generator for 3D-printable machine parts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a part request
    Build {
        /// RON request file
        request: PathBuf,
        /// RON build configuration (defaults when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the default build configuration
    Config {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List available generators
    List,
    /// Print a request with default parameters for a generator
    Template {
        /// Generator name, as shown by `pg list`
        generator: String,
    },
}

/// Summary of one build
#[derive(Serialize)]
struct BuildReport {
    name: String,
    generator: &'static str,
    kernel: String,
    bounds_min: [f64; 3],
    bounds_max: [f64; 3],
    size: [f64; 3],
    hole_count: usize,
    edge_treatment: Option<AppliedTreatment>,
    adjustments: Vec<Adjustment>,
    warnings: Vec<String>,
    kernel_stats: KernelStats,
}

impl BuildReport {
    fn new(request: &PartRequest, kernel: &CsgTreeKernel, part: Part) -> Self {
        Self {
            name: part.name,
            generator: request.kind_name(),
            kernel: kernel.name().to_string(),
            bounds_min: part.bounds.min.to_array(),
            bounds_max: part.bounds.max.to_array(),
            size: part.bounds.size().to_array(),
            hole_count: part.hole_count,
            edge_treatment: part.edge_treatment,
            adjustments: part.diagnostics.adjustments,
            warnings: part.diagnostics.warnings,
            kernel_stats: kernel.stats(),
        }
    }

    fn print(&self) {
        println!("{} ({})", self.name, self.generator);
        println!(
            "  size:   {:.3} x {:.3} x {:.3} mm",
            self.size[0], self.size[1], self.size[2]
        );
        println!(
            "  bounds: [{:.3}, {:.3}, {:.3}] .. [{:.3}, {:.3}, {:.3}]",
            self.bounds_min[0],
            self.bounds_min[1],
            self.bounds_min[2],
            self.bounds_max[0],
            self.bounds_max[1],
            self.bounds_max[2]
        );
        println!("  holes:  {}", self.hole_count);
        match &self.edge_treatment {
            Some(t) => println!("  edges:  {:?} {} on {} edge(s)", t.mode, t.size, t.edge_count),
            None => println!("  edges:  untreated"),
        }
        for adj in &self.adjustments {
            println!(
                "  raised: {} {} -> {}",
                adj.parameter, adj.requested, adj.applied
            );
        }
        for warning in &self.warnings {
            println!("  warning: {warning}");
        }
        let s = &self.kernel_stats;
        println!(
            "  kernel: {} ({} boxes, {} cylinders, {} prisms, {} fuses, {} subtractions)",
            self.kernel, s.boxes, s.cylinders, s.prisms, s.fuses, s.subtractions
        );
    }
}

fn main() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pg_cad=info,pg_parts=info,pg_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Build {
            request,
            config,
            json,
        } => build(&request, config.as_deref(), json)?,
        Commands::Config { output } => {
            let config = BuildConfig::default();
            match output {
                Some(path) => {
                    config
                        .save(&path)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!("Wrote default configuration to {}", path.display());
                }
                None => println!("{}", config.to_ron_string()?),
            }
        }
        Commands::List => {
            for (name, description) in GENERATORS {
                println!("{name:<16} {description}");
            }
        }
        Commands::Template { generator } => {
            println!("{}", template(&generator)?.to_ron_string()?);
        }
    }
    Ok(())
}

fn build(request_path: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    let request = PartRequest::load(request_path)
        .with_context(|| format!("Failed to load request {}", request_path.display()))?;
    let config = match config_path {
        Some(path) => BuildConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => BuildConfig::default(),
    };

    let kernel = CsgTreeKernel::new();
    let ctx = DocumentContext::with_config(&kernel, config);
    let part = request
        .build(&ctx)
        .with_context(|| format!("Failed to build {}", request.name()))?;

    let report = BuildReport::new(&request, &kernel, part);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print();
    }
    Ok(())
}

fn template(generator: &str) -> Result<PartRequest> {
    let request = match generator.to_ascii_lowercase().as_str() {
        "aluprofbracket" => PartRequest::AluProfBracket(Default::default()),
        "nemaholder" => PartRequest::NemaHolder(Default::default()),
        "bearinghousing" => PartRequest::BearingHousing(Default::default()),
        "beltclamp" => PartRequest::BeltClamp(Default::default()),
        _ => anyhow::bail!("Unknown generator: {generator} (see `pg list`)"),
    };
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listed_generator_has_a_template() {
        for (name, _) in GENERATORS {
            let request = template(name).unwrap();
            assert_eq!(request.kind_name(), name);
        }
        assert!(template("gearbox").is_err());
    }

    #[test]
    fn test_sample_requests_build() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("requests");
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            let request = PartRequest::load(&path).unwrap();
            let kernel = CsgTreeKernel::new();
            let ctx = DocumentContext::new(&kernel);
            let part = request.build(&ctx).unwrap();
            let report = BuildReport::new(&request, &kernel, part);
            assert_eq!(report.kernel_stats.subtractions, 1, "{}", path.display());
            assert!(serde_json::to_string(&report).is_ok());
        }
    }
}
