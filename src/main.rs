use clap::{Parser, Subcommand};
use lens_equiv::calculate::{CalcError, EquivalenceInput, EquivalenceResult, calculate_equivalence};
use lens_equiv::config::{self, SessionConfig};
use lens_equiv::types::{EquivalenceMethod, MatchMode, TargetState};
use lens_equiv::units::Unit;
use lens_equiv::{output, share};
use rayon::prelude::*;
use std::path::PathBuf;

/// Session flags shared by every command that computes something. Each one
/// overrides the matching `config.toml` value.
#[derive(clap::Args, Clone, Default)]
struct SessionArgs {
    /// Source format id (see `lens-equiv formats`)
    #[arg(long)]
    source_format: Option<String>,

    /// Source focal length in mm
    #[arg(long)]
    focal: Option<f64>,

    /// Source aperture as an f-number
    #[arg(long)]
    aperture: Option<f64>,

    /// Subject distance in mm; enables depth of field and blur
    #[arg(long)]
    distance: Option<f64>,

    /// Target format id
    #[arg(long)]
    target_format: Option<String>,

    /// Pin the target focal length (mm) and solve the aperture
    #[arg(long, conflicts_with = "target_aperture")]
    target_focal: Option<f64>,

    /// Pin the target aperture and solve the focal length
    #[arg(long)]
    target_aperture: Option<f64>,

    /// Dimension formats are compared on: diagonal, width, height, area
    #[arg(long)]
    method: Option<EquivalenceMethod>,

    /// What a pinned target value is matched on: blur_disc, dof
    #[arg(long)]
    match_mode: Option<MatchMode>,

    /// Display unit for lengths: mm, inches
    #[arg(long)]
    unit: Option<Unit>,
}

impl SessionArgs {
    fn apply_to(&self, config: &mut SessionConfig) {
        if let Some(id) = &self.source_format {
            config.source.format = id.clone();
        }
        if let Some(f) = self.focal {
            config.source.focal_length = f;
        }
        if let Some(n) = self.aperture {
            config.source.aperture = n;
        }
        if let Some(s) = self.distance {
            config.source.subject_distance = Some(s);
        }
        if let Some(id) = &self.target_format {
            config.target.format = id.clone();
        }
        // Pinning one target value releases the other.
        if let Some(f) = self.target_focal {
            config.target.focal_length = Some(f);
            config.target.aperture = None;
        }
        if let Some(n) = self.target_aperture {
            config.target.aperture = Some(n);
            config.target.focal_length = None;
        }
        if let Some(m) = self.method {
            config.options.equivalence_method = m;
        }
        if let Some(m) = self.match_mode {
            config.options.match_mode = m;
        }
        if let Some(u) = self.unit {
            config.options.display_unit = u;
        }
    }
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup; called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "lens-equiv")]
#[command(about = "Lens equivalence calculator across sensor and film formats")]
#[command(long_about = "\
Lens equivalence calculator across sensor and film formats

Given a lens on one format, find what gives the same picture on another:
the same field of view, and the same depth of field or background blur.

Situations:
  1  nothing pinned        focal length and aperture both scale by crop factor
  3  target focal pinned   aperture solved to match blur disc
  4  target focal pinned   aperture solved to match depth of field (--match-mode dof)
  5  target f-stop pinned  focal length solved to match blur disc
  6  target f-stop pinned  focal length solved to approximate depth of field (--match-mode dof)

Depth of field and blur need a subject distance (--distance, in mm).

Session values come from config.toml in --dir, then command-line flags.
Run 'lens-equiv gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Directory holding config.toml
    #[arg(long, default_value = ".", global = true)]
    dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute one equivalence
    Calc {
        #[command(flatten)]
        session: SessionArgs,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List every available format with its crop factor and circle of confusion
    Formats {
        /// Display unit for dimensions: mm, inches
        #[arg(long)]
        unit: Option<Unit>,
    },
    /// Compare the source against every format in the catalog
    Table(SessionArgs),
    /// Print a share string for the session
    Share(SessionArgs),
    /// Compute a session from a share string
    Open {
        /// Query string, e.g. 'sf=full-frame-35mm&sl=50&sa=1.4&tf=four-thirds'
        query: String,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Command::Calc { session, json } => {
            let config = load_session(&cli, session)?;
            let result = calculate(&config)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                output::print_equivalence_output(&result, config.options.display_unit);
            }
        }
        Command::Formats { unit } => {
            let config = config::load_config(&cli.dir)?;
            let unit = unit.unwrap_or(config.options.display_unit);
            output::print_catalog_output(&config.catalog(), unit);
        }
        Command::Table(session) => {
            let config = load_session(&cli, session)?;
            init_thread_pool(&config.processing);
            let rows = calculate_table(&config)?;
            output::print_table_output(&rows, config.options.display_unit);
        }
        Command::Share(session) => {
            let config = load_session(&cli, session)?;
            // Fail on an unknown format id here rather than in the recipient's hands.
            calculate(&config)?;
            println!(
                "{}",
                share::serialize_share_params(
                    &config.source_state(),
                    &config.target_state(),
                    &config.options,
                    &config.catalog(),
                )
            );
        }
        Command::Open { query, json } => {
            let local = config::load_config(&cli.dir)?;
            let config = share::open_share(query, &local);
            config.validate()?;
            let result = calculate(&config)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                output::print_equivalence_output(&result, config.options.display_unit);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `config.toml` from `--dir`, overridden by command-line flags, validated.
fn load_session(cli: &Cli, args: &SessionArgs) -> Result<SessionConfig, config::ConfigError> {
    let mut config = config::load_config(&cli.dir)?;
    args.apply_to(&mut config);
    config.validate()?;
    Ok(config)
}

fn calculate(config: &SessionConfig) -> Result<EquivalenceResult, CalcError> {
    let catalog = config.catalog();
    let source = config.source_state();
    let target = config.target_state();
    calculate_equivalence(&EquivalenceInput {
        source: &source,
        target: &target,
        options: &config.options,
        formats: catalog.formats(),
    })
}

/// The session's source against every catalog format, in catalog order. The
/// target override and options carry over to every row.
fn calculate_table(config: &SessionConfig) -> Result<Vec<EquivalenceResult>, CalcError> {
    let catalog = config.catalog();
    let source = config.source_state();
    let override_ = config.target_state().override_;
    catalog
        .formats()
        .par_iter()
        .map(|format| {
            let target = TargetState::new(&format.id).with_override(override_);
            calculate_equivalence(&EquivalenceInput {
                source: &source,
                target: &target,
                options: &config.options,
                formats: catalog.formats(),
            })
        })
        .collect()
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
