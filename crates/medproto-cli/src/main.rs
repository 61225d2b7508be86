use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use eyre::Result;
use tracing_subscriber::EnvFilter;

use medproto_cli::commands::{self, ValidateArgs};
use medproto_cli::config;
use medproto_flowchart::{FlowchartFormat, ProtocolInfo};

#[derive(Parser)]
#[command(name = "medproto")]
#[command(about = "Validate medical protocols and convert their flowcharts")]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate protocol content and print the report
    Validate {
        /// Protocol content JSON (sections keyed "1" to "13")
        content: PathBuf,
        /// Flowchart JSON, standard or clinical schema
        #[arg(long)]
        flowchart: Option<PathBuf>,
        /// Medication reference JSON
        #[arg(long)]
        medications: Option<PathBuf>,
        #[arg(long, default_value = "local")]
        protocol_id: String,
        #[arg(long)]
        version_id: Option<String>,
    },
    /// Convert a flowchart between schemas
    Convert {
        flowchart: PathBuf,
        #[arg(long, value_enum)]
        to: Target,
    },
    /// Wrap a flowchart in an export document
    Export {
        flowchart: PathBuf,
        #[arg(long, requires = "protocol_title")]
        protocol_id: Option<String>,
        #[arg(long, requires = "protocol_id")]
        protocol_title: Option<String>,
    },
    /// Check whether a file is a well-formed clinical flowchart
    CheckClinical { file: PathBuf },
    /// Print the effective config
    Config {
        /// Write it back to disk, migrated to the current version
        #[arg(long)]
        write: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Target {
    Clinical,
    Standard,
}

impl From<Target> for FlowchartFormat {
    fn from(target: Target) -> Self {
        match target {
            Target::Clinical => FlowchartFormat::Clinical,
            Target::Standard => FlowchartFormat::Standard,
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.json);

    let config_path = match cli.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };
    let cfg = config::load_config(&config_path)?;

    match cli.command {
        Commands::Validate {
            content,
            flowchart,
            medications,
            protocol_id,
            version_id,
        } => {
            let args = ValidateArgs {
                content: &content,
                flowchart: flowchart.as_deref(),
                medications: medications.as_deref(),
                protocol_id: &protocol_id,
                version_id,
            };
            let report = commands::validate(args, &cfg).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.is_valid {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Convert { flowchart, to } => {
            println!("{}", commands::convert(&flowchart, to.into())?);
        }
        Commands::Export {
            flowchart,
            protocol_id,
            protocol_title,
        } => {
            let protocol = protocol_id
                .zip(protocol_title)
                .map(|(id, title)| ProtocolInfo { id, title });
            println!("{}", commands::export(&flowchart, protocol)?);
        }
        Commands::CheckClinical { file } => {
            if commands::check_clinical(&file)? {
                println!("{}: valid clinical flowchart", file.display());
            } else {
                println!("{}: not a valid clinical flowchart", file.display());
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Config { write } => {
            println!("{}", serde_json::to_string_pretty(&cfg)?);
            if write {
                config::save_config(&cfg, &config_path)?;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
