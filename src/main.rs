use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use env_logger::{Builder, Env};
use log::LevelFilter;

use cocoscan::config::{ModelConfig, ServiceConfig, DEFAULT_BIND};
use cocoscan::detection::TensorLayout;
use cocoscan::wire::PredictionResponse;

#[derive(Parser)]
#[command(name = "cocoscan")]
#[command(about = "Detect coconut lumber in photos and estimate its dimensions")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    models: ModelArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ModelArgs {
    /// Generic image classifier model (.rten)
    #[arg(long, global = true, env = "COCOSCAN_GENERIC_MODEL", value_name = "FILE")]
    generic_model: Option<PathBuf>,

    /// Class labels for the generic model, one per line
    #[arg(long, global = true, env = "COCOSCAN_GENERIC_LABELS", value_name = "FILE")]
    generic_labels: Option<PathBuf>,

    /// Custom wood-colored binary classifier model (.rten)
    #[arg(long, global = true, env = "COCOSCAN_CUSTOM_MODEL", value_name = "FILE")]
    custom_model: Option<PathBuf>,

    /// Input tensor layout expected by the models
    #[arg(long, global = true, env = "COCOSCAN_INPUT_LAYOUT", value_enum, default_value_t = TensorLayout::Nhwc)]
    input_layout: TensorLayout,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP detection service
    Serve {
        /// Address to listen on
        #[arg(long, env = "COCOSCAN_BIND", default_value = DEFAULT_BIND)]
        bind: SocketAddr,
    },

    /// Scan a single image file and print the result as JSON
    Scan {
        /// Path to input image file
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        /// Save debug outputs to directory (must be empty)
        #[arg(long, value_name = "DIR")]
        debug_out: Option<PathBuf>,
    },
}

impl From<ModelArgs> for ModelConfig {
    fn from(args: ModelArgs) -> Self {
        Self {
            generic_model: args.generic_model,
            generic_labels: args.generic_labels,
            custom_model: args.custom_model,
            input_layout: args.input_layout,
        }
    }
}

fn init_logging(verbose: bool) {
    // Honor RUST_LOG unless -v was passed
    let mut logger = if !verbose && std::env::var_os("RUST_LOG").is_some() {
        Builder::from_env(Env::default())
    } else {
        let mut builder = Builder::new();
        builder.filter_level(if verbose { LevelFilter::Debug } else { LevelFilter::Info });
        builder
    };
    logger.format_timestamp_millis().init();
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);

    let models = ModelConfig::from(args.models);

    match args.command {
        Commands::Serve { bind } => {
            let config = ServiceConfig { bind, models };
            let pipeline = config.models.build_pipeline();

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(cocoscan::server::serve(config.bind, pipeline))
        }
        Commands::Scan { image_path, debug_out } => {
            let mut pipeline = models.build_pipeline();
            if let Some(debug_dir) = debug_out {
                pipeline = pipeline.with_debug(debug_dir)?;
            }

            let result = pipeline.scan_file(&image_path)?;
            let response = PredictionResponse::from(&result);
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
    }
}
