//! Command-line front end for the breed predictor.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin breed-predict -- [OPTIONS] <IMAGES>...
//! ```
//!
//! Each image is selected, submitted to the prediction service and the
//! resulting view printed: the result block followed by the breed
//! information bullets.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use shared::shell::{HttpTransport, NativeShell, ShellConfig, ShellError};
use shared::ViewModel;
use tracing::{error, warn};

/// Command-line arguments for the breed predictor
#[derive(Parser)]
#[command(name = "breed-predict")]
#[command(about = "Classify cow/buffalo breeds with a remote prediction service")]
struct Args {
    /// Paths to input images to classify
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Prediction endpoint
    #[arg(short, long, env = "BREED_PREDICTOR_ENDPOINT", default_value = shared::DEFAULT_PREDICT_ENDPOINT)]
    endpoint: String,

    /// Give up on a request after this many seconds (no limit by default)
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "breed-predict failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), ShellError> {
    let config = ShellConfig::new(&args.endpoint, args.timeout_secs.map(Duration::from_secs))?;
    let transport = HttpTransport::new(&config)?;

    let mut shell = NativeShell::new(transport);
    shell.configure(&config).await;

    for path in &args.images {
        if let Err(e) = shell.select_image(path).await {
            warn!(error = %e, "skipping input");
            eprintln!("{e}");
            continue;
        }

        shell.predict().await;
        for notice in shell.take_notices() {
            eprintln!("{notice}");
        }

        print_view(path, &shell.view());
    }

    shell.teardown().await;
    Ok(())
}

fn print_view(path: &Path, view: &ViewModel) {
    println!("== {}", path.display());
    println!("{}", view.result_text);

    if view.show_breed_info {
        println!();
        println!("{}", view.summary_heading);
        for item in &view.summary_items {
            println!("  - {item}");
        }
    }
    println!();
}
