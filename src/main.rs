//! Health risk index entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use health_index::api::{create_router, AppState, HealthInput, HealthPrediction};
use health_index::config::Config;
use health_index::error::ModelError;
use health_index::metrics;
use health_index::model::Predictor;
use health_index::training::{train_and_save, TrainerConfig};
use health_index::utils::shutdown_signal;

/// Health risk logistic-regression trainer and prediction API.
#[derive(Parser, Debug)]
#[command(name = "health-index")]
#[command(about = "Train the health risk model and serve predictions over HTTP")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fit the model on the training CSV and write the artifact (default).
    Train {
        /// Training CSV (overrides DATA_PATH).
        #[arg(long)]
        data: Option<PathBuf>,

        /// Artifact output path (overrides MODEL_PATH).
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Serve the prediction API.
    Serve {
        /// Bind address (overrides HOST).
        #[arg(long)]
        host: Option<String>,

        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Score a single input and print the result as JSON.
    Predict {
        /// Age in years.
        #[arg(long)]
        age: f64,

        /// Body mass index.
        #[arg(long)]
        bmi: f64,

        /// 0 = non-smoker, 1 = smoker.
        #[arg(long)]
        smoker: u8,

        /// Average exercise minutes per day.
        #[arg(long)]
        exercise_mins: f64,

        /// Systolic blood pressure (mmHg).
        #[arg(long)]
        systolic_bp: f64,
    },

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("health_index=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    if args.json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    // Handle subcommands
    match args.command {
        None => cmd_train(None, None).await,
        Some(Command::Train { data, output }) => cmd_train(data, output).await,
        Some(Command::Serve { host, port }) => cmd_serve(host, port).await,
        Some(Command::Predict {
            age,
            bmi,
            smoker,
            exercise_mins,
            systolic_bp,
        }) => cmd_predict(age, bmi, smoker, exercise_mins, systolic_bp).await,
        Some(Command::CheckConfig) => cmd_check_config().await,
    }
}

/// Load and validate configuration, logging failures.
fn load_config() -> anyhow::Result<Config> {
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Invalid configuration: {}", e));
    }

    Ok(config)
}

/// Fit the classifier and write the artifact.
async fn cmd_train(data: Option<PathBuf>, output: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config()?;
    let data_path = data.unwrap_or(config.data_path);
    let model_path = output.unwrap_or(config.model_path);

    info!("Training on {}", data_path.display());
    let report = {
        let model_path = model_path.clone();
        tokio::task::spawn_blocking(move || {
            train_and_save(&data_path, &model_path, TrainerConfig::default())
        })
        .await??
    };

    info!(
        "Training accuracy: {:.3} over {} samples",
        report.accuracy, report.classifier.n_samples
    );
    println!("Model trained and saved to: {}", model_path.display());
    Ok(())
}

/// Run the HTTP API until a shutdown signal arrives.
async fn cmd_serve(host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let mut config = load_config()?;
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    info!("Configuration loaded successfully");
    info!("Model path: {}", config.model_path.display());
    info!("Model version: {}", config.model_version);

    let handle = metrics::install_recorder()?;

    let predictor = Arc::new(Predictor::new(config.model_path.clone()));
    {
        let predictor = Arc::clone(&predictor);
        match tokio::task::spawn_blocking(move || predictor.preload()).await? {
            Ok(()) => info!("Model warmed up"),
            Err(e @ ModelError::NotFound { .. }) => {
                warn!("{} Predictions will fail until it exists.", e)
            }
            Err(e) => return Err(e.into()),
        }
    }

    let state = AppState::new(predictor, config.model_version.clone()).with_metrics(handle);
    let router = create_router(state);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

/// Score one input from the command line.
async fn cmd_predict(
    age: f64,
    bmi: f64,
    smoker: u8,
    exercise_mins: f64,
    systolic_bp: f64,
) -> anyhow::Result<()> {
    let config = load_config()?;
    let input = HealthInput::new(age, bmi, smoker, exercise_mins, systolic_bp)?;

    let predictor = Predictor::new(config.model_path);
    let prediction = predictor.predict(&input.feature_vector())?;

    let body = HealthPrediction::new(prediction, config.model_version);
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("HEALTH INDEX - CONFIGURATION CHECK");
    println!("======================================================================");

    // Load configuration
    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    // Validate configuration
    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Data Path: {}", config.data_path.display());
    println!(
        "  Model Path: {} ({})",
        config.model_path.display(),
        if config.model_path.exists() { "present" } else { "missing - run `health-index train`" }
    );
    println!("  Model Version: {}", config.model_version);
    println!("  Listen Address: {}", config.bind_addr());
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}
