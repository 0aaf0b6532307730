//! AirCut Server - gesture recognition and live hand detection backend

use aircut_server::app::cli::{Cli, Commands, ConfigAction};
use aircut_server::app::config::Config;
use aircut_server::detection::detector::build_detector;
use aircut_server::gesture::matcher::{GestureMatcher, Template, MIN_TRAJECTORY_POINTS};
use aircut_server::gesture::normalize;
use aircut_server::server;
use aircut_server::session::context::AppContext;
use aircut_server::session::messages::RecognizeGesture;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments first so we can use --verbose to set log level
    let cli = Cli::parse_args();

    // Initialize tracing (--verbose enables debug-level output)
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Load config, then layer the environment on top
    let mut config = if let Some(path) = &cli.config {
        Config::load(path)?
    } else {
        Config::load_default()?
    };
    config.apply_env()?;

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;
            run_serve(&config)?;
        }
        Commands::Recognize { input, threshold } => {
            run_recognize(&input, threshold, &config)?;
        }
        Commands::Config { action } => {
            run_config(action, &config)?;
        }
    }

    Ok(())
}

fn run_serve(config: &Config) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;

    // The blocking HTTP client must be built and dropped outside the runtime
    let detector = build_detector(&config.detection)?;
    if let Some(detector) = &detector {
        info!("Hand detector: {}", detector.name());
    }
    let ctx = Arc::new(AppContext::from_config(config, detector));

    info!(
        "Starting server (hand confidence {:.2}, gesture confidence {:.2})",
        config.detection.hand_confidence, config.gesture.recognition_confidence
    );

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(server::serve(Arc::clone(&ctx), addr));
    drop(runtime);
    drop(ctx);

    result?;
    Ok(())
}

fn run_recognize(input: &Path, threshold: Option<f64>, config: &Config) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(input)?;
    let request: RecognizeGesture = serde_json::from_str(&content)?;

    if request.trajectory.len() < MIN_TRAJECTORY_POINTS {
        anyhow::bail!("Trajectory must have at least 2 points");
    }
    if request.templates.is_empty() {
        anyhow::bail!("No templates provided for recognition");
    }

    let threshold = threshold
        .or(request.confidence_threshold)
        .unwrap_or(config.gesture.recognition_confidence);
    let templates = Template::from_specs(&request.templates);
    let matcher = GestureMatcher::with_max_points(config.gesture.max_resample_points);

    println!(
        "Trajectory: {} points, {} templates, threshold {:.2}",
        request.trajectory.len(),
        templates.len(),
        threshold
    );

    match matcher.recognize(&request.trajectory, &templates, threshold) {
        Some(found) => {
            println!("\nRecognized: {}", found.name);
            println!("  Similarity: {:.3}", found.similarity);
            if !found.command.is_empty() {
                println!("  Command: {}", found.command);
            }
        }
        None => {
            warn!("No matching gesture found");
            println!("\nNo matching gesture found");
            let normalized = normalize(&request.trajectory);
            for template in &templates {
                println!(
                    "  {}: {:.3}",
                    template.name,
                    matcher.similarity(&normalized, &template.trajectory)
                );
            }
        }
    }

    Ok(())
}

fn run_config(action: ConfigAction, config: &Config) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = config.to_toml()?;
            println!("Configuration ({:?}):\n", Config::default_path());
            println!("{}", toml_str);
            let key_state = if config.detection.api_key.is_some() { "set" } else { "not set" };
            println!("# ROBOFLOW_API_KEY: {}", key_state);
        }
        ConfigAction::Init { force } => {
            let config_path = Config::default_path();

            if config_path.exists() && !force {
                anyhow::bail!(
                    "Config already exists at {:?}. Use --force to overwrite.",
                    config_path
                );
            }

            config.save_default()?;
            println!("Created config at {:?}", config_path);
            println!("\nConfig content:\n{}", config.to_toml()?);
        }
        ConfigAction::Path => {
            println!("{}", Config::default_path().display());
        }
    }

    Ok(())
}
