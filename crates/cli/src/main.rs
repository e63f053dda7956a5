use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result, WrapErr};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tp_core::config::{load_config, AppConfig, CONFIG_FILE_NAME};
use tp_core::engine::PipelineEngine;
use tp_core::generators::GeneratorFactory;
use tp_core::init::{generate_config, InitError, InitOptions};
use tp_core::media::MediaTool;
use tp_core::state::JobManager;
use tp_protocol::ipc::Event;
use tp_protocol::job_models::JobStatus;
use tp_protocol::pipeline_models::Stage;
use tracing::info;

/// Turn a story prompt into a narrated video and publish it.
#[derive(Parser)]
#[command(name = "talepipe", version, about)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Address to listen on (overrides `server.bind`)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Run one job in the foreground and print its progress
    Run,

    /// Report whether every generator and media tool is usable
    Check,

    /// Write a template talepipe.toml and .env.example
    Init {
        /// Overwrite an existing talepipe.toml
        #[arg(long)]
        force: bool,

        /// Directory to write into
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // A missing .env is fine; variables may come from the real environment
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind } => serve(&cli.config, bind).await,
        Commands::Run => run_once(&cli.config).await,
        Commands::Check => check(&cli.config).await,
        Commands::Init { force, dir } => init(dir, force).await,
    }
}

async fn load(path: &Path) -> Result<AppConfig> {
    load_config(path)
        .await
        .wrap_err_with(|| format!("Could not load configuration from {}", path.display()))
}

async fn serve(config_path: &Path, bind: Option<String>) -> Result<()> {
    let config = load(config_path).await?;
    let bind = bind.unwrap_or_else(|| config.pipeline.server.bind.clone());

    let engine = PipelineEngine::from_config(&config)?;
    let (events_tx, events_rx) = mpsc::channel(256);
    let logger = tp_server::event_log::spawn_event_logger(events_rx);
    let manager = Arc::new(JobManager::new(engine, events_tx));

    info!(%bind, "Starting talepipe server");
    tp_server::serve(Arc::clone(&manager), &bind)
        .await
        .map_err(|e| eyre!("{e:#}"))?;

    // The logger ends once the last sender is gone
    drop(manager);
    let _ = logger.await;
    Ok(())
}

async fn run_once(config_path: &Path) -> Result<()> {
    let config = load(config_path).await?;
    let engine = PipelineEngine::from_config(&config)?;
    let (events_tx, mut events_rx) = mpsc::channel(256);
    let manager = JobManager::new(engine, events_tx);

    let job_id = manager.start_job().await;
    println!("{} {}", "Job".bold(), job_id.to_string().dimmed());

    loop {
        tokio::select! {
            event = events_rx.recv() => {
                let Some(event) = event else { break };
                let terminal = event.is_terminal();
                print_event(&event);
                if terminal {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("{}", "Cancelling...".yellow());
                if let Err(e) = manager.cancel_job(job_id).await {
                    eprintln!("{}", e.to_string().red());
                }
            }
        }
    }

    let job = manager
        .wait_for(job_id)
        .await
        .ok_or_else(|| eyre!("Job {job_id} disappeared"))?;

    match job.status {
        JobStatus::Completed => Ok(()),
        status => Err(eyre!(
            "Job ended as {status:?}: {}",
            job.error.unwrap_or_default()
        )),
    }
}

fn print_event(event: &Event) {
    match event {
        Event::JobStarted { .. } | Event::JobStatusUpdate { .. } => {}
        Event::StageStarted { stage, .. } => {
            println!("{} {}", "→".cyan(), stage.label().cyan().bold());
        }
        Event::JobLogChunk { content, .. } => println!("  {}", content.dimmed()),
        Event::JobCompleted { youtube_link, .. } => {
            println!("{} {}", "✓ Complete:".green().bold(), youtube_link.green());
        }
        Event::JobFailed { stage, error, .. } => {
            let at = stage.map(Stage::label).unwrap_or("startup");
            println!("{} {}", format!("✗ Failed at {at}:").red().bold(), error.red());
        }
        Event::JobCancelled { .. } => println!("{}", "Cancelled".yellow().bold()),
    }
}

async fn check(config_path: &Path) -> Result<()> {
    let config = load(config_path).await?;
    let mut unavailable = 0usize;

    println!("{}", "Generators".bold());
    let generators = GeneratorFactory::create(&config.pipeline, &config.credentials)?;
    for entry in generators.check_availability().await {
        if !entry.available {
            unavailable += 1;
        }
        println!(
            "  {:<8} {:<12} {}",
            entry.role.name(),
            entry.provider,
            availability(entry.available)
        );
    }

    println!("{}", "Media tools".bold());
    for program in [&config.pipeline.video.ffmpeg, &config.pipeline.video.ffprobe] {
        let available = MediaTool::new(program.as_str()).is_available();
        if !available {
            unavailable += 1;
        }
        println!("  {program:<21} {}", availability(available));
    }

    if unavailable > 0 {
        return Err(eyre!("{unavailable} component(s) unavailable"));
    }
    Ok(())
}

fn availability(available: bool) -> colored::ColoredString {
    if available {
        "available".green()
    } else {
        "unavailable".red()
    }
}

async fn init(dir: PathBuf, force: bool) -> Result<()> {
    let options = InitOptions {
        target_dir: dir,
        force,
    };

    match generate_config(options).await {
        Ok(written) => {
            for path in written {
                println!("{} {}", "created".green(), path.display());
            }
            println!("Fill in .env with your API credentials, then run `talepipe check`.");
            Ok(())
        }
        Err(e @ InitError::FileExists(_)) => Err(eyre!(e)),
        Err(e) => Err(e).wrap_err("Initialization failed"),
    }
}
