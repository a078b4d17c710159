//! `reel` — drive the daily content-automation pipeline from the shell.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use rk_core::clients::adapters::InstagramClient;
use rk_core::clients::ClientSet;
use rk_core::config::load_config;
use rk_core::engine::WorkflowEngine;
use rk_core::state::PublishRegister;
use rk_protocol::{Event, PublishStatus, VideoDuration, WorkflowConfig, WorkflowResult};

const STATUS_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "reel", version, about = "Daily content-automation pipeline")]
struct Cli {
    /// Directory containing the .reel-kit configuration
    #[arg(long, global = true, default_value = ".")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full workflow for one source image
    Run {
        /// Source image to build the video from
        #[arg(long)]
        image_url: String,

        /// Approval email recipient (falls back to the configured default)
        #[arg(long)]
        recipient: Option<String>,

        /// Clip length: short (5s) or long (10s)
        #[arg(long)]
        duration: Option<VideoDuration>,

        /// Create the publish container immediately instead of waiting for
        /// email approval
        #[arg(long)]
        auto_publish: bool,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Drive the approval callback for a previously generated video
    Approve {
        #[arg(long)]
        video_url: String,

        #[arg(long)]
        caption: String,

        /// Repeatable hashtag, e.g. --hashtag "#sunset"
        #[arg(long = "hashtag")]
        hashtags: Vec<String>,

        /// Poll until the deferred confirm finishes and print the final status
        #[arg(long)]
        wait: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config_dir).await?;

    let http = reqwest::Client::new();
    let clients = ClientSet::from_config(&config, http.clone());
    let platform = Arc::new(InstagramClient::from_config(&config.instagram, http));
    let register = Arc::new(PublishRegister::new(platform));
    let engine = WorkflowEngine::new(
        clients,
        register,
        config.settings.clone(),
        config.templates.clone(),
    );

    match cli.command {
        Commands::Run {
            image_url,
            recipient,
            duration,
            auto_publish,
            json,
        } => {
            let workflow = WorkflowConfig {
                image_url,
                recipient_email: recipient,
                video_duration: duration,
                auto_publish,
            };
            run_workflow(&engine, &workflow, json).await
        }
        Commands::Approve {
            video_url,
            caption,
            hashtags,
            wait,
        } => approve(&engine, &video_url, &caption, &hashtags, wait).await,
    }
}

async fn run_workflow(
    engine: &WorkflowEngine,
    config: &WorkflowConfig,
    json: bool,
) -> color_eyre::Result<()> {
    let (events_tx, mut events_rx) = mpsc::channel(256);

    let printer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            print_event(&event);
        }
    });

    let result = engine.execute_complete_workflow(config, events_tx).await;
    let _ = printer.await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }

    // An auto-published run created a container whose confirm fires later;
    // stay alive and report the final status.
    let container_id = result
        .final_output
        .as_ref()
        .and_then(|output| output.publish_container_id.clone());
    if let Some(container_id) = container_id {
        wait_for_container(engine, &container_id).await;
    }

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}

async fn approve(
    engine: &WorkflowEngine,
    video_url: &str,
    caption: &str,
    hashtags: &[String],
    wait: bool,
) -> color_eyre::Result<()> {
    let outcome = engine
        .handle_approval_callback(video_url, caption, hashtags)
        .await;

    if outcome.success {
        println!("{} {}", "✓".green(), outcome.message);
    } else {
        println!("{} {}", "✗".red(), outcome.message);
        std::process::exit(1);
    }

    if wait {
        if let Some(container_id) = &outcome.container_id {
            wait_for_container(engine, container_id).await;
        }
    }
    Ok(())
}

/// Poll the register until the container reaches a terminal status.
async fn wait_for_container(engine: &WorkflowEngine, container_id: &str) {
    println!(
        "{}",
        format!("Waiting for publish confirmation of {container_id}...").dimmed()
    );

    loop {
        tokio::time::sleep(STATUS_POLL_INTERVAL).await;

        match engine.container_status(container_id).await {
            Some(container) if container.status.is_terminal() => {
                let label = match container.status {
                    PublishStatus::Published => "published".green(),
                    _ => "failed".red(),
                };
                println!(
                    "Container {container_id} {label} after {}s",
                    container.seconds_since_creation()
                );
                break;
            }
            Some(_) => {}
            None => {
                eprintln!("Container {container_id} is no longer tracked");
                break;
            }
        }
    }
}

fn print_event(event: &Event) {
    match event {
        Event::WorkflowStarted { image_url, .. } => {
            println!("{} workflow started for {image_url}", "▶".cyan());
        }
        Event::StepStarted { step, .. } => {
            println!("  {} {step}", "…".dimmed());
        }
        Event::StepCompleted { step, .. } => {
            println!("  {} {step}", "✓".green());
        }
        Event::StepFailed { step, error, .. } => {
            println!("  {} {step}: {}", "✗".red(), error.message);
        }
        Event::WorkflowCompleted {
            success,
            duration_ms,
            ..
        } => {
            let label = if *success {
                "completed".green()
            } else {
                "failed".red()
            };
            println!("{} workflow {label} in {duration_ms}ms", "■".cyan());
        }
        Event::ContainerScheduled { container_id } => {
            println!("  {} publish container {container_id} scheduled", "⏱".yellow());
        }
    }
}

fn print_summary(result: &WorkflowResult) {
    let Some(output) = &result.final_output else {
        println!("\n{}", "The run did not produce a content package.".red());
        return;
    };

    println!();
    println!("{}", "Content package".bold());
    println!("  video:    {}", output.video_url);
    println!("  caption:  {}", output.caption);
    if !output.hashtags.is_empty() {
        println!("  hashtags: {}", output.hashtags.join(" "));
    }
    println!(
        "  emailed:  {}",
        if output.notification_sent { "yes" } else { "no" }
    );
    println!(
        "  published: {}",
        if output.instagram_published {
            "container created"
        } else {
            "awaiting approval"
        }
    );
}
