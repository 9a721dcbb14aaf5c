mod monitor;
mod scheduler;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pickwatch_core::{AppConfig, MonitorTask};
use tracing_subscriber::EnvFilter;

use crate::monitor::Monitor;

const TEST_PUSH_BODY: &str = "pickwatch 测试通知";

#[derive(Debug, Parser)]
#[command(name = "pickwatch")]
#[command(about = "Watch Apple Store pickup availability and push alerts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run every task on its cron schedule until interrupted (default).
    Run,
    /// Run a single monitoring pass and exit.
    Once {
        /// Only run the task with this name.
        #[arg(long)]
        task: Option<String>,
    },
    /// Validate configuration and print the configured tasks.
    Check,
    /// Send a test notification through every configured push channel.
    TestPush {
        /// Only notify channels of the task with this name.
        #[arg(long)]
        task: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = pickwatch_core::load_app_config().context("failed to load configuration")?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let tasks = pickwatch_core::load_tasks(&config.tasks_path)
        .with_context(|| format!("failed to load tasks from {}", config.tasks_path.display()))?
        .tasks;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_scheduled(&config, tasks).await,
        Commands::Once { task } => {
            let tasks = select_tasks(tasks, task.as_deref())?;
            let monitor = Monitor::from_config(&config)?;
            for task in &tasks {
                monitor.run_task(task).await;
            }
            Ok(())
        }
        Commands::Check => {
            print_tasks(&config, &tasks);
            Ok(())
        }
        Commands::TestPush { task } => {
            let tasks = select_tasks(tasks, task.as_deref())?;
            let monitor = Monitor::from_config(&config)?;
            test_push(&monitor, &tasks).await
        }
    }
}

async fn run_scheduled(config: &AppConfig, tasks: Vec<MonitorTask>) -> anyhow::Result<()> {
    let monitor = Arc::new(Monitor::from_config(config)?);
    let task_count = tasks.len();
    let mut scheduler = scheduler::build_scheduler(tasks, monitor)
        .await
        .context("failed to start scheduler")?;
    tracing::info!(tasks = task_count, "pickwatch scheduler running");

    shutdown_signal().await;
    scheduler
        .shutdown()
        .await
        .context("failed to stop scheduler")?;
    Ok(())
}

/// Narrow `tasks` to the one whose label equals `name`, if given.
fn select_tasks(tasks: Vec<MonitorTask>, name: Option<&str>) -> anyhow::Result<Vec<MonitorTask>> {
    let Some(name) = name else {
        return Ok(tasks);
    };

    let selected: Vec<MonitorTask> = tasks.into_iter().filter(|t| t.label() == name).collect();
    if selected.is_empty() {
        anyhow::bail!("no task named '{name}'");
    }
    Ok(selected)
}

fn print_tasks(config: &AppConfig, tasks: &[MonitorTask]) {
    println!("tasks file: {}", config.tasks_path.display());
    println!(
        "timeout {}s, {} attempt(s), retry backoff {}-{}ms, device jitter {}-{}ms",
        config.request_timeout_secs,
        config.max_attempts,
        config.retry_backoff.min_ms,
        config.retry_backoff.max_ms,
        config.device_jitter.min_ms,
        config.device_jitter.max_ms,
    );

    for task in tasks {
        println!();
        println!("{} [{}] {}", task.label(), task.country, task.base_url());
        println!("  location: {}", task.location);
        println!("  cron:     {}", task.cron);
        println!(
            "  cookie:   {}",
            if task.cookie().is_some() { "set" } else { "none" }
        );
        for device in &task.devices {
            let channels: Vec<&str> = device.push.iter().map(|p| p.kind()).collect();
            let whitelist = if device.store_whitelist.is_empty() {
                "all stores".to_string()
            } else {
                device.store_whitelist.join(", ")
            };
            println!(
                "  - {} ({whitelist}) -> [{}]",
                device.device_code,
                channels.join(", ")
            );
        }
    }
}

async fn test_push(monitor: &Monitor, tasks: &[MonitorTask]) -> anyhow::Result<()> {
    let mut failed = 0;
    for task in tasks {
        for device in &task.devices {
            let body = format!("{TEST_PUSH_BODY}\n{}: {}", task.label(), device.device_code);
            let summary = monitor
                .notifier()
                .dispatch(pickwatch_notify::NOTIFICATION_TITLE, &body, &device.push)
                .await;
            tracing::info!(
                task = %task.label(),
                device = %device.device_code,
                delivered = summary.delivered,
                failed = summary.failed,
                "test notification sent"
            );
            failed += summary.failed;
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} push channel(s) failed");
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, stopping scheduler");
}
