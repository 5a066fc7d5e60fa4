use anyhow::{Context, Result};
use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tankfield_core::sim::{SandboxArena, SharedArena};
use tankfield_core::{AgentLoop, ControllerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Drive the sandbox arena with the potential-field controller
#[derive(Parser, Debug)]
#[command(name = "tank_pilot")]
struct Args {
    /// TOML controller configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after this many ticks instead of waiting for Ctrl-C
    #[arg(long)]
    ticks: Option<u64>,

    /// Tick period in milliseconds; also the simulated time step
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,

    /// Parameter override, e.g. `--set speed_p=0.5`
    #[arg(long = "set", value_parser = parse_override)]
    overrides: Vec<(String, f64)>,
}

fn parse_override(raw: &str) -> std::result::Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got {}", raw))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad value for {}: {}", name, e))?;
    Ok((name.trim().to_string(), value))
}

fn drive(
    config: ControllerConfig,
    running: &AtomicBool,
    ticks: Option<u64>,
    period: Duration,
) -> Result<()> {
    let arena = SharedArena::new(SandboxArena::demo()?.with_time_step(period.as_secs_f64()));
    let mut agent = AgentLoop::new(arena.clone(), arena.clone(), config)?;

    while running.load(Ordering::SeqCst) {
        if ticks.map_or(false, |limit| agent.ticks() >= limit) {
            break;
        }
        agent.tick()?;
        thread::sleep(period);
    }

    let state = arena.0.borrow().state().clone();
    for tank in &state.my_tanks {
        info!(
            agent = %tank.id,
            x = tank.position.x,
            y = tank.position.y,
            carrying = ?tank.flag,
            "final position"
        );
    }
    info!(ticks = agent.ticks(), "pilot finished");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tankfield_core=info,tank_pilot=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ControllerConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ControllerConfig::default(),
    };
    if !args.overrides.is_empty() {
        let params: HashMap<String, f64> = args.overrides.iter().cloned().collect();
        config.apply_overrides(&params)?;
    }

    info!(agents = ?config.agents, derivative = ?config.derivative, "starting tank pilot");

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    let ticks = args.ticks;
    let period = Duration::from_millis(args.tick_ms);
    let mut driver = tokio::task::spawn_blocking(move || drive(config, &flag, ticks, period));

    tokio::select! {
        result = &mut driver => return result?,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("interrupt received, stopping");
            running.store(false, Ordering::SeqCst);
        }
    }

    driver.await?
}
