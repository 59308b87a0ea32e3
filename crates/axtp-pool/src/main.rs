//! CLI entry point for the AXTP experience pool.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use axtp_pool::demo::{demo_config, run_demo};
use axtp_pool::simulate::{run_simulation, SimulationPlan};
use axtp_pool::{ExperiencePool, PoolConfig, SharedPool};

#[derive(Parser)]
#[command(name = "axtp")]
#[command(about = "Governed experience pool for autonomous agents")]
struct Cli {
    /// Config file prefix (default: axtp).
    #[arg(short, long, global = true, default_value = "axtp")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the scripted two-agent lifecycle and print a JSON report.
    Demo,

    /// Run concurrent simulated agents and print pool stats as JSON.
    Simulate {
        /// Number of concurrent agents.
        #[arg(long, default_value_t = 4)]
        agents: usize,

        /// Records each agent deposits.
        #[arg(long, default_value_t = 25)]
        records_per_agent: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cli = Cli::parse();
    let pool_config = load_pool_config(&cli.config)?;

    match cli.command {
        Command::Demo => {
            let mut pool = ExperiencePool::new(demo_config(pool_config))?;
            let report = run_demo(&mut pool)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Simulate {
            agents,
            records_per_agent,
        } => {
            if agents == 0 {
                anyhow::bail!("--agents must be at least 1");
            }
            let pool = SharedPool::from_config(pool_config)?;
            let stats = run_simulation(
                &pool,
                SimulationPlan {
                    agents,
                    records_per_agent,
                },
            )
            .await;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}

fn load_pool_config(file_prefix: &str) -> anyhow::Result<PoolConfig> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix("AXTP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    match cfg.get::<PoolConfig>("pool") {
        Ok(c) => Ok(c),
        Err(config::ConfigError::NotFound(_)) => Ok(PoolConfig::default()),
        Err(e) => Err(e.into()),
    }
}
