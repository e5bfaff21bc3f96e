mod args;
mod env_thread;
mod logging;
mod master_thread;
mod settings;

use anyhow::Context;
use args::Args;
use clap::Parser;
use env_thread::{build_control_loop, spawn_env_thread};
use logging::init_logging;
use master_thread::{spawn_master_thread, Master, MasterMessage, MasterThreadMessage, Query};
use settings::ActorSettings;

#[cfg(not(target_env = "msvc"))]
use jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = ActorSettings::load(&args).context("loading configuration")?;
    init_logging(&settings.logging);
    settings
        .agent
        .validate()
        .context("validating agent configuration")?;

    tracing::info!(
        server = %settings.server.url,
        checkpoint = %settings.checkpoint.path.display(),
        schema = ?settings.encoder.schema,
        "starting actor"
    );
    let master = Master::new(&settings).context("starting control loop")?;
    let master_thread = spawn_master_thread(master, settings.activate);
    master_thread
        .join()
        .map_err(|_| anyhow::anyhow!("master thread panicked"))
}
