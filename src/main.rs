use std::ffi::OsString;

use mongo_manager::{Args, Config, Manager, Reporter, SystemRunner, Terminal, find_executable};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "mongo_manager=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Args = argh::from_env();
    if args.no_color {
        colored::control::set_override(false);
    }
    let config = Config::from(&args);
    tracing::debug!(?config, "starting");

    let mut reporter = Reporter::stdio();
    let search_paths = std::env::var_os("PATH").unwrap_or_else(OsString::new);
    if find_executable(&search_paths, &config.runtime).is_none() {
        tracing::warn!(runtime = %config.runtime, "container runtime not found in PATH");
        reporter.warning(&format!(
            "'{}' was not found in PATH; container actions will fail.",
            config.runtime
        ));
    }

    let mut manager = Manager::new(config, SystemRunner::new(), Terminal::new()?, reporter);
    manager.repl()
}
