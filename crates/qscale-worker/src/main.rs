use std::path::PathBuf;

use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use qscale_worker::config::{LogFormat, WorkerConfig};
use qscale_worker::run::run_events;
use qscale_worker::state::WorkerState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let config = WorkerConfig::from_env()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    // Events come from the file named by the first argument, or stdin.
    let input = std::env::args().nth(1).filter(|a| a != "-").map(PathBuf::from);

    let state = WorkerState::build(config);
    let topic = state.config.topic.clone();

    let summary = match input {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .map_err(|e| eyre::eyre!("failed to open {}: {e}", path.display()))?;
            run_events(&state.dispatcher, &topic, BufReader::new(file)).await?
        }
        None => run_events(&state.dispatcher, &topic, BufReader::new(tokio::io::stdin())).await?,
    };

    if summary.failed > 0 {
        return Err(eyre::eyre!(
            "{} of {} events failed",
            summary.failed,
            summary.total()
        ));
    }
    Ok(())
}
