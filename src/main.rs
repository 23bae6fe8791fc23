use std::sync::Arc;
use std::time::Duration;

use syncthing_helper::syncthing_client::{ChannelObserver, FolderEvent};
use syncthing_helper::{Config, MonitorError, SyncthingClient};
use tracing::{error, info, warn};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run().await {
        error!(error = %err, "Syncthing helper exited with an error");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), MonitorError> {
    let config = Config::load().await;
    let (observer, mut notifications) = ChannelObserver::new();
    let client = SyncthingClient::connect(&config, Arc::new(observer)).await?;

    let summary = client.load_configuration().await?;
    info!(
        folders = summary.discovered,
        resolved = summary.resolved,
        web_ui = %client.web_ui_url(),
        "Mirroring Syncthing folders"
    );
    client.start_listening();

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(err) = signal {
                    warn!(error = %err, "ctrl-c handler failed");
                }
                info!("received ctrl-c, shutting down");
                break;
            }
            notification = notifications.recv() => {
                let Some(notification) = notification else { break };
                match notification.event {
                    FolderEvent::Discovered(folder) => {
                        info!(folder = %folder.id(), path = %folder.path(), "Folder discovered");
                    }
                    FolderEvent::StateChanged(folder) => {
                        info!(
                            folder = %folder.id(),
                            state = %folder.state(),
                            indicator = ?folder.state().indicator(),
                            at = %notification.received_at.format("%H:%M:%S"),
                            "Folder state changed"
                        );
                    }
                    FolderEvent::Error(message) => warn!(error = %message, "Syncthing error"),
                }
            }
        }
    }

    // An idle long-poll can hold the loop open until the daemon answers.
    if let Some(handle) = client.stop_listening() {
        match tokio::time::timeout(SHUTDOWN_GRACE, handle).await {
            Ok(Ok(())) => info!("Event loop stopped"),
            Ok(Err(err)) => warn!(error = %err, "Event loop task failed"),
            Err(_) => info!("Event loop still waiting on the daemon, exiting anyway"),
        }
    }
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
