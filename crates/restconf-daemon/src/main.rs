use std::sync::Arc;

use clap::Parser;
use restconf_daemon::{build_app, car_device::CarDevice, AppState};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "restconfd", about = "RESTCONF management protocol daemon")]
struct Args {
    /// Address to bind the HTTP listener to.
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Pin the server to strict RFC compliance, disabling the simplified
    /// wrapper-free profile entirely.
    #[arg(long)]
    strict_only: bool,

    /// Enable verbose debug logging.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut state = AppState::with_main_device(Arc::new(CarDevice::new()));
    state.strict_only = args.strict_only;
    let state = Arc::new(state);

    log_call_home_config();

    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    tracing::info!(bind = %args.bind, "restconfd listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Call-home auto-registration is an external collaborator; this only
/// reads the two environment variables it needs and logs whether it is
/// configured. `CALLHOME_ADDR` unset means call-home is off.
fn log_call_home_config() {
    let device_id = std::env::var("DEVICE_ID").ok();
    let callhome_addr = std::env::var("CALLHOME_ADDR").ok();
    match (device_id, callhome_addr) {
        (Some(id), Some(addr)) => tracing::info!(device_id = %id, addr = %addr, "call-home configured"),
        (_, None) => tracing::debug!("call-home not configured (CALLHOME_ADDR unset)"),
        (None, Some(addr)) => tracing::warn!(addr = %addr, "CALLHOME_ADDR set without DEVICE_ID, ignoring"),
    }
}
