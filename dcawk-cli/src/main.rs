use dcawk_core::error::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod application;
mod presentation;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    application::run()
}
