// common/src/utils.rs
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Parse a level name from configuration, defaulting to INFO on anything unknown
pub fn parse_level(name: &str) -> Level {
    name.trim().parse::<Level>().unwrap_or(Level::INFO)
}

/// Setup tracing for the client. Logs go to stderr so stdout carries only the rendered view.
pub fn setup_tracing(level: &str) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(level))
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        tracing::debug!("Tracing subscriber already installed: {}", e);
    }
}
