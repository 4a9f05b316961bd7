use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Set by the function runtime when the function is configured for structured logs
const LOG_FORMAT_ENV: &str = "AWS_LAMBDA_LOG_FORMAT";

pub fn setup_tracing(service_name: &str) {
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter_layer);

    // The runtime log sink timestamps every line and does not render colours
    if wants_json(std::env::var(LOG_FORMAT_ENV).ok().as_deref()) {
        registry
            .with(fmt::layer().json().with_ansi(false).without_time())
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_ansi(false).without_time())
            .init();
    }

    tracing::debug!(service = service_name, "tracing initialised");
}

fn wants_json(format: Option<&str>) -> bool {
    format.is_some_and(|f| f.eq_ignore_ascii_case("json"))
}
