use ::tracing_subscriber::layer::SubscriberExt;
use ::tracing_subscriber::util::SubscriberInitExt;
use ::tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &'static str = &"resttest=debug";

///
/// Sends this crate's logs to the test output.
///
/// The filter is read from `RUST_LOG`, and falls back to `resttest=debug`.
/// It is safe to call more than once; only the first call installs a subscriber.
///
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let result = ::tracing_subscriber::registry()
        .with(filter)
        .with(::tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();

    if result.is_ok() {
        ::tracing::debug!("Logging initialised");
    }
}
