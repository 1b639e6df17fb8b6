//! Logging setup
//!
//! Logs go to stderr so they never interleave with chat output on stdout.
//! `RUST_LOG` wins over the verbosity flag when set.

use crate::error::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive used when `RUST_LOG` is not set
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "dormguide=debug"
    } else {
        "dormguide=warn"
    }
}

/// Initialize the global tracing subscriber
///
/// # Errors
///
/// Returns error if the filter cannot be built or a subscriber is already
/// installed
///
/// # Examples
///
/// ```no_run
/// use dormguide::logging::init_logging;
///
/// init_logging(false, false).unwrap();
/// tracing::warn!("visible by default");
/// ```
pub fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(verbose)))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_follows_verbosity() {
        assert_eq!(default_directive(false), "dormguide=warn");
        assert_eq!(default_directive(true), "dormguide=debug");
    }

    #[test]
    fn test_default_directives_parse() {
        assert!(EnvFilter::try_new(default_directive(false)).is_ok());
        assert!(EnvFilter::try_new(default_directive(true)).is_ok());
    }
}
