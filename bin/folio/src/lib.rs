//! Folio CLI Library
//!
//! Command implementations for the `folio` binary, exposed as a library so they
//! can be tested and reused.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (render, article, site, export, sync, check)
//! - [`collection`] - Mapping from collection names to record kinds
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use folio::cmd;
//!
//! // Convert a directory of raw API dumps into flat JSON
//! cmd::export::run(Path::new("raw"), Path::new("data"), false).unwrap();
//! ```

pub mod cmd;
pub mod collection;

pub use collection::Collection;
pub use folio_core::Config;

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
///
/// # Example
///
/// ```no_run
/// folio::init_tracing(2); // Enable DEBUG level logging
/// ```
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level(verbose).into()))
        .init();
}

fn level(verbose: u8) -> tracing::Level {
    match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level(0), tracing::Level::WARN);
        assert_eq!(level(1), tracing::Level::INFO);
        assert_eq!(level(2), tracing::Level::DEBUG);
        assert_eq!(level(3), tracing::Level::TRACE);
        assert_eq!(level(9), tracing::Level::TRACE);
    }
}
