//! Logging init: structured tracing output on stderr

use tracing_subscriber::EnvFilter;

/// Default filter directive for a given verbosity
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "warn,file_audit_rs=debug"
    } else {
        "warn,file_audit_rs=info"
    }
}

/// Initialize logging to stderr. `RUST_LOG` overrides the default filter.
///
/// Stdout stays reserved for diagnostic lines.
pub fn init_logging(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_crate_level() {
        assert!(default_filter(true).ends_with("file_audit_rs=debug"));
        assert!(default_filter(false).ends_with("file_audit_rs=info"));
        assert!(EnvFilter::try_new(default_filter(true)).is_ok());
    }
}
