use tracing_subscriber::EnvFilter;

/// Crate targets that receive log output.
const CRATE_TARGETS: &[&str] = &["hbvedu_core", "hbvedu_python", "bench"];

/// Tracing filter directive for a verbosity level.
///
/// - 0 -> warn
/// - 1 -> info
/// - 2 -> debug
/// - 3+ -> trace
pub fn filter_directive(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    CRATE_TARGETS
        .iter()
        .map(|t| format!("{t}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install a stderr `fmt` subscriber.
///
/// `RUST_LOG` overrides `verbosity` if set. Returns `false` when a global
/// subscriber was already installed, leaving it in place.
pub fn init(verbosity: u8) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert!(filter_directive(0).starts_with("hbvedu_core=warn"));
        assert!(filter_directive(1).contains("hbvedu_python=info"));
        assert!(filter_directive(2).contains("=debug"));
        assert!(filter_directive(9).contains("=trace"));
    }

    #[test]
    fn second_init_is_a_no_op() {
        init(0);
        assert!(!init(1));
    }
}
