// ---------------------------------------------------------------------------
// Env-var config helpers. Every knob has a hard default so the engine runs
// with zero configuration; the host environment overrides per deployment.
// ---------------------------------------------------------------------------

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

/// Unconditional post-navigation settle delay, in milliseconds.
///
/// A blunt trade-off favoring completeness over latency: late client-side
/// rendering on place pages routinely lands 1–2s after networkidle.
pub fn settle_delay_ms() -> u64 {
    env_u64("PLACE_SCOUT_SETTLE_MS", 3000)
}

/// Wait after loading a shortlink before reading the resolved URL.
pub fn shortlink_wait_ms() -> u64 {
    env_u64("PLACE_SCOUT_SHORTLINK_WAIT_MS", 2000)
}

/// Network-quiescence window: the page counts as settled once no new
/// resource entries appear for this long.
pub fn network_quiet_ms() -> u64 {
    env_u64("PLACE_SCOUT_NETWORK_QUIET_MS", 1500)
}

/// Hard ceiling on the network-quiescence wait.
pub fn network_quiet_timeout_ms() -> u64 {
    env_u64("PLACE_SCOUT_NETWORK_TIMEOUT_MS", 15_000)
}

/// HTTP service port: `PLACE_SCOUT_PORT` → `PORT` → 8080.
pub fn service_port() -> u16 {
    for key in ["PLACE_SCOUT_PORT", "PORT"] {
        if let Ok(v) = std::env::var(key) {
            if let Ok(p) = v.trim().parse::<u16>() {
                return p;
            }
        }
    }
    8080
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_env() {
        // Keys below are never set in the test environment.
        assert_eq!(env_u64("PLACE_SCOUT_TEST_UNSET_KEY", 42), 42);
        assert_eq!(settle_delay_ms(), 3000);
        assert_eq!(shortlink_wait_ms(), 2000);
    }
}
