//! Runtime configuration.

use crate::diag;

pub const DEFAULT_HOST: &str = "localhost:1234";
pub const DEFAULT_ENDPOINT: &str = "/debug/grmon";
pub const DEFAULT_INTERVAL_SECS: u64 = 5;

/// Long flags that are also accepted with a single dash (`-host`).
const LONG_FLAGS: &[&str] = &["host", "self", "self-addr", "endpoint", "log", "help"];

/// Settings the binary hands to the sampler, the app and the diag server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `host[:port]` of the monitored process.
    pub host: String,
    /// Path of the dump endpoint on that host.
    pub endpoint: String,
    /// Automatic refresh interval; zero starts paused.
    pub interval_secs: u64,
    /// Serve our own thread dump.
    pub serve_self: bool,
    pub self_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            interval_secs: DEFAULT_INTERVAL_SECS,
            serve_self: false,
            self_addr: diag::DEFAULT_ADDR.to_string(),
        }
    }
}

impl Config {
    /// Endpoint path with a guaranteed leading slash.
    pub fn endpoint_path(&self) -> String {
        if self.endpoint.starts_with('/') {
            self.endpoint.clone()
        } else {
            format!("/{}", self.endpoint)
        }
    }

    /// URL polled for dumps.
    pub fn target_url(&self) -> String {
        format!("http://{}{}", self.host, self.endpoint_path())
    }
}

/// Rewrites single-dash long flags (`-host x`, `-self-addr=y`) to the
/// double-dash form clap expects. Short flags and values pass through.
pub fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 || arg.starts_with("--") {
                return arg;
            }
            let Some(rest) = arg.strip_prefix('-') else {
                return arg;
            };
            let name = rest.split_once('=').map_or(rest, |(name, _)| name);
            if LONG_FLAGS.contains(&name) {
                format!("-{}", arg)
            } else {
                arg
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_target_url() {
        let mut config = Config::default();
        assert_eq!(config.target_url(), "http://localhost:1234/debug/grmon");

        config.host = "10.0.0.7:6060".to_string();
        config.endpoint = "debug/pprof/goroutine?debug=2".to_string();
        assert_eq!(
            config.target_url(),
            "http://10.0.0.7:6060/debug/pprof/goroutine?debug=2"
        );
    }

    #[test]
    fn test_normalize_single_dash_long_flags() {
        let normalized = normalize_args(args(&[
            "rtmon",
            "-host",
            "db:8080",
            "-self",
            "-self-addr=0.0.0.0:9000",
            "-endpoint",
            "/dump",
        ]));
        assert_eq!(
            normalized,
            args(&[
                "rtmon",
                "--host",
                "db:8080",
                "--self",
                "--self-addr=0.0.0.0:9000",
                "--endpoint",
                "/dump",
            ])
        );
    }

    #[test]
    fn test_normalize_keeps_short_and_double_dash() {
        let input = args(&["rtmon", "-i", "0", "-vv", "--log", "/tmp/x.log", "-h"]);
        assert_eq!(normalize_args(input.clone()), input);
    }

    #[test]
    fn test_normalize_leaves_values_alone() {
        // A value that looks like a flag name is not the flag itself.
        let normalized = normalize_args(args(&["rtmon", "--endpoint", "host"]));
        assert_eq!(normalized, args(&["rtmon", "--endpoint", "host"]));
    }
}
