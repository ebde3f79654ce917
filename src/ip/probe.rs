//! Liveness probing of candidate addresses.
//!
//! A candidate counts as occupied when it answers a single echo request
//! within the probe timeout. One lost packet makes a used address look free;
//! this is accepted in exchange for a scan that takes about one timeout per
//! candidate.

use crate::error::AssignError;
use crate::platform::Platform;
use crate::process::{CommandOutput, CommandRunner};
use regex::Regex;
use std::net::Ipv4Addr;
use std::sync::OnceLock;
use std::time::Duration;

/// Reachability check used as a proxy for "address already in use"
pub trait LivenessProbe {
    /// Whether `address` answered the probe
    fn is_alive(&self, address: Ipv4Addr) -> Result<bool, AssignError>;
}

impl<P: LivenessProbe + ?Sized> LivenessProbe for &P {
    fn is_alive(&self, address: Ipv4Addr) -> Result<bool, AssignError> {
        (**self).is_alive(address)
    }
}

/// Probe for hosts without a known `ping`; every probe fails the run
#[derive(Debug, Clone)]
pub struct UnsupportedProbe {
    platform: Platform,
}

impl LivenessProbe for UnsupportedProbe {
    fn is_alive(&self, _address: Ipv4Addr) -> Result<bool, AssignError> {
        Err(AssignError::UnsupportedPlatform(self.platform.to_string()))
    }
}

/// Pick the probe for `platform`
pub fn probe_for<R>(platform: &Platform, timeout: Duration, runner: R) -> Box<dyn LivenessProbe>
where
    R: CommandRunner + 'static,
{
    match PingProbe::new(platform, timeout, runner) {
        Ok(probe) => Box::new(probe),
        Err(_) => Box::new(UnsupportedProbe { platform: platform.clone() }),
    }
}

/// Flavour of the system `ping` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PingFlavor {
    /// iputils ping: `-W` in seconds
    Linux,
    /// BSD ping: `-W` in milliseconds
    MacOs,
    /// `ping.exe`: `-n` count, `-w` in milliseconds
    Windows,
}

fn posix_summary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\s+(?:packets\s+)?received").expect("valid ping summary pattern"))
}

fn windows_summary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Received\s*=\s*(\d+)").expect("valid ping summary pattern"))
}

/// Output markers `ping.exe` prints when no host replied, even on exit 0
const WINDOWS_FAILURE_MARKERS: [&str; 2] = ["destination host unreachable", "request timed out"];

/// Single echo request through the system `ping` command
pub struct PingProbe<R> {
    flavor: PingFlavor,
    timeout: Duration,
    runner: R,
}

impl<R: CommandRunner> PingProbe<R> {
    /// Build a probe for `platform`, failing on hosts without a known `ping`
    pub fn new(platform: &Platform, timeout: Duration, runner: R) -> Result<Self, AssignError> {
        let flavor = match platform {
            Platform::Linux => PingFlavor::Linux,
            Platform::MacOs => PingFlavor::MacOs,
            Platform::Windows => PingFlavor::Windows,
            Platform::Other(os) => return Err(AssignError::UnsupportedPlatform(os.clone())),
        };

        Ok(PingProbe { flavor, timeout, runner })
    }

    /// Arguments passed to `ping` for `address`
    pub fn args(&self, address: Ipv4Addr) -> Vec<String> {
        let millis = self.timeout.as_millis().max(1).to_string();
        let mut args: Vec<String> = match self.flavor {
            PingFlavor::Linux => {
                let secs = self.timeout.as_secs() + u64::from(self.timeout.subsec_nanos() > 0);
                vec!["-c".into(), "1".into(), "-W".into(), secs.max(1).to_string()]
            }
            PingFlavor::MacOs => vec!["-c".into(), "1".into(), "-W".into(), millis],
            PingFlavor::Windows => vec!["-n".into(), "1".into(), "-w".into(), millis],
        };
        args.push(address.to_string());
        args
    }

    /// Number of replies reported in the summary, if one was printed
    fn replies(&self, output: &str) -> Option<u32> {
        let pattern = match self.flavor {
            PingFlavor::Linux | PingFlavor::MacOs => posix_summary(),
            PingFlavor::Windows => windows_summary(),
        };
        pattern
            .captures(output)
            .and_then(|caps| caps.get(1))
            .and_then(|count| count.as_str().parse().ok())
    }

    fn verdict(&self, output: &CommandOutput) -> bool {
        if !output.success {
            return false;
        }

        let text = output.combined();
        if self.flavor == PingFlavor::Windows {
            let lower = text.to_lowercase();
            if WINDOWS_FAILURE_MARKERS.iter().any(|marker| lower.contains(marker)) {
                return false;
            }
        }

        self.replies(&text).map_or(true, |count| count >= 1)
    }
}

impl<R: CommandRunner> LivenessProbe for PingProbe<R> {
    fn is_alive(&self, address: Ipv4Addr) -> Result<bool, AssignError> {
        let args = self.args(address);
        let alive = match self.runner.run("ping", &args) {
            Ok(output) => self.verdict(&output),
            Err(e) => {
                log::warn!("Probe of {} could not run, treating address as free: {}", address, e);
                false
            }
        };

        log::debug!("Probe {}: {}", address, if alive { "in use" } else { "free" });
        Ok(alive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ShellCommandError;
    use std::cell::RefCell;

    /// Replays one canned output and records the arguments it was given
    struct CannedRunner {
        output: Option<CommandOutput>,
        calls: RefCell<Vec<(String, Vec<String>)>>,
    }

    impl CannedRunner {
        fn new(output: CommandOutput) -> Self {
            CannedRunner { output: Some(output), calls: RefCell::new(Vec::new()) }
        }

        fn unlaunchable() -> Self {
            CannedRunner { output: None, calls: RefCell::new(Vec::new()) }
        }
    }

    impl CommandRunner for CannedRunner {
        fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, ShellCommandError> {
            self.calls.borrow_mut().push((program.to_string(), args.to_vec()));
            self.output.clone().ok_or_else(|| ShellCommandError::Launch {
                program: program.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no ping"),
            })
        }
    }

    const LINUX_REPLY: &str = "PING 10.0.0.5 (10.0.0.5) 56(84) bytes of data.\n\
        64 bytes from 10.0.0.5: icmp_seq=1 ttl=64 time=0.321 ms\n\n\
        --- 10.0.0.5 ping statistics ---\n\
        1 packets transmitted, 1 received, 0% packet loss, time 0ms\n";

    const LINUX_NO_REPLY: &str = "PING 10.0.0.6 (10.0.0.6) 56(84) bytes of data.\n\n\
        --- 10.0.0.6 ping statistics ---\n\
        1 packets transmitted, 0 received, 100% packet loss, time 0ms\n";

    const WINDOWS_UNREACHABLE: &str = "Pinging 10.0.0.7 with 32 bytes of data:\r\n\
        Reply from 10.0.0.1: Destination host unreachable.\r\n\r\n\
        Ping statistics for 10.0.0.7:\r\n\
        \x20   Packets: Sent = 1, Received = 1, Lost = 0 (0% loss),\r\n";

    const WINDOWS_TIMED_OUT: &str = "Pinging 10.0.0.10 with 32 bytes of data:\r\n\
        Request timed out.\r\n";

    const WINDOWS_REPLY: &str = "Pinging 10.0.0.8 with 32 bytes of data:\r\n\
        Reply from 10.0.0.8: bytes=32 time<1ms TTL=128\r\n\r\n\
        Ping statistics for 10.0.0.8:\r\n\
        \x20   Packets: Sent = 1, Received = 1, Lost = 0 (0% loss),\r\n";

    fn probe(platform: Platform, runner: CannedRunner) -> PingProbe<CannedRunner> {
        PingProbe::new(&platform, Duration::from_secs(1), runner).unwrap()
    }

    #[test]
    fn test_linux_args() {
        let probe = probe(Platform::Linux, CannedRunner::unlaunchable());
        assert_eq!(probe.args(Ipv4Addr::new(10, 0, 0, 5)), vec!["-c", "1", "-W", "1", "10.0.0.5"]);
    }

    #[test]
    fn test_linux_timeout_rounds_up() {
        let probe = PingProbe::new(&Platform::Linux, Duration::from_millis(1500), CannedRunner::unlaunchable()).unwrap();
        assert_eq!(probe.args(Ipv4Addr::new(10, 0, 0, 5))[3], "2");

        let probe = PingProbe::new(&Platform::Linux, Duration::from_millis(200), CannedRunner::unlaunchable()).unwrap();
        assert_eq!(probe.args(Ipv4Addr::new(10, 0, 0, 5))[3], "1");
    }

    #[test]
    fn test_windows_and_macos_args() {
        let windows = probe(Platform::Windows, CannedRunner::unlaunchable());
        assert_eq!(windows.args(Ipv4Addr::new(10, 0, 0, 5)), vec!["-n", "1", "-w", "1000", "10.0.0.5"]);

        let macos = probe(Platform::MacOs, CannedRunner::unlaunchable());
        assert_eq!(macos.args(Ipv4Addr::new(10, 0, 0, 5)), vec!["-c", "1", "-W", "1000", "10.0.0.5"]);
    }

    #[test]
    fn test_unsupported_platform_fails_closed() {
        let result = PingProbe::new(&Platform::Other("plan9".to_string()), Duration::from_secs(1), CannedRunner::unlaunchable());
        assert!(matches!(result, Err(AssignError::UnsupportedPlatform(os)) if os == "plan9"));
    }

    #[test]
    fn test_probe_for_unsupported_platform() {
        let probe = probe_for(&Platform::Other("haiku".to_string()), Duration::from_secs(1), CannedRunner::unlaunchable());
        assert_eq!(
            probe.is_alive(Ipv4Addr::new(10, 0, 0, 1)),
            Err(AssignError::UnsupportedPlatform("haiku".to_string()))
        );
    }

    #[test]
    fn test_reply_means_alive() {
        let probe = probe(Platform::Linux, CannedRunner::new(CommandOutput::succeeded("ping", LINUX_REPLY)));
        assert!(probe.is_alive(Ipv4Addr::new(10, 0, 0, 5)).unwrap());

        let calls = probe.runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "ping");
    }

    #[test]
    fn test_no_reply_means_free() {
        let probe = probe(Platform::Linux, CannedRunner::new(CommandOutput::failed("ping", 1, LINUX_NO_REPLY, "")));
        assert!(!probe.is_alive(Ipv4Addr::new(10, 0, 0, 6)).unwrap());
    }

    #[test]
    fn test_zero_received_with_success_exit_means_free() {
        let probe = probe(Platform::Linux, CannedRunner::new(CommandOutput::succeeded("ping", LINUX_NO_REPLY)));
        assert!(!probe.is_alive(Ipv4Addr::new(10, 0, 0, 6)).unwrap());
    }

    #[test]
    fn test_missing_summary_trusts_exit_status() {
        let probe = probe(Platform::MacOs, CannedRunner::new(CommandOutput::succeeded("ping", "")));
        assert!(probe.is_alive(Ipv4Addr::new(10, 0, 0, 6)).unwrap());
    }

    #[test]
    fn test_macos_summary() {
        let output = "1 packets transmitted, 1 packets received, 0.0% packet loss\n";
        let probe = probe(Platform::MacOs, CannedRunner::new(CommandOutput::succeeded("ping", output)));
        assert!(probe.is_alive(Ipv4Addr::new(10, 0, 0, 6)).unwrap());
    }

    #[test]
    fn test_windows_unreachable_marker_means_free() {
        let probe = probe(Platform::Windows, CannedRunner::new(CommandOutput::succeeded("ping", WINDOWS_UNREACHABLE)));
        assert!(!probe.is_alive(Ipv4Addr::new(10, 0, 0, 7)).unwrap());
    }

    #[test]
    fn test_windows_request_timed_out_means_free() {
        let probe = probe(Platform::Windows, CannedRunner::new(CommandOutput::succeeded("ping", WINDOWS_TIMED_OUT)));
        assert!(!probe.is_alive(Ipv4Addr::new(10, 0, 0, 10)).unwrap());
    }

    #[test]
    fn test_windows_reply_means_alive() {
        let probe = probe(Platform::Windows, CannedRunner::new(CommandOutput::succeeded("ping", WINDOWS_REPLY)));
        assert!(probe.is_alive(Ipv4Addr::new(10, 0, 0, 8)).unwrap());
    }

    #[test]
    fn test_launch_failure_means_free() {
        let probe = probe(Platform::Linux, CannedRunner::unlaunchable());
        assert!(!probe.is_alive(Ipv4Addr::new(10, 0, 0, 9)).unwrap());
    }
}
