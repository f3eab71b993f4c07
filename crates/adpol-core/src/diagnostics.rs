//! Domain controller reachability diagnostics.
//!
//! Small, dependency-free probe helpers used before a directory bind is
//! attempted. A failed GPO refresh on a roaming client is almost always a
//! transport problem (DNS, firewall, VPN), so the connector can run these
//! probes and hand the caller a structured report instead of a bare error.

use serde::{Deserialize, Serialize};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

// ─── Shared types ───────────────────────────────────────────────────────────

/// Result of a single diagnostic probe step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticStep {
    pub name: String,
    /// `"pass"` | `"fail"` | `"skip"` | `"info"`
    pub status: String,
    pub message: String,
    pub duration_ms: u64,
    pub detail: Option<String>,
}

/// Full report for one probed endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    pub host: String,
    pub port: u16,
    pub resolved_ip: Option<String>,
    pub steps: Vec<DiagnosticStep>,
    pub summary: String,
    pub total_duration_ms: u64,
}

impl DiagnosticReport {
    pub fn passed(&self) -> bool {
        self.steps.iter().all(|s| s.status != "fail")
    }
}

// ─── Probe helpers ──────────────────────────────────────────────────────────

/// Resolve a hostname and return the first address. Pushes a
/// [`DiagnosticStep`] onto `steps`. Returns `None` on failure.
pub fn probe_dns(host: &str, port: u16, steps: &mut Vec<DiagnosticStep>) -> Option<SocketAddr> {
    let addr_str = format!("{host}:{port}");
    let t = Instant::now();
    match addr_str.to_socket_addrs() {
        Ok(addrs) => {
            let all: Vec<SocketAddr> = addrs.collect();
            if all.is_empty() {
                steps.push(DiagnosticStep {
                    name: "DNS Resolution".into(),
                    status: "fail".into(),
                    message: format!("DNS returned no addresses for {host}"),
                    duration_ms: t.elapsed().as_millis() as u64,
                    detail: Some("Verify the controller name and DNS configuration".into()),
                });
                return None;
            }
            let first = all[0];
            let detail = if all.len() > 1 {
                Some(format!(
                    "All resolved addresses: {}",
                    all.iter()
                        .map(|a| a.ip().to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            } else {
                None
            };
            steps.push(DiagnosticStep {
                name: "DNS Resolution".into(),
                status: "pass".into(),
                message: format!("{host} → {}", first.ip()),
                duration_ms: t.elapsed().as_millis() as u64,
                detail,
            });
            Some(first)
        }
        Err(e) => {
            steps.push(DiagnosticStep {
                name: "DNS Resolution".into(),
                status: "fail".into(),
                message: format!("DNS lookup failed: {e}"),
                duration_ms: t.elapsed().as_millis() as u64,
                detail: Some(
                    "Domain members normally resolve the DC through AD-integrated DNS; \
                     check /etc/resolv.conf or the configured name servers"
                        .into(),
                ),
            });
            None
        }
    }
}

/// Attempt a TCP connect with timeout. Pushes a [`DiagnosticStep`].
pub fn probe_tcp(
    socket_addr: SocketAddr,
    timeout: Duration,
    steps: &mut Vec<DiagnosticStep>,
) -> Option<TcpStream> {
    let t = Instant::now();
    match TcpStream::connect_timeout(&socket_addr, timeout) {
        Ok(stream) => {
            steps.push(DiagnosticStep {
                name: "TCP Connect".into(),
                status: "pass".into(),
                message: format!("Connected to {socket_addr} in {}ms", t.elapsed().as_millis()),
                duration_ms: t.elapsed().as_millis() as u64,
                detail: None,
            });
            Some(stream)
        }
        Err(e) => {
            let detail = if e.kind() == std::io::ErrorKind::TimedOut {
                "Connection timed out — the port may be firewalled or the host unreachable"
            } else if e.kind() == std::io::ErrorKind::ConnectionRefused {
                "Connection refused — the directory service may not be listening on this port"
            } else {
                "Check firewall rules, VPN connectivity, and that the controller is up"
            };
            steps.push(DiagnosticStep {
                name: "TCP Connect".into(),
                status: "fail".into(),
                message: format!("TCP connect failed: {e}"),
                duration_ms: t.elapsed().as_millis() as u64,
                detail: Some(detail.into()),
            });
            None
        }
    }
}

/// Run the DNS + TCP probe sequence against one endpoint.
pub fn probe_endpoint(host: &str, port: u16, timeout: Duration) -> DiagnosticReport {
    let t = Instant::now();
    let mut steps = Vec::new();
    let addr = probe_dns(host, port, &mut steps);
    let mut resolved_ip = None;
    if let Some(addr) = addr {
        resolved_ip = Some(addr.ip().to_string());
        let _ = probe_tcp(addr, timeout, &mut steps);
    }
    let failed = steps.iter().filter(|s| s.status == "fail").count();
    let summary = if failed == 0 {
        format!("{host}:{port} reachable")
    } else {
        format!("{failed} probe step(s) failed for {host}:{port}")
    };
    DiagnosticReport {
        host: host.to_string(),
        port,
        resolved_ip,
        steps,
        summary,
        total_duration_ms: t.elapsed().as_millis() as u64,
    }
}
