// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// mDNS service discovery for eSCL scanners on the local network.
//
// We browse for `_uscan._tcp.local.` and `_uscans._tcp.local.` using the
// `mdns-sd` crate for a fixed window, then stop and hand back everything that
// resolved in the meantime. Nothing is deduplicated: a device announced
// twice is listed twice.

use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mdns_sd::{ServiceDaemon, ServiceEvent};
use tracing::{debug, info, warn};

use scanwerk_core::error::{Result, ScanError};
use scanwerk_core::types::ScannerRef;

/// Strip the `._service._tcp.local.` suffix from an mDNS instance name.
///
/// `"Canon iR-ADV C3525._uscan._tcp.local."` becomes `"Canon iR-ADV C3525"`.
pub fn display_name(fullname: &str) -> &str {
    fullname
        .split_once("._")
        .map(|(name, _)| name)
        .unwrap_or(fullname)
}

/// Collector of resolved scanner announcements.
///
/// Cloning shares the underlying list, so listener threads and the caller
/// see the same records.
#[derive(Clone, Default)]
pub struct ScannerListener {
    scanners: Arc<Mutex<Vec<ScannerRef>>>,
}

impl ScannerListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one resolved announcement.
    ///
    /// `mdns-sd` hands over the address set unordered, so there is no stable
    /// "first" address: an IPv4 address is taken when one exists, otherwise
    /// whichever address comes first. Announcements with no address are
    /// dropped.
    pub fn on_resolved(&self, service_type: &str, fullname: &str, addresses: &[IpAddr], port: u16) {
        let Some(ip) = addresses
            .iter()
            .find(|a| a.is_ipv4())
            .or_else(|| addresses.first())
        else {
            warn!(name = %fullname, "resolved scanner has no address");
            return;
        };

        let scanner = ScannerRef {
            name: display_name(fullname).to_string(),
            host: ip.to_string(),
            port,
            service_type: service_type.to_string(),
        };
        info!(
            name = %scanner.name,
            host = %scanner.host,
            port = scanner.port,
            "scanner added"
        );
        self.scanners
            .lock()
            .expect("scanner list lock poisoned")
            .push(scanner);
    }

    /// Removal announcements are logged only; the list is append-only for
    /// the lifetime of one discovery run.
    pub fn on_removed(&self, service_type: &str, fullname: &str) {
        info!(service_type = %service_type, name = %fullname, "scanner removed");
    }

    /// Snapshot of everything recorded so far, in arrival order.
    pub fn scanners(&self) -> Vec<ScannerRef> {
        self.scanners
            .lock()
            .expect("scanner list lock poisoned")
            .clone()
    }
}

/// Browse the given service types for exactly `window`, then stop and return
/// what was collected.
///
/// An empty result is a success. Only a failure to start the mDNS daemon or
/// a browse is an error.
pub async fn discover(service_types: &[String], window: Duration) -> Result<Vec<ScannerRef>> {
    info!(?service_types, window_ms = window.as_millis() as u64, "scanner discovery started");

    let daemon = ServiceDaemon::new()
        .map_err(|e| ScanError::Discovery(format!("failed to start mDNS daemon: {e}")))?;
    let listener = ScannerListener::new();

    let mut browsing = Vec::new();
    for service_type in service_types {
        let receiver = match daemon.browse(service_type) {
            Ok(receiver) => receiver,
            Err(e) => {
                shutdown_daemon(&daemon, &browsing);
                return Err(ScanError::Discovery(format!("browse {service_type}: {e}")));
            }
        };
        if let Err(e) = spawn_listener(service_type.clone(), receiver, listener.clone()) {
            shutdown_daemon(&daemon, &browsing);
            return Err(e);
        }
        browsing.push(service_type.clone());
    }

    // No early exit: results only count once the window has elapsed.
    tokio::time::sleep(window).await;

    shutdown_daemon(&daemon, &browsing);

    let scanners = listener.scanners();
    info!(count = scanners.len(), "discovery complete");
    Ok(scanners)
}

/// Stop every browse and shut the daemon down. Failures are logged only.
fn shutdown_daemon(daemon: &ServiceDaemon, browsing: &[String]) {
    for service_type in browsing {
        if let Err(e) = daemon.stop_browse(service_type) {
            warn!(service_type = %service_type, error = %e, "failed to stop mDNS browse");
        }
    }
    if let Err(e) = daemon.shutdown() {
        warn!(error = %e, "mDNS daemon shutdown failed");
    }
}

/// Spawn a thread that drains the browse receiver into the listener.
fn spawn_listener(
    service_type: String,
    receiver: mdns_sd::Receiver<ServiceEvent>,
    listener: ScannerListener,
) -> Result<()> {
    std::thread::Builder::new()
        .name(format!("mdns-{service_type}"))
        .spawn(move || {
            // The channel closes when browsing stops or the daemon shuts down.
            while let Ok(event) = receiver.recv() {
                match event {
                    ServiceEvent::SearchStarted(stype) => {
                        debug!(service_type = %stype, "mDNS search started");
                    }
                    ServiceEvent::ServiceFound(stype, fullname) => {
                        info!(service_type = %stype, name = %fullname, "scanner detected");
                    }
                    ServiceEvent::ServiceResolved(info) => {
                        let addresses: Vec<IpAddr> =
                            info.get_addresses().iter().copied().collect();
                        listener.on_resolved(
                            &service_type,
                            info.get_fullname(),
                            &addresses,
                            info.get_port(),
                        );
                    }
                    ServiceEvent::ServiceRemoved(stype, fullname) => {
                        listener.on_removed(&stype, &fullname);
                    }
                    ServiceEvent::SearchStopped(stype) => {
                        debug!(service_type = %stype, "mDNS search stopped");
                        break;
                    }
                }
            }
        })
        .map(|_| ())
        .map_err(|e| ScanError::Discovery(format!("failed to spawn mDNS listener: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    const USCAN: &str = "_uscan._tcp.local.";

    #[test]
    fn service_suffix_is_stripped() {
        assert_eq!(
            display_name("Canon iR-ADV C3525._uscan._tcp.local."),
            "Canon iR-ADV C3525"
        );
        assert_eq!(display_name("HP OfficeJet._uscans._tcp.local."), "HP OfficeJet");
        assert_eq!(display_name("bare-name"), "bare-name");
    }

    #[test]
    fn announcement_becomes_scanner_ref() {
        let listener = ScannerListener::new();
        listener.on_resolved(
            USCAN,
            "Brother MFC._uscan._tcp.local.",
            &[IpAddr::V4(Ipv4Addr::new(192, 168, 1, 40))],
            80,
        );
        assert_eq!(
            listener.scanners(),
            vec![ScannerRef {
                name: "Brother MFC".into(),
                host: "192.168.1.40".into(),
                port: 80,
                service_type: USCAN.into(),
            }]
        );
    }

    #[test]
    fn ipv4_is_preferred_over_ipv6() {
        let listener = ScannerListener::new();
        listener.on_resolved(
            USCAN,
            "Epson._uscan._tcp.local.",
            &[
                IpAddr::V6(Ipv6Addr::LOCALHOST),
                IpAddr::V4(Ipv4Addr::new(10, 0, 0, 9)),
            ],
            443,
        );
        assert_eq!(listener.scanners()[0].host, "10.0.0.9");
    }

    #[test]
    fn repeat_announcements_are_not_deduplicated() {
        let listener = ScannerListener::new();
        let addr = [IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2))];
        listener.on_resolved(USCAN, "Dup._uscan._tcp.local.", &addr, 80);
        listener.on_resolved(USCAN, "Dup._uscan._tcp.local.", &addr, 80);
        listener.on_removed(USCAN, "Dup._uscan._tcp.local.");
        assert_eq!(listener.scanners().len(), 2);
    }

    #[test]
    fn addressless_announcement_is_dropped() {
        let listener = ScannerListener::new();
        listener.on_resolved(USCAN, "Ghost._uscan._tcp.local.", &[], 80);
        assert!(listener.scanners().is_empty());
    }
}
