// Shared transport configuration for building reqwest::Client instances.
//
// Discovery goes to a public HTTPS service and verifies certificates.
// Bridges on the LAN serve self-signed certificates, so only the bridge
// client relaxes verification.

use std::time::Duration;

/// TLS verification mode.
///
/// Bridges that serve HTTPS use a certificate signed by the vendor's
/// private root, so strict verification only works for discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Accept any certificate (bridge self-signed certs).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(10),
        }
    }
}

impl TransportConfig {
    /// Discovery service transport: system certificate store.
    pub fn discovery(timeout: Duration) -> Self {
        Self {
            tls: TlsMode::System,
            timeout,
        }
    }

    /// LAN bridge transport: accepts the bridge's self-signed certificate.
    pub fn bridge(timeout: Duration) -> Self {
        Self {
            tls: TlsMode::DangerAcceptInvalid,
            timeout,
        }
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("huelink/", env!("CARGO_PKG_VERSION")));

        if self.tls == TlsMode::DangerAcceptInvalid {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder
            .build()
            .map_err(|e| crate::error::Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_bridge_transport_relaxes_tls() {
        let timeout = Duration::from_secs(3);
        assert_eq!(TransportConfig::discovery(timeout).tls, TlsMode::System);
        assert_eq!(TransportConfig::default().tls, TlsMode::System);
        assert_eq!(
            TransportConfig::bridge(timeout).tls,
            TlsMode::DangerAcceptInvalid
        );
        assert_eq!(TransportConfig::bridge(timeout).timeout, timeout);
    }

    #[test]
    fn both_transports_build() {
        let timeout = Duration::from_secs(3);
        assert!(TransportConfig::discovery(timeout).build_client().is_ok());
        assert!(TransportConfig::bridge(timeout).build_client().is_ok());
    }
}
