//! UdpTransport - one datagram per batch

use std::collections::HashMap;
use std::net::SocketAddr;

use async_trait::async_trait;
use contracts::{ContractError, RecordBatch, Transport};
use tokio::net::UdpSocket;
use tracing::{debug, instrument, warn};

use super::BatchEnvelope;

/// Serialization format for network transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UdpFormat {
    /// JSON (human-readable, larger)
    #[default]
    Json,
    /// Bincode (binary, compact)
    Bincode,
}

/// Configuration for UdpTransport
#[derive(Debug, Clone)]
pub struct UdpTransportConfig {
    /// Target address
    pub addr: SocketAddr,
    /// Serialization format
    pub format: UdpFormat,
    /// Max datagram size (UDP typically 65507 for IPv4)
    pub max_packet_size: usize,
}

impl UdpTransportConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let addr_str = params
            .get("addr")
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;

        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|e| format!("invalid address '{addr_str}': {e}"))?;

        let format = match params.get("format").map(String::as_str) {
            Some("bincode") => UdpFormat::Bincode,
            Some("json") | None => UdpFormat::Json,
            Some(other) => return Err(format!("unknown format '{other}'")),
        };

        let max_packet_size = params
            .get("max_packet_size")
            .and_then(|s| s.parse().ok())
            .unwrap_or(65000);

        Ok(Self {
            addr,
            format,
            max_packet_size,
        })
    }
}

/// Transport that sends each batch as a single datagram
pub struct UdpTransport {
    name: String,
    config: UdpTransportConfig,
    socket: UdpSocket,
}

impl UdpTransport {
    /// Create a new UdpTransport
    #[instrument(name = "udp_transport_new", skip(name, config))]
    pub async fn new(
        name: impl Into<String>,
        config: UdpTransportConfig,
    ) -> std::io::Result<Self> {
        let name = name.into();
        // Bind to any available port
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect(&config.addr).await?;

        debug!(
            transport = %name,
            target = %config.addr,
            "UdpTransport connected"
        );

        Ok(Self {
            name,
            config,
            socket,
        })
    }

    /// Create from params (for factory)
    #[instrument(name = "udp_transport_from_params", skip(name, params))]
    pub async fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let config = UdpTransportConfig::from_params(params)
            .map_err(|e| ContractError::transport_submit("udp", e))?;

        Self::new(name, config)
            .await
            .map_err(|e| ContractError::transport_submit("udp", e.to_string()))
    }

    fn serialize_envelope(&self, envelope: &BatchEnvelope) -> Result<Vec<u8>, ContractError> {
        let data = match self.config.format {
            UdpFormat::Json => serde_json::to_vec(envelope)
                .map_err(|e| ContractError::transport_submit(&self.name, e.to_string()))?,
            UdpFormat::Bincode => bincode::serialize(envelope)
                .map_err(|e| ContractError::transport_submit(&self.name, e.to_string()))?,
        };

        if data.len() > self.config.max_packet_size {
            warn!(
                transport = %self.name,
                size = data.len(),
                max = self.config.max_packet_size,
                "datagram exceeds max packet size"
            );
        }

        Ok(data)
    }
}

#[async_trait]
impl Transport for UdpTransport {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "udp_transport_submit",
        skip(self, batch),
        fields(transport = %self.name, records = batch.len())
    )]
    async fn submit(&self, batch: &RecordBatch) -> Result<(), ContractError> {
        let envelope = BatchEnvelope::from_batch(&self.name, batch)?;
        let data = self.serialize_envelope(&envelope)?;

        let sent = self
            .socket
            .send(&data)
            .await
            .map_err(|e| ContractError::transport_submit(&self.name, e.to_string()))?;

        debug!(transport = %self.name, bytes = sent, "datagram sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn sample_batch() -> RecordBatch {
        let mut batch = RecordBatch::open();
        batch.try_add(Bytes::from_static(b"{\"type\":\"a\",\"n\":0}"), 1024);
        batch
    }

    #[tokio::test]
    async fn test_udp_config_parsing() {
        let mut params = HashMap::new();
        params.insert("addr".to_string(), "127.0.0.1:9999".to_string());
        params.insert("format".to_string(), "json".to_string());

        let config = UdpTransportConfig::from_params(&params).unwrap();
        assert_eq!(config.addr.port(), 9999);
        assert_eq!(config.format, UdpFormat::Json);
        assert_eq!(config.max_packet_size, 65000);
    }

    #[tokio::test]
    async fn test_udp_config_rejects_bad_addr() {
        let mut params = HashMap::new();
        params.insert("addr".to_string(), "not-an-addr".to_string());
        assert!(UdpTransportConfig::from_params(&params).is_err());
    }

    #[tokio::test]
    async fn test_udp_transport_submit() {
        let config = UdpTransportConfig {
            addr: "127.0.0.1:19997".parse().unwrap(),
            format: UdpFormat::Json,
            max_packet_size: 65000,
        };

        let transport = UdpTransport::new("test_udp", config).await.unwrap();
        // Succeeds even with no receiver (UDP doesn't care)
        let result = transport.submit(&sample_batch()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_udp_transport_bincode_format() {
        let config = UdpTransportConfig {
            addr: "127.0.0.1:19996".parse().unwrap(),
            format: UdpFormat::Bincode,
            max_packet_size: 65000,
        };

        let transport = UdpTransport::new("test_udp", config).await.unwrap();
        let result = transport.submit(&sample_batch()).await;
        assert!(result.is_ok());
    }
}
