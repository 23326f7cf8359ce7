//! NetworkSink - UDP fire-and-forget streaming to a collector

use contracts::{HarvestError, NormalizedSample, SampleSink};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, error, instrument, warn};

/// Serialization format for network transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkFormat {
    /// JSON (human-readable, larger)
    #[default]
    Json,
    /// Bincode (binary, compact)
    Bincode,
}

/// Configuration for NetworkSink
#[derive(Debug, Clone)]
pub struct NetworkSinkConfig {
    /// Collector address
    pub addr: SocketAddr,
    /// Serialization format
    pub format: NetworkFormat,
    /// Max datagram size (UDP typically 65507 for IPv4)
    pub max_packet_size: usize,
}

impl NetworkSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let addr_str = params
            .get("addr")
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;

        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|e| format!("invalid address '{addr_str}': {e}"))?;

        let format = match params.get("format").map(String::as_str) {
            Some("bincode") => NetworkFormat::Bincode,
            Some("json") | None => NetworkFormat::Json,
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

/// Sink that sends samples over UDP
pub struct NetworkSink {
    name: String,
    config: NetworkSinkConfig,
    socket: Option<UdpSocket>,
}

impl NetworkSink {
    /// Create a new NetworkSink
    #[instrument(name = "network_sink_new", skip(name, config))]
    pub async fn new(name: impl Into<String>, config: NetworkSinkConfig) -> std::io::Result<Self> {
        let name = name.into();
        // Bind to any available port
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect(&config.addr).await?;

        debug!(
            sink = %name,
            target = %config.addr,
            "NetworkSink connected"
        );

        Ok(Self {
            name,
            config,
            socket: Some(socket),
        })
    }

    /// Create from params (for factory)
    #[instrument(name = "network_sink_from_params", skip(name, params))]
    pub async fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, HarvestError> {
        let config = NetworkSinkConfig::from_params(params)
            .map_err(|e| HarvestError::sink_write("network", e))?;

        Self::new(name, config)
            .await
            .map_err(|e| HarvestError::SinkConnection {
                sink_name: "network".to_string(),
                message: e.to_string(),
            })
    }

    fn serialize_sample(&self, sample: &NormalizedSample) -> Result<Vec<u8>, String> {
        match self.config.format {
            NetworkFormat::Json => {
                serde_json::to_vec(sample).map_err(|e| format!("json error: {e}"))
            }
            NetworkFormat::Bincode => {
                bincode::serialize(sample).map_err(|e| format!("bincode error: {e}"))
            }
        }
    }

    fn socket(&self) -> Result<&UdpSocket, HarvestError> {
        self.socket
            .as_ref()
            .ok_or_else(|| HarvestError::sink_write(&self.name, "socket not connected"))
    }

    fn prepare_payload(&self, sample: &NormalizedSample) -> Result<Vec<u8>, HarvestError> {
        let data = self
            .serialize_sample(sample)
            .map_err(|e| HarvestError::sink_write(&self.name, e))?;

        if data.len() > self.config.max_packet_size {
            warn!(
                sink = %self.name,
                size = data.len(),
                max = self.config.max_packet_size,
                "Datagram exceeds max packet size"
            );
        }

        Ok(data)
    }

    async fn transmit(&self, socket: &UdpSocket, data: &[u8], span_seq: u64) {
        match socket.send(data).await {
            Ok(sent) => {
                debug!(sink = %self.name, span_seq, bytes = sent, "Sent");
            }
            Err(e) => {
                // Log but don't fail - UDP is best-effort
                error!(sink = %self.name, error = %e, "UDP send failed");
            }
        }
    }
}

impl SampleSink for NetworkSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "network_sink_write",
        skip(self, sample),
        fields(sink = %self.name, span_seq = sample.meta.span_seq)
    )]
    async fn write(&mut self, sample: &NormalizedSample) -> Result<(), HarvestError> {
        let socket = self.socket()?;
        let data = self.prepare_payload(sample)?;
        self.transmit(socket, &data, sample.meta.span_seq).await;
        Ok(())
    }

    #[instrument(name = "network_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), HarvestError> {
        // UDP doesn't buffer
        Ok(())
    }

    #[instrument(name = "network_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), HarvestError> {
        self.socket = None;
        debug!(sink = %self.name, "NetworkSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{SpanMeta, SpanTermination};

    fn sample() -> NormalizedSample {
        NormalizedSample {
            meta: SpanMeta {
                batch_id: "20190612134501".into(),
                span_seq: 1,
                start_index: 1,
                end_index: 7,
                lead_padding: 3,
                termination: SpanTermination::Confirmed,
            },
            rows: 1,
            cols: 2,
            values: vec![0.25, 0.75],
        }
    }

    #[tokio::test]
    async fn test_network_sink_config_parsing() {
        let mut params = HashMap::new();
        params.insert("addr".to_string(), "127.0.0.1:9999".to_string());
        params.insert("format".to_string(), "bincode".to_string());

        let config = NetworkSinkConfig::from_params(&params).unwrap();
        assert_eq!(config.addr.port(), 9999);
        assert_eq!(config.format, NetworkFormat::Bincode);
    }

    #[tokio::test]
    async fn test_network_sink_missing_addr() {
        let params = HashMap::new();
        assert!(NetworkSinkConfig::from_params(&params).is_err());
    }

    #[tokio::test]
    async fn test_network_sink_write() {
        let config = NetworkSinkConfig {
            addr: "127.0.0.1:19998".parse().unwrap(),
            format: NetworkFormat::Json,
            max_packet_size: 65000,
        };

        let mut sink = NetworkSink::new("test_net", config).await.unwrap();

        // Should not fail even with no receiver (UDP is fire-and-forget)
        let result = sink.write(&sample()).await;
        assert!(result.is_ok());

        sink.close().await.unwrap();
        // Writing after close is an error
        assert!(sink.write(&sample()).await.is_err());
    }
}
