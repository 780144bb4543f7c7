use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::record::{scalar_key, Tally};

/// Packet-like record. Missing attributes render as `null` in tally keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Packet {
    #[serde(rename = "sourceIP")]
    pub source_ip: Value,
    #[serde(rename = "destIP")]
    pub dest_ip: Value,
    #[serde(rename = "sourcePort")]
    pub source_port: Value,
    #[serde(rename = "destPort")]
    pub dest_port: Value,
    pub protocol: Value,
    pub timestamp: Value,
}

impl Packet {
    pub fn connection_key(&self) -> String {
        format!(
            "{}:{}-{}:{}",
            scalar_key(&self.source_ip),
            scalar_key(&self.source_port),
            scalar_key(&self.dest_ip),
            scalar_key(&self.dest_port)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionFinding {
    pub connection: String,
    pub count: usize,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortFinding {
    pub port: String,
    pub count: usize,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFinding {
    pub ip: String,
    pub count: usize,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSummary {
    pub total_connections: usize,
    #[serde(rename = "uniqueIPs")]
    pub unique_ips: usize,
    pub unique_ports: usize,
    pub suspicious_connections_count: usize,
    pub port_scan_attempts_count: usize,
    pub ddos_indicators_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkAnalysis {
    pub total_packets: usize,
    pub suspicious_connections: Vec<ConnectionFinding>,
    pub port_scan_attempts: Vec<PortFinding>,
    pub ddos_indicators: Vec<SourceFinding>,
    pub summary: NetworkSummary,
}

/// Elements that are not objects count as packets with every field missing.
pub fn packets_from_str(s: &str) -> Result<Vec<Packet>> {
    match serde_json::from_str::<Value>(s)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| -> Result<Packet> {
                match item {
                    v @ Value::Object(_) => Ok(serde_json::from_value(v)?),
                    _ => Ok(Packet::default()),
                }
            })
            .collect(),
        _ => Err(AnalysisError::Input("traffic data must be a JSON array of packets".into())),
    }
}

fn over<'a>(tally: &'a Tally, threshold: usize) -> impl Iterator<Item = (&'a str, usize)> {
    tally.iter().filter(move |(_, c)| *c > threshold)
}

/// Connection, port and source checks are independent; one stream can trip all three.
pub fn analyze_traffic(packets: &[Packet], cfg: &AnalysisConfig) -> NetworkAnalysis {
    let mut connections = Tally::new();
    let mut ports = Tally::new();
    let mut sources = Tally::new();
    for p in packets {
        connections.add(&p.connection_key());
        ports.add(&scalar_key(&p.dest_port));
        sources.add(&scalar_key(&p.source_ip));
    }

    let suspicious_connections: Vec<ConnectionFinding> = over(&connections, cfg.suspicious_connection_count)
        .map(|(k, count)| ConnectionFinding { connection: k.to_string(), count, description: "high connection count".into() })
        .collect();
    let port_scan_attempts: Vec<PortFinding> = over(&ports, cfg.port_scan_count)
        .map(|(k, count)| PortFinding { port: k.to_string(), count, description: "possible port scan".into() })
        .collect();
    let ddos_indicators: Vec<SourceFinding> = over(&sources, cfg.ddos_packet_count)
        .map(|(k, count)| SourceFinding { ip: k.to_string(), count, description: "possible DDoS source".into() })
        .collect();

    let summary = NetworkSummary {
        total_connections: connections.len(),
        unique_ips: sources.len(),
        unique_ports: ports.len(),
        suspicious_connections_count: suspicious_connections.len(),
        port_scan_attempts_count: port_scan_attempts.len(),
        ddos_indicators_count: ddos_indicators.len(),
    };
    debug!(packets = packets.len(), connections = summary.total_connections, "traffic analysis complete");
    NetworkAnalysis { total_packets: packets.len(), suspicious_connections, port_scan_attempts, ddos_indicators, summary }
}
