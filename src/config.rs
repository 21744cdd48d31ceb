use std::path::PathBuf;

use clap::Parser;

/// Default cluster-metadata log location used by a KRaft-combined broker.
///
/// https://kafka.apache.org/documentation/#log
const DEFAULT_METADATA_LOG: &str =
    "/tmp/kraft-combined-logs/__cluster_metadata-0/00000000000000000000.log";

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:9092";

#[derive(Debug, Clone, Parser)]
#[command(name = "kafka-broker", about = "Minimal Kafka-compatible wire broker")]
pub struct Config {
    /// Address to accept client connections on.
    #[arg(long, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: String,

    /// Path to the cluster-metadata log read once at startup.
    #[arg(long, default_value = DEFAULT_METADATA_LOG)]
    pub metadata_log: PathBuf,
}
