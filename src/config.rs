use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Parser;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
// Matches actix-web's own default body limit
pub const DEFAULT_PAYLOAD_LIMIT: usize = 256 * 1024;

/// Command-line configuration for the server process.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(author, version, about = "In-memory JSON key-value store served over HTTP")]
pub struct Config {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind to
    #[arg(long, default_value_t = DEFAULT_HOST)]
    pub host: IpAddr,

    /// Number of HTTP worker threads (defaults to the number of CPUs)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Largest request body accepted, in bytes
    #[arg(long, default_value_t = DEFAULT_PAYLOAD_LIMIT)]
    pub payload_limit: usize,
}

impl Config {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT,
            host: DEFAULT_HOST,
            workers: None,
            payload_limit: DEFAULT_PAYLOAD_LIMIT,
        }
    }
}
