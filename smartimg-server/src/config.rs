use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const APP_NAME: &str = "Smart Image Processing API";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Startup configuration, resolved once in `main` and shared read-only by every handler.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    // JPEG quality of persisted transform outputs: 1-100
    pub jpeg_quality: u8,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8000),
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 20 * 1024 * 1024,
            jpeg_quality: 95,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            anyhow::bail!("JPEG quality must be between 1 and 100");
        }
        if self.max_upload_bytes == 0 {
            anyhow::bail!("Upload limit must be greater than zero");
        }
        Ok(())
    }
}
