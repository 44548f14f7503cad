//! Service configuration

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Prediction service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: IpAddr,

    /// Server port
    pub port: u16,

    /// ONNX model file
    pub model_path: PathBuf,

    /// Label manifest paired with the model
    pub labels_path: PathBuf,

    /// Optional fruit catalog override; the built-in catalog is used otherwise
    pub fruit_profiles_path: Option<PathBuf>,

    /// Request body limit, kept above the upload limit so oversized files
    /// reach the handler and get a descriptive error
    pub max_body_bytes: usize,

    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5000,
            model_path: PathBuf::from("model/best_model_phase2.onnx"),
            labels_path: PathBuf::from("model/labels.json"),
            fruit_profiles_path: None,
            max_body_bytes: 32 * 1024 * 1024,
            intra_threads: 4,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST")
                .and_then(|h| h.parse().ok())
                .unwrap_or(defaults.host),

            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            model_path: lookup("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),

            labels_path: lookup("LABELS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.labels_path),

            fruit_profiles_path: lookup("FRUIT_PROFILES_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),

            max_body_bytes: lookup("MAX_BODY_BYTES")
                .and_then(|b| b.parse().ok())
                .unwrap_or(defaults.max_body_bytes),

            intra_threads: lookup("INTRA_THREADS")
                .and_then(|t| t.parse().ok())
                .filter(|t| *t > 0)
                .unwrap_or(defaults.intra_threads),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
