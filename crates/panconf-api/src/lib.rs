// panconf-api: Async Rust client for the PAN-OS XML API

pub mod client;
pub mod error;
pub mod keygen;
pub mod transport;
pub mod xml;

pub use client::XmlApiClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use xml::XmlElement;
