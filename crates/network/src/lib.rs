// crates/network/src/lib.rs
//! Network utilities for the radiosync service clients

mod client;
mod error;

pub use client::{Client, ClientConfig};
pub use error::{NetworkError, NetworkResult};
pub use reqwest::Method;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_exports_accessible() {
        let client = Client::new().expect("Failed to create client");
        let _cloned: Client = client.clone();
        let _: ClientConfig = ClientConfig::default();
    }
}
