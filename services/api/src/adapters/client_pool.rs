//! services/api/src/adapters/client_pool.rs
//!
//! Holds one OpenAI-compatible client per configured API key. Every call picks a
//! key uniformly at random, which spreads quota across the keys.

use async_openai::{config::OpenAIConfig, Client};
use carefinder_core::ports::{PortError, PortResult};
use rand::seq::SliceRandom;

#[derive(Clone)]
pub struct ClientPool {
    clients: Vec<Client<OpenAIConfig>>,
}

impl ClientPool {
    /// Builds a client for every key against the same API base URL.
    pub fn new(api_base: &str, api_keys: &[String]) -> PortResult<Self> {
        if api_keys.is_empty() {
            return Err(PortError::InvalidInput(
                "at least one generative API key is required".to_string(),
            ));
        }
        let clients = api_keys
            .iter()
            .map(|key| {
                Client::with_config(
                    OpenAIConfig::new()
                        .with_api_base(api_base)
                        .with_api_key(key),
                )
            })
            .collect();
        Ok(Self { clients })
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Returns a randomly chosen client.
    pub fn pick(&self) -> PortResult<&Client<OpenAIConfig>> {
        self.clients
            .choose(&mut rand::thread_rng())
            .ok_or_else(|| PortError::Unexpected("client pool is empty".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_key_list() {
        assert!(matches!(
            ClientPool::new("http://localhost", &[]),
            Err(PortError::InvalidInput(_))
        ));
    }

    #[test]
    fn builds_one_client_per_key() {
        let keys = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let pool = ClientPool::new("http://localhost", &keys).unwrap();
        assert_eq!(pool.len(), 3);
        assert!(pool.pick().is_ok());
    }
}
