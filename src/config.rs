use rdkafka::ClientConfig;

use crate::error::{Error, Result};

pub const CLIENT_ID: &str = "client.id";
pub const SEND_OLD_VALUES: &str = "join.send.old.values";

const DEFAULT_CLIENT_ID: &str = "ktjoin";

#[derive(Debug, Clone)]
pub struct Config(pub(crate) ClientConfig);

impl Config {
    pub fn new() -> Config {
        Config(ClientConfig::new())
    }

    pub fn set<'a>(&'a mut self, key: &str, value: &str) -> &'a mut Config {
        let Config(client_config) = self;
        client_config.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key)
    }

    /// Tag used for the thread level of metric sensors
    pub fn client_id(&self) -> &str {
        self.get(CLIENT_ID).unwrap_or(DEFAULT_CLIENT_ID)
    }

    /// Whether join processors materialize `old_value` of forwarded changes
    pub fn send_old_values(&self) -> Result<bool> {
        match self.get(SEND_OLD_VALUES) {
            None => Ok(false),
            Some(v) => v.trim().parse().map_err(|_| Error::Config {
                key: SEND_OLD_VALUES.to_string(),
                value: v.to_string(),
            }),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}
