use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use election_db::rocks_db_config::RocksdbConfig;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Where the node keeps its database.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the election database. Created on first start.
    pub path: PathBuf,
}

/// RPC configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcConfig {
    /// RPC host.
    pub bind_host: String,
    /// RPC port.
    pub bind_port: u16,
}

impl RpcConfig {
    /// The `host:port` the server listens on. Host names are resolved when binding.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.bind_port)
    }
}

/// Node configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NodeConfig {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// RPC configuration.
    pub rpc_config: RpcConfig,
    /// RocksDB tuning. Defaults apply when the section is missing.
    #[serde(default)]
    pub rocksdb: RocksdbConfig,
}

/// Reads a TOML file and deserializes it into `R`.
pub fn from_toml_path<P: AsRef<Path>, R: DeserializeOwned>(path: P) -> anyhow::Result<R> {
    let mut contents = String::new();
    {
        let mut file = File::open(path)?;
        file.read_to_string(&mut contents)?;
    }

    let result: R = toml::from_str(&contents)?;

    Ok(result)
}
