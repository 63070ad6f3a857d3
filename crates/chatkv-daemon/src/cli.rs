//! Command line arguments.

use std::path::PathBuf;

use chatkv_core::StoreConfig;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "chatkv-daemon", version, about = "Serve a chatkv data directory over HTTP")]
pub struct Args {
    /// Directory holding items.json and groups.json.
    ///
    /// Defaults to CHATKV_DATA_DIR, then /chatkv-data when CHATKV_ENV is
    /// "production", then the current directory.
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Address to bind.
    #[arg(long, env = "CHATKV_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = "CHATKV_PORT", default_value_t = 3210)]
    pub port: u16,

    /// Write pretty-printed JSON documents.
    #[arg(long)]
    pub pretty: bool,
}

impl Args {
    pub fn store_config(&self) -> StoreConfig {
        let mut builder = StoreConfig::builder().pretty(self.pretty);
        if let Some(dir) = &self.data_dir {
            builder = builder.data_dir(dir);
        }
        builder.build()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
