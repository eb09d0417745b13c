// Copyright 2023 Ant Group Co., Ltd.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::Parser;
use merge::Merge;
use serde::Deserialize;
use std::{fs::File, io::BufReader};

#[derive(Parser)]
pub struct LineArgs {
    #[clap(long = "config_path", default_value = "/host/config.yaml")]
    pub config_path: std::path::PathBuf,

    /// Rest of arguments
    #[clap(flatten)]
    pub config: Config,
}

#[derive(Parser, Deserialize, Merge)]
pub struct Config {
    /// listening address
    #[clap(long)]
    pub host: Option<String>,
    /// listening port
    #[clap(long)]
    pub port: Option<u32>,
    /// log config
    #[clap(flatten)]
    #[serde(default)]
    pub log_config: LogConfig,
    /// base64 of the rsa public key (SPKI or pkcs#1, pem or der)
    #[clap(long, env = "RSA_PUBLIC_KEY_BASE64", hide_env_values = true)]
    pub rsa_public_key_base64: Option<String>,
    /// base64 of the rsa private key (pkcs#8 or pkcs#1, pem or der)
    #[clap(long, env = "RSA_PRIVATE_KEY_BASE64", hide_env_values = true)]
    pub rsa_private_key_base64: Option<String>,
    // server cert path
    #[clap(long)]
    pub server_cert_path: Option<String>,
    // server cert key path
    #[clap(long)]
    pub server_cert_key_path: Option<String>,
    // root ca cert path
    #[clap(long)]
    pub client_ca_cert_path: Option<String>,
    // Tls
    #[clap(long)]
    pub enable_tls: Option<bool>,
}

#[derive(Parser, Deserialize, Merge, Default)]
pub struct LogConfig {
    /// log file name
    #[clap(long = "log_config.log_file_name")]
    pub log_file_name: Option<String>,
    /// monitor log file name
    #[clap(long = "log_config.monitor_log_file_name")]
    pub monitor_log_file_name: Option<String>,
    /// log level
    #[clap(long = "log_config.log_level")]
    pub log_level: Option<String>,
    /// enable console logger
    #[clap(long = "log_config.enable_console_logger")]
    pub enable_console_logger: Option<bool>,
    /// log window size
    #[clap(long = "log_config.log_window_size")]
    pub log_window_size: Option<u32>,
    /// log size limit, MB
    #[clap(long = "log_config.log_size_limit")]
    pub log_size_limit: Option<u64>,
}

impl Config {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // Parse whole args with clap
        let args = LineArgs::parse();
        let mut config = args.config;

        // values given on the command line win over the config file
        if let Ok(f) = File::open(&args.config_path) {
            let file_config = serde_yaml::from_reader::<_, Config>(BufReader::new(f))
                .map_err(|e| format!("Error in configuration file {:?}: {}", args.config_path, e))?;
            config.merge(file_config);
        }
        Ok(config)
    }
}
