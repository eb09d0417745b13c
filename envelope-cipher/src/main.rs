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

mod config;

use std::fs;

use envelope_cipher::server::constant::{DEFAULT_HOST, DEFAULT_PORT};
use envelope_cipher::server::CryptoServiceImpl;
use envelope_cipher::utils::{crypto::envelope::EnvelopeCipher, key_source::decode_key_material};
use envelope_cipher_tonic::crypto_service_server::CryptoServiceServer;

use config::LogConfig;
use log::{info, LevelFilter};
use tonic::transport::Server;

const LOG_PATTERN: &str = "[{d}] [{t}] [{l}] {m}{n}";

// init log
fn init_log(log_config: &LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    use log4rs::append::console::ConsoleAppender;
    use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
    use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
    use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
    use log4rs::append::rolling_file::RollingFileAppender;
    use log4rs::config::{Appender, Config, Logger, Root};
    use log4rs::encode::pattern::PatternEncoder;

    let log_level = match log_config.log_level.as_deref() {
        Some("debug") => LevelFilter::Debug,
        Some("warn") => LevelFilter::Warn,
        Some("error") => LevelFilter::Error,
        _ => LevelFilter::Info,
    };
    let log_file_name = log_config
        .log_file_name
        .clone()
        .unwrap_or_else(|| "logs/envelope-cipher.log".to_owned());
    let monitor_log_file_name = log_config
        .monitor_log_file_name
        .clone()
        .unwrap_or_else(|| "logs/envelope-cipher-monitor.log".to_owned());
    let log_window_size = log_config.log_window_size.unwrap_or(10);
    let log_size_limit = log_config.log_size_limit.unwrap_or(100) * 1024 * 1024;

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build();

    type AppenderResult = Result<RollingFileAppender, Box<dyn std::error::Error>>;
    let rolling_appender = |file_name: &str| -> AppenderResult {
        let fixed_window_roller =
            FixedWindowRoller::builder().build(&format!("{}.{{}}", file_name), log_window_size)?;
        let compound_policy = CompoundPolicy::new(
            Box::new(SizeTrigger::new(log_size_limit)),
            Box::new(fixed_window_roller),
        );
        Ok(RollingFileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build(file_name, Box::new(compound_policy))?)
    };
    let service_log = rolling_appender(&log_file_name)?;
    let monitor_log = rolling_appender(&monitor_log_file_name)?;

    let mut root_builder = Root::builder().appender("service_log");
    if log_config.enable_console_logger.unwrap_or(true) {
        root_builder = root_builder.appender("stdout");
    }

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .appender(Appender::builder().build("monitor_log", Box::new(monitor_log)))
        .appender(Appender::builder().build("service_log", Box::new(service_log)))
        .logger(
            Logger::builder()
                .appender("monitor_log")
                .additive(false)
                .build("monitor", log_level),
        )
        .build(root_builder.build(log_level))?;

    log4rs::init_config(config)?;
    Ok(())
}

#[tokio::main(worker_threads = 16)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse whole args with clap
    let cfg = config::Config::new()?;

    // init log
    init_log(&cfg.log_config)?;

    // key pair must load before the listener opens
    let public_key = decode_key_material(
        "rsa_public_key_base64",
        cfg.rsa_public_key_base64.as_deref(),
    )?;
    let private_key = decode_key_material(
        "rsa_private_key_base64",
        cfg.rsa_private_key_base64.as_deref(),
    )?;
    let cipher = EnvelopeCipher::new(&public_key, &private_key)?;
    let crypto_service = CryptoServiceImpl::new(cipher);

    let host = cfg.host.as_deref().unwrap_or(DEFAULT_HOST);
    let port = cfg.port.unwrap_or(DEFAULT_PORT);
    let addr: std::net::SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("envelope cipher listening on {}", addr);

    if cfg.enable_tls.unwrap_or(false) {
        let cert_path = cfg
            .server_cert_path
            .as_ref()
            .ok_or("server_cert_path is required when tls is enabled")?;
        let key_path = cfg
            .server_cert_key_path
            .as_ref()
            .ok_or("server_cert_key_path is required when tls is enabled")?;
        let client_ca_dir = cfg
            .client_ca_cert_path
            .as_ref()
            .ok_or("client_ca_cert_path is required when tls is enabled")?;

        let cert = fs::read_to_string(cert_path)?;
        let key = fs::read_to_string(key_path)?;
        let id = tonic::transport::Identity::from_pem(cert, key);

        // all client ca certs in the directory are trusted
        let mut client_pem_vec: Vec<u8> = vec![];
        for entry in fs::read_dir(client_ca_dir)? {
            let path = entry?.path();
            client_pem_vec.append(&mut fs::read(&path)?);
        }

        let client_ca_cert = tonic::transport::Certificate::from_pem(client_pem_vec);
        let tls_config = tonic::transport::ServerTlsConfig::new()
            .identity(id)
            .client_ca_root(client_ca_cert);
        Server::builder()
            .tls_config(tls_config)?
            .add_service(CryptoServiceServer::new(crypto_service))
            .serve(addr)
            .await?;
    } else {
        Server::builder()
            .add_service(CryptoServiceServer::new(crypto_service))
            .serve(addr)
            .await?;
    }

    Ok(())
}
