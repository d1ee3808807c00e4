pub mod api;
pub mod error;

use crate::agent::ProxyAgent;
use crate::cli::ServeArgs;
use log::{ info, error };
use std::error::Error;
use std::net::SocketAddr;

pub struct Server {
    addr: String,
    agent: ProxyAgent,
    args: ServeArgs,
}

impl Server {
    pub fn new(addr: String, agent: ProxyAgent, args: ServeArgs) -> Self {
        Self { addr, agent, args }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let addr = self.addr.parse::<SocketAddr>()?;
        let app = api::router(self.agent.clone());

        if self.args.enable_tls {
            let (cert_path, key_path) = match (&self.args.tls_cert_path, &self.args.tls_key_path) {
                (Some(cert), Some(key)) => (cert, key),
                (Some(_), None) | (None, Some(_)) => {
                    error!("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.");
                    return Err("Missing TLS certificate or key path".into());
                }
                (None, None) => {
                    error!("--enable-tls was set but no certificate/key paths provided.");
                    return Err("TLS enabled without cert/key".into());
                }
            };
            info!("TLS enabled. Loading certificate from '{}' and key from '{}'", cert_path, key_path);
            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                cert_path,
                key_path
            ).await?;

            info!("Proxy listening on: https://{}", addr);
            axum_server::bind_rustls(addr, tls_config)
                .serve(app.into_make_service())
                .await?;
        } else {
            let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
                error!("Failed to bind proxy to {}: {}. Try a different port.", addr, e);
                e
            })?;
            info!("Proxy listening on: http://{}", addr);
            axum::serve(listener, app.into_make_service()).await?;
        }

        Ok(())
    }
}
