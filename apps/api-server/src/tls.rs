//! HTTPS server configuration from PEM files.

use std::io;
use std::sync::Arc;

use rustls::ServerConfig;
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};

use crate::config::TlsConfig;

/// Load the certificate chain and private key into a rustls server config.
pub fn load_server_config(tls: &TlsConfig) -> io::Result<ServerConfig> {
    let certs = CertificateDer::pem_file_iter(&tls.cert_path)
        .map_err(io::Error::other)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(io::Error::other)?;
    if certs.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("no certificates found in {}", tls.cert_path.display()),
        ));
    }

    let key = PrivateKeyDer::from_pem_file(&tls.key_path).map_err(io::Error::other)?;

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(io::Error::other)?
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(io::Error::other)?;

    tracing::info!(cert = %tls.cert_path.display(), "TLS enabled");
    Ok(config)
}
