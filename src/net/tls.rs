//! TLS material for the encrypted listener.

use std::io;
use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;

/// Load the PEM certificate chain and private key for the TLS listener.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, io::Error> {
    ensure_exists("Certificate", cert_path)?;
    ensure_exists("Private key", key_path)?;

    tracing::debug!(cert = %cert_path.display(), "Loading TLS certificate");
    RustlsConfig::from_pem_file(cert_path, key_path).await
}

fn ensure_exists(what: &str, path: &Path) -> Result<(), io::Error> {
    if path.exists() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{what} file not found: {}", path.display()),
        ))
    }
}
