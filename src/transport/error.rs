//! Tipos de erro da camada de transporte HTTP.
//!
//! Define [`TransportError`], que separa o HTTP 404 (recurso inexistente)
//! das demais falhas HTTP e de rede. O cliente de serviço funcional depende
//! dessa distinção para tratar "não encontrado" como ausência.

use thiserror::Error;

/// Erros que podem ocorrer ao falar com o serviço remoto.
///
/// - [`NotFound`](TransportError::NotFound) — o servidor retornou HTTP 404
/// - [`Status`](TransportError::Status) — qualquer outro erro HTTP (4xx/5xx)
/// - [`Network`](TransportError::Network) — falha na camada de rede
#[derive(Debug, Error)]
pub enum TransportError {
    /// O recurso endereçado não existe (HTTP 404).
    #[error("not found: {url}")]
    NotFound { url: String },

    /// Erro retornado pelo serviço (ex.: 401 token inválido, 500 erro interno).
    /// Contém o código de status HTTP e o corpo da resposta.
    #[error("HTTP error (status {status}): {message}")]
    Status { status: u16, message: String },

    /// Falha de rede subjacente (DNS, conexão recusada, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl TransportError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TransportError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = TransportError::NotFound {
            url: "http://host/gradings/abc".into(),
        };
        assert_eq!(err.to_string(), "not found: http://host/gradings/abc");
        assert!(err.is_not_found());
    }

    #[test]
    fn status_display() {
        let err = TransportError::Status {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "HTTP error (status 500): boom");
        assert!(!err.is_not_found());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TransportError>();
    }
}
