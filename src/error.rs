use thiserror::Error;

/// Failure of the fetch+parse pipeline for one resource.
///
/// Cloneable because a single settlement is shared by every consumer
/// awaiting the same cache entry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("GET {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("GET {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("GET {url} was aborted")]
    Aborted { url: String },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid XML: {0}")]
    Xml(String),

    #[error("Loaded file is not valid SVG")]
    MissingSvg,
}

/// Error raised by a caller-supplied source transform.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Transform failed: {message}")]
pub struct TransformError {
    pub message: String,
}

impl TransformError {
    pub fn new(message: impl std::fmt::Display) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl From<anyhow::Error> for TransformError {
    fn from(e: anyhow::Error) -> Self {
        Self::new(format!("{e:#}"))
    }
}

/// Error aborting a single render pass.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{0}")]
    Transform(#[from] TransformError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_status_message() {
        let error = TransportError::Status {
            url: "icons/missing.svg".to_string(),
            status: 404,
        };
        assert_eq!(
            error.to_string(),
            "GET icons/missing.svg returned status 404"
        );
    }

    #[test]
    fn test_transport_aborted_message() {
        let error = TransportError::Aborted {
            url: "a.svg".to_string(),
        };
        assert_eq!(error.to_string(), "GET a.svg was aborted");
    }

    #[test]
    fn test_parse_missing_svg_message() {
        assert_eq!(
            ParseError::MissingSvg.to_string(),
            "Loaded file is not valid SVG"
        );
    }

    #[test]
    fn test_load_error_from_transport() {
        let error: LoadError = TransportError::Network {
            url: "a.svg".to_string(),
            message: "connection refused".to_string(),
        }
        .into();
        match error {
            LoadError::Transport(TransportError::Network { .. }) => {}
            _ => panic!("Expected Transport variant"),
        }
    }

    #[test]
    fn test_load_error_from_parse() {
        let error: LoadError = ParseError::Xml("unexpected end".to_string()).into();
        assert_eq!(error.to_string(), "Parse error: Invalid XML: unexpected end");
    }

    #[test]
    fn test_transform_error_from_anyhow() {
        let error: TransformError = anyhow::anyhow!("bad path").into();
        assert_eq!(error.to_string(), "Transform failed: bad path");
    }

    #[test]
    fn test_render_error_from_transform() {
        let error: RenderError = TransformError::new("boom").into();
        assert_eq!(error.to_string(), "Transform failed: boom");
    }
}
