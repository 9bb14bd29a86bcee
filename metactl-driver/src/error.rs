use thiserror::Error;

/// Error surface for remote engine calls.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The engine could not be reached, or the connection failed mid-call.
    #[error("cannot reach {url}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The engine answered and refused the operation.
    #[error("{}", rejection_message(.status, .code.as_deref(), .message, .path.as_deref()))]
    Rejected {
        status: u16,
        code: Option<String>,
        message: String,
        path: Option<String>,
    },

    /// The engine answered with something that is not the expected shape.
    #[error("invalid response from engine: {message}")]
    InvalidResponse { message: String },

    /// One request of a [`query`](crate::MetadataDriver::query) batch failed.
    #[error("request {index} failed")]
    QueryFailed {
        index: usize,
        #[source]
        source: Box<DriverError>,
    },
}

impl DriverError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        DriverError::Rejected {
            status,
            code: None,
            message: message.into(),
            path: None,
        }
    }

    pub(crate) fn invalid_response(message: impl Into<String>) -> Self {
        DriverError::InvalidResponse {
            message: message.into(),
        }
    }
}

fn rejection_message(status: &u16, code: Option<&str>, message: &str, path: Option<&str>) -> String {
    let mut out = format!("engine rejected the request ({status}");
    if let Some(code) = code {
        out.push_str(", ");
        out.push_str(code);
    }
    out.push_str("): ");
    out.push_str(message);
    if let Some(path) = path {
        out.push_str(" at ");
        out.push_str(path);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_includes_code_and_path() {
        let err = DriverError::Rejected {
            status: 400,
            code: Some("not-exists".to_string()),
            message: "table \"users\" does not exist".to_string(),
            path: Some("$.args".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "engine rejected the request (400, not-exists): table \"users\" does not exist at $.args"
        );
    }

    #[test]
    fn bare_rejection() {
        let err = DriverError::rejected(403, "access denied");
        assert_eq!(
            err.to_string(),
            "engine rejected the request (403): access denied"
        );
    }

    #[test]
    fn query_failure_chains_the_request_error() {
        let err = DriverError::QueryFailed {
            index: 2,
            source: Box::new(DriverError::rejected(400, "bad")),
        };
        assert_eq!(err.to_string(), "request 2 failed");
        let source = std::error::Error::source(&err).expect("source");
        assert!(source.to_string().contains("bad"));
    }
}
