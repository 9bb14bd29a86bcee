//! [`MetadataDriver`] over the engine's JSON query API.
//!
//! Every operation is a single `POST <endpoint>/v1/query` whose body is
//! `{"type": <operation>, "args": <arguments>}`. Non-2xx answers are turned
//! into [`DriverError::Rejected`] with the engine's `code`, `error` and
//! `path`; connection failures become [`DriverError::Transport`].

use std::time::Duration;

use serde_json::{json, Value};

use metactl_core::{InconsistencyStatus, MetadataDocument, ServerConfig};

use crate::error::DriverError;
use crate::wire::{bulk_index, ErrorBody, QueryRequest, RawInconsistencyResponse};
use crate::MetadataDriver;

pub const ADMIN_SECRET_HEADER: &str = "X-Hasura-Admin-Secret";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport-backed driver. Holds connection parameters only.
pub struct HttpDriver {
    agent: ureq::Agent,
    query_url: String,
    admin_secret: Option<String>,
}

impl HttpDriver {
    pub fn new(server: &ServerConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .build();
        Self {
            agent,
            query_url: server.query_url(),
            admin_secret: server.admin_secret().map(str::to_string),
        }
    }

    pub fn query_url(&self) -> &str {
        &self.query_url
    }

    fn send(&self, op: &str, args: &Value) -> Result<Value, DriverError> {
        tracing::debug!("POST {} ({op})", self.query_url);
        let mut request = self.agent.post(&self.query_url);
        if let Some(secret) = &self.admin_secret {
            request = request.set(ADMIN_SECRET_HEADER, secret);
        }

        match request.send_json(QueryRequest { op, args }) {
            Ok(response) => response
                .into_json::<Value>()
                .map_err(|e| DriverError::invalid_response(format!("{op}: {e}"))),
            Err(ureq::Error::Status(status, response)) => {
                let body: ErrorBody = response.into_json().unwrap_or_default();
                tracing::debug!("{op} rejected with status {status}");
                Err(DriverError::Rejected {
                    status,
                    code: body.code,
                    message: body.error.unwrap_or_else(|| format!("HTTP {status}")),
                    path: body.path,
                })
            }
            Err(ureq::Error::Transport(transport)) => Err(DriverError::Transport {
                url: self.query_url.clone(),
                source: Box::new(transport),
            }),
        }
    }

    fn send_no_args(&self, op: &str) -> Result<Value, DriverError> {
        self.send(op, &json!({}))
    }
}

impl MetadataDriver for HttpDriver {
    fn export(&mut self) -> Result<MetadataDocument, DriverError> {
        self.send_no_args("export_metadata").map(MetadataDocument::from)
    }

    fn reset(&mut self) -> Result<(), DriverError> {
        self.send_no_args("clear_metadata").map(|_| ())
    }

    fn reload(&mut self) -> Result<(), DriverError> {
        self.send_no_args("reload_metadata").map(|_| ())
    }

    fn get_inconsistent_objects(&mut self) -> Result<InconsistencyStatus, DriverError> {
        let value = self.send_no_args("get_inconsistent_metadata")?;
        let raw: RawInconsistencyResponse = serde_json::from_value(value)
            .map_err(|e| DriverError::invalid_response(format!("get_inconsistent_metadata: {e}")))?;
        Ok(raw.into_status())
    }

    fn drop_inconsistent_objects(&mut self) -> Result<(), DriverError> {
        self.send_no_args("drop_inconsistent_metadata").map(|_| ())
    }

    fn apply(&mut self, document: &MetadataDocument) -> Result<(), DriverError> {
        self.send("replace_metadata", document.as_value()).map(|_| ())
    }

    fn query(&mut self, requests: &[Value]) -> Result<Vec<Value>, DriverError> {
        let args = Value::Array(requests.to_vec());
        let value = self.send("bulk", &args).map_err(|err| {
            let index = match &err {
                DriverError::Rejected {
                    path: Some(path), ..
                } => bulk_index(path),
                _ => None,
            };
            match index {
                Some(index) => DriverError::QueryFailed {
                    index,
                    source: Box::new(err),
                },
                None => err,
            }
        })?;

        match value {
            Value::Array(results) if results.len() == requests.len() => Ok(results),
            Value::Array(results) => Err(DriverError::invalid_response(format!(
                "bulk: expected {} results, got {}",
                requests.len(),
                results.len()
            ))),
            other => Err(DriverError::invalid_response(format!(
                "bulk: expected an array, got {other}"
            ))),
        }
    }
}
