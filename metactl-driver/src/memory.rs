//! [`MetadataDriver`] backed by in-process state.
//!
//! Behaves like a remote engine that accepts any object-shaped document.
//! Every call is recorded in [`InMemoryDriver::calls`], and a failure can be
//! injected per operation with [`InMemoryDriver::fail_on`].

use std::collections::HashMap;
use std::fmt;

use serde_json::{json, Value};

use metactl_core::{InconsistencyStatus, InconsistentObject, MetadataDocument};

use crate::error::DriverError;
use crate::MetadataDriver;

/// Status code used for simulated engine rejections.
const REJECT_STATUS: u16 = 400;

/// A driver primitive, as recorded in the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverOp {
    Export,
    Reset,
    Reload,
    GetInconsistent,
    DropInconsistent,
    Apply,
    Query,
}

impl fmt::Display for DriverOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DriverOp::Export => "export",
            DriverOp::Reset => "reset",
            DriverOp::Reload => "reload",
            DriverOp::GetInconsistent => "get_inconsistent",
            DriverOp::DropInconsistent => "drop_inconsistent",
            DriverOp::Apply => "apply",
            DriverOp::Query => "query",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryDriver {
    document: MetadataDocument,
    inconsistent: Vec<InconsistentObject>,
    calls: Vec<DriverOp>,
    reloads: usize,
    failures: HashMap<DriverOp, String>,
}

impl Default for InMemoryDriver {
    fn default() -> Self {
        Self::new(MetadataDocument::empty())
    }
}

impl InMemoryDriver {
    pub fn new(document: MetadataDocument) -> Self {
        Self {
            document,
            inconsistent: Vec::new(),
            calls: Vec::new(),
            reloads: 0,
            failures: HashMap::new(),
        }
    }

    pub fn with_inconsistent(mut self, objects: Vec<InconsistentObject>) -> Self {
        self.inconsistent = objects;
        self
    }

    /// Make every later call to `op` fail with a rejection carrying `message`.
    pub fn fail_on(mut self, op: DriverOp, message: impl Into<String>) -> Self {
        self.failures.insert(op, message.into());
        self
    }

    pub fn document(&self) -> &MetadataDocument {
        &self.document
    }

    pub fn inconsistent(&self) -> &[InconsistentObject] {
        &self.inconsistent
    }

    /// Every primitive invoked so far, in order.
    pub fn calls(&self) -> &[DriverOp] {
        &self.calls
    }

    pub fn reloads(&self) -> usize {
        self.reloads
    }

    fn record(&mut self, op: DriverOp) -> Result<(), DriverError> {
        self.calls.push(op);
        match self.failures.get(&op) {
            Some(message) => Err(DriverError::rejected(REJECT_STATUS, message.clone())),
            None => Ok(()),
        }
    }

    /// `{"type": "apply"|"export"|"reload", "args": ...}` requests, one at a time.
    fn run_request(&mut self, request: &Value) -> Result<Value, DriverError> {
        let op = request.get("type").and_then(Value::as_str).unwrap_or_default();
        match op {
            "export" => Ok(self.document.as_value().clone()),
            "apply" => {
                let args = request.get("args").cloned().unwrap_or(Value::Null);
                self.replace(MetadataDocument::from(args))?;
                Ok(json!({"message": "success"}))
            }
            "reload" => {
                self.reloads += 1;
                Ok(json!({"message": "success"}))
            }
            other => Err(DriverError::rejected(
                REJECT_STATUS,
                format!("unsupported request type '{other}'"),
            )),
        }
    }

    fn replace(&mut self, document: MetadataDocument) -> Result<(), DriverError> {
        if !document.as_value().is_object() {
            return Err(DriverError::rejected(
                REJECT_STATUS,
                "metadata must be an object",
            ));
        }
        self.document = document;
        Ok(())
    }
}

impl MetadataDriver for InMemoryDriver {
    fn export(&mut self) -> Result<MetadataDocument, DriverError> {
        self.record(DriverOp::Export)?;
        Ok(self.document.clone())
    }

    fn reset(&mut self) -> Result<(), DriverError> {
        self.record(DriverOp::Reset)?;
        self.document = MetadataDocument::empty();
        self.inconsistent.clear();
        Ok(())
    }

    fn reload(&mut self) -> Result<(), DriverError> {
        self.record(DriverOp::Reload)?;
        self.reloads += 1;
        Ok(())
    }

    fn get_inconsistent_objects(&mut self) -> Result<InconsistencyStatus, DriverError> {
        self.record(DriverOp::GetInconsistent)?;
        Ok(InconsistencyStatus::from_objects(self.inconsistent.clone()))
    }

    fn drop_inconsistent_objects(&mut self) -> Result<(), DriverError> {
        self.record(DriverOp::DropInconsistent)?;
        self.inconsistent.clear();
        Ok(())
    }

    fn apply(&mut self, document: &MetadataDocument) -> Result<(), DriverError> {
        self.record(DriverOp::Apply)?;
        self.replace(document.clone())
    }

    /// All-or-nothing: a failing request rolls back the ones before it.
    fn query(&mut self, requests: &[Value]) -> Result<Vec<Value>, DriverError> {
        self.record(DriverOp::Query)?;
        let snapshot = (self.document.clone(), self.reloads);

        let results: Result<Vec<Value>, DriverError> = requests
            .iter()
            .enumerate()
            .map(|(index, request)| {
                self.run_request(request)
                    .map_err(|source| DriverError::QueryFailed {
                        index,
                        source: Box::new(source),
                    })
            })
            .collect();

        if results.is_err() {
            (self.document, self.reloads) = snapshot;
        }
        results
    }
}
