//! Parent-to-child context fan-out
//!
//! Derives child-stream contexts from parent records. Several hierarchy
//! levels can resolve to the same customer, so each context is dispatched
//! at most once per child stream; first seen wins.

use super::types::{ContextKey, SeenContextSet, StreamContext};
use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// How a parent stream's records become child contexts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildContextRule {
    /// The stream has no children
    #[default]
    None,
    /// `{"resourceNames": ["customers/123", ...]}`: one context per name
    ResourceNames,
    /// `{"customerClient": {"id": "123", ...}}`: one context per record
    CustomerClient,
}

impl ChildContextRule {
    /// Candidate child contexts for one parent record, in record order
    pub fn candidates(self, record: &Value) -> Result<Vec<StreamContext>> {
        match self {
            Self::None => Ok(Vec::new()),
            Self::ResourceNames => {
                let names = match record.get("resourceNames") {
                    None | Some(Value::Null) => return Ok(Vec::new()),
                    Some(Value::Array(names)) => names,
                    Some(other) => {
                        return Err(Error::decode(format!(
                            "resourceNames must be an array, got {other}"
                        )))
                    }
                };
                names
                    .iter()
                    .map(|name| {
                        let name = name.as_str().ok_or_else(|| {
                            Error::decode(format!("resource name must be a string, got {name}"))
                        })?;
                        customer_id_from_resource_name(name).map(StreamContext::customer)
                    })
                    .collect()
            }
            Self::CustomerClient => {
                let id = record
                    .get("customerClient")
                    .and_then(|c| c.get("id"))
                    .and_then(crate::types::scalar_to_string)
                    .ok_or_else(|| Error::decode("customerClient record without an id"))?;
                Ok(vec![StreamContext::customer(id)])
            }
        }
    }
}

/// Extract `123` from `customers/123`
pub fn customer_id_from_resource_name(name: &str) -> Result<String> {
    match name.split('/').collect::<Vec<_>>().as_slice() {
        ["customers", id] if !id.is_empty() => Ok((*id).to_string()),
        _ => Err(Error::decode(format!(
            "unexpected customer resource name '{name}'"
        ))),
    }
}

/// A context together with the child streams that still need it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    /// Context to run the children with
    pub context: StreamContext,
    /// Child streams that had not received this context yet, in the order given
    pub children: Vec<String>,
}

/// Tracks which contexts each child stream has already received
#[derive(Debug, Default)]
pub struct FanOutEngine {
    seen: HashMap<String, SeenContextSet>,
}

impl FanOutEngine {
    /// Create an engine with nothing dispatched
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide which of `children` still need `candidate`
    ///
    /// Returns `None` when every child already received an equivalent
    /// context (or there are no children). Otherwise marks the key as seen
    /// for the remaining children and returns them with the context.
    pub fn dispatch(&mut self, children: &[&str], candidate: StreamContext) -> Option<Dispatch> {
        let key = candidate.key();

        let fresh: Vec<String> = children
            .iter()
            .filter(|child| !self.was_dispatched(child, &key))
            .map(|child| (*child).to_string())
            .collect();
        if fresh.is_empty() {
            debug!(context = %key, "context already dispatched to all children, dropping");
            return None;
        }

        for child in &fresh {
            self.seen
                .entry(child.clone())
                .or_default()
                .insert(key.clone());
        }
        Some(Dispatch {
            context: candidate,
            children: fresh,
        })
    }

    /// Derive and dispatch every new child context of one parent record
    pub fn fan_out(
        &mut self,
        rule: ChildContextRule,
        record: &Value,
        children: &[&str],
    ) -> Result<Vec<Dispatch>> {
        Ok(rule
            .candidates(record)?
            .into_iter()
            .filter_map(|candidate| self.dispatch(children, candidate))
            .collect())
    }

    /// Whether a key was dispatched to a child
    pub fn was_dispatched(&self, child: &str, key: &ContextKey) -> bool {
        self.seen.get(child).is_some_and(|s| s.contains(key))
    }
}

/// Verdict of the account filter on one hierarchy record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Account is processed
    Admit,
    /// Not in the configured allow-list
    NotAllowed,
    /// Management-only account (no billable traffic)
    Manager,
    /// Account status other than `ENABLED`
    NotEnabled(String),
}

/// Terminal filtering rules for account-hierarchy records
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    /// Optional allow-list of customer ids
    customer_ids: Option<HashSet<String>>,
}

impl AccountFilter {
    /// Create a filter with an optional allow-list
    pub fn new(customer_ids: Option<Vec<String>>) -> Self {
        Self {
            customer_ids: customer_ids.map(|ids| ids.into_iter().collect()),
        }
    }

    /// Judge one `customerClient` record
    pub fn admit(&self, record: &Value) -> Result<Admission> {
        let client = record
            .get("customerClient")
            .ok_or_else(|| Error::decode("hierarchy record without customerClient"))?;
        let id = client
            .get("id")
            .and_then(crate::types::scalar_to_string)
            .ok_or_else(|| Error::decode("customerClient record without an id"))?;
        let name = client
            .get("clientCustomer")
            .and_then(Value::as_str)
            .unwrap_or(&id)
            .to_string();

        if let Some(allowed) = &self.customer_ids {
            if !allowed.contains(&id) {
                return Ok(Admission::NotAllowed);
            }
        }

        if client.get("manager").and_then(Value::as_bool).unwrap_or(false) {
            warn!("{name} is a manager, skipping");
            return Ok(Admission::Manager);
        }

        let status = client
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if status != "ENABLED" {
            warn!("{name} is not enabled, skipping");
            return Ok(Admission::NotEnabled(status.to_string()));
        }

        Ok(Admission::Admit)
    }
}
