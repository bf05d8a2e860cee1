//! Partition types
//!
//! A stream context is the closed set of values that scopes one invocation
//! of a stream's query.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashSet};

/// Field name of the customer id in contexts and state
pub const CUSTOMER_ID: &str = "customer_id";

/// Field name of the window date in contexts
pub const DATE: &str = "date";

/// Values that parameterize one invocation of a stream
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StreamContext {
    /// Root streams (no parent)
    Root,
    /// Scoped to one customer account
    Customer {
        /// Customer id without the `customers/` prefix
        customer_id: String,
    },
    /// Scoped to one customer account and one day
    CustomerDate {
        /// Customer id without the `customers/` prefix
        customer_id: String,
        /// Day being queried
        date: NaiveDate,
    },
}

impl StreamContext {
    /// Create a customer context
    pub fn customer(customer_id: impl Into<String>) -> Self {
        Self::Customer {
            customer_id: customer_id.into(),
        }
    }

    /// Customer id, if the context has one
    pub fn customer_id(&self) -> Option<&str> {
        match self {
            Self::Root => None,
            Self::Customer { customer_id } | Self::CustomerDate { customer_id, .. } => {
                Some(customer_id)
            }
        }
    }

    /// Window date, if the context has one
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::CustomerDate { date, .. } => Some(*date),
            _ => None,
        }
    }

    /// Narrow this context to a single day
    ///
    /// Only customer-scoped contexts can be date-windowed.
    pub fn with_date(&self, date: NaiveDate) -> Result<Self> {
        match self.customer_id() {
            Some(customer_id) => Ok(Self::CustomerDate {
                customer_id: customer_id.to_string(),
                date,
            }),
            None => Err(Error::state(
                "date windows require a customer-scoped context",
            )),
        }
    }

    /// Key used for deduplication and checkpoints (the date is not part of it)
    pub fn key(&self) -> ContextKey {
        let mut key = ContextKey::default();
        if let Some(customer_id) = self.customer_id() {
            key.insert(CUSTOMER_ID, customer_id);
        }
        key
    }

    /// Values made available to request templates
    ///
    /// The date is pre-quoted for use inside a GAQL filter.
    pub fn template_values(&self) -> Value {
        let mut values = Map::new();
        if let Some(customer_id) = self.customer_id() {
            values.insert(CUSTOMER_ID.to_string(), json!(customer_id));
        }
        if let Some(date) = self.date() {
            values.insert(DATE.to_string(), json!(super::window::quote_date(date)));
        }
        Value::Object(values)
    }

    /// Look up a context field by name
    pub fn get(&self, field: &str) -> Option<String> {
        match field {
            CUSTOMER_ID => self.customer_id().map(ToString::to_string),
            DATE => self.date().map(super::window::format_date),
            _ => None,
        }
    }
}

impl std::fmt::Display for StreamContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::Customer { customer_id } => write!(f, "customer_id={customer_id}"),
            Self::CustomerDate { customer_id, date } => {
                write!(f, "customer_id={customer_id} date={date}")
            }
        }
    }
}

/// Structural key of a context: ordered field/value pairs
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextKey(BTreeMap<String, String>);

impl ContextKey {
    /// Create an empty key (root context)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    /// Get a field
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Whether this is the root key
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// JSON object form, as persisted in state
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }

    /// Parse the JSON object form; non-string scalars are stringified
    pub fn from_json(value: &Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| Error::state(format!("context must be an object, got {value}")))?;
        let mut key = Self::new();
        for (field, v) in map {
            let v = crate::types::scalar_to_string(v).ok_or_else(|| {
                Error::state(format!("context field '{field}' must be a scalar"))
            })?;
            key.insert(field.clone(), v);
        }
        Ok(key)
    }
}

impl std::fmt::Display for ContextKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "root");
        }
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{k}={v}")).collect();
        write!(f, "{}", parts.join(","))
    }
}

/// Context keys already dispatched to one child stream
#[derive(Debug, Clone, Default)]
pub struct SeenContextSet {
    keys: HashSet<ContextKey>,
}

impl SeenContextSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key; returns `false` if it was already present
    pub fn insert(&mut self, key: ContextKey) -> bool {
        self.keys.insert(key)
    }

    /// Whether a key was already dispatched
    pub fn contains(&self, key: &ContextKey) -> bool {
        self.keys.contains(key)
    }

    /// Number of dispatched keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether nothing was dispatched yet
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
