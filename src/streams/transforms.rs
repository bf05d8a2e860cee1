//! Record post-processing
//!
//! Runs a stream's transforms over each decoded record. A transform may
//! rewrite the record or drop it.

use super::types::RecordTransform;
use crate::error::{Error, Result};
use crate::partition::{AccountFilter, Admission, StreamContext, CUSTOMER_ID, DATE};
use serde_json::{json, Map, Value};

/// Placeholder written where the API omits click keyword data
pub const MISSING_KEYWORD: &str = "null";

const RESOURCE_NAMES: &str = "resourceNames";

/// Applies record transforms with run-wide settings
#[derive(Debug, Clone, Default)]
pub struct RecordProcessor {
    account_filter: AccountFilter,
}

impl RecordProcessor {
    /// Create a processor with an account filter
    pub fn new(account_filter: AccountFilter) -> Self {
        Self { account_filter }
    }

    /// Run `transforms` in order; `None` means the record was dropped
    pub fn process(
        &self,
        transforms: &[RecordTransform],
        mut record: Value,
        context: &StreamContext,
    ) -> Result<Option<Value>> {
        for transform in transforms {
            record = match transform {
                RecordTransform::AccountFilter => match self.account_filter.admit(&record)? {
                    Admission::Admit => record,
                    _ => return Ok(None),
                },
                RecordTransform::ResourceNames => resource_names(record)?,
                RecordTransform::AttachCustomerId => attach_customer_id(record, context)?,
                RecordTransform::ClickView => click_view(record)?,
            };
        }
        Ok(Some(record))
    }
}

fn as_object_mut(record: &mut Value) -> Result<&mut Map<String, Value>> {
    record
        .as_object_mut()
        .ok_or_else(|| Error::decode("record must be a JSON object"))
}

/// A credential without accessible accounts gets `{}` back
fn resource_names(mut record: Value) -> Result<Value> {
    let names = as_object_mut(&mut record)?
        .entry(RESOURCE_NAMES)
        .or_insert_with(|| json!([]));
    if names.is_null() {
        *names = json!([]);
    }
    Ok(record)
}

fn attach_customer_id(mut record: Value, context: &StreamContext) -> Result<Value> {
    if let Some(customer_id) = context.customer_id() {
        as_object_mut(&mut record)?
            .entry(CUSTOMER_ID)
            .or_insert_with(|| json!(customer_id));
    }
    Ok(record)
}

fn click_view(mut record: Value) -> Result<Value> {
    let object = as_object_mut(&mut record)?;

    let date = object
        .get_mut("segments")
        .and_then(Value::as_object_mut)
        .and_then(|segments| segments.remove(DATE))
        .ok_or_else(|| Error::decode("click view record without segments.date"))?;
    object.insert(DATE.to_string(), date);

    let click_view = object
        .entry("clickView")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| Error::decode("clickView must be an object"))?;
    if click_view.get("keyword").map_or(true, Value::is_null) {
        click_view.insert("keyword".to_string(), json!(MISSING_KEYWORD));
        click_view.insert(
            "keywordInfo".to_string(),
            json!({"matchType": MISSING_KEYWORD}),
        );
    }

    Ok(record)
}
