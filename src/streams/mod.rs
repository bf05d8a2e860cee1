//! Stream definitions module
//!
//! Static description of every stream the tap can sync.
//!
//! # Overview
//!
//! - `StreamDefinition` - request, selector, keys, schema and capability tags
//! - `StreamRegistry` - ordered set of definitions; parents precede children
//! - `RecordProcessor` - per-stream record post-processing
//!
//! The built-in hierarchy is:
//!
//! ```text
//! stream_accessible_customers          (root, one context per customers/<id>)
//! └── stream_customer_hierarchy        (one context per enabled client account)
//!     ├── stream_campaign, stream_adgroups, ... report streams
//!     ├── stream_geo_target_constant   (synced once)
//!     └── stream_click_view_report     (optional, one query per day)
//! ```

mod queries;
mod registry;
mod schemas;
mod transforms;
mod types;

pub use registry::{
    StreamRegistry, ACCESSIBLE_CUSTOMERS, AD_GROUPS, AD_GROUPS_PERFORMANCE, CAMPAIGN,
    CAMPAIGN_PERFORMANCE, CAMPAIGN_PERFORMANCE_BY_AGE_RANGE_AND_DEVICE,
    CAMPAIGN_PERFORMANCE_BY_GENDER_AND_DEVICE, CAMPAIGN_PERFORMANCE_BY_LOCATION,
    CLICK_VIEW_REPORT, CUSTOMER_HIERARCHY, GEO_PERFORMANCE, GEO_TARGET_CONSTANT,
};
pub use transforms::{RecordProcessor, MISSING_KEYWORD};
pub use types::{
    RecordTransform, RequestShape, StreamDefinition, StreamTag, LIST_ACCESSIBLE_CUSTOMERS_PATH,
    SEARCH_PATH,
};

#[cfg(test)]
mod tests;
