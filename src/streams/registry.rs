//! Ordered stream registry
//!
//! Registry order is sync order. A stream's parent is always registered
//! before it.

use super::queries;
use super::schemas;
use super::types::{RecordTransform, RequestShape, StreamDefinition, StreamTag};
use crate::decode::RecordSelector;
use crate::error::{Error, Result};
use crate::partition::ChildContextRule;

pub const ACCESSIBLE_CUSTOMERS: &str = "stream_accessible_customers";
pub const CUSTOMER_HIERARCHY: &str = "stream_customer_hierarchy";
pub const CAMPAIGN: &str = "stream_campaign";
pub const AD_GROUPS: &str = "stream_adgroups";
pub const AD_GROUPS_PERFORMANCE: &str = "stream_adgroupsperformance";
pub const CAMPAIGN_PERFORMANCE: &str = "stream_campaign_performance";
pub const CAMPAIGN_PERFORMANCE_BY_AGE_RANGE_AND_DEVICE: &str =
    "stream_campaign_performance_by_age_range_and_device";
pub const CAMPAIGN_PERFORMANCE_BY_GENDER_AND_DEVICE: &str =
    "stream_campaign_performance_by_gender_and_device";
pub const CAMPAIGN_PERFORMANCE_BY_LOCATION: &str = "stream_campaign_performance_by_location";
pub const GEO_TARGET_CONSTANT: &str = "stream_geo_target_constant";
pub const GEO_PERFORMANCE: &str = "stream_geo_performance";
pub const CLICK_VIEW_REPORT: &str = "stream_click_view_report";

/// Process-wide, read-only set of stream definitions
#[derive(Debug, Clone, Default)]
pub struct StreamRegistry {
    streams: Vec<StreamDefinition>,
}

impl StreamRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in streams; the click view report needs extra account
    /// permission and is only registered on request
    pub fn default_streams(enable_click_view: bool) -> Self {
        let mut definitions = vec![
            accessible_customers(),
            customer_hierarchy(),
            report(CAMPAIGN, queries::CAMPAIGN)
                .with_primary_keys(&["campaign__id"])
                .with_schema(schemas::campaign()),
            report(AD_GROUPS, queries::AD_GROUP)
                .with_primary_keys(&["ad_group__id", "ad_group__campaign", "ad_group__status"])
                .with_schema(schemas::ad_group()),
            report(AD_GROUPS_PERFORMANCE, queries::AD_GROUP_PERFORMANCE)
                .with_primary_keys(&["campaign__id", "ad_group__id"])
                .with_schema(schemas::adgroups_performance()),
            report(CAMPAIGN_PERFORMANCE, queries::CAMPAIGN_PERFORMANCE)
                .with_primary_keys(&[
                    "campaign__name",
                    "campaign__status",
                    "segments__date",
                    "segments__device",
                ])
                .with_schema(schemas::campaign_performance()),
            report(
                CAMPAIGN_PERFORMANCE_BY_AGE_RANGE_AND_DEVICE,
                queries::CAMPAIGN_PERFORMANCE_BY_AGE_RANGE_AND_DEVICE,
            )
            .with_primary_keys(&[
                "ad_group_criterion__age_range__type",
                "campaign__name",
                "segments__date",
                "campaign__status",
                "segments__device",
            ])
            .with_schema(schemas::campaign_performance_by_criterion("ageRange")),
            report(
                CAMPAIGN_PERFORMANCE_BY_GENDER_AND_DEVICE,
                queries::CAMPAIGN_PERFORMANCE_BY_GENDER_AND_DEVICE,
            )
            .with_primary_keys(&[
                "ad_group_criterion__gender__type",
                "campaign__name",
                "segments__date",
                "campaign__status",
                "segments__device",
            ])
            .with_schema(schemas::campaign_performance_by_criterion("gender")),
            report(
                CAMPAIGN_PERFORMANCE_BY_LOCATION,
                queries::CAMPAIGN_PERFORMANCE_BY_LOCATION,
            )
            .with_primary_keys(&[
                "campaign_criterion__location__geo_target_constant",
                "campaign__name",
                "segments__date",
            ])
            .with_schema(schemas::campaign_performance_by_location()),
            geo_target_constant(),
            report(GEO_PERFORMANCE, queries::GEO_PERFORMANCE)
                .with_primary_keys(&[
                    "geographic_view__country_criterion_id",
                    "customer_id",
                    "campaign__name",
                    "segments__date",
                ])
                .with_schema(schemas::geo_performance()),
        ];
        if enable_click_view {
            definitions.push(click_view_report());
        }

        Self {
            streams: definitions,
        }
    }

    /// Append a stream; its parent must already be registered
    pub fn register(&mut self, definition: StreamDefinition) -> Result<()> {
        if self.get(&definition.name).is_some() {
            return Err(Error::config(format!(
                "stream '{}' is registered twice",
                definition.name
            )));
        }
        if let Some(parent) = &definition.parent {
            if self.get(parent).is_none() {
                return Err(Error::config(format!(
                    "stream '{}' is registered before its parent '{parent}'",
                    definition.name
                )));
            }
        }
        self.streams.push(definition);
        Ok(())
    }

    /// Look up a stream by name
    pub fn get(&self, name: &str) -> Option<&StreamDefinition> {
        self.streams.iter().find(|s| s.name == name)
    }

    /// Look up a stream by name, failing when absent
    pub fn require(&self, name: &str) -> Result<&StreamDefinition> {
        self.get(name).ok_or_else(|| Error::StreamNotFound {
            stream: name.to_string(),
        })
    }

    /// All streams in sync order
    pub fn iter(&self) -> impl Iterator<Item = &StreamDefinition> {
        self.streams.iter()
    }

    /// Stream names in sync order
    pub fn names(&self) -> Vec<&str> {
        self.streams.iter().map(|s| s.name.as_str()).collect()
    }

    /// Streams without a parent, in sync order
    pub fn roots(&self) -> impl Iterator<Item = &StreamDefinition> {
        self.streams.iter().filter(|s| s.is_root())
    }

    /// Direct children of a stream, in sync order
    pub fn children_of(&self, name: &str) -> Vec<&StreamDefinition> {
        self.streams
            .iter()
            .filter(|s| s.parent.as_deref() == Some(name))
            .collect()
    }

    /// Parent chain of a stream, nearest first
    pub fn ancestors(&self, name: &str) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut current = self.get(name).and_then(|s| s.parent.as_deref());
        while let Some(parent) = current {
            chain.push(parent);
            current = self.get(parent).and_then(|s| s.parent.as_deref());
        }
        chain
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

fn accessible_customers() -> StreamDefinition {
    StreamDefinition::new(ACCESSIBLE_CUSTOMERS, RequestShape::list_accessible_customers())
        .with_primary_keys(&["resource_names"])
        .with_selector(RecordSelector::Envelope)
        .with_transform(RecordTransform::ResourceNames)
        .with_child_rule(ChildContextRule::ResourceNames)
        .with_schema(schemas::accessible_customers())
}

fn customer_hierarchy() -> StreamDefinition {
    StreamDefinition::search(CUSTOMER_HIERARCHY, queries::CUSTOMER_HIERARCHY)
        .with_parent(ACCESSIBLE_CUSTOMERS)
        .with_primary_keys(&["customerClient__id"])
        .with_child_rule(ChildContextRule::CustomerClient)
        .with_transform(RecordTransform::AccountFilter)
        .with_tag(StreamTag::ToleratesPermissionErrors)
        .with_schema(schemas::customer_hierarchy())
}

/// Customer-scoped report under the account hierarchy
fn report(name: &str, query: &str) -> StreamDefinition {
    StreamDefinition::search(name, query)
        .with_parent(CUSTOMER_HIERARCHY)
        .with_transform(RecordTransform::AttachCustomerId)
        .with_tag(StreamTag::ToleratesPermissionErrors)
}

fn geo_target_constant() -> StreamDefinition {
    StreamDefinition::search(GEO_TARGET_CONSTANT, queries::GEO_TARGET_CONSTANT)
        .with_parent(CUSTOMER_HIERARCHY)
        .with_primary_keys(&["geo_target_constant__id"])
        .with_tag(StreamTag::ToleratesPermissionErrors)
        .with_tag(StreamTag::SyncOnce)
        .with_schema(schemas::geo_target_constant())
}

fn click_view_report() -> StreamDefinition {
    StreamDefinition::search(CLICK_VIEW_REPORT, queries::CLICK_VIEW)
        .with_parent(CUSTOMER_HIERARCHY)
        .with_primary_keys(&[
            "clickView__gclid",
            "clickView__keyword",
            "clickView__keywordInfo__matchType",
            "customer__id",
            "adGroup__id",
            "campaign__id",
            "segments__device",
            "segments__adNetworkType",
            "segments__slot",
            "date",
        ])
        .with_replication_key("date")
        .with_transform(RecordTransform::ClickView)
        .with_transform(RecordTransform::AttachCustomerId)
        .with_tag(StreamTag::DateWindowed)
        .with_tag(StreamTag::ToleratesPermissionErrors)
        .with_schema(schemas::click_view_report())
}
