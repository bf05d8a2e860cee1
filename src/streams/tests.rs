//! Tests for streams module

use super::*;
use crate::partition::{AccountFilter, StreamContext};
use crate::types::{Method, ReplicationMethod};
use pretty_assertions::assert_eq;
use serde_json::json;

// ============================================================================
// Registry Tests
// ============================================================================

#[test]
fn test_default_streams() {
    let registry = StreamRegistry::default_streams(false);
    assert_eq!(registry.len(), 11);
    assert!(registry.get(CLICK_VIEW_REPORT).is_none());

    let registry = StreamRegistry::default_streams(true);
    assert_eq!(registry.len(), 12);
    assert_eq!(registry.names().last().copied(), Some(CLICK_VIEW_REPORT));
}

#[test]
fn test_parents_precede_children() {
    let registry = StreamRegistry::default_streams(true);
    let names = registry.names();

    for stream in registry.iter() {
        if let Some(parent) = &stream.parent {
            let parent_pos = names.iter().position(|n| n == parent).unwrap();
            let child_pos = names.iter().position(|n| *n == stream.name).unwrap();
            assert!(parent_pos < child_pos, "{} before {parent}", stream.name);
        }
    }
}

#[test]
fn test_single_root() {
    let registry = StreamRegistry::default_streams(false);
    let roots: Vec<_> = registry.roots().map(|s| s.name.as_str()).collect();
    assert_eq!(roots, vec![ACCESSIBLE_CUSTOMERS]);
}

#[test]
fn test_children_and_ancestors() {
    let registry = StreamRegistry::default_streams(false);

    let children: Vec<_> = registry
        .children_of(ACCESSIBLE_CUSTOMERS)
        .iter()
        .map(|s| s.name.clone())
        .collect();
    assert_eq!(children, vec![CUSTOMER_HIERARCHY.to_string()]);
    assert_eq!(registry.children_of(CUSTOMER_HIERARCHY).len(), 9);

    assert_eq!(
        registry.ancestors(CAMPAIGN),
        vec![CUSTOMER_HIERARCHY, ACCESSIBLE_CUSTOMERS]
    );
    assert!(registry.ancestors(ACCESSIBLE_CUSTOMERS).is_empty());
}

#[test]
fn test_register_validates_order_and_names() {
    let mut registry = StreamRegistry::new();
    let orphan = StreamDefinition::search("child", "SELECT x FROM y").with_parent("parent");
    assert!(registry.register(orphan.clone()).is_err());

    registry
        .register(StreamDefinition::new(
            "parent",
            RequestShape::list_accessible_customers(),
        ))
        .unwrap();
    registry.register(orphan.clone()).unwrap();
    assert!(registry.register(orphan).is_err());
    assert!(registry.require("missing").is_err());
}

#[test]
fn test_stream_capabilities() {
    let registry = StreamRegistry::default_streams(true);

    let click_view = registry.require(CLICK_VIEW_REPORT).unwrap();
    assert!(click_view.is_date_windowed());
    assert!(click_view.tolerates_permission_errors());
    assert_eq!(click_view.replication_method(), ReplicationMethod::Incremental);
    assert!(click_view
        .request
        .query
        .as_deref()
        .unwrap()
        .contains("segments.date = {{ date }}"));

    let geo = registry.require(GEO_TARGET_CONSTANT).unwrap();
    assert!(geo.is_sync_once());
    assert!(!geo.is_date_windowed());

    let root = registry.require(ACCESSIBLE_CUSTOMERS).unwrap();
    assert_eq!(root.request.method, Method::GET);
    assert_eq!(root.request.path, LIST_ACCESSIBLE_CUSTOMERS_PATH);
    assert!(!root.tolerates_permission_errors());
    assert_eq!(root.replication_method(), ReplicationMethod::FullTable);

    let campaign = registry.require(CAMPAIGN).unwrap();
    assert_eq!(campaign.request.method, Method::POST);
    assert_eq!(campaign.request.path, SEARCH_PATH);
}

// ============================================================================
// Primary Key Tests
// ============================================================================

#[test]
fn test_primary_key_from_record() {
    let registry = StreamRegistry::default_streams(false);
    let stream = registry.require(AD_GROUPS).unwrap();
    let record = json!({"adGroup": {
        "id": "7",
        "campaign": "customers/1/campaigns/2",
        "status": "ENABLED"
    }});

    let values = stream
        .primary_key_values(&record, &StreamContext::customer("1"))
        .unwrap();
    assert_eq!(
        values,
        vec![json!("7"), json!("customers/1/campaigns/2"), json!("ENABLED")]
    );
}

#[test]
fn test_primary_key_falls_back_to_context() {
    let registry = StreamRegistry::default_streams(false);
    let stream = registry.require(GEO_PERFORMANCE).unwrap();
    let record = json!({
        "geographicView": {"countryCriterionId": "2840"},
        "campaign": {"name": "Brand"},
        "segments": {"date": "2024-01-01"}
    });

    let values = stream
        .primary_key_values(&record, &StreamContext::customer("555"))
        .unwrap();
    assert_eq!(values[1], json!("555"));
}

#[test]
fn test_unresolvable_primary_key_is_an_error() {
    let registry = StreamRegistry::default_streams(false);
    let stream = registry.require(CAMPAIGN).unwrap();

    let err = stream
        .primary_key_values(&json!({"campaign": {"name": "x"}}), &StreamContext::Root)
        .unwrap_err();
    assert!(matches!(
        err,
        crate::error::Error::MissingPrimaryKey { ref key, .. } if key == "campaign__id"
    ));
}

#[test]
fn test_replication_value() {
    let registry = StreamRegistry::default_streams(true);
    let click_view = registry.require(CLICK_VIEW_REPORT).unwrap();
    assert_eq!(
        click_view.replication_value(&json!({"date": "2024-01-03"})),
        Some("2024-01-03".to_string())
    );
    assert_eq!(click_view.replication_value(&json!({})), None);

    let campaign = registry.require(CAMPAIGN).unwrap();
    assert_eq!(campaign.replication_value(&json!({"date": "2024-01-03"})), None);
}

// ============================================================================
// Transform Tests
// ============================================================================

#[test]
fn test_empty_account_listing_gets_empty_resource_names() {
    let registry = StreamRegistry::default_streams(false);
    let listing = registry.require(ACCESSIBLE_CUSTOMERS).unwrap();
    let processor = RecordProcessor::default();

    for raw in [json!({}), json!({"resourceNames": null})] {
        let record = processor
            .process(&listing.transforms, raw, &StreamContext::Root)
            .unwrap()
            .unwrap();
        assert_eq!(record, json!({"resourceNames": []}));
        assert_eq!(
            listing.primary_key_values(&record, &StreamContext::Root).unwrap(),
            vec![json!([])]
        );
    }
}

#[test]
fn test_listing_keeps_present_resource_names() {
    let processor = RecordProcessor::default();
    let record = json!({"resourceNames": ["customers/1"]});
    let out = processor
        .process(&[RecordTransform::ResourceNames], record.clone(), &StreamContext::Root)
        .unwrap()
        .unwrap();
    assert_eq!(out, record);
}

#[test]
fn test_click_view_transform() {
    let processor = RecordProcessor::default();
    let record = json!({
        "clickView": {"gclid": "g1"},
        "segments": {"date": "2024-01-03", "device": "MOBILE"}
    });

    let out = processor
        .process(
            &[RecordTransform::ClickView],
            record,
            &StreamContext::customer("1"),
        )
        .unwrap()
        .unwrap();

    assert_eq!(
        out,
        json!({
            "clickView": {
                "gclid": "g1",
                "keyword": MISSING_KEYWORD,
                "keywordInfo": {"matchType": MISSING_KEYWORD}
            },
            "segments": {"device": "MOBILE"},
            "date": "2024-01-03"
        })
    );
}

#[test]
fn test_click_view_keeps_present_keyword() {
    let processor = RecordProcessor::default();
    let record = json!({
        "clickView": {
            "keyword": "customers/1/adGroupCriteria/2~3",
            "keywordInfo": {"matchType": "EXACT"}
        },
        "segments": {"date": "2024-01-03"}
    });

    let out = processor
        .process(&[RecordTransform::ClickView], record, &StreamContext::Root)
        .unwrap()
        .unwrap();
    assert_eq!(out["clickView"]["keywordInfo"]["matchType"], json!("EXACT"));
}

#[test]
fn test_click_view_without_date_is_decode_error() {
    let processor = RecordProcessor::default();
    assert!(processor
        .process(
            &[RecordTransform::ClickView],
            json!({"clickView": {}}),
            &StreamContext::Root
        )
        .is_err());
}

#[test]
fn test_attach_customer_id() {
    let processor = RecordProcessor::default();
    let ctx = StreamContext::customer("42");

    let out = processor
        .process(&[RecordTransform::AttachCustomerId], json!({"a": 1}), &ctx)
        .unwrap()
        .unwrap();
    assert_eq!(out, json!({"a": 1, "customer_id": "42"}));

    let out = processor
        .process(
            &[RecordTransform::AttachCustomerId],
            json!({"customer_id": "7"}),
            &ctx,
        )
        .unwrap()
        .unwrap();
    assert_eq!(out, json!({"customer_id": "7"}));
}

#[test]
fn test_account_filter_transform_drops_records() {
    let processor = RecordProcessor::new(AccountFilter::new(Some(vec!["1".to_string()])));
    let enabled = |id: &str| {
        json!({"customerClient": {"id": id, "manager": false, "status": "ENABLED"}})
    };

    assert!(processor
        .process(&[RecordTransform::AccountFilter], enabled("1"), &StreamContext::customer("9"))
        .unwrap()
        .is_some());
    assert!(processor
        .process(&[RecordTransform::AccountFilter], enabled("2"), &StreamContext::customer("9"))
        .unwrap()
        .is_none());
}

#[test]
fn test_schemas_are_objects() {
    let registry = StreamRegistry::default_streams(true);
    for stream in registry.iter() {
        let schema = stream.schema.to_json();
        assert_eq!(schema["type"], json!("object"), "{}", stream.name);
        assert!(!stream.schema.properties.is_empty(), "{}", stream.name);
    }
}
