//! Record schemas of the built-in streams
//!
//! Property names follow the REST responses (camelCase). int64 values such
//! as ids and micros arrive as JSON strings.

use crate::schema::{JsonSchema, SchemaProperty as P};

fn campaign_name_status() -> P {
    P::object([
        ("resourceName", P::string()),
        ("name", P::string()),
        ("status", P::string()),
        ("advertisingChannelType", P::string()),
    ])
}

fn performance_metrics() -> P {
    P::object([
        ("clicks", P::string()),
        ("impressions", P::string()),
        ("ctr", P::number()),
        ("averageCpc", P::number()),
        ("costMicros", P::string()),
    ])
}

fn date_device_segments() -> P {
    P::object([("date", P::date()), ("device", P::string())])
}

pub fn accessible_customers() -> JsonSchema {
    JsonSchema::from_properties([("resourceNames", P::array(P::string()))])
}

pub fn customer_hierarchy() -> JsonSchema {
    JsonSchema::from_properties([(
        "customerClient",
        P::object([
            ("resourceName", P::string()),
            ("clientCustomer", P::string()),
            ("level", P::string()),
            ("status", P::string()),
            ("timeZone", P::string()),
            ("manager", P::boolean()),
            ("descriptiveName", P::string()),
            ("currencyCode", P::string()),
            ("id", P::string()),
        ]),
    )])
}

pub fn geo_target_constant() -> JsonSchema {
    JsonSchema::from_properties([(
        "geoTargetConstant",
        P::object([
            ("resourceName", P::string()),
            ("canonicalName", P::string()),
            ("countryCode", P::string()),
            ("id", P::string()),
            ("name", P::string()),
            ("status", P::string()),
            ("targetType", P::string()),
        ]),
    )])
}

pub fn click_view_report() -> JsonSchema {
    JsonSchema::from_properties([
        (
            "clickView",
            P::object([
                ("resourceName", P::string()),
                ("gclid", P::string()),
                ("adGroupAd", P::string()),
                ("keyword", P::string()),
                ("keywordInfo", P::object([("matchType", P::string())])),
            ]),
        ),
        (
            "customer",
            P::object([("resourceName", P::string()), ("id", P::string())]),
        ),
        (
            "adGroup",
            P::object([
                ("resourceName", P::string()),
                ("id", P::string()),
                ("name", P::string()),
            ]),
        ),
        (
            "campaign",
            P::object([
                ("resourceName", P::string()),
                ("id", P::string()),
                ("name", P::string()),
            ]),
        ),
        (
            "segments",
            P::object([
                ("adNetworkType", P::string()),
                ("device", P::string()),
                ("slot", P::string()),
                ("clickType", P::string()),
            ]),
        ),
        ("metrics", P::object([("clicks", P::string())])),
        ("date", P::date()),
        ("customer_id", P::string()),
    ])
}

pub fn campaign() -> JsonSchema {
    JsonSchema::from_properties([
        (
            "campaign",
            P::object([
                ("resourceName", P::string()),
                ("id", P::string()),
                ("name", P::string()),
            ]),
        ),
        ("customer_id", P::string()),
    ])
}

pub fn ad_group() -> JsonSchema {
    JsonSchema::from_properties([
        (
            "adGroup",
            P::object([
                ("resourceName", P::string()),
                ("id", P::string()),
                ("name", P::string()),
                ("type", P::string()),
                ("status", P::string()),
                ("campaign", P::string()),
                ("baseAdGroup", P::string()),
                ("labels", P::array(P::string())),
                ("adRotationMode", P::string()),
                ("trackingUrlTemplate", P::string()),
                ("finalUrlSuffix", P::string()),
                ("displayCustomBidDimension", P::string()),
                ("excludedParentAssetFieldTypes", P::array(P::string())),
                (
                    "urlCustomParameters",
                    P::array(P::object([("key", P::string()), ("value", P::string())])),
                ),
                (
                    "targetingSetting",
                    P::object([(
                        "targetRestrictions",
                        P::array(P::object([
                            ("targetingDimension", P::string()),
                            ("bidOnly", P::boolean()),
                        ])),
                    )]),
                ),
                ("targetRoas", P::number()),
                ("effectiveTargetRoas", P::number()),
                ("effectiveTargetRoasSource", P::string()),
                ("targetCpaMicros", P::string()),
                ("effectiveTargetCpaMicros", P::string()),
                ("effectiveTargetCpaSource", P::string()),
                ("targetCpmMicros", P::string()),
                ("percentCpcBidMicros", P::string()),
                ("cpvBidMicros", P::string()),
                ("cpmBidMicros", P::string()),
                ("cpcBidMicros", P::string()),
            ]),
        ),
        ("customer_id", P::string()),
    ])
}

pub fn adgroups_performance() -> JsonSchema {
    JsonSchema::from_properties([
        (
            "campaign",
            P::object([("resourceName", P::string()), ("id", P::string())]),
        ),
        (
            "adGroup",
            P::object([("resourceName", P::string()), ("id", P::string())]),
        ),
        (
            "metrics",
            P::object([
                ("impressions", P::string()),
                ("clicks", P::string()),
                ("costMicros", P::string()),
            ]),
        ),
        ("customer_id", P::string()),
    ])
}

pub fn campaign_performance() -> JsonSchema {
    JsonSchema::from_properties([
        ("campaign", campaign_name_status()),
        ("segments", date_device_segments()),
        ("metrics", performance_metrics()),
        ("customer_id", P::string()),
    ])
}

/// Shared by the age-range and gender breakdowns; `criterion` is the
/// criterion kind holding the `type` field (`ageRange` or `gender`)
pub fn campaign_performance_by_criterion(criterion: &str) -> JsonSchema {
    JsonSchema::from_properties([
        (
            "adGroupCriterion",
            P::object([
                ("resourceName", P::string()),
                (criterion, P::object([("type", P::string())])),
                ("systemServingStatus", P::string()),
                ("bidModifier", P::number()),
            ]),
        ),
        ("campaign", campaign_name_status()),
        (
            "adGroup",
            P::object([("resourceName", P::string()), ("name", P::string())]),
        ),
        ("segments", date_device_segments()),
        ("metrics", performance_metrics()),
        ("customer_id", P::string()),
    ])
}

pub fn campaign_performance_by_location() -> JsonSchema {
    JsonSchema::from_properties([
        (
            "campaignCriterion",
            P::object([
                ("resourceName", P::string()),
                (
                    "location",
                    P::object([("geoTargetConstant", P::string())]),
                ),
                ("bidModifier", P::number()),
            ]),
        ),
        (
            "campaign",
            P::object([("resourceName", P::string()), ("name", P::string())]),
        ),
        ("segments", P::object([("date", P::date())])),
        ("metrics", performance_metrics()),
        ("customer_id", P::string()),
    ])
}

pub fn geo_performance() -> JsonSchema {
    JsonSchema::from_properties([
        ("campaign", campaign_name_status()),
        ("segments", P::object([("date", P::date())])),
        (
            "metrics",
            P::object([
                ("clicks", P::string()),
                ("costMicros", P::string()),
                ("impressions", P::string()),
                ("conversions", P::number()),
            ]),
        ),
        (
            "geographicView",
            P::object([
                ("resourceName", P::string()),
                ("locationType", P::string()),
                ("countryCriterionId", P::string()),
            ]),
        ),
        ("customer_id", P::string()),
    ])
}
