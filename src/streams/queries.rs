//! GAQL query text per report stream
//!
//! `{{ start_date }}`, `{{ end_date }}` and `{{ date }}` render as quoted
//! `'YYYY-MM-DD'` literals.

pub const CUSTOMER_HIERARCHY: &str = "\
SELECT customer_client.client_customer, customer_client.level, customer_client.status, \
customer_client.manager, customer_client.descriptive_name, customer_client.currency_code, \
customer_client.time_zone, customer_client.id \
FROM customer_client \
WHERE customer_client.level <= 1";

pub const GEO_TARGET_CONSTANT: &str = "\
SELECT geo_target_constant.canonical_name, geo_target_constant.country_code, \
geo_target_constant.id, geo_target_constant.name, geo_target_constant.status, \
geo_target_constant.target_type \
FROM geo_target_constant";

pub const CLICK_VIEW: &str = "\
SELECT click_view.gclid, customer.id, click_view.ad_group_ad, ad_group.id, ad_group.name, \
campaign.id, campaign.name, segments.ad_network_type, segments.device, segments.date, \
segments.slot, metrics.clicks, segments.click_type, click_view.keyword, \
click_view.keyword_info.match_type \
FROM click_view \
WHERE segments.date = {{ date }}";

pub const CAMPAIGN: &str = "SELECT campaign.id, campaign.name FROM campaign ORDER BY campaign.id";

pub const AD_GROUP: &str = "\
SELECT ad_group.url_custom_parameters, ad_group.type, ad_group.tracking_url_template, \
ad_group.targeting_setting.target_restrictions, ad_group.target_roas, \
ad_group.target_cpm_micros, ad_group.status, ad_group.target_cpa_micros, \
ad_group.resource_name, ad_group.percent_cpc_bid_micros, ad_group.name, ad_group.labels, \
ad_group.id, ad_group.final_url_suffix, ad_group.excluded_parent_asset_field_types, \
ad_group.effective_target_roas_source, ad_group.effective_target_roas, \
ad_group.effective_target_cpa_source, ad_group.effective_target_cpa_micros, \
ad_group.display_custom_bid_dimension, ad_group.cpv_bid_micros, ad_group.cpm_bid_micros, \
ad_group.cpc_bid_micros, ad_group.campaign, ad_group.base_ad_group, \
ad_group.ad_rotation_mode \
FROM ad_group";

pub const AD_GROUP_PERFORMANCE: &str = "\
SELECT campaign.id, ad_group.id, metrics.impressions, metrics.clicks, metrics.cost_micros \
FROM ad_group \
WHERE segments.date >= {{ start_date }} and segments.date <= {{ end_date }}";

pub const CAMPAIGN_PERFORMANCE: &str = "\
SELECT campaign.name, campaign.status, segments.device, segments.date, metrics.impressions, \
metrics.clicks, metrics.ctr, metrics.average_cpc, metrics.cost_micros \
FROM campaign \
WHERE segments.date >= {{ start_date }} and segments.date <= {{ end_date }}";

pub const CAMPAIGN_PERFORMANCE_BY_AGE_RANGE_AND_DEVICE: &str = "\
SELECT ad_group_criterion.age_range.type, campaign.name, campaign.status, ad_group.name, \
segments.date, segments.device, ad_group_criterion.system_serving_status, \
ad_group_criterion.bid_modifier, metrics.clicks, metrics.impressions, metrics.ctr, \
metrics.average_cpc, metrics.cost_micros, campaign.advertising_channel_type \
FROM age_range_view \
WHERE segments.date >= {{ start_date }} and segments.date <= {{ end_date }}";

pub const CAMPAIGN_PERFORMANCE_BY_GENDER_AND_DEVICE: &str = "\
SELECT ad_group_criterion.gender.type, campaign.name, campaign.status, ad_group.name, \
segments.date, segments.device, ad_group_criterion.system_serving_status, \
ad_group_criterion.bid_modifier, metrics.clicks, metrics.impressions, metrics.ctr, \
metrics.average_cpc, metrics.cost_micros, campaign.advertising_channel_type \
FROM gender_view \
WHERE segments.date >= {{ start_date }} and segments.date <= {{ end_date }}";

pub const CAMPAIGN_PERFORMANCE_BY_LOCATION: &str = "\
SELECT campaign_criterion.location.geo_target_constant, campaign.name, \
campaign_criterion.bid_modifier, segments.date, metrics.clicks, metrics.impressions, \
metrics.ctr, metrics.average_cpc, metrics.cost_micros \
FROM location_view \
WHERE segments.date >= {{ start_date }} and segments.date <= {{ end_date }} \
AND campaign_criterion.status != 'REMOVED'";

pub const GEO_PERFORMANCE: &str = "\
SELECT campaign.name, campaign.status, segments.date, metrics.clicks, metrics.cost_micros, \
metrics.impressions, metrics.conversions, geographic_view.location_type, \
geographic_view.country_criterion_id \
FROM geographic_view \
WHERE segments.date >= {{ start_date }} and segments.date <= {{ end_date }}";
