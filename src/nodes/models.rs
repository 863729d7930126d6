use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::form::{lenient_bool, lenient_f64, lenient_i64, lenient_string};
use super::quantity;
use super::rate_policy::{self, DynamicRatePolicy, RatePolicyInput};
use crate::db::entities::node;
use crate::db::enums::NodeSort;

/// Field set submitted when creating or editing a node.
///
/// Numeric fields accept numbers or numeric strings. Anything missing or
/// unparseable takes its default instead of failing the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeForm {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub info: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub server: String,
    /// Explicit address override, used only when it is a valid IP literal.
    #[serde(default)]
    pub node_ip: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub sort: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub node_class: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub node_group: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub traffic_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_dynamic_rate: bool,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub max_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub max_rate_time: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub min_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub min_rate_time: Option<i64>,
    #[serde(default)]
    pub custom_config: Option<Value>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub node_speedlimit: Option<f64>,
    /// Quota in GB as the operator sees it.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub node_bandwidth_limit: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub bandwidthlimit_resetday: Option<i64>,
    #[serde(default, rename = "type", deserialize_with = "lenient_bool")]
    pub is_enabled: bool,
}

impl NodeForm {
    pub fn rate_policy(&self) -> RatePolicyInput {
        RatePolicyInput {
            max_rate: self.max_rate,
            max_rate_time: self.max_rate_time,
            min_rate: self.min_rate,
            min_rate_time: self.min_rate_time,
        }
    }

    pub fn node_sort(&self) -> NodeSort {
        self.sort
            .and_then(|code| i32::try_from(code).ok())
            .and_then(NodeSort::from_code)
            .unwrap_or_default()
    }

    /// Static multiplier, always strictly positive.
    pub fn traffic_rate(&self) -> f64 {
        self.traffic_rate
            .filter(|rate| rate.is_finite() && *rate > 0.0)
            .unwrap_or(1.0)
    }

    pub fn speed_limit(&self) -> f64 {
        self.node_speedlimit
            .filter(|limit| *limit >= 0.0)
            .unwrap_or(0.0)
    }

    pub fn bandwidth_limit_bytes(&self) -> i64 {
        self.node_bandwidth_limit.map(quantity::to_storage).unwrap_or(0)
    }

    /// Day of month the usage counter resets, `0` when the quota never resets.
    pub fn reset_day(&self) -> i32 {
        self.bandwidthlimit_resetday
            .filter(|day| (0..=31).contains(day))
            .and_then(|day| i32::try_from(day).ok())
            .unwrap_or(0)
    }
}

pub(crate) fn small_int(value: Option<i64>) -> i32 {
    value.and_then(|v| i32::try_from(v).ok()).unwrap_or(0)
}

/// A node as presented to the edit page: policy decoded with edit defaults and
/// byte quantities converted to GB with the exact inverse factor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeEditView {
    pub id: i32,
    pub name: String,
    pub info: String,
    pub server: String,
    pub node_ip: String,
    pub sort: i32,
    pub node_class: i32,
    pub node_group: i32,
    pub password: String,
    pub traffic_rate: f64,
    pub is_dynamic_rate: bool,
    #[serde(flatten)]
    pub dynamic_rate: DynamicRatePolicy,
    pub custom_config: Value,
    pub node_speedlimit: f64,
    pub node_bandwidth: f64,
    pub node_bandwidth_limit: f64,
    pub bandwidthlimit_resetday: i32,
    #[serde(rename = "type")]
    pub is_enabled: bool,
}

impl From<node::Model> for NodeEditView {
    fn from(node: node::Model) -> Self {
        Self {
            dynamic_rate: rate_policy::decode(Some(&node.dynamic_rate_config)),
            node_bandwidth: quantity::to_display(node.node_bandwidth),
            node_bandwidth_limit: quantity::to_display(node.node_bandwidth_limit),
            id: node.id,
            name: node.name,
            info: node.info,
            server: node.server,
            node_ip: node.node_ip,
            sort: node.sort.code(),
            node_class: node.node_class,
            node_group: node.node_group,
            password: node.password,
            traffic_rate: node.traffic_rate,
            is_dynamic_rate: node.is_dynamic_rate,
            custom_config: node.custom_config,
            node_speedlimit: node.node_speedlimit,
            bandwidthlimit_resetday: node.bandwidthlimit_resetday,
            is_enabled: node.is_enabled,
        }
    }
}
