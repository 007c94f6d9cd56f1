//! Lenient raw shapes of the analysis payload. Everything is optional here;
//! deciding what is usable happens in `validate`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct RawNode {
    #[serde(deserialize_with = "lenient_id")]
    pub(super) id: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub(super) label: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub(super) country: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub(super) status: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub(super) sector: Option<String>,
    #[serde(deserialize_with = "lenient_scale")]
    pub(super) land_intensity_score: Option<u8>,
    #[serde(deserialize_with = "lenient_text")]
    pub(super) land_classification: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub(super) justification: Option<String>,
}

/// An edge endpoint: a bare id or an inline node-shaped object.
#[derive(Clone, Debug, PartialEq)]
pub(super) enum RawEndpoint {
    Id(String),
    Inline(String),
}

impl RawEndpoint {
    pub(super) fn into_id(self) -> String {
        match self {
            Self::Id(id) | Self::Inline(id) => id,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct RawEdge {
    #[serde(deserialize_with = "lenient_endpoint")]
    pub(super) source: Option<RawEndpoint>,
    #[serde(deserialize_with = "lenient_endpoint")]
    pub(super) target: Option<RawEndpoint>,
    #[serde(deserialize_with = "lenient_scale")]
    pub(super) strength: Option<u8>,
    #[serde(rename = "type", deserialize_with = "lenient_text")]
    pub(super) kind: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub(super) description: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct RawCluster {
    #[serde(deserialize_with = "lenient_text")]
    pub(super) name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub(super) description: Option<String>,
    #[serde(deserialize_with = "lenient_id_list")]
    pub(super) projects: Vec<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub(super) learning_route_potential: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub(super) learning_route_description: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub(super) proposed_route: Option<String>,
}

/// Scalars rendered as text; arrays, objects and null become `None`.
pub(super) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_owned()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Ids compare as strings, so `1` and `"1"` name the same node.
pub(super) fn id_of(value: &Value) -> Option<String> {
    match value {
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        _ => None,
    }
}

/// A 1-10 rating from an integer, float or numeric string, clamped into range.
pub(super) fn scale_value(value: &Value) -> Option<u8> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if !number.is_finite() {
        return None;
    }

    Some(number.round().clamp(1.0, 10.0) as u8)
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_text(&value))
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(id_of(&value))
}

fn lenient_scale<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scale_value(&value))
}

fn lenient_endpoint<'de, D>(deserializer: D) -> Result<Option<RawEndpoint>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let endpoint = match &value {
        Value::Object(object) => object.get("id").and_then(id_of).map(RawEndpoint::Inline),
        other => id_of(other).map(RawEndpoint::Id),
    };
    Ok(endpoint)
}

fn lenient_id_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let ids = match value {
        Value::Array(items) => items.iter().filter_map(id_of).collect(),
        _ => Vec::new(),
    };
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn node_fields_accept_any_scalar() {
        let node = RawNode::deserialize(json!({
            "id": 7,
            "label": "PRODERT",
            "country": null,
            "landIntensityScore": "8",
            "status": true,
        }))
        .unwrap();

        assert_eq!(node.id.as_deref(), Some("7"));
        assert_eq!(node.label.as_deref(), Some("PRODERT"));
        assert_eq!(node.country, None);
        assert_eq!(node.land_intensity_score, Some(8));
        assert_eq!(node.status.as_deref(), Some("true"));
        assert_eq!(node.sector, None);
    }

    #[test]
    fn endpoints_accept_ids_and_inline_nodes() {
        let edge = RawEdge::deserialize(json!({
            "source": {"id": "1", "label": "A"},
            "target": 2,
            "strength": 7.6,
        }))
        .unwrap();

        assert_eq!(edge.source, Some(RawEndpoint::Inline("1".to_owned())));
        assert_eq!(edge.target, Some(RawEndpoint::Id("2".to_owned())));
        assert_eq!(edge.strength, Some(8));
    }

    #[test]
    fn scale_is_clamped() {
        assert_eq!(scale_value(&json!(42)), Some(10));
        assert_eq!(scale_value(&json!(-3)), Some(1));
        assert_eq!(scale_value(&json!("n/a")), None);
        assert_eq!(scale_value(&json!([5])), None);
    }

    #[test]
    fn cluster_projects_skip_unusable_entries() {
        let cluster = RawCluster::deserialize(json!({
            "name": "Andean titling",
            "projects": ["1", 2, null, {"id": "3"}, ""],
        }))
        .unwrap();

        assert_eq!(cluster.projects, vec!["1".to_owned(), "2".to_owned()]);
    }
}
