//! Classifier output as seen by the engine.
//!
//! Detections arrive from an external vision service and are not trusted:
//! any entry may lack a name or score, carry the wrong JSON type, or not be
//! an object at all. Deserialization never rejects an entry; it keeps what it
//! can read and leaves the rest as `None`, so the mapper's filter drops it.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::spec::ModelSpec;

/// One `(label, confidence)` pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub name: Option<String>,
    pub score: Option<f64>,
    /// Localization polygon, passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_poly: Option<Value>,
}

impl Detection {
    #[must_use]
    pub fn new(name: impl Into<String>, score: f64) -> Self {
        Self {
            name: Some(name.into()),
            score: Some(score),
            bounding_poly: None,
        }
    }

    /// Read whatever is usable from an arbitrary JSON value.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Value::Object(map) = value else {
            return Self::default();
        };
        Self {
            name: map.get("name").and_then(Value::as_str).map(str::to_owned),
            score: map.get("score").and_then(Value::as_f64),
            bounding_poly: map
                .get("boundingPoly")
                .filter(|poly| !poly.is_null())
                .cloned(),
        }
    }

    /// Name and score when both are present, the name is non-empty and the
    /// score is a finite number.
    #[must_use]
    pub fn usable(&self) -> Option<(&str, f64)> {
        let name = self.name.as_deref().filter(|name| !name.is_empty())?;
        let score = self.score.filter(|score| score.is_finite())?;
        Some((name, score))
    }
}

impl<'de> Deserialize<'de> for Detection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// Image-level label, the coarser classifier output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelAnnotation {
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub score: Option<f64>,
}

impl From<&LabelAnnotation> for Detection {
    fn from(label: &LabelAnnotation) -> Self {
        Self {
            name: label.description.clone(),
            score: label.score,
            bounding_poly: None,
        }
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_str().map(str::to_owned))
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_f64())
}

/// Object localization results take precedence; labels are only used when
/// no object was localized.
#[must_use]
pub fn collect_detections(objects: &[Detection], labels: &[LabelAnnotation]) -> Vec<Detection> {
    if objects.is_empty() {
        labels.iter().map(Detection::from).collect()
    } else {
        objects.to_vec()
    }
}

/// Raw classifier payload: localized objects plus image labels. Both the
/// short keys and the vision service's own keys are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationBatch {
    #[serde(default, alias = "localizedObjectAnnotations", deserialize_with = "lenient_list")]
    pub objects: Vec<Detection>,
    #[serde(default, alias = "labelAnnotations", deserialize_with = "lenient_list")]
    pub labels: Vec<LabelAnnotation>,
}

impl AnnotationBatch {
    #[must_use]
    pub fn detections(&self) -> Vec<Detection> {
        collect_detections(&self.objects, &self.labels)
    }
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: for<'a> Deserialize<'a> + Default,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

/// Parse a JSON array of detections. `null` is an empty batch; any other
/// non-array document is an error at this edge.
pub fn parse_detections(json: &str) -> Result<Vec<Detection>, serde_json::Error> {
    match serde_json::from_str::<Value>(json)? {
        Value::Array(items) => Ok(items.iter().map(Detection::from_value).collect()),
        Value::Null => Ok(Vec::new()),
        _ => Err(serde::de::Error::custom("expected a JSON array of detections")),
    }
}

/// The analysis endpoint's answer: the detections that were considered and
/// the model chosen from them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub objects: Vec<Detection>,
    pub model_data: ModelSpec,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_entries_degrade_to_partial_detections() {
        let batch = parse_detections(r#"[{"name": "vase"}, {"score": "high"}, 42, {"name": "lamp", "score": 0.7}]"#)
            .expect("array parses");
        assert_eq!(batch.len(), 4);
        assert_eq!(batch[0].score, None);
        assert_eq!(batch[1], Detection::default());
        assert_eq!(batch[2], Detection::default());
        assert_eq!(batch[3].usable(), Some(("lamp", 0.7)));
    }

    #[test]
    fn null_document_is_empty() {
        assert!(parse_detections("null").expect("null parses").is_empty());
        assert!(parse_detections(r#"{"name":"vase"}"#).is_err());
    }

    #[test]
    fn labels_are_used_only_without_objects() {
        let labels = vec![LabelAnnotation {
            description: Some("Pillow".to_owned()),
            score: Some(0.93),
        }];
        let from_labels = collect_detections(&[], &labels);
        assert_eq!(from_labels, vec![Detection::new("Pillow", 0.93)]);

        let objects = vec![Detection::new("Chair", 0.8)];
        assert_eq!(collect_detections(&objects, &labels), objects);
    }

    #[test]
    fn annotation_batch_accepts_vision_keys() {
        let batch: AnnotationBatch = serde_json::from_str(
            r#"{"localizedObjectAnnotations": [], "labelAnnotations": [{"description": "Lamp", "score": 0.81}, "junk"]}"#,
        )
        .expect("batch parses");
        let detections = batch.detections();
        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].usable(), Some(("Lamp", 0.81)));
        assert_eq!(detections[1].usable(), None);
    }

    #[test]
    fn empty_name_is_not_usable() {
        assert_eq!(Detection::new("", 0.9).usable(), None);
    }
}
