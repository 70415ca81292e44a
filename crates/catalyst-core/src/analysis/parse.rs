//! Lenient reading of model output into an [`AnalysisReport`]
//!
//! Models drift from the requested schema: fields go missing, lists arrive
//! as plain strings, numbers arrive as strings. Anything readable is kept;
//! anything else falls back to defaults.

use catalyst_llm::util::strip_code_fence;
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::types::{
    AnalysisReport, AnalysisType, CommunicationPattern, Conflict, Intervention, Level,
    SentimentScores,
};

/// Parse model output for an analysis type
///
/// `fallback_confidence` is used when the output carries no `confidence`
/// field or is not a JSON object at all.
#[must_use]
pub fn parse_report(
    analysis_type: AnalysisType,
    content: &str,
    fallback_confidence: f32,
) -> AnalysisReport {
    let trimmed = content.trim();
    let object = match serde_json::from_str::<Value>(strip_code_fence(trimmed)) {
        Ok(Value::Object(map)) => map,
        _ => {
            return AnalysisReport {
                summary: trimmed.to_string(),
                confidence: fallback_confidence.clamp(0.0, 1.0),
                structured: false,
                ..Default::default()
            }
        }
    };

    let confidence = object
        .get("confidence")
        .and_then(number)
        .map_or(fallback_confidence, |c| c as f32)
        .clamp(0.0, 1.0);

    AnalysisReport {
        summary: text_field(&object, &["summary", "overview", "analysis"]),
        sentiment: object.get("sentiment").and_then(parse_sentiment),
        patterns: list(&object, &["patterns", "communication_patterns"])
            .filter_map(parse_pattern)
            .collect(),
        conflicts: list(&object, &["conflicts", "detected_conflicts"])
            .filter_map(parse_conflict)
            .collect(),
        interventions: list(&object, &["interventions", "recommendations"])
            .filter_map(|item| parse_intervention(analysis_type, item))
            .collect(),
        confidence,
        structured: true,
    }
}

fn number(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

fn string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn text_field(object: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .map(|key| string(object.get(*key)))
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

fn list<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> impl Iterator<Item = &'a Value> {
    keys.iter()
        .find_map(|key| object.get(*key).and_then(Value::as_array))
        .into_iter()
        .flatten()
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| string(Some(item)))
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

fn score(value: &Value) -> Option<f32> {
    number(value).map(|n| (n as f32).clamp(-1.0, 1.0))
}

fn parse_sentiment(value: &Value) -> Option<SentimentScores> {
    if let Some(overall) = score(value) {
        return Some(SentimentScores {
            overall,
            ..Default::default()
        });
    }

    let object = value.as_object()?;
    let per_speaker: HashMap<String, f32> = object
        .get("per_speaker")
        .and_then(Value::as_object)
        .map(|speakers| {
            speakers
                .iter()
                .filter_map(|(name, v)| score(v).map(|s| (name.clone(), s)))
                .collect()
        })
        .unwrap_or_default();

    let overall = object.get("overall").and_then(score).unwrap_or_else(|| {
        if per_speaker.is_empty() {
            0.0
        } else {
            per_speaker.values().sum::<f32>() / per_speaker.len() as f32
        }
    });

    Some(SentimentScores {
        overall,
        per_speaker,
        emotions: string_list(object.get("emotions")),
    })
}

fn parse_pattern(value: &Value) -> Option<CommunicationPattern> {
    if let Some(name) = value.as_str() {
        return (!name.trim().is_empty()).then(|| CommunicationPattern {
            name: name.trim().to_string(),
            description: String::new(),
            speakers: Vec::new(),
        });
    }

    let object = value.as_object()?;
    let name = text_field(object, &["name", "pattern", "title"]);
    if name.is_empty() {
        return None;
    }
    let mut speakers = string_list(object.get("speakers"));
    if speakers.is_empty() {
        speakers = string_list(object.get("speaker"));
    }

    Some(CommunicationPattern {
        name,
        description: text_field(object, &["description", "details", "evidence"]),
        speakers,
    })
}

fn parse_conflict(value: &Value) -> Option<Conflict> {
    if let Some(topic) = value.as_str() {
        return (!topic.trim().is_empty()).then(|| Conflict {
            topic: topic.trim().to_string(),
            description: String::new(),
            severity: Level::default(),
        });
    }

    let object = value.as_object()?;
    let topic = text_field(object, &["topic", "title", "name"]);
    if topic.is_empty() {
        return None;
    }

    Some(Conflict {
        topic,
        description: text_field(object, &["description", "details"]),
        severity: object
            .get("severity")
            .map(Level::parse_lenient)
            .unwrap_or_default(),
    })
}

fn parse_intervention(analysis_type: AnalysisType, value: &Value) -> Option<Intervention> {
    let default_category = match analysis_type {
        AnalysisType::ConflictDetection => "conflict_resolution",
        _ => "communication",
    };

    if let Some(title) = value.as_str() {
        return (!title.trim().is_empty()).then(|| Intervention {
            title: title.trim().to_string(),
            description: String::new(),
            category: default_category.to_string(),
            priority: Level::default(),
        });
    }

    let object = value.as_object()?;
    let title = text_field(object, &["title", "name"]);
    let description = text_field(object, &["description", "details", "steps"]);
    if title.is_empty() && description.is_empty() {
        return None;
    }

    let category = text_field(object, &["category", "type"]);
    Some(Intervention {
        title,
        description,
        category: if category.is_empty() {
            default_category.to_string()
        } else {
            category
        },
        priority: object
            .get("priority")
            .map(Level::parse_lenient)
            .unwrap_or_default(),
    })
}
