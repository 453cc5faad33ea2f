//! Tolerant JSON extraction from free-text model output.
//!
//! Grounded on `domain/src/quorum/parsing.rs::parse_vote_score`'s
//! tolerant-prose pattern in the teacher (find the first JSON-looking span,
//! parse it, fall back only when structurally unavoidable). Here the
//! contract is stricter: missing *optional* fields coerce to empty
//! collections, but a missing *required* field is `InvalidResponse`.

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use super::cross_exam::{Challenge, CrossExamArtifact, Rebuttal};
use super::independent::IndependentArtifact;
use super::synthesis::{ConsensusPoint, SynthesisArtifact, Tension, Viewpoint};
use super::verdict::VerdictArtifact;
use crate::agent::AgentId;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExtractError {
    #[error("no JSON object found in model output")]
    NoJsonFound,
    #[error("model output was not valid JSON: {0}")]
    Malformed(String),
    #[error("required field '{0}' missing from model output")]
    MissingField(&'static str),
}

/// Strip triple-backtick code fences (with or without a language tag),
/// find the first balanced `{...}` block, and parse it as JSON.
///
/// Tolerates leading/trailing prose; fails only when no balanced object is
/// present or the object itself is malformed.
pub fn extract_json_object(text: &str) -> Result<Value, ExtractError> {
    let stripped = strip_code_fences(text);
    let object_text = find_balanced_object(&stripped).ok_or(ExtractError::NoJsonFound)?;
    serde_json::from_str(&object_text).map_err(|e| ExtractError::Malformed(e.to_string()))
}

fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "```").replace("```", "")
}

fn find_balanced_object(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, &byte) in bytes[start..].iter().enumerate() {
        let ch = byte as char;
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + 1;
                    return Some(text[start..end].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

fn str_field(value: &Value, key: &'static str) -> Result<String, ExtractError> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(ExtractError::MissingField(key))
}

fn f64_field_or(value: &Value, key: &str, default: f64) -> f64 {
    value.get(key).and_then(Value::as_f64).unwrap_or(default)
}

fn string_array_or_empty(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Parse a round-1 independent artifact from one agent's raw model output.
pub fn parse_independent(
    text: &str,
    agent_id: AgentId,
    position: usize,
    now: DateTime<Utc>,
) -> Result<IndependentArtifact, ExtractError> {
    let value = extract_json_object(text)?;
    let rationale = str_field(&value, "rationale")?;
    let key_points = string_array_or_empty(&value, "keyPoints");
    let confidence = f64_field_or(&value, "confidence", 0.5);
    let prose_excerpt = value
        .get("proseExcerpt")
        .and_then(Value::as_str)
        .unwrap_or(&rationale)
        .to_string();
    Ok(IndependentArtifact::new(
        agent_id,
        position,
        key_points,
        rationale,
        confidence,
        prose_excerpt,
        now,
    ))
}

/// Parse a round-2 synthesis artifact from the judge's raw model output.
pub fn parse_synthesis(text: &str, now: DateTime<Utc>) -> Result<SynthesisArtifact, ExtractError> {
    let value = extract_json_object(text)?;
    let consensus_points = value
        .get("consensusPoints")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    Some(ConsensusPoint {
                        point: item.get("point")?.as_str()?.to_string(),
                        supporting_agents: string_array_or_empty(item, "supportingAgents")
                            .into_iter()
                            .map(AgentId::new)
                            .collect(),
                        confidence: f64_field_or(item, "confidence", 0.5),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    let tensions = value
        .get("tensions")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let topic = item.get("topic")?.as_str()?.to_string();
                    let viewpoints = item
                        .get("viewpoints")
                        .and_then(Value::as_array)
                        .map(|vps| {
                            vps.iter()
                                .filter_map(|vp| {
                                    Some(Viewpoint {
                                        agent: AgentId::new(vp.get("agent")?.as_str()?),
                                        viewpoint: vp.get("viewpoint")?.as_str()?.to_string(),
                                    })
                                })
                                .collect()
                        })
                        .unwrap_or_default();
                    Some(Tension { topic, viewpoints })
                })
                .collect()
        })
        .unwrap_or_default();
    let priority_order = string_array_or_empty(&value, "priorityOrder");
    if consensus_points.is_empty() && tensions.is_empty() && priority_order.is_empty() {
        return Err(ExtractError::MissingField("consensusPoints"));
    }
    Ok(SynthesisArtifact::new(
        consensus_points,
        tensions,
        priority_order,
        now,
    ))
}

/// Parse a round-3 cross-exam artifact from the judge's consolidation call.
pub fn parse_cross_exam(text: &str, now: DateTime<Utc>) -> Result<CrossExamArtifact, ExtractError> {
    let value = extract_json_object(text)?;
    let challenges = value
        .get("challenges")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    Some(Challenge {
                        challenger: AgentId::new(item.get("challenger")?.as_str()?),
                        target_agent: AgentId::new(item.get("targetAgent")?.as_str()?),
                        challenge: item.get("challenge")?.as_str()?.to_string(),
                        evidence: string_array_or_empty(item, "evidence"),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    let rebuttals = value
        .get("rebuttals")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    Some(Rebuttal {
                        agent: AgentId::new(item.get("agent")?.as_str()?),
                        rebuttal: item.get("rebuttal")?.as_str()?.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    let unresolved = string_array_or_empty(&value, "unresolved");
    Ok(CrossExamArtifact::new(
        challenges, rebuttals, unresolved, now,
    ))
}

/// Parse a round-4 verdict artifact from the judge's final call.
pub fn parse_verdict(text: &str, now: DateTime<Utc>) -> Result<VerdictArtifact, ExtractError> {
    let value = extract_json_object(text)?;
    let recommendation = str_field(&value, "recommendation")?;
    let confidence = f64_field_or(&value, "confidence", 0.5);
    let evidence = string_array_or_empty(&value, "evidence");
    let dissent = string_array_or_empty(&value, "dissent");
    Ok(VerdictArtifact::new(
        recommendation,
        confidence,
        evidence,
        dissent,
        now,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(0, 0).unwrap()
    }

    #[test]
    fn extracts_json_surrounded_by_prose() {
        let text = "Sure, here's my answer:\n```json\n{\"rationale\": \"because\", \"keyPoints\": [\"a\"], \"confidence\": 0.8}\n```\nHope that helps!";
        let artifact = parse_independent(text, AgentId::new("a1"), 0, now()).unwrap();
        assert_eq!(artifact.rationale, "because");
        assert_eq!(artifact.confidence, 0.8);
    }

    #[test]
    fn missing_optional_arrays_coerce_to_empty() {
        let text = r#"{"rationale": "because"}"#;
        let artifact = parse_independent(text, AgentId::new("a1"), 0, now()).unwrap();
        assert!(artifact.key_points.is_empty());
    }

    #[test]
    fn missing_required_field_is_invalid_response() {
        let text = r#"{"keyPoints": ["a"]}"#;
        let err = parse_independent(text, AgentId::new("a1"), 0, now()).unwrap_err();
        assert_eq!(err, ExtractError::MissingField("rationale"));
    }

    #[test]
    fn no_json_at_all_fails() {
        let text = "I refuse to answer in JSON.";
        let err = parse_independent(text, AgentId::new("a1"), 0, now()).unwrap_err();
        assert_eq!(err, ExtractError::NoJsonFound);
    }

    #[test]
    fn confidence_out_of_range_is_clamped_by_constructor() {
        let text = r#"{"rationale": "x", "confidence": 1.5}"#;
        let artifact = parse_independent(text, AgentId::new("a1"), 0, now()).unwrap();
        assert_eq!(artifact.confidence, 1.0);
    }

    #[test]
    fn nested_braces_in_strings_do_not_break_balancing() {
        let text = r#"{"rationale": "use {curly} syntax", "confidence": 0.4}"#;
        let artifact = parse_independent(text, AgentId::new("a1"), 0, now()).unwrap();
        assert_eq!(artifact.rationale, "use {curly} syntax");
    }

    #[test]
    fn parses_verdict_with_dissent() {
        let text = r#"{"recommendation": "Ship it", "confidence": 0.9, "evidence": ["e1"], "dissent": ["a2 disagrees"]}"#;
        let verdict = parse_verdict(text, now()).unwrap();
        assert_eq!(verdict.dissent, vec!["a2 disagrees".to_string()]);
    }
}
