//! 综合阶段输出的结构校验
//!
//! 综合阶段必须返回一个 JSON 对象，且声明的每个字段都在（未知为 null）。
//! 校验是全有或全无的：任何一个字段不合规都拒绝整条记录，不会产生部分记录。
//! `filename` 由流水线根据文档填写，负载中可以没有，出现时也会被忽略；多余的键同样忽略。

use serde_json::{Map, Value};

use crate::error::SchemaViolation;
use crate::models::paper_record::{EvidenceLevel, PaperRecord};
use crate::utils::logging::truncate_text;

/// 违规信息中原文摘录的长度
const EXCERPT_CHARS: usize = 120;

/// 解析并校验综合阶段的原始输出
pub fn parse_synthesis(response: &str) -> Result<PaperRecord, SchemaViolation> {
    let payload = extract_payload(response)?;
    validate_record(&payload)
}

/// 从原始输出中取出 JSON 对象
///
/// 允许推理模型的 `<think>...</think>` 前缀和 Markdown 代码块包裹，其余情况必须是纯 JSON。
pub fn extract_payload(response: &str) -> Result<Map<String, Value>, SchemaViolation> {
    let body = strip_code_fence(strip_thinking(response.trim()));

    let value: Value = serde_json::from_str(body).map_err(|_| SchemaViolation::Unstructured {
        excerpt: truncate_text(body, EXCERPT_CHARS),
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(SchemaViolation::NotAnObject {
            found: value_kind(&other),
        }),
    }
}

/// 逐字段校验并构造记录
pub fn validate_record(payload: &Map<String, Value>) -> Result<PaperRecord, SchemaViolation> {
    for field in PaperRecord::FIELDS.iter().filter(|f| **f != "filename") {
        if !payload.contains_key(*field) {
            return Err(SchemaViolation::MissingField(*field));
        }
    }

    Ok(PaperRecord {
        filename: None,
        title: opt_string(payload, "title")?,
        paper_type: opt_string(payload, "paper_type")?,
        evidence_level: evidence_level(payload)?,
        has_conflict_of_interest: opt_bool(payload, "has_conflict_of_interest")?,
        funding_source: opt_string(payload, "funding_source")?,
        coi_notes: opt_string(payload, "coi_notes")?,
        control_group_quality: opt_string(payload, "control_group_quality")?,
        intervention_details: opt_string(payload, "intervention_details")?,
        confounding_factors: opt_string(payload, "confounding_factors")?,
        primary_outcome: opt_string(payload, "primary_outcome")?,
        risk_type_reported: opt_string(payload, "risk_type_reported")?,
        endpoints: opt_string(payload, "endpoints")?,
        statistical_significance: opt_string(payload, "statistical_significance")?,
        conclusion_summary: opt_string(payload, "conclusion_summary")?,
        trust_score: trust_score(payload)?,
        final_verdict: opt_string(payload, "final_verdict")?,
    })
}

fn strip_thinking(text: &str) -> &str {
    if text.starts_with("<think>") {
        if let Some(end) = text.find("</think>") {
            return text[end + "</think>".len()..].trim();
        }
    }
    text
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // 去掉语言标记所在的第一行
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn opt_string(
    payload: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, SchemaViolation> {
    match &payload[field] {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        other => Err(SchemaViolation::WrongType {
            field,
            expected: "string | null",
            found: value_kind(other),
        }),
    }
}

fn opt_bool(
    payload: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<bool>, SchemaViolation> {
    match &payload[field] {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        other => Err(SchemaViolation::WrongType {
            field,
            expected: "true | false | null",
            found: value_kind(other),
        }),
    }
}

fn evidence_level(payload: &Map<String, Value>) -> Result<Option<EvidenceLevel>, SchemaViolation> {
    match &payload["evidence_level"] {
        Value::Null => Ok(None),
        Value::String(s) => EvidenceLevel::parse(s)
            .map(Some)
            .ok_or_else(|| SchemaViolation::InvalidEvidenceLevel(s.clone())),
        other => Err(SchemaViolation::WrongType {
            field: "evidence_level",
            expected: "\"High\" | \"Medium\" | \"Low\" | null",
            found: value_kind(other),
        }),
    }
}

/// 只接受 1..=10 的整数；浮点数（包括 8.0）和字符串都视为类型错误
fn trust_score(payload: &Map<String, Value>) -> Result<Option<u8>, SchemaViolation> {
    let wrong_type = |found: String| SchemaViolation::WrongType {
        field: "trust_score",
        expected: "integer 1-10 | null",
        found,
    };

    match &payload["trust_score"] {
        Value::Null => Ok(None),
        Value::Number(n) => {
            if let Some(score) = n.as_i64() {
                if (1..=10).contains(&score) {
                    Ok(Some(score as u8))
                } else {
                    Err(SchemaViolation::TrustScoreOutOfRange(score))
                }
            } else if n.is_u64() {
                Err(SchemaViolation::TrustScoreOutOfRange(i64::MAX))
            } else {
                Err(wrong_type(value_kind(&payload["trust_score"])))
            }
        }
        other => Err(wrong_type(value_kind(other))),
    }
}

fn value_kind(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("bool {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string {:?}", truncate_text(s, 40)),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_payload() -> Value {
        json!({
            "title": "Eggs and cholesterol",
            "paper_type": "RCT",
            "evidence_level": "High",
            "has_conflict_of_interest": true,
            "funding_source": "Egg Nutrition Center",
            "coi_notes": "Two authors consult for the egg industry",
            "control_group_quality": "Oatmeal breakfast, fair comparison",
            "intervention_details": "2 eggs/day for 12 weeks",
            "confounding_factors": null,
            "primary_outcome": "LDL cholesterol",
            "risk_type_reported": null,
            "endpoints": "Surrogate",
            "statistical_significance": "p = 0.21, not significant",
            "conclusion_summary": "No change in LDL",
            "trust_score": 6,
            "final_verdict": "Small industry-funded trial on a surrogate marker"
        })
    }

    fn with(field: &str, value: Value) -> String {
        let mut payload = full_payload();
        payload[field] = value;
        payload.to_string()
    }

    #[test]
    fn test_valid_payload() {
        let record = parse_synthesis(&full_payload().to_string()).unwrap();
        assert_eq!(record.evidence_level, Some(EvidenceLevel::High));
        assert_eq!(record.trust_score, Some(6));
        assert_eq!(record.has_conflict_of_interest, Some(true));
        assert_eq!(record.confounding_factors, None);
        assert_eq!(record.filename, None);
    }

    #[test]
    fn test_trust_score_bounds() {
        assert_eq!(
            parse_synthesis(&with("trust_score", json!(0))),
            Err(SchemaViolation::TrustScoreOutOfRange(0))
        );
        assert_eq!(
            parse_synthesis(&with("trust_score", json!(11))),
            Err(SchemaViolation::TrustScoreOutOfRange(11))
        );
        assert_eq!(parse_synthesis(&with("trust_score", json!(1))).unwrap().trust_score, Some(1));
        assert_eq!(parse_synthesis(&with("trust_score", json!(10))).unwrap().trust_score, Some(10));
        assert_eq!(parse_synthesis(&with("trust_score", Value::Null)).unwrap().trust_score, None);
    }

    #[test]
    fn test_trust_score_rejects_floats_and_strings() {
        assert!(matches!(
            parse_synthesis(&with("trust_score", json!(8.5))),
            Err(SchemaViolation::WrongType { field: "trust_score", .. })
        ));
        assert!(matches!(
            parse_synthesis(&with("trust_score", json!(8.0))),
            Err(SchemaViolation::WrongType { field: "trust_score", .. })
        ));
        assert!(matches!(
            parse_synthesis(&with("trust_score", json!("8"))),
            Err(SchemaViolation::WrongType { field: "trust_score", .. })
        ));
        assert!(matches!(
            parse_synthesis(&with("trust_score", json!("high"))),
            Err(SchemaViolation::WrongType { field: "trust_score", .. })
        ));
    }

    #[test]
    fn test_evidence_level_is_exact() {
        assert_eq!(
            parse_synthesis(&with("evidence_level", json!("high"))),
            Err(SchemaViolation::InvalidEvidenceLevel("high".to_string()))
        );
        assert_eq!(
            parse_synthesis(&with("evidence_level", Value::Null)).unwrap().evidence_level,
            None
        );
    }

    #[test]
    fn test_conflict_flag_must_be_bool_or_null() {
        assert!(matches!(
            parse_synthesis(&with("has_conflict_of_interest", json!("yes"))),
            Err(SchemaViolation::WrongType { field: "has_conflict_of_interest", .. })
        ));
        assert_eq!(
            parse_synthesis(&with("has_conflict_of_interest", Value::Null))
                .unwrap()
                .has_conflict_of_interest,
            None
        );
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let mut payload = full_payload();
        payload.as_object_mut().unwrap().remove("endpoints");
        assert_eq!(
            parse_synthesis(&payload.to_string()),
            Err(SchemaViolation::MissingField("endpoints"))
        );
    }

    #[test]
    fn test_plain_text_is_unstructured() {
        let result = parse_synthesis("The study is a well run RCT with a trust score of 7.");
        assert!(matches!(result, Err(SchemaViolation::Unstructured { .. })));
    }

    #[test]
    fn test_non_object_json() {
        assert_eq!(
            parse_synthesis("[1, 2, 3]"),
            Err(SchemaViolation::NotAnObject {
                found: "array".to_string()
            })
        );
    }

    #[test]
    fn test_code_fence_and_thinking_are_stripped() {
        let fenced = format!("```json\n{}\n```", full_payload());
        assert!(parse_synthesis(&fenced).is_ok());

        let thinking = format!("<think>Let me weigh the reports.</think>\n{}", full_payload());
        assert!(parse_synthesis(&thinking).is_ok());
    }

    #[test]
    fn test_filename_and_extra_keys_ignored() {
        let mut payload = full_payload();
        payload["filename"] = json!("from-model.pdf");
        payload["reviewer_mood"] = json!("grumpy");
        let record = parse_synthesis(&payload.to_string()).unwrap();
        assert_eq!(record.filename, None);
    }
}
