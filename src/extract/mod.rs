//! Extractor boundary
//!
//! The text-to-structured-data extractor (typically a hosted language model) is
//! external. This module builds the request text it receives and turns its
//! free-form reply into [`BookRecord`]s.

use serde_json::Value;
use tracing::warn;

use crate::catalog::BookRecord;
use crate::error::Result;

/// Subject categories the extractor chooses from
pub const CATEGORIES: &[&str] = &[
    "高等数学",
    "线性代数",
    "概率统计",
    "大学物理",
    "电子电路",
    "程序设计",
    "数据结构",
    "计算机网络",
    "其他",
];

/// Messages sent to the extractor for one photo
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionPrompt {
    /// Role and output format instructions
    pub system: String,
    /// Segmented spine text with the request
    pub user: String,
}

/// Turns segmented spine text into book records
pub trait Extractor {
    fn extract(&self, prompt: &ExtractionPrompt) -> Result<Vec<BookRecord>>;
}

/// Extractor that answers every request with the same stored reply
#[derive(Debug, Clone)]
pub struct JsonResponseExtractor {
    response: String,
    default_confidence: f32,
}

impl JsonResponseExtractor {
    pub fn new(response: impl Into<String>, default_confidence: f32) -> Self {
        Self {
            response: response.into(),
            default_confidence,
        }
    }
}

impl Extractor for JsonResponseExtractor {
    fn extract(&self, _prompt: &ExtractionPrompt) -> Result<Vec<BookRecord>> {
        Ok(parse_extractor_response(&self.response, self.default_confidence))
    }
}

/// Build the extractor request for one photo.
///
/// `separator` is the token the segmenter placed between books.
pub fn build_extraction_prompt(segmented_text: &str, separator: &str) -> ExtractionPrompt {
    let categories = CATEGORIES
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ");

    let system = format!(
        "你是一个专业的书籍信息提取助手。\n\
         用户会给你一段从书脊图片中 OCR 识别出的原始文本（可能有噪声和错误），\
         不同书籍的文字之间用单独一行的 {separator} 分隔。\n\n\
         你的任务是：\n\
         1. 从文本中识别出所有书籍\n\
         2. 提取每本书的信息并返回 JSON 数组\n\n\
         每本书需要提取以下字段:\n\
         - title: 书名 (必填)\n\
         - author: 作者 (如果能识别出，否则为 null)\n\
         - publisher: 出版社 (如果能识别出，否则为 null)\n\
         - edition: 版次，如\"第7版\" (如果有，否则为 null)\n\
         - category: 学科分类，从以下选项中选择:\n  [{categories}]\n\n\
         输出格式要求:\n\
         - 必须是合法的 JSON 数组\n\
         - 不要输出任何解释文字，只输出纯 JSON\n\
         - 如果某个字段无法识别，设为 null"
    );

    ExtractionPrompt {
        system,
        user: format!("请从以下 OCR 文本中提取书籍信息：\n\n{}", segmented_text),
    }
}

/// Parse the extractor's reply.
///
/// Accepts a JSON array or a single object, optionally wrapped in a markdown
/// code fence. Entries without a title are skipped, a missing confidence
/// becomes `default_confidence`, and confidences are clamped to [0, 1].
/// A reply that is not JSON yields no records.
pub fn parse_extractor_response(content: &str, default_confidence: f32) -> Vec<BookRecord> {
    let body = strip_code_fence(content);

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            warn!("Extractor reply is not valid JSON: {}", e);
            return Vec::new();
        }
    };

    let items = match value {
        Value::Array(items) => items,
        other => vec![other],
    };

    items
        .iter()
        .filter_map(|item| record_from_value(item, default_confidence))
        .collect()
}

fn strip_code_fence(content: &str) -> &str {
    let mut body = content.trim();
    if let Some(rest) = body.strip_prefix("```json") {
        body = rest;
    } else if let Some(rest) = body.strip_prefix("```") {
        body = rest;
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

fn record_from_value(value: &Value, default_confidence: f32) -> Option<BookRecord> {
    let object = value.as_object()?;

    let title = text_field(value, "title")?;

    let confidence = object
        .get("confidence")
        .and_then(number_like)
        .map(|c| c as f32)
        .unwrap_or(default_confidence);

    let mut record = BookRecord::new(title, confidence);
    record.author = text_field(value, "author");
    record.publisher = text_field(value, "publisher");
    record.edition = text_field(value, "edition");
    record.category = text_field(value, "category");
    record.price = object.get("price").and_then(number_like);

    Some(record)
}

/// Non-blank string field, trimmed
fn text_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// A number, or a string holding one
fn number_like(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_array() {
        let reply = r#"[
            {"title": "高等数学", "author": "同济大学数学系", "edition": "第7版", "confidence": 0.9},
            {"title": "线性代数", "publisher": null}
        ]"#;

        let records = parse_extractor_response(reply, 0.5);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].author.as_deref(), Some("同济大学数学系"));
        assert!((records[0].confidence - 0.9).abs() < 1e-6);
        assert!(records[1].publisher.is_none());
        assert!((records[1].confidence - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_fenced_reply() {
        let reply = "```json\n[{\"title\": \"数据结构\", \"category\": \"数据结构\"}]\n```";
        let records = parse_extractor_response(reply, 0.5);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category.as_deref(), Some("数据结构"));
    }

    #[test]
    fn test_bare_fence_and_single_object() {
        let reply = "```\n{\"title\": \"大学物理\"}\n```";
        let records = parse_extractor_response(reply, 0.5);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "大学物理");
    }

    #[test]
    fn test_untitled_entries_skipped() {
        let reply = r#"[{"author": "nobody"}, {"title": "  "}, 42, {"title": "电路"}]"#;
        let records = parse_extractor_response(reply, 0.5);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "电路");
    }

    #[test]
    fn test_price_and_confidence_coercion() {
        let reply = r#"[{"title": "C程序设计", "price": "15.5", "confidence": 3}]"#;
        let records = parse_extractor_response(reply, 0.5);

        assert_eq!(records[0].price, Some(15.5));
        assert_eq!(records[0].confidence, 1.0);
    }

    #[test]
    fn test_invalid_reply() {
        assert!(parse_extractor_response("Sorry, I cannot help with that.", 0.5).is_empty());
        assert!(parse_extractor_response("", 0.5).is_empty());
    }

    #[test]
    fn test_prompt_contains_text_and_separator() {
        let prompt = build_extraction_prompt("高等数学\n---BOOK_SEPARATOR---\n线性代数", "---BOOK_SEPARATOR---");
        assert!(prompt.system.contains("---BOOK_SEPARATOR---"));
        assert!(prompt.system.contains("\"计算机网络\""));
        assert!(prompt.system.contains("设为 null"));
        assert!(prompt.user.ends_with("线性代数"));
    }

    #[test]
    fn test_prompt_names_configured_separator() {
        let prompt = build_extraction_prompt("a\n<<>>\nb", "<<>>");
        assert!(prompt.system.contains("<<>>"));
        assert!(!prompt.system.contains("BOOK_SEPARATOR"));
    }

    #[test]
    fn test_canned_extractor() {
        let extractor = JsonResponseExtractor::new(r#"[{"title": "概率论与数理统计"}]"#, 0.4);
        let records = extractor
            .extract(&build_extraction_prompt("ignored", "---"))
            .unwrap();

        assert_eq!(records.len(), 1);
        assert!((records[0].confidence - 0.4).abs() < 1e-6);
    }
}
