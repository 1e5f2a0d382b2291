use serde::{Deserialize, Serialize};

/// 单道选择题（抽取结果的一条记录）
///
/// 字段名与输出的 JSON 文件保持一致，`SI.No` 在合并后会被重新编号。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct McqRecord {
    /// 序号（从 1 开始）
    #[serde(rename = "SI.No", default, deserialize_with = "deserialize_serial")]
    pub serial: u32,
    /// 题干（HTML）
    #[serde(default, deserialize_with = "null_as_default")]
    pub question: String,
    /// 选项列表
    #[serde(default, deserialize_with = "deserialize_options")]
    pub options: Vec<String>,
    /// 正确答案（A/B/C/D）
    #[serde(default, deserialize_with = "null_as_default")]
    pub correct_answer: String,
    /// 题型：MCQ / Order-based / Match-the-Column
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub question_type: String,
    /// 分类
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
}

/// 题型标签
pub const QUESTION_TYPES: [&str; 3] = ["MCQ", "Order-based", "Match-the-Column"];

/// 合法的答案字母
pub const ANSWER_LETTERS: [&str; 4] = ["A", "B", "C", "D"];

/// 默认分类列表
pub const DEFAULT_CATEGORIES: [&str; 15] = [
    "History",
    "Geography",
    "Economics",
    "Indian Constitution",
    "Kerala – Governance and System of Administration",
    "Life Science and Public Health",
    "Physics",
    "Chemistry",
    "Arts, Literature, Culture, Sports",
    "Basics of Computer",
    "Important Acts",
    "Current Affairs",
    "Simple Arithmetic, Mental Ability and Reasoning",
    "General English",
    "Malayalam language",
];

/// 重新编号：按最终顺序写入 1..=N
pub fn renumber(records: &mut [McqRecord]) {
    for (index, record) in records.iter_mut().enumerate() {
        record.serial = index as u32 + 1;
    }
}

// 显式的 null 与缺失字段同样处理
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// 选项数组本身或其中某一项为 null 时保留位置，记为空字符串
fn deserialize_options<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let options = Option::<Vec<Option<String>>>::deserialize(deserializer)?;
    Ok(options
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

// LLM 返回的序号可能是整数、字符串或 null
fn deserialize_serial<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct SerialVisitor;

    impl<'de> Visitor<'de> for SerialVisitor {
        type Value = u32;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer serial number")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.trim().trim_end_matches('.').parse().unwrap_or(0))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(u32::try_from(value).unwrap_or(0))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(u32::try_from(value).unwrap_or(0))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(if value.is_finite() && value >= 0.0 { value as u32 } else { 0 })
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(0)
        }
    }

    deserializer.deserialize_any(SerialVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(serial: u32) -> McqRecord {
        McqRecord {
            serial,
            question: "<p>Which river is the longest in Kerala?</p>".to_string(),
            options: vec!["Periyar".into(), "Bharathapuzha".into(), "Pamba".into()],
            correct_answer: "A".to_string(),
            question_type: "MCQ".to_string(),
            category: "Geography".to_string(),
        }
    }

    #[test]
    fn test_serial_accepts_int_string_and_null() {
        let json = r#"[
            {"SI.No": 3, "question": "a"},
            {"SI.No": "14", "question": "b"},
            {"SI.No": null, "question": "c"},
            {"question": "d"}
        ]"#;
        let records: Vec<McqRecord> = serde_json::from_str(json).unwrap();
        let serials: Vec<u32> = records.iter().map(|r| r.serial).collect();
        assert_eq!(serials, vec![3, 14, 0, 0]);
    }

    #[test]
    fn test_null_fields_decode_as_defaults() {
        let json = r#"[
            {"SI.No": 1, "question": "<p>Kept</p>", "options": ["a", "b"], "correct_answer": "A", "type": "MCQ", "category": "History"},
            {"SI.No": 2, "question": "<p>Answer missing</p>", "options": ["x", null], "correct_answer": null, "type": null, "category": null},
            {"SI.No": 3, "question": null, "options": null}
        ]"#;
        let records: Vec<McqRecord> = serde_json::from_str(json).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].correct_answer, "A");
        assert_eq!(records[1].question, "<p>Answer missing</p>");
        assert_eq!(records[1].options, vec!["x".to_string(), String::new()]);
        assert_eq!(records[1].correct_answer, "");
        assert_eq!(records[1].question_type, "");
        assert_eq!(records[1].category, "");
        assert_eq!(records[2].question, "");
        assert!(records[2].options.is_empty());
    }

    #[test]
    fn test_serialized_keys_are_stable() {
        let value = serde_json::to_value(sample(1)).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["SI.No", "category", "correct_answer", "options", "question", "type"]
        );
    }

    #[test]
    fn test_artifact_round_trips() {
        let records = vec![sample(1), sample(2)];
        let encoded = serde_json::to_string_pretty(&records).unwrap();
        let decoded: Vec<McqRecord> = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, records);
        assert_eq!(serde_json::to_string_pretty(&decoded).unwrap(), encoded);
    }

    #[test]
    fn test_renumber_is_dense_and_idempotent() {
        let mut records = vec![sample(7), sample(7), sample(1)];
        renumber(&mut records);
        assert_eq!(records.iter().map(|r| r.serial).collect::<Vec<_>>(), vec![1, 2, 3]);

        let before = records.clone();
        renumber(&mut records);
        assert_eq!(records, before);
    }
}
