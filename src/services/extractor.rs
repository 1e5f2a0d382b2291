//! 选择题抽取服务 - 业务能力层
//!
//! 负责：构建提示词 → 调用 LLM → 去掉代码围栏 → 解析为题目数组。
//! 解析失败时按重试策略用相同输入再请求一次，仍失败则降级为空结果。

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::ExtractionError;
use crate::models::record::{McqRecord, ANSWER_LETTERS, DEFAULT_CATEGORIES, QUESTION_TYPES};
use crate::services::llm_service::LlmBackend;
use crate::services::retry::RetryPolicy;
use crate::utils::logging::truncate_text;

/// 一次抽取请求
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRequest<'a> {
    /// 批次文本
    pub text: &'a str,
    /// 不要再次输出的题目（上一批的末尾）
    pub ignore_window: &'a [McqRecord],
    /// 调用方追加的规则，可为空
    pub custom_instructions: &'a str,
}

/// 抽取客户端接口（编排层只依赖它）
#[async_trait]
pub trait ExtractionClient: Send + Sync {
    async fn extract(
        &self,
        request: &ExtractionRequest<'_>,
    ) -> Result<Vec<McqRecord>, ExtractionError>;
}

const NO_IGNORED_QUESTIONS: &str = "(none)";

const SYSTEM_MESSAGE: &str = "You are an MCQ extractor. You only ever answer with a JSON array.";

/// 基于 LLM 的选择题抽取器
pub struct McqExtractor<B> {
    backend: B,
    retry: RetryPolicy,
}

impl<B: LlmBackend> McqExtractor<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            retry: RetryPolicy::single_retry(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// 单次尝试：调用模型并解析结果，不做重试
    pub async fn extract_once(
        &self,
        request: &ExtractionRequest<'_>,
        attempt: u32,
    ) -> Result<Vec<McqRecord>, ExtractionError> {
        let prompt = self.build_prompt(request);
        info!(
            "🤖 发送批次到 {}...（文本长度: {} 字符，第 {} 次尝试）",
            self.backend.model_name(),
            request.text.chars().count(),
            attempt + 1
        );

        let raw = self.backend.send_to_llm(&prompt, Some(SYSTEM_MESSAGE)).await?;
        let records = parse_records(&raw)?;

        debug!("解析得到 {} 道题", records.len());
        Ok(records)
    }

    /// 构建抽取提示词
    pub fn build_prompt(&self, request: &ExtractionRequest<'_>) -> String {
        let ignore_block = if request.ignore_window.is_empty() {
            NO_IGNORED_QUESTIONS.to_string()
        } else {
            match serde_json::to_string_pretty(request.ignore_window) {
                Ok(json) => json,
                Err(e) => {
                    warn!("⚠️ 忽略窗口序列化失败，本次不带忽略列表: {}", e);
                    NO_IGNORED_QUESTIONS.to_string()
                }
            }
        };

        let categories = DEFAULT_CATEGORIES
            .iter()
            .map(|c| format!("      * {c}"))
            .collect::<Vec<_>>()
            .join("\n");

        let mut prompt = format!(
            r#"Extract every multiple-choice question from the text below and return them as a JSON array.

Each item must have exactly these keys:
- "SI.No": the serial number of the question.
- "question": the full question as an HTML string.
   - Wrap the main question in <p>.
   - Put any statements (Statement I, II, ...) inside the same HTML using <ul> or <p>.
   - For Match-the-Column questions put List I and List II inside the HTML as a <table> or two lists.
- "options": an array of option strings (at most 4).
- "correct_answer": the letter of the correct option, one of {answers}. Take it from the answer key when present, otherwise work it out. Never null.
- "type": one of {types}.
- "category": one of
{categories}

Rules:
- Fix spelling and grammar from context and keep proper Unicode.
- Output only a valid JSON array.
- If a question is cut off at the start or end of the text and most of its context is elsewhere, leave it out.
- Skip questions that repeat one already listed below (same purpose, not merely similar).

Questions to ignore (already extracted from the previous part of the document):
{ignore_block}

Do not output any of the questions above again.

Text:
{text}
"#,
            answers = ANSWER_LETTERS.join(", "),
            types = QUESTION_TYPES.join(", "),
            categories = categories,
            ignore_block = ignore_block,
            text = request.text,
        );

        let custom = request.custom_instructions.trim();
        if !custom.is_empty() {
            prompt.push_str("\nAdditional rules to follow:\n");
            prompt.push_str(custom);
            prompt.push('\n');
        }

        prompt
    }
}

#[async_trait]
impl<B: LlmBackend> ExtractionClient for McqExtractor<B> {
    async fn extract(
        &self,
        request: &ExtractionRequest<'_>,
    ) -> Result<Vec<McqRecord>, ExtractionError> {
        self.retry
            .run(
                |attempt| self.extract_once(request, attempt),
                ExtractionError::is_decode_failure,
            )
            .await
            .inspect_err(|e| warn!("抽取失败: {}", e))
    }
}

/// 去掉 markdown 代码围栏
pub fn strip_code_fence(raw: &str) -> &str {
    let mut body = raw.trim();
    if let Some(rest) = body.strip_prefix("```") {
        // 跳过语言标记（如 json）
        body = rest
            .strip_prefix("json")
            .or_else(|| rest.strip_prefix("JSON"))
            .unwrap_or(rest)
            .trim_start();
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest.trim_end();
    }
    body
}

/// 解析模型输出为题目数组
pub fn parse_records(raw: &str) -> Result<Vec<McqRecord>, ExtractionError> {
    let body = strip_code_fence(raw);
    serde_json::from_str(body).map_err(|source| {
        warn!("JSON 解析失败: {}", source);
        ExtractionError::DecodeFailed {
            preview: truncate_text(body, 120),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::retry::OnExhausted;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// 按顺序返回预设响应的后端
    struct ScriptedBackend {
        responses: Mutex<VecDeque<Result<String, ExtractionError>>>,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new(responses: Vec<Result<String, ExtractionError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmBackend for ScriptedBackend {
        async fn send_to_llm(
            &self,
            user_message: &str,
            _system_message: Option<&str>,
        ) -> Result<String, ExtractionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(user_message.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("not json".to_string()))
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    const TWO_RECORDS: &str = r#"```json
[
  {"SI.No": 1, "question": "<p>Q one</p>", "options": ["a", "b"], "correct_answer": "A", "type": "MCQ", "category": "History"},
  {"SI.No": 2, "question": "<p>Q two</p>", "options": ["c", "d"], "correct_answer": "B", "type": "MCQ", "category": "Physics"}
]
```"#;

    fn request<'a>(ignore: &'a [McqRecord], custom: &'a str) -> ExtractionRequest<'a> {
        ExtractionRequest {
            text: "\n--- Page 1 ---\n1. Q one\n2. Q two\n",
            ignore_window: ignore,
            custom_instructions: custom,
        }
    }

    #[test]
    fn test_strip_code_fence_variants() {
        assert_eq!(strip_code_fence("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("```\n[2]\n```"), "[2]");
        assert_eq!(strip_code_fence("  [3]  "), "[3]");
        assert_eq!(strip_code_fence("```JSON [4]```"), "[4]");
    }

    #[test]
    fn test_parse_records_rejects_non_array() {
        let err = parse_records("{\"question\": \"x\"}").unwrap_err();
        assert!(err.is_decode_failure());
    }

    #[tokio::test]
    async fn test_null_answer_keeps_whole_batch_without_retry() {
        let response = r#"[
  {"SI.No": 1, "question": "<p>Q one</p>", "options": ["a", "b"], "correct_answer": "A", "type": "MCQ", "category": "History"},
  {"SI.No": 2, "question": "<p>Q two</p>", "options": ["c", "d"], "correct_answer": null, "type": "MCQ", "category": null}
]"#;
        let extractor = McqExtractor::new(ScriptedBackend::new(vec![Ok(response.to_string())]));
        let records = extractor.extract(&request(&[], "")).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].correct_answer, "");
        assert_eq!(extractor.backend().calls(), 1);
    }

    #[tokio::test]
    async fn test_fenced_response_is_decoded() {
        let extractor = McqExtractor::new(ScriptedBackend::new(vec![Ok(TWO_RECORDS.to_string())]));
        let records = extractor.extract(&request(&[], "")).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].question, "<p>Q two</p>");
        assert_eq!(extractor.backend().calls(), 1);
    }

    #[tokio::test]
    async fn test_persistent_decode_failure_calls_twice_and_degrades() {
        let backend = ScriptedBackend::new(vec![
            Ok("I could not find questions".to_string()),
            Ok("[{broken".to_string()),
        ]);
        let extractor = McqExtractor::new(backend);

        let records = extractor.extract(&request(&[], "")).await.unwrap();
        assert!(records.is_empty());
        assert_eq!(extractor.backend().calls(), 2);

        // 重试使用完全相同的输入
        let prompts = extractor.backend().prompts.lock().unwrap();
        assert_eq!(prompts[0], prompts[1]);
    }

    #[tokio::test]
    async fn test_retry_result_is_kept() {
        let backend = ScriptedBackend::new(vec![
            Ok("oops".to_string()),
            Ok(TWO_RECORDS.to_string()),
        ]);
        let extractor = McqExtractor::new(backend);

        let records = extractor.extract(&request(&[], "")).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(extractor.backend().calls(), 2);
    }

    #[tokio::test]
    async fn test_fail_policy_surfaces_decode_error() {
        let extractor = McqExtractor::new(ScriptedBackend::new(vec![]))
            .with_retry_policy(RetryPolicy::new(2, OnExhausted::Fail));

        let err = extractor.extract(&request(&[], "")).await.unwrap_err();
        assert!(err.is_decode_failure());
        assert_eq!(extractor.backend().calls(), 2);
    }

    #[tokio::test]
    async fn test_transport_failure_degrades_without_retry() {
        let backend = ScriptedBackend::new(vec![Err(ExtractionError::EmptyContent {
            model: "scripted".to_string(),
        })]);
        let extractor = McqExtractor::new(backend);

        let records = extractor.extract(&request(&[], "")).await.unwrap();
        assert!(records.is_empty());
        assert_eq!(extractor.backend().calls(), 1);
    }

    #[test]
    fn test_prompt_embeds_ignore_window_and_custom_rules() {
        let extractor = McqExtractor::new(ScriptedBackend::new(vec![]));
        let ignore = vec![McqRecord {
            serial: 9,
            question: "<p>Seen before</p>".to_string(),
            ..Default::default()
        }];

        let prompt = extractor.build_prompt(&request(&ignore, "Only Physics questions"));
        assert!(prompt.contains("<p>Seen before</p>"));
        assert!(prompt.contains("Additional rules to follow:\nOnly Physics questions"));
        assert!(prompt.contains("--- Page 1 ---"));

        let prompt = extractor.build_prompt(&request(&[], "   "));
        assert!(prompt.contains("(none)"));
        assert!(!prompt.contains("Additional rules"));
    }
}
