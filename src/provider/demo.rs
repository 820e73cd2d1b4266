//! Offline demo backend.
//!
//! Streams canned business-plan text for the known section titles so the whole pipeline
//! can be exercised without network access or API keys.

use crate::error::ApiError;
use crate::provider::{
    ChatMessage, CompletionOptions, CompletionResponse, CompletionStream, MessageRole,
    ModelProviderClient, TokenUsage,
};
use async_trait::async_trait;
use futures::{stream, StreamExt};
use serde_json::json;
use std::time::Duration;

const CHARS_PER_CHUNK: usize = 6;

const DEMO_CONTENT: &[(&str, &str)] = &[
    ("项目背景", "本项目旨在解决当前市场中存在的文档编辑与AI辅助生成的结合问题。随着AI技术的发展，越来越多的用户希望能够利用AI来辅助文档创作，但现有的解决方案往往缺乏灵活性和交互性。"),
    ("市场分析", "根据最新市场调研，AI辅助写作工具市场规模预计在2025年达到50亿美元，年增长率约为35%。卢旺达农业GDP预计增长5%，这表明新兴市场对技术解决方案的需求正在增加。"),
    ("商业模式", "我们采用SaaS订阅模式，提供基础版和专业版两种套餐。基础版面向个人用户，专业版针对企业用户提供更多高级功能和API集成能力。同时，我们将通过API授权给第三方开发者创造额外收入来源。"),
    ("财务预测", "基于市场分析和用户增长预测，我们预计第一年营收达到100万美元，第三年突破500万美元。初期投资主要用于技术开发和市场推广，预计18个月内实现盈亏平衡。"),
    ("风险分析", "主要风险包括技术实现难度、市场竞争加剧以及用户隐私保护等合规问题。我们已制定相应的风险应对策略，包括技术储备、差异化竞争策略以及严格的数据安全措施。"),
    ("团队介绍", "我们的团队由AI技术专家、产品设计师和市场营销专家组成，核心成员均拥有相关领域5年以上经验。技术负责人曾参与多个成功的AI产品开发，产品负责人有丰富的SaaS产品设计经验。"),
    ("发展规划", "短期目标是完善产品功能，提升用户体验；中期目标是扩大市场份额，建立行业影响力；长期目标是打造AI辅助创作领域的领导品牌，并探索更多垂直领域的应用可能。"),
];

const DEMO_FALLBACK: &str = "内容正在生成中...";

/// Canned text for a section title.
pub fn demo_content(title: &str) -> &'static str {
    DEMO_CONTENT
        .iter()
        .find(|(t, _)| *t == title)
        .map(|(_, content)| *content)
        .unwrap_or(DEMO_FALLBACK)
}

/// Section title quoted in the first user message, if any.
fn requested_section(messages: &[ChatMessage]) -> Option<&str> {
    let request = messages.iter().find(|m| m.role == MessageRole::User)?;
    let start = request.content.find('"')? + 1;
    let len = request.content[start..].find('"')?;
    Some(&request.content[start..start + len])
}

fn split_chunks(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(CHARS_PER_CHUNK)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Offline backend that streams canned section text.
pub struct DemoClient {
    chunk_delay: Duration,
}

impl DemoClient {
    pub fn new(chunk_delay: Duration) -> Self {
        Self { chunk_delay }
    }

    /// Remaining canned text for the request, honoring any prior assistant output.
    fn remaining_text(messages: &[ChatMessage]) -> String {
        let full = requested_section(messages)
            .map(demo_content)
            .unwrap_or(DEMO_FALLBACK);
        let prior = messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant)
            .map(|m| m.content.trim());
        match prior {
            Some(prior) if full.starts_with(prior) && prior.len() < full.len() => {
                full[prior.len()..].to_string()
            }
            _ => full.to_string(),
        }
    }
}

#[async_trait]
impl ModelProviderClient for DemoClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, ApiError> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();

        let content = if options.json_mode {
            let original = last_user
                .split_once("\n\n")
                .map(|(_, text)| text.to_string())
                .unwrap_or(last_user);
            json!({
                "improved": original.trim(),
                "suggestions": ["添加更多具体数据支持您的观点", "考虑增加一个实际案例来说明"],
            })
            .to_string()
        } else {
            format!(
                "关于\"{}\"，我建议您考虑以下几点：\n\n1. 添加更多具体数据支持您的观点\n2. 考虑增加一个实际案例来说明\n3. 可以进一步阐述实施细节",
                last_user.trim()
            )
        };

        Ok(CompletionResponse {
            content,
            model: "demo".to_string(),
            usage: TokenUsage::default(),
            finish_reason: Some("stop".to_string()),
        })
    }

    async fn stream(
        &self,
        messages: Vec<ChatMessage>,
        _options: CompletionOptions,
    ) -> Result<CompletionStream, ApiError> {
        let chunks = split_chunks(&Self::remaining_text(&messages));
        let delay = self.chunk_delay;
        Ok(Box::pin(stream::iter(chunks).then(move |chunk| async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok::<String, ApiError>(chunk)
        })))
    }

    fn provider_name(&self) -> &str {
        "demo"
    }

    fn model_name(&self) -> &str {
        "demo"
    }
}
