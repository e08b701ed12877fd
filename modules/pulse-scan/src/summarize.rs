//! Summarizer seam: turns curated posts and comment samples into a
//! sentiment [`Summary`].

use std::sync::Arc;

use anyhow::{anyhow, Result};
use arctic_client::{permalink, Post};
use async_trait::async_trait;
use pulse_common::{CommentBundle, Config, Finding, PulseError, SentimentLabel, Summary};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

const OPENAI_API_URL: &str = "https://api.openai.com/v1";
const POST_BODY_CHARS: usize = 500;
const BUNDLE_TITLE_CHARS: usize = 100;
const MAX_FINDINGS: usize = 5;

pub const NO_KEY_MESSAGE: &str = "AI analysis unavailable - no API key configured";
pub const PARSE_FAILED_MESSAGE: &str = "AI analysis completed but response parsing failed. Try scanning again.";

const SYSTEM_PROMPT: &str = "You are an expert online community analyst. Analyze Reddit posts and comments to extract sentiment, themes, complaints, and praise. Always respond with valid JSON only, no markdown. Be professional and ignore toxic content.";

/// Everything the summarizer is shown for one scan.
#[derive(Debug, Clone, Copy)]
pub struct SummaryRequest<'a> {
    pub subject_label: &'a str,
    pub keywords: Option<&'a str>,
    pub posts: &'a [Post],
    pub comments: &'a [CommentBundle],
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Produce a summary. Unusable model output is reported as
    /// [`Summary::unavailable`]; `Err` is reserved for failed calls.
    async fn summarize(&self, request: &SummaryRequest<'_>) -> Result<Summary, PulseError>;
}

/// Pick the summarizer the configuration allows.
pub fn summarizer_from_config(config: &Config) -> Arc<dyn Summarizer> {
    match &config.openai_api_key {
        Some(key) => {
            let mut summarizer = OpenAiSummarizer::new(key, &config.openai_model);
            if let Some(url) = &config.openai_base_url {
                summarizer = summarizer.with_base_url(url);
            }
            Arc::new(summarizer)
        }
        None => Arc::new(UnavailableSummarizer),
    }
}

/// Used when no API key is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableSummarizer;

#[async_trait]
impl Summarizer for UnavailableSummarizer {
    async fn summarize(&self, _request: &SummaryRequest<'_>) -> Result<Summary, PulseError> {
        Ok(Summary::unavailable(NO_KEY_MESSAGE))
    }
}

// ---------------------------------------------------------------------------
// OpenAI-compatible chat completions
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct OpenAiSummarizer {
    api_key: String,
    model: String,
    base_url: String,
    http: reqwest::Client,
}

impl OpenAiSummarizer {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: OPENAI_API_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn complete(&self, prompt: &str) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.7,
            max_tokens: 2000,
        };

        debug!(model = %self.model, "Summary request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("OpenAI API error ({}): {}", status, error_text));
        }

        Ok(response.json().await?)
    }
}

fn first_content(chat: ChatResponse) -> Result<String, PulseError> {
    chat.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| PulseError::Summarizer("No response from OpenAI".to_string()))
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, request: &SummaryRequest<'_>) -> Result<Summary, PulseError> {
        let prompt = build_prompt(request);
        let text = first_content(self.complete(&prompt).await?)?;
        match parse_summary(&text) {
            Some(summary) => Ok(summary),
            None => {
                warn!(subject = request.subject_label, "Failed to parse summary response");
                Ok(Summary::unavailable(PARSE_FAILED_MESSAGE))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

fn take_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((cut, _)) => &s[..cut],
        None => s,
    }
}

fn post_line(post: &Post) -> String {
    let mut line = format!(
        "[POST:{}] [{} pts, {} comments] {}",
        post.id, post.score, post.num_comments, post.title
    );
    let body = take_chars(&post.selftext, POST_BODY_CHARS);
    if !body.is_empty() && body != "[removed]" && body != "[deleted]" {
        line.push_str("\n  Content: ");
        line.push_str(body.replace('\n', " ").trim());
    }
    line
}

fn comment_section(bundles: &[CommentBundle]) -> (String, usize) {
    let mut sections = Vec::new();
    let mut total = 0;
    for bundle in bundles.iter().filter(|b| !b.comments.is_empty()) {
        let mut lines = vec![format!(
            "\n--- Comments on [POST:{}] {} ---",
            bundle.post_id,
            take_chars(&bundle.post_title, BUNDLE_TITLE_CHARS)
        )];
        for c in &bundle.comments {
            lines.push(format!("  [{} pts] {}", c.score, c.body));
            total += 1;
        }
        sections.push(lines.join("\n"));
    }
    if sections.is_empty() {
        (String::new(), 0)
    } else {
        (
            format!("\n\nCOMMENT SAMPLES FROM TOP POSTS:\n{}", sections.join("\n")),
            total,
        )
    }
}

/// Build the analysis prompt. Each post is tagged `[POST:<id>]` so findings
/// can cite it as `https://www.reddit.com/comments/<id>/`.
pub fn build_prompt(request: &SummaryRequest<'_>) -> String {
    let posts_text = request
        .posts
        .iter()
        .map(post_line)
        .collect::<Vec<_>>()
        .join("\n");
    let (comments_text, comment_total) = comment_section(request.comments);
    let keyword_note = match request.keywords.map(str::trim) {
        Some(k) if !k.is_empty() => format!("\nKeywords to watch for: {k}"),
        _ => String::new(),
    };
    let post_count = request.posts.len();
    let example_link = permalink("POST_ID");

    format!(
        r#"Analyze these {post_count} Reddit posts (and {comment_total} comment samples) about "{label}" and provide a community sentiment analysis.

IMPORTANT INSTRUCTIONS:
- Ignore any slurs, toxic language, or personal attacks in your analysis. Summarize themes professionally without quoting toxic content.
- For pain_points and wins, include 1-2 evidence links using the POST IDs provided in square brackets.
- The evidence format should reference posts like: "{example_link}"

REQUIRED OUTPUT (JSON format):
1. sentiment_label: "Positive", "Mixed", or "Negative"
2. sentiment_summary: 2-3 sentences explaining the overall community mood
3. themes: Array of 5-10 common discussion topics (strings)
4. pain_points: Array of exactly 5 objects, each with "text" and "evidence" (1-2 links in {example_link} format)
5. wins: Array of exactly 5 objects, each with "text" and "evidence" (1-2 links in {example_link} format)
{keyword_note}

Reddit Posts ({post_count} total):
{posts_text}
{comments_text}

Respond ONLY with valid JSON in this exact format:
{{
    "sentiment_label": "Positive" or "Mixed" or "Negative",
    "sentiment_summary": "2-3 sentence explanation of community mood",
    "themes": ["theme1", "theme2", ...],
    "pain_points": [{{"text": "complaint description", "evidence": ["{example_link}"]}}, ...],
    "wins": [{{"text": "praise description", "evidence": ["{example_link}"]}}, ...]
}}"#,
        label = request.subject_label,
    )
}

// ---------------------------------------------------------------------------
// Response coercion
// ---------------------------------------------------------------------------

/// Strip markdown code fences from a model response.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Parse a model response into a Summary. `None` when it is not a JSON object.
pub fn parse_summary(response: &str) -> Option<Summary> {
    let value: Value = serde_json::from_str(strip_code_blocks(response)).ok()?;
    value.is_object().then(|| coerce_summary(&value))
}

/// Coerce an arbitrary JSON object into a Summary, replacing missing or
/// mistyped fields with empty defaults.
pub fn coerce_summary(value: &Value) -> Summary {
    let sentiment_label = value
        .get("sentiment_label")
        .and_then(Value::as_str)
        .map(SentimentLabel::parse)
        .unwrap_or(SentimentLabel::Unknown);
    let sentiment_summary = value
        .get("sentiment_summary")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let themes = value
        .get("themes")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Summary {
        sentiment_label,
        sentiment_summary,
        themes,
        pain_points: coerce_findings(value.get("pain_points")),
        wins: coerce_findings(value.get("wins")),
    }
}

fn coerce_findings(value: Option<&Value>) -> Vec<Finding> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(coerce_finding)
        .take(MAX_FINDINGS)
        .collect()
}

fn coerce_finding(item: &Value) -> Option<Finding> {
    match item {
        Value::String(text) => Some(Finding {
            text: text.clone(),
            evidence: Vec::new(),
        }),
        Value::Object(map) => {
            let text = match map.get("text") {
                Some(Value::String(text)) => text.clone(),
                Some(other) => other.to_string(),
                None => item.to_string(),
            };
            let evidence = map
                .get("evidence")
                .and_then(Value::as_array)
                .map(|links| {
                    links
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            Some(Finding { text, evidence })
        }
        _ => None,
    }
}
