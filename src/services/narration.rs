//! Narration service: prompt construction and the chat-completions client.
//!
//! Callers never invoke a [`NarrationService`] directly; every call goes
//! through [`NarrationBroker`](crate::core::broker::NarrationBroker) so the
//! shared external rate limit is respected.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt::Write as _;
use tracing::{debug, warn};

use crate::error::NarrationError;
use crate::models::{TimeframeAnalysis, TradeSignal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    /// Structured review of one timeframe ending with a short conclusion.
    Explanation,
    /// One or two sentences of conclusion for one timeframe.
    ShortComment,
    /// Review across all supplied timeframes plus an overall conclusion.
    CombinedForecast,
}

impl PromptKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptKind::Explanation => "explanation",
            PromptKind::ShortComment => "short_comment",
            PromptKind::CombinedForecast => "combined_forecast",
        }
    }

    pub fn max_tokens(&self) -> u32 {
        match self {
            PromptKind::Explanation => 600,
            PromptKind::ShortComment => 200,
            PromptKind::CombinedForecast => 900,
        }
    }

    fn system_message(&self) -> &'static str {
        match self {
            PromptKind::Explanation => {
                "You are a crypto market analyst. Follow the requested layout strictly. \
                 After the indicator block always add one line starting with 'Conclusion:'. \
                 Cover only the timeframe you are given and add no other commentary."
            }
            PromptKind::ShortComment => {
                "You are a crypto market analyst. Give only a short conclusion about the \
                 indicators. Do not repeat the values and do not write a header."
            }
            PromptKind::CombinedForecast => {
                "You are a crypto market analyst. Follow the requested layout strictly. For \
                 every timeframe give a short conclusion, the direction with its probability \
                 and the key indicators, then finish with an overall conclusion."
            }
        }
    }
}

/// Everything a narration call needs: what to write and about which data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationRequest {
    pub kind: PromptKind,
    pub symbol: String,
    pub analyses: Vec<TimeframeAnalysis>,
}

impl NarrationRequest {
    pub fn explanation(analysis: TimeframeAnalysis) -> Self {
        Self {
            kind: PromptKind::Explanation,
            symbol: analysis.snapshot.symbol.clone(),
            analyses: vec![analysis],
        }
    }

    pub fn short_comment(analysis: TimeframeAnalysis) -> Self {
        Self {
            kind: PromptKind::ShortComment,
            symbol: analysis.snapshot.symbol.clone(),
            analyses: vec![analysis],
        }
    }

    pub fn combined(symbol: &str, analyses: Vec<TimeframeAnalysis>) -> Self {
        Self {
            kind: PromptKind::CombinedForecast,
            symbol: symbol.to_string(),
            analyses,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationPrompt {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
}

fn signal_label(signal: TradeSignal) -> &'static str {
    match signal {
        TradeSignal::Buy => "BUY",
        TradeSignal::Sell => "SELL",
        TradeSignal::Hold => "HOLD",
    }
}

fn indicator_block(out: &mut String, analysis: &TimeframeAnalysis) {
    let s = &analysis.snapshot;
    let d = &analysis.decision;
    let ma = &s.moving_average_summary;
    let _ = writeln!(out, "- Final signal: {} ({})", signal_label(d.signal), d.reason);
    let _ = writeln!(out, "- Direction: {} {}%", d.direction, d.confidence);
    let _ = writeln!(out, "- Recommendation: {}", s.recommendation);
    let _ = writeln!(out, "- RSI: {}", s.momentum);
    let _ = writeln!(out, "- MACD: {}", s.macd);
    let _ = writeln!(out, "- Stoch RSI: {}", s.stoch_rsi);
    let _ = writeln!(out, "- EMA(50/100/200): {} / {} / {}", s.ema50, s.ema100, s.ema200);
    let _ = writeln!(
        out,
        "- MA Summary: {} ({} Buy / {} Sell)",
        ma.recommendation, ma.buy_count, ma.sell_count
    );
    let _ = writeln!(out, "- Volume: {} (20-candle average {})", s.volume, s.avg_volume20);
    let _ = writeln!(out, "- Trend: {:?}", s.trend);
}

/// Renders the chat prompt for a request.
pub fn build_prompt(request: &NarrationRequest) -> NarrationPrompt {
    let mut user = String::new();
    match request.kind {
        PromptKind::Explanation => {
            for analysis in &request.analyses {
                let tf = analysis.timeframe();
                let _ = writeln!(
                    user,
                    "Write a short structured review of {} on the {} timeframe for a trader.",
                    request.symbol,
                    tf.label()
                );
                let _ = writeln!(
                    user,
                    "Start with the header '{} - {}', list the indicators below one per line, \
                     then add one line 'Conclusion: ...' of 1-2 sentences stressing how strong \
                     or uncertain the signal is.\n",
                    request.symbol,
                    tf.label()
                );
                let _ = writeln!(user, "Indicators:");
                indicator_block(&mut user, analysis);
            }
        }
        PromptKind::ShortComment => {
            for analysis in &request.analyses {
                let _ = writeln!(
                    user,
                    "Based on these indicators for {} on the {} timeframe give a 1-2 sentence \
                     conclusion for a trader. Do not repeat the values.\n",
                    request.symbol,
                    analysis.timeframe().label()
                );
                let _ = writeln!(user, "Indicators:");
                indicator_block(&mut user, analysis);
            }
        }
        PromptKind::CombinedForecast => {
            let _ = writeln!(
                user,
                "Using the indicators below for {}, write a structured forecast. For each \
                 timeframe give a 1-2 sentence conclusion, the direction (LONG/SHORT) with its \
                 probability and the main indicators. Finish with an overall conclusion across \
                 all timeframes.\n",
                request.symbol
            );
            for analysis in &request.analyses {
                let _ = writeln!(user, "{}:", analysis.timeframe().label());
                indicator_block(&mut user, analysis);
                user.push('\n');
            }
        }
    }

    NarrationPrompt {
        system: request.kind.system_message().to_string(),
        user: user.trim().to_string(),
        max_tokens: request.kind.max_tokens(),
    }
}

#[async_trait]
pub trait NarrationService: Send + Sync {
    async fn generate(&self, request: &NarrationRequest) -> Result<String, NarrationError>;
}

/// OpenAI-compatible `/chat/completions` client.
pub struct ChatCompletionClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl ChatCompletionClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, model: impl Into<String>) -> Self {
        Self::with_client(base_url, api_key, model, reqwest::Client::new())
    }

    pub fn with_client(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
            temperature: 0.5,
            client,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Maps a failed HTTP exchange onto the narration error taxonomy, keeping the
/// upstream message intact.
pub fn classify_failure(status: u16, body: &str) -> NarrationError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message").or(Some(e)))
                .and_then(|m| m.as_str().map(str::to_string))
        })
        .unwrap_or_else(|| body.to_string());

    if status == 429 || body.contains("insufficient_quota") {
        NarrationError::QuotaExceeded(message)
    } else if status == 401 || status == 403 {
        NarrationError::Unauthorized(message)
    } else {
        NarrationError::Api { status, message }
    }
}

#[async_trait]
impl NarrationService for ChatCompletionClient {
    async fn generate(&self, request: &NarrationRequest) -> Result<String, NarrationError> {
        let prompt = build_prompt(request);
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": prompt.user },
            ],
            "temperature": self.temperature,
            "max_tokens": prompt.max_tokens,
        });

        debug!(
            symbol = %request.symbol,
            kind = request.kind.as_str(),
            model = %self.model,
            "Narration: calling chat completions"
        );

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| NarrationError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| NarrationError::Transport(e.to_string()))?;

        if !status.is_success() {
            let err = classify_failure(status.as_u16(), &text);
            warn!(status = status.as_u16(), error = %err, "Narration: request rejected");
            return Err(err);
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&text).map_err(|e| NarrationError::Decode(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(NarrationError::EmptyResponse)
    }
}
