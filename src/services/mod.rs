//! External collaborators: market data, technical summaries, narration.

pub mod binance;
pub mod market_data;
pub mod narration;
pub mod tradingview;

pub use binance::BinanceKlinesClient;
pub use market_data::{EmptyPriceHistory, PriceHistoryProvider, TechnicalSummaryProvider};
pub use narration::{
    build_prompt, ChatCompletionClient, NarrationPrompt, NarrationRequest, NarrationService,
    PromptKind,
};
pub use tradingview::TradingViewScanner;
