//! Trade-history records and the simulated trade intent.

use rust_decimal::Decimal;
use serde::Deserialize;

use super::Side;

/// Body of a `GET /v1/client/trades` response.
#[derive(Debug, Clone, Deserialize)]
pub struct TradePage {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub meta: Option<PageMeta>,
    #[serde(default)]
    pub rows: Vec<TradeRecord>,
}

/// Pagination block of a trade-history page.
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub total: u64,
    pub records_per_page: u32,
    pub current_page: u32,
}

/// One executed trade.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeRecord {
    pub id: u64,
    pub symbol: String,
    #[serde(default)]
    pub order_id: Option<u64>,
    pub side: Side,
    pub executed_price: Decimal,
    pub executed_quantity: Decimal,
    #[serde(default)]
    pub fee: Decimal,
    #[serde(default)]
    pub fee_asset: Option<String>,
    /// Execution time as sent by the exchange (seconds with fraction).
    pub executed_timestamp: String,
    #[serde(default)]
    pub is_maker: Option<u8>,
}

impl TradeRecord {
    /// Quote-currency value of the fill.
    pub fn notional(&self) -> Decimal {
        self.executed_price * self.executed_quantity
    }
}

/// A trade the signal cycle wants placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeIntent {
    pub symbol: String,
    pub side: Side,
    pub quantity: Decimal,
}
