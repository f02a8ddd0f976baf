use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// USD spot prices shown under each block announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prices {
    pub xec_usd: Decimal,
    pub btc_usd: Decimal,
    pub eth_usd: Decimal,
}
