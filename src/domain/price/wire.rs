//! Wire types for price responses.

use rust_decimal::Decimal;
use std::collections::HashMap;

/// `POST /price/v1.1/{chain}` — token address → USD price. Prices arrive as
/// strings or numbers depending on the requested currency.
pub type PriceMapResponse = HashMap<String, Decimal>;
