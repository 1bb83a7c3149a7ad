// Posting fee charged before a product goes live: 1% of the effective
// price with a 10 shilling floor.

pub const MIN_POSTING_FEE: u64 = 10;
pub const POSTING_FEE_RATE: f64 = 0.01;

pub fn effective_price(price: Option<f64>, discount_price: Option<f64>) -> Option<f64> {
    match discount_price {
        Some(d) if d > 0.0 => Some(d),
        _ => price,
    }
}

pub fn posting_fee(effective_price: f64) -> u64 {
    let fee = (effective_price * POSTING_FEE_RATE).ceil() as u64;
    fee.max(MIN_POSTING_FEE)
}
