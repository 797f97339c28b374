use parking_lot::Mutex;
use rust_decimal::Decimal;

/// Holds the single most recent price and derives each new observation's
/// percent change against it.
#[derive(Default)]
pub struct ChangeTracker {
    last_price: Mutex<Option<Decimal>>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the percent change against the previous price, rounded to
    /// two decimals, or `None` on the first observation. The new price is
    /// stored unconditionally, whether or not the caller uses the result.
    pub fn update(&self, new_price: Decimal) -> Option<Decimal> {
        let mut last = self.last_price.lock();
        let change = last
            .map(|prev| ((new_price - prev) / prev * Decimal::ONE_HUNDRED).round_dp(2));
        *last = Some(new_price);
        change
    }

    pub fn last_price(&self) -> Option<Decimal> {
        *self.last_price.lock()
    }
}
