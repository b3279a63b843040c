//! Live market feed port.

use crate::domain::error::StockdeskError;
use crate::domain::market::MarketSnapshot;
use std::time::Duration;

pub trait MarketPort {
    /// Fetch a snapshot, giving up after `timeout`. Derived scores in the
    /// payload are not trusted; callers recompute them.
    fn fetch(&self, timeout: Duration) -> Result<MarketSnapshot, StockdeskError>;
}
