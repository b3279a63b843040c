//! Security reference data port.

use crate::domain::error::StockdeskError;
use crate::domain::security::Security;

pub trait SecurityPort {
    fn list_securities(&self) -> Result<Vec<Security>, StockdeskError>;

    /// Free-text search; a blank query lists everything.
    fn search(&self, query: &str) -> Result<Vec<Security>, StockdeskError>;

    fn get_security(&self, code: &str) -> Result<Option<Security>, StockdeskError>;
}
