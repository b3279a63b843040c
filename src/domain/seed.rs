//! String-to-seed folding.
//!
//! FNV-1a over UTF-16 code units with wrapping 32-bit multiply. Hashing code
//! units rather than bytes keeps seeds stable for CJK strategy names.

const FNV_OFFSET: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// Name used in seed keys for strategies that have not been named yet.
pub const DRAFT_NAME: &str = "draft";

pub fn hash(text: &str) -> u32 {
    text.encode_utf16().fold(FNV_OFFSET, |acc, unit| {
        (acc ^ u32::from(unit)).wrapping_mul(FNV_PRIME)
    })
}

/// The tuple that determines one simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedKey<'a> {
    pub code: &'a str,
    pub strategy_name: &'a str,
    pub day_window: u32,
    pub global_seed: u32,
}

impl<'a> SeedKey<'a> {
    /// Blank strategy names fall back to [`DRAFT_NAME`].
    pub fn new(code: &'a str, strategy_name: &'a str, day_window: u32, global_seed: u32) -> Self {
        let strategy_name = if strategy_name.is_empty() {
            DRAFT_NAME
        } else {
            strategy_name
        };
        Self {
            code,
            strategy_name,
            day_window,
            global_seed,
        }
    }

    pub fn key_string(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.code, self.strategy_name, self.day_window, self.global_seed
        )
    }

    pub fn seed(&self) -> u32 {
        hash(&self.key_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn golden_simulation_key() {
        assert_eq!(hash("600519_draft_60_1234567"), 4_107_431_046);
    }

    #[test]
    fn empty_string_is_offset_basis() {
        assert_eq!(hash(""), FNV_OFFSET);
    }

    #[test]
    fn single_ascii_char() {
        assert_eq!(hash("a"), 3_826_002_220);
    }

    #[test]
    fn hashes_utf16_code_units() {
        assert_eq!(hash("贵州茅台"), 420_181_655);
    }

    #[test]
    fn seed_key_uses_draft_for_blank_name() {
        let key = SeedKey::new("600519", "", 60, 1_234_567);
        assert_eq!(key.key_string(), "600519_draft_60_1234567");
        assert_eq!(key.seed(), 4_107_431_046);
    }

    #[test]
    fn each_component_perturbs_seed() {
        let base = SeedKey::new("600519", "draft", 60, 1_234_567).seed();
        let variants = [
            SeedKey::new("600518", "draft", 60, 1_234_567).seed(),
            SeedKey::new("600519", "drafu", 60, 1_234_567).seed(),
            SeedKey::new("600519", "draft", 61, 1_234_567).seed(),
            SeedKey::new("600519", "draft", 60, 1_234_568).seed(),
        ];
        for v in variants {
            assert_ne!(v, base);
            assert!((v ^ base).count_ones() >= 4, "weak avalanche: {v:#x} vs {base:#x}");
        }
    }
}
