//! Rate Card - Pricing Configuration
//!
//! Rates are data, not logic. The pricing engine only sees a [`RateProvider`];
//! the shop's [`RateCard`] is one implementation, loaded from JSON.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::print::{Binding, ColorMode, PaperSize, PaperStock};
use crate::ENGINE_VERSION;

/// Startup-time configuration faults. While any of these is present the
/// pricing engine refuses to serve quotes.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Rate card not found: {0}")]
    NotFound(PathBuf),

    #[error("Rate card unreadable: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rate card is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Rate card offers no paper sizes")]
    NothingOffered,

    #[error("Rate card has no rate for {paper_size} {color_mode}")]
    MissingRate {
        paper_size: PaperSize,
        color_mode: ColorMode,
    },

    #[error("Rate card has a negative amount for {0}")]
    NegativeAmount(String),

    #[error("Rate card uses {0} decimal places, at most 6 are supported")]
    UnsupportedPrecision(u32),

    #[error("Rate card requires engine >= {required}, current is {current}")]
    EngineVersionMismatch { required: String, current: String },

    #[error("Invalid version in rate card: {0}")]
    InvalidVersion(#[from] semver::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub code: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
}

fn default_decimal_places() -> u32 { 2 }

impl Currency {
    /// Formats an amount with the currency symbol, or the code when the card
    /// has no symbol.
    pub fn format(&self, amount: Decimal) -> String {
        let amount = format!("{:.*}", self.decimal_places as usize, self.round(amount));
        if self.symbol.is_empty() {
            format!("{} {}", self.code, amount)
        } else {
            format!("{}{}", self.symbol, amount)
        }
    }

    /// Rounds half-up to the currency's minor unit.
    pub fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.decimal_places, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self {
            code: "INR".to_string(),
            symbol: "₹".to_string(),
            decimal_places: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateEntry {
    pub paper_size: PaperSize,
    pub color_mode: ColorMode,
    /// Price of one printed sheet on standard stock.
    pub sheet_rate: Decimal,
    #[serde(default)]
    pub glossy_sheet_rate: Option<Decimal>,
}

/// Flat per-order surcharges. An unset kind is not offered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingSurcharges {
    #[serde(default)]
    pub spiral: Option<Decimal>,
    #[serde(default)]
    pub staple: Option<Decimal>,
}

impl BindingSurcharges {
    pub fn get(&self, binding: Binding) -> Option<Decimal> {
        match binding {
            Binding::Spiral => self.spiral,
            Binding::Staple => self.staple,
        }
    }
}

/// Supplies rates to the pricing engine.
pub trait RateProvider {
    fn currency(&self) -> &Currency;

    /// Per-sheet rate for a combination, `None` when not configured.
    fn sheet_rate(&self, paper_size: PaperSize, color_mode: ColorMode, stock: PaperStock) -> Option<Decimal>;

    /// Flat per-order surcharge for a binding kind, `None` when not offered.
    fn binding_surcharge(&self, binding: Binding) -> Option<Decimal>;

    /// Called once when an engine is built on this provider.
    fn check_complete(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// The shop's rate card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateCard {
    #[serde(default)]
    pub currency: Currency,
    #[serde(default = "default_engine_min_version")]
    pub engine_min_version: String,
    #[serde(default = "default_offered")]
    pub offered_paper_sizes: Vec<PaperSize>,
    pub rates: Vec<RateEntry>,
    #[serde(default)]
    pub binding: BindingSurcharges,
}

fn default_engine_min_version() -> String { crate::MIN_ENGINE_VERSION.to_string() }
fn default_offered() -> Vec<PaperSize> { vec![PaperSize::A4] }

impl RateCard {
    /// Loads a rate card from a JSON file.
    ///
    /// Unlike a lookup cache, a missing or broken file is an error: the shop
    /// must never quote from rates it did not configure.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let card: RateCard = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), entries = card.rates.len(), "loaded rate card");
        Ok(card)
    }

    pub fn entry(&self, paper_size: PaperSize, color_mode: ColorMode) -> Option<&RateEntry> {
        self.rates
            .iter()
            .find(|e| e.paper_size == paper_size && e.color_mode == color_mode)
    }

    fn check_engine_version(&self) -> Result<(), ConfigError> {
        let engine_ver = semver::Version::parse(ENGINE_VERSION)?;
        let min_ver = semver::Version::parse(&self.engine_min_version)?;

        if engine_ver < min_ver {
            return Err(ConfigError::EngineVersionMismatch {
                required: self.engine_min_version.clone(),
                current: ENGINE_VERSION.to_string(),
            });
        }
        Ok(())
    }
}

impl RateProvider for RateCard {
    fn currency(&self) -> &Currency {
        &self.currency
    }

    fn sheet_rate(&self, paper_size: PaperSize, color_mode: ColorMode, stock: PaperStock) -> Option<Decimal> {
        let entry = self.entry(paper_size, color_mode)?;
        match stock {
            PaperStock::Standard => Some(entry.sheet_rate),
            PaperStock::Glossy => entry.glossy_sheet_rate,
        }
    }

    fn binding_surcharge(&self, binding: Binding) -> Option<Decimal> {
        self.binding.get(binding)
    }

    /// Every offered paper size must be priced in both color modes, and no
    /// amount may be negative.
    fn check_complete(&self) -> Result<(), ConfigError> {
        self.check_engine_version()?;

        if self.offered_paper_sizes.is_empty() {
            return Err(ConfigError::NothingOffered);
        }
        if self.currency.decimal_places > 6 {
            return Err(ConfigError::UnsupportedPrecision(self.currency.decimal_places));
        }

        for &paper_size in &self.offered_paper_sizes {
            for color_mode in ColorMode::ALL {
                if self.entry(paper_size, color_mode).is_none() {
                    return Err(ConfigError::MissingRate { paper_size, color_mode });
                }
            }
        }

        for entry in &self.rates {
            let negative = entry.sheet_rate.is_sign_negative()
                || entry.glossy_sheet_rate.is_some_and(|r| r.is_sign_negative());
            if negative {
                return Err(ConfigError::NegativeAmount(format!(
                    "{} {}",
                    entry.paper_size, entry.color_mode
                )));
            }
        }
        for (name, amount) in [("spiral binding", self.binding.spiral), ("staple binding", self.binding.staple)] {
            if amount.is_some_and(|a| a.is_sign_negative()) {
                return Err(ConfigError::NegativeAmount(name.to_string()));
            }
        }

        Ok(())
    }
}

impl Default for RateCard {
    /// The shop's published prices: B&W 2, color 10, glossy 20 per A4 sheet.
    /// No binding is offered by default.
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            engine_min_version: default_engine_min_version(),
            offered_paper_sizes: vec![PaperSize::A4],
            rates: vec![
                RateEntry {
                    paper_size: PaperSize::A4,
                    color_mode: ColorMode::BlackAndWhite,
                    sheet_rate: Decimal::new(200, 2),
                    glossy_sheet_rate: Some(Decimal::new(2000, 2)),
                },
                RateEntry {
                    paper_size: PaperSize::A4,
                    color_mode: ColorMode::Color,
                    sheet_rate: Decimal::new(1000, 2),
                    glossy_sheet_rate: Some(Decimal::new(2000, 2)),
                },
            ],
            binding: BindingSurcharges::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_card_is_complete() {
        assert!(RateCard::default().check_complete().is_ok());
    }

    #[test]
    fn test_glossy_uses_its_own_column() {
        let card = RateCard::default();
        let rate = card.sheet_rate(PaperSize::A4, ColorMode::BlackAndWhite, PaperStock::Glossy);
        assert_eq!(rate, Some(Decimal::new(20, 0)));
        assert_eq!(card.sheet_rate(PaperSize::A3, ColorMode::Color, PaperStock::Standard), None);
    }

    #[test]
    fn test_incomplete_card_names_gap() {
        let mut card = RateCard::default();
        card.offered_paper_sizes.push(PaperSize::A3);
        let err = card.check_complete().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingRate { paper_size: PaperSize::A3, color_mode: ColorMode::BlackAndWhite }
        ));
        assert_eq!(err.to_string(), "Rate card has no rate for A3 Black & White");
    }

    #[test]
    fn test_negative_rate_rejected() {
        let mut card = RateCard::default();
        card.binding.staple = Some(Decimal::new(-5, 0));
        assert!(matches!(card.check_complete(), Err(ConfigError::NegativeAmount(_))));
    }

    #[test]
    fn test_future_engine_version_rejected() {
        let card = RateCard {
            engine_min_version: "99.0.0".to_string(),
            ..RateCard::default()
        };
        assert!(matches!(
            card.check_complete(),
            Err(ConfigError::EngineVersionMismatch { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "currency": {{"code": "USD", "symbol": "$"}},
                "offeredPaperSizes": ["A4"],
                "rates": [
                    {{"paperSize": "A4", "colorMode": "black_and_white", "sheetRate": "0.10"}},
                    {{"paperSize": "A4", "colorMode": "color", "sheetRate": "0.50"}}
                ],
                "binding": {{"spiral": "3.00"}}
            }}"#
        )
        .unwrap();

        let card = RateCard::load_from_file(file.path()).unwrap();
        assert_eq!(card.currency.code, "USD");
        assert_eq!(card.currency.decimal_places, 2);
        assert_eq!(card.binding.get(Binding::Spiral), Some(Decimal::new(300, 2)));
        assert_eq!(card.binding.get(Binding::Staple), None);
        assert!(card.check_complete().is_ok());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RateCard::load_from_file(&dir.path().join("rates.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = RateCard::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed(_)));
    }

    #[test]
    fn test_currency_format() {
        let inr = Currency::default();
        assert_eq!(inr.format(Decimal::new(5, 0)), "₹5.00");
        let usd = Currency { code: "USD".into(), symbol: String::new(), decimal_places: 2 };
        assert_eq!(usd.format(Decimal::new(1999, 3)), "USD 2.00");
    }
}
