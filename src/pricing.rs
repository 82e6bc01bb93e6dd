//! Pricing Engine - Deterministic Quotes
//!
//! total = sheets × sheet rate × copies + binding surcharge
//!
//! Arithmetic is exact decimal; the only rounding happens once, on the total,
//! half-up to the currency's minor unit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::print::{Binding, ColorMode, PaperSize, PaperStock, PrintOptions};
use crate::rates::{ConfigError, Currency, RateProvider};

/// Rejected quote input. Always user-correctable; the message names the
/// field or the option combination to fix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInput {
    #[error("Invalid page count {0}: must be at least 1")]
    PageCount(i64),

    #[error("Invalid number of copies {0}: must be at least 1")]
    Copies(i64),

    #[error("No rate for {paper_size} {color_mode} on {stock} paper")]
    MissingRate {
        paper_size: PaperSize,
        color_mode: ColorMode,
        stock: PaperStock,
    },

    #[error("{0} binding is not offered")]
    BindingNotOffered(Binding),

    #[error("Order too large to price")]
    OutOfRange,
}

impl InvalidInput {
    /// Form field the customer has to correct.
    pub fn field(&self) -> &'static str {
        match self {
            Self::PageCount(_) => "pageCount",
            Self::Copies(_) | Self::OutOfRange => "copies",
            Self::MissingRate { stock: PaperStock::Glossy, .. } => "stock",
            Self::MissingRate { .. } => "paperSize",
            Self::BindingNotOffered(_) => "binding",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub label: String,
    pub amount: Decimal,
}

impl LineItem {
    fn new(label: impl Into<String>, amount: Decimal) -> Self {
        Self { label: label.into(), amount }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub currency: String,
    pub pages: u64,
    pub sheets: u64,
    pub copies: u64,
    /// Per-sheet rate applied, unrounded.
    pub unit_price: Decimal,
    pub total_price: Decimal,
    /// Printing first, then binding when present.
    pub breakdown: Vec<LineItem>,
}

/// Prices orders against an injected rate provider.
pub struct PricingEngine {
    rates: Box<dyn RateProvider>,
}

impl PricingEngine {
    /// Builds an engine, refusing rates that fail the provider's completeness
    /// check. No quotes are served from an incomplete configuration.
    pub fn new(rates: impl RateProvider + 'static) -> Result<Self, ConfigError> {
        rates.check_complete()?;
        Ok(Self { rates: Box::new(rates) })
    }

    pub fn currency(&self) -> &Currency {
        self.rates.currency()
    }

    /// Quotes `page_count` pages printed with `options`.
    ///
    /// `page_count` must already be resolved: an unknown detection has to be
    /// replaced by a manual override before calling this.
    pub fn quote(&self, page_count: i64, options: &PrintOptions) -> Result<PriceQuote, InvalidInput> {
        let pages = u64::try_from(page_count)
            .ok()
            .filter(|&p| p > 0)
            .ok_or(InvalidInput::PageCount(page_count))?;
        let copies = u64::try_from(options.copies)
            .ok()
            .filter(|&c| c > 0)
            .ok_or(InvalidInput::Copies(options.copies))?;

        let rate = self
            .rates
            .sheet_rate(options.paper_size, options.color_mode, options.stock)
            .ok_or_else(|| self.missing_rate(options))?;

        let sheets = options.sided.sheets_for(pages);

        let printing = rate
            .checked_mul(Decimal::from(sheets))
            .and_then(|per_copy| per_copy.checked_mul(Decimal::from(copies)))
            .ok_or(InvalidInput::OutOfRange)?;

        let surcharge = match options.binding {
            Some(binding) => Some((
                binding,
                self.rates
                    .binding_surcharge(binding)
                    .ok_or(InvalidInput::BindingNotOffered(binding))?,
            )),
            None => None,
        };

        let raw_total = printing
            .checked_add(surcharge.map_or(Decimal::ZERO, |(_, amount)| amount))
            .ok_or(InvalidInput::OutOfRange)?;

        let currency = self.rates.currency();
        let mut breakdown = vec![LineItem::new("Printing", currency.round(printing))];
        if let Some((binding, amount)) = surcharge {
            breakdown.push(LineItem::new(format!("Binding ({})", binding), currency.round(amount)));
        }

        let quote = PriceQuote {
            currency: currency.code.clone(),
            pages,
            sheets,
            copies,
            unit_price: rate,
            total_price: currency.round(raw_total),
            breakdown,
        };

        tracing::debug!(
            pages,
            sheets,
            copies,
            total = %quote.total_price,
            "quoted order"
        );

        Ok(quote)
    }

    /// Names the stock only when the standard rate for the same size and
    /// color exists; otherwise the paper size itself is the gap.
    fn missing_rate(&self, options: &PrintOptions) -> InvalidInput {
        let standard = self
            .rates
            .sheet_rate(options.paper_size, options.color_mode, PaperStock::Standard);
        InvalidInput::MissingRate {
            paper_size: options.paper_size,
            color_mode: options.color_mode,
            stock: if standard.is_some() { options.stock } else { PaperStock::Standard },
        }
    }
}
