//! Print Desk Core - Order Intake and Pricing
//!
//! # The Rules
//! 1. Detection Never Fails (unknown is an answer)
//! 2. Override Beats Detection
//! 3. Rates Are Configuration
//! 4. Price Per Sheet, Round Once
//! 5. Same Inputs, Same Quote

pub mod inspect;
pub mod print;
pub mod rates;
pub mod pricing;
pub mod hashing;
pub mod validation;
pub mod order;
pub mod email;

pub use inspect::{DocumentInspector, DocumentKind, Inspection, InspectionReport, PageCount, UploadedFile};
pub use print::{Binding, ColorMode, PaperSize, PaperStock, PrintOptions, Sided};
pub use rates::{ConfigError, Currency, RateCard, RateProvider};
pub use pricing::{InvalidInput, LineItem, PriceQuote, PricingEngine};
pub use hashing::{canonical_json, quote_fingerprint, sha256_hex};
pub use validation::{ValidationResult, ValidationViolation, ViolationSeverity};
pub use order::{CustomerContact, Order, OrderDesk, OrderError, OrderRequest, PageSource};
pub use email::{MailTransport, OrderEmail, OutboxTransport, ShopProfile, TransportError};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const MIN_ENGINE_VERSION: &str = "1.0.0";
