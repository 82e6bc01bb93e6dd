//! Order Desk - Single Entry Point
//!
//! inspect → override → quote → validate → assemble → hand to transport.
//! Every submission goes through `prepare`; there is no other way to build
//! an [`Order`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::email::{Delivery, MailTransport, OrderEmail, ShopProfile, TransportError};
use crate::hashing::{quote_fingerprint, sha256_hex};
use crate::inspect::{DocumentInspector, Inspection, InspectionReport, UploadedFile};
use crate::pricing::{InvalidInput, PriceQuote, PricingEngine};
use crate::print::PrintOptions;
use crate::validation::{Submission, ValidationResult, ValidationViolation, Validator};
use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order incomplete. {}", .0.summary())]
    Incomplete(ValidationResult),

    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to send: {0}")]
    Transport(#[from] TransportError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerContact {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Where the final page count came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSource {
    /// Counted from the uploaded documents
    Detected,
    /// Entered by the customer; always wins over detection
    Override,
}

/// Everything the order form collected.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub customer: CustomerContact,
    pub files: Vec<UploadedFile>,
    pub options: PrintOptions,
    pub page_override: Option<i64>,
    pub comments: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFile {
    #[serde(flatten)]
    pub inspection: Inspection,
    pub mime_type: String,
    pub size_bytes: usize,
    pub sha256: String,
    /// Passed through untouched to the email attachment.
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub engine_version: String,
    pub customer: CustomerContact,
    pub files: Vec<OrderFile>,
    pub page_source: PageSource,
    pub options: PrintOptions,
    pub quote: PriceQuote,
    pub quote_fingerprint: String,
    #[serde(default)]
    pub comments: String,
    /// Non-blocking validation findings, e.g. no customer email.
    #[serde(default)]
    pub warnings: Vec<ValidationViolation>,
}

/// The order desk - owns the inspector, the engine, and the rules.
pub struct OrderDesk {
    inspector: DocumentInspector,
    engine: PricingEngine,
    validator: Validator,
}

impl OrderDesk {
    pub fn new(engine: PricingEngine) -> Self {
        Self {
            inspector: DocumentInspector::new(),
            engine,
            validator: Validator::new(),
        }
    }

    pub fn engine(&self) -> &PricingEngine {
        &self.engine
    }

    /// Suggested page count for the form, before any override.
    pub fn inspect(&self, files: &[UploadedFile]) -> InspectionReport {
        self.inspector.inspect_all(files)
    }

    /// Quote for the files and options as they stand, honoring an override.
    pub fn quote(
        &self,
        report: &InspectionReport,
        page_override: Option<i64>,
        options: &PrintOptions,
    ) -> Result<Option<PriceQuote>, InvalidInput> {
        match report.total.resolve(page_override) {
            Some(pages) => self.engine.quote(pages, options).map(Some),
            None => Ok(None),
        }
    }

    /// Validates and assembles an order. Uploaded bytes move into the order
    /// unchanged.
    pub fn prepare(&self, request: OrderRequest) -> Result<Order, OrderError> {
        let report = self.inspector.inspect_all(&request.files);
        let resolved_pages = report.total.resolve(request.page_override);

        let validation = self.validator.validate(&Submission {
            request: &request,
            resolved_pages,
        });
        if !validation.valid {
            tracing::info!(summary = %validation.summary(), "order rejected");
            return Err(OrderError::Incomplete(validation));
        }

        // PageCountRule guarantees a resolved count at this point.
        let pages = resolved_pages.ok_or(InvalidInput::PageCount(0))?;
        let quote = self.engine.quote(pages, &request.options)?;
        let fingerprint = quote_fingerprint(&request.options, &quote)?;

        let page_source = if request.page_override.is_some() {
            PageSource::Override
        } else {
            PageSource::Detected
        };

        let files = request
            .files
            .into_iter()
            .zip(report.files)
            .map(|(file, inspection)| OrderFile {
                inspection,
                mime_type: file.mime_type,
                size_bytes: file.bytes.len(),
                sha256: sha256_hex(&file.bytes),
                bytes: file.bytes,
            })
            .collect();

        let order = Order {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
            customer: request.customer,
            files,
            page_source,
            options: request.options,
            quote,
            quote_fingerprint: fingerprint,
            comments: request.comments,
            warnings: validation.violations,
        };

        tracing::info!(
            order_id = %order.id,
            pages = order.quote.pages,
            total = %order.quote.total_price,
            "order prepared"
        );

        Ok(order)
    }

    /// Prepares the order, renders the shop email, and hands it to the
    /// transport. Delivery failures are reported, not retried.
    pub fn submit(
        &self,
        request: OrderRequest,
        shop: &ShopProfile,
        transport: &dyn MailTransport,
    ) -> Result<(Order, Delivery), OrderError> {
        let order = self.prepare(request)?;
        let email = OrderEmail::render(&order, shop, self.engine.currency());
        let delivery = transport.send(&email)?;

        tracing::info!(order_id = %order.id, recipients = ?delivery.recipients, "order sent");
        Ok((order, delivery))
    }
}
