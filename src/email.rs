//! Order Email - Rendering and Transport Seam
//!
//! The crate renders the message; delivery belongs to a [`MailTransport`].
//! Nothing here retries.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::order::{Order, PageSource};
use crate::rates::Currency;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Mail transport not configured: {0}")]
    NotConfigured(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Who the shop is and where orders go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopProfile {
    pub shop_name: String,
    pub owner_email: String,
    /// Sending account; the owner address is used when unset.
    #[serde(default)]
    pub sender_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: usize,
    pub sha256: String,
    pub data_base64: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEmail {
    pub order_id: String,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub cc: Option<String>,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<Attachment>,
}

impl OrderEmail {
    /// Renders the shop-owner email for an order. The customer is copied
    /// when they gave an email address.
    pub fn render(order: &Order, shop: &ShopProfile, currency: &Currency) -> Self {
        let cc = order
            .customer
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string);

        let attachments = order
            .files
            .iter()
            .map(|f| Attachment {
                file_name: f.inspection.file_name.clone(),
                content_type: f.mime_type.clone(),
                size_bytes: f.size_bytes,
                sha256: f.sha256.clone(),
                data_base64: base64::Engine::encode(&base64::engine::general_purpose::STANDARD, &f.bytes),
            })
            .collect();

        Self {
            order_id: order.id.clone(),
            from: shop.sender_email.clone().unwrap_or_else(|| shop.owner_email.clone()),
            to: shop.owner_email.clone(),
            cc,
            subject: format!("Print Order: {}", order.customer.name.trim()),
            body: render_body(order, shop, currency),
            attachments,
        }
    }

    pub fn recipients(&self) -> Vec<String> {
        std::iter::once(self.to.clone()).chain(self.cc.clone()).collect()
    }
}

fn render_body(order: &Order, shop: &ShopProfile, currency: &Currency) -> String {
    let options = &order.options;
    let quote = &order.quote;
    let customer = &order.customer;

    let mut lines = vec![
        format!("New Print Order - {}", shop.shop_name),
        "===============".to_string(),
        format!("Order: {}", order.id),
        format!("Placed: {}", order.created_at.format("%Y-%m-%d %H:%M:%S UTC")),
        String::new(),
        "Customer Details:".to_string(),
        "-----------------".to_string(),
        format!("Name: {}", customer.name.trim()),
        format!("Phone: {}", customer.phone.trim()),
        format!("Email: {}", customer.email.as_deref().unwrap_or("(not given)")),
        String::new(),
        "Order Specifications:".to_string(),
        "---------------------".to_string(),
        format!("Paper Size: {}", options.paper_size),
        format!("Color Mode: {}", options.color_mode),
        format!("Paper Type: {}", options.stock),
        format!("Sides: {}", options.sided),
        format!("Copies: {}", quote.copies),
        format!(
            "Binding: {}",
            options.binding.map_or_else(|| "None".to_string(), |b| b.to_string())
        ),
        String::new(),
        "File Summary:".to_string(),
        "-------------".to_string(),
    ];

    lines.extend(order.files.iter().map(|f| format!("    - {}", f.inspection.summary())));

    let source = match order.page_source {
        PageSource::Detected => "detected",
        PageSource::Override => "entered by customer",
    };
    lines.extend([
        String::new(),
        format!("Total Pages: {} ({})", quote.pages, source),
        format!("Sheets per Copy: {}", quote.sheets),
        format!("Rate per Sheet: {}", currency.format(quote.unit_price)),
        String::new(),
        "Price Breakdown:".to_string(),
        "----------------".to_string(),
    ]);
    lines.extend(
        quote
            .breakdown
            .iter()
            .map(|item| format!("    {}: {}", item.label, currency.format(item.amount))),
    );
    lines.extend([
        "-----------------------------------".to_string(),
        format!("Total Estimated Cost: {}", currency.format(quote.total_price)),
        "-----------------------------------".to_string(),
        format!("Quote Fingerprint: {}", order.quote_fingerprint),
        String::new(),
        "Additional Comments:".to_string(),
        if order.comments.trim().is_empty() {
            "(none)".to_string()
        } else {
            order.comments.trim().to_string()
        },
    ]);

    lines.join("\n")
}

/// Receipt from a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub order_id: String,
    pub recipients: Vec<String>,
    #[serde(default)]
    pub location: Option<PathBuf>,
}

/// Delivers rendered order emails.
pub trait MailTransport {
    fn send(&self, email: &OrderEmail) -> Result<Delivery, TransportError>;
}

/// Drops each email as `<order-id>.json` into a directory for a mailer
/// process to pick up.
pub struct OutboxTransport {
    dir: PathBuf,
}

impl OutboxTransport {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl MailTransport for OutboxTransport {
    fn send(&self, email: &OrderEmail) -> Result<Delivery, TransportError> {
        if !self.dir.is_dir() {
            return Err(TransportError::NotConfigured(format!(
                "outbox {} is not a directory",
                self.dir.display()
            )));
        }

        let path = self.dir.join(format!("{}.json", email.order_id));
        fs::write(&path, serde_json::to_vec_pretty(email)?)?;
        tracing::debug!(path = %path.display(), "email written to outbox");

        Ok(Delivery {
            order_id: email.order_id.clone(),
            recipients: email.recipients(),
            location: Some(path),
        })
    }
}
