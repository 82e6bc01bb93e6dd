//! Print Desk CLI - Bridge interface for the order form
//!
//! Commands: rates, inspect, quote, order
//! Outputs JSON to stdout, logs to stderr
//! Exit 1 on configuration faults, 2 on rejected input

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use printdesk_core::{
    ConfigError, CustomerContact, OrderDesk, OrderEmail, OrderError, OrderRequest, OutboxTransport,
    PricingEngine, PrintOptions, RateCard, ShopProfile, UploadedFile,
};

#[derive(Parser)]
#[command(name = "printdesk-cli")]
#[command(about = "Print Desk CLI - order intake and pricing")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the rate card JSON; the published default card is used when omitted
    #[arg(short, long, env = "PRINTDESK_RATES")]
    rates: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the active rate card
    Rates,

    /// Detect page counts of documents
    Inspect {
        /// Files to inspect
        #[arg(short, long, required = true)]
        file: Vec<PathBuf>,

        /// Declared MIME type; sniffed from name and content when omitted
        #[arg(short, long, default_value = "")]
        mime: String,
    },

    /// Price a page count
    Quote {
        /// Final page count
        #[arg(short, long, allow_negative_numbers = true)]
        pages: i64,

        /// JSON payload (PrintOptions)
        #[arg(short = 'o', long)]
        payload: String,
    },

    /// Validate, price, and send an order
    Order {
        /// JSON payload (customer, options, pageOverride, comments)
        #[arg(short = 'o', long)]
        payload: String,

        /// Uploaded files
        #[arg(short, long)]
        file: Vec<PathBuf>,

        /// Outbox directory; without it the order is only rendered (demo mode)
        #[arg(long, env = "PRINTDESK_OUTBOX")]
        outbox: Option<PathBuf>,

        #[arg(long, env = "PRINTDESK_SHOP_NAME", default_value = "Professional Print Services")]
        shop_name: String,

        #[arg(long, env = "PRINTDESK_OWNER_EMAIL")]
        owner_email: String,

        #[arg(long, env = "PRINTDESK_SENDER_EMAIL")]
        sender_email: Option<String>,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderPayload {
    customer: CustomerContact,
    options: PrintOptions,
    #[serde(default)]
    page_override: Option<i64>,
    #[serde(default)]
    comments: String,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "printdesk_core=info,printdesk_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let card = match load_rate_card(cli.rates.as_deref()) {
        Ok(card) => card,
        Err(e) => return fail(format!("Failed to load rate card: {}", e), ExitCode::FAILURE),
    };

    let engine = match PricingEngine::new(card.clone()) {
        Ok(engine) => engine,
        Err(e) => return fail(format!("Rate card incomplete: {}", e), ExitCode::FAILURE),
    };
    let desk = OrderDesk::new(engine);

    match cli.command {
        Commands::Rates => emit(&card),

        Commands::Inspect { file, mime } => {
            let files = match read_uploads(&file, &mime) {
                Ok(files) => files,
                Err(e) => return fail(e, ExitCode::FAILURE),
            };
            emit(&desk.inspect(&files))
        }

        Commands::Quote { pages, payload } => {
            let options: PrintOptions = match serde_json::from_str(&payload) {
                Ok(o) => o,
                Err(e) => return fail(format!("Invalid payload: {}", e), ExitCode::from(2)),
            };

            match desk.engine().quote(pages, &options) {
                Ok(quote) => emit(&quote),
                Err(e) => {
                    let output = serde_json::json!({
                        "error": e.to_string(),
                        "field": e.field(),
                    });
                    println!("{}", output);
                    ExitCode::from(2)
                }
            }
        }

        Commands::Order { payload, file, outbox, shop_name, owner_email, sender_email } => {
            let payload: OrderPayload = match serde_json::from_str(&payload) {
                Ok(p) => p,
                Err(e) => return fail(format!("Invalid payload: {}", e), ExitCode::from(2)),
            };
            let files = match read_uploads(&file, "") {
                Ok(files) => files,
                Err(e) => return fail(e, ExitCode::FAILURE),
            };

            let request = OrderRequest {
                customer: payload.customer,
                files,
                options: payload.options,
                page_override: payload.page_override,
                comments: payload.comments,
            };
            let shop = ShopProfile { shop_name, owner_email, sender_email };

            let result = match outbox {
                Some(dir) => desk
                    .submit(request, &shop, &OutboxTransport::new(dir))
                    .map(|(order, delivery)| serde_json::json!({
                        "success": true,
                        "order": order,
                        "delivery": delivery,
                    })),
                None => desk.prepare(request).map(|order| {
                    tracing::warn!("no outbox configured, order rendered but not sent");
                    let email = OrderEmail::render(&order, &shop, desk.engine().currency());
                    serde_json::json!({
                        "success": true,
                        "demo": true,
                        "order": order,
                        "email": {
                            "to": email.to,
                            "cc": email.cc,
                            "subject": email.subject,
                            "body": email.body,
                        },
                    })
                }),
            };

            match result {
                Ok(output) => emit(&output),
                Err(OrderError::Incomplete(validation)) => {
                    let output = serde_json::json!({
                        "success": false,
                        "error": validation.summary(),
                        "validation": validation,
                    });
                    println!("{}", output);
                    ExitCode::from(2)
                }
                Err(e @ OrderError::InvalidInput(_)) => fail(e.to_string(), ExitCode::from(2)),
                Err(e) => fail(e.to_string(), ExitCode::FAILURE),
            }
        }
    }
}

/// An explicit path must load; only an absent one falls back to the
/// published default card.
fn load_rate_card(path: Option<&Path>) -> Result<RateCard, ConfigError> {
    match path {
        Some(path) => RateCard::load_from_file(path),
        None => {
            tracing::warn!("no rate card given (--rates / PRINTDESK_RATES), quoting from the published default");
            Ok(RateCard::default())
        }
    }
}

fn read_uploads(paths: &[PathBuf], mime: &str) -> Result<Vec<UploadedFile>, String> {
    paths
        .iter()
        .map(|path| {
            let bytes = fs::read(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
            Ok(UploadedFile::new(file_name(path), mime, bytes))
        })
        .collect()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn emit<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(s) => {
            println!("{}", s);
            ExitCode::SUCCESS
        }
        Err(e) => fail(format!("Serialization failed: {}", e), ExitCode::FAILURE),
    }
}

fn fail(message: impl Into<String>, code: ExitCode) -> ExitCode {
    let message = message.into();
    tracing::error!(%message);
    println!("{}", serde_json::json!({ "success": false, "error": message }));
    code
}
