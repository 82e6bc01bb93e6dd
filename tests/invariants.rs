//! Contract Invariant Tests
//!
//! These tests verify the non-negotiable guarantees.

use printdesk_core::{
    pricing::LineItem,
    rates::RateEntry,
    Binding, ColorMode, CustomerContact, DocumentInspector, InvalidInput, OrderDesk,
    OrderError, OrderRequest, PageCount, PaperSize, PaperStock, PricingEngine, PrintOptions,
    RateCard, Sided, UploadedFile,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn card_with_bw_rate(rate: Decimal) -> RateCard {
    RateCard {
        rates: vec![
            RateEntry {
                paper_size: PaperSize::A4,
                color_mode: ColorMode::BlackAndWhite,
                sheet_rate: rate,
                glossy_sheet_rate: None,
            },
            RateEntry {
                paper_size: PaperSize::A4,
                color_mode: ColorMode::Color,
                sheet_rate: Decimal::new(1000, 2),
                glossy_sheet_rate: None,
            },
        ],
        ..RateCard::default()
    }
}

fn bw() -> PrintOptions {
    PrintOptions::new(PaperSize::A4, ColorMode::BlackAndWhite)
}

#[test]
fn invariant_end_to_end_example() {
    let engine = PricingEngine::new(card_with_bw_rate(Decimal::new(500, 2))).unwrap();
    let options = bw().sided(Sided::DoubleSided).copies(2);

    let quote = engine.quote(10, &options).unwrap();

    assert_eq!(quote.sheets, 5);
    assert_eq!(quote.total_price, Decimal::new(5000, 2));
    assert_eq!(
        quote.breakdown,
        vec![LineItem { label: "Printing".to_string(), amount: Decimal::new(5000, 2) }]
    );
}

#[test]
fn invariant_sheets_not_pages() {
    let engine = PricingEngine::new(card_with_bw_rate(Decimal::ONE)).unwrap();
    assert_eq!(engine.quote(7, &bw().sided(Sided::DoubleSided)).unwrap().sheets, 4);
    assert_eq!(engine.quote(7, &bw().sided(Sided::SingleSided)).unwrap().sheets, 7);
}

#[test]
fn invariant_round_once_half_up() {
    let exact = PricingEngine::new(card_with_bw_rate(Decimal::new(233, 2))).unwrap();
    assert_eq!(exact.quote(3, &bw()).unwrap().total_price, Decimal::new(699, 2));

    let thirds = PricingEngine::new(card_with_bw_rate(Decimal::new(333, 3))).unwrap();
    assert_eq!(thirds.quote(3, &bw()).unwrap().total_price, Decimal::new(100, 2));
}

#[test]
fn invariant_copies_scale_printing_not_binding() {
    let mut card = card_with_bw_rate(Decimal::new(125, 2));
    card.binding.staple = Some(Decimal::new(750, 2));
    let engine = PricingEngine::new(card).unwrap();

    let single = engine.quote(9, &bw().binding(Binding::Staple)).unwrap();
    let triple = engine.quote(9, &bw().binding(Binding::Staple).copies(3)).unwrap();

    let single_printing = single.breakdown[0].amount;
    let binding = single.breakdown[1].amount;
    assert_eq!(triple.total_price, single_printing * Decimal::from(3) + binding);
    assert_eq!(triple.breakdown[1].amount, binding);
}

#[test]
fn invariant_invalid_input_never_quotes_zero() {
    let engine = PricingEngine::new(RateCard::default()).unwrap();

    assert_eq!(engine.quote(0, &bw()), Err(InvalidInput::PageCount(0)));
    assert_eq!(engine.quote(-1, &bw()), Err(InvalidInput::PageCount(-1)));
    assert_eq!(engine.quote(5, &bw().copies(0)), Err(InvalidInput::Copies(0)));
}

#[test]
fn invariant_missing_rate_names_combination() {
    let engine = PricingEngine::new(RateCard::default()).unwrap();
    let err = engine.quote(5, &PrintOptions::new(PaperSize::Legal, ColorMode::BlackAndWhite)).unwrap_err();

    let message = err.to_string();
    assert!(message.contains("Legal"));
    assert!(message.contains("Black & White"));
}

#[test]
fn invariant_incomplete_configuration_refused() {
    let mut card = RateCard::default();
    card.offered_paper_sizes = vec![PaperSize::A4, PaperSize::A3];
    assert!(PricingEngine::new(card).is_err());
}

#[test]
fn invariant_malformed_documents_degrade_to_unknown() {
    let inspector = DocumentInspector::new();
    let inputs: [&[u8]; 4] = [
        b"",
        b"%PDF-1.7\n",
        b"%PDF-1.4\n1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\ntrailer << /Root 1 0 R >>",
        &[0u8, 159, 146, 150, 255, 0, 37, 80, 68, 70],
    ];

    for bytes in inputs {
        assert_eq!(inspector.inspect(bytes, "application/pdf"), PageCount::Unknown);
    }
}

#[test]
fn invariant_override_beats_detection() {
    let desk = OrderDesk::new(PricingEngine::new(RateCard::default()).unwrap());
    let request = OrderRequest {
        customer: CustomerContact {
            name: "Meera".to_string(),
            phone: "9123456789".to_string(),
            email: None,
        },
        files: vec![UploadedFile::new("cv.docx", "application/msword", b"PK\x03\x04".to_vec())],
        options: bw(),
        page_override: Some(3),
        comments: String::new(),
    };

    let order = desk.prepare(request.clone()).unwrap();
    assert_eq!(order.quote.pages, 3);
    assert_eq!(order.files[0].bytes, b"PK\x03\x04".to_vec());

    let without_override = OrderRequest { page_override: None, ..request };
    assert!(matches!(desk.prepare(without_override), Err(OrderError::Incomplete(_))));
}

proptest! {
    #[test]
    fn invariant_quote_deterministic(
        pages in 1i64..5_000,
        copies in 1i64..500,
        double_sided in any::<bool>(),
        glossy in any::<bool>(),
        color in any::<bool>(),
    ) {
        let engine = PricingEngine::new(RateCard::default()).unwrap();
        let options = PrintOptions::new(
            PaperSize::A4,
            if color { ColorMode::Color } else { ColorMode::BlackAndWhite },
        )
        .sided(if double_sided { Sided::DoubleSided } else { Sided::SingleSided })
        .stock(if glossy { PaperStock::Glossy } else { PaperStock::Standard })
        .copies(copies);

        let first = engine.quote(pages, &options).unwrap();
        let second = engine.quote(pages, &options).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(
            printdesk_core::quote_fingerprint(&options, &first).unwrap(),
            printdesk_core::quote_fingerprint(&options, &second).unwrap()
        );
        prop_assert!(first.total_price > Decimal::ZERO);
    }
}

#[test]
fn invariant_shipped_rate_card_is_complete() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config/rates.example.json");
    let card = RateCard::load_from_file(&path).unwrap();
    let engine = PricingEngine::new(card).unwrap();

    let quote = engine
        .quote(20, &PrintOptions::new(PaperSize::A3, ColorMode::Color).binding(Binding::Spiral))
        .unwrap();
    assert_eq!(quote.total_price, Decimal::new(44000, 2));
}
