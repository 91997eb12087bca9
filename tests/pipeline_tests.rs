//! # Pipeline Tests
//!
//! End-to-end checks from options to exported artifacts.
//!
//! ## Test Coverage
//!
//! - **Payloads**: every kind produces the expected scanner string.
//! - **Determinism**: identical options give byte-identical PNGs.
//! - **Styling**: shapes survive into the exported SVG.
//! - **Degradation**: a corrupt logo yields the plain code.
//! - **Delivery**: saving, clipboard fallback, and newest-wins regeneration.

use pretty_assertions::assert_eq;
use qreative::export::{self, ExportFormat, NoShareTarget, PlatformError, ShareOutcome};
use qreative::payload::{self, WifiEncryption};
use qreative::{
    Color, Logo, PayloadConfig, PayloadForm, PayloadKind, Pipeline, QrOptions, Regenerator,
    ShapeType, StyleConfig, contrast,
};
use std::io::Cursor;
use std::sync::Mutex;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn options(payload: PayloadConfig, style: StyleConfig) -> QrOptions {
    QrOptions {
        payload,
        style,
        logo: None,
    }
}

fn styled() -> StyleConfig {
    StyleConfig {
        foreground: "#1a237e".parse().unwrap(),
        background: "#fffde7".parse().unwrap(),
        corner_radius: 10,
        corner_square_type: ShapeType::Rounded,
        dot_type: ShapeType::Dot,
    }
}

fn logo() -> Logo {
    let img = image::RgbaImage::from_pixel(32, 32, image::Rgba([200, 30, 30, 255]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    Logo::from_bytes(bytes)
}

#[derive(Default)]
struct MemoryClipboard(Mutex<Vec<String>>);

#[async_trait::async_trait]
impl export::Clipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<(), PlatformError> {
        self.0.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

// ============================================================================
// PAYLOADS
// ============================================================================

#[test]
fn test_payload_strings() {
    let cases = [
        (
            PayloadConfig::Wifi {
                ssid: "Home".into(),
                password: "secret1".into(),
                encryption: WifiEncryption::Wpa,
                hidden: false,
            },
            "WIFI:S:Home;T:WPA;P:secret1;H:false;;",
        ),
        (
            PayloadConfig::Email {
                address: "a@b.co".into(),
                subject: Some("Hi there".into()),
                body: None,
            },
            "mailto:a@b.co?subject=Hi%20there&body=",
        ),
        (
            PayloadConfig::Phone {
                number: "+15550100".into(),
            },
            "tel:+15550100",
        ),
        (
            PayloadConfig::Url {
                target: "https://example.com".into(),
            },
            "https://example.com",
        ),
    ];
    for (config, expected) in cases {
        assert_eq!(payload::format(&config), expected);
    }
}

#[test]
fn test_form_keeps_drafts_across_kinds() {
    let mut form = PayloadForm::new(PayloadConfig::default());
    form.set(PayloadConfig::Url {
        target: "https://rust-lang.org".into(),
    });
    form.select(PayloadKind::Phone);
    form.set(PayloadConfig::Phone {
        number: "123".into(),
    });
    form.select(PayloadKind::Url);
    assert_eq!(form.format(), "https://rust-lang.org");
}

#[test]
fn test_contrast_verdicts() {
    let gray7: Color = "#777777".parse().unwrap();
    let gray8: Color = "#888888".parse().unwrap();
    assert_eq!(contrast::contrast_ratio(gray7, gray7), 1.0);
    assert!((contrast::contrast_ratio(Color::BLACK, Color::WHITE) - 21.0).abs() < 0.01);
    assert!(!contrast::has_good_contrast(gray7, gray8));
}

// ============================================================================
// GENERATION
// ============================================================================

#[tokio::test]
async fn test_identical_options_give_identical_png() {
    let mut opts = options(PayloadConfig::default(), styled());
    opts.logo = Some(logo());

    let pipeline = Pipeline::default();
    let a = pipeline.generate(&opts).await.unwrap();
    let b = pipeline.generate(&opts).await.unwrap();

    let png_a = export::export(&a, ExportFormat::Png).unwrap();
    let png_b = export::export(&b, ExportFormat::Png).unwrap();
    assert_eq!(png_a.bytes, png_b.bytes);
}

#[tokio::test]
async fn test_styles_reach_the_svg() {
    let code = Pipeline::default()
        .generate(&options(PayloadConfig::default(), styled()))
        .await
        .unwrap();
    let svg = String::from_utf8(export::export(&code, ExportFormat::Svg).unwrap().bytes).unwrap();

    assert!(svg.contains("fill=\"#fffde7\""));
    assert!(svg.contains("<circle"));
    // rounded finder subpaths are drawn with arcs
    assert!(svg.contains("fill-rule=\"evenodd\""));
    assert!(svg.contains(" 0 0 1 "));
    assert!(!svg.contains("<image"));
}

#[tokio::test]
async fn test_square_style_matches_plain_encoder_output() {
    let code = Pipeline::default()
        .generate(&options(PayloadConfig::default(), StyleConfig::default()))
        .await
        .unwrap();
    let request = qreative::symbol::EncodeRequest::new(code.data.as_str(), &code.style);
    let plain = qreative::QrCodeEncoder::new().encode_now(&request).unwrap();
    assert_eq!(code.symbol, plain);
}

#[tokio::test]
async fn test_corrupt_logo_gives_plain_code() {
    let mut broken = options(PayloadConfig::default(), styled());
    broken.logo = Some(Logo::from_bytes(vec![0x89, b'P', b'N', b'G']));
    let plain = options(PayloadConfig::default(), styled());

    let pipeline = Pipeline::default();
    let a = pipeline.generate(&broken).await.unwrap();
    let b = pipeline.generate(&plain).await.unwrap();
    assert_eq!(a.image, b.image);
    assert!(a.logo.is_none());
}

#[tokio::test]
async fn test_low_contrast_still_generates() {
    let style = StyleConfig {
        foreground: "#777777".parse().unwrap(),
        background: "#888888".parse().unwrap(),
        ..Default::default()
    };
    let code = Pipeline::default()
        .generate(&options(PayloadConfig::default(), style))
        .await
        .unwrap();
    assert!(!code.contrast.passes);
    assert!(code.contrast.warning().is_some());
}

// ============================================================================
// DELIVERY
// ============================================================================

#[tokio::test]
async fn test_save_both_formats() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = options(PayloadConfig::default(), styled());
    opts.logo = Some(logo());
    let code = Pipeline::default().generate(&opts).await.unwrap();

    let png = export::save(&export::export(&code, ExportFormat::Png).unwrap(), dir.path())
        .await
        .unwrap();
    let svg = export::save(&export::export(&code, ExportFormat::Svg).unwrap(), dir.path())
        .await
        .unwrap();

    let decoded = image::open(&png).unwrap().to_rgba8();
    assert_eq!(decoded, code.image);
    let markup = std::fs::read_to_string(&svg).unwrap();
    assert!(markup.contains("href=\"data:image/png;base64,"));
}

#[tokio::test]
async fn test_share_without_sheet_copies_data_url() {
    let code = Pipeline::default()
        .generate(&QrOptions::default())
        .await
        .unwrap();
    let clipboard = MemoryClipboard::default();

    let outcome = export::share(&code, &NoShareTarget, &clipboard).await.unwrap();
    assert_eq!(outcome, ShareOutcome::CopiedToClipboard);
    let copied = clipboard.0.lock().unwrap();
    assert_eq!(copied.len(), 1);
    assert!(copied[0].starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn test_regenerator_publishes_newest() {
    let regen = Regenerator::new(Pipeline::default());
    let first = regen.trigger(options(
        PayloadConfig::Text { body: "one".into() },
        StyleConfig::default(),
    ));
    let second = regen.trigger(options(
        PayloadConfig::Text { body: "two".into() },
        StyleConfig::default(),
    ));

    second.published().await.unwrap();
    first.published().await.unwrap();

    let snapshot = regen.current();
    assert_eq!(snapshot.ticket, 2);
    assert_eq!(snapshot.code().unwrap().data, "two");
}
