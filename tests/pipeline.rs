//! End-to-end pipeline tests with the deterministic doubles.
//!
//! These drive [`Extractor`] from raw upload bytes to the final envelope
//! without pdfium, tesseract or network access.

use pdf_form_extract::prompts::DEFAULT_EXTRACTION_PROMPT;
use pdf_form_extract::testing::{CannedLlm, ScriptedOcr, StubRasterizer};
use pdf_form_extract::{Extractor, ServiceConfig};
use serde_json::json;
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

const FORM_JSON: &str = r#"{"applicantDetails":{"fullName":"Jane Doe","dateOfBirth":"1990-01-01"},"contactInfo":{"phoneNumber":"555-1234"}}"#;

fn test_config() -> Arc<ServiceConfig> {
    Arc::new(
        ServiceConfig::builder()
            .api_key("test-key")
            .build()
            .expect("valid config"),
    )
}

struct Harness {
    extractor: Extractor,
    rasterizer: Arc<StubRasterizer>,
    ocr: Arc<ScriptedOcr>,
    llm: Arc<CannedLlm>,
}

fn harness(pages: &[&str], llm: CannedLlm) -> Harness {
    let rasterizer = Arc::new(StubRasterizer::with_pages(pages.len()));
    let ocr = Arc::new(ScriptedOcr::new(pages.iter().copied()));
    let llm = Arc::new(llm);
    let extractor = Extractor::new(
        test_config(),
        rasterizer.clone(),
        ocr.clone(),
        llm.clone(),
    );
    Harness {
        extractor,
        rasterizer,
        ocr,
        llm,
    }
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn two_page_scanned_form() {
    let h = harness(
        &["Name: Jane Doe\nDOB: 1990-01-01", "Phone: 555-1234"],
        CannedLlm::reply(FORM_JSON),
    );

    let env = h
        .extractor
        .extract_upload("application.pdf", b"%PDF-1.4 two pages")
        .await
        .expect("PDF upload accepted");

    assert_eq!(h.rasterizer.calls(), 1);
    assert_eq!(h.ocr.calls(), 2);

    let prompts = h.llm.prompts();
    assert_eq!(prompts.len(), 1);
    assert_eq!(
        prompts[0],
        format!(
            "{}\n\nName: Jane Doe DOB: 1990-01-01 Phone: 555-1234",
            DEFAULT_EXTRACTION_PROMPT
        )
    );

    assert!(env.is_success());
    assert_eq!(env.error(), None);
    assert_eq!(
        serde_json::Value::Object(env.data().clone()),
        json!({
            "applicantDetails": {"fullName": "Jane Doe", "dateOfBirth": "1990-01-01"},
            "contactInfo": {"phoneNumber": "555-1234"}
        })
    );
}

#[tokio::test]
async fn fenced_reply_is_unwrapped() {
    let h = harness(
        &["Name: Jane Doe"],
        CannedLlm::reply(format!("Sure! Here it is:\n```json\n{FORM_JSON}\n```")),
    );
    let env = h.extractor.extract(b"%PDF").await;
    assert!(env.is_success());
    assert_eq!(
        env.data()["contactInfo"]["phoneNumber"],
        json!("555-1234")
    );
}

#[tokio::test]
async fn long_text_is_truncated_in_the_prompt() {
    let long_page = "x".repeat(20_000);
    let h = harness(&[long_page.as_str()], CannedLlm::reply("{}"));
    let env = h.extractor.extract(b"%PDF").await;
    assert!(env.is_success());

    let prompt = &h.llm.prompts()[0];
    let embedded = prompt
        .strip_prefix(DEFAULT_EXTRACTION_PROMPT)
        .and_then(|p| p.strip_prefix("\n\n"))
        .expect("template prefix");
    assert_eq!(embedded, &long_page[..15_000]);
}

#[tokio::test]
async fn empty_scan_never_reaches_the_llm() {
    for pages in [&["   "][..], &["ab"][..], &["", "\n\n"][..]] {
        let h = harness(pages, CannedLlm::reply(FORM_JSON));
        let env = h.extractor.extract(b"%PDF").await;
        assert!(!env.is_success());
        assert!(env.data().is_empty());
        assert_eq!(env.error(), Some("No text could be extracted from the PDF."));
        assert_eq!(h.llm.calls(), 0, "pages: {pages:?}");
    }
}

#[tokio::test]
async fn envelope_invariant_holds_across_outcomes() {
    let outcomes = [
        CannedLlm::reply(FORM_JSON),
        CannedLlm::reply("no json here"),
        CannedLlm::reply("```json\n{\"a\":1,}\n```"),
        CannedLlm::fail("permission denied"),
        CannedLlm::timeout(60),
    ];
    for llm in outcomes {
        let h = harness(&["Name: Jane Doe"], llm);
        let env = h.extractor.extract(b"%PDF").await;
        if env.is_success() {
            assert_eq!(env.error(), None);
        } else {
            assert!(env.data().is_empty());
            assert!(env.error().is_some_and(|e| !e.is_empty()));
        }
    }
}
