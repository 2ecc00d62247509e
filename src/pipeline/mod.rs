//! Pipeline stages for PDF form extraction.
//!
//! Each submodule implements exactly one transformation step, and the three
//! stages that talk to the outside world sit behind a trait so tests can
//! swap in the doubles from the `testing` module.
//!
//! ## Data Flow
//!
//! ```text
//! ingest ──▶ render ──▶ ocr ──▶ normalize ──▶ llm ──▶ parse
//! (tempfile) (pdfium)  (tesseract) (spaces)   (LLM)   (JSON)
//! ```
//!
//! 1. [`ingest`]   : check the `.pdf` filename and stage the bytes in a temp file
//! 2. [`render`]   : rasterise every page at a fixed DPI; runs in `spawn_blocking`
//!    because pdfium is not async-safe
//! 3. [`ocr`]      : recognise each page in order and join the text
//! 4. [`normalize`]: collapse whitespace and gate on minimum text length
//! 5. [`llm`]      : submit the prompt; the only stage with network I/O
//! 6. [`parse`]    : recover a JSON object from the model's reply

pub mod ingest;
pub mod llm;
pub mod normalize;
pub mod ocr;
pub mod parse;
pub mod render;
