//! Extraction prompt for turning OCR text into structured JSON.
//!
//! Operators can replace the template via
//! [`crate::config::ServiceConfig::extraction_prompt`]; the constant here is
//! used only when no override is provided.

/// Default instruction template sent ahead of the extracted text.
pub const DEFAULT_EXTRACTION_PROMPT: &str = r#"You are a PDF form data extraction assistant. Analyze the provided text from a scanned form and extract all relevant fields and their values into a structured JSON object with the actual data values.

Rules:
1. Extract all field labels and their corresponding values from the form
2. Group related fields into nested objects (e.g., "applicantDetails", "contactInfo", "serviceRequest")
3. Use descriptive field names in camelCase
4. For checkboxes/radio buttons, use boolean values (true/false) or the selected option as a string
5. Extract dates as strings in the format found in the document
6. Extract numbers as numbers (not strings) when they represent quantities, amounts, etc.
7. Return ONLY the actual data values extracted from the form, NOT a JSON Schema
8. Create a hierarchical structure that reflects the form's organization
9. Do not hallucinate data - only extract what is clearly present in the text
10. If a field is empty or unclear, you can omit it or set it to null

Example format for extracted data (NOT a schema):
{
  "formType": "Library Card Application",
  "applicantDetails": {
    "fullName": "Alex Example",
    "dateOfBirth": "1985-06-12",
    "nationalId": "123456789"
  },
  "contactInfo": {
    "phoneNumber": "+1234567890",
    "email": "alex@example.com",
    "address": "123 Main Street"
  },
  "serviceRequest": {
    "requestPhysicalCard": true,
    "requestEmailAlerts": false,
    "requestSMS": true
  }
}

Now extract the actual field values from this text:
"#;

/// Return the first `max_chars` characters of `text`.
///
/// Counts Unicode scalar values, so a multi-byte character is never split.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Assemble the full prompt: template, blank line, then the (truncated) text.
///
/// Truncation is silent; the model is not told that content was cut.
pub fn build_prompt(text: &str, template: Option<&str>, max_chars: usize) -> String {
    let template = template.unwrap_or(DEFAULT_EXTRACTION_PROMPT);
    format!("{}\n\n{}", template, truncate_chars(text, max_chars))
}
