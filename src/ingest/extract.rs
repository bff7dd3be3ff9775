// src/ingest/extract.rs
//! Tolerant field extraction from dashboard pages.
//!
//! Each field is one row in `FIELD_RULES`: a case-insensitive label pattern
//! followed by the nearest numeric token. Rules run independently; a miss
//! only drops that field.

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::ExtractedFields;

pub const BTC_PRICE: &str = "btc_price";
pub const ETH_PRICE: &str = "eth_price";
pub const RISK_SCORE: &str = "risk_score";
pub const DXY: &str = "dxy";
pub const FEAR_GREED: &str = "fear_greed";
pub const COMPOSITE_RISK: &str = "composite_risk";

/// Price-like token: thousands separators allowed.
const PRICE: &str = r"(\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)";
const NUMBER: &str = r"(\d+(?:\.\d+)?)";

struct FieldRule {
    field: &'static str,
    label: &'static str,
    token: &'static str,
}

const FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        field: BTC_PRICE,
        label: r"\b(?:BTC|Bitcoin)\b",
        token: PRICE,
    },
    FieldRule {
        field: ETH_PRICE,
        label: r"\b(?:ETH|Ethereum)\b",
        token: PRICE,
    },
    FieldRule {
        field: RISK_SCORE,
        label: r"\bRisk\s+Score\b",
        token: NUMBER,
    },
    FieldRule {
        field: DXY,
        label: r"\bDXY\b",
        token: NUMBER,
    },
    FieldRule {
        field: FEAR_GREED,
        label: r"\bFear\b",
        token: NUMBER,
    },
    FieldRule {
        field: COMPOSITE_RISK,
        label: r"\bComposite\s+Risk\b",
        token: NUMBER,
    },
];

static COMPILED: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    FIELD_RULES
        .iter()
        .filter_map(|r| {
            // `.*?` stays on one line: a label and its value share a line once tags are gone.
            let pattern = format!(r"(?i){}[^\d\n]*?\$?\s*{}", r.label, r.token);
            match Regex::new(&pattern) {
                Ok(re) => Some((r.field, re)),
                Err(e) => {
                    tracing::error!(field = r.field, error = %e, "invalid field pattern");
                    None
                }
            }
        })
        .collect()
});

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<[^>]*>").expect("tag regex"));
static RE_INLINE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\r\f\v]+").expect("ws regex"));

/// Decode entities and replace markup with spaces, keeping line structure.
pub fn normalize_document(s: &str) -> String {
    let without_tags = RE_TAGS.replace_all(s, " ");
    let decoded = html_escape::decode_html_entities(&without_tags);
    RE_INLINE_WS.replace_all(&decoded, " ").into_owned()
}

/// Extract every field the document yields. Never fails.
pub fn extract(document: &str) -> ExtractedFields {
    let text = normalize_document(document);
    let mut out = ExtractedFields::new();
    for (field, re) in COMPILED.iter() {
        if let Some(value) = re.captures(&text).and_then(|c| c.get(1)) {
            out.insert(field, value.as_str().to_string());
        }
    }
    out
}

pub fn field_names() -> impl Iterator<Item = &'static str> {
    FIELD_RULES.iter().map(|r| r.field)
}
