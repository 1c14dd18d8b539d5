//! # Receipt Field Heuristics
//!
//! Best-effort extraction of amount, date, and merchant from raw
//! receipt text. Every heuristic degrades to `None` — a receipt the
//! heuristics cannot read still produces a usable draft document.
//!
//! The amount rule is deliberately simple: the largest monetary-looking
//! number on the receipt, with date components excluded so a year never
//! outbids the total.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use khata_core::quantize;

/// Everything the heuristics managed to pull out of one receipt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiptFields {
    /// Largest monetary number found, two decimal places.
    pub amount: Option<Decimal>,
    /// First plausible calendar date found.
    pub date: Option<NaiveDate>,
    /// First line that reads like a merchant name.
    pub merchant: Option<String>,
}

/// Run all three heuristics over one blob of receipt text.
pub fn extract_receipt(text: &str) -> ReceiptFields {
    ReceiptFields {
        amount: extract_amount(text),
        date: extract_date(text),
        merchant: extract_merchant(text),
    }
}

// ── Tokenization ─────────────────────────────────────────────────────

/// A numeric token: optional sign, digits, optional single `.`/`,`
/// separator with trailing digits.
#[derive(Debug, Clone)]
struct NumToken {
    start: usize,
    end: usize,
    text: String,
}

fn scan_numbers(text: &str) -> Vec<NumToken> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let mut start = i;
        if start > 0 && (bytes[start - 1] == b'-' || bytes[start - 1] == b'+') {
            // A sign glued to the digits belongs to the token unless it
            // follows another digit (ranges like "10-20").
            if start < 2 || !bytes[start - 2].is_ascii_digit() {
                start -= 1;
            }
        }
        let mut end = i;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        // One separator, then more digits.
        if end + 1 < bytes.len()
            && (bytes[end] == b'.' || bytes[end] == b',')
            && bytes[end + 1].is_ascii_digit()
        {
            end += 1;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
        }
        tokens.push(NumToken {
            start,
            end,
            text: text[start..end].to_owned(),
        });
        i = end;
    }
    tokens
}

/// A date-shaped span: three digit runs joined by `-` or `/`.
#[derive(Debug, Clone, Copy)]
struct DateSpan {
    start: usize,
    end: usize,
    parts: [u32; 3],
    /// Four-digit leading component, i.e. `YYYY-MM-DD` shape.
    leading_year: bool,
}

fn scan_date_spans(text: &str) -> Vec<DateSpan> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        match date_span_at(bytes, i) {
            Some(span) => {
                spans.push(span);
                i = span.end;
            }
            None => {
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
            }
        }
    }
    spans
}

fn date_span_at(bytes: &[u8], start: usize) -> Option<DateSpan> {
    let mut i = start;
    let mut parts = [0u32; 3];
    let mut lens = [0usize; 3];
    for slot in 0..3 {
        let run_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        let len = i - run_start;
        if len == 0 || len > 4 {
            return None;
        }
        let mut value = 0u32;
        for &b in &bytes[run_start..i] {
            value = value * 10 + u32::from(b - b'0');
        }
        parts[slot] = value;
        lens[slot] = len;
        if slot < 2 {
            if i >= bytes.len() || (bytes[i] != b'-' && bytes[i] != b'/') {
                return None;
            }
            i += 1;
        }
    }
    let leading_year = lens[0] == 4;
    // DD-MM-YY / MM-DD-YYYY shape needs 1-2 digit day and month runs.
    if !leading_year && (lens[0] > 2 || lens[1] > 2) {
        return None;
    }
    if leading_year && (lens[1] > 2 || lens[2] > 2) {
        return None;
    }
    Some(DateSpan {
        start,
        end: i,
        parts,
        leading_year,
    })
}

// ── Amount ───────────────────────────────────────────────────────────

/// Largest monetary-looking number in the text, rounded half-up to two
/// decimal places. Numbers inside date-shaped spans are not candidates.
pub fn extract_amount(text: &str) -> Option<Decimal> {
    let date_spans = scan_date_spans(text);
    let mut best: Option<Decimal> = None;
    for token in scan_numbers(text) {
        if date_spans
            .iter()
            .any(|span| token.start < span.end && span.start < token.end)
        {
            continue;
        }
        // Commas are treated as thousands separators and dropped.
        let normalized = token.text.replace(',', "");
        let Ok(value) = Decimal::from_str(&normalized) else {
            continue;
        };
        if best.map_or(true, |current| value > current) {
            best = Some(value);
        }
    }
    best.map(quantize)
}

// ── Date ─────────────────────────────────────────────────────────────

/// First plausible date in the text.
///
/// `YYYY-MM-DD` / `YYYY/MM/DD` spans win over ambiguous `A-B-C` spans.
/// In the ambiguous form, a first component over 12 forces day-first,
/// otherwise month-first; two-digit years land in the 2000s. Spans that
/// build an impossible date are skipped.
pub fn extract_date(text: &str) -> Option<NaiveDate> {
    let spans = scan_date_spans(text);
    for span in spans.iter().filter(|s| s.leading_year) {
        let [year, month, day] = span.parts;
        if let Some(date) = NaiveDate::from_ymd_opt(year as i32, month, day) {
            return Some(date);
        }
    }
    for span in spans.iter().filter(|s| !s.leading_year) {
        let [first, second, mut year] = span.parts;
        let (day, month) = if first > 12 {
            (first, second)
        } else {
            (second, first)
        };
        if year < 100 {
            year += 2000;
        }
        if let Some(date) = NaiveDate::from_ymd_opt(year as i32, month, day) {
            return Some(date);
        }
    }
    None
}

// ── Merchant ─────────────────────────────────────────────────────────

/// First non-empty line that does not read like a date or an amount and
/// carries at least three alphabetic characters. Truncated to 255.
pub fn extract_merchant(text: &str) -> Option<String> {
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if !scan_date_spans(line).is_empty() {
            continue;
        }
        if looks_like_amount(line) {
            continue;
        }
        if line.chars().filter(|c| c.is_ascii_alphabetic()).count() < 3 {
            continue;
        }
        return Some(line.chars().take(255).collect());
    }
    None
}

/// Digits, a `.`/`,` separator, then at least two more digits.
fn looks_like_amount(line: &str) -> bool {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i < bytes.len()
            && (bytes[i] == b'.' || bytes[i] == b',')
            && bytes.get(i + 1).is_some_and(u8::is_ascii_digit)
            && bytes.get(i + 2).is_some_and(u8::is_ascii_digit)
        {
            return true;
        }
    }
    false
}
