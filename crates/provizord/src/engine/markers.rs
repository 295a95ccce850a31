//! Marker vocabulary of the engine console protocol.
//!
//! The engine communicates through free text only; these substrings are the
//! entire contract. Matching is substring-based, never full-line equality —
//! the console pads and indents inconsistently. Every marker lives here so
//! nothing in the monitor or parser carries its own literals.

use once_cell::sync::Lazy;
use regex::Regex;

/// Console command that resets the engine to a fresh consultation.
pub const RESET_COMMAND: &str = "(новый-пациент)";

/// Printed by the engine after the knowledge base loads successfully.
pub const LOAD_OK: &str = "TRUE";

/// The engine's top-level console prompt.
pub const CONSOLE_PROMPT: &str = "CLIPS>";

/// Menu prompt that sometimes stalls after the symptom terminator; answered
/// with one reactive blank line.
pub const CHOICE_PROMPT: &str = "Ваш выбор:";

/// Terminator line ending the symptom list.
pub const SYMPTOM_TERMINATOR: &str = "0";

/// Opens the recommendation block.
pub const BLOCK_START: &str = "РЕКОМЕНДАЦИИ ДЛЯ:";

/// Summary lines that close the recommendation block.
pub const SUMMARY_FOUND: &str = "Всего найдено рекомендаций:";
pub const SUMMARY_TOTAL: &str = "Всего пунктов в рекомендациях:";

/// Terminal marker of a completed run.
pub const END_OF_RUN: &str = "КОНЕЦ РАБОТЫ СИСТЕМЫ";

/// Bracket tag marking a numbered entry with no drug in the knowledge base.
pub const NOT_FOUND_TAG: &str = "[НЕ НАЙДЕНО ПРЕПАРАТА]";

/// Dashed separator between records inside the block.
pub const RECORD_SEPARATOR: &str = "---------------------";

// Labeled fields of a drug record.
pub const FIELD_FORM_LONG: &str = "Форма выпуска:";
pub const FIELD_FORM_SHORT: &str = "Форма:";
pub const FIELD_DOSAGE: &str = "Дозировка:";
pub const FIELD_PRICE: &str = "Цена:";
pub const FIELD_INDICATION: &str = "Показание:";
pub const FIELD_PREGNANCY_STATUS: &str = "Статус беременности:";
pub const FIELD_PREGNANCY_PERMISSION: &str = "Разрешён при беременности:";

// Labeled fields of a missing-drug record (indication is shared).
pub const FIELD_MISSING_STATUS: &str = "Статус:";
pub const FIELD_MISSING_REASON: &str = "Причина:";

/// Numbered record header: `<integer>. <text>`.
pub static RECORD_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\.\s+(.+)$").expect("record header pattern"));

/// Decimal price, tolerant of both `.` and `,` as fractional separator.
pub static PRICE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+[.,]\d+)").expect("price pattern"));

/// Text after the first colon of a labeled line, trimmed.
pub fn after_colon(line: &str) -> &str {
    line.splitn(2, ':').nth(1).map(str::trim).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_header_matches_numbered_lines() {
        let caps = RECORD_HEADER.captures("1. Парацетамол").unwrap();
        assert_eq!(&caps[1], "1");
        assert_eq!(&caps[2], "Парацетамол");
        assert!(RECORD_HEADER.captures("Цена: 85.50").is_none());
        assert!(RECORD_HEADER.captures("12.без пробела").is_none());
    }

    #[test]
    fn price_pattern_accepts_both_separators() {
        assert_eq!(&PRICE.captures("Цена: 85.50 руб").unwrap()[1], "85.50");
        assert_eq!(&PRICE.captures("Цена: 85,50 руб").unwrap()[1], "85,50");
    }

    #[test]
    fn after_colon_takes_the_rest_of_the_line() {
        assert_eq!(after_colon("Дозировка: 1-2 таблетки: после еды"), "1-2 таблетки: после еды");
        assert_eq!(after_colon("Форма:"), "");
        assert_eq!(after_colon("без двоеточия"), "");
    }
}
