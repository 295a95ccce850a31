//! Response parser - turns a session transcript into structured records.
//!
//! One forward pass over the transcript lines. Inside the recommendation
//! block, numbered headers open records, labeled lines fill them in and
//! dashed separators (or block end, or end of input) finalize them. The
//! salvage path after a timeout runs this exact routine on whatever
//! transcript exists.

use crate::engine::markers;
use provizor_common::{
    ConsultationResult, DrugRecommendation, EngineError, MissingRecommendation,
    PregnancyPermission,
};
use tracing::debug;

/// Parse one session transcript. A transcript with no recognizable records
/// is a hard failure, never an empty result.
pub fn parse_transcript(transcript: &str) -> Result<ConsultationResult, EngineError> {
    let mut scanner = Scanner::default();
    for line in transcript.lines() {
        scanner.feed(line.trim());
    }
    scanner.finish()
}

#[derive(Default)]
struct Scanner {
    in_block: bool,
    current_drug: Option<DrugRecommendation>,
    current_missing: Option<MissingRecommendation>,
    recommendations: Vec<DrugRecommendation>,
    missing: Vec<MissingRecommendation>,
}

impl Scanner {
    fn feed(&mut self, line: &str) {
        if line.contains(markers::BLOCK_START) {
            self.in_block = true;
            return;
        }

        if line.contains(markers::SUMMARY_FOUND)
            || line.contains(markers::SUMMARY_TOTAL)
            || line.contains(markers::END_OF_RUN)
        {
            self.in_block = false;
            self.finalize_current();
            return;
        }

        if !self.in_block {
            return;
        }

        if let Some(caps) = markers::RECORD_HEADER.captures(line) {
            self.finalize_current();
            let title = caps[2].trim();
            if title.contains(markers::NOT_FOUND_TAG) {
                debug!("Transcript entry without a drug match");
                self.current_missing = Some(MissingRecommendation::default());
            } else {
                debug!("Transcript entry for drug: {}", title);
                self.current_drug = Some(DrugRecommendation::new(title.to_string()));
            }
            return;
        }

        if let Some(drug) = self.current_drug.as_mut() {
            if line.contains(markers::FIELD_FORM_LONG) || line.contains(markers::FIELD_FORM_SHORT)
            {
                drug.form = markers::after_colon(line).to_string();
            } else if line.contains(markers::FIELD_DOSAGE) {
                drug.dosage = markers::after_colon(line).to_string();
            } else if line.contains(markers::FIELD_PRICE) {
                if let Some(caps) = markers::PRICE.captures(line) {
                    if let Ok(price) = caps[1].replace(',', ".").parse::<f64>() {
                        drug.price = price;
                    }
                }
            } else if line.contains(markers::FIELD_INDICATION) {
                drug.rationale = markers::after_colon(line).to_string();
            } else if line.contains(markers::FIELD_PREGNANCY_STATUS) {
                drug.pregnancy_relevant = line.contains("да");
            } else if line.contains(markers::FIELD_PREGNANCY_PERMISSION) {
                drug.pregnancy_permission = parse_permission(line);
            }
        }

        if let Some(missing) = self.current_missing.as_mut() {
            if line.contains(markers::FIELD_INDICATION) {
                missing.indication = markers::after_colon(line).to_string();
            } else if line.contains(markers::FIELD_MISSING_STATUS) {
                let status = markers::after_colon(line);
                if !status.is_empty() {
                    missing.status = status.to_string();
                }
            } else if line.contains(markers::FIELD_MISSING_REASON) {
                let reason = markers::after_colon(line);
                if !reason.is_empty() {
                    missing.reason = reason.to_string();
                }
            }
        }

        if line.contains(markers::RECORD_SEPARATOR) {
            self.finalize_current();
        }
    }

    fn finalize_current(&mut self) {
        if let Some(drug) = self.current_drug.take() {
            self.recommendations.push(drug);
        }
        if let Some(missing) = self.current_missing.take() {
            self.missing.push(missing);
        }
    }

    fn finish(mut self) -> Result<ConsultationResult, EngineError> {
        self.finalize_current();
        if self.recommendations.is_empty() && self.missing.is_empty() {
            return Err(EngineError::Parse("no structured records found".to_string()));
        }
        debug!(
            "Parsed {} recommendations, {} without a drug",
            self.recommendations.len(),
            self.missing.len()
        );
        Ok(ConsultationResult::from_records(self.recommendations, self.missing))
    }
}

fn parse_permission(line: &str) -> PregnancyPermission {
    if line.contains("триместр") {
        PregnancyPermission::ForbiddenInTrimester
    } else if line.contains("Да") {
        PregnancyPermission::Permitted
    } else if line.contains("Нет") {
        PregnancyPermission::Forbidden
    } else {
        PregnancyPermission::RequiresConsultation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RUN: &str = r#"
Ваш выбор: 0

========================================
РЕКОМЕНДАЦИИ ДЛЯ: Иванов
========================================
1. Парацетамол
   Форма выпуска: таблетки
   Дозировка: 500 мг 3 раза в день
   Цена: 85.50 руб
   Показание: боль
   Статус беременности: нет
   Разрешён при беременности: Да
---------------------
2. [НЕ НАЙДЕНО ПРЕПАРАТА]
   Показание: пищеварение
   Статус: требуется консультация врача
   Причина: нет подходящих препаратов в базе данных
---------------------
Всего найдено рекомендаций: 1
КОНЕЦ РАБОТЫ СИСТЕМЫ
"#;

    #[test]
    fn full_run_yields_records_in_source_order() {
        let result = parse_transcript(FULL_RUN).unwrap();
        assert_eq!(result.recommendations.len(), 1);
        assert_eq!(result.missing_recommendations.len(), 1);
        assert_eq!(result.summary.total_symptoms, 2);

        let drug = &result.recommendations[0];
        assert_eq!(drug.name, "Парацетамол");
        assert_eq!(drug.form, "таблетки");
        assert_eq!(drug.dosage, "500 мг 3 раза в день");
        assert_eq!(drug.price, 85.5);
        assert_eq!(drug.priority, 8.0);
        assert_eq!(drug.rationale, "боль");
        assert_eq!(drug.pregnancy_permission, PregnancyPermission::Permitted);

        let missing = &result.missing_recommendations[0];
        assert_eq!(missing.indication, "пищеварение");
        assert_eq!(missing.status, "требуется консультация врача");
        assert_eq!(missing.reason, "нет подходящих препаратов в базе данных");
    }

    #[test]
    fn price_accepts_comma_as_fractional_separator() {
        let transcript = "РЕКОМЕНДАЦИИ ДЛЯ: Тест\n1. Анальгин\nЦена: 85,50\nКОНЕЦ РАБОТЫ СИСТЕМЫ";
        let result = parse_transcript(transcript).unwrap();
        assert_eq!(result.recommendations[0].price, 85.5);
    }

    #[test]
    fn record_finalized_by_end_of_run_without_summary_line() {
        let transcript = "РЕКОМЕНДАЦИИ ДЛЯ: Тест\n1. Ибупрофен\nФорма: капсулы\nКОНЕЦ РАБОТЫ СИСТЕМЫ";
        let result = parse_transcript(transcript).unwrap();
        assert_eq!(result.recommendations.len(), 1);
        assert_eq!(result.recommendations[0].form, "капсулы");
    }

    #[test]
    fn record_finalized_at_end_of_input() {
        // Salvaged transcripts can stop mid-block with no terminal marker.
        let transcript = "РЕКОМЕНДАЦИИ ДЛЯ: Тест\n1. Ибупрофен\nЦена: 120.00";
        let result = parse_transcript(transcript).unwrap();
        assert_eq!(result.recommendations.len(), 1);
        assert_eq!(result.recommendations[0].price, 120.0);
    }

    #[test]
    fn multiple_records_keep_source_order() {
        let transcript = "\
РЕКОМЕНДАЦИИ ДЛЯ: Тест
1. Парацетамол
Цена: 85.50
---------------------
2. [НЕ НАЙДЕНО ПРЕПАРАТА]
Показание: аллергия
---------------------
3. Смекта
Форма выпуска: порошок
---------------------
Всего пунктов в рекомендациях: 3
КОНЕЦ РАБОТЫ СИСТЕМЫ";
        let result = parse_transcript(transcript).unwrap();
        let names: Vec<&str> = result.recommendations.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Парацетамол", "Смекта"]);
        assert_eq!(result.missing_recommendations[0].indication, "аллергия");
        assert_eq!(result.summary.total_found, 2);
        assert_eq!(result.summary.total_missing, 1);
    }

    #[test]
    fn missing_record_keeps_defaults_when_fields_absent() {
        let transcript = "РЕКОМЕНДАЦИИ ДЛЯ: Тест\n2. [НЕ НАЙДЕНО ПРЕПАРАТА]\nПоказание: боль\n---------------------\nКОНЕЦ РАБОТЫ СИСТЕМЫ";
        let result = parse_transcript(transcript).unwrap();
        let missing = &result.missing_recommendations[0];
        assert_eq!(missing.indication, "боль");
        assert_eq!(missing.status, "требуется консультация врача");
        assert_eq!(missing.reason, "нет подходящих препаратов в базе данных");
    }

    #[test]
    fn pregnancy_fields_are_recognized() {
        let transcript = "\
РЕКОМЕНДАЦИИ ДЛЯ: Тест
1. Но-шпа
Статус беременности: да
Разрешён при беременности: Нет
---------------------
2. Магнезия
Разрешён при беременности: Нет (3 триместр)
КОНЕЦ РАБОТЫ СИСТЕМЫ";
        let result = parse_transcript(transcript).unwrap();
        assert!(result.recommendations[0].pregnancy_relevant);
        assert_eq!(
            result.recommendations[0].pregnancy_permission,
            PregnancyPermission::Forbidden
        );
        assert_eq!(
            result.recommendations[1].pregnancy_permission,
            PregnancyPermission::ForbiddenInTrimester
        );
    }

    #[test]
    fn numbered_lines_outside_the_block_are_ignored() {
        let transcript = "1. Парацетамол\nЦена: 85.50\nКОНЕЦ РАБОТЫ СИСТЕМЫ";
        assert!(matches!(
            parse_transcript(transcript),
            Err(EngineError::Parse(_))
        ));
    }

    #[test]
    fn block_with_zero_records_is_a_parse_error() {
        let transcript = "РЕКОМЕНДАЦИИ ДЛЯ: Тест\nВсего найдено рекомендаций: 0\nКОНЕЦ РАБОТЫ СИСТЕМЫ";
        assert!(matches!(
            parse_transcript(transcript),
            Err(EngineError::Parse(_))
        ));
    }

    #[test]
    fn empty_transcript_is_a_parse_error() {
        assert!(matches!(parse_transcript(""), Err(EngineError::Parse(_))));
    }
}
