//! Achievement catalog: definitions, condition kinds, and the built-in table.
//!
//! The catalog is static configuration data from the engine's point of view.
//! A remote pull may replace the shipped table wholesale (definitions are
//! immutable on the client), but the built-in entries keep the engine fully
//! functional offline and on first run.

use serde::{Deserialize, Serialize};

/// Display language for catalog text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
}

/// Bilingual display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub en: String,
    pub es: String,
}

impl LocalizedText {
    pub fn new(en: impl Into<String>, es: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            es: es.into(),
        }
    }

    /// Resolve for a display language.
    pub fn get(&self, lang: Language) -> &str {
        match lang {
            Language::En => &self.en,
            Language::Es => &self.es,
        }
    }
}

/// Achievement grouping shown in the list UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    Completion,
    Perfection,
    Speed,
    Dedication,
    Exploration,
    Special,
}

/// Rarity, ordered by prestige (`Common < Rare < Epic < Legendary`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

/// Subject areas a lesson can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonCategory {
    Letters,
    Numbers,
    Shapes,
    Colors,
    Animals,
    Music,
}

impl LessonCategory {
    /// Every subject area, as required by the all-categories condition.
    pub const ALL: [LessonCategory; 6] = [
        LessonCategory::Letters,
        LessonCategory::Numbers,
        LessonCategory::Shapes,
        LessonCategory::Colors,
        LessonCategory::Animals,
        LessonCategory::Music,
    ];
}

/// The rule used to compute progress toward an achievement.
///
/// A closed enum: condition kinds are a compile-time decision. Kinds newer
/// than this client deserialize into [`ConditionKind::Unknown`] and evaluate
/// as a no-op rather than failing the whole catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ConditionKind {
    FirstActivity,
    ActivitiesCount,
    StarsCount,
    PerfectRun,
    FastCompletion,
    ConsecutiveDays,
    HelpUsedCount,
    AllCategories,
    /// Unlocks when any single lesson's attempt count lands exactly on
    /// `attempts` (the shipped catalog uses 3: two failures, then success).
    #[serde(rename = "exact-n-attempts")]
    ExactAttempts { attempts: u32 },
    FullWeekPlay,
    MorningPlay,
    EveningPlay,
    WeekendPlay,
    #[serde(other)]
    Unknown,
}

/// An immutable achievement definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementDef {
    pub id: u32,
    pub category: AchievementCategory,
    pub rarity: Rarity,
    pub points: u32,
    pub condition: ConditionKind,
    /// Progress needed to unlock; always >= 1.
    pub target: u32,
    pub title: LocalizedText,
    pub description: LocalizedText,
    /// Shown in the unlock banner alongside title/description.
    pub encouragement: LocalizedText,
}

/// The built-in achievement table.
///
/// Catalog order here is display and notification order.
pub fn builtin_catalog() -> Vec<AchievementDef> {
    use AchievementCategory::*;
    use ConditionKind::*;
    use Rarity::*;

    vec![
        AchievementDef {
            id: 1,
            category: Completion,
            rarity: Common,
            points: 10,
            condition: FirstActivity,
            target: 1,
            title: LocalizedText::new("First Steps", "Primeros Pasos"),
            description: LocalizedText::new(
                "Complete your first lesson",
                "Completa tu primera lección",
            ),
            encouragement: LocalizedText::new(
                "Your adventure begins!",
                "¡Tu aventura comienza!",
            ),
        },
        AchievementDef {
            id: 2,
            category: Completion,
            rarity: Common,
            points: 25,
            condition: ActivitiesCount,
            target: 10,
            title: LocalizedText::new("Busy Bee", "Abeja Ocupada"),
            description: LocalizedText::new(
                "Complete 10 lessons",
                "Completa 10 lecciones",
            ),
            encouragement: LocalizedText::new(
                "You love to learn!",
                "¡Te encanta aprender!",
            ),
        },
        AchievementDef {
            id: 3,
            category: Completion,
            rarity: Rare,
            points: 50,
            condition: ActivitiesCount,
            target: 50,
            title: LocalizedText::new("Lesson Master", "Maestro de Lecciones"),
            description: LocalizedText::new(
                "Complete 50 lessons",
                "Completa 50 lecciones",
            ),
            encouragement: LocalizedText::new(
                "Nothing can stop you now!",
                "¡Nada puede detenerte ahora!",
            ),
        },
        AchievementDef {
            id: 4,
            category: Completion,
            rarity: Common,
            points: 20,
            condition: StarsCount,
            target: 10,
            title: LocalizedText::new("Star Collector", "Coleccionista de Estrellas"),
            description: LocalizedText::new(
                "Earn 10 stars",
                "Gana 10 estrellas",
            ),
            encouragement: LocalizedText::new(
                "The sky is full of stars for you!",
                "¡El cielo está lleno de estrellas para ti!",
            ),
        },
        AchievementDef {
            id: 5,
            category: Completion,
            rarity: Epic,
            points: 75,
            condition: StarsCount,
            target: 100,
            title: LocalizedText::new("Supernova", "Supernova"),
            description: LocalizedText::new(
                "Earn 100 stars",
                "Gana 100 estrellas",
            ),
            encouragement: LocalizedText::new(
                "You shine brighter than anyone!",
                "¡Brillas más que nadie!",
            ),
        },
        AchievementDef {
            id: 6,
            category: Perfection,
            rarity: Rare,
            points: 30,
            condition: PerfectRun,
            target: 1,
            title: LocalizedText::new("Flawless", "Impecable"),
            description: LocalizedText::new(
                "Finish a lesson without a single mistake",
                "Termina una lección sin un solo error",
            ),
            encouragement: LocalizedText::new(
                "Absolutely perfect!",
                "¡Absolutamente perfecto!",
            ),
        },
        AchievementDef {
            id: 7,
            category: Speed,
            rarity: Rare,
            points: 30,
            condition: FastCompletion,
            target: 1,
            title: LocalizedText::new("Quick Thinker", "Pensador Rápido"),
            description: LocalizedText::new(
                "Finish a lesson in under two minutes",
                "Termina una lección en menos de dos minutos",
            ),
            encouragement: LocalizedText::new(
                "Faster than lightning!",
                "¡Más rápido que un rayo!",
            ),
        },
        AchievementDef {
            id: 8,
            category: Dedication,
            rarity: Common,
            points: 20,
            condition: ConsecutiveDays,
            target: 3,
            title: LocalizedText::new("Getting Into It", "Tomando Ritmo"),
            description: LocalizedText::new(
                "Play 3 days in a row",
                "Juega 3 días seguidos",
            ),
            encouragement: LocalizedText::new(
                "Keep the streak alive!",
                "¡Mantén la racha viva!",
            ),
        },
        AchievementDef {
            id: 9,
            category: Dedication,
            rarity: Epic,
            points: 60,
            condition: ConsecutiveDays,
            target: 7,
            title: LocalizedText::new("Daily Devotion", "Devoción Diaria"),
            description: LocalizedText::new(
                "Play 7 days in a row",
                "Juega 7 días seguidos",
            ),
            encouragement: LocalizedText::new(
                "A whole week of learning!",
                "¡Toda una semana de aprendizaje!",
            ),
        },
        AchievementDef {
            id: 10,
            category: Special,
            rarity: Common,
            points: 15,
            condition: HelpUsedCount,
            target: 5,
            title: LocalizedText::new("Curious Mind", "Mente Curiosa"),
            description: LocalizedText::new(
                "Ask for help 5 times",
                "Pide ayuda 5 veces",
            ),
            encouragement: LocalizedText::new(
                "Asking questions makes you smarter!",
                "¡Hacer preguntas te hace más inteligente!",
            ),
        },
        AchievementDef {
            id: 11,
            category: Exploration,
            rarity: Epic,
            points: 80,
            condition: AllCategories,
            target: 1,
            title: LocalizedText::new("World Explorer", "Explorador del Mundo"),
            description: LocalizedText::new(
                "Try a lesson from every subject",
                "Prueba una lección de cada tema",
            ),
            encouragement: LocalizedText::new(
                "You've seen it all!",
                "¡Lo has visto todo!",
            ),
        },
        AchievementDef {
            id: 12,
            category: Special,
            rarity: Rare,
            points: 40,
            condition: ExactAttempts { attempts: 3 },
            target: 1,
            title: LocalizedText::new("Never Give Up", "Nunca Te Rindas"),
            description: LocalizedText::new(
                "Succeed on your third try",
                "Triunfa en tu tercer intento",
            ),
            encouragement: LocalizedText::new(
                "Persistence pays off!",
                "¡La persistencia da frutos!",
            ),
        },
        AchievementDef {
            id: 13,
            category: Dedication,
            rarity: Legendary,
            points: 100,
            condition: FullWeekPlay,
            target: 7,
            title: LocalizedText::new("Seven Wonders", "Siete Maravillas"),
            description: LocalizedText::new(
                "Play every day of a full week",
                "Juega cada día de una semana completa",
            ),
            encouragement: LocalizedText::new(
                "A true champion of learning!",
                "¡Un verdadero campeón del aprendizaje!",
            ),
        },
        AchievementDef {
            id: 14,
            category: Special,
            rarity: Common,
            points: 15,
            condition: MorningPlay,
            target: 1,
            title: LocalizedText::new("Early Bird", "Madrugador"),
            description: LocalizedText::new(
                "Play in the morning",
                "Juega por la mañana",
            ),
            encouragement: LocalizedText::new(
                "The early bird learns the most!",
                "¡El que madruga aprende más!",
            ),
        },
        AchievementDef {
            id: 15,
            category: Special,
            rarity: Common,
            points: 15,
            condition: EveningPlay,
            target: 1,
            title: LocalizedText::new("Night Owl", "Búho Nocturno"),
            description: LocalizedText::new(
                "Play in the evening",
                "Juega por la noche",
            ),
            encouragement: LocalizedText::new(
                "Learning under the stars!",
                "¡Aprendiendo bajo las estrellas!",
            ),
        },
        AchievementDef {
            id: 16,
            category: Special,
            rarity: Common,
            points: 15,
            condition: WeekendPlay,
            target: 1,
            title: LocalizedText::new("Weekend Warrior", "Guerrero de Fin de Semana"),
            description: LocalizedText::new(
                "Play on a weekend",
                "Juega en fin de semana",
            ),
            encouragement: LocalizedText::new(
                "Weekends are for winners!",
                "¡Los fines de semana son para ganadores!",
            ),
        },
        AchievementDef {
            id: 17,
            category: Dedication,
            rarity: Legendary,
            points: 90,
            condition: HelpUsedCount,
            target: 25,
            title: LocalizedText::new("Question Champion", "Campeón de Preguntas"),
            description: LocalizedText::new(
                "Ask for help 25 times",
                "Pide ayuda 25 veces",
            ),
            encouragement: LocalizedText::new(
                "Every question is a step forward!",
                "¡Cada pregunta es un paso adelante!",
            ),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_ids_unique() {
        let catalog = builtin_catalog();
        let ids: HashSet<u32> = catalog.iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn test_catalog_targets_at_least_one() {
        for def in builtin_catalog() {
            assert!(def.target >= 1, "achievement {} has target 0", def.id);
        }
    }

    #[test]
    fn test_catalog_text_present_in_both_languages() {
        for def in builtin_catalog() {
            for text in [&def.title, &def.description, &def.encouragement] {
                assert!(!text.en.is_empty(), "achievement {} missing en text", def.id);
                assert!(!text.es.is_empty(), "achievement {} missing es text", def.id);
            }
        }
    }

    #[test]
    fn test_catalog_covers_every_condition_kind() {
        let catalog = builtin_catalog();
        let has = |pred: fn(&ConditionKind) -> bool| catalog.iter().any(|a| pred(&a.condition));

        assert!(has(|c| matches!(c, ConditionKind::FirstActivity)));
        assert!(has(|c| matches!(c, ConditionKind::ActivitiesCount)));
        assert!(has(|c| matches!(c, ConditionKind::StarsCount)));
        assert!(has(|c| matches!(c, ConditionKind::PerfectRun)));
        assert!(has(|c| matches!(c, ConditionKind::FastCompletion)));
        assert!(has(|c| matches!(c, ConditionKind::ConsecutiveDays)));
        assert!(has(|c| matches!(c, ConditionKind::HelpUsedCount)));
        assert!(has(|c| matches!(c, ConditionKind::AllCategories)));
        assert!(has(|c| matches!(c, ConditionKind::ExactAttempts { .. })));
        assert!(has(|c| matches!(c, ConditionKind::FullWeekPlay)));
        assert!(has(|c| matches!(c, ConditionKind::MorningPlay)));
        assert!(has(|c| matches!(c, ConditionKind::EveningPlay)));
        assert!(has(|c| matches!(c, ConditionKind::WeekendPlay)));
    }

    #[test]
    fn test_condition_kind_kebab_case_round_trip() {
        let kind = ConditionKind::ExactAttempts { attempts: 3 };
        let json = serde_json::to_string(&kind).unwrap();
        assert!(json.contains("exact-n-attempts"));
        let back: ConditionKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kind);
    }

    #[test]
    fn test_unknown_condition_kind_tolerated() {
        let json = r#"{"kind":"moon-landing"}"#;
        let kind: ConditionKind = serde_json::from_str(json).unwrap();
        assert_eq!(kind, ConditionKind::Unknown);
    }

    #[test]
    fn test_rarity_ordered_by_prestige() {
        assert!(Rarity::Common < Rarity::Rare);
        assert!(Rarity::Rare < Rarity::Epic);
        assert!(Rarity::Epic < Rarity::Legendary);
    }

    #[test]
    fn test_localized_text_resolution() {
        let text = LocalizedText::new("Hello", "Hola");
        assert_eq!(text.get(Language::En), "Hello");
        assert_eq!(text.get(Language::Es), "Hola");
    }
}
