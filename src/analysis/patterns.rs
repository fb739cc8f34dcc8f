//! Weighted text indicators and canned explanation strings.
//!
//! One [`LanguagePack`] exists per [`Language`]. Packs are compiled once on
//! first use and shared for the lifetime of the process.

use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;

use super::{Category, Language};

/// A case-insensitive matcher with a signed weight and an explanation.
#[derive(Debug)]
pub struct Indicator {
    matcher: Regex,
    weight: i32,
    explanation: &'static str,
}

impl Indicator {
    fn new(pattern: &str, weight: i32, explanation: &'static str) -> Self {
        Self {
            matcher: compile(pattern),
            weight,
            explanation,
        }
    }

    /// Whether the indicator fires on the text
    pub fn matches(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }

    /// Signed weight added to the score the indicator feeds
    pub fn weight(&self) -> i32 {
        self.weight
    }

    /// Human-readable reason reported when the indicator fires
    pub fn explanation(&self) -> &'static str {
        self.explanation
    }
}

/// Explanations used when fusing decomposed provider signals.
#[derive(Debug)]
pub struct FusionText {
    pub high_factuality: &'static str,
    pub low_bias: &'static str,
    pub high_bias: &'static str,
    pub strong_emotion: &'static str,
    pub low_factuality: &'static str,
}

/// Everything the scorers need for one language.
#[derive(Debug)]
pub struct LanguagePack {
    /// Raise reliability and produce positive points.
    pub reliability: Vec<Indicator>,
    /// Raise bias and produce warning points.
    pub warnings: Vec<Indicator>,
    /// Shift sentiment; explanations are not reported.
    pub emotional: Vec<Indicator>,
    /// Suppresses the neutral filler point when present.
    pub alarming: Regex,
    pub neutral_filler: &'static str,
    pub warning_filler: &'static str,
    pub fusion: FusionText,
    reliable_advice: &'static [&'static str],
    questionable_advice: &'static [&'static str],
    misinformation_advice: &'static [&'static str],
}

impl LanguagePack {
    /// Canned recommendations for a category
    pub fn recommendations(&self, category: Category) -> Vec<String> {
        let advice = match category {
            Category::Reliable => self.reliable_advice,
            Category::Questionable => self.questionable_advice,
            Category::Misinformation => self.misinformation_advice,
        };
        advice.iter().map(|s| s.to_string()).collect()
    }

    /// Explanations of every warning indicator that fires on the text, in
    /// library order.
    pub fn warning_hits<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a Indicator> + 'a {
        self.warnings.iter().filter(move |i| i.matches(text))
    }
}

/// Get the pack for a language
pub fn pack(language: Language) -> &'static LanguagePack {
    static EN: OnceLock<LanguagePack> = OnceLock::new();
    static RU: OnceLock<LanguagePack> = OnceLock::new();

    match language {
        Language::En => EN.get_or_init(english),
        Language::Ru => RU.get_or_init(russian),
    }
}

fn compile(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("indicator patterns are static and valid")
}

fn english() -> LanguagePack {
    LanguagePack {
        reliability: vec![
            Indicator::new(
                r"study|research|university|academic|peer.reviewed",
                20,
                "Academic or research-based content",
            ),
            Indicator::new(
                r"according to|based on|data shows|statistics",
                15,
                "References data or sources",
            ),
            Indicator::new(
                r"published|journal|report|findings",
                10,
                "Published or documented information",
            ),
            Indicator::new(
                r"\bdr\.|\b(?:professor|researcher|scientist)s?\b",
                10,
                "Expert attribution",
            ),
        ],
        warnings: vec![
            Indicator::new(
                r"hiding|concealing|don.t want you to know|secret|cover.?up",
                25,
                "Conspiracy-style language",
            ),
            Indicator::new(
                r"all (?:doctors|scientists|experts)|everyone knows|nobody talks about",
                20,
                "Unsupported generalizations",
            ),
            Indicator::new(
                r"miracle|100% effective|instant cure|natural cure|guaranteed|cures? (?:everything|all)",
                30,
                "Exaggerated health claims",
            ),
            Indicator::new(
                r"big pharma|mainstream media|they don.t want|wake up",
                25,
                "Anti-establishment rhetoric",
            ),
            Indicator::new(
                r"shocking|urgent|breaking|must read",
                15,
                "Sensationalist language",
            ),
            Indicator::new(
                r"\b(?:only|always|never|completely|totally|everything)\b",
                10,
                "Absolute statements",
            ),
        ],
        emotional: vec![
            Indicator::new(r"amazing|incredible|fantastic|wonderful", 30, "Enthusiastic tone"),
            Indicator::new(r"terrible|horrible|disaster|dangerous", -30, "Alarmed tone"),
            Indicator::new(r"urgent|crisis|emergency|warning", -20, "Urgent tone"),
            Indicator::new(r"revolutionary|breakthrough|groundbreaking", 25, "Hyped tone"),
        ],
        alarming: compile(r"\b(?:amazing|incredible|shocking|secret|hidden)\b"),
        neutral_filler: "Language appears relatively neutral",
        warning_filler: "Some bias indicators present",
        fusion: FusionText {
            high_factuality: "High factual content indicators",
            low_bias: "Balanced, low-bias language",
            high_bias: "Significant bias detected",
            strong_emotion: "Strong emotional tone may affect objectivity",
            low_factuality: "Low factual grounding",
        },
        reliable_advice: &[
            "Cross-reference with additional sources for completeness",
            "Verify publication date and relevance",
        ],
        questionable_advice: &[
            "Seek multiple independent sources",
            "Consider the source's credibility",
            "Look for expert opinions",
        ],
        misinformation_advice: &[
            "Avoid sharing this content",
            "Verify claims with authoritative sources",
            "Be aware of potential misinformation",
        ],
    }
}

fn russian() -> LanguagePack {
    LanguagePack {
        reliability: vec![
            Indicator::new(
                r"исследовани|университет|академи|научн|рецензируем",
                20,
                "Материал основан на научных или академических данных",
            ),
            Indicator::new(
                r"согласно|по данным|данные показывают|статистик",
                15,
                "Есть ссылки на данные или источники",
            ),
            Indicator::new(
                r"опубликован|журнал|доклад|отч[её]т|результаты",
                10,
                "Опубликованная или задокументированная информация",
            ),
            Indicator::new(
                r"\bд-р\b|профессор|исследовател|уч[её]н(?:ый|ые|ых)",
                10,
                "Ссылка на мнение экспертов",
            ),
        ],
        warnings: vec![
            Indicator::new(
                r"скрыва|утаива|не хотят, чтобы вы знали|тайн|секрет",
                25,
                "Конспирологическая риторика",
            ),
            Indicator::new(
                r"все (?:врачи|уч[её]ные|эксперты)|всем известно|никто не говорит",
                20,
                "Необоснованные обобщения",
            ),
            Indicator::new(
                r"чудо|100% эффективн|мгновенн\w* исцелени|гарантирован|натуральн\w* (?:средство|лекарство)|леч\w* вс[её]",
                30,
                "Преувеличенные заявления о здоровье",
            ),
            Indicator::new(
                r"большая фарма|фармацевтическ\w* мафи|официальные сми|проснитесь",
                25,
                "Антиистеблишментская риторика",
            ),
            Indicator::new(
                r"шок|срочно|сенсаци|обязательно прочитайте",
                15,
                "Сенсационный язык",
            ),
            Indicator::new(
                r"\b(?:только|всегда|никогда|полностью|абсолютно)\b",
                10,
                "Категоричные утверждения",
            ),
        ],
        emotional: vec![
            Indicator::new(r"потрясающ|невероятн|фантастическ|замечательн", 30, "Восторженный тон"),
            Indicator::new(r"ужасн|кошмар|катастроф|опасн", -30, "Тревожный тон"),
            Indicator::new(r"срочн|кризис|чрезвычайн|предупрежд", -20, "Нагнетание срочности"),
            Indicator::new(r"революционн|прорыв|новаторск", 25, "Громкие заявления"),
        ],
        alarming: compile(r"потрясающ|невероятн|шок|секрет|скрыт"),
        neutral_filler: "Язык выглядит относительно нейтральным",
        warning_filler: "Присутствуют некоторые признаки предвзятости",
        fusion: FusionText {
            high_factuality: "Высокий уровень фактического содержания",
            low_bias: "Сбалансированный язык с низкой предвзятостью",
            high_bias: "Обнаружена значительная предвзятость",
            strong_emotion: "Сильная эмоциональная окраска может влиять на объективность",
            low_factuality: "Слабая фактическая обоснованность",
        },
        reliable_advice: &[
            "Сверьтесь с дополнительными источниками для полноты картины",
            "Проверьте дату публикации и актуальность",
        ],
        questionable_advice: &[
            "Найдите несколько независимых источников",
            "Оцените надёжность источника",
            "Ознакомьтесь с мнением экспертов",
        ],
        misinformation_advice: &[
            "Не распространяйте этот материал",
            "Проверьте утверждения по авторитетным источникам",
            "Учитывайте возможную дезинформацию",
        ],
    }
}
