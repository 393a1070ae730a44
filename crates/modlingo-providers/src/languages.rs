//! Target languages and the few-shot examples sent with every request.
//!
//! Each language carries worked translations of the same source lines so the
//! model sees placeholders kept verbatim and in-game names localized.

/// Source half of every example pair.
const EXAMPLE_SOURCES: [&str; 7] = [
    "Level {{level}} shield found!",
    "Mod created by {{author}} - Requirements: {{parents}}",
    "Great sword with level {{level}}",
    "Farm Quarry",
    "Elliot's Cabin",
    "Iridium Quarry",
    "Beer, mead, and pale ale are worth 50% more.",
];

/// A supported target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageProfile {
    /// Language code as used in mod file names (`zh`, `pt-BR`, ...).
    pub code: &'static str,
    /// Native display name, inserted into the instruction.
    pub name: &'static str,
    targets: [&'static str; 7],
}

impl LanguageProfile {
    /// `(source, translation)` example pairs, in prompt order.
    pub fn examples(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        EXAMPLE_SOURCES.iter().copied().zip(self.targets.iter().copied())
    }
}

pub const LANGUAGES: &[LanguageProfile] = &[
    LanguageProfile {
        code: "zh",
        name: "中文",
        targets: [
            "发现等级{{level}}护盾！",
            "模组由{{author}}制作 - 依赖项：{{parents}}",
            "等级{{level}}大剑",
            "农场采石场",
            "艾利欧特的小屋",
            "铱矿采石场",
            "啤酒、蜂蜜酒和淡啤酒的价值提高50%。",
        ],
    },
    LanguageProfile {
        code: "en",
        name: "English",
        targets: [
            "Level {{level}} shield found!",
            "Mod created by {{author}} - Requirements: {{parents}}",
            "Great sword with level {{level}}",
            "Farm Quarry",
            "Elliott's Cabin",
            "Iridium Quarry",
            "Beer, mead, and pale ale are worth 50% more.",
        ],
    },
    LanguageProfile {
        code: "ja",
        name: "日本語",
        targets: [
            "レベル{{level}}の盾を発見！",
            "{{author}}によって作成されたMod - 必要条件：{{parents}}",
            "レベル{{level}}の大剣",
            "農場の採石場",
            "エリオットの小屋",
            "イリジウム採石場",
            "ビール、ミード、ペールエールの価値が50%向上します。",
        ],
    },
    LanguageProfile {
        code: "ko",
        name: "한국어",
        targets: [
            "레벨 {{level}} 방패 발견!",
            "{{author}}가 제작한 모드 - 요구사항: {{parents}}",
            "레벨 {{level}} 대검",
            "농장 채석장",
            "엘리엇의 오두막",
            "이리듐 채석장",
            "맥주, 벌꿀술, 페일 에일의 가치가 50% 증가합니다.",
        ],
    },
    LanguageProfile {
        code: "fr",
        name: "Français",
        targets: [
            "Bouclier de niveau {{level}} trouvé !",
            "Mod créé par {{author}} - Prérequis : {{parents}}",
            "Grande épée de niveau {{level}}",
            "Carrière de la ferme",
            "Cabane d'Elliott",
            "Carrière d'iridium",
            "La bière, l'hydromel et la bière blonde valent 50% de plus.",
        ],
    },
    LanguageProfile {
        code: "de",
        name: "Deutsch",
        targets: [
            "Schild der Stufe {{level}} gefunden!",
            "Mod erstellt von {{author}} - Voraussetzungen: {{parents}}",
            "Großes Schwert der Stufe {{level}}",
            "Farm-Steinbruch",
            "Elliotts Hütte",
            "Iridium-Steinbruch",
            "Bier, Met und helles Bier sind 50% mehr wert.",
        ],
    },
    LanguageProfile {
        code: "es",
        name: "Español",
        targets: [
            "¡Escudo de nivel {{level}} encontrado!",
            "Mod creado por {{author}} - Requisitos: {{parents}}",
            "Gran espada de nivel {{level}}",
            "Cantera de la granja",
            "Cabaña de Elliott",
            "Cantera de iridio",
            "La cerveza, el hidromiel y la cerveza pálida valen 50% más.",
        ],
    },
    LanguageProfile {
        code: "ru",
        name: "Русский",
        targets: [
            "Найден щит {{level}} уровня!",
            "Мод создан {{author}} - Требования: {{parents}}",
            "Большой меч {{level}} уровня",
            "Карьер фермы",
            "Хижина Эллиота",
            "Иридиевый карьер",
            "Пиво, медовуха и светлый эль стоят на 50% больше.",
        ],
    },
    LanguageProfile {
        code: "pt-BR",
        name: "Português (BR)",
        targets: [
            "Escudo nível {{level}} encontrado!",
            "Mod criado por {{author}} - Requisitos: {{parents}}",
            "Grande espada nível {{level}}",
            "Pedreira da fazenda",
            "Cabana do Elliott",
            "Pedreira de irídio",
            "Cerveja, hidromel e cerveja clara valem 50% a mais.",
        ],
    },
    LanguageProfile {
        code: "it",
        name: "Italiano",
        targets: [
            "Scudo di livello {{level}} trovato!",
            "Mod creata da {{author}} - Requisiti: {{parents}}",
            "Grande spada di livello {{level}}",
            "Cava della fattoria",
            "Capanna di Elliott",
            "Cava di iridio",
            "Birra, idromele e birra chiara valgono il 50% in più.",
        ],
    },
    LanguageProfile {
        code: "tr",
        name: "Türkçe",
        targets: [
            "Seviye {{level}} kalkan bulundu!",
            "{{author}} tarafından oluşturulan mod - Gereksinimler: {{parents}}",
            "Seviye {{level}} büyük kılıç",
            "Çiftlik taş ocağı",
            "Elliott'un kulübesi",
            "İridyum taş ocağı",
            "Bira, bal şarabı ve açık bira %50 daha değerli.",
        ],
    },
    LanguageProfile {
        code: "hu",
        name: "Magyar",
        targets: [
            "{{level}}. szintű pajzs találva!",
            "{{author}} által készített mod - Követelmények: {{parents}}",
            "{{level}}. szintű nagy kard",
            "Farm kőbánya",
            "Elliott kunyhója",
            "Irídium kőbánya",
            "A sör, mézsör és világos sör 50%-kal többet ér.",
        ],
    },
];

/// Look up a language by code, case-insensitively.
///
/// `default` (the conventional name of a mod's English file) maps to English.
pub fn find(code: &str) -> Option<&'static LanguageProfile> {
    let code = if code.eq_ignore_ascii_case("default") {
        "en"
    } else {
        code
    };
    LANGUAGES.iter().find(|l| l.code.eq_ignore_ascii_case(code))
}

/// Like [`find`], falling back to Chinese for unknown codes.
pub fn profile_for(code: &str) -> &'static LanguageProfile {
    find(code).unwrap_or(&LANGUAGES[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use modlingo_core::placeholder::check_placeholders;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(profile_for("PT-br").code, "pt-BR");
        assert_eq!(profile_for("default").code, "en");
    }

    #[test]
    fn test_unknown_code_falls_back_to_chinese() {
        assert!(find("xx").is_none());
        assert_eq!(profile_for("xx").code, "zh");
    }

    #[test]
    fn test_examples_keep_placeholders() {
        for lang in LANGUAGES {
            for (source, target) in lang.examples() {
                assert!(
                    check_placeholders(source, target).is_ok(),
                    "{}: {target}",
                    lang.code
                );
            }
        }
    }

    #[test]
    fn test_codes_are_unique() {
        for (i, a) in LANGUAGES.iter().enumerate() {
            assert!(LANGUAGES[i + 1..].iter().all(|b| b.code != a.code));
        }
    }
}
