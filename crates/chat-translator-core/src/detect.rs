//! Statistical source-language detection.
//!
//! The session treats a failed detection as a hard stop for the request:
//! guessing silently would corrupt the provider calls that require an
//! explicit source code.

use crate::config::Lang;

/// Language identification model.
///
/// Returns `None` (not an error) on ambiguous or too-short input.
pub trait LanguageIdModel: Send + Sync {
    fn detect(&self, text: &str) -> Option<Lang>;
}

/// Default detector backed by whatlang.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatlangDetector;

impl LanguageIdModel for WhatlangDetector {
    fn detect(&self, text: &str) -> Option<Lang> {
        let info = whatlang::detect(text)?;
        if !info.is_reliable() {
            return None;
        }
        lang_to_code(info.lang()).map(Lang::new)
    }
}

/// Map whatlang's ISO 639-3 variants to the ISO 639-1 codes the providers
/// speak. Languages outside this table are treated as undetected.
fn lang_to_code(lang: whatlang::Lang) -> Option<&'static str> {
    use whatlang::Lang::{
        Ara, Ces, Cmn, Dan, Deu, Eng, Fin, Fra, Heb, Hin, Hun, Ita, Jpn, Kor, Nld, Pol, Por, Ron,
        Rus, Spa, Swe, Tha, Tur, Ukr, Vie,
    };
    let code = match lang {
        Eng => "en",
        Rus => "ru",
        Spa => "es",
        Fra => "fr",
        Deu => "de",
        Ita => "it",
        Por => "pt",
        Jpn => "ja",
        Cmn => "zh",
        Kor => "ko",
        Ara => "ar",
        Hin => "hi",
        Tur => "tr",
        Pol => "pl",
        Nld => "nl",
        Swe => "sv",
        Dan => "da",
        Fin => "fi",
        Ces => "cs",
        Hun => "hu",
        Ron => "ro",
        Ukr => "uk",
        Heb => "he",
        Tha => "th",
        Vie => "vi",
        _ => return None,
    };
    Some(code)
}
