//! Dictionary-substitution translation of tutoring text.
//!
//! Each registered language carries a small table of programming terms. Translation
//! replaces whole words case-insensitively; English and unregistered languages are a no-op.

use std::sync::OnceLock;

use regex::{NoExpand, Regex};
use tracing::{debug, instrument};

pub const DEFAULT_LANGUAGE: &str = "English";

const BANGLA_TERMS: &[(&str, &str)] = &[
    ("problem", "সমস্যা"),
    ("solution", "সমাধান"),
    ("input", "ইনপুট"),
    ("output", "আউটপুট"),
    ("array", "অ্যারে"),
    ("number", "সংখ্যা"),
    ("integer", "পূর্ণসংখ্যা"),
    ("string", "স্ট্রিং"),
    ("loop", "লুপ"),
    ("condition", "শর্ত"),
    ("function", "ফাংশন"),
    ("variable", "ভেরিয়েবল"),
    ("algorithm", "অ্যালগোরিদম"),
    ("example", "উদাহরণ"),
    ("find", "খুঁজে বের করুন"),
    ("calculate", "গণনা করুন"),
    ("print", "প্রিন্ট করুন"),
    ("sum", "যোগফল"),
    ("average", "গড়"),
    ("maximum", "সর্বোচ্চ"),
    ("minimum", "সর্বনিম্ন"),
];

const SPANISH_TERMS: &[(&str, &str)] = &[
    ("problem", "problema"),
    ("solution", "solución"),
    ("input", "entrada"),
    ("output", "salida"),
    ("array", "arreglo"),
    ("number", "número"),
    ("find", "encuentra"),
    ("calculate", "calcula"),
];

const FRENCH_TERMS: &[(&str, &str)] = &[
    ("problem", "problème"),
    ("solution", "solution"),
    ("input", "entrée"),
    ("output", "sortie"),
    ("array", "tableau"),
    ("number", "nombre"),
    ("find", "trouver"),
    ("calculate", "calculer"),
];

/// Whole-phrase patterns common in problem statements (Bangla only).
const BANGLA_PATTERNS: &[(&str, &str)] = &[
    ("Given an array", "একটি অ্যারে দেওয়া আছে"),
    ("Find the sum", "যোগফল বের করুন"),
    ("Calculate the average", "গড় হিসাব করুন"),
    ("Print the result", "ফলাফল প্রিন্ট করুন"),
    ("Input format", "ইনপুট ফরম্যাট"),
    ("Output format", "আউটপুট ফরম্যাট"),
    ("Example", "উদাহরণ"),
    ("Constraints", "সীমাবদ্ধতা"),
];

struct CompiledTerm {
    pattern: Regex,
    replacement: &'static str,
}

struct LanguageTable {
    language: &'static str,
    terms: Vec<CompiledTerm>,
}

/// Stateless term translator. Cheap to copy; the compiled tables are shared.
#[derive(Clone, Copy)]
pub struct TermTranslator {
    tables: &'static [LanguageTable],
}

impl TermTranslator {
    pub fn builtin() -> Self {
        static TABLES: OnceLock<Vec<LanguageTable>> = OnceLock::new();
        let tables = TABLES.get_or_init(|| {
            vec![
                compile("Bangla", BANGLA_TERMS),
                compile("Spanish", SPANISH_TERMS),
                compile("French", FRENCH_TERMS),
            ]
        });
        Self { tables }
    }

    /// Replace known terms with their `language` equivalents.
    #[instrument(level = "debug", skip(self, text), fields(text_len = text.len(), %language))]
    pub fn translate(&self, text: &str, language: &str) -> String {
        if language == DEFAULT_LANGUAGE {
            return text.to_string();
        }
        let Some(table) = self.tables.iter().find(|t| t.language == language) else {
            debug!(target: "tutor", %language, "No term table registered; returning text unchanged");
            return text.to_string();
        };
        table.terms.iter().fold(text.to_string(), |acc, term| {
            term.pattern.replace_all(&acc, NoExpand(term.replacement)).into_owned()
        })
    }

    /// Registered languages plus English, sorted.
    pub fn available_languages(&self) -> Vec<String> {
        let mut out: Vec<String> = self.tables.iter().map(|t| t.language.to_string()).collect();
        out.push(DEFAULT_LANGUAGE.to_string());
        out.sort();
        out
    }

    pub fn is_registered(&self, language: &str) -> bool {
        language == DEFAULT_LANGUAGE || self.tables.iter().any(|t| t.language == language)
    }

    /// Swap whole statement phrases ("Given an array", "Constraints", ...). Bangla only.
    pub fn translate_problem_pattern(&self, text: &str, language: &str) -> String {
        if language != "Bangla" {
            return text.to_string();
        }
        BANGLA_PATTERNS
            .iter()
            .fold(text.to_string(), |acc, &(from, to)| acc.replace(from, to))
    }
}

fn compile(language: &'static str, terms: &[(&'static str, &'static str)]) -> LanguageTable {
    let terms = terms
        .iter()
        .map(|&(en, tr)| CompiledTerm {
            pattern: Regex::new(&format!(r"(?i)\b{}\b", regex::escape(en))).expect("valid term regex"),
            replacement: tr,
        })
        .collect();
    LanguageTable { language, terms }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_and_unknown_languages_are_noops() {
        let t = TermTranslator::builtin();
        let text = "Find the sum of the array";
        assert_eq!(t.translate(text, "English"), text);
        assert_eq!(t.translate(text, "Klingon"), text);
        assert_eq!(t.translate("", "Spanish"), "");
    }

    #[test]
    fn replaces_whole_words_case_insensitively() {
        let t = TermTranslator::builtin();
        assert_eq!(t.translate("Find the Array input", "Spanish"), "encuentra the arreglo entrada");
        // "arrays" and "finder" are not whole-word matches
        assert_eq!(t.translate("arrays finder", "French"), "arrays finder");
        assert_eq!(t.translate("sum", "Bangla"), "যোগফল");
    }

    #[test]
    fn available_languages_include_english() {
        let langs = TermTranslator::builtin().available_languages();
        assert_eq!(langs, vec!["Bangla", "English", "French", "Spanish"]);
    }

    #[test]
    fn problem_patterns_only_apply_to_bangla() {
        let t = TermTranslator::builtin();
        assert_eq!(t.translate_problem_pattern("Constraints", "Bangla"), "সীমাবদ্ধতা");
        assert_eq!(t.translate_problem_pattern("Constraints", "Spanish"), "Constraints");
    }
}
