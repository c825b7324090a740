//! Rendering of translatable messages

use std::collections::HashMap;

use crate::message::{Domain, Parameters};

/// Locale used when nothing else is configured.
pub const DEFAULT_LOCALE: &str = "en_US";

/// Renders message ids into localized strings.
pub trait Translator: Send + Sync {
    /// Translate `id` within `domain`, substituting `parameters`.
    ///
    /// Implementations fall back to the id itself when no translation
    /// exists, so an untranslated message still reads correctly.
    fn trans(&self, id: &str, parameters: &Parameters, domain: Domain, locale: Option<&str>) -> String;

    /// The locale used when callers do not pass one.
    fn locale(&self) -> &str;
}

/// In-memory catalog translator.
///
/// Catalog loading is the host's business; hosts that want localized output
/// register translations with [`DefaultTranslator::add_translation`] or supply
/// their own [`Translator`].
#[derive(Debug, Clone)]
pub struct DefaultTranslator {
    locale: String,
    catalog: HashMap<(String, Domain, String), String>,
}

impl Default for DefaultTranslator {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE)
    }
}

impl DefaultTranslator {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            catalog: HashMap::new(),
        }
    }

    /// Register `translation` for `id` in the given locale and domain.
    pub fn add_translation(
        &mut self,
        locale: impl Into<String>,
        domain: Domain,
        id: impl Into<String>,
        translation: impl Into<String>,
    ) {
        self.catalog
            .insert((locale.into(), domain, id.into()), translation.into());
    }
}

impl Translator for DefaultTranslator {
    fn trans(&self, id: &str, parameters: &Parameters, domain: Domain, locale: Option<&str>) -> String {
        let locale = locale.unwrap_or(&self.locale);
        let template = self
            .catalog
            .get(&(locale.to_string(), domain, id.to_string()))
            .map(String::as_str)
            .unwrap_or(id);

        substitute(template, parameters)
    }

    fn locale(&self) -> &str {
        &self.locale
    }
}

/// Replace every placeholder occurrence in a single left-to-right pass.
///
/// Substituted values are never rescanned, so a value that happens to contain
/// another placeholder is emitted verbatim. Longer placeholders win when two
/// share a prefix.
fn substitute(template: &str, parameters: &Parameters) -> String {
    if parameters.is_empty() {
        return template.to_string();
    }

    let mut keys: Vec<&String> = parameters.keys().filter(|k| !k.is_empty()).collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    'outer: while !rest.is_empty() {
        for key in &keys {
            if rest.starts_with(key.as_str()) {
                result.push_str(&parameters[*key]);
                rest = &rest[key.len()..];
                continue 'outer;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            result.push(c);
        }
        rest = chars.as_str();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Parameters {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitute_without_parameters_is_identity() {
        assert_eq!(substitute("plain", &Parameters::new()), "plain");
    }

    #[test]
    fn substitute_does_not_rescan_values() {
        let p = params(&[("%a%", "%b%"), ("%b%", "x")]);
        assert_eq!(substitute("%a% %b%", &p), "%b% x");
    }

    #[test]
    fn substitute_prefers_longest_placeholder() {
        let p = params(&[("%dir", "short"), ("%dir%", "long")]);
        assert_eq!(substitute("%dir%", &p), "long");
    }

    #[test]
    fn substitute_handles_multibyte_text() {
        let p = params(&[("%p%", "ü")]);
        assert_eq!(substitute("é %p% ö", &p), "é ü ö");
    }
}
