//! Message value objects

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::translator::{DefaultTranslator, Translator};

/// Named placeholder values, keyed by the placeholder as it appears in the
/// message text (e.g. `%path%`).
pub type Parameters = BTreeMap<String, String>;

/// Placeholders whose values are themselves messages, rendered with the
/// same translator and locale as the message holding them.
pub type MessageParameters = BTreeMap<String, TranslatableMessage>;

/// Translation domain a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Status and description text
    Messages,
    /// Error text
    Exceptions,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Messages => "messages",
            Self::Exceptions => "exceptions",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message that has not been rendered yet.
///
/// The message text is used as the translation id, following the convention
/// where the source-language string is the key into each catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatableMessage {
    message: String,
    #[serde(default)]
    parameters: Parameters,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    nested: MessageParameters,
    domain: Domain,
}

impl TranslatableMessage {
    /// Create a message in the [`Domain::Messages`] domain.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            parameters: Parameters::new(),
            nested: MessageParameters::new(),
            domain: Domain::Messages,
        }
    }

    /// Create a message in the [`Domain::Exceptions`] domain.
    pub fn exception(message: impl Into<String>) -> Self {
        Self::new(message).with_domain(Domain::Exceptions)
    }

    /// Add (or replace) a named parameter.
    pub fn with_parameter(mut self, placeholder: impl Into<String>, value: impl fmt::Display) -> Self {
        let placeholder = placeholder.into();
        self.nested.remove(&placeholder);
        self.parameters.insert(placeholder, value.to_string());
        self
    }

    /// Add (or replace) a parameter whose value is another message.
    ///
    /// The inner message stays untranslated until this one is rendered.
    pub fn with_message_parameter(
        mut self,
        placeholder: impl Into<String>,
        message: TranslatableMessage,
    ) -> Self {
        let placeholder = placeholder.into();
        self.parameters.remove(&placeholder);
        self.nested.insert(placeholder, message);
        self
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    /// The untranslated message text, which is also its id.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn message_parameters(&self) -> &MessageParameters {
        &self.nested
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Render through the given translator.
    ///
    /// `locale` overrides the translator's own locale when given.
    pub fn trans(&self, translator: &dyn Translator, locale: Option<&str>) -> String {
        if self.nested.is_empty() {
            return translator.trans(&self.message, &self.parameters, self.domain, locale);
        }

        let mut parameters = self.parameters.clone();
        for (placeholder, inner) in &self.nested {
            parameters.insert(placeholder.clone(), inner.trans(translator, locale));
        }
        translator.trans(&self.message, &parameters, self.domain, locale)
    }
}

impl fmt::Display for TranslatableMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.trans(&DefaultTranslator::default(), None))
    }
}
