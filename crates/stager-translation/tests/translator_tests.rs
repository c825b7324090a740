use pretty_assertions::assert_eq;
use stager_translation::{DefaultTranslator, Domain, TranslatableMessage, Translator};

#[test]
fn falls_back_to_message_id() {
    let translator = DefaultTranslator::default();
    let message = TranslatableMessage::new("The staging directory does not exist.");
    assert_eq!(
        message.trans(&translator, None),
        "The staging directory does not exist."
    );
}

#[test]
fn uses_catalog_for_matching_locale_and_domain() {
    let mut translator = DefaultTranslator::new("de_DE");
    translator.add_translation(
        "de_DE",
        Domain::Exceptions,
        "The file %path% is missing.",
        "Die Datei %path% fehlt.",
    );

    let message = TranslatableMessage::exception("The file %path% is missing.")
        .with_parameter("%path%", "composer.json");

    assert_eq!(message.trans(&translator, None), "Die Datei composer.json fehlt.");
}

#[test]
fn domain_is_part_of_the_lookup() {
    let mut translator = DefaultTranslator::new("de_DE");
    translator.add_translation("de_DE", Domain::Exceptions, "Ready", "Bereit");

    let message = TranslatableMessage::new("Ready");
    assert_eq!(message.trans(&translator, None), "Ready");
}

#[test]
fn explicit_locale_overrides_translator_locale() {
    let mut translator = DefaultTranslator::new("en_US");
    translator.add_translation("fr_FR", Domain::Messages, "Ready", "Prêt");

    let message = TranslatableMessage::new("Ready");
    assert_eq!(message.trans(&translator, Some("fr_FR")), "Prêt");
    assert_eq!(message.trans(&translator, None), "Ready");
    assert_eq!(translator.locale(), "en_US");
}

#[test]
fn message_serializes_with_lowercase_domain() {
    let message = TranslatableMessage::exception("Oops %x%").with_parameter("%x%", 1);
    let json = serde_json::to_value(&message).unwrap();
    assert_eq!(json["domain"], "exceptions");
    assert_eq!(json["parameters"]["%x%"], "1");
}

#[test]
fn nested_message_is_translated_in_the_same_locale() {
    let mut translator = DefaultTranslator::new("en_US");
    translator.add_translation(
        "de_DE",
        Domain::Exceptions,
        "Failed to begin: %details%",
        "Beginn fehlgeschlagen: %details%",
    );
    translator.add_translation(
        "de_DE",
        Domain::Exceptions,
        "The file %path% is missing.",
        "Die Datei %path% fehlt.",
    );

    let inner = TranslatableMessage::exception("The file %path% is missing.")
        .with_parameter("%path%", "composer.json");
    let message = TranslatableMessage::exception("Failed to begin: %details%")
        .with_message_parameter("%details%", inner);

    assert_eq!(
        message.trans(&translator, Some("de_DE")),
        "Beginn fehlgeschlagen: Die Datei composer.json fehlt."
    );
    assert_eq!(
        message.trans(&translator, None),
        "Failed to begin: The file composer.json is missing."
    );
}

#[test]
fn nested_message_serializes_structured() {
    let message = TranslatableMessage::exception("Outer: %details%")
        .with_message_parameter("%details%", TranslatableMessage::exception("Inner %n%").with_parameter("%n%", 2));
    let json = serde_json::to_value(&message).unwrap();
    assert_eq!(json["nested"]["%details%"]["message"], "Inner %n%");
    assert_eq!(json["nested"]["%details%"]["parameters"]["%n%"], "2");

    let back: TranslatableMessage = serde_json::from_value(json).unwrap();
    assert_eq!(back, message);
}
