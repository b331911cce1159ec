//! Property tests for the classifier, name heuristic, and secret redaction.

use proptest::prelude::*;

use aftercare_engine::router::{classify, looks_like_name, QueryClass};
use aftercare_engine::secrets::SecretString;

proptest! {
    /// Strings built only from consonants that appear in no keyword and no
    /// question pattern must fall through to the administrative path.
    #[test]
    fn neutral_text_is_administrative(s in "[bcdfgjkmpqvxz ]{0,60}") {
        prop_assert_eq!(classify(&s), QueryClass::Administrative);
    }

    /// Any message containing a medical vocabulary term is clinical, no
    /// matter what surrounds it.
    #[test]
    fn dosage_anywhere_is_clinical(prefix in "[bcdfg ]{0,20}", suffix in "[bcdfg ]{0,20}") {
        let msg = format!("{prefix}dosage{suffix}");
        prop_assert_eq!(classify(&msg), QueryClass::Clinical);
    }

    /// A question mark alone is enough to route clinically.
    #[test]
    fn question_mark_is_clinical(body in "[bcdfgjkmpqvxz ]{0,40}") {
        let msg = format!("{body}?");
        prop_assert_eq!(classify(&msg), QueryClass::Clinical);
    }

    /// Keyword matching is case-insensitive.
    #[test]
    fn classification_ignores_case(s in "[bcdfgjkmpqvxz ]{0,30}") {
        let upper = format!("{} DIALYSIS", s);
        prop_assert_eq!(classify(&upper), QueryClass::Clinical);
    }

    /// A single token can never pass the name heuristic.
    #[test]
    fn single_token_is_not_a_name(s in "[A-Za-z]{1,20}") {
        prop_assert!(!looks_like_name(&s));
    }

    /// Greeting words disqualify an input as a name even with two tokens.
    #[test]
    fn greeting_words_are_not_names(other in "[A-Z][a-z]{2,10}") {
        let leading = format!("hello {}", other);
        let trailing = format!("{} hi", other);
        prop_assert!(!looks_like_name(&leading));
        prop_assert!(!looks_like_name(&trailing));
    }

    /// Redaction must hold for every value: neither Debug nor Display may
    /// leak the wrapped secret.
    #[test]
    fn secret_never_leaks(value in "[a-zA-Z0-9]{8,40}") {
        let secret = SecretString::new(value.clone());
        let display = format!("{}", secret);
        let debug = format!("{:?}", secret);
        prop_assert!(!display.contains(&value));
        prop_assert!(!debug.contains(&value));
        prop_assert_eq!(secret.unsecure(), value);
    }
}
