use super::*;

#[test]
fn test_whitespace_and_punctuation() {
    let tokens = WordTokenizer::new()
        .tokenize("Heat-exchanger\tfor  fluids;\nimproved.")
        .expect("tokenize");
    assert_eq!(
        tokens,
        vec!["heat", "-", "exchanger", "for", "fluids", ";", "improved", "."]
    );
}

#[test]
fn test_case_sensitive() {
    let tokens = WordTokenizer::case_sensitive()
        .tokenize("CPC Code")
        .expect("tokenize");
    assert_eq!(tokens, vec!["CPC", "Code"]);
}

#[test]
fn test_empty_and_blank() {
    let tokenizer = WordTokenizer::new();
    assert!(tokenizer.tokenize("").expect("tokenize").is_empty());
    assert!(tokenizer.tokenize(" \n\t ").expect("tokenize").is_empty());
}

#[test]
fn test_unicode_lowercase() {
    let tokens = WordTokenizer::new().tokenize("ÜBER Straße").expect("tokenize");
    assert_eq!(tokens, vec!["über", "straße"]);
}
