//! Recursive nesting: a sub-mode that is itself a nesting tokenizer.

use nestlex::nest::config::ConfigSpec;
use nestlex::nest::mode::state_ref;
use nestlex::nest::nesting::NestingMode;
use nestlex::nest::state::NestState;
use nestlex::nest::testing::{
    mk_flat, mk_nesting, styled, tok, tokenize_document, tokenize_document_with_state,
};
use std::sync::Arc;

/// Outer `[[ … ]]` embeds an inner nesting tokenizer; inner `<< … >>`
/// embeds a leaf mode.
fn two_level_mode() -> NestingMode {
    let inner = mk_nesting(
        mk_flat("inner-host", Some("ih")),
        vec![ConfigSpec::new()
            .open("<<")
            .close(">>")
            .mode_object(mk_flat("x", Some("x")))
            .delim_style("d2")],
    )
    .unwrap();
    mk_nesting(
        mk_flat("outer-host", None),
        vec![ConfigSpec::new()
            .open("[[")
            .close("]]")
            .mode_object(Arc::new(inner))
            .delim_style("d1")],
    )
    .unwrap()
}

#[test]
fn test_two_level_nesting_pairs_delimiters() {
    let tokens = tokenize_document(&two_level_mode(), "[[ a << b >> c ]]").unwrap();
    assert_eq!(
        styled(&tokens),
        vec![
            tok("[[", Some("d1 d1-open")),
            tok(" a ", Some("ih")),
            tok("<<", Some("d2 d2-open")),
            tok(" b ", Some("x")),
            tok(">>", Some("d2 d2-close")),
            tok(" c ", Some("ih")),
            tok("]]", Some("d1 d1-close")),
        ]
    );
}

#[test]
fn test_outer_text_around_nested_regions() {
    let tokens = tokenize_document(&two_level_mode(), "pre [[ a << b >> ]] post").unwrap();
    assert_eq!(tokens.first().unwrap().text, "pre ");
    assert_eq!(tokens.first().unwrap().style, None);
    assert_eq!(tokens.last().unwrap().text, " post");
    assert_eq!(tokens.last().unwrap().style, None);
}

#[test]
fn test_nested_regions_span_lines() {
    let (tokens, state) =
        tokenize_document_with_state(&two_level_mode(), "[[ a << b\nc >> d ]] e").unwrap();
    let nest_state = state_ref::<NestState>(state.as_ref()).unwrap();
    assert!(nest_state.settled());
    let inner_close = tokens.iter().find(|t| t.text == ">>").unwrap();
    assert_eq!(inner_close.line, 1);
    assert_eq!(inner_close.style.as_deref(), Some("d2 d2-close"));
    let outer_close = tokens.iter().find(|t| t.text == "]]").unwrap();
    assert_eq!(outer_close.line, 1);
    assert_eq!(outer_close.style.as_deref(), Some("d1 d1-close"));
    assert_eq!(tokens.last().unwrap().text, " e");
    assert_eq!(tokens.last().unwrap().style, None);
}

#[test]
fn test_multiple_inner_regions_in_one_outer() {
    let tokens =
        tokenize_document(&two_level_mode(), "[[ <<a>> m <<b>> ]]").unwrap();
    let opens: Vec<_> = tokens
        .iter()
        .filter(|t| t.style.as_deref() == Some("d2 d2-open"))
        .collect();
    assert_eq!(opens.len(), 2);
    let closes: Vec<_> = tokens
        .iter()
        .filter(|t| t.style.as_deref() == Some("d2 d2-close"))
        .collect();
    assert_eq!(closes.len(), 2);
    assert_eq!(tokens.last().unwrap().style.as_deref(), Some("d1 d1-close"));
}

#[test]
fn test_inner_open_beyond_outer_close_is_ignored() {
    // The "<<" after "]]" belongs to the outer host, where no "<<" config
    // exists.
    let tokens = tokenize_document(&two_level_mode(), "[[ a ]] << b").unwrap();
    assert!(tokens
        .iter()
        .all(|t| t.style.as_deref() != Some("d2 d2-open")));
    let tail = tokens.last().unwrap();
    assert_eq!(tail.text, " << b");
    assert_eq!(tail.style, None);
}
