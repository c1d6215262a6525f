//! Close-at-start-of-line regions and blank-line behavior.

use nestlex::nest::config::{regex, ConfigSpec};
use nestlex::nest::mode::state_ref;
use nestlex::nest::state::NestState;
use nestlex::nest::testing::{
    mk_flat, mk_nesting, styled, tok, tokenize_document, tokenize_document_with_state,
};

#[test]
fn test_close_at_sol_fires_on_next_line() {
    // No close pattern: the region covers the rest of the line and closes
    // at the start of the next one, emitting no close token.
    let mode = mk_nesting(
        mk_flat("text", None),
        vec![ConfigSpec::new()
            .open("#")
            .mode_object(mk_flat("comment", Some("comment")))
            .delim_style("meta")],
    )
    .unwrap();
    let tokens = tokenize_document(&mode, "# hello\nworld").unwrap();
    assert_eq!(
        styled(&tokens),
        vec![
            tok("#", Some("meta meta-open")),
            tok(" hello", Some("comment")),
            tok("world", None),
        ]
    );
    assert_eq!(tokens[2].line, 1);
}

#[test]
fn test_close_at_sol_fires_on_blank_line() {
    let mode = mk_nesting(
        mk_flat("text", None),
        vec![ConfigSpec::new()
            .open("#")
            .mode_object(mk_flat("comment", Some("comment")))],
    )
    .unwrap();
    let (tokens, state) = tokenize_document_with_state(&mode, "# a\n\nb").unwrap();
    let nest_state = state_ref::<NestState>(state.as_ref()).unwrap();
    assert!(nest_state.settled());
    let last = tokens.last().unwrap();
    assert_eq!(last.text, "b");
    assert_eq!(last.style, None);
    assert_eq!(last.line, 2);
}

#[test]
fn test_explicit_newline_close_fires_on_blank_line() {
    let mode = mk_nesting(
        mk_flat("text", None),
        vec![ConfigSpec::new()
            .open("<x")
            .close(regex(r"\n"))
            .mode_object(mk_flat("sub", Some("sub")))],
    )
    .unwrap();
    let (tokens, state) = tokenize_document_with_state(&mode, "a <x b\n\ny").unwrap();
    let nest_state = state_ref::<NestState>(state.as_ref()).unwrap();
    assert!(nest_state.settled());
    // " b" on line 0 belongs to the sub; "y" after the blank line is host
    // text again.
    assert!(tokens
        .iter()
        .any(|t| t.line == 0 && t.style.as_deref() == Some("sub")));
    let last = tokens.last().unwrap();
    assert_eq!((last.text.as_str(), last.line), ("y", 2));
    assert_eq!(last.style, None);
}

#[test]
fn test_newline_open_enters_on_blank_line() {
    let mode = mk_nesting(
        mk_flat("text", None),
        vec![ConfigSpec::new()
            .open(regex(r"\n"))
            .close("!")
            .mode_object(mk_flat("sub", Some("sub")))],
    )
    .unwrap();
    let tokens = tokenize_document(&mode, "a\n\nrest! b").unwrap();
    assert_eq!(
        styled(&tokens),
        vec![
            tok("a", None),
            tok("rest", Some("sub")),
            tok("!", None),
            tok(" b", None),
        ]
    );
    assert_eq!(tokens[1].line, 2);
}

#[test]
fn test_region_stays_open_across_blank_line_with_explicit_close() {
    // A close that matches neither "\n" nor start-of-line keeps the
    // region open across blank lines.
    let mode = mk_nesting(
        mk_flat("text", None),
        vec![ConfigSpec::new()
            .open("<%")
            .close("%>")
            .mode_object(mk_flat("js", Some("js")))
            .delim_style("tag")],
    )
    .unwrap();
    let tokens = tokenize_document(&mode, "a <% x\n\ny %> b").unwrap();
    let close = tokens.iter().find(|t| t.text == "%>").unwrap();
    assert_eq!(close.line, 2);
    assert!(tokens
        .iter()
        .any(|t| t.line == 2 && t.style.as_deref() == Some("js")));
}
