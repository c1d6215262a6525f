//! Suffix scenarios: configurations attempted once, with elevated
//! priority, after their parent sub-mode closes.

use nestlex::nest::config::{before, regex, ConfigSpec};
use nestlex::nest::testing::{mk_flat, mk_nesting, styled, tok, tokenize_document};
use nestlex::nest::nesting::NestingMode;

/// `foo` opens a region that closes just before the next whitespace and
/// then offers a `bar` suffix running to end of line.
fn suffix_mode(inline: bool) -> NestingMode {
    let suffix = ConfigSpec::new()
        .open("bar")
        .close(regex("$"))
        .mode_object(mk_flat("z", Some("z")))
        .delim_style("sfx")
        .inline(inline);
    mk_nesting(
        mk_flat("text", None),
        vec![ConfigSpec::new()
            .open("foo")
            .close(before(r"\s"))
            .mode_object(mk_flat("f", Some("f")))
            .delim_style("foo")
            .suffixes(vec![suffix])],
    )
    .unwrap()
}

#[test]
fn test_suffix_fires_after_close() {
    let tokens = tokenize_document(&suffix_mode(false), "foo bar rest").unwrap();
    assert_eq!(
        styled(&tokens),
        vec![
            tok("foo", Some("foo foo-open")),
            tok(" ", None),
            tok("bar", Some("sfx sfx-open")),
            tok(" rest", Some("z")),
        ]
    );
}

#[test]
fn test_suffix_outranks_declared_configs() {
    // A second "foo" would normally win the search, but the pending
    // suffix is consulted first and takes the tie at its earlier offset.
    let tokens = tokenize_document(&suffix_mode(false), "foo bar foo").unwrap();
    let head: Vec<_> = styled(&tokens).into_iter().take(3).collect();
    assert_eq!(
        head,
        vec![
            tok("foo", Some("foo foo-open")),
            tok(" ", None),
            tok("bar", Some("sfx sfx-open")),
        ]
    );
}

#[test]
fn test_suffix_cleared_by_one_non_matching_search() {
    let tokens = tokenize_document(&suffix_mode(false), "foo x\nbar y").unwrap();
    // The close on line 0 publishes the suffix; the same line's next open
    // search fails to match it, which clears it. Line 1's "bar" is plain
    // host text.
    assert!(tokens
        .iter()
        .all(|t| t.style.as_deref() != Some("sfx sfx-open")));
    let line1: Vec<_> = tokens.iter().filter(|t| t.line == 1).collect();
    assert_eq!(line1.len(), 1);
    assert_eq!(line1[0].text, "bar y");
    assert_eq!(line1[0].style, None);
}

/// `#` opens a close-at-start-of-line region; its suffix can only become
/// pending through a close that fires on a blank line.
fn sol_suffix_mode(inline: bool) -> NestingMode {
    let suffix = ConfigSpec::new()
        .open("bar")
        .close(regex("$"))
        .mode_object(mk_flat("z", Some("z")))
        .delim_style("sfx")
        .inline(inline);
    mk_nesting(
        mk_flat("text", None),
        vec![ConfigSpec::new()
            .open("#")
            .mode_object(mk_flat("c", Some("c")))
            .suffixes(vec![suffix])],
    )
    .unwrap()
}

#[test]
fn test_suffix_survives_blank_lines() {
    // Close fires on the first blank line, publishing the suffix; a
    // plain suffix survives the second blank line and fires on "bar x".
    let tokens = tokenize_document(&sol_suffix_mode(false), "# c\n\n\nbar x").unwrap();
    let open = tokens
        .iter()
        .find(|t| t.style.as_deref() == Some("sfx sfx-open"))
        .unwrap();
    assert_eq!(open.text, "bar");
    assert_eq!(open.line, 3);
}

#[test]
fn test_inline_suffix_discarded_on_blank_line() {
    let tokens = tokenize_document(&sol_suffix_mode(true), "# c\n\n\nbar x").unwrap();
    assert!(tokens
        .iter()
        .all(|t| t.style.as_deref() != Some("sfx sfx-open")));
    let line3: Vec<_> = tokens.iter().filter(|t| t.line == 3).collect();
    assert_eq!(line3.len(), 1);
    assert_eq!(line3[0].text, "bar x");
}
