//! Balanced curly-bracket tokenization of a parsed message string.
//!
//! Yields a flat, ordered sequence of "outside" text runs and bracketed
//! "content" runs at the outermost nesting level; nested brackets stay inside
//! their content run and are handled by the builder's recursion. Brackets
//! inside escaped regions are ordinary text. Unbalanced brackets are a typed
//! error the caller converts into a located error literal.

use crate::error::Error;
use crate::escape::{Region, in_regions};

/// One token of the outermost bracket level; ranges are parsed byte offsets.
/// `Content` ranges exclude the enclosing braces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketToken {
    Outside { start: usize, end: usize },
    Content { start: usize, end: usize },
}

/// Tokenizes `parsed` by matching balanced `{` `}` pairs, honoring the
/// unescaped `regions`. Matching is leftmost-greedy and non-overlapping at
/// each nesting level; depth is unlimited.
///
/// Returns an empty list when the text contains no bracket group at all, the
/// signal that the whole text is a plain literal.
pub fn match_curly_brackets(
    parsed: &str,
    regions: &[Region],
) -> Result<Vec<BracketToken>, Error> {
    let bytes = parsed.as_bytes();
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut segment_start = 0usize;
    let mut content_start = 0usize;
    let mut found_group = false;

    for (index, &byte) in bytes.iter().enumerate() {
        if byte != b'{' && byte != b'}' {
            continue;
        }
        if !in_regions(regions, index) {
            continue;
        }
        if byte == b'{' {
            if depth == 0 {
                if segment_start < index {
                    tokens.push(BracketToken::Outside {
                        start: segment_start,
                        end: index,
                    });
                }
                content_start = index + 1;
            }
            depth += 1;
        } else {
            if depth == 0 {
                return Err(Error::UnbalancedBrackets);
            }
            depth -= 1;
            if depth == 0 {
                tokens.push(BracketToken::Content {
                    start: content_start,
                    end: index,
                });
                segment_start = index + 1;
                found_group = true;
            }
        }
    }

    if depth > 0 {
        return Err(Error::UnbalancedBrackets);
    }
    if !found_group {
        return Ok(Vec::new());
    }
    if segment_start < bytes.len() {
        tokens.push(BracketToken::Outside {
            start: segment_start,
            end: bytes.len(),
        });
    }
    Ok(tokens)
}

/// Byte offsets of commas at bracket depth zero within unescaped regions.
/// Used to decide whether a bracketed content run is a complex message and to
/// split its argument and type.
pub fn top_level_commas(parsed: &str, regions: &[Region]) -> Vec<usize> {
    let bytes = parsed.as_bytes();
    let mut commas = Vec::new();
    let mut depth = 0usize;
    for (index, &byte) in bytes.iter().enumerate() {
        if !in_regions(regions, index) {
            continue;
        }
        match byte {
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => commas.push(index),
            _ => {}
        }
    }
    commas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escape::unescaped_regions;

    fn tokens(text: &str) -> Result<Vec<BracketToken>, Error> {
        let regions = unescaped_regions(text, true)?;
        match_curly_brackets(text, &regions)
    }

    #[test]
    fn test_no_brackets_is_empty() {
        assert_eq!(tokens("plain text").unwrap(), vec![]);
    }

    #[test]
    fn test_single_placeholder() {
        assert_eq!(
            tokens("Hi {name}!").unwrap(),
            vec![
                BracketToken::Outside { start: 0, end: 3 },
                BracketToken::Content { start: 4, end: 8 },
                BracketToken::Outside { start: 9, end: 10 },
            ]
        );
    }

    #[test]
    fn test_bare_placeholder_has_no_outside_tokens() {
        assert_eq!(
            tokens("{name}").unwrap(),
            vec![BracketToken::Content { start: 1, end: 5 }]
        );
    }

    #[test]
    fn test_nested_brackets_stay_in_content() {
        assert_eq!(
            tokens("{a, plural, other{{n} items}}").unwrap(),
            vec![BracketToken::Content { start: 1, end: 28 }]
        );
    }

    #[test]
    fn test_adjacent_groups() {
        assert_eq!(
            tokens("{a}{b}").unwrap(),
            vec![
                BracketToken::Content { start: 1, end: 2 },
                BracketToken::Content { start: 4, end: 5 },
            ]
        );
    }

    #[test]
    fn test_escaped_bracket_is_text() {
        // The quoted brace does not open a group.
        assert_eq!(tokens("a '{' b").unwrap(), vec![]);
    }

    #[test]
    fn test_escaped_bracket_next_to_real_group() {
        assert_eq!(
            tokens("'{'{n}").unwrap(),
            vec![
                BracketToken::Outside { start: 0, end: 3 },
                BracketToken::Content { start: 4, end: 5 },
            ]
        );
    }

    #[test]
    fn test_unclosed_bracket_is_error() {
        assert_eq!(tokens("oops {name").unwrap_err(), Error::UnbalancedBrackets);
    }

    #[test]
    fn test_stray_closing_bracket_is_error() {
        assert_eq!(tokens("oops name}").unwrap_err(), Error::UnbalancedBrackets);
    }

    #[test]
    fn test_top_level_commas_skip_nested() {
        let text = "n, plural, one{a,b} other{c}";
        let regions = unescaped_regions(text, true).unwrap();
        assert_eq!(top_level_commas(text, &regions), vec![1, 9]);
    }

    #[test]
    fn test_top_level_commas_skip_escaped() {
        let text = "a 'x,y' b";
        let regions = unescaped_regions(text, true).unwrap();
        assert_eq!(top_level_commas(text, &regions), Vec::<usize>::new());
    }
}
