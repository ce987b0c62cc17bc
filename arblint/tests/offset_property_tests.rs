use arblint::escape::{in_regions, unescaped_regions};
use arblint::parser::Parser;
use arblint::rawtext::{JsonEscapes, RawText};
use proptest::prelude::*;

fn placeholder_name_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-zA-Z][a-zA-Z_0-9]{0,12}").expect("valid name regex")
}

fn plain_text_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9 .,!]{0,20}").expect("valid text regex")
}

fn escape_piece_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("a"),
        Just("Z"),
        Just(" "),
        Just(r"\n"),
        Just(r"\t"),
        Just(r"\\"),
        Just(r"A"),
        Just(r"é"),
        Just(r"😀"),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn quote_free_text_is_one_region(text in "[A-Za-z0-9 {},!.]{1,40}") {
        let regions = unescaped_regions(&text, true).expect("no quotes, no error");
        prop_assert_eq!(regions, vec![(0, text.len())]);
    }

    #[test]
    fn doubled_quotes_never_unbalance(text in "[A-Za-z ]{0,10}", repeats in 0usize..5) {
        let mut s = text.clone();
        for _ in 0..repeats {
            s.push_str("''");
            s.push_str(&text);
        }
        prop_assert!(unescaped_regions(&s, true).is_ok());
    }

    #[test]
    fn regions_are_ordered_and_bounded(text in "[a-z' {},]{0,30}") {
        if let Ok(regions) = unescaped_regions(&text, true) {
            let mut previous_end = 0;
            for (start, end) in regions {
                prop_assert!(start >= previous_end);
                prop_assert!(start < end);
                prop_assert!(end <= text.len());
                previous_end = end;
            }
        }
    }

    #[test]
    fn disabled_escaping_is_total(text in "[a-z' {},]{0,30}") {
        let regions = unescaped_regions(&text, false).expect("never fails when disabled");
        prop_assert_eq!(regions, vec![(0, text.len())]);
        for index in 0..text.len() {
            prop_assert!(in_regions(&[(0, text.len())], index));
        }
    }

    #[test]
    fn decoded_positions_are_monotone_and_cover_raw(
        pieces in prop::collection::vec(escape_piece_strategy(), 0..12)
    ) {
        let raw: String = pieces.concat();
        let text = RawText::decode(&raw, 0, &JsonEscapes);

        // One table entry per parsed byte plus the final raw length.
        let parsed_len = text.parsed().len();
        let mut previous = 0;
        for index in 0..=parsed_len {
            let offset = text.raw_offset(index);
            prop_assert!(offset >= previous);
            prop_assert!(offset <= raw.len());
            previous = offset;
        }
        prop_assert_eq!(text.raw_offset(parsed_len), raw.len());
        prop_assert_eq!(text.full_span().end, raw.len());
    }

    #[test]
    fn placeholder_span_slices_back_to_its_name(
        name in placeholder_name_strategy(),
        prefix in plain_text_strategy(),
        suffix in plain_text_strategy(),
    ) {
        let document = format!("{{\"m\": \"{prefix}{{{name}}}{suffix}\"}}");
        let (list, errors) = Parser::new().parse(&document);
        prop_assert!(errors.is_empty());

        let placeholders = list.get_placeholders();
        prop_assert_eq!(placeholders.len(), 1);
        let span = placeholders[0].span;
        prop_assert_eq!(&document[span.start..span.end], name.as_str());
    }

    #[test]
    fn escaped_document_spans_stay_on_raw_source(
        name in placeholder_name_strategy(),
        pieces in prop::collection::vec(escape_piece_strategy(), 0..8),
    ) {
        let raw_prefix: String = pieces.concat();
        let document = format!("{{\"m\": \"{raw_prefix}{{{name}}}\"}}");
        let (list, errors) = Parser::new().parse(&document);
        prop_assert!(errors.is_empty());

        let placeholders = list.get_placeholders();
        prop_assert_eq!(placeholders.len(), 1);
        let span = placeholders[0].span;
        prop_assert_eq!(&document[span.start..span.end], name.as_str());
    }

    #[test]
    fn parse_is_total(document in "\\PC{0,60}") {
        // Any input at all: parse returns instead of panicking.
        let (_, _) = Parser::new().parse(&document);
    }
}
