//! Tests for the JSON round-trip implementations.

#[cfg(test)]
mod tests {
    use crate::codec;
    use crate::hash::FNV_OFFSET_BASIS;
    use crate::params::JsonParseParams;
    use crate::tasks::json_parse::code::*;

    #[test]
    fn test_generation_uses_lcg_stream() {
        let records = generate_records(3, 12345);
        let values: Vec<i32> = records.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![87_628_868, 71_072_467, -1_962_130_922]);
        assert_eq!(records[0].name, "a1");
        assert_eq!(records[2].id, 3);
        assert!(records[0].flag, "even value sets the flag");
        assert!(!records[1].flag);
    }

    #[test]
    fn test_serialization_format() {
        let records = generate_records(2, 12345);
        assert_eq!(
            serialize_records(&records),
            r#"[{"id":1,"value":87628868,"flag":true,"name":"a1"},{"id":2,"value":71072467,"flag":false,"name":"a2"}]"#
        );
        assert_eq!(serialize_records(&[]), "[]");
    }

    #[test]
    fn test_parse_round_trip() {
        let records = generate_records(50, 99);
        let parsed = parse_records(&serialize_records(&records)).unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn test_parser_accepts_whitespace_and_any_field_order() {
        let json = "[ {\"name\" : \"x\\ty\", \"flag\": false,\n \"value\": -7, \"id\": 9} ]";
        let parsed = parse_records(json).unwrap();
        assert_eq!(
            parsed,
            vec![JsonRecord {
                id: 9,
                value: -7,
                flag: false,
                name: "x\ty".to_string()
            }]
        );
        assert!(parse_records(" [ ] ").unwrap().is_empty());
    }

    #[test]
    fn test_parser_errors() {
        assert!(matches!(parse_records("invalid"), Err(ParseError::Expected { .. })));
        assert!(matches!(
            parse_records(r#"[{"id":1}]"#),
            Err(ParseError::MissingField { field: "value" })
        ));
        assert!(matches!(
            parse_records(r#"[{"id":1,"value":2,"flag":true,"name":"a","extra":1}]"#),
            Err(ParseError::UnknownField { .. })
        ));
        assert!(matches!(
            parse_records(r#"[{"id":1,"id":2,"value":2,"flag":true,"name":"a"}]"#),
            Err(ParseError::DuplicateField { field: "id" })
        ));
        assert!(matches!(
            parse_records(r#"[{"id":1,"value":2,"flag":true,"name":"a"},]"#),
            Err(ParseError::Expected { .. })
        ));
        assert!(matches!(
            parse_records(r#"[{"id":1,"value":2147483648,"flag":true,"name":"a"}]"#),
            Err(ParseError::InvalidNumber { .. })
        ));
        assert!(matches!(
            parse_records(r#"[{"id":1,"value":1.5,"flag":true,"name":"a"}]"#),
            Err(ParseError::InvalidNumber { .. })
        ));
        assert!(matches!(
            parse_records(r#"[{"id":1,"value":2,"flag":true,"name":"a\u0041"}]"#),
            Err(ParseError::InvalidString { .. })
        ));
        assert!(matches!(parse_records("[] x"), Err(ParseError::TrailingContent { .. })));
        assert!(matches!(parse_records("["), Err(ParseError::UnexpectedEnd { .. })));
    }

    #[test]
    fn test_hash_of_no_records_is_offset_basis() {
        assert_eq!(hash_records(&[]), FNV_OFFSET_BASIS);
    }

    #[test]
    fn test_golden_hashes() {
        let hash = |record_count, seed| compute_hash(&JsonParseParams { record_count, seed });
        assert_eq!(hash(1, 12345), 2_570_755_639);
        assert_eq!(hash(3, 12345), 3_717_881_004);
        assert_eq!(hash(2, 1), 145_240_963);
        assert_eq!(hash(10, 1), 315_923_459);
    }

    #[test]
    fn test_invalid_record_counts_hash_zero() {
        assert_eq!(compute_hash(&JsonParseParams { record_count: 0, seed: 1 }), 0);
        assert_eq!(compute_hash(&JsonParseParams { record_count: 1_000_001, seed: 1 }), 0);
        assert_eq!(json_parse_run_task(&[1, 0, 0]), 0);
    }

    #[test]
    fn test_c_matches_rust() {
        if !C_IMPL_AVAILABLE {
            return;
        }
        for (record_count, seed) in [(1, 12345), (10, 1), (257, u32::MAX), (0, 5)] {
            let bytes = codec::encode(&JsonParseParams { record_count, seed }.into());
            assert_eq!(json_parse_c_run_task(&bytes), json_parse_run_task(&bytes));
        }
    }
}
