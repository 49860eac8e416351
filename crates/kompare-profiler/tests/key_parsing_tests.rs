//! Table-driven checks of notification key handling.

use kompare_profiler::{decode_notification_key, parse_key, KeyRejected};

struct ParseCase {
    name: &'static str,
    raw: &'static str,
    expected: Result<(&'static str, &'static str, &'static str, &'static str), &'static str>,
}

#[test]
fn test_notification_keys() {
    let cases = vec![
        ParseCase {
            name: "plain csv",
            raw: "INPUT/u1/f1/data.csv",
            expected: Ok(("u1", "f1", "data", "csv")),
        },
        ParseCase {
            name: "plus is a space",
            raw: "INPUT/u1/f1/my+data.csv",
            expected: Ok(("u1", "f1", "my data", "csv")),
        },
        ParseCase {
            name: "percent escapes",
            raw: "INPUT/user%40example.com/f1/q%231.psv",
            expected: Ok(("user@example.com", "f1", "q#1", "psv")),
        },
        ParseCase {
            name: "last dot splits extension",
            raw: "INPUT/u1/f1/data.v2.json",
            expected: Ok(("u1", "f1", "data.v2", "json")),
        },
        ParseCase {
            name: "no extension",
            raw: "INPUT/u1/f1/README",
            expected: Ok(("u1", "f1", "README", "")),
        },
        ParseCase {
            name: "too few segments",
            raw: "INPUT/bad",
            expected: Err("malformed-path"),
        },
        ParseCase {
            name: "too many segments",
            raw: "INPUT/u1/f1/extra/data.csv",
            expected: Err("malformed-path"),
        },
        ParseCase {
            name: "empty group",
            raw: "INPUT/u1//data.csv",
            expected: Err("malformed-path"),
        },
        ParseCase {
            name: "other prefix",
            raw: "REPORTS/u1/f1/data.csv",
            expected: Err("wrong-prefix"),
        },
        ParseCase {
            name: "prefix is case sensitive",
            raw: "input/u1/f1/data.csv",
            expected: Err("wrong-prefix"),
        },
        ParseCase {
            name: "broken escape",
            raw: "INPUT/u1/f1/%FF.csv",
            expected: Err("undecodable-key"),
        },
    ];

    for case in cases {
        let outcome = decode_notification_key(case.raw)
            .and_then(|decoded| parse_key(&decoded, "INPUT/"));

        match (outcome, case.expected) {
            (Ok(identity), Ok((owner, group, base, ext))) => {
                assert_eq!(identity.owner_id, owner, "case: {}", case.name);
                assert_eq!(identity.group_id, group, "case: {}", case.name);
                assert_eq!(identity.base_name, base, "case: {}", case.name);
                assert_eq!(identity.extension, ext, "case: {}", case.name);
            }
            (Err(rejected), Err(reason)) => {
                assert_eq!(rejected.reason(), reason, "case: {}", case.name);
            }
            (outcome, expected) => panic!(
                "case {}: got {:?}, expected {:?}",
                case.name, outcome, expected
            ),
        }
    }
}

#[test]
fn test_rejection_messages_name_the_problem() {
    let err = parse_key("OTHER/u1/f1/a.csv", "INPUT/").unwrap_err();
    assert!(matches!(err, KeyRejected::WrongPrefix { ref prefix } if prefix == "INPUT/"));
    assert!(err.to_string().contains("INPUT/"));
}
