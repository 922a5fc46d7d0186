use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use toon_gateway::conversion::{
    Codec, ConversionOptions, DecodeOptions, DelimiterType, EncodeOptions, KeyFoldingMode,
    PathExpansionMode, ToonCodec,
};
use toon_gateway::formatter::format_to_toon;
use toon_gateway::parser::parse_toon;
use toon_gateway::{decode_toon, encode_json, ToonError};

fn round_trip(value: &Value, encode: &EncodeOptions, decode: &DecodeOptions) {
    let toon = format_to_toon(value, encode).unwrap();
    let back = parse_toon(&toon, decode).unwrap();
    assert_eq!(&back, value, "TOON was:\n{}", toon);
}

#[test]
fn test_realistic_document() {
    let value = json!({
        "context": {
            "task": "Our favorite hikes together",
            "location": "Boulder",
            "season": "spring_2025"
        },
        "friends": ["ana", "luis", "sam"],
        "hikes": [
            {"id": 1, "name": "Blue Lake Trail", "distanceKm": 7.5, "wasSunny": true},
            {"id": 2, "name": "Ridge Overlook", "distanceKm": 9.2, "wasSunny": false}
        ]
    });

    let toon = encode_json(&value).unwrap();
    assert_eq!(
        toon,
        "context:\n  task: Our favorite hikes together\n  location: Boulder\n  season: spring_2025\n\
         friends[3]: ana,luis,sam\n\
         hikes[2]{id,name,distanceKm,wasSunny}:\n  1,Blue Lake Trail,7.5,true\n  2,Ridge Overlook,9.2,false"
    );
    assert_eq!(decode_toon(&toon).unwrap(), value);
}

#[test]
fn test_awkward_strings_round_trip() {
    let value = json!({
        "empty": "",
        "padded": "  x  ",
        "keyword": "null",
        "numeric": "007",
        "dash": "-5",
        "list": "- item",
        "colon": "a: b",
        "quote": "say \"hi\"",
        "slash": "C:\\temp",
        "newline": "one\ntwo",
        "unicode": "héllo 🌍",
        "comma": "a,b",
        "tags": ["x,y", "", "true", " "]
    });
    round_trip(&value, &EncodeOptions::default(), &DecodeOptions::default());
}

#[test]
fn test_awkward_keys_round_trip() {
    let value = json!({
        "first name": 1,
        "1st": 2,
        "": 3,
        "a:b": 4,
        "rows": [{"my key": 1, "x": 2}]
    });
    round_trip(&value, &EncodeOptions::default(), &DecodeOptions::default());
}

#[test]
fn test_every_delimiter_round_trips() {
    let value = json!({
        "tags": ["a|b", "c\td", "e,f", "g;h"],
        "rows": [{"a": "x|y", "b": "1,2"}, {"a": "z", "b": "w\tv"}]
    });

    for delimiter in [
        DelimiterType::Comma,
        DelimiterType::Tab,
        DelimiterType::Pipe,
        DelimiterType::Other(';'),
    ] {
        let options = EncodeOptions::new().with_delimiter(delimiter);
        round_trip(&value, &options, &DecodeOptions::default());
    }
}

#[test]
fn test_nested_lists_round_trip() {
    let value = json!({
        "matrix": [[1, 2], [3, 4], []],
        "mixed": [1, "two", {"three": 3}, [4], null, {}],
        "objects": [
            {"name": "a", "children": [{"id": 1}, {"id": 2}], "meta": {"x": 1}},
            {"deep": {"deeper": {"deepest": [true, false]}}}
        ],
        "empty_array": [],
        "empty_object": {}
    });
    round_trip(&value, &EncodeOptions::default(), &DecodeOptions::default());
    round_trip(
        &value,
        &EncodeOptions::new().with_indent(4),
        &DecodeOptions::new().with_indent(4),
    );
}

#[test]
fn test_root_values_round_trip() {
    for value in [
        json!([]),
        json!([1, 2]),
        json!([{"a": 1}, {"a": 2}]),
        json!([[1], {"b": 2}]),
        json!("text"),
        json!(""),
        json!(-12),
        json!(3.25),
        json!(true),
        json!(null),
        json!({}),
    ] {
        round_trip(&value, &EncodeOptions::default(), &DecodeOptions::default());
    }
}

#[test]
fn test_folding_round_trips_with_path_expansion() {
    let value = json!({
        "server": {"http": {"port": 8080}},
        "db": {"primary": {"host": "a", "port": 5432}},
        "literal.dotted": 1
    });
    let encode = EncodeOptions::new().with_key_folding(KeyFoldingMode::Safe);
    let decode = DecodeOptions::new().with_expand_paths(PathExpansionMode::Safe);

    let toon = format_to_toon(&value, &encode).unwrap();
    assert!(toon.starts_with("server.http.port: 8080\ndb.primary:\n"));
    assert!(toon.contains("\"literal.dotted\": 1"));
    assert_eq!(parse_toon(&toon, &decode).unwrap(), value);
}

#[test]
fn test_codec_trait_through_options_bag() {
    let codec = ToonCodec::new();
    let bag = ConversionOptions::new()
        .with("delimiter", "\t")
        .with("keyFolding", "safe")
        .with("flattenDepth", 2);

    let toon = codec
        .encode(&json!({"a": {"b": {"c": [1, 2]}}}), &bag)
        .unwrap();
    assert_eq!(toon, "a.b:\n  c[2\t]: 1\t2");

    let decoded = codec
        .decode(&toon, &ConversionOptions::new().with("expandPaths", "safe"))
        .unwrap();
    assert_eq!(decoded, json!({"a": {"b": {"c": [1, 2]}}}));
}

#[test]
fn test_lenient_decoding_accepts_miscounts() {
    let bag = ConversionOptions::new().with("strict", false);
    let value = ToonCodec::new()
        .decode("items[5]: a,b\nrows[1]{x,y}:\n  1\n  2,3", &bag)
        .unwrap();
    assert_eq!(
        value,
        json!({"items": ["a", "b"], "rows": [{"x": 1}, {"x": 2, "y": 3}]})
    );
}

#[test]
fn test_decode_errors_report_lines() {
    let cases = [
        ("a: 1\nb:\n   c: 2", 3),
        ("a: \"unterminated", 1),
        ("list[2]:\n  - 1\n  - 2\n  - 3", 1),
        ("x: 1\n\"bad\\q\": 2", 2),
    ];
    for (text, expected_line) in cases {
        match decode_toon(text) {
            Err(ToonError::Parse { line, .. }) => assert_eq!(line, expected_line, "{}", text),
            other => panic!("expected parse error for {:?}, got {:?}", text, other),
        }
    }
}
