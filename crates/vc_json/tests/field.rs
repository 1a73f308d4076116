use serde::{Deserialize, Serialize};
use vc_json::Error;
use vc_json::derive::FieldEnum;
use vc_json::field::{FieldEnumCodec, FieldTable};

// -----------------------------------------------------------------------------
// Derived flags

#[derive(FieldEnum, Clone, Copy, PartialEq, Eq, Debug)]
#[field_enum(flags, serde)]
enum Mask {
    #[field(value = "value_0")]
    Value0 = 0,
    #[field(value = "value_1")]
    Value1 = 1,
    #[field(value = "value_2")]
    Value2 = 2,
    #[field(value = "value_4")]
    Value4 = 4,
    #[field(value = "value_6")]
    Value6 = 6,
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
struct Row {
    mask: Mask,
}

#[test]
fn derived_flags() {
    let codec = FieldEnumCodec::<Mask>::new();
    assert_eq!(codec.write(Mask::Value6).unwrap(), "value_6");
    assert_eq!(codec.read("value_2,value_4").unwrap(), Mask::Value6);
    assert_eq!(codec.write(Mask::Value0).unwrap(), "value_0");
    assert_eq!(codec.read("value_0").unwrap(), Mask::Value0);
    assert!(matches!(codec.read(""), Err(Error::UnknownToken { .. })));
    assert!(matches!(
        codec.read("value_1,value_2"),
        Err(Error::UnmappedValue { bits: 3, .. })
    ));

    let text = serde_json::to_string(&Row { mask: Mask::Value6 }).unwrap();
    assert_eq!(text, r#"{"mask":"value_6"}"#);
    assert_eq!(
        serde_json::from_str::<Row>(r#"{"mask":"value_4,value_2"}"#).unwrap(),
        Row { mask: Mask::Value6 }
    );
    assert!(serde_json::from_str::<Row>(r#"{"mask":"value_3"}"#).is_err());
    assert!(serde_json::from_str::<Row>(r#"{"mask":6}"#).is_err());
}

// -----------------------------------------------------------------------------
// Derived plain enum

#[derive(FieldEnum, Clone, Copy, PartialEq, Debug)]
#[field_enum(serde)]
enum Mode {
    #[field(value = "none")]
    None,
    Other,
    #[field(ignore)]
    Hidden,
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
struct Settings {
    mode: Mode,
    #[serde(with = "vc_json::field::as_token::option")]
    fallback: Option<Mode>,
}

#[test]
fn derived_plain() {
    let table = FieldTable::<Mode>::of();
    let tokens: Vec<&str> = table.entries().iter().map(|entry| entry.token).collect();
    assert_eq!(tokens, ["none", "Other"]);

    let codec = FieldEnumCodec::<Mode>::new();
    assert_eq!(codec.write(Mode::Other).unwrap(), "Other");
    assert!(matches!(codec.write(Mode::Hidden), Err(Error::UnmappedValue { .. })));
    assert!(matches!(codec.read("Hidden"), Err(Error::UnknownToken { .. })));
    assert!(matches!(codec.read("None"), Err(Error::UnknownToken { .. })));

    let settings = Settings {
        mode: Mode::None,
        fallback: None,
    };
    let text = serde_json::to_string(&settings).unwrap();
    assert_eq!(text, r#"{"mode":"none","fallback":null}"#);
    assert_eq!(serde_json::from_str::<Settings>(&text).unwrap(), settings);

    let back: Settings = serde_json::from_str(r#"{"mode":"Other","fallback":"none"}"#).unwrap();
    assert_eq!(back.fallback, Some(Mode::None));
}
