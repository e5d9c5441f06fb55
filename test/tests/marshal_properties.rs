/// PROPERTY-BASED TESTS: wire encoding invariants
///
/// Uses proptest to verify the marshaling laws across random inputs.
///
/// Key invariants:
/// 1. decode(encode(v)) == v for every TypeCode, under both float encodings
/// 2. A whole argument list decodes back in order and consumes exactly its bytes
/// 3. Truncated input always fails with a MarshalError, never hangs or panics
/// 4. Signature strings parse back to what they display

use std::io::Cursor;

use proptest::prelude::*;
use modbox_shared::{
    ArgValue, FloatEncoding, MarshalConfig, MarshalError, Marshaler, Signature, TypeCode,
};

fn marshaler(float_encoding: FloatEncoding) -> Marshaler {
    Marshaler::new(&MarshalConfig {
        float_encoding,
        ..MarshalConfig::default()
    })
}

// Strategy for either float encoding
fn float_encoding_strategy() -> impl Strategy<Value = FloatEncoding> {
    prop_oneof![Just(FloatEncoding::Text), Just(FloatEncoding::Ieee754)]
}

// Strategy for values of every TypeCode, boundaries included. NaN is left
// out because it never compares equal to itself.
fn arg_value_strategy() -> impl Strategy<Value = ArgValue> {
    prop_oneof![
        prop_oneof![Just(0u64), Just(u64::MAX), any::<u64>()].prop_map(ArgValue::U64),
        prop_oneof![Just(i64::MIN), Just(0i64), Just(i64::MAX), any::<i64>()].prop_map(ArgValue::I64),
        prop_oneof![
            Just(f32::INFINITY),
            Just(f32::NEG_INFINITY),
            Just(f32::MIN_POSITIVE),
            any::<f32>().prop_filter("NaN", |value| !value.is_nan()),
        ]
        .prop_map(ArgValue::F32),
        prop_oneof![
            Just(f64::MAX),
            Just(-0.0f64),
            any::<f64>().prop_filter("NaN", |value| !value.is_nan()),
        ]
        .prop_map(ArgValue::F64),
        ".*".prop_map(ArgValue::Str),
        any::<bool>().prop_map(ArgValue::Bool),
    ]
}

fn signature_of(values: &[ArgValue]) -> Signature {
    values.iter().map(ArgValue::type_code).collect::<Vec<TypeCode>>().into()
}

proptest! {
    /// Test that every single value survives the round trip
    #[test]
    fn prop_single_value_round_trip(
        encoding in float_encoding_strategy(),
        value in arg_value_strategy(),
    ) {
        let marshaler = marshaler(encoding);
        let bytes = marshaler.to_bytes(&value).unwrap();
        let mut reader = Cursor::new(bytes);
        let decoded = marshaler.decode(value.type_code(), &mut reader).unwrap();

        prop_assert_eq!(&decoded, &value);
        prop_assert_eq!(reader.position() as usize, reader.get_ref().len());
    }

    /// Test that an argument list decodes per its signature, in order
    #[test]
    fn prop_argument_list_round_trip(
        encoding in float_encoding_strategy(),
        values in prop::collection::vec(arg_value_strategy(), 0..12),
    ) {
        let marshaler = marshaler(encoding);
        let signature = signature_of(&values);

        let mut bytes = Vec::new();
        marshaler.encode_all(&signature, &values, &mut bytes).unwrap();
        let mut reader = Cursor::new(bytes);
        let decoded = marshaler.decode_all(&signature, &mut reader).unwrap();

        prop_assert_eq!(decoded, values);
        prop_assert_eq!(reader.position() as usize, reader.get_ref().len());
    }

    /// Test that any strict prefix of an encoded value is rejected
    #[test]
    fn prop_truncated_input_fails(
        encoding in float_encoding_strategy(),
        value in arg_value_strategy(),
        cut in any::<prop::sample::Index>(),
    ) {
        let marshaler = marshaler(encoding);
        let bytes = marshaler.to_bytes(&value).unwrap();
        let keep = cut.index(bytes.len());

        let result = marshaler.decode(value.type_code(), &mut Cursor::new(&bytes[..keep]));
        prop_assert_eq!(result, Err(MarshalError::UnexpectedEof));
    }

    /// Test that strings whose content looks like a length prefix are not confused for one
    #[test]
    fn prop_string_containing_its_own_length(prefix_len in 0u64..64) {
        let marshaler = Marshaler::default();
        let content: String = String::from_utf8_lossy(&prefix_len.to_be_bytes()).into_owned();
        let value = ArgValue::Str(content.repeat(2));

        let bytes = marshaler.to_bytes(&value).unwrap();
        let decoded = marshaler.decode(TypeCode::Str, &mut Cursor::new(bytes)).unwrap();
        prop_assert_eq!(decoded, value);
    }

    /// Test that signature strings display back to themselves
    #[test]
    fn prop_signature_text_round_trip(text in "[uifdsb]{0,16}") {
        let signature: Signature = text.parse().unwrap();
        prop_assert_eq!(signature.len(), text.len());
        prop_assert_eq!(signature.to_string(), text);
    }
}
