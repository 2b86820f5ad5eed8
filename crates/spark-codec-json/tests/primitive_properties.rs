//! 追加原语与转义扫描器的性质测试。
//!
//! - 转义扫描：字并行实现与逐字节参考实现在 0..=100 字节的随机输入上逐一相等，
//!   且“无需转义”当且仅当每个字节都在 `[0x20, 0x7f]` 且不是 `"` 或 `\`；
//! - 追加原语：输出交给 `serde_json` 解码后与输入值相等。

use proptest::prelude::*;
use serde_json::Value;
use spark_codec_json::append::{
    append_bool, append_float, append_hex_bytes, append_int, append_string, append_string_bytes,
    append_uint,
};
use spark_codec_json::escape::{escape_index, escape_index_scalar};

fn decode(buf: &[u8]) -> Value {
    serde_json::from_slice(buf).expect("primitive output is valid JSON")
}

fn printable_biased() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        prop_oneof![
            8 => 0x20u8..0x7f,
            1 => any::<u8>(),
        ],
        0..=100,
    )
}

proptest! {
    #[test]
    fn scanner_matches_reference(bytes in printable_biased()) {
        let fast = escape_index(&bytes);
        prop_assert_eq!(fast, escape_index_scalar(&bytes));
        let clean = bytes
            .iter()
            .all(|&b| (0x20..=0x7f).contains(&b) && b != b'"' && b != b'\\');
        prop_assert_eq!(fast.is_none(), clean);
    }

    #[test]
    fn integers_round_trip(n in any::<i64>(), u in any::<u64>()) {
        let mut buf = Vec::new();
        append_int(&mut buf, n);
        prop_assert_eq!(decode(&buf).as_i64(), Some(n));
        buf.clear();
        append_uint(&mut buf, u);
        prop_assert_eq!(decode(&buf).as_u64(), Some(u));
    }

    #[test]
    fn finite_floats_round_trip(v in any::<f64>().prop_filter("finite", |v| v.is_finite())) {
        let mut buf = Vec::new();
        append_float(&mut buf, v);
        prop_assert_eq!(decode(&buf).as_f64(), Some(v));
    }

    #[test]
    fn strings_round_trip(s in any::<String>()) {
        let mut buf = Vec::new();
        append_string(&mut buf, &s);
        prop_assert_eq!(decode(&buf), Value::String(s));
    }

    #[test]
    fn arbitrary_bytes_decode_to_lossy_text(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut buf = Vec::new();
        append_string_bytes(&mut buf, &bytes);
        let expected = String::from_utf8_lossy(&bytes).into_owned();
        // 逐字节替换可能比 lossy 解码产生更多 U+FFFD，因此只比较去掉替换字符后的文本。
        let decoded = decode(&buf);
        let text = decoded.as_str().expect("string");
        prop_assert_eq!(
            text.replace('\u{fffd}', ""),
            expected.replace('\u{fffd}', "")
        );
    }

    #[test]
    fn bools_and_hex_round_trip(b in any::<bool>(), bytes in prop::collection::vec(any::<u8>(), 0..32)) {
        let mut buf = Vec::new();
        append_bool(&mut buf, b);
        prop_assert_eq!(decode(&buf), Value::Bool(b));
        buf.clear();
        append_hex_bytes(&mut buf, &bytes);
        prop_assert_eq!(decode(&buf), Value::String(hex::encode(&bytes)));
    }
}
