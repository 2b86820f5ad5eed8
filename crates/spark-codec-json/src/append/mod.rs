//! JSON 追加原语。
//!
//! # 模块定位（Why）
//! - 结构化编码契约与 [`MapObject`](crate::MapObject) 都由这里的原语拼装而成；原语直接向调用方持有的
//!   `Vec<u8>` 追加字节，不经过中间 `String` 或反射。
//!
//! # 契约说明（What）
//! - 所有原语在声明的输入域内都是全函数：不会失败，也不会 panic；
//! - 缓冲可能因追加而扩容，调用方应在多次编码之间 `clear()` 复用同一缓冲；
//! - 同一缓冲不得被并发写入，原语不做检测。

mod number;
mod string;

pub use number::{append_float, append_int, append_uint};
pub use string::{append_string, append_string_bytes};

use crate::escape::escape_index;

pub(crate) const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// 追加 `true` / `false`。
#[inline]
pub fn append_bool(buf: &mut Vec<u8>, value: bool) {
    buf.extend_from_slice(if value { b"true" } else { b"false" });
}

/// 追加 `null`。
#[inline]
pub fn append_null(buf: &mut Vec<u8>) {
    buf.extend_from_slice(b"null");
}

/// 以小写十六进制字符串追加字节序列，每字节两个字符，两侧带引号。
pub fn append_hex_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.reserve(bytes.len() * 2 + 2);
    buf.push(b'"');
    for &byte in bytes {
        buf.push(HEX_DIGITS[(byte >> 4) as usize]);
        buf.push(HEX_DIGITS[(byte & 0x0f) as usize]);
    }
    buf.push(b'"');
}

/// 追加对象键 `"key":`。
///
/// 键来自固定 schema，必须是无需转义的可打印 ASCII；调试构建下会断言这一点。
#[inline]
pub fn append_key(buf: &mut Vec<u8>, key: &str) {
    debug_assert!(
        escape_index(key.as_bytes()).is_none(),
        "schema key `{key}` requires escaping"
    );
    buf.reserve(key.len() + 3);
    buf.push(b'"');
    buf.extend_from_slice(key.as_bytes());
    buf.extend_from_slice(b"\":");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_and_hex() {
        let mut buf = Vec::new();
        append_bool(&mut buf, true);
        buf.push(b',');
        append_bool(&mut buf, false);
        buf.push(b',');
        append_null(&mut buf);
        buf.push(b',');
        append_hex_bytes(&mut buf, &[0x00, 0x0f, 0xab, 0xff]);
        buf.push(b',');
        append_hex_bytes(&mut buf, &[]);
        assert_eq!(buf, br#"true,false,null,"000fabff","""#);
    }

    #[test]
    fn key_is_quoted_and_followed_by_colon() {
        let mut buf = b"{".to_vec();
        append_key(&mut buf, "network_identifier");
        assert_eq!(buf, br#"{"network_identifier":"#);
    }
}
