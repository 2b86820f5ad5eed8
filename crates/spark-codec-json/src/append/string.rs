//! 字符串编码。
//!
//! 快路径：[`html_escape_index`] 判定整串无需转义时，两侧加引号后整段拷贝。
//! 慢路径：从首个需转义字节开始，安全片段整段拷贝，其余字节替换为：
//!
//! | 输入 | 输出 |
//! |------|------|
//! | `"` / `\` | `\"` / `\\` |
//! | `\n` `\r` `\t` | `\n` `\r` `\t` |
//! | 其他控制字符、`<` `>` `&` | `\u00XX` |
//! | 非法 UTF-8 字节 | `\ufffd`（逐字节替换） |
//! | U+2028 / U+2029 | `\u2028` / `\u2029` |

use super::HEX_DIGITS;
use crate::escape::html_escape_index;

/// 追加 JSON 字符串。
#[inline]
pub fn append_string(buf: &mut Vec<u8>, s: &str) {
    append_string_bytes(buf, s.as_bytes());
}

/// 追加任意字节序列形式的 JSON 字符串，非法 UTF-8 以 U+FFFD 修复而非拒绝。
pub fn append_string_bytes(buf: &mut Vec<u8>, s: &[u8]) {
    if s.is_empty() {
        buf.extend_from_slice(b"\"\"");
        return;
    }
    buf.reserve(s.len() + 2);
    buf.push(b'"');
    let Some(first) = html_escape_index(s) else {
        buf.extend_from_slice(s);
        buf.push(b'"');
        return;
    };

    let mut flushed = 0;
    let mut at = first;
    while at < s.len() {
        let byte = s[at];
        if byte < 0x80 {
            let replacement: &[u8] = match byte {
                b'"' => b"\\\"",
                b'\\' => b"\\\\",
                b'\n' => b"\\n",
                b'\r' => b"\\r",
                b'\t' => b"\\t",
                b'<' | b'>' | b'&' => &[],
                0x00..=0x1f => &[],
                _ => {
                    at += 1;
                    continue;
                }
            };
            buf.extend_from_slice(&s[flushed..at]);
            if replacement.is_empty() {
                push_unicode_escape(buf, byte);
            } else {
                buf.extend_from_slice(replacement);
            }
            at += 1;
            flushed = at;
            continue;
        }

        match decode_char(&s[at..]) {
            None => {
                buf.extend_from_slice(&s[flushed..at]);
                buf.extend_from_slice(b"\\ufffd");
                at += 1;
                flushed = at;
            }
            Some((ch @ ('\u{2028}' | '\u{2029}'), width)) => {
                buf.extend_from_slice(&s[flushed..at]);
                buf.extend_from_slice(b"\\u202");
                buf.push(HEX_DIGITS[(ch as u32 & 0x0f) as usize]);
                at += width;
                flushed = at;
            }
            Some((_, width)) => at += width,
        }
    }
    buf.extend_from_slice(&s[flushed..]);
    buf.push(b'"');
}

#[inline]
fn push_unicode_escape(buf: &mut Vec<u8>, byte: u8) {
    buf.extend_from_slice(b"\\u00");
    buf.push(HEX_DIGITS[(byte >> 4) as usize]);
    buf.push(HEX_DIGITS[(byte & 0x0f) as usize]);
}

/// 解码 `s` 开头的一个多字节 UTF-8 字符，返回字符与字节宽度；非法时返回 `None`。
fn decode_char(s: &[u8]) -> Option<(char, usize)> {
    let width = match s.first()? {
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => return None,
    };
    let encoded = s.get(..width)?;
    let ch = core::str::from_utf8(encoded).ok()?.chars().next()?;
    Some((ch, width))
}
