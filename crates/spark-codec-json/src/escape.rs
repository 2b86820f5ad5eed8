//! 字符串转义扫描器。
//!
//! # 模块定位（Why）
//! - [`append_string`](crate::append::append_string) 的绝大多数输入是纯 ASCII 标识符、哈希与地址，
//!   无需任何转义；先定位首个需转义字节，可让无转义的字符串走整段拷贝的快路径。
//!
//! # 实现策略（How）
//! - 启用 `swar` Feature 时，按 8 字节字读取（`u64::from_le_bytes`，不做指针别名），用位运算
//!   同时判定“小于 0x20”“等于 `"`”“等于 `\\`”“最高位为 1”四个条件，命中后以
//!   `trailing_zeros / 8` 求出字内偏移；尾部不足 8 字节的部分逐字节查表；
//! - 关闭 `swar` 时整串逐字节查表。
//!
//! # 契约说明（What）
//! - [`escape_index`] 与 [`escape_index_scalar`] 的结果必须逐字节等价，属性测试覆盖该等价性；
//! - [`html_escape_index`] 额外把 `<`、`>`、`&` 视为需转义字节，供字符串编码使用。
//!
//! # 正确性说明
//! - 小端装载保证字内低位字节对应字符串中更靠前的位置；首个命中字节之前的字节都在
//!   `[0x20, 0x7f]` 且不等于比较目标，减法不会产生借位，因此首个置位的 MSB 一定对应首个命中字节，
//!   之后字节上的借位误报不影响结果。

#[cfg(feature = "swar")]
const LSB: u64 = 0x0101_0101_0101_0101;
#[cfg(feature = "swar")]
const MSB: u64 = 0x8080_8080_8080_8080;

/// JSON 字符串中必须转义（或需进入慢路径校验 UTF-8）的字节表。
static NEEDS_ESCAPE: [bool; 256] = build_table(false);

/// 在 [`NEEDS_ESCAPE`] 基础上追加 `<`、`>`、`&` 的字节表。
static NEEDS_HTML_ESCAPE: [bool; 256] = build_table(true);

const fn build_table(html: bool) -> [bool; 256] {
    let mut table = [false; 256];
    let mut i = 0;
    while i < 256 {
        let byte = i as u8;
        table[i] = byte < 0x20 || byte >= 0x80 || byte == b'"' || byte == b'\\';
        if html && (byte == b'<' || byte == b'>' || byte == b'&') {
            table[i] = true;
        }
        i += 1;
    }
    table
}

/// 返回 `s` 中首个需要转义的字节下标；若整串可原样写出则返回 `None`。
///
/// 需要转义的字节：控制字符（`< 0x20`）、`"`、`\`，以及 `>= 0x80` 的字节（交给慢路径校验
/// UTF-8 与 U+2028/U+2029）。
#[inline]
pub fn escape_index(s: &[u8]) -> Option<usize> {
    #[cfg(feature = "swar")]
    {
        scan_words::<false>(s)
    }
    #[cfg(not(feature = "swar"))]
    {
        escape_index_scalar(s)
    }
}

/// 与 [`escape_index`] 相同，但同时命中 `<`、`>`、`&`。
#[inline]
pub fn html_escape_index(s: &[u8]) -> Option<usize> {
    #[cfg(feature = "swar")]
    {
        scan_words::<true>(s)
    }
    #[cfg(not(feature = "swar"))]
    {
        html_escape_index_scalar(s)
    }
}

/// 逐字节实现的参考版本。
pub fn escape_index_scalar(s: &[u8]) -> Option<usize> {
    s.iter().position(|&byte| NEEDS_ESCAPE[byte as usize])
}

/// [`html_escape_index`] 的逐字节参考版本。
pub fn html_escape_index_scalar(s: &[u8]) -> Option<usize> {
    s.iter().position(|&byte| NEEDS_HTML_ESCAPE[byte as usize])
}

#[cfg(feature = "swar")]
fn scan_words<const HTML: bool>(s: &[u8]) -> Option<usize> {
    let (words, tail) = s.as_chunks::<8>();
    for (index, word) in words.iter().enumerate() {
        let n = u64::from_le_bytes(*word);
        let mut mask = n | below(n, 0x20) | contains(n, b'"') | contains(n, b'\\');
        if HTML {
            mask |= contains(n, b'<') | contains(n, b'>') | contains(n, b'&');
        }
        let hits = mask & MSB;
        if hits != 0 {
            return Some(index * 8 + (hits.trailing_zeros() / 8) as usize);
        }
    }
    let table = if HTML {
        &NEEDS_HTML_ESCAPE
    } else {
        &NEEDS_ESCAPE
    };
    let offset = words.len() * 8;
    tail.iter()
        .position(|&byte| table[byte as usize])
        .map(|pos| offset + pos)
}

/// 将单字节复制到 `u64` 的 8 个字节中。
#[cfg(feature = "swar")]
#[inline(always)]
const fn expand(b: u8) -> u64 {
    LSB * b as u64
}

/// 字节小于 `b` 时对应 MSB 置位；仅在 `b` 与该字节均 `< 0x80` 时成立。
#[cfg(feature = "swar")]
#[inline(always)]
const fn below(n: u64, b: u8) -> u64 {
    n.wrapping_sub(expand(b))
}

/// 字节等于 `b` 时对应 MSB 置位；仅在 `b` 与该字节均 `< 0x80` 时成立。
#[cfg(feature = "swar")]
#[inline(always)]
const fn contains(n: u64, b: u8) -> u64 {
    (n ^ expand(b)).wrapping_sub(LSB)
}
