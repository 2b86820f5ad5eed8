//! 整数与浮点数的十进制格式化。
//!
//! - 整数：`< 10` 直接写一个字符，`< 100` 查两位数字表；其余情况在栈上的暂存区中从低位开始
//!   每次剥离两位十进制数字，最后整段拷贝；负数先格式化绝对值再补 `-`。
//! - 两位数字表是编译期常量字节表，按字节寻址，与目标平台字节序无关，无需运行期初始化。
//! - 浮点：最短可往返表示；`|v| < 1e-6` 或 `|v| >= 1e21`（且非零）时用科学计数法，其余用定点。

use core::fmt::{self, Write as _};

/// `"00" "01" ... "99"` 的平铺字节表，第 `n` 对位于 `[2n, 2n + 2)`。
static DIGIT_PAIRS: [u8; 200] = build_digit_pairs();

/// `u64::MAX` 共 20 位十进制数字，再预留 1 位给负号。
const SCRATCH_LEN: usize = 21;

const fn build_digit_pairs() -> [u8; 200] {
    let mut table = [0u8; 200];
    let mut n = 0;
    while n < 100 {
        table[n * 2] = b'0' + (n / 10) as u8;
        table[n * 2 + 1] = b'0' + (n % 10) as u8;
        n += 1;
    }
    table
}

#[inline(always)]
fn pair(n: u64) -> &'static [u8] {
    let at = n as usize * 2;
    &DIGIT_PAIRS[at..at + 2]
}

/// 将 `n` 写入暂存区末尾，返回首个有效字节的下标。
#[inline]
fn format_magnitude(scratch: &mut [u8; SCRATCH_LEN], mut n: u64) -> usize {
    let mut pos = SCRATCH_LEN;
    while n >= 100 {
        let low = n % 100;
        n /= 100;
        pos -= 2;
        scratch[pos..pos + 2].copy_from_slice(pair(low));
    }
    if n < 10 {
        pos -= 1;
        scratch[pos] = b'0' + n as u8;
    } else {
        pos -= 2;
        scratch[pos..pos + 2].copy_from_slice(pair(n));
    }
    pos
}

/// 追加无符号整数的最短十进制表示。
pub fn append_uint(buf: &mut Vec<u8>, n: u64) {
    if n < 10 {
        buf.push(b'0' + n as u8);
        return;
    }
    if n < 100 {
        buf.extend_from_slice(pair(n));
        return;
    }
    let mut scratch = [0u8; SCRATCH_LEN];
    let start = format_magnitude(&mut scratch, n);
    buf.extend_from_slice(&scratch[start..]);
}

/// 追加有符号整数的最短十进制表示，仅负数带 `-`。
pub fn append_int(buf: &mut Vec<u8>, n: i64) {
    if n >= 0 {
        return append_uint(buf, n as u64);
    }
    let mut scratch = [0u8; SCRATCH_LEN];
    let mut start = format_magnitude(&mut scratch, n.unsigned_abs());
    start -= 1;
    scratch[start] = b'-';
    buf.extend_from_slice(&scratch[start..]);
}

/// 追加浮点数的最短可往返十进制表示。
///
/// 非有限值不属于 JSON 的取值域，写出 `null`。
pub fn append_float(buf: &mut Vec<u8>, value: f64) {
    if !value.is_finite() {
        super::append_null(buf);
        return;
    }
    let abs = value.abs();
    if abs != 0.0 && (abs < 1e-6 || abs >= 1e21) {
        append_scientific(buf, value);
    } else {
        append_display(buf, format_args!("{value}"));
    }
}

/// 以 `1.5e-7` / `1e+21` 形式写出：尾数取 `LowerExp` 的最短表示，指数总带符号。
fn append_scientific(buf: &mut Vec<u8>, value: f64) {
    let start = buf.len();
    append_display(buf, format_args!("{value:e}"));
    if let Some(at) = buf[start..].iter().position(|&b| b == b'e') {
        let sign = start + at + 1;
        if buf.get(sign) != Some(&b'-') {
            buf.insert(sign, b'+');
        }
    }
}

/// 把格式化结果直接追加到 `buf`。
///
/// `VecSink::write_str` 恒返回 `Ok`，而 f64 的 `Display`/`LowerExp` 只会转发写入端的错误，
/// 因此该写入不会失败。
fn append_display(buf: &mut Vec<u8>, args: fmt::Arguments<'_>) {
    let written = VecSink(buf).write_fmt(args);
    debug_assert!(written.is_ok(), "VecSink never fails");
}

struct VecSink<'a>(&'a mut Vec<u8>);

impl fmt::Write for VecSink<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.extend_from_slice(s.as_bytes());
        Ok(())
    }
}
