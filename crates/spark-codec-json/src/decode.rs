//! 响应解码前的原始字节缓冲。
//!
//! # 模块定位（Why）
//! - 逐字段解码逻辑（不在本 crate 内）需要一段可重复使用、以 NUL 结尾的连续字节：
//!   末尾哨兵让扫描循环无需在每一步检查越界。
//!
//! # 契约说明（What）
//! - 任何 `reset_*` 之后，`as_bytes_with_nul()` 的最后一个字节都是 `0`，
//!   `as_bytes()` 不包含该哨兵；游标与标记起点都归零；
//! - [`DecodeBuffer::reset_from_reader`] 按值接管读取源，任何返回路径上都会释放（drop）它；
//!   除 `ErrorKind::Interrupted`（重试）外，读取错误原样返回，此时缓冲为空但仍以 NUL 结尾。

use std::io::{self, ErrorKind, Read};

use tracing::{debug, trace};

const DEFAULT_CAPACITY: usize = 1024;
const MIN_READ: usize = 512;

/// 可复用的 NUL 结尾解码缓冲：字节、游标与标记起点。
#[derive(Clone, Debug)]
pub struct DecodeBuffer {
    buf: Vec<u8>,
    cursor: usize,
    start: usize,
}

impl Default for DecodeBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeBuffer {
    /// 创建带默认容量的空缓冲。
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// 创建至少能容纳 `capacity` 字节内容的空缓冲。
    pub fn with_capacity(capacity: usize) -> Self {
        let mut buf = Vec::with_capacity(capacity + 1);
        buf.push(0);
        Self {
            buf,
            cursor: 0,
            start: 0,
        }
    }

    /// 复制 `data` 并追加 NUL 哨兵，游标归零。
    pub fn reset_from_bytes(&mut self, data: &[u8]) {
        self.buf.clear();
        self.buf.reserve(data.len() + 1);
        self.buf.extend_from_slice(data);
        self.buf.push(0);
        self.rewind();
    }

    /// 读取 `reader` 直至流结束，返回读入的字节数。
    ///
    /// # 教案式说明
    /// - **执行 (How)**：空闲区不足时把缓冲扩大一倍（至少 `MIN_READ`）再读，读到 `Ok(0)` 视为
    ///   正常结束并追加 NUL；
    /// - **错误 (What)**：错误原样返回；缓冲被置为仅含 NUL 的空内容，避免下游误读半截数据；
    /// - **资源**：`reader` 按值传入，函数返回时必然被 drop，文件或套接字随之关闭。
    pub fn reset_from_reader<R: Read>(&mut self, mut reader: R) -> io::Result<usize> {
        self.buf.clear();
        self.rewind();
        let mut len = 0;
        loop {
            if len == self.buf.len() {
                let grow = len.max(MIN_READ);
                self.buf.resize(len + grow, 0);
            }
            match reader.read(&mut self.buf[len..]) {
                Ok(0) => break,
                Ok(n) => len += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    debug!(error = %err, filled = len, "decode buffer fill aborted");
                    self.buf.clear();
                    self.buf.push(0);
                    return Err(err);
                }
            }
        }
        self.buf.truncate(len);
        self.buf.push(0);
        trace!(bytes = len, capacity = self.buf.capacity(), "decode buffer filled");
        Ok(len)
    }

    fn rewind(&mut self) {
        self.cursor = 0;
        self.start = 0;
    }

    /// 内容字节，不含 NUL 哨兵。
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len()]
    }

    /// 内容字节与末尾的 NUL 哨兵。
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.buf
    }

    /// 内容长度。
    pub fn len(&self) -> usize {
        self.buf.len().saturating_sub(1)
    }

    /// 内容是否为空。
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 当前游标。
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// 游标处的字节；游标到达末尾时返回 NUL 哨兵。
    #[inline]
    pub fn peek(&self) -> u8 {
        self.buf.get(self.cursor).copied().unwrap_or(0)
    }

    /// 返回游标处的字节并前移一位，不会越过哨兵。
    #[inline]
    pub fn bump(&mut self) -> u8 {
        let byte = self.peek();
        if self.cursor < self.len() {
            self.cursor += 1;
        }
        byte
    }

    /// 前移 `n` 位，截断到内容末尾。
    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.cursor = (self.cursor + n).min(self.len());
    }

    /// 跳过 JSON 空白（空格、`\t`、`\n`、`\r`）。
    pub fn skip_whitespace(&mut self) {
        while matches!(self.peek(), b' ' | b'\t' | b'\n' | b'\r') {
            self.cursor += 1;
        }
    }

    /// 从游标处开始一个标记区间。
    pub fn mark_start(&mut self) {
        self.start = self.cursor;
    }

    /// 标记起点到游标之间的字节。
    pub fn marked(&self) -> &[u8] {
        &self.buf[self.start..self.cursor]
    }

    /// 游标之后、哨兵之前的剩余字节。
    pub fn remaining(&self) -> &[u8] {
        &self.buf[self.cursor..self.len()]
    }
}
