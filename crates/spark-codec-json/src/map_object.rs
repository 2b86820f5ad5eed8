//! 无序字符串键映射的规范编码。
//!
//! # 模块定位（Why）
//! - 元数据等异构映射字段需要参与实体相等性判断与去重；若编码是逻辑内容的纯函数，
//!   相等性即可退化为字节比较。
//!
//! # 规范形式（What）
//! - 各层对象的键都按字节序显式排序，不依赖任何映射类型的迭代顺序；
//! - 无多余空白；字符串、数字沿用 [`append`](crate::append) 原语的输出规则；
//! - 空映射与缺失映射都编码为 `{}`。
//!
//! # 实现策略（How）
//! - 借助 `serde_json` 把任意 `Serialize` 值转为 [`Value`]，再由本模块递归写出；
//!   转换失败时包装为 [`MapObjectError::Encode`] 传播。

use std::{fmt, sync::Arc};

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::append::{
    append_bool, append_float, append_int, append_null, append_string, append_uint,
};
use crate::error::MapObjectError;

const EMPTY: &[u8] = b"{}";

/// 规范编码后的 JSON 对象。
///
/// 构造后不可变，克隆只增加引用计数，可在多次编码之间复用。
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MapObject {
    bytes: Arc<[u8]>,
}

impl MapObject {
    /// 空对象。
    pub fn empty() -> Self {
        Self {
            bytes: Arc::from(EMPTY),
        }
    }

    /// 从任意可序列化为 JSON 对象的映射构造，例如 `HashMap<String, V>`。
    ///
    /// `null`（包括 `Option::None`）视为缺失映射，得到空对象。
    pub fn from_map<M: Serialize + ?Sized>(map: &M) -> Result<Self, MapObjectError> {
        let value = serde_json::to_value(map).map_err(MapObjectError::Encode)?;
        Self::from_value(&value)
    }

    /// 从已解析的 JSON 值构造。
    pub fn from_value(value: &Value) -> Result<Self, MapObjectError> {
        match value {
            Value::Null => Ok(Self::empty()),
            Value::Object(map) => Ok(Self::from_object(map)),
            other => Err(MapObjectError::NotAnObject {
                found: kind(other),
            }),
        }
    }

    /// 从 `serde_json` 对象构造，不会失败。
    pub fn from_object(map: &Map<String, Value>) -> Self {
        if map.is_empty() {
            return Self::empty();
        }
        let mut buf = Vec::with_capacity(64);
        write_object(&mut buf, map);
        Self {
            bytes: Arc::from(buf),
        }
    }

    /// 是否为空对象。
    pub fn is_empty(&self) -> bool {
        &*self.bytes == EMPTY
    }

    /// 规范字节。
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// 将规范字节追加到 `buf`。
    #[inline]
    pub fn append_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.bytes);
    }

    /// 把规范字节还原为 JSON 对象。
    pub fn raw(&self) -> Result<Map<String, Value>, MapObjectError> {
        serde_json::from_slice(&self.bytes).map_err(MapObjectError::Decode)
    }
}

impl Default for MapObject {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for MapObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

impl fmt::Debug for MapObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MapObject({self})")
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn write_object(buf: &mut Vec<u8>, map: &Map<String, Value>) {
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
    buf.push(b'{');
    for (index, (key, value)) in entries.into_iter().enumerate() {
        if index != 0 {
            buf.push(b',');
        }
        append_string(buf, key);
        buf.push(b':');
        write_value(buf, value);
    }
    buf.push(b'}');
}

fn write_value(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Null => append_null(buf),
        Value::Bool(b) => append_bool(buf, *b),
        Value::Number(n) => write_number(buf, n),
        Value::String(s) => append_string(buf, s),
        Value::Array(items) => {
            buf.push(b'[');
            for (index, item) in items.iter().enumerate() {
                if index != 0 {
                    buf.push(b',');
                }
                write_value(buf, item);
            }
            buf.push(b']');
        }
        Value::Object(map) => write_object(buf, map),
    }
}

fn write_number(buf: &mut Vec<u8>, n: &Number) {
    if let Some(i) = n.as_i64() {
        append_int(buf, i);
    } else if let Some(u) = n.as_u64() {
        append_uint(buf, u);
    } else if let Some(f) = n.as_f64() {
        append_float(buf, f);
    } else {
        append_null(buf);
    }
}
