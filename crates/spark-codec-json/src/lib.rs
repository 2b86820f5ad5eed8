#![warn(missing_docs)]

//! `spark-codec-json` 提供面向固定 schema 实体的高吞吐 JSON 编码引擎。
//!
//! # 教案背景（Why）
//! - 请求体与实体比较是热路径：通用的反射式序列化会为每个字段分配中间值并做动态分派；
//!   本 crate 让实体直接向调用方持有的 `Vec<u8>` 追加字节；
//! - 字符串转义扫描按 8 字节字并行判定，绝大多数无需转义的字符串整段拷贝。
//!
//! # 使用概览（How）
//! - 实体实现 [`JsonObject::write_fields`]，调用 [`JsonObject::encode_json`] 得到完整对象；
//! - 多次请求共享的字段用 [`EncodedPrefix`] 预编码一次，经
//!   [`JsonObject::encode_json_with_prefix`] 拼接到对象头部；
//! - 异构映射字段用 [`MapObject`] 规范编码，相等性即字节相等；
//! - 响应字节放入 [`DecodeBuffer`]，交给下游逐字段解码器。
//!
//! # 合约说明（What）
//! - 缓冲在一次编码调用期间由调用方独占，并发写入同一缓冲属于调用方错误，本 crate 不做检测；
//! - 追加原语不会失败；只有 [`MapObject`] 的构造可能返回 [`MapObjectError`]。
//!
//! # Feature
//! - `swar`（默认开启）：字并行转义扫描；关闭后使用逐字节查表实现，两者结果一致。

pub mod append;
pub mod decode;
mod error;
pub mod escape;
pub mod map_object;
pub mod object;
/// 字段名与线格式中的键同名，不再逐一注释。
#[allow(missing_docs)]
pub mod schema;

pub use crate::decode::DecodeBuffer;
pub use crate::error::MapObjectError;
pub use crate::map_object::MapObject;
pub use crate::object::{AppendJson, EncodedPrefix, HexBytes, JsonObject, ObjectWriter, Optional, Reset};
