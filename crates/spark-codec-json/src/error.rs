//! 编码器错误域。
//!
//! 追加原语是全函数，不产生错误；唯一可能失败的是 [`MapObject`](crate::MapObject) 借助
//! `serde_json` 完成的“任意值到 JSON”一步，失败时原样包装并向上传播。

use thiserror::Error;

/// [`MapObject`](crate::MapObject) 构造与还原的错误。
///
/// # 教案式说明
/// - **意图 (Why)**：调用方需要区分“输入本身无法序列化”与“输入不是对象”，前者通常是
///   `Serialize` 实现的缺陷，后者是调用约定错误；
/// - **契约 (What)**：底层 `serde_json::Error` 作为 `#[source]` 保留，不被吞掉。
#[derive(Debug, Error)]
pub enum MapObjectError {
    /// 泛型值转换为 JSON 失败，例如 `Serialize` 实现报错或映射键不是字符串。
    #[error("map object: failed to encode value as JSON")]
    Encode(#[source] serde_json::Error),

    /// 转换结果不是 JSON 对象（或 `null`）。
    #[error("map object: expected a JSON object, found {found}")]
    NotAnObject {
        /// 实际得到的 JSON 类型名。
        found: &'static str,
    },

    /// 规范字节无法还原为 JSON 对象。
    #[error("map object: canonical bytes are not a JSON object")]
    Decode(#[source] serde_json::Error),
}
