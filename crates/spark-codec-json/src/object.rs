//! 固定 schema 实体的结构化编码契约。
//!
//! # 契约概览（What）
//! - 实体实现 [`JsonObject::write_fields`]，按字段声明顺序把字段交给 [`ObjectWriter`]；
//! - 必填字段无条件写出“键、值、逗号”；可选字段仅在存在时写出，缺失时连键一起省略，
//!   从不写出 `null` 占位；
//! - 切片字段写为 `"key":[a,b]`，若该字段可选且切片为空则整段省略；
//! - 嵌套实体委托给自身的 [`JsonObject`] 实现；
//! - 结束时若末尾是待定逗号，则原地改写为 `}`，否则追加 `}`。一个字段都没写时缓冲末尾是
//!   `{`，直接追加得到 `{}`。
//!
//! # 前缀复用（How）
//! - [`EncodedPrefix`] 预先编码一个在多次调用间不变的字段（例如请求中的 `network_identifier`），
//!   编码时以它代替开头的 `{`，避免重复编码。

use core::fmt;

use crate::append::{
    append_bool, append_float, append_hex_bytes, append_int, append_key, append_string,
    append_uint,
};
use crate::map_object::MapObject;

/// 可以追加为单个 JSON 值的类型。
pub trait AppendJson {
    /// 把自身编码后追加到 `buf`。
    fn append_json(&self, buf: &mut Vec<u8>);
}

/// 固定 schema 的 JSON 对象实体。
///
/// # 教案式说明
/// - **意图 (Why)**：把“字段列表”与“对象外壳、逗号处理”分离，实体只描述字段，外壳逻辑集中在
///   [`ObjectWriter`] 中，逐字段循环内不再需要“是否需要逗号”的判断；
/// - **契约 (What)**：`write_fields` 必须按声明顺序写出字段，且只通过 `ObjectWriter` 写入；
/// - **执行 (How)**：[`encode_json`](Self::encode_json) 以 `{` 开头，
///   [`encode_json_with_prefix`](Self::encode_json_with_prefix) 以预编码前缀开头，二者共用同一收尾逻辑。
pub trait JsonObject {
    /// 依声明顺序写出全部字段。
    fn write_fields(&self, obj: &mut ObjectWriter<'_>);

    /// 将完整对象追加到 `buf`。
    fn encode_json(&self, buf: &mut Vec<u8>) {
        let mut obj = ObjectWriter::new(buf);
        self.write_fields(&mut obj);
        obj.finish();
    }

    /// 以 `prefix` 代替开头的 `{`，将完整对象追加到 `buf`。
    fn encode_json_with_prefix(&self, buf: &mut Vec<u8>, prefix: &EncodedPrefix) {
        let mut obj = ObjectWriter::with_prefix(buf, prefix);
        self.write_fields(&mut obj);
        obj.finish();
    }
}

impl<T: JsonObject> AppendJson for T {
    #[inline]
    fn append_json(&self, buf: &mut Vec<u8>) {
        self.encode_json(buf);
    }
}

impl AppendJson for bool {
    #[inline]
    fn append_json(&self, buf: &mut Vec<u8>) {
        append_bool(buf, *self);
    }
}

impl AppendJson for i64 {
    #[inline]
    fn append_json(&self, buf: &mut Vec<u8>) {
        append_int(buf, *self);
    }
}

impl AppendJson for i32 {
    #[inline]
    fn append_json(&self, buf: &mut Vec<u8>) {
        append_int(buf, i64::from(*self));
    }
}

impl AppendJson for u64 {
    #[inline]
    fn append_json(&self, buf: &mut Vec<u8>) {
        append_uint(buf, *self);
    }
}

impl AppendJson for f64 {
    #[inline]
    fn append_json(&self, buf: &mut Vec<u8>) {
        append_float(buf, *self);
    }
}

impl AppendJson for str {
    #[inline]
    fn append_json(&self, buf: &mut Vec<u8>) {
        append_string(buf, self);
    }
}

impl AppendJson for String {
    #[inline]
    fn append_json(&self, buf: &mut Vec<u8>) {
        append_string(buf, self);
    }
}

impl AppendJson for MapObject {
    #[inline]
    fn append_json(&self, buf: &mut Vec<u8>) {
        self.append_to(buf);
    }
}

/// 以小写十六进制字符串编码的字节字段。
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct HexBytes(pub Vec<u8>);

impl HexBytes {
    /// 是否为空。
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 借出原始字节。
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for HexBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AppendJson for HexBytes {
    #[inline]
    fn append_json(&self, buf: &mut Vec<u8>) {
        append_hex_bytes(buf, &self.0);
    }
}

/// 可选字段：存在标记 + 值。
///
/// # 教案式说明
/// - **意图 (Why)**：与 `Option<T>` 不同，[`reset`](Self::reset) 只清除存在标记、保留值的存储，
///   实体复用时字符串与向量的已分配容量不会被释放；
/// - **契约 (What)**：只能通过 [`some`](Self::some)、[`set`](Self::set)、[`reset`](Self::reset)
///   改变状态；比较时先比较存在标记，两侧都存在才比较值，已重置的旧值不参与比较。
#[derive(Clone, Copy, Default)]
pub struct Optional<T> {
    set: bool,
    value: T,
}

impl<T> Optional<T> {
    /// 构造一个已存在的可选值。
    pub const fn some(value: T) -> Self {
        Self { set: true, value }
    }

    /// 是否存在。
    pub fn is_set(&self) -> bool {
        self.set
    }

    /// 存在时借出值。
    pub fn get(&self) -> Option<&T> {
        self.set.then_some(&self.value)
    }

    /// 设置值并标记为存在。
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.set = true;
    }

    /// 标记为存在并返回值的可变引用，用于原地填充已保留的存储。
    pub fn get_or_insert_mut(&mut self) -> &mut T {
        self.set = true;
        &mut self.value
    }

    /// 标记为缺失，保留值的存储。
    pub fn reset(&mut self) {
        self.set = false;
    }
}

impl<T: Default> Optional<T> {
    /// 构造一个缺失的可选值。
    pub fn none() -> Self {
        Self::default()
    }
}

impl<T: Default> From<Option<T>> for Optional<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::some(value),
            None => Self::default(),
        }
    }
}

impl<T: PartialEq> PartialEq for Optional<T> {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl<T: Eq> Eq for Optional<T> {}

impl<T: fmt::Debug> fmt::Debug for Optional<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("Optional").field(value).finish(),
            None => f.write_str("Optional(<unset>)"),
        }
    }
}

/// 将实体清空以便复用，保留已分配的存储。
pub trait Reset {
    /// 清空全部字段。
    fn reset(&mut self);
}

/// 预编码的对象前缀，形如 `{"key":<value>,`。
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EncodedPrefix {
    bytes: Box<[u8]>,
}

impl EncodedPrefix {
    /// 预编码字段 `key` 与其值。
    pub fn field<V: AppendJson + ?Sized>(key: &str, value: &V) -> Self {
        let mut buf = Vec::with_capacity(key.len() + 32);
        buf.push(b'{');
        append_key(&mut buf, key);
        value.append_json(&mut buf);
        buf.push(b',');
        Self {
            bytes: buf.into_boxed_slice(),
        }
    }

    /// 预编码字节。
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// 对象字段写入器，负责对象外壳与逗号改写。
///
/// 每个字段写出后立即追加逗号并记为“待定”；[`finish`](Self::finish) 把最后一个待定逗号
/// 改写为 `}`。
pub struct ObjectWriter<'a> {
    buf: &'a mut Vec<u8>,
    pending_comma: bool,
}

impl<'a> ObjectWriter<'a> {
    /// 写出 `{` 并开始一个对象。
    pub fn new(buf: &'a mut Vec<u8>) -> Self {
        buf.push(b'{');
        Self {
            buf,
            pending_comma: false,
        }
    }

    /// 以预编码前缀代替 `{` 开始一个对象；前缀总以逗号结尾。
    pub fn with_prefix(buf: &'a mut Vec<u8>, prefix: &EncodedPrefix) -> Self {
        buf.extend_from_slice(prefix.as_bytes());
        Self {
            buf,
            pending_comma: true,
        }
    }

    #[inline]
    fn key(&mut self, key: &str) -> &mut Vec<u8> {
        append_key(self.buf, key);
        &mut *self.buf
    }

    #[inline]
    fn comma(&mut self) {
        self.buf.push(b',');
        self.pending_comma = true;
    }

    /// 必填字段。
    pub fn field<V: AppendJson + ?Sized>(&mut self, key: &str, value: &V) -> &mut Self {
        value.append_json(self.key(key));
        self.comma();
        self
    }

    /// 可选字段，缺失时整体省略。
    pub fn optional<V: AppendJson>(&mut self, key: &str, value: &Optional<V>) -> &mut Self {
        if let Some(value) = value.get() {
            self.field(key, value);
        }
        self
    }

    /// 可选的 `MapObject` 字段，空对象时整体省略。
    pub fn optional_map(&mut self, key: &str, value: &MapObject) -> &mut Self {
        if !value.is_empty() {
            self.field(key, value);
        }
        self
    }

    /// 可选的十六进制字节字段，空字节时整体省略。
    pub fn optional_hex(&mut self, key: &str, value: &HexBytes) -> &mut Self {
        if !value.is_empty() {
            self.field(key, value);
        }
        self
    }

    /// 必填数组字段。
    pub fn array<V: AppendJson>(&mut self, key: &str, values: &[V]) -> &mut Self {
        let buf = self.key(key);
        buf.push(b'[');
        for (index, value) in values.iter().enumerate() {
            if index != 0 {
                buf.push(b',');
            }
            value.append_json(buf);
        }
        buf.push(b']');
        self.comma();
        self
    }

    /// 可选数组字段，空切片时整体省略。
    pub fn optional_array<V: AppendJson>(&mut self, key: &str, values: &[V]) -> &mut Self {
        if !values.is_empty() {
            self.array(key, values);
        }
        self
    }

    /// 结束对象：改写待定逗号或追加 `}`。
    pub fn finish(self) {
        if self.pending_comma {
            if let Some(last) = self.buf.last_mut() {
                *last = b'}';
                return;
            }
        }
        self.buf.push(b'}');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Point {
        x: i64,
        y: Optional<i64>,
    }

    impl JsonObject for Point {
        fn write_fields(&self, obj: &mut ObjectWriter<'_>) {
            obj.field("x", &self.x).optional("y", &self.y);
        }
    }

    struct AllOptional {
        name: Optional<String>,
        tags: Vec<String>,
    }

    impl JsonObject for AllOptional {
        fn write_fields(&self, obj: &mut ObjectWriter<'_>) {
            obj.optional("name", &self.name)
                .optional_array("tags", &self.tags);
        }
    }

    fn encode<T: JsonObject>(value: &T) -> String {
        let mut buf = Vec::new();
        value.encode_json(&mut buf);
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn absent_optional_is_omitted_not_null() {
        let point = Point {
            x: 1,
            y: Optional::none(),
        };
        assert_eq!(encode(&point), r#"{"x":1}"#);
        let point = Point {
            x: 1,
            y: Optional::some(-2),
        };
        assert_eq!(encode(&point), r#"{"x":1,"y":-2}"#);
    }

    #[test]
    fn zero_fields_yield_empty_object() {
        let empty = AllOptional {
            name: Optional::none(),
            tags: Vec::new(),
        };
        assert_eq!(encode(&empty), "{}");
        let tagged = AllOptional {
            name: Optional::none(),
            tags: vec!["a".into(), "b".into()],
        };
        assert_eq!(encode(&tagged), r#"{"tags":["a","b"]}"#);
    }

    #[test]
    fn encoding_appends_after_existing_bytes() {
        let mut buf = b"[".to_vec();
        Point {
            x: 3,
            y: Optional::none(),
        }
        .encode_json(&mut buf);
        assert_eq!(buf, br#"[{"x":3}"#);
    }

    #[test]
    fn prefix_replaces_opening_brace() {
        let prefix = EncodedPrefix::field("id", "abc");
        assert_eq!(prefix.as_bytes(), br#"{"id":"abc","#);
        let mut buf = Vec::new();
        Point {
            x: 1,
            y: Optional::none(),
        }
        .encode_json_with_prefix(&mut buf, &prefix);
        assert_eq!(buf, br#"{"id":"abc","x":1}"#);

        buf.clear();
        AllOptional {
            name: Optional::none(),
            tags: Vec::new(),
        }
        .encode_json_with_prefix(&mut buf, &prefix);
        assert_eq!(buf, br#"{"id":"abc"}"#);
    }

    #[test]
    fn optional_equality_ignores_stale_values() {
        let mut a = Optional::some(String::from("SUCCESS"));
        a.reset();
        let b: Optional<String> = Optional::none();
        assert_eq!(a, b);
        assert_eq!(a.get(), None);
        a.get_or_insert_mut().push_str("!");
        assert_eq!(a.get().map(String::as_str), Some("SUCCESS!"));
    }
}
