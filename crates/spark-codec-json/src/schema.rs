//! Rosetta 风格的参考实体。
//!
//! # 模块定位（Why）
//! - 这些实体按结构化编码契约手写 [`JsonObject`] 实现，既是契约的使用范例，也是线格式兼容性
//!   测试与基准的载体；
//! - 字段顺序即声明顺序；`metadata` 一类映射字段均为可选，空映射时整体省略。
//!
//! # 前缀复用
//! - 所有针对同一网络的请求都带相同的 `network_identifier`；[`network_prefix`] 预编码一次，
//!   [`AccountBalanceRequest`] 等请求通过 [`JsonObject::encode_json_with_prefix`] 复用它，
//!   因此请求实体自身不含该字段。

use crate::append::append_string;
use crate::map_object::MapObject;
use crate::object::{AppendJson, EncodedPrefix, HexBytes, JsonObject, ObjectWriter, Optional, Reset};

impl Reset for String {
    fn reset(&mut self) {
        self.clear();
    }
}

impl<T> Reset for Vec<T> {
    fn reset(&mut self) {
        self.clear();
    }
}

impl Reset for HexBytes {
    fn reset(&mut self) {
        self.0.clear();
    }
}

impl Reset for MapObject {
    fn reset(&mut self) {
        *self = MapObject::empty();
    }
}

/// 预编码 `{"network_identifier":<network>,`。
pub fn network_prefix(network: &NetworkIdentifier) -> EncodedPrefix {
    EncodedPrefix::field("network_identifier", network)
}

/// 区块链与网络名。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NetworkIdentifier {
    pub blockchain: String,
    pub network: String,
    pub sub_network_identifier: Optional<SubNetworkIdentifier>,
}

impl JsonObject for NetworkIdentifier {
    fn write_fields(&self, obj: &mut ObjectWriter<'_>) {
        obj.field("blockchain", &self.blockchain)
            .field("network", &self.network)
            .optional("sub_network_identifier", &self.sub_network_identifier);
    }
}

impl Reset for NetworkIdentifier {
    fn reset(&mut self) {
        self.blockchain.clear();
        self.network.clear();
        self.sub_network_identifier.reset();
    }
}

/// 分片或子网标识。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubNetworkIdentifier {
    pub network: String,
    pub metadata: MapObject,
}

impl JsonObject for SubNetworkIdentifier {
    fn write_fields(&self, obj: &mut ObjectWriter<'_>) {
        obj.field("network", &self.network)
            .optional_map("metadata", &self.metadata);
    }
}

/// 账户标识。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AccountIdentifier {
    pub address: String,
    pub sub_account: Optional<SubAccountIdentifier>,
    pub metadata: MapObject,
}

impl JsonObject for AccountIdentifier {
    fn write_fields(&self, obj: &mut ObjectWriter<'_>) {
        obj.field("address", &self.address)
            .optional("sub_account", &self.sub_account)
            .optional_map("metadata", &self.metadata);
    }
}

impl Reset for AccountIdentifier {
    fn reset(&mut self) {
        self.address.clear();
        self.sub_account.reset();
        self.metadata.reset();
    }
}

/// 子账户标识。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubAccountIdentifier {
    pub address: String,
    pub metadata: MapObject,
}

impl JsonObject for SubAccountIdentifier {
    fn write_fields(&self, obj: &mut ObjectWriter<'_>) {
        obj.field("address", &self.address)
            .optional_map("metadata", &self.metadata);
    }
}

/// 币种：符号、精度与元数据。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Currency {
    pub symbol: String,
    pub decimals: i32,
    pub metadata: MapObject,
}

impl JsonObject for Currency {
    fn write_fields(&self, obj: &mut ObjectWriter<'_>) {
        obj.field("symbol", &self.symbol)
            .field("decimals", &self.decimals)
            .optional_map("metadata", &self.metadata);
    }
}

impl Reset for Currency {
    fn reset(&mut self) {
        self.symbol.clear();
        self.decimals = 0;
        self.metadata.reset();
    }
}

/// 金额；`value` 是任意精度的十进制整数字符串。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Amount {
    pub value: String,
    pub currency: Currency,
    pub metadata: MapObject,
}

impl JsonObject for Amount {
    fn write_fields(&self, obj: &mut ObjectWriter<'_>) {
        obj.field("value", &self.value)
            .field("currency", &self.currency)
            .optional_map("metadata", &self.metadata);
    }
}

impl Reset for Amount {
    fn reset(&mut self) {
        self.value.clear();
        self.currency.reset();
        self.metadata.reset();
    }
}

/// 区块标识。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockIdentifier {
    pub index: i64,
    pub hash: String,
}

impl JsonObject for BlockIdentifier {
    fn write_fields(&self, obj: &mut ObjectWriter<'_>) {
        obj.field("index", &self.index).field("hash", &self.hash);
    }
}

/// 部分区块标识：高度与哈希均可缺失，全部缺失时编码为 `{}`。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PartialBlockIdentifier {
    pub index: Optional<i64>,
    pub hash: Optional<String>,
}

impl JsonObject for PartialBlockIdentifier {
    fn write_fields(&self, obj: &mut ObjectWriter<'_>) {
        obj.optional("index", &self.index).optional("hash", &self.hash);
    }
}

impl Reset for PartialBlockIdentifier {
    fn reset(&mut self) {
        self.index.reset();
        self.hash.reset();
    }
}

/// 操作在交易内的序号。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OperationIdentifier {
    pub index: i64,
    pub network_index: Optional<i64>,
}

impl JsonObject for OperationIdentifier {
    fn write_fields(&self, obj: &mut ObjectWriter<'_>) {
        obj.field("index", &self.index)
            .optional("network_index", &self.network_index);
    }
}

/// 交易中的一次账户变动。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Operation {
    pub operation_identifier: OperationIdentifier,
    pub related_operations: Vec<OperationIdentifier>,
    pub kind: String,
    pub status: Optional<String>,
    pub account: Optional<AccountIdentifier>,
    pub amount: Optional<Amount>,
    pub metadata: MapObject,
}

impl JsonObject for Operation {
    fn write_fields(&self, obj: &mut ObjectWriter<'_>) {
        obj.field("operation_identifier", &self.operation_identifier)
            .optional_array("related_operations", &self.related_operations)
            .field("type", &self.kind)
            .optional("status", &self.status)
            .optional("account", &self.account)
            .optional("amount", &self.amount)
            .optional_map("metadata", &self.metadata);
    }
}

impl Reset for Operation {
    fn reset(&mut self) {
        self.operation_identifier = OperationIdentifier::default();
        self.related_operations.reset();
        self.kind.clear();
        self.status.reset();
        self.account.reset();
        self.amount.reset();
        self.metadata.reset();
    }
}

/// 交易标识。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionIdentifier {
    pub hash: String,
}

impl JsonObject for TransactionIdentifier {
    fn write_fields(&self, obj: &mut ObjectWriter<'_>) {
        obj.field("hash", &self.hash);
    }
}

/// 交易。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transaction {
    pub transaction_identifier: TransactionIdentifier,
    pub operations: Vec<Operation>,
    pub metadata: MapObject,
}

impl JsonObject for Transaction {
    fn write_fields(&self, obj: &mut ObjectWriter<'_>) {
        obj.field("transaction_identifier", &self.transaction_identifier)
            .array("operations", &self.operations)
            .optional_map("metadata", &self.metadata);
    }
}

/// 区块。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Block {
    pub block_identifier: BlockIdentifier,
    pub parent_block_identifier: BlockIdentifier,
    /// 毫秒级 Unix 时间戳。
    pub timestamp: i64,
    pub transactions: Vec<Transaction>,
    pub metadata: MapObject,
}

impl JsonObject for Block {
    fn write_fields(&self, obj: &mut ObjectWriter<'_>) {
        obj.field("block_identifier", &self.block_identifier)
            .field("parent_block_identifier", &self.parent_block_identifier)
            .field("timestamp", &self.timestamp)
            .array("transactions", &self.transactions)
            .optional_map("metadata", &self.metadata);
    }
}

impl Reset for Block {
    fn reset(&mut self) {
        self.block_identifier = BlockIdentifier::default();
        self.parent_block_identifier = BlockIdentifier::default();
        self.timestamp = 0;
        self.transactions.reset();
        self.metadata.reset();
    }
}

/// 公钥所在的曲线。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CurveType {
    #[default]
    Secp256k1,
    Secp256r1,
    Edwards25519,
    Tweedle,
    Pallas,
}

impl CurveType {
    /// 线格式名称。
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Secp256k1 => "secp256k1",
            Self::Secp256r1 => "secp256r1",
            Self::Edwards25519 => "edwards25519",
            Self::Tweedle => "tweedle",
            Self::Pallas => "pallas",
        }
    }
}

impl AppendJson for CurveType {
    fn append_json(&self, buf: &mut Vec<u8>) {
        append_string(buf, self.as_str());
    }
}

/// 公钥。`hex_bytes` 以小写十六进制编码，为空时省略。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PublicKey {
    pub hex_bytes: HexBytes,
    pub curve_type: CurveType,
}

impl JsonObject for PublicKey {
    fn write_fields(&self, obj: &mut ObjectWriter<'_>) {
        obj.optional_hex("hex_bytes", &self.hex_bytes)
            .field("curve_type", &self.curve_type);
    }
}

impl Reset for PublicKey {
    fn reset(&mut self) {
        self.hex_bytes.reset();
        self.curve_type = CurveType::default();
    }
}

/// 节点同步状态；全部字段可选。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncStatus {
    pub current_index: Optional<i64>,
    pub target_index: Optional<i64>,
    pub stage: Optional<String>,
    pub synced: Optional<bool>,
}

impl JsonObject for SyncStatus {
    fn write_fields(&self, obj: &mut ObjectWriter<'_>) {
        obj.optional("current_index", &self.current_index)
            .optional("target_index", &self.target_index)
            .optional("stage", &self.stage)
            .optional("synced", &self.synced);
    }
}

impl Reset for SyncStatus {
    fn reset(&mut self) {
        self.current_index.reset();
        self.target_index.reset();
        self.stage.reset();
        self.synced.reset();
    }
}

/// 操作状态及其是否代表成功。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OperationStatus {
    pub status: String,
    pub successful: bool,
}

impl JsonObject for OperationStatus {
    fn write_fields(&self, obj: &mut ObjectWriter<'_>) {
        obj.field("status", &self.status)
            .field("successful", &self.successful);
    }
}

/// 实现可能返回的错误描述。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ApiError {
    pub code: i32,
    pub message: String,
    pub description: Optional<String>,
    pub retriable: bool,
    pub details: MapObject,
}

impl JsonObject for ApiError {
    fn write_fields(&self, obj: &mut ObjectWriter<'_>) {
        obj.field("code", &self.code)
            .field("message", &self.message)
            .optional("description", &self.description)
            .field("retriable", &self.retriable)
            .optional_map("details", &self.details);
    }
}

/// 节点声明支持的能力。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Allow {
    pub operation_statuses: Vec<OperationStatus>,
    pub operation_types: Vec<String>,
    pub errors: Vec<ApiError>,
    pub historical_balance_lookup: bool,
    pub timestamp_start_index: Optional<i64>,
    pub call_methods: Vec<String>,
    pub mempool_coins: bool,
}

impl JsonObject for Allow {
    fn write_fields(&self, obj: &mut ObjectWriter<'_>) {
        obj.array("operation_statuses", &self.operation_statuses)
            .array("operation_types", &self.operation_types)
            .array("errors", &self.errors)
            .field("historical_balance_lookup", &self.historical_balance_lookup)
            .optional("timestamp_start_index", &self.timestamp_start_index)
            .array("call_methods", &self.call_methods)
            .field("mempool_coins", &self.mempool_coins);
    }
}

/// 账户余额查询请求；`network_identifier` 由 [`network_prefix`] 提供。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AccountBalanceRequest {
    pub account_identifier: AccountIdentifier,
    pub block_identifier: Optional<PartialBlockIdentifier>,
    pub currencies: Vec<Currency>,
}

impl JsonObject for AccountBalanceRequest {
    fn write_fields(&self, obj: &mut ObjectWriter<'_>) {
        obj.field("account_identifier", &self.account_identifier)
            .optional("block_identifier", &self.block_identifier)
            .optional_array("currencies", &self.currencies);
    }
}

impl Reset for AccountBalanceRequest {
    fn reset(&mut self) {
        self.account_identifier.reset();
        self.block_identifier.reset();
        self.currencies.reset();
    }
}
