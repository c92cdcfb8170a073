use alloy_primitives::{Address, B256, U256};
use gni_store::EventRecord;
use gni_types::codec::bytes_to_hex;
use gni_types::EntityKey;
use serde_json::Value;

/// Builder for the [`EventRecord`] an applied event leaves behind.
///
/// Amounts are stored as decimal strings so that 256-bit values survive
/// JSON round trips unchanged.
#[derive(Clone, Debug)]
pub struct RecordBuilder {
    record: EventRecord,
}

impl RecordBuilder {
    pub(crate) fn new(record: EventRecord) -> Self {
        Self { record }
    }

    /// An account involved in the event. Duplicates are ignored.
    pub fn account(mut self, key: &EntityKey) -> Self {
        if !self.record.accounts.contains(key) {
            self.record.accounts.push(key.clone());
        }
        self
    }

    pub fn subgraph(mut self, key: &EntityKey) -> Self {
        self.record.subgraph = Some(key.clone());
        self
    }

    pub fn deployment(mut self, key: &EntityKey) -> Self {
        self.record.deployment = Some(key.clone());
        self
    }

    pub fn version(mut self, key: &EntityKey) -> Self {
        self.record.version = Some(key.clone());
        self
    }

    pub fn amount(self, name: &str, value: U256) -> Self {
        self.field(name, value.to_string())
    }

    pub fn address(self, name: &str, value: &Address) -> Self {
        self.field(name, bytes_to_hex(value.as_slice()))
    }

    pub fn bytes32(self, name: &str, value: &B256) -> Self {
        self.field(name, bytes_to_hex(value.as_slice()))
    }

    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.record.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn build(self) -> EventRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> EntityKey {
        EntityKey::parse(s).unwrap()
    }

    fn empty() -> EventRecord {
        EventRecord {
            id: EntityKey::join(&["0xab", "0"]).unwrap(),
            kind: "Signalled".into(),
            block_number: 1,
            timestamp: 2,
            tx_hash: "0xab".into(),
            contract: "0xcd".into(),
            accounts: Vec::new(),
            subgraph: None,
            deployment: None,
            version: None,
            fields: serde_json::Map::new(),
        }
    }

    #[test]
    fn amounts_are_decimal_strings() {
        let record = RecordBuilder::new(empty())
            .amount("tokens", U256::MAX)
            .build();
        assert_eq!(record.fields["tokens"], Value::String(U256::MAX.to_string()));
    }

    #[test]
    fn accounts_are_deduplicated_in_order() {
        let record = RecordBuilder::new(empty())
            .account(&key("0x02"))
            .account(&key("0x01"))
            .account(&key("0x02"))
            .build();
        assert_eq!(record.accounts, vec![key("0x02"), key("0x01")]);
    }

    #[test]
    fn addresses_render_as_lowercase_hex() {
        let record = RecordBuilder::new(empty())
            .address("operator", &Address::repeat_byte(0xab))
            .build();
        assert_eq!(record.fields["operator"], Value::String(format!("0x{}", "ab".repeat(20))));
    }
}
