use std::collections::BTreeMap;

use alloy_primitives::Address;

/// Port for reading current contract parameters.
///
/// Invoked synchronously while handling a parameter update, before the
/// update record is written.
pub trait ContractStateReader: Send + Sync {
    /// Current value of `param` on `contract`, rendered as a string.
    fn read(&self, contract: &Address, param: &str) -> Option<String>;
}

/// Reader with no contract access; every read is `None`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoStateReader;

impl ContractStateReader for NoStateReader {
    fn read(&self, _contract: &Address, _param: &str) -> Option<String> {
        None
    }
}

/// Reader serving a fixed parameter table, regardless of contract.
#[derive(Clone, Debug, Default)]
pub struct StaticStateReader {
    values: BTreeMap<String, String>,
}

impl StaticStateReader {
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }
}

impl ContractStateReader for StaticStateReader {
    fn read(&self, _contract: &Address, param: &str) -> Option<String> {
        self.values.get(param).cloned()
    }
}
