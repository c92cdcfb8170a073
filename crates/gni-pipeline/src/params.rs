use alloy_primitives::{Address, B256, U256};
use gni_types::{EventParam, EventSignature};

use crate::error::{PipelineError, Result};

/// Strict, ordered reader over an event's decoded parameters.
///
/// Every accessor consumes the next parameter and checks its type. A
/// missing parameter, a parameter of the wrong type, or a parameter left
/// unread at [`ParamReader::finish`] is `MalformedInput`.
pub struct ParamReader<'a> {
    signature: EventSignature,
    params: &'a [EventParam],
    next: usize,
}

impl<'a> ParamReader<'a> {
    pub fn new(signature: EventSignature, params: &'a [EventParam]) -> Self {
        Self {
            signature,
            params,
            next: 0,
        }
    }

    pub fn address(&mut self, name: &str) -> Result<Address> {
        match self.take(name)? {
            EventParam::Address(a) => Ok(*a),
            other => Err(self.mismatch(name, "address", other)),
        }
    }

    pub fn uint(&mut self, name: &str) -> Result<U256> {
        match self.take(name)? {
            EventParam::Uint(v) => Ok(*v),
            other => Err(self.mismatch(name, "uint", other)),
        }
    }

    /// An unsigned parameter that must fit in 64 bits (blocks, epochs).
    pub fn uint_u64(&mut self, name: &str) -> Result<u64> {
        let value = self.uint(name)?;
        u64::try_from(value).map_err(|_| {
            PipelineError::MalformedInput(format!(
                "{}: parameter {name} = {value} exceeds 64 bits",
                self.signature
            ))
        })
    }

    pub fn bytes32(&mut self, name: &str) -> Result<B256> {
        match self.take(name)? {
            EventParam::Bytes32(b) => Ok(*b),
            other => Err(self.mismatch(name, "bytes32", other)),
        }
    }

    pub fn string(&mut self, name: &str) -> Result<String> {
        match self.take(name)? {
            EventParam::String(s) => Ok(s.clone()),
            other => Err(self.mismatch(name, "string", other)),
        }
    }

    pub fn bool(&mut self, name: &str) -> Result<bool> {
        match self.take(name)? {
            EventParam::Bool(b) => Ok(*b),
            other => Err(self.mismatch(name, "bool", other)),
        }
    }

    /// Fail if any parameter was left unread.
    pub fn finish(&self) -> Result<()> {
        if self.next != self.params.len() {
            return Err(PipelineError::MalformedInput(format!(
                "{}: expected {} parameters, got {}",
                self.signature,
                self.next,
                self.params.len()
            )));
        }
        Ok(())
    }

    fn take(&mut self, name: &str) -> Result<&'a EventParam> {
        let param = self.params.get(self.next).ok_or_else(|| {
            PipelineError::MalformedInput(format!(
                "{}: missing parameter {name} at position {}",
                self.signature, self.next
            ))
        })?;
        self.next += 1;
        Ok(param)
    }

    fn mismatch(&self, name: &str, expected: &str, found: &EventParam) -> PipelineError {
        PipelineError::MalformedInput(format!(
            "{}: parameter {name} should be {expected}, found {}",
            self.signature,
            found.type_name()
        ))
    }
}
