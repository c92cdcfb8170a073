use std::collections::HashSet;

use gni_types::{EventPosition, RawEvent};

use crate::dispatch::DispatchTable;

/// Result of stream validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    pub event_count: u64,
    pub ordered: bool,
    pub positions_unique: bool,
    pub signatures_known: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific problem found in the stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Zero-based index of the event in the stream.
    pub index: usize,
    pub position: EventPosition,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    OutOfOrder,
    DuplicatePosition,
    UnknownSignature,
}

/// Pre-flight checks over an event stream. Never touches a store.
pub struct StreamValidator;

impl StreamValidator {
    /// Check ordering, position uniqueness and signature coverage.
    pub fn validate(events: &[RawEvent], dispatch: &DispatchTable) -> ValidationReport {
        let mut violations = Vec::new();
        let mut ordered = true;
        let mut positions_unique = true;
        let mut signatures_known = true;
        let mut seen = HashSet::new();
        let mut highest: Option<EventPosition> = None;

        for (index, event) in events.iter().enumerate() {
            let position = event.position();

            if !seen.insert(position) {
                positions_unique = false;
                violations.push(Violation {
                    index,
                    position,
                    kind: ViolationKind::DuplicatePosition,
                    description: format!("position {position} already seen"),
                });
            } else if let Some(highest) = highest.filter(|h| position < *h) {
                ordered = false;
                violations.push(Violation {
                    index,
                    position,
                    kind: ViolationKind::OutOfOrder,
                    description: format!("position {position} follows {highest}"),
                });
            }
            highest = highest.max(Some(position));

            if !dispatch.supports(&event.signature) {
                signatures_known = false;
                violations.push(Violation {
                    index,
                    position,
                    kind: ViolationKind::UnknownSignature,
                    description: format!("no handler for {}", event.signature),
                });
            }
        }

        ValidationReport {
            event_count: events.len() as u64,
            ordered,
            positions_unique,
            signatures_known,
            violations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gni_types::{Address, EventKind, EventParam, EventSignature, B256, U256};

    fn event(signature: EventSignature, block_number: u64, log_index: u64) -> RawEvent {
        RawEvent {
            contract: Address::repeat_byte(0x01),
            signature,
            params: vec![
                EventParam::Address(Address::repeat_byte(0x02)),
                EventParam::Uint(U256::from(1u64)),
            ],
            block_number,
            block_timestamp: 1_700_000_000 + block_number,
            transaction_hash: B256::repeat_byte(block_number as u8),
            transaction_from: Address::repeat_byte(0x02),
            log_index,
        }
    }

    fn deposit(block_number: u64, log_index: u64) -> RawEvent {
        event(EventSignature::v1(EventKind::StakeDeposited), block_number, log_index)
    }

    #[test]
    fn ordered_stream_is_valid() {
        let events = vec![deposit(1, 0), deposit(1, 1), deposit(2, 0)];
        let report = StreamValidator::validate(&events, &DispatchTable::standard());
        assert!(report.is_valid());
        assert_eq!(report.event_count, 3);
        assert!(report.ordered && report.positions_unique && report.signatures_known);
    }

    #[test]
    fn detects_out_of_order_positions() {
        let events = vec![deposit(2, 0), deposit(1, 5)];
        let report = StreamValidator::validate(&events, &DispatchTable::standard());
        assert!(!report.ordered);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].kind, ViolationKind::OutOfOrder);
        assert_eq!(report.violations[0].index, 1);
    }

    #[test]
    fn detects_duplicate_positions() {
        let events = vec![deposit(3, 1), deposit(3, 1)];
        let report = StreamValidator::validate(&events, &DispatchTable::standard());
        assert!(!report.positions_unique);
        assert!(report.ordered);
        assert_eq!(report.violations[0].kind, ViolationKind::DuplicatePosition);
    }

    #[test]
    fn detects_unknown_signatures() {
        let events = vec![event(EventSignature::v1(EventKind::SubgraphVersionUpdated), 1, 0)];
        let report = StreamValidator::validate(&events, &DispatchTable::standard());
        assert!(!report.signatures_known);
        assert_eq!(report.violations[0].kind, ViolationKind::UnknownSignature);
    }

    #[test]
    fn empty_stream_is_valid() {
        let report = StreamValidator::validate(&[], &DispatchTable::standard());
        assert!(report.is_valid());
        assert_eq!(report.event_count, 0);
    }
}
