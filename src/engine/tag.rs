use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::quiz::model::UnitId;

/// Identity of the context an asynchronous request was issued from.
///
/// A completion is applied only if the state machine it targets is still
/// waiting for exactly this tag. Sequence numbers are never reused, so a
/// late result cannot match a newer request even for the same unit.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RequestTag {
    pub unit: UnitId,
    pub seq: u64,
}

#[derive(Debug, Default)]
pub struct TagIssuer {
    next: u64,
}

impl TagIssuer {
    pub fn issue(&mut self, unit: &UnitId) -> RequestTag {
        self.next += 1;
        RequestTag {
            unit: unit.clone(),
            seq: self.next,
        }
    }
}

/// Shared abort flag handed to a worker thread.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tags_are_unique_per_unit() {
        let mut issuer = TagIssuer::default();
        let unit = UnitId::new("u1");
        let a = issuer.issue(&unit);
        let b = issuer.issue(&unit);
        assert_ne!(a, b);
        assert_eq!(a.unit, b.unit);
    }

    #[test]
    fn cancel_is_visible_through_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
