//! Concurrent registry of recorded operations.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::errors::ConflictingOperationError;
use crate::exchange::OperationId;
use crate::operation::RecordedOperation;

/// Map of operation id to everything recorded for it during one run.
///
/// Shared across test threads behind an `Arc`. The conflict check and the
/// example append for one id happen under that id's shard lock.
#[derive(Debug, Default)]
pub struct OperationRegistry {
    entries: DashMap<OperationId, RecordedOperation>,
}

impl OperationRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty registry ready to share.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Merges an operation into the registry.
    ///
    /// A known id must come with the same method and path template;
    /// otherwise the registry is left untouched. Examples are appended in
    /// call order and the first contract is kept.
    pub fn merge(&self, operation: RecordedOperation) -> Result<(), ConflictingOperationError> {
        match self.entries.entry(operation.operation_id.clone()) {
            Entry::Vacant(slot) => {
                debug!(
                    operation_id = %operation.operation_id,
                    method = %operation.method,
                    path = %operation.path_template,
                    "Registered operation"
                );
                slot.insert(operation);
                Ok(())
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                if existing.method != operation.method
                    || existing.path_template != operation.path_template
                {
                    warn!(
                        operation_id = %operation.operation_id,
                        existing = %existing.signature(),
                        incoming = %operation.signature(),
                        "Conflicting operation id"
                    );
                    return Err(ConflictingOperationError::new(
                        operation.operation_id.as_str(),
                        existing.signature(),
                        operation.signature(),
                    ));
                }
                if !Arc::ptr_eq(&existing.contract, &operation.contract)
                    && existing.contract != operation.contract
                {
                    warn!(
                        operation_id = %operation.operation_id,
                        "Operation recorded with a different contract, keeping the first one"
                    );
                }
                existing.examples.extend(operation.examples);
                debug!(
                    operation_id = %existing.operation_id,
                    examples = existing.examples.len(),
                    "Appended examples"
                );
                Ok(())
            }
        }
    }

    /// Returns a copy of one operation.
    #[must_use]
    pub fn get(&self, operation_id: &str) -> Option<RecordedOperation> {
        self.entries.get(operation_id).map(|entry| entry.value().clone())
    }

    /// True when the id has been recorded.
    #[must_use]
    pub fn contains(&self, operation_id: &str) -> bool {
        self.entries.contains_key(operation_id)
    }

    /// Point-in-time copy of every operation, sorted by id.
    #[must_use]
    pub fn snapshot(&self) -> Vec<RecordedOperation> {
        let mut operations: Vec<RecordedOperation> =
            self.entries.iter().map(|entry| entry.value().clone()).collect();
        operations.sort_by(|a, b| a.operation_id.cmp(&b.operation_id));
        operations
    }

    /// Recorded ids, sorted.
    #[must_use]
    pub fn operation_ids(&self) -> Vec<OperationId> {
        let mut ids: Vec<OperationId> = self.entries.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Number of distinct operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of recorded examples across operations.
    #[must_use]
    pub fn example_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.examples.len()).sum()
    }

    /// Number of examples recorded for one operation.
    #[must_use]
    pub fn examples_for(&self, operation_id: &str) -> usize {
        self.entries
            .get(operation_id)
            .map_or(0, |entry| entry.examples.len())
    }

    /// Removes everything (primarily for tests).
    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::ContractModel;
    use crate::exchange::{Example, HttpMethod, HttpRequest, HttpResponse, PathTemplate};
    use crate::operation::{Coverage, RecordedExample};
    use std::thread;

    fn operation(id: &str, method: HttpMethod, template: &str, status: u16) -> RecordedOperation {
        RecordedOperation::new(
            OperationId::new(id).unwrap(),
            method,
            PathTemplate::new(template).unwrap(),
            Arc::new(ContractModel::describe("Order a cart").unwrap()),
            RecordedExample {
                example: Example::new(HttpRequest::new(template), HttpResponse::new(status)),
                coverage: Coverage::default(),
            },
        )
    }

    #[test]
    fn test_merge_appends_in_call_order() {
        let registry = OperationRegistry::new();
        registry
            .merge(operation("cart-order", HttpMethod::Post, "/carts/{id}/order", 200))
            .unwrap();
        registry
            .merge(operation("cart-order", HttpMethod::Post, "/carts/{id}/order", 409))
            .unwrap();

        let op = registry.get("cart-order").unwrap();
        let statuses: Vec<u16> = op.examples.iter().map(|e| e.example.response.status).collect();
        assert_eq!(statuses, vec![200, 409]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.example_count(), 2);
        assert_eq!(registry.examples_for("cart-order"), 2);
    }

    #[test]
    fn test_conflict_leaves_registry_untouched() {
        let registry = OperationRegistry::new();
        registry
            .merge(operation("cart-order", HttpMethod::Post, "/carts/{id}/order", 200))
            .unwrap();

        let err = registry
            .merge(operation("cart-order", HttpMethod::Put, "/carts/{id}/order", 200))
            .unwrap_err();
        assert_eq!(err.operation_id, "cart-order");
        assert_eq!(err.existing, "POST /carts/{id}/order");
        assert_eq!(err.incoming, "PUT /carts/{id}/order");

        assert!(registry
            .merge(operation("cart-order", HttpMethod::Post, "/carts/{cartId}/order", 200))
            .is_err());
        assert_eq!(registry.example_count(), 1);
    }

    #[test]
    fn test_snapshot_is_sorted() {
        let registry = OperationRegistry::new();
        for id in ["cart-get", "carts-create", "cart-add-product"] {
            registry.merge(operation(id, HttpMethod::Get, "/carts", 200)).unwrap();
        }
        let ids: Vec<String> = registry
            .snapshot()
            .into_iter()
            .map(|op| op.operation_id.to_string())
            .collect();
        assert_eq!(ids, vec!["cart-add-product", "cart-get", "carts-create"]);
        assert_eq!(registry.operation_ids()[0].as_str(), "cart-add-product");
    }

    #[test]
    fn test_clear() {
        let registry = OperationRegistry::new();
        registry.merge(operation("carts-create", HttpMethod::Post, "/carts", 201)).unwrap();
        assert!(registry.contains("carts-create"));
        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_concurrent_merges() {
        let registry = OperationRegistry::shared();
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for i in 0..25 {
                        let id = if i % 2 == 0 { "cart-get" } else { "carts-create" };
                        let (method, template) = if i % 2 == 0 {
                            (HttpMethod::Get, "/carts/{id}")
                        } else {
                            (HttpMethod::Post, "/carts")
                        };
                        registry.merge(operation(id, method, template, 200 + t)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.example_count(), 200);
        assert_eq!(registry.examples_for("cart-get"), 104);
        assert_eq!(registry.examples_for("carts-create"), 96);
    }

    #[test]
    fn test_concurrent_conflicts_never_mix() {
        let registry = OperationRegistry::shared();
        let handles: Vec<_> = [HttpMethod::Post, HttpMethod::Put]
            .into_iter()
            .map(|method| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    (0..50)
                        .filter(|_| {
                            registry
                                .merge(operation("cart-order", method, "/carts/{id}/order", 200))
                                .is_ok()
                        })
                        .count()
                })
            })
            .collect();
        let accepted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        let op = registry.get("cart-order").unwrap();
        assert_eq!(op.examples.len(), accepted);
        assert!(accepted >= 50);
    }
}
