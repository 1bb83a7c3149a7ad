use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::models::payment::{Payment, PaymentStatus};

// Payments keyed by id, with a secondary index on the gateway checkout id.
// All read-modify-write on a row happens under its DashMap guard, so the
// single-shot transitions below cannot race a duplicate callback delivery.
pub struct PaymentStore {
    payments: DashMap<Uuid, Payment>,
    by_checkout_id: DashMap<String, Uuid>,
}

impl PaymentStore {
    pub fn new() -> Self {
        Self {
            payments: DashMap::new(),
            by_checkout_id: DashMap::new(),
        }
    }

    pub fn insert(&self, payment: Payment) {
        self.payments.insert(payment.id, payment);
    }

    pub fn get(&self, id: Uuid) -> Option<Payment> {
        self.payments.get(&id).map(|entry| entry.clone())
    }

    pub fn find_by_checkout_id(&self, checkout_request_id: &str) -> Option<Payment> {
        let id = *self.by_checkout_id.get(checkout_request_id)?;
        self.get(id)
    }

    // Records the checkout id issued by the gateway. The id is immutable once
    // set and unique across payments; a second attempt reports false.
    pub fn set_checkout_id(&self, id: Uuid, checkout_request_id: &str) -> bool {
        let mut payment = match self.payments.get_mut(&id) {
            Some(payment) => payment,
            None => return false,
        };
        if payment.checkout_request_id.is_some() {
            return false;
        }
        match self.by_checkout_id.entry(checkout_request_id.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                payment.checkout_request_id = Some(checkout_request_id.to_string());
                slot.insert(id);
                true
            }
        }
    }

    // Single-shot pending -> completed. Returns a snapshot carrying the staged
    // product data only when this call performed the transition; the row's
    // staged data is consumed at the same time.
    pub fn complete_if_pending(&self, id: Uuid) -> Option<Payment> {
        let mut payment = self.payments.get_mut(&id)?;
        if payment.status != PaymentStatus::Pending {
            return None;
        }
        payment.status = PaymentStatus::Completed;
        let staged = payment.staged_product.take();
        let mut snapshot = payment.clone();
        snapshot.staged_product = staged;
        Some(snapshot)
    }

    // Single-shot pending -> failed.
    pub fn fail_if_pending(&self, id: Uuid) -> bool {
        match self.payments.get_mut(&id) {
            Some(mut payment) if payment.status == PaymentStatus::Pending => {
                payment.status = PaymentStatus::Failed;
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn pending_payment() -> Payment {
        Payment {
            id: Uuid::new_v4(),
            user_id: "user-1".to_string(),
            amount: 10,
            status: PaymentStatus::Pending,
            checkout_request_id: None,
            staged_product: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn complete_if_pending_is_single_shot() {
        let store = PaymentStore::new();
        let payment = pending_payment();
        let id = payment.id;
        store.insert(payment);

        assert!(store.complete_if_pending(id).is_some());
        assert!(store.complete_if_pending(id).is_none());
        assert_eq!(store.get(id).unwrap().status, PaymentStatus::Completed);
    }

    #[test]
    fn fail_if_pending_leaves_terminal_states_alone() {
        let store = PaymentStore::new();
        let payment = pending_payment();
        let id = payment.id;
        store.insert(payment);

        assert!(store.complete_if_pending(id).is_some());
        assert!(!store.fail_if_pending(id));
        assert_eq!(store.get(id).unwrap().status, PaymentStatus::Completed);
    }

    #[test]
    fn checkout_id_is_immutable_once_set() {
        let store = PaymentStore::new();
        let payment = pending_payment();
        let id = payment.id;
        store.insert(payment);

        assert!(store.set_checkout_id(id, "ws_1"));
        assert!(!store.set_checkout_id(id, "ws_2"));
        assert!(store.find_by_checkout_id("ws_1").is_some());
        assert!(store.find_by_checkout_id("ws_2").is_none());
    }

    #[test]
    fn checkout_id_is_unique_across_payments() {
        let store = PaymentStore::new();
        let first = pending_payment();
        let second = pending_payment();
        let (first_id, second_id) = (first.id, second.id);
        store.insert(first);
        store.insert(second);

        assert!(store.set_checkout_id(first_id, "ws_1"));
        assert!(!store.set_checkout_id(second_id, "ws_1"));
        assert_eq!(store.find_by_checkout_id("ws_1").unwrap().id, first_id);
    }
}
