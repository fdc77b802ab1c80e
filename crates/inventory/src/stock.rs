use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockpile_core::{AggregateRoot, LocationId, ProductId, RackId, RoomId, StockId};

use crate::command::{AdjustKind, Destination};
use crate::error::{StockError, StockResult};
use crate::ledger::{QuantityPool, TransactionType};

/// Composite identity of a stock record.
///
/// Room and rack are strict parts of the key: `None` means "no subdivision" and
/// only matches another `None`, never "any room".
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StockKey {
    pub product_id: ProductId,
    pub location_id: LocationId,
    pub room_id: Option<RoomId>,
    pub rack_id: Option<RackId>,
}

impl StockKey {
    pub fn new(product_id: ProductId, location_id: LocationId) -> Self {
        Self {
            product_id,
            location_id,
            room_id: None,
            rack_id: None,
        }
    }

    pub fn with_room(mut self, room_id: RoomId) -> Self {
        self.room_id = Some(room_id);
        self
    }

    pub fn with_rack(mut self, rack_id: RackId) -> Self {
        self.rack_id = Some(rack_id);
        self
    }

    /// The key the same product would have at `destination`.
    pub fn relocated(&self, destination: &Destination) -> StockKey {
        StockKey {
            product_id: self.product_id,
            location_id: destination.location_id,
            room_id: destination.room_id,
            rack_id: destination.rack_id,
        }
    }
}

impl core::fmt::Display for StockKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}@{}", self.product_id, self.location_id)?;
        if let Some(room) = self.room_id {
            write!(f, "/room:{room}")?;
        }
        if let Some(rack) = self.rack_id {
            write!(f, "/rack:{rack}")?;
        }
        Ok(())
    }
}

/// One quantity change against a single pool of a single record.
///
/// A movement is what a ledger leg records: `resulting == previous + delta`
/// holds by construction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub transaction_type: TransactionType,
    pub pool: QuantityPool,
    pub delta: i64,
    pub previous: i64,
    pub resulting: i64,
}

impl Movement {
    fn new(transaction_type: TransactionType, pool: QuantityPool, previous: i64, delta: i64) -> StockResult<Self> {
        let resulting = previous
            .checked_add(delta)
            .ok_or_else(|| StockError::validation("quantity overflow"))?;
        Ok(Self {
            transaction_type,
            pool,
            delta,
            previous,
            resulting,
        })
    }
}

/// Quantity state for one (product, location, room?, rack?) key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    id: StockId,
    key: StockKey,
    quantity: i64,
    reserved_quantity: i64,
    available_quantity: i64,
    version: u64,
    created_at: DateTime<Utc>,
    last_updated: DateTime<Utc>,
}

impl StockRecord {
    /// A fresh, not-yet-persisted record holding nothing.
    pub fn new(id: StockId, key: StockKey, at: DateTime<Utc>) -> Self {
        Self {
            id,
            key,
            quantity: 0,
            reserved_quantity: 0,
            available_quantity: 0,
            version: 0,
            created_at: at,
            last_updated: at,
        }
    }

    pub fn id_typed(&self) -> StockId {
        self.id
    }

    pub fn key(&self) -> &StockKey {
        &self.key
    }

    pub fn product_id(&self) -> ProductId {
        self.key.product_id
    }

    pub fn location_id(&self) -> LocationId {
        self.key.location_id
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn reserved_quantity(&self) -> i64 {
        self.reserved_quantity
    }

    pub fn available_quantity(&self) -> i64 {
        self.available_quantity
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Nothing on hand and nothing reserved; the record may be removed.
    pub fn is_empty(&self) -> bool {
        self.quantity == 0 && self.reserved_quantity == 0
    }

    /// Copy of this record carrying the version assigned by a store commit.
    pub fn stamped(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn check_invariants(&self) -> StockResult<()> {
        if self.quantity < 0 || self.reserved_quantity < 0 {
            return Err(StockError::invariant(format!(
                "negative quantity on {} (quantity={}, reserved={})",
                self.key, self.quantity, self.reserved_quantity
            )));
        }
        if self.reserved_quantity > self.quantity {
            return Err(StockError::ReservedExceedsQuantity {
                quantity: self.quantity,
                reserved: self.reserved_quantity,
            });
        }
        if self.available_quantity != self.quantity - self.reserved_quantity {
            return Err(StockError::invariant(format!(
                "available quantity out of sync on {}",
                self.key
            )));
        }
        Ok(())
    }

    /// Decide a manual adjustment of the on-hand quantity.
    pub fn adjust(&self, kind: AdjustKind, amount: i64) -> StockResult<Movement> {
        let delta = match kind {
            AdjustKind::Add => {
                ensure_positive(amount)?;
                amount
            }
            AdjustKind::Subtract => {
                ensure_positive(amount)?;
                if self.quantity < amount {
                    return Err(StockError::InsufficientStock {
                        requested: amount,
                        available: self.quantity,
                    });
                }
                -amount
            }
            AdjustKind::Set => {
                if amount < 0 {
                    return Err(StockError::validation("quantity cannot be negative"));
                }
                // A zero-delta entry would record a movement that moved nothing.
                if amount == self.quantity {
                    return Err(StockError::validation(format!("quantity is already {amount}")));
                }
                amount - self.quantity
            }
        };

        let movement = Movement::new(TransactionType::Adjustment, QuantityPool::OnHand, self.quantity, delta)?;
        self.ensure_covers_reserved(movement.resulting)?;
        Ok(movement)
    }

    /// Decide a hold against available quantity.
    pub fn reserve(&self, amount: i64) -> StockResult<Movement> {
        ensure_positive(amount)?;
        if amount > self.available_quantity {
            return Err(StockError::InsufficientAvailableStock {
                requested: amount,
                available: self.available_quantity,
            });
        }
        Movement::new(TransactionType::Reservation, QuantityPool::Reserved, self.reserved_quantity, amount)
    }

    /// Decide giving back part of the reserved pool.
    pub fn release(&self, amount: i64) -> StockResult<Movement> {
        ensure_positive(amount)?;
        if amount > self.reserved_quantity {
            return Err(StockError::ExcessiveRelease {
                requested: amount,
                reserved: self.reserved_quantity,
            });
        }
        Movement::new(TransactionType::Release, QuantityPool::Reserved, self.reserved_quantity, -amount)
    }

    /// Decide an inward movement (goods received).
    pub fn receive(&self, amount: i64) -> StockResult<Movement> {
        ensure_positive(amount)?;
        Movement::new(TransactionType::Inward, QuantityPool::OnHand, self.quantity, amount)
    }

    /// Decide an outward movement (goods issued); only unreserved units may leave.
    pub fn issue(&self, amount: i64) -> StockResult<Movement> {
        ensure_positive(amount)?;
        if amount > self.available_quantity {
            return Err(StockError::InsufficientAvailableStock {
                requested: amount,
                available: self.available_quantity,
            });
        }
        Movement::new(TransactionType::Outward, QuantityPool::OnHand, self.quantity, -amount)
    }

    /// Decide the outbound leg of a transfer.
    pub fn transfer_out(&self, amount: i64) -> StockResult<Movement> {
        ensure_positive(amount)?;
        if self.available_quantity < amount {
            return Err(StockError::InsufficientStock {
                requested: amount,
                available: self.available_quantity,
            });
        }
        Movement::new(TransactionType::Transfer, QuantityPool::OnHand, self.quantity, -amount)
    }

    /// Decide the inbound leg of a transfer.
    pub fn transfer_in(&self, amount: i64) -> StockResult<Movement> {
        ensure_positive(amount)?;
        Movement::new(TransactionType::Transfer, QuantityPool::OnHand, self.quantity, amount)
    }

    /// Evolve state from a decided movement.
    ///
    /// Rejects movements decided against a different snapshot of the record.
    pub fn apply(&mut self, movement: &Movement, at: DateTime<Utc>) -> StockResult<()> {
        let current = match movement.pool {
            QuantityPool::OnHand => self.quantity,
            QuantityPool::Reserved => self.reserved_quantity,
        };
        if current != movement.previous {
            return Err(StockError::invariant(format!(
                "movement decided against {} but record holds {current}",
                movement.previous
            )));
        }

        let mut next = self.clone();
        match movement.pool {
            QuantityPool::OnHand => next.quantity = movement.resulting,
            QuantityPool::Reserved => next.reserved_quantity = movement.resulting,
        }
        next.available_quantity = next.quantity - next.reserved_quantity;
        next.last_updated = at;
        next.check_invariants()?;

        *self = next;
        Ok(())
    }

    fn ensure_covers_reserved(&self, quantity: i64) -> StockResult<()> {
        if quantity < self.reserved_quantity {
            return Err(StockError::ReservedExceedsQuantity {
                quantity,
                reserved: self.reserved_quantity,
            });
        }
        Ok(())
    }
}

impl AggregateRoot for StockRecord {
    type Id = StockId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

fn ensure_positive(amount: i64) -> StockResult<()> {
    if amount <= 0 {
        return Err(StockError::validation("quantity must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_key() -> StockKey {
        StockKey::new(ProductId::new(), LocationId::new())
    }

    fn record_with(quantity: i64, reserved: i64) -> StockRecord {
        let now = Utc::now();
        let mut record = StockRecord::new(StockId::new(), test_key(), now);
        if quantity > 0 {
            let m = record.receive(quantity).unwrap();
            record.apply(&m, now).unwrap();
        }
        if reserved > 0 {
            let m = record.reserve(reserved).unwrap();
            record.apply(&m, now).unwrap();
        }
        record
    }

    #[test]
    fn subtract_more_than_on_hand_is_insufficient_stock() {
        let record = record_with(10, 0);
        let err = record.adjust(AdjustKind::Subtract, 11).unwrap_err();
        assert_eq!(err, StockError::InsufficientStock { requested: 11, available: 10 });
    }

    #[test]
    fn subtract_into_reserved_units_is_rejected() {
        let record = record_with(10, 8);
        let err = record.adjust(AdjustKind::Subtract, 5).unwrap_err();
        assert_eq!(err, StockError::ReservedExceedsQuantity { quantity: 5, reserved: 8 });
    }

    #[test]
    fn set_below_reserved_is_rejected() {
        let record = record_with(10, 3);
        let err = record.adjust(AdjustKind::Set, 0).unwrap_err();
        assert_eq!(err, StockError::ReservedExceedsQuantity { quantity: 0, reserved: 3 });
    }

    #[test]
    fn set_delta_is_new_minus_old() {
        let record = record_with(10, 0);
        let m = record.adjust(AdjustKind::Set, 4).unwrap();
        assert_eq!(m.delta, -6);
        assert_eq!(m.previous, 10);
        assert_eq!(m.resulting, 4);
        assert_eq!(m.transaction_type, TransactionType::Adjustment);
    }

    #[test]
    fn set_to_current_quantity_is_a_validation_error() {
        let record = record_with(7, 0);
        assert!(matches!(record.adjust(AdjustKind::Set, 7), Err(StockError::Validation(_))));
        // Any real change still goes through.
        assert_eq!(record.adjust(AdjustKind::Set, 8).unwrap().delta, 1);
    }

    #[test]
    fn reserve_then_over_reserve() {
        let mut record = record_with(10, 0);
        let m = record.reserve(3).unwrap();
        record.apply(&m, Utc::now()).unwrap();
        assert_eq!(record.reserved_quantity(), 3);
        assert_eq!(record.available_quantity(), 7);

        let err = record.reserve(8).unwrap_err();
        assert_eq!(err, StockError::InsufficientAvailableStock { requested: 8, available: 7 });
    }

    #[test]
    fn release_more_than_reserved_is_excessive() {
        let record = record_with(10, 2);
        assert_eq!(
            record.release(3).unwrap_err(),
            StockError::ExcessiveRelease { requested: 3, reserved: 2 }
        );
    }

    #[test]
    fn reservation_movement_tracks_reserved_pool() {
        let record = record_with(10, 2);
        let m = record.reserve(5).unwrap();
        assert_eq!(m.pool, QuantityPool::Reserved);
        assert_eq!((m.previous, m.delta, m.resulting), (2, 5, 7));
    }

    #[test]
    fn transfer_out_checks_available_not_on_hand() {
        let record = record_with(10, 6);
        assert_eq!(
            record.transfer_out(5).unwrap_err(),
            StockError::InsufficientStock { requested: 5, available: 4 }
        );
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        let record = record_with(10, 0);
        for amount in [0, -1] {
            assert!(matches!(record.reserve(amount), Err(StockError::Validation(_))));
            assert!(matches!(record.release(amount), Err(StockError::Validation(_))));
            assert!(matches!(record.receive(amount), Err(StockError::Validation(_))));
            assert!(matches!(record.adjust(AdjustKind::Add, amount), Err(StockError::Validation(_))));
        }
    }

    #[test]
    fn stale_movement_cannot_be_applied() {
        let mut record = record_with(10, 0);
        let stale = record.adjust(AdjustKind::Add, 1).unwrap();
        let fresh = record.adjust(AdjustKind::Add, 2).unwrap();
        record.apply(&fresh, Utc::now()).unwrap();
        assert!(matches!(record.apply(&stale, Utc::now()), Err(StockError::InvariantViolation(_))));
        assert_eq!(record.quantity(), 12);
    }

    #[test]
    fn room_and_rack_are_strict_key_parts() {
        let key = test_key();
        let with_room = key.with_room(RoomId::new());
        assert_ne!(key, with_room);
        assert_ne!(with_room, with_room.with_rack(RackId::new()));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(i64),
        Subtract(i64),
        Set(i64),
        Reserve(i64),
        Release(i64),
        Issue(i64),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1i64..50).prop_map(Op::Add),
            (1i64..50).prop_map(Op::Subtract),
            (0i64..80).prop_map(Op::Set),
            (1i64..30).prop_map(Op::Reserve),
            (1i64..30).prop_map(Op::Release),
            (1i64..30).prop_map(Op::Issue),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: no sequence of accepted or rejected operations breaks the
        /// record invariants, and every accepted movement balances.
        #[test]
        fn invariants_hold_for_any_operation_sequence(ops in prop::collection::vec(op_strategy(), 1..60)) {
            let mut record = record_with(0, 0);
            for op in ops {
                let decided = match op {
                    Op::Add(n) => record.adjust(AdjustKind::Add, n),
                    Op::Subtract(n) => record.adjust(AdjustKind::Subtract, n),
                    Op::Set(n) => record.adjust(AdjustKind::Set, n),
                    Op::Reserve(n) => record.reserve(n),
                    Op::Release(n) => record.release(n),
                    Op::Issue(n) => record.issue(n),
                };
                let before = record.clone();
                match decided {
                    Ok(m) => {
                        prop_assert_eq!(m.resulting, m.previous + m.delta);
                        record.apply(&m, Utc::now()).unwrap();
                    }
                    Err(_) => prop_assert_eq!(&record, &before),
                }
                prop_assert!(record.check_invariants().is_ok());
                prop_assert_eq!(record.available_quantity(), record.quantity() - record.reserved_quantity());
                prop_assert!(record.reserved_quantity() <= record.quantity());
                prop_assert!(record.reserved_quantity() >= 0);
            }
        }
    }
}
