use std::collections::HashMap;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use chrono::Utc;
use tracing::debug;

use loyalty_auth::{CallerId, OwnerGate};
use loyalty_barcode::format_token;
use loyalty_core::{AccountId, DomainError, DomainResult, Points};
use loyalty_events::{EventDispatcher, EventEnvelope, Subscription};

use crate::event::{LedgerEvent, PointsAwarded, PointsRedeemed};

/// Who may redeem, and how the target account is resolved.
///
/// Both variants run against identical internal state and share one redeem
/// primitive; the policy only gates the entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedeemPolicy {
    /// A caller redeems their own balance; the caller id is the account id.
    SelfService,
    /// The owner redeems on behalf of an explicitly named account.
    Administered,
}

type BalanceSlot = Arc<Mutex<Points>>;

/// The authoritative account → balance mapping.
///
/// Balances live behind per-account mutexes inside a shared map, so the
/// read-modify-write of one account never interleaves with another mutation
/// of the same account, while different accounts mutate in parallel. Entries
/// are created on first award and reset to zero (never removed) on redeem.
///
/// Events are dispatched after the account lock is released: delivery is
/// best-effort and is not part of the mutation's atomicity.
pub struct PointsLedger {
    gate: OwnerGate,
    policy: RedeemPolicy,
    accounts: RwLock<HashMap<AccountId, BalanceSlot>>,
    dispatcher: EventDispatcher<LedgerEvent>,
}

impl PointsLedger {
    /// Create a ledger owned by `owner` for the life of the process.
    pub fn new(owner: CallerId, policy: RedeemPolicy) -> Self {
        Self {
            gate: OwnerGate::new(owner),
            policy,
            accounts: RwLock::new(HashMap::new()),
            dispatcher: EventDispatcher::new(),
        }
    }

    pub fn owner(&self) -> &CallerId {
        self.gate.owner()
    }

    pub fn policy(&self) -> RedeemPolicy {
        self.policy
    }

    /// Observe every subsequently committed mutation.
    pub fn subscribe(&self) -> Subscription<EventEnvelope<LedgerEvent>> {
        self.dispatcher.subscribe()
    }

    /// Add `amount` points to `account`. Owner only, in both policies.
    ///
    /// An amount of zero is legal: the balance is unchanged but the award
    /// still happened and still emits [`PointsAwarded`].
    pub fn award(&self, caller: &CallerId, account: &AccountId, amount: Points) -> DomainResult<()> {
        self.gate.require_owner(caller)?;

        let slot = self.slot_or_insert(account);
        {
            let mut balance = lock_slot(&slot);
            *balance += amount.clone();
        }

        debug!(account = %account, amount = %amount, "points awarded");
        self.dispatcher.dispatch(LedgerEvent::PointsAwarded(PointsAwarded {
            account: account.clone(),
            amount,
            occurred_at: Utc::now(),
        }));
        Ok(())
    }

    /// Current balance of `account`, zero for accounts never awarded.
    ///
    /// Unauthenticated and side-effect free. Concurrent with a mutation this
    /// may observe either the pre- or post-mutation balance.
    pub fn balance(&self, account: &AccountId) -> Points {
        match self.existing_slot(account) {
            Some(slot) => lock_slot(&slot).clone(),
            None => Points::zero(),
        }
    }

    /// True iff `account` currently holds a positive balance.
    pub fn exists(&self, account: &AccountId) -> bool {
        !self.balance(account).is_zero()
    }

    /// Self-service redemption: `caller` redeems their own balance.
    ///
    /// Only available on a [`RedeemPolicy::SelfService`] ledger; the caller
    /// id is used verbatim as the account id.
    pub fn redeem_own(&self, caller: &CallerId) -> DomainResult<String> {
        if self.policy != RedeemPolicy::SelfService {
            return Err(DomainError::Unauthorized);
        }
        self.redeem_account(&AccountId::new(caller.as_str()))
    }

    /// Administered redemption: the owner redeems on behalf of `account`.
    ///
    /// Only available on a [`RedeemPolicy::Administered`] ledger.
    pub fn redeem_for(&self, caller: &CallerId, account: &AccountId) -> DomainResult<String> {
        if self.policy != RedeemPolicy::Administered {
            return Err(DomainError::Unauthorized);
        }
        self.gate.require_owner(caller)?;
        self.redeem_account(account)
    }

    /// The redeem primitive both entry points resolve to.
    ///
    /// Capture-reset-format is one indivisible unit under the account mutex;
    /// only the event dispatch happens outside it.
    fn redeem_account(&self, account: &AccountId) -> DomainResult<String> {
        let slot = self
            .existing_slot(account)
            .ok_or(DomainError::NothingToRedeem)?;

        let (amount, barcode) = {
            let mut balance = lock_slot(&slot);
            if balance.is_zero() {
                return Err(DomainError::NothingToRedeem);
            }
            let amount = mem::take(&mut *balance);
            let barcode = format_token(account, &amount);
            (amount, barcode)
        };

        debug!(account = %account, amount = %amount, "points redeemed");
        self.dispatcher.dispatch(LedgerEvent::PointsRedeemed(PointsRedeemed {
            account: account.clone(),
            amount,
            barcode: barcode.clone(),
            occurred_at: Utc::now(),
        }));
        Ok(barcode)
    }

    fn existing_slot(&self, account: &AccountId) -> Option<BalanceSlot> {
        read_accounts(&self.accounts).get(account).cloned()
    }

    fn slot_or_insert(&self, account: &AccountId) -> BalanceSlot {
        if let Some(slot) = self.existing_slot(account) {
            return slot;
        }
        let mut accounts = self
            .accounts
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(accounts.entry(account.clone()).or_default())
    }
}

// Balance updates are single assignments, so a lock poisoned by a panicking
// observer thread still holds a consistent value; recover it.
fn lock_slot(slot: &BalanceSlot) -> MutexGuard<'_, Points> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read_accounts(
    accounts: &RwLock<HashMap<AccountId, BalanceSlot>>,
) -> std::sync::RwLockReadGuard<'_, HashMap<AccountId, BalanceSlot>> {
    accounts.read().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn owner() -> CallerId {
        CallerId::from("owner")
    }

    fn administered() -> PointsLedger {
        PointsLedger::new(owner(), RedeemPolicy::Administered)
    }

    fn self_service() -> PointsLedger {
        PointsLedger::new(owner(), RedeemPolicy::SelfService)
    }

    fn account(id: &str) -> AccountId {
        AccountId::from(id)
    }

    #[test]
    fn fresh_accounts_have_zero_balance() {
        let ledger = administered();
        assert_eq!(ledger.balance(&account("1001")), Points::zero());
        assert_eq!(ledger.balance(&account("CUSTOMER001")), Points::zero());
        assert!(!ledger.exists(&account("1001")));
    }

    #[test]
    fn award_accumulates() {
        let ledger = administered();
        ledger.award(&owner(), &account("1001"), Points::from(50u64)).unwrap();
        ledger.award(&owner(), &account("1001"), Points::from(75u64)).unwrap();
        assert_eq!(ledger.balance(&account("1001")), Points::from(125u64));
    }

    #[test]
    fn award_of_zero_is_legal_and_still_emits() {
        let ledger = administered();
        let sub = ledger.subscribe();

        ledger.award(&owner(), &account("1001"), Points::zero()).unwrap();

        assert_eq!(ledger.balance(&account("1001")), Points::zero());
        assert!(!ledger.exists(&account("1001")));
        match sub.try_recv().unwrap().into_payload() {
            LedgerEvent::PointsAwarded(e) => {
                assert_eq!(e.account, account("1001"));
                assert!(e.amount.is_zero());
            }
            other => panic!("expected PointsAwarded, got {other:?}"),
        }
    }

    #[test]
    fn non_owner_cannot_award() {
        let ledger = administered();
        let err = ledger
            .award(&CallerId::from("user1"), &account("1002"), Points::from(100u64))
            .unwrap_err();
        assert_eq!(err, DomainError::Unauthorized);
        assert_eq!(ledger.balance(&account("1002")), Points::zero());
    }

    #[test]
    fn anyone_can_check_any_balance() {
        let ledger = administered();
        ledger.award(&owner(), &account("1001"), Points::from(200u64)).unwrap();
        // balance/exists take no caller at all.
        assert_eq!(ledger.balance(&account("1001")), Points::from(200u64));
        assert!(ledger.exists(&account("1001")));
    }

    #[test]
    fn administered_redeem_returns_token_and_zeroes_balance() {
        let ledger = administered();
        ledger.award(&owner(), &account("1001"), Points::from(100u64)).unwrap();

        let barcode = ledger.redeem_for(&owner(), &account("1001")).unwrap();

        assert_eq!(barcode, "BAR-1001-100");
        assert_eq!(ledger.balance(&account("1001")), Points::zero());
        assert!(!ledger.exists(&account("1001")));
    }

    #[test]
    fn redeem_with_zero_balance_fails_and_changes_nothing() {
        let ledger = administered();
        ledger.award(&owner(), &account("1001"), Points::from(10u64)).unwrap();
        let sub = ledger.subscribe();

        let err = ledger.redeem_for(&owner(), &account("1002")).unwrap_err();

        assert_eq!(err, DomainError::NothingToRedeem);
        assert_eq!(ledger.balance(&account("1001")), Points::from(10u64));
        assert!(sub.try_recv().is_err());
    }

    #[test]
    fn non_owner_cannot_redeem_administered() {
        let ledger = administered();
        ledger.award(&owner(), &account("1001"), Points::from(100u64)).unwrap();

        let err = ledger
            .redeem_for(&CallerId::from("user1"), &account("1001"))
            .unwrap_err();

        assert_eq!(err, DomainError::Unauthorized);
        assert_eq!(ledger.balance(&account("1001")), Points::from(100u64));
    }

    #[test]
    fn self_service_caller_redeems_own_balance() {
        let ledger = self_service();
        ledger.award(&owner(), &account("user1"), Points::from(100u64)).unwrap();

        let barcode = ledger.redeem_own(&CallerId::from("user1")).unwrap();

        assert_eq!(barcode, "BAR-user1-100");
        assert_eq!(ledger.balance(&account("user1")), Points::zero());
    }

    #[test]
    fn self_service_redeem_with_no_points_fails() {
        let ledger = self_service();
        assert_eq!(
            ledger.redeem_own(&CallerId::from("user2")).unwrap_err(),
            DomainError::NothingToRedeem
        );
    }

    #[test]
    fn entry_points_are_policy_gated() {
        let admin = administered();
        admin.award(&owner(), &account("owner"), Points::from(5u64)).unwrap();
        assert_eq!(admin.redeem_own(&owner()).unwrap_err(), DomainError::Unauthorized);

        let selfsvc = self_service();
        selfsvc.award(&owner(), &account("user1"), Points::from(5u64)).unwrap();
        assert_eq!(
            selfsvc.redeem_for(&owner(), &account("user1")).unwrap_err(),
            DomainError::Unauthorized
        );
        // The gated-off entry point left the balance alone.
        assert_eq!(selfsvc.balance(&account("user1")), Points::from(5u64));
    }

    #[test]
    fn empty_account_id_behaves_like_any_other() {
        let ledger = administered();
        ledger.award(&owner(), &account(""), Points::from(100u64)).unwrap();

        assert_eq!(ledger.balance(&account("")), Points::from(100u64));
        assert!(ledger.exists(&account("")));
        assert_eq!(ledger.redeem_for(&owner(), &account("")).unwrap(), "BAR--100");
    }

    #[test]
    fn balances_beyond_u64_survive_award_and_redeem() {
        let ledger = administered();
        let big: Points = "1000000000000000000000000".parse().unwrap();

        ledger.award(&owner(), &account("VIP_USER_123"), big.clone()).unwrap();
        assert_eq!(ledger.balance(&account("VIP_USER_123")), big);

        let barcode = ledger.redeem_for(&owner(), &account("VIP_USER_123")).unwrap();
        assert_eq!(barcode, "BAR-VIP_USER_123-1000000000000000000000000");
    }

    #[test]
    fn redeemed_event_carries_pre_redemption_amount_and_token() {
        let ledger = administered();
        ledger.award(&owner(), &account("1001"), Points::from(500u64)).unwrap();
        let sub = ledger.subscribe();

        let barcode = ledger.redeem_for(&owner(), &account("1001")).unwrap();

        match sub.try_recv().unwrap().into_payload() {
            LedgerEvent::PointsRedeemed(e) => {
                assert_eq!(e.account, account("1001"));
                assert_eq!(e.amount, Points::from(500u64));
                assert_eq!(e.barcode, barcode);
            }
            other => panic!("expected PointsRedeemed, got {other:?}"),
        }
    }

    #[test]
    fn double_redeem_hands_out_exactly_one_token() {
        let ledger = administered();
        ledger.award(&owner(), &account("1001"), Points::from(100u64)).unwrap();

        assert!(ledger.redeem_for(&owner(), &account("1001")).is_ok());
        assert_eq!(
            ledger.redeem_for(&owner(), &account("1001")).unwrap_err(),
            DomainError::NothingToRedeem
        );
    }

    #[test]
    fn concurrent_awards_to_one_account_lose_nothing() {
        let ledger = Arc::new(administered());
        let target = account("1001");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                let target = target.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        ledger.award(&owner(), &target, Points::from(3u64)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(ledger.balance(&target), Points::from(8u64 * 100 * 3));
    }

    #[test]
    fn concurrent_redeems_never_double_spend() {
        let ledger = Arc::new(administered());
        let target = account("1001");
        ledger.award(&owner(), &target, Points::from(100u64)).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                let target = target.clone();
                std::thread::spawn(move || ledger.redeem_for(&owner(), &target))
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let winners: Vec<_> = results.iter().filter(|r| r.is_ok()).collect();
        assert_eq!(winners.len(), 1, "exactly one redeem may win: {results:?}");
        assert_eq!(ledger.balance(&target), Points::zero());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: any sequence of awards leaves the balance at the exact
        /// sum of the awarded amounts.
        #[test]
        fn awards_sum_exactly(amounts in prop::collection::vec(any::<u64>(), 1..10)) {
            let ledger = administered();
            let target = account("1001");

            for &amount in &amounts {
                ledger.award(&owner(), &target, Points::from(amount)).unwrap();
            }

            let expected: u128 = amounts.iter().map(|&a| a as u128).sum();
            prop_assert_eq!(ledger.balance(&target), Points::from(expected));
        }

        /// Property: redeeming a positive balance `b` returns
        /// `BAR-<account>-<b>` and leaves the balance at zero.
        #[test]
        fn redeem_formats_the_captured_balance(
            id in "[A-Za-z0-9_]{0,10}",
            amount in 1u64..,
        ) {
            let ledger = administered();
            let target = account(&id);

            ledger.award(&owner(), &target, Points::from(amount)).unwrap();
            let barcode = ledger.redeem_for(&owner(), &target).unwrap();

            prop_assert_eq!(barcode, format!("BAR-{id}-{amount}"));
            prop_assert_eq!(ledger.balance(&target), Points::zero());
        }
    }
}
