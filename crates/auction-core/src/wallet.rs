//! Per-auction wallet ledger.
//!
//! Tracks each participant's purse. Debits happen only at sale settlement;
//! the only credit path is the auction-wide reset.

use std::collections::HashMap;

use types::{AuctionId, Money, UserId, WalletAccount};

use crate::error::{EngineError, Result};

/// Purse accounts for every participant of one auction.
#[derive(Debug, Clone, Default)]
pub struct WalletLedger {
    auction_id: AuctionId,
    accounts: HashMap<UserId, WalletAccount>,
}

impl WalletLedger {
    /// Create an empty ledger for an auction.
    pub fn new(auction_id: AuctionId) -> Self {
        Self {
            auction_id,
            accounts: HashMap::new(),
        }
    }

    /// Open an account at the given starting purse.
    ///
    /// Re-opening an existing account is a no-op; the balance is preserved.
    pub fn open(&mut self, user_id: UserId, initial: Money) {
        self.accounts
            .entry(user_id)
            .or_insert_with(|| WalletAccount::new(self.auction_id, user_id, initial));
    }

    /// Get the account for a user.
    pub fn account(&self, user_id: UserId) -> Result<&WalletAccount> {
        self.accounts
            .get(&user_id)
            .ok_or(EngineError::UnknownParticipant(user_id))
    }

    /// Remaining balance for a user.
    pub fn balance(&self, user_id: UserId) -> Result<Money> {
        self.account(user_id).map(|a| a.balance)
    }

    /// Atomically decrement a user's balance.
    ///
    /// Fails with `InsufficientFunds` if the debit would leave the balance
    /// negative. The bid arbiter already checked funds at submit time; this
    /// re-check guards the window between submit and settlement.
    pub fn debit(&mut self, user_id: UserId, amount: Money) -> Result<Money> {
        let account = self
            .accounts
            .get_mut(&user_id)
            .ok_or(EngineError::UnknownParticipant(user_id))?;

        if account.balance < amount {
            return Err(EngineError::InsufficientFunds {
                balance: account.balance,
            });
        }

        account.balance -= amount;
        Ok(account.balance)
    }

    /// Roll back a debit from a settlement that failed halfway. Not a
    /// general credit path; settlement rollback is the only caller.
    pub(crate) fn refund(&mut self, user_id: UserId, amount: Money) {
        if let Some(account) = self.accounts.get_mut(&user_id) {
            account.balance += amount;
        }
    }

    /// Restore every account to its starting purse. Reset path only.
    pub fn restore_all(&mut self) {
        for account in self.accounts.values_mut() {
            account.balance = account.initial;
        }
    }

    /// All accounts, unordered.
    pub fn accounts(&self) -> impl Iterator<Item = &WalletAccount> {
        self.accounts.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with(user: UserId, initial: f64) -> WalletLedger {
        let mut ledger = WalletLedger::new(AuctionId(1));
        ledger.open(user, Money::from_float(initial));
        ledger
    }

    #[test]
    fn test_debit_reduces_balance() {
        let user = UserId(1);
        let mut ledger = ledger_with(user, 100.0);

        let remaining = ledger.debit(user, Money::from_float(40.0)).unwrap();
        assert_eq!(remaining, Money::from_float(60.0));
        assert_eq!(ledger.balance(user).unwrap(), Money::from_float(60.0));
    }

    #[test]
    fn test_debit_never_goes_negative() {
        let user = UserId(1);
        let mut ledger = ledger_with(user, 10.0);

        let err = ledger.debit(user, Money::from_float(10.5)).unwrap_err();
        assert_eq!(
            err,
            EngineError::InsufficientFunds {
                balance: Money::from_float(10.0)
            }
        );
        // Balance untouched after the failed debit.
        assert_eq!(ledger.balance(user).unwrap(), Money::from_float(10.0));
    }

    #[test]
    fn test_debit_exact_balance_is_allowed() {
        let user = UserId(1);
        let mut ledger = ledger_with(user, 10.0);

        let remaining = ledger.debit(user, Money::from_float(10.0)).unwrap();
        assert_eq!(remaining, Money::ZERO);
    }

    #[test]
    fn test_unknown_user() {
        let ledger = WalletLedger::new(AuctionId(1));
        assert_eq!(
            ledger.balance(UserId(9)).unwrap_err(),
            EngineError::UnknownParticipant(UserId(9))
        );
    }

    #[test]
    fn test_restore_all() {
        let user = UserId(1);
        let mut ledger = ledger_with(user, 100.0);
        ledger.debit(user, Money::from_float(75.0)).unwrap();

        ledger.restore_all();
        assert_eq!(ledger.balance(user).unwrap(), Money::from_float(100.0));
    }

    #[test]
    fn test_reopen_preserves_balance() {
        let user = UserId(1);
        let mut ledger = ledger_with(user, 100.0);
        ledger.debit(user, Money::from_float(30.0)).unwrap();

        ledger.open(user, Money::from_float(100.0));
        assert_eq!(ledger.balance(user).unwrap(), Money::from_float(70.0));
    }
}
