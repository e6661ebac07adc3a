use alloy_primitives::{Address, U256};
use dashmap::DashMap;
use std::collections::HashMap;
use thiserror::Error;
use tracing::trace;

/// (asset, holder) -> balance
pub type BalanceKey = (Address, Address);
/// (asset, owner, spender) -> remaining allowance
pub type AllowanceKey = (Address, Address, Address);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient balance of {asset} for {holder}: have {have}, need {need}")]
    InsufficientBalance { asset: Address, holder: Address, have: U256, need: U256 },
    #[error("insufficient allowance of {asset} from {owner} to {spender}: have {have}, need {need}")]
    InsufficientAllowance { asset: Address, owner: Address, spender: Address, have: U256, need: U256 },
}

/// Read access to token balances and allowances, either durable state or a
/// frame's staged view of it. Venue math quotes against this.
pub trait BalanceView {
    fn balance_of(&self, asset: Address, holder: Address) -> U256;
    fn allowance(&self, asset: Address, owner: Address, spender: Address) -> U256;
}

/// Durable token state for the whole simulated world.
///
/// Balances and allowances only ever change through a [`LedgerFrame`]: all
/// mutations inside one unit of work are staged in the frame and flushed here
/// on commit. Dropping a frame without committing discards every staged write,
/// which is how whole-transaction revert is reproduced without a host VM.
#[derive(Debug, Default)]
pub struct TokenLedger {
    balances: DashMap<BalanceKey, U256>,
    allowances: DashMap<AllowanceKey, U256>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a durable balance outside any frame. World setup only.
    pub fn credit(&self, asset: Address, holder: Address, amount: U256) {
        let mut entry = self.balances.entry((asset, holder)).or_insert(U256::ZERO);
        *entry += amount;
    }

    /// Open a unit of work. All writes stage in the frame until `commit`.
    pub fn begin(&self) -> LedgerFrame<'_> {
        LedgerFrame { base: self, balances: HashMap::new(), allowances: HashMap::new() }
    }
}

impl BalanceView for TokenLedger {
    fn balance_of(&self, asset: Address, holder: Address) -> U256 {
        self.balances.get(&(asset, holder)).map(|v| *v).unwrap_or(U256::ZERO)
    }

    fn allowance(&self, asset: Address, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(asset, owner, spender)).map(|v| *v).unwrap_or(U256::ZERO)
    }
}

/// Staged overlay over a [`TokenLedger`].
///
/// Reads fall through to durable state for keys not yet written in this frame.
/// `commit` flushes the overlay; dropping the frame discards it, leaving
/// durable state byte-for-byte unchanged.
#[derive(Debug)]
pub struct LedgerFrame<'a> {
    base: &'a TokenLedger,
    balances: HashMap<BalanceKey, U256>,
    allowances: HashMap<AllowanceKey, U256>,
}

impl LedgerFrame<'_> {
    fn set_balance(&mut self, asset: Address, holder: Address, amount: U256) {
        self.balances.insert((asset, holder), amount);
    }

    fn set_allowance(&mut self, asset: Address, owner: Address, spender: Address, amount: U256) {
        self.allowances.insert((asset, owner, spender), amount);
    }

    /// Move `amount` of `asset` from `from` to `to`.
    pub fn transfer(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let have = self.balance_of(asset, from);
        if have < amount {
            return Err(LedgerError::InsufficientBalance { asset, holder: from, have, need: amount });
        }
        self.set_balance(asset, from, have - amount);
        let to_balance = self.balance_of(asset, to);
        self.set_balance(asset, to, to_balance + amount);
        trace!(%asset, %from, %to, %amount, "transfer");
        Ok(())
    }

    /// Set `spender`'s allowance over `owner`'s `asset` to exactly `amount`,
    /// replacing any previous grant.
    pub fn approve(&mut self, asset: Address, owner: Address, spender: Address, amount: U256) {
        trace!(%asset, %owner, %spender, %amount, "approve");
        self.set_allowance(asset, owner, spender, amount);
    }

    /// Spend `spender`'s allowance to move `amount` of `asset` from `owner` to
    /// `to`. The allowance is debited by the amount spent.
    pub fn transfer_from(
        &mut self,
        asset: Address,
        owner: Address,
        spender: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let granted = self.allowance(asset, owner, spender);
        if granted < amount {
            return Err(LedgerError::InsufficientAllowance {
                asset,
                owner,
                spender,
                have: granted,
                need: amount,
            });
        }
        self.transfer(asset, owner, to, amount)?;
        self.set_allowance(asset, owner, spender, granted - amount);
        Ok(())
    }

    /// Flush every staged write into durable state.
    pub fn commit(self) {
        trace!(
            balance_writes = self.balances.len(),
            allowance_writes = self.allowances.len(),
            "commit frame"
        );
        for (key, value) in self.balances {
            self.base.balances.insert(key, value);
        }
        for (key, value) in self.allowances {
            self.base.allowances.insert(key, value);
        }
    }
}

impl BalanceView for LedgerFrame<'_> {
    fn balance_of(&self, asset: Address, holder: Address) -> U256 {
        match self.balances.get(&(asset, holder)) {
            Some(staged) => *staged,
            None => self.base.balance_of(asset, holder),
        }
    }

    fn allowance(&self, asset: Address, owner: Address, spender: Address) -> U256 {
        match self.allowances.get(&(asset, owner, spender)) {
            Some(staged) => *staged,
            None => self.base.allowance(asset, owner, spender),
        }
    }
}
