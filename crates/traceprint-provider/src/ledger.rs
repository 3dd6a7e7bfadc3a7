//! Credit accounting for paid providers.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use traceprint_core::WorkspaceId;

/// Outcome of an attempted debit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    /// The full amount was deducted
    Accepted {
        /// Balance left after the debit
        remaining: u32,
    },
    /// Nothing was deducted; the balance was too low
    InsufficientFunds {
        /// Balance at the time of the attempt
        available: u32,
        /// Amount that was requested
        required: u32,
    },
}

impl DebitOutcome {
    /// Whether the debit went through.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Credit store consulted at session admission.
///
/// Debits are all-or-nothing: either the whole amount comes off the
/// balance or the balance is untouched. The engine charges a workspace
/// exactly once per admitted session, before any provider runs.
#[async_trait]
pub trait CreditLedger: Send + Sync {
    /// Atomically deduct `amount` credits, or deduct nothing.
    async fn debit(&self, workspace: &WorkspaceId, amount: u32) -> DebitOutcome;

    /// Current balance for a workspace (0 if unknown).
    async fn balance(&self, workspace: &WorkspaceId) -> u32;
}

/// In-memory ledger for tests and single-process deployments.
#[derive(Clone, Default)]
pub struct InMemoryLedger {
    balances: Arc<RwLock<HashMap<WorkspaceId, u32>>>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a workspace's balance (builder style).
    #[must_use]
    pub fn with_balance(self, workspace: WorkspaceId, amount: u32) -> Self {
        {
            let mut balances = self
                .balances
                .write()
                .expect("acquire write lock on balances");
            balances.insert(workspace, amount);
        }
        self
    }

    /// Add credits to a workspace.
    pub fn grant(&self, workspace: &WorkspaceId, amount: u32) {
        let mut balances = self
            .balances
            .write()
            .expect("acquire write lock on balances");
        *balances.entry(workspace.clone()).or_insert(0) += amount;
    }
}

#[async_trait]
impl CreditLedger for InMemoryLedger {
    async fn debit(&self, workspace: &WorkspaceId, amount: u32) -> DebitOutcome {
        let mut balances = self
            .balances
            .write()
            .expect("acquire write lock on balances");
        let balance = balances.entry(workspace.clone()).or_insert(0);

        if *balance >= amount {
            *balance -= amount;
            DebitOutcome::Accepted { remaining: *balance }
        } else {
            DebitOutcome::InsufficientFunds {
                available: *balance,
                required: amount,
            }
        }
    }

    async fn balance(&self, workspace: &WorkspaceId) -> u32 {
        let balances = self
            .balances
            .read()
            .expect("acquire read lock on balances");
        balances.get(workspace).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace() -> WorkspaceId {
        WorkspaceId::new("acme").expect("valid workspace id")
    }

    #[tokio::test]
    async fn test_debit_all_or_nothing() {
        let ledger = InMemoryLedger::new().with_balance(workspace(), 5);

        let outcome = ledger.debit(&workspace(), 3).await;
        assert_eq!(outcome, DebitOutcome::Accepted { remaining: 2 });

        // 3 > 2 remaining: nothing comes off
        let outcome = ledger.debit(&workspace(), 3).await;
        assert_eq!(
            outcome,
            DebitOutcome::InsufficientFunds {
                available: 2,
                required: 3
            }
        );
        assert_eq!(ledger.balance(&workspace()).await, 2);
    }

    #[tokio::test]
    async fn test_zero_cost_debit_always_accepted() {
        let ledger = InMemoryLedger::new();
        let outcome = ledger.debit(&workspace(), 0).await;
        assert!(outcome.is_accepted());
    }

    #[tokio::test]
    async fn test_grant() {
        let ledger = InMemoryLedger::new();
        assert_eq!(ledger.balance(&workspace()).await, 0);
        ledger.grant(&workspace(), 10);
        assert_eq!(ledger.balance(&workspace()).await, 10);
    }
}
