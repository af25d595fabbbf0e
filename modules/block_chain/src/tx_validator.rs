//! Transaction validation against an unspent-output snapshot.

use std::collections::HashSet;

use arbor_common::{Transaction, UtxoSnapshot};
use tracing::debug;

use crate::chain_error::TransactionValidationError;

/// Outcome of validating a batch of transactions.
#[derive(Debug, Clone)]
pub struct ValidatedTransactions {
    /// The accepted subset, in the order it was applied.
    pub accepted: Vec<Transaction>,
    /// The input snapshot with every accepted transaction applied.
    pub snapshot: UtxoSnapshot,
}

/// Checks a batch of transactions against a snapshot.
///
/// Returns the largest mutually consistent subset it can find and the
/// resulting snapshot. An accepted subset smaller than the input means at
/// least one transaction was invalid.
pub trait TransactionValidator {
    fn validate(&self, snapshot: UtxoSnapshot, transactions: &[Transaction])
        -> ValidatedTransactions;
}

/// Plain UTXO rules: inputs must be unspent and claimed once, and a
/// transaction may not create more value than it consumes.
///
/// Signatures are not checked here.
#[derive(Debug, Default, Clone, Copy)]
pub struct UtxoTransactionValidator;

impl UtxoTransactionValidator {
    /// Validate a single transaction against the snapshot.
    pub fn check(
        &self,
        snapshot: &UtxoSnapshot,
        tx: &Transaction,
    ) -> Result<(), TransactionValidationError> {
        if tx.inputs.is_empty() {
            return Err(TransactionValidationError::NoInputs);
        }

        let mut claimed = HashSet::new();
        let mut consumed: u128 = 0;
        for input in &tx.inputs {
            if !claimed.insert(input.utxo) {
                return Err(TransactionValidationError::DuplicateInput { utxo: input.utxo });
            }
            let output = snapshot
                .lookup(&input.utxo)
                .ok_or(TransactionValidationError::MissingInput { utxo: input.utxo })?;
            consumed += u128::from(output.value);
        }

        let produced: u128 = tx.outputs.iter().map(|o| u128::from(o.value)).sum();
        if produced > consumed {
            return Err(TransactionValidationError::ValueNotConserved { consumed, produced });
        }

        Ok(())
    }

    fn apply(snapshot: &mut UtxoSnapshot, tx: &Transaction) {
        for input in &tx.inputs {
            snapshot.spend(&input.utxo);
        }
        snapshot.apply_outputs(tx.hash(), &tx.outputs);
    }
}

impl TransactionValidator for UtxoTransactionValidator {
    fn validate(
        &self,
        mut snapshot: UtxoSnapshot,
        transactions: &[Transaction],
    ) -> ValidatedTransactions {
        let mut accepted = Vec::with_capacity(transactions.len());
        let mut pending: Vec<&Transaction> = transactions.iter().collect();
        let mut rejected = Vec::new();

        // Keep sweeping until nothing new applies, so a transaction listed
        // before the one it spends from still gets in
        loop {
            let before = pending.len();
            rejected.clear();
            pending.retain(|tx| match self.check(&snapshot, tx) {
                Ok(()) => {
                    Self::apply(&mut snapshot, tx);
                    accepted.push((*tx).clone());
                    false
                }
                Err(e) => {
                    rejected.push((tx.hash(), e));
                    true
                }
            });
            if pending.is_empty() || pending.len() == before {
                break;
            }
        }

        for (hash, e) in &rejected {
            debug!(tx = %hash, "Transaction rejected: {e}");
        }

        ValidatedTransactions { accepted, snapshot }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{address, funded_snapshot, spend};
    use arbor_common::{TxInput, TxOutput, UTxOIdentifier};
    use test_case::test_case;

    #[test]
    fn accepts_valid_spend() {
        let (snapshot, utxo) = funded_snapshot(25);
        let tx = spend(&[utxo], &[(2, 20)]);

        let result = UtxoTransactionValidator.validate(snapshot, &[tx.clone()]);
        assert_eq!(result.accepted, vec![tx.clone()]);
        assert!(!result.snapshot.contains(&utxo));
        assert!(result.snapshot.contains(&UTxOIdentifier::new(tx.hash(), 0)));
    }

    #[test]
    fn input_snapshot_is_consumed_not_shared() {
        let (snapshot, utxo) = funded_snapshot(25);
        let original = snapshot.clone();
        let tx = spend(&[utxo], &[(2, 25)]);

        let result = UtxoTransactionValidator.validate(snapshot, &[tx]);
        assert_eq!(result.accepted.len(), 1);
        assert!(original.contains(&utxo));
    }

    #[test_case(25, 25 => true ; "exact value")]
    #[test_case(25, 10 => true ; "value burnt as fee")]
    #[test_case(25, 26 => false ; "value created")]
    fn value_conservation(available: u64, paid: u64) -> bool {
        let (snapshot, utxo) = funded_snapshot(available);
        UtxoTransactionValidator.check(&snapshot, &spend(&[utxo], &[(2, paid)])).is_ok()
    }

    #[test]
    fn rejects_missing_input() {
        let (snapshot, _) = funded_snapshot(25);
        let unknown = UTxOIdentifier::new(Default::default(), 9);
        let result = UtxoTransactionValidator.check(&snapshot, &spend(&[unknown], &[(2, 1)]));
        assert_eq!(result, Err(TransactionValidationError::MissingInput { utxo: unknown }));
    }

    #[test]
    fn rejects_duplicate_input_within_transaction() {
        let (snapshot, utxo) = funded_snapshot(25);
        let tx = Transaction::new(
            vec![TxInput::new(utxo), TxInput::new(utxo)],
            vec![TxOutput::new(address(2), 50)],
        );
        assert_eq!(
            UtxoTransactionValidator.check(&snapshot, &tx),
            Err(TransactionValidationError::DuplicateInput { utxo })
        );
    }

    #[test]
    fn rejects_input_free_transaction() {
        let (snapshot, _) = funded_snapshot(25);
        let tx = Transaction::coinbase(address(2), 25, 0);
        assert_eq!(
            UtxoTransactionValidator.check(&snapshot, &tx),
            Err(TransactionValidationError::NoInputs)
        );
    }

    #[test]
    fn second_spend_of_same_output_is_dropped() {
        let (snapshot, utxo) = funded_snapshot(25);
        let first = spend(&[utxo], &[(2, 25)]);
        let second = spend(&[utxo], &[(3, 25)]);

        let result = UtxoTransactionValidator.validate(snapshot, &[first.clone(), second]);
        assert_eq!(result.accepted, vec![first]);
    }

    #[test]
    fn dependent_transaction_listed_first_is_accepted() {
        let (snapshot, utxo) = funded_snapshot(25);
        let parent = spend(&[utxo], &[(2, 25)]);
        let child = spend(&[UTxOIdentifier::new(parent.hash(), 0)], &[(3, 25)]);

        let result =
            UtxoTransactionValidator.validate(snapshot, &[child.clone(), parent.clone()]);
        assert_eq!(result.accepted, vec![parent, child.clone()]);
        assert!(result.snapshot.contains(&UTxOIdentifier::new(child.hash(), 0)));
    }
}
