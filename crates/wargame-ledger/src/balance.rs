//! Checked money operations on player balances.

use crate::LedgerError;

/// Subtract `amount` from `balance`.
///
/// # Errors
///
/// Returns [`LedgerError::InsufficientFunds`] if the balance does not cover
/// the amount.
pub const fn debit(balance: u64, amount: u64) -> Result<u64, LedgerError> {
    match balance.checked_sub(amount) {
        Some(remaining) => Ok(remaining),
        None => Err(LedgerError::InsufficientFunds {
            requested: amount,
            available: balance,
        }),
    }
}

/// Add `amount` to `balance`.
///
/// # Errors
///
/// Returns [`LedgerError::ArithmeticOverflow`] on overflow.
pub const fn credit(balance: u64, amount: u64) -> Result<u64, LedgerError> {
    match balance.checked_add(amount) {
        Some(total) => Ok(total),
        None => Err(LedgerError::ArithmeticOverflow("balance overflow")),
    }
}

/// Whether `balance` covers `amount`.
pub const fn covers(balance: u64, amount: u64) -> bool {
    balance >= amount
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debit_within_balance() {
        assert_eq!(debit(100, 10), Ok(90));
        assert_eq!(debit(10, 10), Ok(0));
    }

    #[test]
    fn debit_beyond_balance_fails() {
        assert_eq!(
            debit(5, 10),
            Err(LedgerError::InsufficientFunds {
                requested: 10,
                available: 5,
            })
        );
    }

    #[test]
    fn credit_overflow_fails() {
        assert!(credit(u64::MAX, 1).is_err());
        assert_eq!(credit(1, 2), Ok(3));
    }

    #[test]
    fn covers_is_inclusive() {
        assert!(covers(10, 10));
        assert!(!covers(9, 10));
    }
}
