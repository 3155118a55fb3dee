//! Seam for validating ledger addresses.
//!
//! The address encoding (bech32 family, versioned by the ledger) is owned by
//! an external collaborator. This crate only asks it a yes/no question.

use crate::ast::Party;

pub trait AddressValidator {
    fn is_valid(&self, address: &str) -> bool;
}

impl<F> AddressValidator for F
where
    F: Fn(&str) -> bool,
{
    fn is_valid(&self, address: &str) -> bool {
        self(address)
    }
}

impl Party {
    /// Roles are always valid; addresses are checked by `validator`.
    pub fn validate_address(&self, validator: &dyn AddressValidator) -> bool {
        match self {
            Party::Address(address) => {
                let ok = validator.is_valid(address);
                if !ok {
                    tracing::debug!(address = %address, "address failed validation");
                }
                ok
            }
            Party::Role(_) => true,
        }
    }
}
