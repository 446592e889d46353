pub mod address;
pub mod amount;
pub mod commands;
pub mod epoch;
pub mod hash;
pub mod keys;
pub mod transaction;
pub mod utxo_pool;
pub mod validation;

pub use self::{
    address::*, amount::*, epoch::*, hash::*, keys::*, transaction::*, utxo_pool::*, validation::*,
};
