pub mod execution;
pub mod token;
pub mod wager;

pub use execution::{
    transaction_namespace, Account, Event, Instruction, Key, Output, Transaction, Value, NAMESPACE,
};
pub use token::TokenAccount;
