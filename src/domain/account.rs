use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// A buyer's account and wallet balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub balance: BigDecimal,
}

impl Account {
    pub fn new(id: i64, name: impl Into<String>, email: impl Into<String>, balance: BigDecimal) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            balance,
        }
    }

    pub fn can_afford(&self, amount: &BigDecimal) -> bool {
        &self.balance >= amount
    }
}
