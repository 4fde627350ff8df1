use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    MobileMoney,
    BankTransfer,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub reference: String,
    pub amount: i64,
    pub method: PaymentMethod,
}

#[derive(Debug)]
pub enum PaymentError {
    /// The provider processed the charge and turned it down.
    Declined,
    /// The provider could not be reached or returned an unexpected answer.
    Gateway(String),
}

impl fmt::Display for PaymentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentError::Declined => write!(f, "payment declined"),
            PaymentError::Gateway(msg) => write!(f, "payment gateway error: {msg}"),
        }
    }
}

impl std::error::Error for PaymentError {}

/// Seam for the deposit charge. Handlers only see this trait; the binary
/// wires in [`SimulatedGateway`], tests wire in deterministic fakes.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn charge(&self, amount: i64, method: PaymentMethod) -> Result<Receipt, PaymentError>;
}

/// Stand-in gateway: waits a bit, then approves with a configurable
/// probability (0.8 unless overridden).
pub struct SimulatedGateway {
    success_rate: f64,
    delay: Duration,
}

impl SimulatedGateway {
    pub fn new(success_rate: f64, delay: Duration) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
            delay,
        }
    }
}

#[async_trait]
impl PaymentProvider for SimulatedGateway {
    async fn charge(&self, amount: i64, method: PaymentMethod) -> Result<Receipt, PaymentError> {
        tokio::time::sleep(self.delay).await;

        if !rand::thread_rng().gen_bool(self.success_rate) {
            return Err(PaymentError::Declined);
        }

        Ok(Receipt {
            reference: new_reference(),
            amount,
            method,
        })
    }
}

fn new_reference() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(10)
        .map(char::from)
        .collect();
    format!("PAY-{}", suffix.to_uppercase())
}

#[cfg(test)]
pub mod fakes {
    use super::*;

    pub struct AlwaysApprove;

    #[async_trait]
    impl PaymentProvider for AlwaysApprove {
        async fn charge(
            &self,
            amount: i64,
            method: PaymentMethod,
        ) -> Result<Receipt, PaymentError> {
            Ok(Receipt {
                reference: "PAY-TEST000001".to_string(),
                amount,
                method,
            })
        }
    }

    pub struct AlwaysDecline;

    #[async_trait]
    impl PaymentProvider for AlwaysDecline {
        async fn charge(
            &self,
            _amount: i64,
            _method: PaymentMethod,
        ) -> Result<Receipt, PaymentError> {
            Err(PaymentError::Declined)
        }
    }
}
