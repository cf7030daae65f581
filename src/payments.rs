//! Payment intent creation.
//!
//! The frontend completes card payments itself; the server only mints the
//! PaymentIntent and hands back its client secret.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::error::AppError;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";
const STRIPE_TIMEOUT: Duration = Duration::from_secs(30);

/// Currency every intent is created in.
pub const CURRENCY: &str = "usd";

/// Parameters of one intent, in the processor's minor units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentRequest {
    pub amount: i64,
    pub currency: String,
    pub payment_method_types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

/// A hosted payment processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(&self, request: IntentRequest)
        -> Result<PaymentIntent, AppError>;
}

/// Stripe's REST API, form-encoded as Stripe expects.
#[derive(Clone)]
pub struct StripeGateway {
    client: Client,
    base_url: String,
    secret_key: String,
}

impl StripeGateway {
    pub fn new(secret_key: &str) -> Result<Self, AppError> {
        Self::with_base_url(secret_key, STRIPE_API_BASE)
    }

    pub fn with_base_url(secret_key: &str, base_url: &str) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(STRIPE_TIMEOUT)
            .build()
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        })
    }
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: String,
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_payment_intent(
        &self,
        request: IntentRequest,
    ) -> Result<PaymentIntent, AppError> {
        let mut form = vec![
            ("amount".to_string(), request.amount.to_string()),
            ("currency".to_string(), request.currency.clone()),
        ];
        for method in &request.payment_method_types {
            form.push(("payment_method_types[]".to_string(), method.clone()));
        }

        let response = self
            .client
            .post(format!("{}/payment_intents", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<StripeErrorBody>().await {
                Ok(body) => body.error.message,
                Err(_) => format!("payment processor returned {}", status),
            };
            return Err(AppError::UpstreamFailure(message));
        }

        let intent: PaymentIntent = response.json().await?;
        log::info!("created payment intent {} for {} {}", intent.id, request.amount, request.currency);
        Ok(intent)
    }
}

/// Body of `POST /create-payment-intent`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentIntentRequest {
    pub price: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

/// Largest whole-unit price whose minor-unit amount still fits in an `i64`.
const MAX_PRICE: i64 = i64::MAX / 100;

/// Converts a major-unit price to minor units: the price is truncated to whole
/// units first, then scaled by 100 (`100.9` -> `10000`).
pub fn minor_units(price: Option<f64>) -> Result<i64, AppError> {
    let price = price.ok_or_else(|| AppError::ValidationError("price is required".into()))?;
    let whole = price.trunc();
    if !whole.is_finite() || whole < 1.0 {
        return Err(AppError::ValidationError(
            "price must be a positive number".into(),
        ));
    }
    if whole > MAX_PRICE as f64 {
        return Err(AppError::ValidationError(format!(
            "price must not exceed {}",
            MAX_PRICE
        )));
    }
    (whole as i64)
        .checked_mul(100)
        .ok_or_else(|| AppError::ValidationError("price is too large".into()))
}

/// Card-only, single-currency intents on top of a `PaymentGateway`.
#[derive(Clone)]
pub struct PaymentIntentAdapter {
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentIntentAdapter {
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { gateway }
    }

    /// Returns the client secret for a payment of `price`.
    pub async fn create_intent(&self, price: Option<f64>) -> Result<String, AppError> {
        let request = IntentRequest {
            amount: minor_units(price)?,
            currency: CURRENCY.to_string(),
            payment_method_types: vec!["card".to_string()],
        };
        let intent = self.gateway.create_payment_intent(request).await?;
        Ok(intent.client_secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockGateway;

    #[test]
    fn test_minor_units() {
        assert_eq!(minor_units(Some(100.0)).unwrap(), 10000);
        assert_eq!(minor_units(Some(100.9)).unwrap(), 10000);
        assert_eq!(minor_units(Some(1.0)).unwrap(), 100);

        assert!(matches!(minor_units(None), Err(AppError::ValidationError(_))));
        assert!(matches!(minor_units(Some(0.0)), Err(AppError::ValidationError(_))));
        assert!(matches!(minor_units(Some(0.5)), Err(AppError::ValidationError(_))));
        assert!(matches!(minor_units(Some(-20.0)), Err(AppError::ValidationError(_))));
        assert!(matches!(
            minor_units(Some(f64::NAN)),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_huge_prices_are_rejected_not_wrapped() {
        assert!(matches!(
            minor_units(Some(1e300)),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            minor_units(Some(f64::INFINITY)),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            minor_units(Some(1e17)),
            Err(AppError::ValidationError(_))
        ));

        let largest = minor_units(Some(1e16)).unwrap();
        assert_eq!(largest, 1_000_000_000_000_000_000);
    }

    #[actix_rt::test]
    async fn test_adapter_requests_card_only_usd() {
        let gateway = MockGateway::new("pi_1_secret_abc");
        let adapter = PaymentIntentAdapter::new(Arc::new(gateway.clone()));

        let secret = adapter.create_intent(Some(100.0)).await.unwrap();

        assert_eq!(secret, "pi_1_secret_abc");
        assert_eq!(
            gateway.requests(),
            vec![IntentRequest {
                amount: 10000,
                currency: "usd".to_string(),
                payment_method_types: vec!["card".to_string()],
            }]
        );
    }

    #[actix_rt::test]
    async fn test_missing_price_never_reaches_the_gateway() {
        let gateway = MockGateway::new("unused");
        let adapter = PaymentIntentAdapter::new(Arc::new(gateway.clone()));

        assert!(adapter.create_intent(None).await.is_err());
        assert!(gateway.requests().is_empty());
    }
}
