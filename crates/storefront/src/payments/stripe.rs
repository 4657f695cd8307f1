//! Stripe Checkout implementation of the payment gateway.
//!
//! Uses the hosted Checkout Sessions API: a form-encoded POST to
//! `/v1/checkout/sessions` returns a session with a redirect URL.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::StripeConfig;

use super::{LineItem, PaymentError, PaymentGateway, PaymentSession};

/// How much of an error body to keep for diagnostics.
const ERROR_BODY_LIMIT: usize = 200;

/// Client for the Stripe Checkout Sessions API.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    endpoint: String,
    secret_key: SecretString,
}

/// Response shape for a created checkout session.
#[derive(Debug, Deserialize)]
struct CheckoutSessionResponse {
    url: String,
}

impl StripeClient {
    /// Create a new Stripe client.
    ///
    /// The underlying HTTP client carries the configured request timeout, so
    /// a stalled gateway cannot hold a checkout open indefinitely.
    #[must_use]
    pub fn new(config: &StripeConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            endpoint: format!(
                "{}/v1/checkout/sessions",
                config.api_base.trim_end_matches('/')
            ),
            secret_key: config.secret_key.clone(),
        }
    }

    /// Encode line items and session parameters as Stripe's indexed form fields.
    fn session_form(
        line_items: &[LineItem],
        success_url: &str,
        cancel_url: &str,
    ) -> Vec<(String, String)> {
        let mut form = vec![
            ("mode".to_owned(), "payment".to_owned()),
            ("payment_method_types[0]".to_owned(), "card".to_owned()),
            ("success_url".to_owned(), success_url.to_owned()),
            ("cancel_url".to_owned(), cancel_url.to_owned()),
        ];

        for (i, item) in line_items.iter().enumerate() {
            form.push((
                format!("line_items[{i}][price_data][product_data][name]"),
                item.name.clone(),
            ));
            form.push((
                format!("line_items[{i}][price_data][unit_amount]"),
                item.unit_amount.to_string(),
            ));
            form.push((
                format!("line_items[{i}][price_data][currency]"),
                item.currency.clone(),
            ));
            form.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
        }

        form
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    #[instrument(skip(self, line_items), fields(items = line_items.len()))]
    async fn create_session(
        &self,
        line_items: &[LineItem],
        success_url: &str,
        cancel_url: &str,
    ) -> Result<PaymentSession, PaymentError> {
        let form = Self::session_form(line_items, success_url, cancel_url);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.secret_key.expose_secret())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let session: CheckoutSessionResponse = serde_json::from_str(&body)?;
        debug!("created checkout session");

        Ok(PaymentSession { url: session.url })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_form_encodes_indexed_line_items() {
        let items = vec![
            LineItem {
                name: "Widget".to_owned(),
                unit_amount: 999,
                currency: "usd".to_owned(),
                quantity: 1,
            },
            LineItem {
                name: "Gadget".to_owned(),
                unit_amount: 2500,
                currency: "usd".to_owned(),
                quantity: 1,
            },
        ];

        let form = StripeClient::session_form(&items, "http://s/ok", "http://s/no");

        assert!(form.contains(&("mode".to_owned(), "payment".to_owned())));
        assert!(form.contains(&(
            "line_items[0][price_data][product_data][name]".to_owned(),
            "Widget".to_owned()
        )));
        assert!(form.contains(&(
            "line_items[0][price_data][unit_amount]".to_owned(),
            "999".to_owned()
        )));
        assert!(form.contains(&(
            "line_items[1][price_data][product_data][name]".to_owned(),
            "Gadget".to_owned()
        )));
        assert!(form.contains(&("line_items[1][quantity]".to_owned(), "1".to_owned())));
        assert!(form.contains(&("success_url".to_owned(), "http://s/ok".to_owned())));
    }
}
