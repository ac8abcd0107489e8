use marketplace_core::contract::{PaymentIntentParams, PaymentIntentResult};

pub trait PaymentProcessor {
    fn create_payment_intent(
        &self,
        params: &PaymentIntentParams,
    ) -> Result<PaymentIntentResult, String>;
}

impl<F> PaymentProcessor for F
where
    F: Fn(&PaymentIntentParams) -> Result<PaymentIntentResult, String>,
{
    fn create_payment_intent(
        &self,
        params: &PaymentIntentParams,
    ) -> Result<PaymentIntentResult, String> {
        self(params)
    }
}
