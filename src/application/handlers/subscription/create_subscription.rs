//! CreateSubscriptionHandler - Command handler for originating a subscription.
//!
//! Resolves (or creates) the provider customer for the caller, opens a
//! recurring subscription with the provider and stores a local `PENDING`
//! row. The provider's own status for the new subscription is ignored.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::billing::{
    BillingCycle, BillingError, BillingType, ExternalReference, PlanTerms, PlanValue,
    Subscription,
};
use crate::domain::foundation::{AuthenticatedUser, ClinicId, Timestamp, ValidationError};
use crate::ports::{
    BillingProvider, ClinicDirectory, NewCustomer, NewSubscription, ProviderCustomer,
    SubscriptionRepository,
};

/// Days between creation and the first charge.
pub const FIRST_DUE_IN_DAYS: i64 = 7;

/// Command to start a subscription for a clinic.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionCommand {
    pub user: AuthenticatedUser,
    pub clinic_id: String,
    pub plan_name: String,
    pub value: f64,
    pub cycle: String,
    pub billing_type: String,
    pub description: Option<String>,
}

/// Result of successful creation.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionResult {
    pub subscription: Subscription,
    /// Hosted page for the first charge, when the provider generated one.
    pub payment_url: Option<String>,
}

pub struct CreateSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
    provider: Arc<dyn BillingProvider>,
    clinics: Arc<dyn ClinicDirectory>,
}

impl CreateSubscriptionHandler {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        provider: Arc<dyn BillingProvider>,
        clinics: Arc<dyn ClinicDirectory>,
    ) -> Self {
        Self {
            repository,
            provider,
            clinics,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateSubscriptionCommand,
    ) -> Result<CreateSubscriptionResult, BillingError> {
        // 1. Validate input
        let clinic_id = ClinicId::parse(&cmd.clinic_id)?;
        let terms = parse_terms(&cmd)?;

        // 2. Authorize caller
        if !self.clinics.is_member(&cmd.user.id, &clinic_id).await? {
            tracing::warn!(user_id = %cmd.user.id, clinic_id = %clinic_id, "Caller is not a clinic member");
            return Err(BillingError::forbidden("Access denied to this clinic"));
        }

        // 3. Resolve provider customer
        let customer = self.resolve_customer(&cmd.user, clinic_id).await?;

        // 4. Open the provider subscription
        let next_due_date = first_due_date(Timestamp::now());
        let reference = ExternalReference::new(clinic_id, terms.plan_name.clone());

        let created = self
            .provider
            .create_subscription(NewSubscription {
                customer_id: customer.id.clone(),
                billing_type: terms.billing_type,
                cycle: terms.cycle,
                value: terms.value,
                next_due_date,
                description: terms.description.clone(),
                external_reference: reference.to_string(),
            })
            .await
            .map_err(|e| {
                tracing::error!(clinic_id = %clinic_id, error = %e, "Provider subscription creation failed");
                BillingError::upstream(e.message)
            })?;

        tracing::info!(
            clinic_id = %clinic_id,
            provider_subscription_id = %created.id,
            provider_status = %created.status.as_str(),
            "Provider subscription created"
        );

        // 5. First charge link, best-effort
        let payment_url = match self.provider.latest_payment(&created.id).await {
            Ok(payment) => payment.and_then(|p| p.invoice_url),
            Err(e) => {
                tracing::warn!(provider_subscription_id = %created.id, error = %e, "Could not fetch first payment");
                None
            }
        };

        // 6. Persist locally as PENDING
        let subscription = Subscription::pending(
            clinic_id,
            created.id.clone(),
            &terms,
            created.next_due_date.or(Some(next_due_date)),
        );

        if let Err(e) = self.repository.insert(&subscription).await {
            tracing::error!(
                clinic_id = %clinic_id,
                provider_subscription_id = %created.id,
                error = %e,
                "Local insert failed, provider subscription left without a local row"
            );
            return Err(BillingError::persistence(e.message));
        }

        tracing::info!(
            subscription_id = %subscription.id,
            clinic_id = %clinic_id,
            plan_name = %subscription.plan_name,
            "Subscription created"
        );

        Ok(CreateSubscriptionResult {
            subscription,
            payment_url,
        })
    }

    async fn resolve_customer(
        &self,
        user: &AuthenticatedUser,
        clinic_id: ClinicId,
    ) -> Result<ProviderCustomer, BillingError> {
        let profile = self
            .clinics
            .find_profile(&user.id)
            .await?
            .ok_or_else(|| BillingError::bad_request("User profile not found"))?;

        let (name, document, phone) = profile.billing_identity().ok_or_else(|| {
            BillingError::bad_request("Profile must have name, CPF/CNPJ and phone")
        })?;

        let existing = self
            .provider
            .find_customer_by_email(&user.email)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Customer lookup failed");
                BillingError::upstream(e.message)
            })?;

        if let Some(customer) = existing {
            tracing::debug!(customer_id = %customer.id, "Reusing provider customer");
            return Ok(customer);
        }

        let customer = self
            .provider
            .create_customer(NewCustomer {
                name: name.to_string(),
                email: user.email.clone(),
                cpf_cnpj: document.to_string(),
                phone: phone.to_string(),
                external_reference: ExternalReference::for_customer(clinic_id).to_string(),
            })
            .await
            .map_err(|e| {
                tracing::error!(clinic_id = %clinic_id, error = %e, "Customer creation failed");
                BillingError::upstream(e.message)
            })?;

        tracing::info!(customer_id = %customer.id, clinic_id = %clinic_id, "Provider customer created");
        Ok(customer)
    }
}

fn parse_terms(cmd: &CreateSubscriptionCommand) -> Result<PlanTerms, ValidationError> {
    let plan_name = cmd.plan_name.trim();
    if plan_name.is_empty() {
        return Err(ValidationError::empty_field("plan_name"));
    }

    Ok(PlanTerms {
        plan_name: plan_name.to_string(),
        value: PlanValue::from_decimal(cmd.value)?,
        cycle: cmd.cycle.parse::<BillingCycle>()?,
        billing_type: cmd.billing_type.parse::<BillingType>()?,
        description: cmd
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
    })
}

fn first_due_date(now: Timestamp) -> NaiveDate {
    now.add_days(FIRST_DUE_IN_DAYS).date()
}
