//! Connects form engines to the gateway and the notification sink.
//!
//! A [`FormController`] shares one [`FormEngine`] behind an async mutex. The
//! lock is only held while validating and while recording the outcome, never
//! across the network call, so the engine's `Submitting` phase is what turns
//! a second `submit` into a no-op. A submission whose future is dropped
//! before the gateway answers is settled as failed.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};
use zendulge_domain::{BusinessRegistration, CustomerRegistration, User};

use crate::api::{ApiClient, GatewayError, Resource, ResourceGateway};
use crate::errors::ZendulgeError;
use crate::forms::{
    FieldErrors, FieldValue, FormEngine, FormError, FormFlow, FormMode, FormPhase, SubmitBlocked,
};
use crate::notify::{Notification, NotificationSink};

/// Where a validated payload goes.
#[async_trait]
pub trait SubmitTarget<P: Sync>: Send + Sync {
    type Response: Send;

    /// Lowercase noun for toasts, e.g. `site`.
    fn subject(&self) -> &str;

    /// `create` or `update`.
    fn verb(&self) -> &'static str;

    async fn send(&self, payload: &P) -> Result<Self::Response, GatewayError>;
}

fn success_title(subject: &str, verb: &str) -> String {
    let mut chars = subject.chars();
    let subject = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    format!("{} {}d", subject, verb)
}

fn failure_title(subject: &str, verb: &str) -> String {
    format!("Failed to {} {}", verb, subject)
}

/// Creates or updates one record of `R` under a parent.
pub struct ResourceTarget<'a, R, G> {
    gateway: &'a G,
    parent_id: String,
    mode: FormMode,
    _resource: PhantomData<R>,
}

impl<'a, R, G> ResourceTarget<'a, R, G>
where
    R: Resource,
    G: ResourceGateway<R>,
{
    pub fn new(gateway: &'a G, parent_id: impl Into<String>, mode: FormMode) -> Self {
        Self {
            gateway,
            parent_id: parent_id.into(),
            mode,
            _resource: PhantomData,
        }
    }
}

#[async_trait]
impl<'a, R, G> SubmitTarget<R::Payload> for ResourceTarget<'a, R, G>
where
    R: Resource,
    G: ResourceGateway<R>,
{
    type Response = R::Record;

    fn subject(&self) -> &str {
        R::LABEL
    }

    fn verb(&self) -> &'static str {
        self.mode.verb()
    }

    async fn send(&self, payload: &R::Payload) -> Result<R::Record, GatewayError> {
        match &self.mode {
            FormMode::Create => {
                ResourceGateway::<R>::create(self.gateway, &self.parent_id, payload).await
            }
            FormMode::Edit { id } => {
                ResourceGateway::<R>::update(self.gateway, &self.parent_id, id, payload).await
            }
        }
    }
}

/// Sends sign-up payloads to `/auth/register`.
pub struct RegistrationTarget<'a> {
    client: &'a ApiClient,
}

impl<'a> RegistrationTarget<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<'a> SubmitTarget<CustomerRegistration> for RegistrationTarget<'a> {
    type Response = User;

    fn subject(&self) -> &str {
        "account"
    }

    fn verb(&self) -> &'static str {
        "create"
    }

    async fn send(&self, payload: &CustomerRegistration) -> Result<User, GatewayError> {
        self.client.register_customer(payload).await
    }
}

#[async_trait]
impl<'a> SubmitTarget<BusinessRegistration> for RegistrationTarget<'a> {
    type Response = User;

    fn subject(&self) -> &str {
        "business account"
    }

    fn verb(&self) -> &'static str {
        "create"
    }

    async fn send(&self, payload: &BusinessRegistration) -> Result<User, GatewayError> {
        self.client.register_business(payload).await
    }
}

/// Result of [`FormController::submit`].
#[derive(Debug)]
pub enum SubmitOutcome<R> {
    /// The gateway accepted the payload; the form is closed.
    Submitted(R),
    /// Local validation failed; nothing was sent.
    Invalid(FieldErrors),
    /// A submission was already in flight or the form is closed.
    Ignored,
    /// The payload could not be built or the gateway failed; the form stays
    /// open on its last step.
    Failed(ZendulgeError),
}

impl<R> SubmitOutcome<R> {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted(_))
    }
}

pub struct FormController<F: FormFlow> {
    engine: Arc<Mutex<FormEngine<F>>>,
    abandoned: Arc<AtomicBool>,
}

impl<F: FormFlow> Clone for FormController<F> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            abandoned: Arc::clone(&self.abandoned),
        }
    }
}

fn settle_failed<F: FormFlow>(engine: &mut FormEngine<F>) {
    if engine.phase() != FormPhase::Submitting {
        return;
    }
    match engine.settle(false) {
        Ok(()) => warn!("submission abandoned before the gateway answered"),
        Err(err) => warn!(error = %err, "form settled out of order"),
    }
}

/// Armed between `begin_submit` and `settle`. Dropping it armed means the
/// submit future was cancelled.
struct PendingSubmit<'a, F: FormFlow> {
    controller: &'a FormController<F>,
    armed: bool,
}

impl<F: FormFlow> PendingSubmit<'_, F> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<F: FormFlow> Drop for PendingSubmit<'_, F> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.controller.engine.try_lock() {
            Ok(mut engine) => settle_failed(&mut engine),
            // Whoever holds the lock now settles it on the next acquire.
            Err(_) => self.controller.abandoned.store(true, Ordering::SeqCst),
        }
    }
}

impl<F: FormFlow> FormController<F> {
    pub fn new(flow: F) -> Result<Self, FormError> {
        Ok(Self {
            engine: Arc::new(Mutex::new(FormEngine::new(flow)?)),
            abandoned: Arc::new(AtomicBool::new(false)),
        })
    }

    async fn lock(&self) -> MutexGuard<'_, FormEngine<F>> {
        let mut engine = self.engine.lock().await;
        if self.abandoned.swap(false, Ordering::SeqCst) {
            settle_failed(&mut engine);
        }
        engine
    }

    /// Runs `edit` against the engine while holding the lock.
    pub async fn with_engine<T>(&self, edit: impl FnOnce(&mut FormEngine<F>) -> T) -> T {
        let mut engine = self.lock().await;
        edit(&mut engine)
    }

    pub async fn set_field(
        &self,
        key: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), FormError> {
        self.lock().await.set_field(key, value)
    }

    pub async fn phase(&self) -> FormPhase {
        self.lock().await.phase()
    }

    pub async fn errors(&self) -> FieldErrors {
        self.lock().await.errors().clone()
    }

    /// Validates, sends and reports one submission.
    pub async fn submit<T>(&self, target: &T, sink: &dyn NotificationSink) -> SubmitOutcome<T::Response>
    where
        T: SubmitTarget<F::Output>,
        F::Output: Sync,
    {
        let subject = target.subject().to_string();
        let verb = target.verb();

        let payload = {
            let mut engine = self.lock().await;
            match engine.submit() {
                Ok(payload) => payload,
                Err(SubmitBlocked::Invalid(errors)) => return SubmitOutcome::Invalid(errors),
                Err(SubmitBlocked::InFlight) | Err(SubmitBlocked::Closed) => {
                    return SubmitOutcome::Ignored
                }
                Err(SubmitBlocked::Payload(reason)) => {
                    warn!(subject = %subject, reason = %reason, "payload rejected");
                    sink.notify(Notification::failure(failure_title(&subject, verb)));
                    return SubmitOutcome::Failed(FormError::Payload(reason).into());
                }
            }
        };

        let mut pending = PendingSubmit {
            controller: self,
            armed: true,
        };
        let result = target.send(&payload).await;

        let mut engine = self.lock().await;
        pending.disarm();
        match result {
            Ok(response) => {
                if let Err(err) = engine.settle(true) {
                    warn!(error = %err, "form settled out of order");
                }
                info!(subject = %subject, verb, "submission accepted");
                sink.notify(Notification::success(success_title(&subject, verb)));
                SubmitOutcome::Submitted(response)
            }
            Err(error) => {
                if let Err(err) = engine.settle(false) {
                    warn!(error = %err, "form settled out of order");
                }
                warn!(subject = %subject, verb, error = %error, "submission failed");
                sink.notify(Notification::failure(failure_title(&subject, verb)));
                SubmitOutcome::Failed(error.into())
            }
        }
    }
}

/// Deletes one record and reports the outcome.
pub async fn delete_resource<R, G>(
    gateway: &G,
    parent_id: &str,
    id: &str,
    sink: &dyn NotificationSink,
) -> Result<(), GatewayError>
where
    R: Resource,
    G: ResourceGateway<R>,
{
    match ResourceGateway::<R>::delete(gateway, parent_id, id).await {
        Ok(()) => {
            info!(resource = R::LABEL, id, "deleted");
            sink.notify(Notification::success(success_title(R::LABEL, "delete")));
            Ok(())
        }
        Err(error) => {
            warn!(resource = R::LABEL, id, error = %error, "delete failed");
            sink.notify(Notification::failure(failure_title(R::LABEL, "delete")));
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use tokio::sync::Notify;
    use zendulge_domain::{Site, SitePayload};

    use crate::api::Sites;
    use crate::forms::SiteForm;
    use crate::notify::{MemorySink, Variant};

    #[derive(Default)]
    struct FakeSites {
        calls: AtomicUsize,
        gate: Option<Notify>,
        fail: bool,
    }

    impl FakeSites {
        fn gated() -> Self {
            Self {
                gate: Some(Notify::new()),
                ..Self::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        async fn respond(&self, id: &str, payload: &SitePayload) -> Result<Site, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail {
                return Err(GatewayError::Server {
                    status: 500,
                    message: "boom".into(),
                });
            }
            Ok(Site {
                id: id.to_string(),
                name: payload.name.clone(),
                country: payload.country.clone(),
                street_number: payload.street_number.clone(),
                street: payload.street.clone(),
                suburb: payload.suburb.clone(),
                city: payload.city.clone(),
                state: payload.state.clone(),
                postcode: payload.postcode.clone(),
                phone_number: payload.phone_number.clone(),
                email_address: payload.email_address.clone(),
                operating_hours: payload.operating_hours.clone(),
                special_instruction: payload.special_instruction.clone(),
                is_active: payload.is_active,
                created_at: None,
            })
        }
    }

    #[async_trait]
    impl ResourceGateway<Sites> for FakeSites {
        async fn list(&self, _parent_id: &str) -> Result<Vec<Site>, GatewayError> {
            Ok(Vec::new())
        }

        async fn create(&self, _parent_id: &str, payload: &SitePayload) -> Result<Site, GatewayError> {
            self.respond("site-new", payload).await
        }

        async fn update(
            &self,
            _parent_id: &str,
            id: &str,
            payload: &SitePayload,
        ) -> Result<Site, GatewayError> {
            self.respond(id, payload).await
        }

        async fn delete(&self, _parent_id: &str, _id: &str) -> Result<(), GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(GatewayError::NotFound)
            } else {
                Ok(())
            }
        }
    }

    async fn filled_controller() -> FormController<SiteForm> {
        let controller = FormController::new(SiteForm::new_create()).unwrap();
        for (key, value) in [
            ("name", "Fitzroy Studio"),
            ("streetNumber", "12"),
            ("street", "Brunswick St"),
            ("suburb", "Fitzroy"),
            ("city", "Melbourne"),
            ("state", "VIC"),
            ("postcode", "3065"),
            ("phoneNumber", "0398765432"),
            ("emailAddress", "hello@studio.com.au"),
        ] {
            controller.set_field(key, value).await.unwrap();
        }
        controller
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_gateway() {
        let gateway = FakeSites::default();
        let sink = MemorySink::new();
        let controller = filled_controller().await;
        controller.set_field("name", "").await.unwrap();
        controller.set_field("postcode", "3000").await.unwrap();

        let target = ResourceTarget::<Sites, _>::new(&gateway, "biz-1", FormMode::Create);
        match controller.submit(&target, &sink).await {
            SubmitOutcome::Invalid(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors.message("name"), Some("This field is required"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(gateway.calls(), 0);
        assert!(sink.snapshot().is_empty());
        assert_eq!(controller.phase().await, FormPhase::Editing(1));
    }

    #[tokio::test]
    async fn successful_submit_closes_and_toasts() {
        let gateway = FakeSites::default();
        let sink = MemorySink::new();
        let controller = filled_controller().await;

        let target = ResourceTarget::<Sites, _>::new(&gateway, "biz-1", FormMode::Create);
        let outcome = controller.submit(&target, &sink).await;
        match outcome {
            SubmitOutcome::Submitted(site) => assert_eq!(site.name, "Fitzroy Studio"),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(controller.phase().await, FormPhase::Closed);
        assert_eq!(sink.titles(), vec!["Site created".to_string()]);
    }

    #[tokio::test]
    async fn gateway_failure_keeps_form_open() {
        let gateway = FakeSites::failing();
        let sink = MemorySink::new();
        let controller = filled_controller().await;

        let target =
            ResourceTarget::<Sites, _>::new(&gateway, "biz-1", FormMode::Edit { id: "s1".into() });
        let outcome = controller.submit(&target, &sink).await;
        assert!(matches!(
            outcome,
            SubmitOutcome::Failed(ZendulgeError::Gateway(GatewayError::Server { .. }))
        ));
        assert_eq!(controller.phase().await, FormPhase::Editing(4));
        let seen = sink.snapshot();
        assert_eq!(seen[0].title, "Failed to update site");
        assert_eq!(seen[0].variant, Variant::Destructive);
        assert_eq!(
            controller
                .with_engine(|engine| engine.session().values().text("name").to_string())
                .await,
            "Fitzroy Studio"
        );
    }

    #[tokio::test]
    async fn second_submit_while_pending_is_ignored() {
        let gateway = FakeSites::gated();
        let sink = MemorySink::new();
        let controller = filled_controller().await;
        let target = ResourceTarget::<Sites, _>::new(&gateway, "biz-1", FormMode::Create);

        let first = controller.submit(&target, &sink);
        let second = async {
            while controller.phase().await != FormPhase::Submitting {
                tokio::task::yield_now().await;
            }
            let outcome = controller.submit(&target, &sink).await;
            if let Some(gate) = &gateway.gate {
                gate.notify_one();
            }
            outcome
        };

        let (first, second) = tokio::join!(first, second);
        assert!(first.is_submitted());
        assert!(matches!(second, SubmitOutcome::Ignored));
        assert_eq!(gateway.calls(), 1);
        assert_eq!(sink.titles(), vec!["Site created".to_string()]);
    }

    #[tokio::test]
    async fn dropped_submit_returns_form_to_last_step() {
        let stalled = FakeSites::gated();
        let sink = MemorySink::new();
        let controller = filled_controller().await;

        let target = ResourceTarget::<Sites, _>::new(&stalled, "biz-1", FormMode::Create);
        let timed_out = tokio::time::timeout(
            Duration::from_millis(20),
            controller.submit(&target, &sink),
        )
        .await;
        assert!(timed_out.is_err());
        assert_eq!(stalled.calls(), 1);
        assert_eq!(controller.phase().await, FormPhase::Editing(4));
        assert!(sink.snapshot().is_empty());

        let gateway = FakeSites::default();
        let target = ResourceTarget::<Sites, _>::new(&gateway, "biz-1", FormMode::Create);
        assert!(controller.submit(&target, &sink).await.is_submitted());
        assert_eq!(controller.phase().await, FormPhase::Closed);
    }

    #[tokio::test]
    async fn abandoned_submit_settles_on_next_lock_when_contended() {
        let controller = filled_controller().await;
        controller
            .with_engine(|engine| engine.submit().map(|_| ()))
            .await
            .unwrap();

        let held = controller.engine.lock().await;
        drop(PendingSubmit {
            controller: &controller,
            armed: true,
        });
        assert_eq!(held.phase(), FormPhase::Submitting);
        drop(held);

        assert_eq!(controller.phase().await, FormPhase::Editing(4));
        controller.with_engine(|engine| engine.cancel()).await.unwrap();
        assert_eq!(controller.phase().await, FormPhase::Closed);
    }

    #[tokio::test]
    async fn delete_reports_both_outcomes() {
        let sink = MemorySink::new();
        delete_resource::<Sites, _>(&FakeSites::default(), "biz-1", "s1", &sink)
            .await
            .unwrap();
        let failed = delete_resource::<Sites, _>(&FakeSites::failing(), "biz-1", "s1", &sink).await;
        assert!(matches!(failed, Err(GatewayError::NotFound)));
        assert_eq!(
            sink.titles(),
            vec!["Site deleted".to_string(), "Failed to delete site".to_string()]
        );
    }

    #[test]
    fn toast_titles() {
        assert_eq!(success_title("site", "create"), "Site created");
        assert_eq!(success_title("deal", "update"), "Deal updated");
        assert_eq!(failure_title("service", "create"), "Failed to create service");
    }
}
