//! Transfer wizard state machine.
//!
//! Screens advance `SelectDestination -> AddProducts -> Review -> Submitting ->
//! Success`. The machine is independent of any UI toolkit: the UI fires events
//! and renders `state()`.
//!
//! Invariants:
//! - `create` is only reachable from `Review`, and `Review` is left before the
//!   call starts, so at most one submission is in flight per workflow
//! - a failed submission returns to `Review` with destination, products and
//!   notes untouched
//! - the completion callback runs at most once, when `Success` is acknowledged
//! - `Submitting` cannot be cancelled; it always resolves to `Success` or
//!   `Review` (timeouts count as failures)

use std::fmt;
use std::sync::Arc;

use forgepos_catalog::{Location, Product};
use forgepos_core::{DomainError, Entity, ProductId};

use crate::client::{SubmissionError, TransferSubmissionClient};
use crate::config::WorkflowConfig;
use crate::error::WorkflowError;
use crate::request::{TransferRequest, TransferRequestBuilder};
use crate::result::TransferResult;
use crate::selection::{SelectionSet, StaleEntry};

/// Banner shown when a submission future was dropped before it resolved.
pub const INTERRUPTED_SUBMISSION_MESSAGE: &str =
    "submission was interrupted; check existing transfers before retrying";

/// Invoked with the created transfer once the operator acknowledges success.
pub type CompletionCallback = Box<dyn FnOnce(TransferResult) + Send + 'static>;

/// Discriminant of `WorkflowState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    SelectDestination,
    AddProducts,
    Review,
    Submitting,
    Success,
    /// Dismissed before submission.
    Cancelled,
    /// Success acknowledged; result handed to the caller.
    Completed,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::SelectDestination => "select_destination",
            Step::AddProducts => "add_products",
            Step::Review => "review",
            Step::Submitting => "submitting",
            Step::Success => "success",
            Step::Cancelled => "cancelled",
            Step::Completed => "completed",
        }
    }

    /// No further events are accepted.
    pub fn is_closed(&self) -> bool {
        matches!(self, Step::Cancelled | Step::Completed)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events the UI can fire at the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowEvent {
    ChooseDestination,
    Continue,
    Back,
    EditSelection,
    EditNotes,
    Review,
    Submit,
    CompleteSubmission,
    Cancel,
    Acknowledge,
}

impl WorkflowEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowEvent::ChooseDestination => "choose a destination",
            WorkflowEvent::Continue => "continue",
            WorkflowEvent::Back => "go back",
            WorkflowEvent::EditSelection => "edit the selection",
            WorkflowEvent::EditNotes => "edit notes",
            WorkflowEvent::Review => "review",
            WorkflowEvent::Submit => "submit",
            WorkflowEvent::CompleteSubmission => "complete a submission",
            WorkflowEvent::Cancel => "cancel",
            WorkflowEvent::Acknowledge => "acknowledge",
        }
    }
}

impl fmt::Display for WorkflowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current screen plus the data only that screen carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    SelectDestination,
    AddProducts,
    /// `error` holds the banner from the last failed submission, if any.
    Review { error: Option<String> },
    Submitting,
    Success(TransferResult),
    Cancelled,
    Completed,
}

impl WorkflowState {
    pub fn step(&self) -> Step {
        match self {
            WorkflowState::SelectDestination => Step::SelectDestination,
            WorkflowState::AddProducts => Step::AddProducts,
            WorkflowState::Review { .. } => Step::Review,
            WorkflowState::Submitting => Step::Submitting,
            WorkflowState::Success(_) => Step::Success,
            WorkflowState::Cancelled => Step::Cancelled,
            WorkflowState::Completed => Step::Completed,
        }
    }
}

/// One operator session moving stock out of a source location.
pub struct TransferWorkflow {
    state: WorkflowState,
    builder: TransferRequestBuilder,
    locations: Vec<Location>,
    client: Arc<dyn TransferSubmissionClient>,
    config: WorkflowConfig,
    on_created: Option<CompletionCallback>,
    attempts: u32,
}

impl fmt::Debug for TransferWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferWorkflow")
            .field("state", &self.state)
            .field("builder", &self.builder)
            .field("locations", &self.locations.len())
            .field("client", &self.client.name())
            .field("config", &self.config)
            .field("attempts", &self.attempts)
            .finish_non_exhaustive()
    }
}

impl TransferWorkflow {
    /// Start a workflow at `SelectDestination` with default configuration.
    ///
    /// `locations` is the caller's latest location list; it may include the
    /// source and inactive sites, which are never offered as destinations.
    pub fn new(
        source: Location,
        locations: Vec<Location>,
        client: Arc<dyn TransferSubmissionClient>,
        on_created: CompletionCallback,
    ) -> Self {
        Self::with_config(source, locations, client, on_created, WorkflowConfig::default())
    }

    pub fn with_config(
        source: Location,
        locations: Vec<Location>,
        client: Arc<dyn TransferSubmissionClient>,
        on_created: CompletionCallback,
        config: WorkflowConfig,
    ) -> Self {
        tracing::debug!(source = %source.id(), client = client.name(), "transfer workflow opened");
        Self {
            state: WorkflowState::SelectDestination,
            builder: TransferRequestBuilder::new(source),
            locations,
            client,
            config,
            on_created: Some(on_created),
            attempts: 0,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn step(&self) -> Step {
        self.state.step()
    }

    pub fn builder(&self) -> &TransferRequestBuilder {
        &self.builder
    }

    pub fn source(&self) -> &Location {
        self.builder.source()
    }

    pub fn destination(&self) -> Option<&Location> {
        self.builder.destination()
    }

    pub fn selection(&self) -> &SelectionSet {
        self.builder.selection()
    }

    pub fn notes(&self) -> Option<&str> {
        self.builder.notes()
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Banner text from the last failed submission (only while in `Review`).
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            WorkflowState::Review { error } => error.as_deref(),
            _ => None,
        }
    }

    /// Created transfer (only while in `Success`).
    pub fn result(&self) -> Option<&TransferResult> {
        match &self.state {
            WorkflowState::Success(result) => Some(result),
            _ => None,
        }
    }

    /// Submission attempts made so far, successful or not.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// True while a submission is in flight; the UI should disable input.
    pub fn is_busy(&self) -> bool {
        self.step() == Step::Submitting
    }

    pub fn can_continue(&self) -> bool {
        self.step() == Step::SelectDestination && self.destination().is_some()
    }

    pub fn can_review(&self) -> bool {
        self.step() == Step::AddProducts && self.selection().total_quantity() > 0
    }

    pub fn can_submit(&self) -> bool {
        self.step() == Step::Review && self.builder.can_build()
    }

    pub fn can_cancel(&self) -> bool {
        matches!(self.step(), Step::SelectDestination | Step::AddProducts)
    }

    /// Destinations to offer, computed against the current location list.
    pub fn candidate_destinations(&self) -> Vec<&Location> {
        self.builder.candidate_destinations(&self.locations)
    }

    /// Replace the location list with a fresher snapshot.
    ///
    /// Before submission, a chosen destination that is missing from the new list
    /// or no longer active is dropped, and `AddProducts`/`Review` fall back to
    /// `SelectDestination`. Products and notes are kept.
    pub fn refresh_locations(&mut self, locations: Vec<Location>) {
        self.locations = locations;

        let editable = matches!(
            self.step(),
            Step::SelectDestination | Step::AddProducts | Step::Review
        );
        let Some(chosen) = self.builder.destination().map(Entity::id) else {
            return;
        };
        let still_usable = self
            .locations
            .iter()
            .any(|l| l.id() == chosen && l.is_active());
        if !editable || still_usable {
            return;
        }

        self.builder.clear_destination();
        tracing::info!(destination = %chosen, "chosen destination is no longer available");
        if self.step() != Step::SelectDestination {
            self.transition(WorkflowState::SelectDestination);
        }
    }

    /// Selected entries whose quantity exceeds the stock in `live`. Informational.
    pub fn stale_entries(&self, live: &[Product]) -> Vec<StaleEntry> {
        self.selection().stale_entries(live)
    }

    // --- SelectDestination -------------------------------------------------

    pub fn choose_destination(&mut self, location: &Location) -> Result<(), WorkflowError> {
        self.ensure(&[Step::SelectDestination], WorkflowEvent::ChooseDestination)?;
        self.builder.set_destination(location).inspect_err(|err| {
            tracing::debug!(location = %location.id(), %err, "destination refused");
        })?;
        Ok(())
    }

    pub fn continue_to_products(&mut self) -> Result<(), WorkflowError> {
        self.ensure(&[Step::SelectDestination], WorkflowEvent::Continue)?;
        if self.destination().is_none() {
            return Err(DomainError::validation("choose a destination first").into());
        }
        self.transition(WorkflowState::AddProducts);
        Ok(())
    }

    // --- AddProducts -------------------------------------------------------

    /// Select or deselect `product`. Returns whether it is selected afterwards.
    pub fn toggle_product(&mut self, product: &Product) -> Result<bool, WorkflowError> {
        self.ensure(&[Step::AddProducts], WorkflowEvent::EditSelection)?;
        Ok(self.builder.selection_mut().toggle(product))
    }

    /// Returns the stored (clamped) quantity, or `None` if the product is not selected.
    pub fn set_quantity(
        &mut self,
        product_id: ProductId,
        value: i64,
    ) -> Result<Option<u32>, WorkflowError> {
        self.ensure(&[Step::AddProducts], WorkflowEvent::EditSelection)?;
        Ok(self.builder.selection_mut().set_quantity(product_id, value))
    }

    pub fn increment(&mut self, product_id: ProductId) -> Result<Option<u32>, WorkflowError> {
        self.ensure(&[Step::AddProducts], WorkflowEvent::EditSelection)?;
        Ok(self.builder.selection_mut().increment(product_id))
    }

    pub fn decrement(&mut self, product_id: ProductId) -> Result<Option<u32>, WorkflowError> {
        self.ensure(&[Step::AddProducts], WorkflowEvent::EditSelection)?;
        Ok(self.builder.selection_mut().decrement(product_id))
    }

    pub fn remove_product(&mut self, product_id: ProductId) -> Result<bool, WorkflowError> {
        self.ensure(&[Step::AddProducts], WorkflowEvent::EditSelection)?;
        Ok(self.builder.selection_mut().remove(product_id).is_some())
    }

    pub fn clear_selection(&mut self) -> Result<(), WorkflowError> {
        self.ensure(&[Step::AddProducts], WorkflowEvent::EditSelection)?;
        self.builder.selection_mut().clear();
        Ok(())
    }

    pub fn set_notes(&mut self, notes: &str) -> Result<(), WorkflowError> {
        self.ensure(&[Step::AddProducts, Step::Review], WorkflowEvent::EditNotes)?;
        self.builder.set_notes(notes);
        Ok(())
    }

    pub fn review(&mut self) -> Result<(), WorkflowError> {
        self.ensure(&[Step::AddProducts], WorkflowEvent::Review)?;
        if self.selection().total_quantity() == 0 {
            return Err(DomainError::validation("select at least one product").into());
        }
        self.transition(WorkflowState::Review { error: None });
        Ok(())
    }

    /// `AddProducts -> SelectDestination` or `Review -> AddProducts`.
    ///
    /// Leaving `Review` drops any submission error banner.
    pub fn back(&mut self) -> Result<(), WorkflowError> {
        match self.step() {
            Step::AddProducts => self.transition(WorkflowState::SelectDestination),
            Step::Review => self.transition(WorkflowState::AddProducts),
            state => return Err(self.refuse(state, WorkflowEvent::Back)),
        }
        Ok(())
    }

    // --- Review / Submitting -----------------------------------------------

    /// Leave `Review` for `Submitting` and hand out the request to send.
    ///
    /// The caller must pass the outcome of exactly one `create` call to
    /// `complete_submission`. `submit` does both.
    pub fn begin_submission(&mut self) -> Result<TransferRequest, WorkflowError> {
        self.ensure(&[Step::Review], WorkflowEvent::Submit)?;
        let request = self.builder.build()?;

        self.attempts += 1;
        tracing::info!(
            source = %request.source_location_id(),
            destination = %request.destination_location_id(),
            lines = request.items().len(),
            total_quantity = request.total_quantity(),
            attempt = self.attempts,
            "submitting inventory transfer"
        );
        self.transition(WorkflowState::Submitting);
        Ok(request)
    }

    /// Apply the outcome of the in-flight `create` call.
    pub fn complete_submission(
        &mut self,
        outcome: Result<TransferResult, SubmissionError>,
    ) -> Result<Step, WorkflowError> {
        self.ensure(&[Step::Submitting], WorkflowEvent::CompleteSubmission)?;

        match outcome {
            Ok(result) => {
                tracing::info!(
                    transfer_id = %result.id,
                    display_number = %result.display_number,
                    status = result.status.as_str(),
                    attempt = self.attempts,
                    "inventory transfer created"
                );
                self.transition(WorkflowState::Success(result));
            }
            Err(err) => {
                tracing::warn!(
                    client = self.client.name(),
                    attempt = self.attempts,
                    error = %err,
                    "inventory transfer submission failed"
                );
                self.transition(WorkflowState::Review {
                    error: Some(err.display_message()),
                });
            }
        }

        Ok(self.step())
    }

    /// Submit the reviewed transfer and wait for the service.
    ///
    /// Outside `Review` this is refused without contacting the service. A call
    /// exceeding `submit_timeout` is treated as a failure. If the returned future
    /// is dropped before it resolves, the workflow returns to `Review` with
    /// `INTERRUPTED_SUBMISSION_MESSAGE`.
    pub async fn submit(&mut self) -> Result<Step, WorkflowError> {
        let request = self.begin_submission()?;
        let client = Arc::clone(&self.client);
        let timeout = self.config.submit_timeout;

        let guard = InFlight::arm(&mut self.state);
        let outcome = match tokio::time::timeout(timeout, client.create(request)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(SubmissionError::Timeout(timeout)),
        };
        guard.disarm();

        self.complete_submission(outcome)
    }

    // --- Closing -----------------------------------------------------------

    /// Dismiss the workflow before submission, discarding all choices.
    pub fn cancel(&mut self) -> Result<(), WorkflowError> {
        self.ensure(&[Step::SelectDestination, Step::AddProducts], WorkflowEvent::Cancel)?;
        self.builder.reset();
        self.on_created = None;
        self.transition(WorkflowState::Cancelled);
        Ok(())
    }

    /// Close `Success` and hand the transfer to the completion callback.
    pub fn acknowledge(&mut self) -> Result<(), WorkflowError> {
        match std::mem::replace(&mut self.state, WorkflowState::Completed) {
            WorkflowState::Success(result) => {
                tracing::debug!(from = %Step::Success, to = %Step::Completed, "transfer workflow transition");
                self.builder.reset();
                if let Some(on_created) = self.on_created.take() {
                    on_created(result);
                }
                Ok(())
            }
            other => {
                let state = other.step();
                self.state = other;
                Err(self.refuse(state, WorkflowEvent::Acknowledge))
            }
        }
    }

    fn ensure(&self, allowed: &[Step], event: WorkflowEvent) -> Result<(), WorkflowError> {
        let state = self.step();
        if allowed.contains(&state) {
            Ok(())
        } else {
            Err(self.refuse(state, event))
        }
    }

    fn refuse(&self, state: Step, event: WorkflowEvent) -> WorkflowError {
        tracing::debug!(%state, %event, "transfer workflow event refused");
        WorkflowError::InvalidTransition { state, event }
    }

    fn transition(&mut self, to: WorkflowState) {
        let from = self.step();
        self.state = to;
        tracing::debug!(%from, to = %self.step(), "transfer workflow transition");
    }
}

/// Restores `Review` if a submission future is dropped mid-flight.
struct InFlight<'a> {
    state: &'a mut WorkflowState,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn arm(state: &'a mut WorkflowState) -> Self {
        Self { state, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed && *self.state == WorkflowState::Submitting {
            tracing::warn!("inventory transfer submission dropped before completion");
            *self.state = WorkflowState::Review {
                error: Some(INTERRUPTED_SUBMISSION_MESSAGE.to_string()),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use forgepos_core::LocationId;

    use crate::client::InMemoryTransferClient;

    struct Fixture {
        warehouse: Location,
        downtown: Location,
        uptown: Location,
        client: Arc<InMemoryTransferClient>,
        delivered: Arc<Mutex<Vec<TransferResult>>>,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_client(InMemoryTransferClient::new())
        }

        fn with_client(client: InMemoryTransferClient) -> Self {
            Self {
                warehouse: Location::new(LocationId::new(), "Warehouse"),
                downtown: Location::new(LocationId::new(), "Downtown"),
                uptown: Location::new(LocationId::new(), "Uptown"),
                client: Arc::new(client),
                delivered: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn workflow(&self) -> TransferWorkflow {
            self.workflow_with(WorkflowConfig::default())
        }

        fn workflow_with(&self, config: WorkflowConfig) -> TransferWorkflow {
            let delivered = Arc::clone(&self.delivered);
            TransferWorkflow::with_config(
                self.warehouse.clone(),
                vec![self.warehouse.clone(), self.downtown.clone(), self.uptown.clone()],
                self.client.clone(),
                Box::new(move |result: TransferResult| delivered.lock().unwrap().push(result)),
                config,
            )
        }

        /// Workflow sitting in `Review` with one unit of `product` selected.
        fn reviewed(&self, product: &Product) -> TransferWorkflow {
            let mut wf = self.workflow();
            wf.choose_destination(&self.downtown).unwrap();
            wf.continue_to_products().unwrap();
            wf.toggle_product(product).unwrap();
            wf.review().unwrap();
            wf
        }

        fn delivered(&self) -> Vec<TransferResult> {
            self.delivered.lock().unwrap().clone()
        }
    }

    fn widget(stock: u32) -> Product {
        Product::new(ProductId::new(), "Widget", stock)
    }

    fn invalid(state: Step, event: WorkflowEvent) -> WorkflowError {
        WorkflowError::InvalidTransition { state, event }
    }

    #[test]
    fn starts_at_select_destination_offering_other_active_locations() {
        let fx = Fixture::new();
        let wf = fx.workflow();
        assert_eq!(wf.step(), Step::SelectDestination);
        let names: Vec<&str> = wf
            .candidate_destinations()
            .into_iter()
            .map(Location::name)
            .collect();
        assert_eq!(names, vec!["Downtown", "Uptown"]);
        assert!(!wf.can_continue());
    }

    #[test]
    fn continue_requires_destination() {
        let fx = Fixture::new();
        let mut wf = fx.workflow();
        assert!(wf.continue_to_products().unwrap_err().is_validation());
        assert_eq!(wf.step(), Step::SelectDestination);
    }

    #[test]
    fn choosing_the_source_is_refused() {
        let fx = Fixture::new();
        let mut wf = fx.workflow();
        let err = wf.choose_destination(&fx.warehouse).unwrap_err();
        assert!(err.is_validation());
        assert!(wf.destination().is_none());
        assert_eq!(wf.step(), Step::SelectDestination);
    }

    #[test]
    fn destination_can_be_rechosen_before_continuing() {
        let fx = Fixture::new();
        let mut wf = fx.workflow();
        wf.choose_destination(&fx.downtown).unwrap();
        wf.choose_destination(&fx.uptown).unwrap();
        assert_eq!(wf.destination(), Some(&fx.uptown));
        assert!(wf.can_continue());
    }

    #[test]
    fn product_edits_are_only_accepted_in_add_products() {
        let fx = Fixture::new();
        let mut wf = fx.workflow();
        let p = widget(3);
        assert_eq!(
            wf.toggle_product(&p).unwrap_err(),
            invalid(Step::SelectDestination, WorkflowEvent::EditSelection)
        );

        wf.choose_destination(&fx.downtown).unwrap();
        wf.continue_to_products().unwrap();
        assert!(wf.toggle_product(&p).unwrap());
        wf.review().unwrap();

        assert_eq!(
            wf.increment(p.id()).unwrap_err(),
            invalid(Step::Review, WorkflowEvent::EditSelection)
        );
        assert_eq!(wf.selection().get(p.id()).unwrap().quantity(), 1);
    }

    #[test]
    fn review_requires_a_product() {
        let fx = Fixture::new();
        let mut wf = fx.workflow();
        wf.choose_destination(&fx.downtown).unwrap();
        wf.continue_to_products().unwrap();
        assert!(!wf.can_review());
        assert!(wf.review().unwrap_err().is_validation());
        assert_eq!(wf.step(), Step::AddProducts);
    }

    #[test]
    fn back_walks_adjacent_screens_and_keeps_choices() {
        let fx = Fixture::new();
        let p = widget(5);
        let mut wf = fx.reviewed(&p);

        wf.back().unwrap();
        assert_eq!(wf.step(), Step::AddProducts);
        wf.back().unwrap();
        assert_eq!(wf.step(), Step::SelectDestination);
        assert_eq!(wf.destination(), Some(&fx.downtown));
        assert!(wf.selection().contains(p.id()));

        assert_eq!(
            wf.back().unwrap_err(),
            invalid(Step::SelectDestination, WorkflowEvent::Back)
        );
    }

    #[test]
    fn notes_are_editable_on_review() {
        let fx = Fixture::new();
        let mut wf = fx.reviewed(&widget(5));
        wf.set_notes(" fragile ").unwrap();
        assert_eq!(wf.notes(), Some("fragile"));
    }

    #[tokio::test]
    async fn submit_outside_review_never_calls_client() {
        let fx = Fixture::new();
        let mut wf = fx.workflow();
        assert_eq!(
            wf.submit().await.unwrap_err(),
            invalid(Step::SelectDestination, WorkflowEvent::Submit)
        );

        wf.choose_destination(&fx.downtown).unwrap();
        wf.continue_to_products().unwrap();
        wf.toggle_product(&widget(2)).unwrap();
        assert_eq!(
            wf.submit().await.unwrap_err(),
            invalid(Step::AddProducts, WorkflowEvent::Submit)
        );

        assert_eq!(fx.client.calls(), 0);
        assert_eq!(wf.attempts(), 0);
    }

    #[tokio::test]
    async fn submit_is_refused_once_closed() {
        let fx = Fixture::new();
        let mut cancelled = fx.workflow();
        cancelled.cancel().unwrap();
        assert_eq!(
            cancelled.submit().await.unwrap_err(),
            invalid(Step::Cancelled, WorkflowEvent::Submit)
        );
        assert_eq!(fx.client.calls(), 0);

        let mut completed = fx.reviewed(&widget(2));
        completed.submit().await.unwrap();
        completed.acknowledge().unwrap();
        assert_eq!(
            completed.submit().await.unwrap_err(),
            invalid(Step::Completed, WorkflowEvent::Submit)
        );
        assert_eq!(fx.client.calls(), 1);
        assert_eq!(completed.attempts(), 1);
        assert_eq!(fx.delivered().len(), 1);
    }

    #[tokio::test]
    async fn successful_submit_reaches_success_and_acknowledge_delivers_once() {
        let fx = Fixture::new();
        let p = widget(5);
        let mut wf = fx.reviewed(&p);

        assert_eq!(wf.submit().await.unwrap(), Step::Success);
        assert_eq!(fx.client.calls(), 1);
        assert_eq!(wf.result().unwrap().display_number, "TRF-001");
        assert!(fx.delivered().is_empty());

        let sent = &fx.client.requests()[0];
        assert_eq!(sent.source_location_id(), fx.warehouse.id());
        assert_eq!(sent.destination_location_id(), fx.downtown.id());
        assert_eq!(sent.items()[0].product_id, p.id());

        wf.acknowledge().unwrap();
        assert_eq!(wf.step(), Step::Completed);
        assert_eq!(fx.delivered().len(), 1);
        assert_eq!(fx.delivered()[0].display_number, "TRF-001");
        assert!(wf.selection().is_empty());

        assert_eq!(
            wf.acknowledge().unwrap_err(),
            invalid(Step::Completed, WorkflowEvent::Acknowledge)
        );
        assert_eq!(fx.delivered().len(), 1);
    }

    #[tokio::test]
    async fn failure_returns_to_review_with_message_and_retry_succeeds() {
        let fx = Fixture::new();
        fx.client.fail_next(SubmissionError::rejected("insufficient stock at source"));
        let p = widget(5);
        let mut wf = fx.reviewed(&p);

        assert_eq!(wf.submit().await.unwrap(), Step::Review);
        assert_eq!(wf.error(), Some("insufficient stock at source"));
        assert!(wf.selection().contains(p.id()));
        assert_eq!(wf.destination(), Some(&fx.downtown));

        assert_eq!(wf.submit().await.unwrap(), Step::Success);
        assert_eq!(wf.attempts(), 2);
        assert_eq!(fx.client.calls(), 2);
    }

    #[tokio::test]
    async fn leaving_review_clears_the_error_banner() {
        let fx = Fixture::new();
        fx.client.fail_next(SubmissionError::Network("connection reset".into()));
        let mut wf = fx.reviewed(&widget(5));

        wf.submit().await.unwrap();
        assert_eq!(wf.error(), Some("network error: connection reset"));

        wf.back().unwrap();
        wf.review().unwrap();
        assert_eq!(wf.error(), None);
    }

    #[tokio::test]
    async fn hung_service_times_out_into_review() {
        let fx = Fixture::with_client(
            InMemoryTransferClient::new().with_latency(Duration::from_millis(500)),
        );
        let p = widget(5);
        let mut wf = fx.workflow_with(WorkflowConfig {
            submit_timeout: Duration::from_millis(20),
        });
        wf.choose_destination(&fx.downtown).unwrap();
        wf.continue_to_products().unwrap();
        wf.toggle_product(&p).unwrap();
        wf.review().unwrap();

        assert_eq!(wf.submit().await.unwrap(), Step::Review);
        assert_eq!(
            wf.error(),
            Some(SubmissionError::Timeout(Duration::from_millis(20)).to_string().as_str())
        );
        assert!(wf.selection().contains(p.id()));
    }

    #[test]
    fn split_submission_blocks_reentry_and_cancel() {
        let fx = Fixture::new();
        let mut wf = fx.reviewed(&widget(5));

        let request = wf.begin_submission().unwrap();
        assert_eq!(request.total_quantity(), 1);
        assert!(wf.is_busy());

        assert_eq!(
            wf.begin_submission().unwrap_err(),
            invalid(Step::Submitting, WorkflowEvent::Submit)
        );
        assert_eq!(
            wf.cancel().unwrap_err(),
            invalid(Step::Submitting, WorkflowEvent::Cancel)
        );
        assert_eq!(
            wf.back().unwrap_err(),
            invalid(Step::Submitting, WorkflowEvent::Back)
        );

        let step = wf
            .complete_submission(Err(SubmissionError::rejected("conflict")))
            .unwrap();
        assert_eq!(step, Step::Review);
        assert_eq!(
            wf.complete_submission(Err(SubmissionError::rejected("late"))).unwrap_err(),
            invalid(Step::Review, WorkflowEvent::CompleteSubmission)
        );
        assert_eq!(wf.error(), Some("conflict"));
    }

    #[test]
    fn dropped_submission_future_restores_review() {
        let fx = Fixture::with_client(
            InMemoryTransferClient::new().with_latency(Duration::from_secs(60)),
        );
        let mut wf = fx.workflow();
        wf.choose_destination(&fx.downtown).unwrap();
        wf.continue_to_products().unwrap();
        wf.toggle_product(&widget(5)).unwrap();
        wf.review().unwrap();

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let pending = tokio::time::timeout(Duration::from_millis(10), wf.submit()).await;
            assert!(pending.is_err());
        });

        assert_eq!(wf.step(), Step::Review);
        assert_eq!(wf.error(), Some(INTERRUPTED_SUBMISSION_MESSAGE));
    }

    #[tokio::test]
    async fn deactivated_destination_is_dropped_on_refresh() {
        let fx = Fixture::new();
        let p = widget(5);
        let mut wf = fx.reviewed(&p);
        wf.set_notes("weekend restock").unwrap();

        wf.refresh_locations(vec![
            fx.warehouse.clone(),
            fx.downtown.clone().deactivated(),
            fx.uptown.clone(),
        ]);

        assert_eq!(wf.step(), Step::SelectDestination);
        assert!(wf.destination().is_none());
        assert!(!wf.can_continue());
        assert!(wf.selection().contains(p.id()));
        assert_eq!(wf.notes(), Some("weekend restock"));

        assert!(
            wf.choose_destination(&fx.downtown.clone().deactivated())
                .unwrap_err()
                .is_validation()
        );
        wf.choose_destination(&fx.uptown).unwrap();
        wf.continue_to_products().unwrap();
        wf.review().unwrap();
        wf.submit().await.unwrap();
        assert_eq!(
            fx.client.requests()[0].destination_location_id(),
            fx.uptown.id()
        );
    }

    #[test]
    fn vanished_destination_is_dropped_on_refresh_from_add_products() {
        let fx = Fixture::new();
        let mut wf = fx.workflow();
        wf.choose_destination(&fx.downtown).unwrap();
        wf.continue_to_products().unwrap();

        wf.refresh_locations(vec![fx.warehouse.clone(), fx.uptown.clone()]);
        assert_eq!(wf.step(), Step::SelectDestination);
        assert!(wf.destination().is_none());
    }

    #[test]
    fn refresh_keeps_a_destination_that_is_still_active() {
        let fx = Fixture::new();
        let mut wf = fx.reviewed(&widget(5));

        wf.refresh_locations(vec![fx.warehouse.clone(), fx.downtown.clone()]);
        assert_eq!(wf.step(), Step::Review);
        assert_eq!(wf.destination().map(Entity::id), Some(fx.downtown.id()));
    }

    #[test]
    fn cancel_discards_choices_and_closes() {
        let fx = Fixture::new();
        let mut wf = fx.workflow();
        wf.choose_destination(&fx.downtown).unwrap();
        wf.continue_to_products().unwrap();
        wf.toggle_product(&widget(5)).unwrap();

        wf.cancel().unwrap();
        assert_eq!(wf.step(), Step::Cancelled);
        assert!(wf.step().is_closed());
        assert!(wf.destination().is_none());
        assert!(wf.selection().is_empty());
        assert_eq!(
            wf.continue_to_products().unwrap_err(),
            invalid(Step::Cancelled, WorkflowEvent::Continue)
        );
    }

    #[test]
    fn cancel_is_refused_on_review() {
        let fx = Fixture::new();
        let mut wf = fx.reviewed(&widget(5));
        assert!(!wf.can_cancel());
        assert_eq!(
            wf.cancel().unwrap_err(),
            invalid(Step::Review, WorkflowEvent::Cancel)
        );
    }

    #[test]
    fn refused_event_message_is_readable() {
        let err = invalid(Step::Review, WorkflowEvent::EditSelection);
        assert_eq!(err.to_string(), "cannot edit the selection while in review");
    }
}
