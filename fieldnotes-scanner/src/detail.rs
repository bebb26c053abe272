//! Machine detail page: resolve the scanned identifier, pick the spare part
//! used, and log a service event.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use fieldnotes_model::{
    MachineId, MachineRecord, NewServiceRequest, ServiceRecord, SparePart,
    SparePartId,
};
use log::{error, info, warn};

use crate::client::{MachineDirectory, ServiceSubmitter, SparePartSource};
use crate::navigation::{Navigator, Route};
use crate::settings::ScannerSettings;

pub const NOT_UPDATED: &str = "Not updated yet";
pub const NOTES_REQUIRED: &str = "Notes is required";

/// What the detail page currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailView {
    Loading,
    Found(MachineSummary),
    NotFound { identifier: String },
    Failed { message: String },
}

/// Display strings for a resolved machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineSummary {
    pub category: String,
    pub machine_code: String,
    pub brand: String,
    pub model: String,
    pub arrived: String,
    pub location: String,
    pub last_updated: String,
}

fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %Y, %-I:%M %p").to_string()
}

impl From<&MachineRecord> for MachineSummary {
    fn from(record: &MachineRecord) -> Self {
        Self {
            category: record.category.clone(),
            machine_code: record.machine_code.clone(),
            brand: record.brand.clone(),
            model: record.model.clone(),
            arrived: format_date(record.arrived_date),
            location: record.location_label(),
            last_updated: record
                .updated_at
                .map_or_else(|| NOT_UPDATED.to_string(), format_timestamp),
        }
    }
}

/// One row in the spare-part picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartOption {
    pub id: SparePartId,
    pub code: String,
    pub detail: String,
    pub stock: String,
    pub category: String,
}

impl From<&SparePart> for PartOption {
    fn from(part: &SparePart) -> Self {
        Self {
            id: part.id,
            code: part.part_code.clone(),
            detail: format!("{} - {}", part.brand, part.model),
            stock: format!("Stock: {} units", part.quantity),
            category: part.category.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Destructive,
}

/// A toast raised by the workflow; rendering is up to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
    /// Label of the retry action, if any.
    pub action: Option<&'static str>,
    pub dismissible: bool,
}

impl Notification {
    fn service_created() -> Self {
        Self {
            kind: NotificationKind::Success,
            title: "Service created successfully.".to_string(),
            description: "The service has been created successfully."
                .to_string(),
            action: None,
            dismissible: true,
        }
    }

    fn request_failed(message: &str) -> Self {
        Self {
            kind: NotificationKind::Destructive,
            title: "Uh oh! Something went wrong.".to_string(),
            description: format!(
                "There was a problem with your request. {message}"
            ),
            action: Some("Try again"),
            dismissible: true,
        }
    }
}

/// The service sheet, pre-filled from the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceForm {
    pub machine_id: MachineId,
    pub spare_part_id: SparePartId,
    pub notes: String,
    pub error: Option<String>,
    pub submitting: bool,
}

impl ServiceForm {
    fn request(&self) -> NewServiceRequest {
        NewServiceRequest {
            machine_id: self.machine_id,
            spare_part_id: Some(self.spare_part_id),
            notes: self.notes.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Client-side validation failed; nothing was sent.
    Invalid,
    Created(ServiceRecord),
    Failed,
    /// There is no open form to submit.
    NoForm,
}

pub struct MachineDetails {
    directory: Arc<dyn MachineDirectory>,
    catalog: Arc<dyn SparePartSource>,
    submitter: Arc<dyn ServiceSubmitter>,
    navigator: Arc<dyn Navigator>,
    redirect_delay: Duration,

    identifier: String,
    view: DetailView,
    machine: Option<MachineRecord>,
    options: Vec<PartOption>,
    selected: Option<SparePartId>,
    form: Option<ServiceForm>,
    notifications: Vec<Notification>,
}

impl std::fmt::Debug for MachineDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MachineDetails")
            .field("identifier", &self.identifier)
            .field("view", &self.view)
            .field("selected", &self.selected)
            .field("form", &self.form)
            .finish_non_exhaustive()
    }
}

impl MachineDetails {
    pub fn new(
        identifier: impl Into<String>,
        directory: Arc<dyn MachineDirectory>,
        catalog: Arc<dyn SparePartSource>,
        submitter: Arc<dyn ServiceSubmitter>,
        navigator: Arc<dyn Navigator>,
        settings: &ScannerSettings,
    ) -> Self {
        Self {
            directory,
            catalog,
            submitter,
            navigator,
            redirect_delay: settings.submit_redirect_delay,
            identifier: identifier.into(),
            view: DetailView::Loading,
            machine: None,
            options: Vec::new(),
            selected: None,
            form: None,
            notifications: Vec::new(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn view(&self) -> &DetailView {
        &self.view
    }

    pub fn machine(&self) -> Option<&MachineRecord> {
        self.machine.as_ref()
    }

    pub fn options(&self) -> &[PartOption] {
        &self.options
    }

    pub fn form(&self) -> Option<&ServiceForm> {
        self.form.as_ref()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Resolve the identifier. Not-found and transport failures become
    /// views, never errors.
    pub async fn load(&mut self) -> &DetailView {
        self.view = DetailView::Loading;
        let result = self.directory.lookup_machine(&self.identifier).await;
        self.view = match result {
            Ok(record) => {
                let summary = MachineSummary::from(&record);
                self.machine = Some(record);
                DetailView::Found(summary)
            }
            Err(err) if err.is_not_found() => {
                info!("no machine for identifier {:?}", self.identifier);
                DetailView::NotFound {
                    identifier: self.identifier.clone(),
                }
            }
            Err(err) => {
                error!("machine lookup failed: {err}");
                DetailView::Failed {
                    message: err.to_string(),
                }
            }
        };
        &self.view
    }

    /// Refresh the picker options. A failed search shows no options.
    pub async fn search_parts(&mut self, query: &str) -> &[PartOption] {
        let query = Some(query).filter(|q| !q.trim().is_empty());
        self.options = match self.catalog.search_spare_parts(query).await {
            Ok(parts) => parts.iter().map(PartOption::from).collect(),
            Err(err) => {
                warn!("spare part search failed: {err}");
                Vec::new()
            }
        };
        &self.options
    }

    /// Select a part from the current options. Returns whether it was
    /// offered.
    pub fn select_part(&mut self, id: SparePartId) -> bool {
        let offered = self.options.iter().any(|option| option.id == id);
        if offered {
            self.selected = Some(id);
        }
        offered
    }

    pub fn selected_part(&self) -> Option<SparePartId> {
        self.selected
    }

    pub fn can_confirm(&self) -> bool {
        self.machine.is_some() && self.selected.is_some()
    }

    /// Open the service sheet for the resolved machine and selected part.
    pub fn confirm(&mut self) -> Option<&ServiceForm> {
        let (Some(machine), Some(part)) = (&self.machine, self.selected) else {
            return None;
        };
        self.form = Some(ServiceForm {
            machine_id: machine.id,
            spare_part_id: part,
            notes: String::new(),
            error: None,
            submitting: false,
        });
        self.form.as_ref()
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        if let Some(form) = self.form.as_mut() {
            form.notes = notes.into();
            form.error = None;
        }
    }

    /// Submit the open form. On success a notification is raised and the
    /// page returns to the scanner after a short pause; on failure the form
    /// stays open behind a destructive notification.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let Some(form) = self.form.as_mut() else {
            return SubmitOutcome::NoForm;
        };
        if form.notes.trim().is_empty() {
            form.error = Some(NOTES_REQUIRED.to_string());
            return SubmitOutcome::Invalid;
        }

        let request = form.request();
        form.submitting = true;
        let result = self.submitter.submit_service(&request).await;
        if let Some(form) = self.form.as_mut() {
            form.submitting = false;
        }

        match result {
            Ok(record) => {
                info!(
                    "service {} logged for machine {}",
                    record.id, record.machine_id
                );
                self.notifications.push(Notification::service_created());
                tokio::time::sleep(self.redirect_delay).await;
                self.form = None;
                self.navigator.navigate(Route::ScannerRoot);
                SubmitOutcome::Created(record)
            }
            Err(err) => {
                error!("service submission failed: {err}");
                self.notifications
                    .push(Notification::request_failed(&err.to_string()));
                SubmitOutcome::Failed
            }
        }
    }

    pub fn dismiss(&mut self, index: usize) -> Option<Notification> {
        let dismissible = self
            .notifications
            .get(index)
            .is_some_and(|n| n.dismissible);
        dismissible.then(|| self.notifications.remove(index))
    }

    pub fn back_to_scan(&self) {
        self.navigator.navigate(Route::ScannerRoot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::navigation::ChannelNavigator;
    use async_trait::async_trait;
    use fieldnotes_model::ServiceId;
    use std::sync::Mutex;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn machine(updated_at: Option<DateTime<Utc>>) -> MachineRecord {
        MachineRecord {
            id: MachineId::new(7),
            machine_code: "MCH-001".into(),
            category: "Press".into(),
            brand: "Amada".into(),
            model: "HG-1003".into(),
            arrived_date: NaiveDate::from_ymd_opt(2023, 4, 2).unwrap(),
            location: "Hall B".into(),
            sub_location: Some("Bay 4".into()),
            created_at: Utc::now(),
            updated_at,
        }
    }

    fn part(id: i32, code: &str) -> SparePart {
        SparePart {
            id: SparePartId::new(id),
            part_code: code.into(),
            category: "Fastener".into(),
            brand: "Würth".into(),
            model: "M8x40".into(),
            arrived_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            quantity: 40,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[derive(Default)]
    struct FakeBackend {
        machine: Option<MachineRecord>,
        lookup_fails: bool,
        parts: Option<Vec<SparePart>>,
        reject_submit: bool,
        submitted: Mutex<Vec<NewServiceRequest>>,
    }

    #[async_trait]
    impl MachineDirectory for FakeBackend {
        async fn lookup_machine(
            &self,
            identifier: &str,
        ) -> Result<MachineRecord, ClientError> {
            if self.lookup_fails {
                return Err(ClientError::Api {
                    status: 500,
                    message: "Internal server error".into(),
                });
            }
            self.machine
                .clone()
                .filter(|m| m.machine_code == identifier)
                .ok_or_else(|| ClientError::NotFound(format!("Machine {identifier}")))
        }
    }

    #[async_trait]
    impl SparePartSource for FakeBackend {
        async fn search_spare_parts(
            &self,
            _query: Option<&str>,
        ) -> Result<Vec<SparePart>, ClientError> {
            self.parts.clone().ok_or(ClientError::Unauthorized)
        }
    }

    #[async_trait]
    impl ServiceSubmitter for FakeBackend {
        async fn submit_service(
            &self,
            request: &NewServiceRequest,
        ) -> Result<ServiceRecord, ClientError> {
            if self.reject_submit {
                return Err(ClientError::Unauthorized);
            }
            self.submitted.lock().unwrap().push(request.clone());
            Ok(ServiceRecord {
                id: ServiceId::new(1),
                machine_id: request.machine_id,
                spare_part_id: request.spare_part_id,
                performed_by: fieldnotes_model::UserId::new(3),
                notes: request.notes.clone(),
                created_at: Utc::now(),
                updated_at: None,
            })
        }
    }

    fn details(
        identifier: &str,
        backend: FakeBackend,
    ) -> (MachineDetails, Arc<FakeBackend>, UnboundedReceiver<Route>) {
        let backend = Arc::new(backend);
        let (navigator, routes) = ChannelNavigator::new();
        let details = MachineDetails::new(
            identifier,
            backend.clone(),
            backend.clone(),
            backend.clone(),
            Arc::new(navigator),
            &ScannerSettings::default(),
        );
        (details, backend, routes)
    }

    fn stocked_backend() -> FakeBackend {
        FakeBackend {
            machine: Some(machine(None)),
            parts: Some(vec![part(11, "BOLT-22"), part(12, "SEAL-01")]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn found_machine_renders_summary() {
        let (mut page, _, _) = details("MCH-001", stocked_backend());

        let DetailView::Found(summary) = page.load().await.clone() else {
            panic!("expected found view");
        };

        assert_eq!(summary.brand, "Amada");
        assert_eq!(summary.model, "HG-1003");
        assert_eq!(summary.location, "Hall B - Bay 4");
        assert_eq!(summary.arrived, "Apr 2, 2023");
        assert_eq!(summary.last_updated, NOT_UPDATED);
    }

    #[test]
    fn last_updated_is_formatted_when_present() {
        let at = "2024-06-03T14:05:00Z".parse::<DateTime<Utc>>().unwrap();
        let summary = MachineSummary::from(&machine(Some(at)));
        assert_eq!(summary.last_updated, "Jun 3, 2024, 2:05 PM");
    }

    #[tokio::test]
    async fn unknown_identifier_shows_not_found() {
        let (mut page, _, _) = details("UNKNOWN", stocked_backend());

        assert_eq!(
            page.load().await,
            &DetailView::NotFound {
                identifier: "UNKNOWN".into()
            }
        );
        assert!(!page.can_confirm());
    }

    #[tokio::test]
    async fn lookup_failure_shows_error_view() {
        let (mut page, _, _) = details(
            "MCH-001",
            FakeBackend {
                lookup_fails: true,
                ..Default::default()
            },
        );

        assert_eq!(
            page.load().await,
            &DetailView::Failed {
                message: "Internal server error".into()
            }
        );
    }

    #[tokio::test]
    async fn failed_search_yields_no_options() {
        let (mut page, _, _) = details(
            "MCH-001",
            FakeBackend {
                machine: Some(machine(None)),
                ..Default::default()
            },
        );
        page.load().await;

        assert!(page.search_parts("bolt").await.is_empty());
        assert!(!page.select_part(SparePartId::new(11)));
    }

    #[tokio::test]
    async fn confirm_requires_a_selection_and_prefills_form() {
        let (mut page, _, _) = details("MCH-001", stocked_backend());
        page.load().await;
        page.search_parts("").await;

        assert!(!page.can_confirm());
        assert!(page.confirm().is_none());

        assert!(page.select_part(SparePartId::new(12)));
        let form = page.confirm().unwrap();
        assert_eq!(form.machine_id, MachineId::new(7));
        assert_eq!(form.spare_part_id, SparePartId::new(12));
        assert!(form.notes.is_empty());
    }

    #[tokio::test]
    async fn blank_notes_are_rejected_before_submit() {
        let (mut page, backend, _) = details("MCH-001", stocked_backend());
        page.load().await;
        page.search_parts("").await;
        page.select_part(SparePartId::new(11));
        page.confirm();
        page.set_notes("   ");

        assert_eq!(page.submit().await, SubmitOutcome::Invalid);
        assert_eq!(
            page.form().and_then(|f| f.error.as_deref()),
            Some(NOTES_REQUIRED)
        );
        assert!(backend.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn successful_submit_notifies_and_returns_to_scanner() {
        let (mut page, backend, mut routes) =
            details("MCH-001", stocked_backend());
        page.load().await;
        page.search_parts("bolt").await;
        page.select_part(SparePartId::new(11));
        page.confirm();
        page.set_notes(" replaced belt ");

        let outcome = page.submit().await;

        assert!(matches!(outcome, SubmitOutcome::Created(_)));
        let sent = backend.submitted.lock().unwrap().clone();
        assert_eq!(sent[0].notes, "replaced belt");
        assert_eq!(sent[0].spare_part_id, Some(SparePartId::new(11)));
        assert_eq!(
            page.notifications()[0].title,
            "Service created successfully."
        );
        assert!(page.form().is_none());
        assert_eq!(routes.try_recv().unwrap(), Route::ScannerRoot);
    }

    #[tokio::test]
    async fn rejected_submit_keeps_form_open_with_retry() {
        let (mut page, _, mut routes) = details(
            "MCH-001",
            FakeBackend {
                reject_submit: true,
                ..stocked_backend()
            },
        );
        page.load().await;
        page.search_parts("").await;
        page.select_part(SparePartId::new(11));
        page.confirm();
        page.set_notes("replaced belt");

        assert_eq!(page.submit().await, SubmitOutcome::Failed);

        let toast = &page.notifications()[0];
        assert_eq!(toast.kind, NotificationKind::Destructive);
        assert_eq!(
            toast.description,
            "There was a problem with your request. Unauthorized - please sign in again"
        );
        assert_eq!(toast.action, Some("Try again"));
        assert!(page.form().is_some_and(|f| !f.submitting));
        assert!(routes.try_recv().is_err());

        assert!(page.dismiss(0).is_some());
        assert!(page.notifications().is_empty());
    }

    #[tokio::test]
    async fn back_to_scan_navigates_to_root() {
        let (page, _, mut routes) = details("MCH-001", stocked_backend());
        page.back_to_scan();
        assert_eq!(routes.try_recv().unwrap(), Route::ScannerRoot);
    }
}
