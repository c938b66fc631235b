use folio_forms::{
    ActionDescriptor, AppEvent, ControlAddress, DictionaryBinding, FieldValue, ModalDescriptor, ModalPage,
    Notification, OptionMap, PageType, PropertyPageConfig, RestError, UpsertPayload, dependent_dictionaries,
};
use folio_runtime::{EventBus, ValidatorRegistry};
use futures::future::join_all;
use log::{debug, info, warn};
use serde_json::{Value, json};

use crate::backend::{BackendError, ModalBackend};
use crate::error::WizardError;
use crate::form_data::FormData;
use crate::session::PageSession;
use crate::tree::ControlTree;

pub const LOAD_MODAL_ERROR: &str = "Can't load modal";
pub const ERROR_PAGE_TITLE: &str = "Error page";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    Closed,
    Loading,
    Ready { page_number: usize },
    Error,
}

/// Form values of a page that was left forwards, kept to rebuild the flow
/// when navigating back.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSnapshot {
    pub source_page_number: usize,
    pub source_page_type: PageType,
    pub target_page_type: PageType,
    pub form: FormData,
}

#[derive(Debug, Clone, PartialEq)]
enum Direction {
    Forward(ContextSnapshot),
    Backward(Vec<ContextSnapshot>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    resource: String,
    body: Value,
    target_page: usize,
    direction: Direction,
}

impl PageRequest {
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn target_page(&self) -> usize {
        self.target_page
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitRequest {
    pub action: ActionDescriptor,
    pub body: Value,
}

/// Multi-page add/update/clone modal.
///
/// Navigation is split into a `begin_*` step that validates and moves to
/// `Loading`, and a `finish_*` step applying the server response. The async
/// methods chain both around the backend call.
pub struct WizardController<B> {
    backend: B,
    bus: EventBus,
    validators: ValidatorRegistry,
    state: WizardState,
    modal: Option<ModalDescriptor>,
    session: Option<PageSession>,
    initial: Option<PropertyPageConfig>,
    contexts: Vec<ContextSnapshot>,
    page_number: usize,
    submitting: bool,
    error: Option<RestError>,
}

impl<B: ModalBackend> WizardController<B> {
    pub fn new(backend: B, bus: EventBus, validators: ValidatorRegistry) -> Self {
        Self {
            backend,
            bus,
            validators,
            state: WizardState::Closed,
            modal: None,
            session: None,
            initial: None,
            contexts: Vec::new(),
            page_number: 0,
            submitting: false,
            error: None,
        }
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn modal(&self) -> Option<&ModalDescriptor> {
        self.modal.as_ref()
    }

    pub fn pages(&self) -> &[ModalPage] {
        self.modal.as_ref().map(|m| m.pages.as_slice()).unwrap_or(&[])
    }

    pub fn session(&self) -> Option<&PageSession> {
        self.session.as_ref()
    }

    pub fn tree(&self) -> Option<&ControlTree> {
        self.session.as_ref().map(PageSession::tree)
    }

    pub fn contexts(&self) -> &[ContextSnapshot] {
        &self.contexts
    }

    pub fn error(&self) -> Option<&RestError> {
        self.error.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn title(&self) -> String {
        match (&self.state, &self.modal) {
            (WizardState::Error, _) => ERROR_PAGE_TITLE.to_string(),
            (_, Some(modal)) => modal.display_title(),
            (_, None) => String::new(),
        }
    }

    pub fn is_final_page(&self) -> bool {
        self.modal.is_some() && self.page_number + 1 >= self.pages().len()
    }

    pub fn can_go_back(&self) -> bool {
        self.pages().len() > 1 && self.page_number > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.pages().len() > 1 && self.page_number + 1 < self.pages().len()
    }

    pub async fn open(&mut self, action: &str) -> Result<(), WizardError> {
        if self.state != WizardState::Closed {
            return Err(WizardError::AlreadyOpen);
        }
        self.state = WizardState::Loading;
        debug!("Opening modal {}", action);

        match self.backend.fetch_modal(action).await {
            Ok(modal) => {
                self.load_modal(modal);
                Ok(())
            }
            Err(e) => {
                warn!("Cannot load modal {}: {}", action, e);
                self.bus.publish(AppEvent::error(
                    None,
                    Notification::error_with_reason(LOAD_MODAL_ERROR, e.reason()),
                ));
                self.clear();
                Err(WizardError::SchemaFetch(e))
            }
        }
    }

    fn load_modal(&mut self, mut modal: ModalDescriptor) {
        let page = std::mem::take(&mut modal.property_page);
        info!("Opened {} modal for {}", modal.modal_type.as_str(), modal.resource);
        self.modal = Some(modal);
        self.contexts.clear();
        self.page_number = 0;
        self.error = None;
        self.install_page(page);
        self.state = WizardState::Ready { page_number: 0 };
    }

    fn install_page(&mut self, page: PropertyPageConfig) {
        self.initial = Some(page.clone());
        self.session = Some(PageSession::new(page));
    }

    fn ready_page(&self) -> Result<usize, WizardError> {
        if self.submitting {
            return Err(WizardError::SubmissionInFlight);
        }
        match self.state {
            WizardState::Ready { page_number } => Ok(page_number),
            WizardState::Loading => Err(WizardError::Busy),
            WizardState::Closed => Err(WizardError::NotOpen),
            WizardState::Error => Err(WizardError::ErrorPending),
        }
    }

    pub fn begin_advance(&mut self, target: usize) -> Result<PageRequest, WizardError> {
        let current = self.ready_page()?;
        let (modal, session) = match (&self.modal, &self.session) {
            (Some(modal), Some(session)) => (modal, session),
            _ => return Err(WizardError::NotOpen),
        };
        if target <= current || target >= modal.pages.len() {
            return Err(WizardError::InvalidTransition { from: current, to: target });
        }

        let report = session.check_validity(self.validators.radix_point());
        if !report.is_valid() {
            debug!("Page {} has {} invalid field(s)", current, report.issues.len());
            return Err(WizardError::ValidationFailed(report));
        }

        let source_page_type = modal.pages[current].page_type;
        let target_page_type = modal.pages[target].page_type;
        let mut form = session.form_data().prefixed("contextInfo.");
        form.set("modalType", modal.modal_type.as_str());
        form.set("sourcePageType", source_page_type.as_str());
        form.set("targetPageType", target_page_type.as_str());

        let request = PageRequest {
            resource: modal.resource.clone(),
            body: form.to_json(),
            target_page: target,
            direction: Direction::Forward(ContextSnapshot {
                source_page_number: current,
                source_page_type,
                target_page_type,
                form,
            }),
        };
        self.state = WizardState::Loading;
        Ok(request)
    }

    /// Pops the contexts recorded since page `target` was left. Returns
    /// `None` when there is nothing to pop; the wizard then stays where it is.
    pub fn begin_retreat(&mut self, target: usize) -> Result<Option<PageRequest>, WizardError> {
        let current = self.ready_page()?;
        let Some(modal) = &self.modal else {
            return Err(WizardError::NotOpen);
        };
        if target >= current {
            return Err(WizardError::InvalidTransition { from: current, to: target });
        }
        let resource = modal.resource.clone();

        let Some(split) = self.contexts.iter().position(|c| c.source_page_number >= target) else {
            warn!("No context recorded for page {}, staying on page {}", target, current);
            return Ok(None);
        };
        let popped = self.contexts.split_off(split);
        let Some(target_page_type) = popped.first().map(|c| c.source_page_type) else {
            return Ok(None);
        };

        self.state = WizardState::Loading;
        Ok(Some(PageRequest {
            resource,
            body: json!({ "targetPageType": target_page_type.as_str() }),
            target_page: target,
            direction: Direction::Backward(popped),
        }))
    }

    /// Applies the server answer to a navigation request. On failure the
    /// wizard shows the error page and stays on the page it was on.
    pub fn finish_page(
        &mut self,
        request: PageRequest,
        response: Result<PropertyPageConfig, BackendError>,
    ) -> Result<(), WizardError> {
        if self.state != WizardState::Loading {
            debug!("Dropping late response for page {}", request.target_page);
            return Ok(());
        }
        match response {
            Ok(page) => {
                if let Direction::Forward(snapshot) = request.direction {
                    self.contexts.push(snapshot);
                }
                self.install_page(page);
                self.page_number = request.target_page;
                self.state = WizardState::Ready {
                    page_number: request.target_page,
                };
                debug!("Now on page {}", self.page_number);
                Ok(())
            }
            Err(e) => {
                if let Direction::Backward(popped) = request.direction {
                    self.contexts.extend(popped);
                }
                warn!("Cannot load page {}: {}", request.target_page, e);
                self.error = Some(e.to_rest_error(&format!("/modal/page/{}", request.resource)));
                self.state = WizardState::Error;
                Err(WizardError::SchemaFetch(e))
            }
        }
    }

    pub async fn advance(&mut self, target: usize) -> Result<(), WizardError> {
        let request = self.begin_advance(target)?;
        let response = self.backend.resolve_page(&request.resource, &request.body).await;
        self.finish_page(request, response)
    }

    pub async fn retreat(&mut self, target: usize) -> Result<(), WizardError> {
        let Some(request) = self.begin_retreat(target)? else {
            return Ok(());
        };
        let response = self.backend.resolve_page(&request.resource, &request.body).await;
        self.finish_page(request, response)
    }

    pub async fn next(&mut self) -> Result<(), WizardError> {
        self.advance(self.page_number + 1).await
    }

    pub async fn previous(&mut self) -> Result<(), WizardError> {
        let target = self.page_number.checked_sub(1).ok_or(WizardError::InvalidTransition {
            from: self.page_number,
            to: 0,
        })?;
        self.retreat(target).await
    }

    pub fn dismiss_error(&mut self) -> bool {
        if self.state != WizardState::Error {
            return false;
        }
        self.error = None;
        self.state = WizardState::Ready {
            page_number: self.page_number,
        };
        true
    }

    pub fn begin_submit(&mut self) -> Result<SubmitRequest, WizardError> {
        self.ready_page()?;
        let (modal, session) = match (&self.modal, &self.session) {
            (Some(modal), Some(session)) => (modal, session),
            _ => return Err(WizardError::NotOpen),
        };
        if !self.is_final_page() {
            return Err(WizardError::NotFinalPage);
        }
        let action = modal.action.clone().ok_or(WizardError::NoAction)?;

        let report = session.validate(&self.validators);
        if !report.is_valid() {
            return Err(WizardError::ValidationFailed(report));
        }
        let body = session.form_data().to_json();
        self.submitting = true;
        Ok(SubmitRequest { action, body })
    }

    pub fn finish_submit(
        &mut self,
        request: SubmitRequest,
        result: Result<(), BackendError>,
    ) -> Result<(), WizardError> {
        self.submitting = false;
        let action = request.action;
        match result {
            Ok(()) => {
                let (focus, upserted_resource) = match &self.modal {
                    Some(modal) => (modal.modal_type.focuses_result(), modal.resource.clone()),
                    None => (false, String::new()),
                };
                self.bus.publish(AppEvent::ItemUpsert(UpsertPayload {
                    id: action.id.clone(),
                    focus,
                    upserted_resource,
                    notification: Notification::success(action.success_message.clone()),
                }));
                info!("{} {} succeeded", action.method.as_str(), action.endpoint);
                self.clear();
                Ok(())
            }
            Err(e) => {
                warn!("{} {} failed: {}", action.method.as_str(), action.endpoint, e);
                self.bus.publish(AppEvent::error(
                    action.id.clone(),
                    Notification::error_with_reason(&action.error_message, e.reason()),
                ));
                Err(WizardError::Submission(e))
            }
        }
    }

    pub async fn submit(&mut self) -> Result<(), WizardError> {
        let request = self.begin_submit()?;
        let result = self.backend.submit(&request.action, &request.body).await;
        self.finish_submit(request, result)
    }

    pub fn reset(&mut self) -> Result<(), WizardError> {
        self.ready_page()?;
        let initial = self.initial.clone().ok_or(WizardError::NotOpen)?;
        self.session = Some(PageSession::new(initial));
        Ok(())
    }

    pub fn add_row(&mut self, table: &str) -> Result<bool, WizardError> {
        self.ready_page()?;
        let session = self.session.as_mut().ok_or(WizardError::NotOpen)?;
        let added = session.add_row(table);
        debug!("Add row to {}: {}", table, added);
        Ok(added)
    }

    pub fn remove_row(&mut self, table: &str, index: usize) -> Result<bool, WizardError> {
        self.ready_page()?;
        let session = self.session.as_mut().ok_or(WizardError::NotOpen)?;
        let removed = session.remove_row(table, index);
        debug!("Remove row {} of {}: {}", index, table, removed);
        Ok(removed)
    }

    pub fn close(&mut self) -> Result<(), WizardError> {
        if self.submitting {
            return Err(WizardError::SubmissionInFlight);
        }
        self.clear();
        Ok(())
    }

    fn clear(&mut self) {
        self.state = WizardState::Closed;
        self.modal = None;
        self.session = None;
        self.initial = None;
        self.contexts.clear();
        self.page_number = 0;
        self.submitting = false;
        self.error = None;
    }

    /// Applies an edit and refreshes the dictionaries that depend on the form.
    ///
    /// All reloads run concurrently and are awaited before the change is
    /// committed, so the page never renders with stale options. A failed
    /// reload is reported on the bus and leaves that dictionary unchanged.
    pub async fn change_field(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<bool, WizardError> {
        self.ready_page()?;
        let mut updated = self.session.clone().ok_or(WizardError::NotOpen)?;
        if !updated.apply_change(name, value) {
            return Ok(false);
        }

        let bindings: Vec<DictionaryBinding> = dependent_dictionaries(&updated.page().controls)
            .into_iter()
            .filter(|binding| binding.property != name)
            .collect();
        if !bindings.is_empty() {
            let options = self.reload_dictionaries(&bindings, &updated.form_data()).await;
            updated.set_options(options);
        }

        self.session = Some(updated);
        Ok(true)
    }

    async fn reload_dictionaries(
        &self,
        bindings: &[DictionaryBinding],
        form: &FormData,
    ) -> Vec<(ControlAddress, OptionMap)> {
        let context = form.prefixed("object.");
        let bodies: Vec<Value> = bindings
            .iter()
            .map(|binding| {
                let mut body = context.clone();
                if let Some(qualification) = &binding.settings.qualification {
                    body.set("qualification", qualification.as_str());
                }
                body.to_json()
            })
            .collect();

        let results = join_all(
            bindings
                .iter()
                .zip(&bodies)
                .map(|(binding, body)| self.backend.reload_dictionary(&binding.settings.dictionary_type, body)),
        )
        .await;

        let mut reloaded = Vec::new();
        for (binding, result) in bindings.iter().zip(results) {
            match result {
                Ok(options) => reloaded.push((binding.address.clone(), options)),
                Err(e) => {
                    warn!("Cannot reload dictionary {}: {}", binding.settings.dictionary_type, e);
                    self.bus.publish(AppEvent::error(
                        None,
                        Notification::error_with_reason(
                            &format!("Can't reload {} dictionary.", binding.settings.dictionary_type),
                            e.reason(),
                        ),
                    ));
                }
            }
        }
        reloaded
    }
}
