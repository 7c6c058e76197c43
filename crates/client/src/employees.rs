//! Employee store: local mirror of the server's employee records.
//!
//! Every mutation applies the record the server returned, never the payload
//! that was sent. Overlapping calls are not fenced: responses are applied in
//! arrival order and the last one wins.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use staffdesk_core::{EmployeeId, Entity};
use url::form_urlencoded;

use crate::api::ApiClient;
use crate::error::{ClientError, Operation};
use crate::status::{HasStatus, InFlight, OperationStatus, lock};
use crate::transport::TransportError;
use crate::types::{Employee, EmployeeDraft, EmployeeFilter};

const COLLECTION_PATH: &str = "/employees";

/// Cache contents as exposed to the UI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeCache {
    pub items: Vec<Employee>,
    pub focused: Option<Employee>,
    pub status: OperationStatus,
}

impl HasStatus for EmployeeCache {
    fn status_mut(&mut self) -> &mut OperationStatus {
        &mut self.status
    }
}

/// Replace the element carrying `id`; returns whether one matched.
fn replace_by_id<E: Entity + Clone>(items: &mut [E], id: &E::Id, replacement: &E) -> bool {
    match items.iter_mut().find(|item| item.has_id(id)) {
        Some(slot) => {
            *slot = replacement.clone();
            true
        }
        None => false,
    }
}

pub struct EmployeeStore {
    state: Mutex<EmployeeCache>,
    api: Arc<ApiClient>,
}

impl EmployeeStore {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            state: Mutex::new(EmployeeCache::default()),
            api,
        }
    }

    /// Fetch the collection and replace `items` wholesale (no merge).
    pub async fn fetch_employees(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, ClientError> {
        let in_flight = InFlight::begin(&self.state);
        let result = self
            .api
            .get_json::<Vec<Employee>>(COLLECTION_PATH, filter.to_query())
            .await;
        let employees = settle(&in_flight, Operation::FetchAll, result, || {
            "Failed to fetch employees".to_string()
        })?;

        tracing::debug!(count = employees.len(), "employees fetched");
        lock(&self.state).items = employees.clone();
        Ok(employees)
    }

    /// Fetch one record into `focused`; `items` is left alone.
    pub async fn fetch_employee(&self, id: &EmployeeId) -> Result<Employee, ClientError> {
        let in_flight = InFlight::begin(&self.state);
        let result = self
            .api
            .get_json::<Employee>(&record_path(id), Vec::new())
            .await;
        let employee = settle(&in_flight, Operation::FetchOne, result, || {
            format!("Failed to fetch employee with ID {id}")
        })?;

        lock(&self.state).focused = Some(employee.clone());
        Ok(employee)
    }

    /// Create a record and append the server's version to `items`.
    pub async fn create_employee(&self, draft: &EmployeeDraft) -> Result<Employee, ClientError> {
        let in_flight = InFlight::begin(&self.state);
        let result = self
            .api
            .post_json::<_, Employee>(COLLECTION_PATH, draft)
            .await;
        let created = settle(&in_flight, Operation::Create, result, || {
            "Failed to create employee".to_string()
        })?;

        tracing::info!(employee_id = %created.id, "employee created");
        lock(&self.state).items.push(created.clone());
        Ok(created)
    }

    /// Patch a record. The returned version replaces the cached element and
    /// the focused record when their id matches; a record that is not cached
    /// is not inserted.
    pub async fn update_employee(
        &self,
        id: &EmployeeId,
        draft: &EmployeeDraft,
    ) -> Result<Employee, ClientError> {
        let in_flight = InFlight::begin(&self.state);
        let result = self
            .api
            .patch_json::<_, Employee>(&record_path(id), draft)
            .await;
        let updated = settle(&in_flight, Operation::Update, result, || {
            format!("Failed to update employee with ID {id}")
        })?;

        let mut state = lock(&self.state);
        if !replace_by_id(&mut state.items, id, &updated) {
            tracing::debug!(employee_id = %id, "updated employee not cached; items unchanged");
        }
        if state.focused.as_ref().is_some_and(|f| f.has_id(id)) {
            state.focused = Some(updated.clone());
        }
        drop(state);

        tracing::info!(employee_id = %id, "employee updated");
        Ok(updated)
    }

    /// Delete a record; the cache only changes once the server acknowledged.
    pub async fn delete_employee(&self, id: &EmployeeId) -> Result<bool, ClientError> {
        let in_flight = InFlight::begin(&self.state);
        let result = self.api.delete(&record_path(id)).await;
        settle(&in_flight, Operation::Delete, result, || {
            format!("Failed to delete employee with ID {id}")
        })?;

        let mut state = lock(&self.state);
        state.items.retain(|e| !e.has_id(id));
        if state.focused.as_ref().is_some_and(|f| f.has_id(id)) {
            state.focused = None;
        }
        drop(state);

        tracing::info!(employee_id = %id, "employee deleted");
        Ok(true)
    }

    /// Linear scan of the cached items; never fetches.
    pub fn get_employee_by_id(&self, id: &EmployeeId) -> Option<Employee> {
        lock(&self.state).items.iter().find(|e| e.has_id(id)).cloned()
    }

    /// Distinct departments across the cached items, recomputed on every
    /// call. Order is unspecified.
    pub fn departments(&self) -> Vec<String> {
        let state = lock(&self.state);
        let mut seen = HashSet::new();
        state
            .items
            .iter()
            .filter(|e| seen.insert(e.department.as_str()))
            .map(|e| e.department.clone())
            .collect()
    }

    pub fn employees(&self) -> Vec<Employee> {
        lock(&self.state).items.clone()
    }

    pub fn current_employee(&self) -> Option<Employee> {
        lock(&self.state).focused.clone()
    }

    pub fn loading(&self) -> bool {
        lock(&self.state).status.loading
    }

    pub fn error(&self) -> Option<String> {
        lock(&self.state).status.error.clone()
    }

    pub fn snapshot(&self) -> EmployeeCache {
        lock(&self.state).clone()
    }
}

/// `/employees/{id}` with the id percent-encoded as a single segment.
fn record_path(id: &EmployeeId) -> String {
    // form encoding escapes `+` itself, so any `+` left stands for a space.
    let segment: String = form_urlencoded::byte_serialize(id.as_str().as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    format!("{COLLECTION_PATH}/{segment}")
}

/// Record a failure on the store and classify it; pass successes through.
fn settle<T>(
    in_flight: &InFlight<'_, EmployeeCache>,
    operation: Operation,
    result: Result<T, TransportError>,
    fallback: impl FnOnce() -> String,
) -> Result<T, ClientError> {
    result.map_err(|source| {
        let message = source
            .server_message()
            .map(str::to_string)
            .unwrap_or_else(fallback);
        tracing::warn!(%operation, error = %source, "employee operation failed");
        in_flight.fail(message.clone());
        ClientError::resource(operation, message, source)
    })
}
