//! Form state.
//!
//! [`FormState`] owns the current values, the published errors, the
//! identity of every dynamic-list entry and the registered observers. Reads
//! go through an immutable [`FormSnapshot`] behind an `Arc`; every mutation
//! copies the snapshot if a reader still holds it, so a renderer never sees
//! a half-applied change.

mod config;
mod list;
mod values;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use stillwater::Validation;

use crate::error::{ErrorMap, FieldErrors, FormError};
use crate::path::FieldPath;
use crate::sink::SubmissionSink;
use crate::validator::Validator;

pub use config::{FormConfig, ValidationMode};
pub use list::{EntryId, FieldArray};

use list::IdAllocator;
use values::{read_at, read_at_mut, write_at};

/// Read-only view of a form between two mutations.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSnapshot {
    values: Value,
    errors: ErrorMap,
    is_valid: bool,
    lists: IndexMap<FieldPath, FieldArray>,
    submit_count: u32,
    submit_successful: bool,
}

impl FormSnapshot {
    /// The raw values as edited.
    pub fn values(&self) -> &Value {
        &self.values
    }

    /// The value at a dot-notation path, if present.
    pub fn value(&self, path: &str) -> Option<&Value> {
        let path = path.parse::<FieldPath>().ok()?;
        read_at(&self.values, &path)
    }

    /// The published errors.
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    /// The message to show next to the control at `path`.
    pub fn error(&self, path: &str) -> Option<&str> {
        self.errors.message(path)
    }

    /// True when the latest pass succeeded and no errors are shown.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Whether a submit would be allowed right now.
    pub fn can_submit(&self) -> bool {
        self.is_valid
    }

    /// Entry ids of the list at `path`, in list order.
    pub fn entries(&self, path: &str) -> &[EntryId] {
        path.parse::<FieldPath>()
            .ok()
            .and_then(|path| self.lists.get(&path))
            .map(FieldArray::ids)
            .unwrap_or(&[])
    }

    pub fn list(&self, path: &FieldPath) -> Option<&FieldArray> {
        self.lists.get(path)
    }

    pub fn submit_count(&self) -> u32 {
        self.submit_count
    }

    pub fn is_submitted(&self) -> bool {
        self.submit_count > 0
    }

    /// True when the most recent submit was accepted.
    pub fn is_submit_successful(&self) -> bool {
        self.submit_successful
    }
}

/// Result of [`FormState::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<T> {
    /// Values passed validation and were handed to the sink.
    Accepted(T),
    /// Values failed validation; the sink was not called.
    Rejected(FieldErrors),
}

impl<T> SubmitOutcome<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted(_))
    }
}

/// Handle returned by [`FormState::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(Arc<FormSnapshot>)>;

/// The state of one mounted form.
///
/// # Example
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use serde_json::json;
/// use userform::{FormConfig, FormState, PrettyJsonSink, Schema, Validator};
///
/// #[derive(Debug, Deserialize, Serialize)]
/// struct Login {
///     email: String,
/// }
///
/// let validator = Validator::<Login>::new(
///     Schema::object().field("email", Schema::string().non_empty().error("Email is required.")),
/// );
/// let mut form = FormState::new(validator, FormConfig::on_change());
///
/// form.set_field("email", "").unwrap();
/// assert_eq!(form.snapshot().error("email"), Some("Email is required."));
///
/// form.set_field("email", "ana@example.com").unwrap();
/// assert!(form.snapshot().is_valid());
///
/// let mut sink = PrettyJsonSink::new();
/// assert!(form.submit(&mut sink).unwrap().is_accepted());
/// assert_eq!(sink.output(), "{\n  \"email\": \"ana@example.com\"\n}");
/// ```
pub struct FormState<T> {
    validator: Validator<T>,
    config: FormConfig,
    initial: Value,
    snapshot: Arc<FormSnapshot>,
    ids: IdAllocator,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl<T: DeserializeOwned> FormState<T> {
    /// Creates a form with empty values.
    pub fn new(validator: Validator<T>, config: FormConfig) -> Self {
        let initial = Value::Object(Map::new());
        let is_valid = validator.errors(&initial).is_none();
        Self {
            validator,
            config,
            snapshot: Arc::new(FormSnapshot {
                values: initial.clone(),
                errors: ErrorMap::new(),
                is_valid,
                lists: IndexMap::new(),
                submit_count: 0,
                submit_successful: false,
            }),
            initial,
            ids: IdAllocator::default(),
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Replaces the starting values; `reset` returns to these.
    ///
    /// Lists that are already registered get fresh ids for the new entries.
    pub fn with_values(mut self, values: Value) -> Self {
        self.initial = values.clone();
        let snapshot = Arc::make_mut(&mut self.snapshot);
        snapshot.values = values;
        for (list_path, list) in snapshot.lists.iter_mut() {
            list.rekey(list_len(&snapshot.values, list_path), &mut self.ids);
        }
        snapshot.is_valid = self.validator.errors(&snapshot.values).is_none();
        self
    }

    pub fn config(&self) -> FormConfig {
        self.config
    }

    pub fn validator(&self) -> &Validator<T> {
        &self.validator
    }

    /// The current snapshot. Later mutations never change it.
    pub fn snapshot(&self) -> Arc<FormSnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Registers `path` as a dynamic list and keys its current entries.
    ///
    /// A missing value becomes an empty list.
    pub fn register_list(&mut self, path: &str) -> Result<(), FormError> {
        let path: FieldPath = path.parse()?;
        if self.snapshot.lists.contains_key(&path) {
            return Err(FormError::DuplicateList(path));
        }

        let len = match read_at(&self.snapshot.values, &path) {
            Some(Value::Array(items)) => items.len(),
            Some(Value::Null) | None => {
                let mut values = self.snapshot.values.clone();
                write_at(&mut values, &path, Value::Array(Vec::new()))?;
                let mut initial = self.initial.clone();
                if read_at(&initial, &path).map_or(true, Value::is_null) {
                    write_at(&mut initial, &path, Value::Array(Vec::new()))?;
                }
                self.initial = initial;
                Arc::make_mut(&mut self.snapshot).values = values;
                0
            }
            Some(_) => return Err(FormError::NotAContainer { path }),
        };

        let list = FieldArray::keyed(len, &mut self.ids);
        Arc::make_mut(&mut self.snapshot).lists.insert(path, list);
        Ok(())
    }

    /// Writes `value` at a dot-notation `path`.
    ///
    /// Writing a registered list (or one of its ancestors) replaces the
    /// entries and issues new ids for them. The write is applied entirely or
    /// not at all.
    pub fn set_field(&mut self, path: &str, value: impl Into<Value>) -> Result<(), FormError> {
        let path: FieldPath = path.parse()?;
        let mut values = self.snapshot.values.clone();
        write_at(&mut values, &path, value.into())?;

        tracing::debug!(path = %path, "field updated");

        let snapshot = Arc::make_mut(&mut self.snapshot);
        snapshot.values = values;
        for (list_path, list) in snapshot.lists.iter_mut() {
            if list_path.starts_with(&path) {
                list.rekey(list_len(&snapshot.values, list_path), &mut self.ids);
            }
        }

        self.after_change();
        Ok(())
    }

    /// Appends `entry` to the list at `path` and returns its new id.
    pub fn append(&mut self, path: &str, entry: impl Into<Value>) -> Result<EntryId, FormError> {
        let path: FieldPath = path.parse()?;
        let snapshot = Arc::make_mut(&mut self.snapshot);
        let list = snapshot
            .lists
            .get_mut(&path)
            .ok_or_else(|| FormError::UnknownList(path.clone()))?;
        let items = read_at_mut(&mut snapshot.values, &path)
            .and_then(Value::as_array_mut)
            .ok_or_else(|| FormError::NotAContainer { path: path.clone() })?;

        let id = list.append(items, entry.into(), &mut self.ids);
        tracing::debug!(path = %path, id = %id, len = list.len(), "list entry appended");

        self.after_change();
        Ok(id)
    }

    /// Removes the entry at `index` of the list at `path`.
    ///
    /// Removing the last remaining entry is allowed; validation reports the
    /// empty list at the list's own path.
    pub fn remove(&mut self, path: &str, index: usize) -> Result<Value, FormError> {
        let path: FieldPath = path.parse()?;
        let snapshot = Arc::make_mut(&mut self.snapshot);
        let list = snapshot
            .lists
            .get_mut(&path)
            .ok_or_else(|| FormError::UnknownList(path.clone()))?;
        let items = read_at_mut(&mut snapshot.values, &path)
            .and_then(Value::as_array_mut)
            .ok_or_else(|| FormError::NotAContainer { path: path.clone() })?;

        let len = items.len();
        let (id, removed) = list
            .remove(items, index)
            .ok_or_else(|| FormError::IndexOutOfBounds {
                path: path.clone(),
                index,
                len,
            })?;
        tracing::debug!(path = %path, id = %id, index, "list entry removed");

        self.after_change();
        Ok(removed)
    }

    /// Runs a validation pass and publishes its errors in any mode.
    ///
    /// Returns whether the form is valid.
    pub fn validate(&mut self) -> bool {
        self.run_pass(true);
        self.notify();
        self.snapshot.is_valid
    }

    /// Validates and, if the values pass, hands them to `sink`.
    ///
    /// Always runs a full pass regardless of mode. The form keeps its values
    /// after an accepted submit.
    pub fn submit<S>(&mut self, sink: &mut S) -> Result<SubmitOutcome<T>, FormError>
    where
        S: SubmissionSink<T> + ?Sized,
    {
        let result = self.validator.validate(&self.snapshot.values)?;
        let snapshot = Arc::make_mut(&mut self.snapshot);
        snapshot.submit_count += 1;

        let outcome = match result {
            Validation::Success(values) => {
                snapshot.errors = ErrorMap::new();
                snapshot.is_valid = true;
                snapshot.submit_successful = true;
                tracing::info!(submit_count = snapshot.submit_count, "form submitted");
                sink.accept(&values);
                SubmitOutcome::Accepted(values)
            }
            Validation::Failure(errors) => {
                snapshot.errors = ErrorMap::from(errors.clone());
                snapshot.is_valid = false;
                snapshot.submit_successful = false;
                tracing::warn!(
                    submit_count = snapshot.submit_count,
                    errors = errors.len(),
                    "submit rejected"
                );
                SubmitOutcome::Rejected(errors)
            }
        };

        self.notify();
        Ok(outcome)
    }

    /// Restores the starting values and clears errors and submit state.
    ///
    /// Lists keep their registration but their entries get new ids.
    pub fn reset(&mut self) {
        let snapshot = Arc::make_mut(&mut self.snapshot);
        snapshot.values = self.initial.clone();
        snapshot.errors = ErrorMap::new();
        snapshot.submit_count = 0;
        snapshot.submit_successful = false;
        for (list_path, list) in snapshot.lists.iter_mut() {
            list.rekey(list_len(&snapshot.values, list_path), &mut self.ids);
        }
        tracing::debug!("form reset");

        self.run_pass(false);
        self.notify();
    }

    fn after_change(&mut self) {
        self.run_pass(self.validates_on_change());
        self.notify();
    }

    fn validates_on_change(&self) -> bool {
        match self.config.mode {
            ValidationMode::OnChange => true,
            ValidationMode::OnSubmit => {
                self.snapshot.submit_count > 0
                    && self.config.revalidate_mode == ValidationMode::OnChange
            }
        }
    }

    /// Runs the validator over the whole form. The error map is replaced only
    /// when `publish` is set; `is_valid` needs a clean pass and an empty map.
    fn run_pass(&mut self, publish: bool) {
        let errors = self.validator.errors(&self.snapshot.values);
        tracing::debug!(
            mode = ?self.config.mode,
            publish,
            errors = errors.as_ref().map_or(0, FieldErrors::len),
            "validation pass"
        );

        let snapshot = Arc::make_mut(&mut self.snapshot);
        let passed = errors.is_none();
        if publish {
            snapshot.errors = errors.map(ErrorMap::from).unwrap_or_default();
        }
        snapshot.is_valid = passed && snapshot.errors.is_empty();
    }
}

impl<T> FormState<T> {
    /// Registers a callback run with the new snapshot after every mutation.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(Arc<FormSnapshot>) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(callback)));
        id
    }

    /// Removes a callback. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(other, _)| *other != id);
        self.observers.len() != before
    }

    fn notify(&mut self) {
        for (_, observer) in self.observers.iter_mut() {
            observer(Arc::clone(&self.snapshot));
        }
    }
}

fn list_len(values: &Value, path: &FieldPath) -> usize {
    read_at(values, path)
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

impl<T> fmt::Debug for FormState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormState")
            .field("config", &self.config)
            .field("snapshot", &self.snapshot)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use serde::Deserialize;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Deserialize, PartialEq)]
    struct Entry {
        label: String,
    }

    #[derive(Debug, Clone, Deserialize, PartialEq)]
    struct Doc {
        title: String,
        entries: Vec<Entry>,
    }

    fn form(config: FormConfig) -> FormState<Doc> {
        let validator = Validator::new(
            Schema::object()
                .field("title", Schema::string().non_empty().error("title required"))
                .field(
                    "entries",
                    Schema::array(
                        Schema::object()
                            .field("label", Schema::string().non_empty().error("label required")),
                    )
                    .non_empty()
                    .error("need an entry"),
                ),
        );
        let mut form = FormState::new(validator, config)
            .with_values(json!({"title": "", "entries": []}));
        form.register_list("entries").unwrap();
        form
    }

    #[test]
    fn test_new_form_publishes_no_errors() {
        let form = form(FormConfig::on_change());
        let snapshot = form.snapshot();
        assert!(snapshot.errors().is_empty());
        assert!(!snapshot.is_valid());
        assert!(!snapshot.can_submit());
    }

    #[test]
    fn test_on_change_publishes_every_pass() {
        let mut form = form(FormConfig::on_change());
        form.set_field("title", "Doc").unwrap();
        let snapshot = form.snapshot();
        assert_eq!(snapshot.error("title"), None);
        assert_eq!(snapshot.error("entries"), Some("need an entry"));

        form.append("entries", json!({"label": ""})).unwrap();
        assert_eq!(form.snapshot().error("entries.0.label"), Some("label required"));
        assert_eq!(form.snapshot().error("entries"), None);

        form.set_field("entries.0.label", "x").unwrap();
        assert!(form.snapshot().errors().is_empty());
        assert!(form.snapshot().is_valid());
    }

    #[test]
    fn test_on_submit_defers_errors_until_submit() {
        let mut form = form(FormConfig::on_submit());
        form.set_field("title", "").unwrap();
        assert!(form.snapshot().errors().is_empty());
        assert!(!form.snapshot().is_valid());

        let mut called = false;
        let outcome = form.submit(&mut |_: &Doc| called = true).unwrap();
        assert!(!outcome.is_accepted());
        assert!(!called);
        assert_eq!(form.snapshot().error("title"), Some("title required"));

        // revalidates on change once submitted
        form.set_field("title", "Doc").unwrap();
        assert_eq!(form.snapshot().error("title"), None);
    }

    #[test]
    fn test_strict_on_submit_keeps_errors_until_next_submit() {
        let config = FormConfig::on_submit().with_revalidate_mode(ValidationMode::OnSubmit);
        let mut form = form(config);
        let mut sink = |_: &Doc| {};
        form.submit(&mut sink).unwrap();
        form.set_field("title", "Doc").unwrap();
        assert_eq!(form.snapshot().error("title"), Some("title required"));

        form.append("entries", json!({"label": "x"})).unwrap();
        assert!(!form.snapshot().is_valid());
        assert!(form.submit(&mut sink).unwrap().is_accepted());
        assert!(form.snapshot().errors().is_empty());
        assert!(form.snapshot().is_valid());
    }

    #[test]
    fn test_validate_publishes_in_on_submit_mode() {
        let mut form = form(FormConfig::on_submit());
        assert!(!form.validate());
        assert_eq!(form.snapshot().error("title"), Some("title required"));
        assert_eq!(form.snapshot().submit_count(), 0);
    }

    #[test]
    fn test_accepted_submit_calls_sink_and_keeps_values() {
        let mut form = form(FormConfig::on_change());
        form.set_field("title", "Doc").unwrap();
        form.append("entries", json!({"label": "x"})).unwrap();

        let mut received = Vec::new();
        let mut sink = |doc: &Doc| received.push(doc.clone());
        let outcome = form.submit(&mut sink).unwrap();

        let expected = Doc {
            title: "Doc".to_string(),
            entries: vec![Entry {
                label: "x".to_string(),
            }],
        };
        assert_eq!(outcome, SubmitOutcome::Accepted(expected.clone()));
        assert_eq!(received, vec![expected]);

        let snapshot = form.snapshot();
        assert_eq!(snapshot.value("title"), Some(&json!("Doc")));
        assert_eq!(snapshot.submit_count(), 1);
        assert!(snapshot.is_submit_successful());
    }

    #[test]
    fn test_failed_write_leaves_state_untouched() {
        let mut form = form(FormConfig::on_change());
        let before = form.snapshot();
        let err = form.set_field("entries.2.label", "x").unwrap_err();
        assert!(matches!(err, FormError::IndexOutOfBounds { index: 2, len: 0, .. }));
        assert_eq!(*form.snapshot(), *before);

        assert!(matches!(form.set_field("a..b", "x"), Err(FormError::Path(_))));
    }

    #[test]
    fn test_snapshots_are_copy_on_write() {
        let mut form = form(FormConfig::on_change());
        let held = form.snapshot();
        form.set_field("title", "changed").unwrap();
        assert_eq!(held.value("title"), Some(&json!("")));
        assert_eq!(form.snapshot().value("title"), Some(&json!("changed")));
    }

    #[test]
    fn test_observers_see_each_mutation() {
        let mut form = form(FormConfig::on_change());
        let seen: Rc<RefCell<Vec<usize>>> = Rc::default();

        let sink = Rc::clone(&seen);
        let id = form.subscribe(move |snapshot| sink.borrow_mut().push(snapshot.entries("entries").len()));

        form.append("entries", json!({"label": "a"})).unwrap();
        form.append("entries", json!({"label": "b"})).unwrap();
        form.remove("entries", 0).unwrap();
        assert_eq!(*seen.borrow(), vec![1, 2, 1]);

        assert!(form.unsubscribe(id));
        assert!(!form.unsubscribe(id));
        form.set_field("title", "x").unwrap();
        assert_eq!(seen.borrow().len(), 3);
    }

    #[test]
    fn test_list_errors() {
        let mut form = form(FormConfig::on_change());
        assert!(matches!(form.append("nope", json!({})), Err(FormError::UnknownList(_))));
        assert!(matches!(
            form.remove("entries", 0),
            Err(FormError::IndexOutOfBounds { index: 0, len: 0, .. })
        ));
        assert!(matches!(form.register_list("entries"), Err(FormError::DuplicateList(_))));
        assert!(matches!(form.register_list("title"), Err(FormError::NotAContainer { .. })));
    }

    #[test]
    fn test_writing_list_root_rekeys() {
        let mut form = form(FormConfig::on_change());
        let kept = form.append("entries", json!({"label": "a"})).unwrap();
        form.set_field("entries", json!([{"label": "x"}, {"label": "y"}])).unwrap();

        let ids = form.snapshot().entries("entries").to_vec();
        assert_eq!(ids.len(), 2);
        assert!(!ids.contains(&kept));
    }

    #[test]
    fn test_writing_inside_entry_keeps_ids() {
        let mut form = form(FormConfig::on_change());
        let id = form.append("entries", json!({"label": "a"})).unwrap();
        form.set_field("entries.0.label", "b").unwrap();
        assert_eq!(form.snapshot().entries("entries"), &[id]);
    }

    #[test]
    fn test_reset_restores_initial_values() {
        let mut form = form(FormConfig::on_change());
        let id = form.append("entries", json!({"label": "a"})).unwrap();
        form.set_field("title", "Doc").unwrap();
        form.submit(&mut |_: &Doc| {}).unwrap();

        form.reset();
        let snapshot = form.snapshot();
        assert_eq!(snapshot.values(), &json!({"title": "", "entries": []}));
        assert!(snapshot.errors().is_empty());
        assert_eq!(snapshot.submit_count(), 0);
        assert!(!snapshot.entries("entries").contains(&id));
    }
}
