use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

use super::{PersonRecord, StepId, WizardError, WizardStep};
use crate::api::RecordId;
use crate::validation::{RawInput, RawValues, StepData};

const ID_KEY: &str = "id";

/// Accumulated state of a multi-step form.
///
/// Holds the ordered steps, the last submitted data of each step (with the
/// raw input that produced it), the unvalidated cache left behind when the
/// user goes back, the step pointer, the active flag and the id of the record
/// being edited. The pointer always indexes a registered step.
#[derive(Debug, Clone)]
pub struct MultistepController {
    steps: Vec<WizardStep>,
    data: BTreeMap<StepId, StepData>,
    snapshots: BTreeMap<StepId, RawValues>,
    cache: BTreeMap<StepId, RawValues>,
    index: usize,
    active: bool,
    id: Option<RecordId>,
}

impl MultistepController {
    /// Controller for a new, editable record.
    pub fn new(steps: Vec<WizardStep>) -> Result<Self, WizardError> {
        check_steps(&steps)?;
        Ok(Self {
            steps,
            data: BTreeMap::new(),
            snapshots: BTreeMap::new(),
            cache: BTreeMap::new(),
            index: 0,
            active: true,
            id: None,
        })
    }

    /// Controller for an existing record. Each step receives the fields its
    /// schema declares; `active == false` opens the record read-only.
    pub fn for_record(
        steps: Vec<WizardStep>,
        record: &PersonRecord,
        active: bool,
    ) -> Result<Self, WizardError> {
        let mut controller = Self::new(steps)?;
        controller.id = record.id;
        controller.active = active;

        for step in &controller.steps {
            let source = match step.id.namespace() {
                Some(namespace) => match record.get(namespace) {
                    Some(Value::Object(nested)) => nested,
                    _ => continue,
                },
                None => &record.fields,
            };
            let data: StepData = step
                .schema
                .keys()
                .filter_map(|key| source.get(key).map(|value| (key.to_string(), value.clone())))
                .collect();
            if !data.is_empty() {
                controller.data.insert(step.id, data);
            }
        }

        tracing::debug!(id = ?controller.id, active, steps = controller.data.len(), "loaded record into wizard");
        Ok(controller)
    }

    pub fn steps(&self) -> &[WizardStep] {
        &self.steps
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn current_step(&self) -> &WizardStep {
        &self.steps[self.index]
    }

    pub fn is_first_step(&self) -> bool {
        self.index == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.index + 1 == self.steps.len()
    }

    /// Stores the step's data and advances. At the last step the data is
    /// stored and the pointer stays put.
    pub fn next(&mut self, data: StepData, raw: RawValues) {
        self.set_current_step_data(data, raw);
        self.forward();
    }

    /// Advances without storing anything. No-op at the last step.
    pub fn forward(&mut self) {
        if self.is_last_step() {
            return;
        }
        self.index += 1;
        tracing::debug!(step = %self.current_step().id, "wizard advanced");
    }

    /// Retreats one step. No-op at the first step.
    pub fn back(&mut self) {
        if self.is_first_step() {
            return;
        }
        self.index -= 1;
        tracing::debug!(step = %self.current_step().id, "wizard went back");
    }

    /// Records a submission of the current step. Clears any cached draft.
    pub fn set_current_step_data(&mut self, data: StepData, raw: RawValues) {
        let id = self.current_step().id;
        self.data.insert(id, data);
        self.snapshots.insert(id, normalized(&raw));
        self.cache.remove(&id);
    }

    /// Keeps unvalidated input for the current step without submitting it.
    pub fn set_current_step_cache(&mut self, raw: RawValues) {
        let id = self.current_step().id;
        self.cache.insert(id, normalized(&raw));
    }

    pub fn current_step_data(&self) -> Option<&StepData> {
        self.data.get(&self.current_step().id)
    }

    pub fn step_data(&self, id: StepId) -> Option<&StepData> {
        self.data.get(&id)
    }

    /// Whether `raw` differs from what was last submitted for the current
    /// step. A step that was never submitted has nothing to lose.
    pub fn has_unsaved_changes(&self, raw: &RawValues) -> bool {
        match self.submitted_input() {
            Some(stored) => stored != normalized(raw),
            None => false,
        }
    }

    /// Working copy to show when the current step is displayed: the cached
    /// draft, else the submitted input, else nothing.
    pub fn restore_step(&self) -> RawValues {
        let id = self.current_step().id;
        if let Some(cached) = self.cache.get(&id) {
            return cached.clone();
        }
        self.submitted_input().unwrap_or_default()
    }

    /// Restored display value of one field of the current step.
    pub fn restore_input(&self, key: &str) -> Option<RawInput> {
        self.restore_step().remove(key)
    }

    fn submitted_input(&self) -> Option<RawValues> {
        let step = self.current_step();
        if let Some(snapshot) = self.snapshots.get(&step.id) {
            return Some(snapshot.clone());
        }
        self.data
            .get(&step.id)
            .map(|data| normalized(&step.schema.display_values(data)))
    }

    /// Merges every step's stored data into the object sent to the API.
    pub fn result_object(&self) -> PersonRecord {
        let mut fields = Map::new();
        for step in &self.steps {
            let Some(data) = self.data.get(&step.id) else {
                continue;
            };
            match step.id.namespace() {
                Some(namespace) => {
                    fields.insert(namespace.to_string(), Value::Object(data.clone()));
                }
                None => fields.extend(data.clone()),
            }
        }
        PersonRecord {
            id: self.id,
            fields,
        }
    }

    pub fn active_status(&self) -> bool {
        self.active
    }

    pub fn id(&self) -> Option<RecordId> {
        self.id
    }
}

/// Drops empty text entries so a field left blank and a field never touched
/// compare equal.
fn normalized(raw: &RawValues) -> RawValues {
    raw.iter()
        .filter(|(_, value)| !matches!(value, RawInput::Text(text) if text.is_empty()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn check_steps(steps: &[WizardStep]) -> Result<(), WizardError> {
    if steps.is_empty() {
        return Err(WizardError::NoSteps);
    }
    let mut ids = BTreeSet::new();
    let mut keys = BTreeSet::from([ID_KEY.to_string()]);
    for step in steps {
        if !ids.insert(step.id) {
            return Err(WizardError::DuplicateStep(step.id));
        }
        let produced: Vec<&str> = match step.id.namespace() {
            Some(namespace) => vec![namespace],
            None => step.schema.keys().collect(),
        };
        for key in produced {
            if !keys.insert(key.to_string()) {
                return Err(WizardError::DuplicateKey(key.to_string()));
            }
        }
    }
    Ok(())
}
