use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use super::{ApiError, ApiGateway, RecordId};
use crate::account::AccountRecord;
use crate::wizard::PersonRecord;

/// Gateway that keeps everything in memory. Backs the client's offline mode
/// and the test suites; failures can be injected with [`fail_next`].
///
/// [`fail_next`]: InMemoryGateway::fail_next
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    persons: RefCell<BTreeMap<RecordId, PersonRecord>>,
    accounts: RefCell<BTreeMap<RecordId, AccountRecord>>,
    calls: RefCell<Vec<String>>,
    pending_failures: Cell<usize>,
    next_id: Cell<RecordId>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` calls fail with a 503.
    pub fn fail_next(&self, count: usize) {
        self.pending_failures.set(count);
    }

    /// Names of the calls received so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn persons(&self) -> Vec<PersonRecord> {
        self.persons.borrow().values().cloned().collect()
    }

    pub fn account(&self, id: RecordId) -> Option<AccountRecord> {
        self.accounts.borrow().get(&id).cloned()
    }

    pub fn insert_account(&self, mut record: AccountRecord) -> RecordId {
        let id = record.id.unwrap_or_else(|| self.allocate_id());
        record.id = Some(id);
        self.accounts.borrow_mut().insert(id, record);
        id
    }

    pub fn insert_person(&self, mut record: PersonRecord) -> RecordId {
        let id = record.id.unwrap_or_else(|| self.allocate_id());
        record.id = Some(id);
        self.persons.borrow_mut().insert(id, record);
        id
    }

    fn allocate_id(&self) -> RecordId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn record_call(&self, name: &str) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(name.to_string());
        let pending = self.pending_failures.get();
        if pending > 0 {
            self.pending_failures.set(pending - 1);
            return Err(ApiError::Status {
                status: 503,
                message: "Service Unavailable".into(),
            });
        }
        Ok(())
    }

    fn not_found(what: &str, id: RecordId) -> ApiError {
        ApiError::Status {
            status: 404,
            message: format!("{what} {id} not found"),
        }
    }
}

impl ApiGateway for InMemoryGateway {
    fn create_person(&self, record: &PersonRecord) -> Result<(), ApiError> {
        self.record_call("create_person")?;
        let mut stored = record.clone();
        stored.id = None;
        self.insert_person(stored);
        Ok(())
    }

    fn update_person(&self, record: &PersonRecord) -> Result<(), ApiError> {
        self.record_call("update_person")?;
        let id = record
            .id
            .ok_or_else(|| ApiError::Decode("update without id".into()))?;
        let mut persons = self.persons.borrow_mut();
        if !persons.contains_key(&id) {
            return Err(Self::not_found("acolhido", id));
        }
        persons.insert(id, record.clone());
        Ok(())
    }

    fn get_person(&self, id: RecordId) -> Result<PersonRecord, ApiError> {
        self.record_call("get_person")?;
        self.persons
            .borrow()
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::not_found("acolhido", id))
    }

    fn create_account(&self, record: &AccountRecord) -> Result<(), ApiError> {
        self.record_call("create_account")?;
        let mut stored = record.clone();
        stored.id = None;
        self.insert_account(stored);
        Ok(())
    }

    fn update_account(&self, record: &AccountRecord) -> Result<(), ApiError> {
        self.record_call("update_account")?;
        let id = record
            .id
            .ok_or_else(|| ApiError::Decode("update without id".into()))?;
        let mut accounts = self.accounts.borrow_mut();
        let Some(existing) = accounts.get_mut(&id) else {
            return Err(Self::not_found("usuario", id));
        };
        let password = record.password.clone().or_else(|| existing.password.clone());
        *existing = record.clone();
        existing.password = password;
        Ok(())
    }

    fn update_account_status(&self, id: RecordId, active: bool) -> Result<(), ApiError> {
        self.record_call("update_account_status")?;
        let mut accounts = self.accounts.borrow_mut();
        let account = accounts
            .get_mut(&id)
            .ok_or_else(|| Self::not_found("usuario", id))?;
        account.status = active;
        Ok(())
    }

    fn get_account(&self, id: RecordId) -> Result<AccountRecord, ApiError> {
        self.record_call("get_account")?;
        let mut account = self
            .accounts
            .borrow()
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::not_found("usuario", id))?;
        account.password = None;
        Ok(account)
    }
}
