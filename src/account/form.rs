use serde_json::Value;
use thiserror::Error;

use super::{AccountRecord, PermissionSet, Role, ToggleOutcome};
use crate::api::{ApiGateway, RecordId};
use crate::session::Route;
use crate::submission::{BusyFlag, Confirmation, LeaveGuard, SubmissionError};
use crate::validation::{FieldErrors, FieldSpec, RawInput, RawValues, Rule, StepData, StepSchema, Transform};

pub const DEACTIVATION_CONFIRMATION: &str =
    "Deseja desativar este usuário?\nQualquer mudança não salva será perdida.";

const PASSWORD_MIN: &str = "A senha precisa ter no mínimo 6 caracteres.";
const PASSWORD_MAX: &str = "A senha precisa ter no máximo 20 caracteres.";

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    Invalid(FieldErrors),
    #[error("Usuário desativado: ative-o para alterar o cadastro")]
    ReadOnly,
    #[error("O usuário ainda não foi cadastrado")]
    NotSaved,
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// Result of the activate/deactivate button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutcome {
    Changed { active: bool },
    Cancelled,
}

/// Account create/edit form.
#[derive(Debug)]
pub struct AccountForm {
    id: Option<RecordId>,
    schema: StepSchema,
    initial: RawValues,
    permissions: PermissionSet,
    active: bool,
    busy: BusyFlag,
    leave_guard: LeaveGuard,
}

impl AccountForm {
    /// Empty form for a new account. A password is mandatory.
    pub fn create() -> Self {
        Self {
            id: None,
            schema: account_schema(true),
            initial: RawValues::new(),
            permissions: PermissionSet::new(),
            active: true,
            busy: BusyFlag::new(),
            leave_guard: LeaveGuard::armed(),
        }
    }

    /// Form pre-filled from a stored account. Leaving the password blank
    /// keeps the current one.
    pub fn edit(record: &AccountRecord) -> Self {
        let mut initial = RawValues::new();
        initial.insert("name".into(), RawInput::text(&record.name));
        initial.insert("login".into(), RawInput::text(&record.login));
        Self {
            id: record.id,
            schema: account_schema(false),
            initial,
            permissions: PermissionSet::from_roles(&record.roles),
            active: record.status,
            busy: BusyFlag::new(),
            leave_guard: LeaveGuard::armed(),
        }
    }

    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    pub fn is_editing(&self) -> bool {
        self.id.is_some()
    }

    pub fn schema(&self) -> &StepSchema {
        &self.schema
    }

    /// Initial inputs. Password fields always start blank.
    pub fn defaults(&self) -> RawValues {
        self.initial.clone()
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    pub fn editable(&self) -> bool {
        self.active
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn leave_guard(&self) -> &LeaveGuard {
        &self.leave_guard
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_editing() {
            "Alterar cadastro"
        } else {
            "Cadastrar usuário"
        }
    }

    /// Label of the status button; only stored accounts have one.
    pub fn status_label(&self) -> Option<&'static str> {
        match (self.is_editing(), self.active) {
            (false, _) => None,
            (true, true) => Some("Desativar usuário"),
            (true, false) => Some("Ativar usuário"),
        }
    }

    pub fn blur(&self, key: &str, raw: &RawValues) -> Result<Value, FieldErrors> {
        self.schema.validate_field(key, raw)
    }

    pub fn toggle_permission(
        &mut self,
        role: Role,
        checked: bool,
        confirmation: &mut impl Confirmation,
    ) -> Result<ToggleOutcome, AccountError> {
        if !self.active {
            return Err(AccountError::ReadOnly);
        }
        Ok(self.permissions.toggle(role, checked, confirmation))
    }

    /// Validates and sends the account. Creates without an id, updates
    /// otherwise; returns the landing route on success.
    pub fn submit(
        &mut self,
        raw: &RawValues,
        gateway: &dyn ApiGateway,
    ) -> Result<Route, AccountError> {
        if !self.active {
            return Err(AccountError::ReadOnly);
        }
        let data = self.schema.validate(raw).map_err(AccountError::Invalid)?;
        let record = self.record_from(&data);

        self.busy.run(|| match record.id {
            Some(_) => gateway.update_account(&record),
            None => gateway.create_account(&record),
        })?;

        self.leave_guard.disarm();
        tracing::info!(id = ?record.id, login = %record.login, "account saved");
        Ok(Route::Menu)
    }

    /// Flips the stored account's status. Deactivating asks first and, once
    /// done, releases the leave guard.
    pub fn toggle_status(
        &mut self,
        gateway: &dyn ApiGateway,
        confirmation: &mut impl Confirmation,
    ) -> Result<StatusOutcome, AccountError> {
        let id = self.id.ok_or(AccountError::NotSaved)?;
        let was_active = self.active;
        if was_active && !confirmation.confirm(DEACTIVATION_CONFIRMATION) {
            return Ok(StatusOutcome::Cancelled);
        }

        self.busy
            .run(|| gateway.update_account_status(id, !was_active))?;

        self.active = !was_active;
        if was_active {
            self.leave_guard.disarm();
        }
        tracing::info!(id, active = self.active, "account status changed");
        Ok(StatusOutcome::Changed {
            active: self.active,
        })
    }

    fn record_from(&self, data: &StepData) -> AccountRecord {
        let text = |key: &str| {
            data.get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        AccountRecord {
            id: self.id,
            name: text("name").unwrap_or_default(),
            login: text("login").unwrap_or_default(),
            password: text("password"),
            roles: self.permissions.roles(),
            status: self.active,
        }
    }
}

fn account_schema(password_required: bool) -> StepSchema {
    let mut password = FieldSpec::text("password", "Senha")
        .with_rule(Rule::MinLength(6, PASSWORD_MIN))
        .with_rule(Rule::MaxLength(20, PASSWORD_MAX))
        .with_rule(Rule::NoSpaces("A senha não pode conter espaços"))
        .with_type_error("Insira um password");
    if password_required {
        password = password.required("Obrigatório inserir uma senha");
    }

    StepSchema::new(
        "usuario",
        vec![
            FieldSpec::text("name", "Nome")
                .with_transform(Transform::Uppercase)
                .with_transform(Transform::Trim)
                .required("Obrigatório inserir o nome do usuário")
                .with_rule(Rule::MinLength(3, "Nome precisa ter no mínimo 3 caracteres"))
                .with_rule(Rule::MaxLength(
                    255,
                    "Quantidade máxima permitida de carácteres: 255",
                ))
                .with_type_error("Insira o nome do usuário"),
            FieldSpec::text("login", "Login")
                .with_transform(Transform::Trim)
                .required("Obrigatório inserir um login")
                .with_rule(Rule::NoSpaces("O login não pode conter espaços"))
                .with_rule(Rule::NoUppercase(
                    "O login não pode conter letras maiúsculas",
                ))
                .with_rule(Rule::MinLength(
                    3,
                    "Inserir um login com pelo menos 3 caracteres",
                ))
                .with_rule(Rule::MaxLength(15, "Login deve ter no máximo 15 caracteres"))
                .with_type_error("Insira um login"),
            password,
            FieldSpec::text("repeatPassword", "Repita a senha")
                .with_rule(Rule::EqualsField(
                    "password",
                    "As senhas inseridas não são iguais.",
                ))
                .with_type_error("Repita a senha"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::InMemoryGateway;

    fn raw(pairs: &[(&str, &str)]) -> RawValues {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), RawInput::text(*value)))
            .collect()
    }

    fn accept(_: &str) -> bool {
        true
    }

    fn decline(_: &str) -> bool {
        false
    }

    fn stored(gateway: &InMemoryGateway, active: bool) -> AccountRecord {
        let id = gateway.insert_account(AccountRecord {
            id: None,
            name: "ANA SOUZA".into(),
            login: "ana".into(),
            password: Some("antiga".into()),
            roles: vec![Role::ConsultarAcolhido],
            status: active,
        });
        gateway.get_account(id).unwrap()
    }

    #[test]
    fn short_password_is_rejected() {
        let form = AccountForm::create();
        let errors = form
            .schema()
            .validate(&raw(&[
                ("name", "Ana"),
                ("login", "ana"),
                ("password", "abc"),
                ("repeatPassword", "abc"),
            ]))
            .unwrap_err();
        assert_eq!(errors.message_for("password"), Some(PASSWORD_MIN));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn matching_passwords_pass() {
        let form = AccountForm::create();
        let data = form
            .schema()
            .validate(&raw(&[
                ("name", "ana souza"),
                ("login", " ana "),
                ("password", "abcdef"),
                ("repeatPassword", "abcdef"),
            ]))
            .unwrap();
        assert_eq!(data["name"], "ANA SOUZA");
        assert_eq!(data["login"], "ana");
    }

    #[test]
    fn login_rules_report_in_order() {
        let form = AccountForm::create();
        let check = |login: &str| {
            form.blur("login", &raw(&[("login", login)]))
                .unwrap_err()
                .message_for("login")
                .map(str::to_string)
        };
        assert_eq!(check("a b").as_deref(), Some("O login não pode conter espaços"));
        assert_eq!(
            check("Ana").as_deref(),
            Some("O login não pode conter letras maiúsculas")
        );
        assert_eq!(
            check("an").as_deref(),
            Some("Inserir um login com pelo menos 3 caracteres")
        );
    }

    #[test]
    fn mismatched_repeat_is_reported() {
        let form = AccountForm::create();
        let errors = form
            .schema()
            .validate(&raw(&[
                ("name", "Ana"),
                ("login", "ana"),
                ("password", "abcdef"),
                ("repeatPassword", ""),
            ]))
            .unwrap_err();
        assert_eq!(
            errors.message_for("repeatPassword"),
            Some("As senhas inseridas não são iguais.")
        );
    }

    #[test]
    fn password_is_required_only_on_create() {
        let gateway = InMemoryGateway::new();
        let values = raw(&[("name", "Ana Souza"), ("login", "ana")]);
        let errors = AccountForm::create().schema().validate(&values).unwrap_err();
        assert!(errors.contains("password"));

        let form = AccountForm::edit(&stored(&gateway, true));
        assert!(form.schema().validate(&values).is_ok());
    }

    #[test]
    fn create_sends_roles_and_releases_guard() {
        let gateway = InMemoryGateway::new();
        let mut form = AccountForm::create();
        form.toggle_permission(Role::AlterarAcolhido, true, &mut accept)
            .unwrap();
        let route = form
            .submit(
                &raw(&[
                    ("name", "Ana"),
                    ("login", "ana"),
                    ("password", "abcdef"),
                    ("repeatPassword", "abcdef"),
                ]),
                &gateway,
            )
            .unwrap();
        assert_eq!(route, Route::Menu);
        assert!(!form.leave_guard().is_armed());
        let saved = gateway.account(1).unwrap();
        assert_eq!(
            saved.roles,
            vec![Role::AlterarAcolhido, Role::ConsultarAcolhido]
        );
        assert_eq!(saved.password.as_deref(), Some("abcdef"));
    }

    #[test]
    fn edit_without_password_keeps_stored_one() {
        let gateway = InMemoryGateway::new();
        let record = stored(&gateway, true);
        let mut form = AccountForm::edit(&record);
        assert_eq!(form.submit_label(), "Alterar cadastro");
        let mut values = form.defaults();
        values.insert("name".into(), RawInput::text("Ana Lima"));
        form.submit(&values, &gateway).unwrap();

        let saved = gateway.account(record.id.unwrap()).unwrap();
        assert_eq!(saved.name, "ANA LIMA");
        assert_eq!(saved.password.as_deref(), Some("antiga"));
        assert_eq!(gateway.calls().last().map(String::as_str), Some("update_account"));
    }

    #[test]
    fn failed_submit_keeps_guard_armed() {
        let gateway = InMemoryGateway::new();
        let record = stored(&gateway, true);
        let mut form = AccountForm::edit(&record);
        gateway.fail_next(1);
        let err = form.submit(&form.defaults(), &gateway).unwrap_err();
        assert!(matches!(err, AccountError::Submission(_)));
        assert!(form.leave_guard().is_armed());
        assert!(!form.is_busy());
    }

    #[test]
    fn deactivation_asks_and_releases_guard() {
        let gateway = InMemoryGateway::new();
        let record = stored(&gateway, true);
        let mut form = AccountForm::edit(&record);
        assert_eq!(form.status_label(), Some("Desativar usuário"));

        assert_eq!(
            form.toggle_status(&gateway, &mut decline).unwrap(),
            StatusOutcome::Cancelled
        );
        assert!(form.is_active());

        assert_eq!(
            form.toggle_status(&gateway, &mut accept).unwrap(),
            StatusOutcome::Changed { active: false }
        );
        assert!(!form.leave_guard().is_armed());
        assert!(!gateway.account(record.id.unwrap()).unwrap().status);

        assert!(matches!(
            form.submit(&form.defaults(), &gateway),
            Err(AccountError::ReadOnly)
        ));
        assert!(matches!(
            form.toggle_permission(Role::Administrador, true, &mut accept),
            Err(AccountError::ReadOnly)
        ));
    }

    #[test]
    fn activation_needs_no_prompt() {
        let gateway = InMemoryGateway::new();
        let record = stored(&gateway, false);
        let mut form = AccountForm::edit(&record);
        assert!(!form.editable());
        assert_eq!(
            form.toggle_status(&gateway, &mut decline).unwrap(),
            StatusOutcome::Changed { active: true }
        );
        assert!(form.editable());
    }

    #[test]
    fn new_account_has_no_status_button() {
        let mut form = AccountForm::create();
        assert_eq!(form.status_label(), None);
        let gateway = InMemoryGateway::new();
        assert!(matches!(
            form.toggle_status(&gateway, &mut accept),
            Err(AccountError::NotSaved)
        ));
    }
}
