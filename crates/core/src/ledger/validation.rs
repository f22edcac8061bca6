//! Input validation for ledger records.
//!
//! Turns untyped input (decoded request bodies) into validated `New*` records
//! or a per-field set of violations. A record is never partially built: any
//! violation rejects the whole input.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

use budgie_shared::types::{Amount, AmountError};

use super::types::{AccountRef, AccountType, NewAccount, NewEntry, NewUser};

/// Key used for errors that concern the input as a whole.
pub const SCHEMA_FIELD: &str = "_schema";

const MISSING: &str = "Missing data for required field.";
const NULL: &str = "Field may not be null.";
const NOT_STRING: &str = "Not a valid string.";
const EMPTY: &str = "May not be empty.";
const UNKNOWN: &str = "Unknown field.";

const ACCOUNT_FIELDS: &[&str] = &["id", "name", "type", "description"];
const ENTRY_FIELDS: &[&str] = &[
    "id",
    "when",
    "credit_account",
    "credit_account_type",
    "debit_account",
    "debit_account_type",
    "amount",
    "who",
    "description",
    "tags",
];
const USER_FIELDS: &[&str] = &["id", "name", "email", "password", "salt", "created"];

/// Per-field validation failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    /// Creates an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation for `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Returns true if no violation was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the messages recorded for `field`.
    #[must_use]
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Returns true if `field` has at least one violation.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Iterates over the fields with violations, in sorted order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validates an account: `name` and `type` required, `description` defaults to empty.
pub fn validate_account(input: &Value) -> Result<NewAccount, ValidationErrors> {
    let mut fields = Fields::open(input, ACCOUNT_FIELDS)?;

    let name = fields.required_name("name");
    let account_type = fields.required_account_type("type");
    let description = fields.optional_str("description");

    let errors = fields.into_errors();
    match (name, account_type) {
        (Some(name), Some(account_type)) if errors.is_empty() => Ok(NewAccount {
            name,
            account_type,
            description,
        }),
        _ => Err(errors),
    }
}

/// Validates an entry.
///
/// Requires `when` (ISO date), `credit_account`, `debit_account` and
/// `amount`; `who` and `description` default to empty, `tags` to none.
/// `credit_account_type` / `debit_account_type` optionally narrow the
/// account lookup when a name exists under several roles.
pub fn validate_entry(input: &Value) -> Result<NewEntry, ValidationErrors> {
    let mut fields = Fields::open(input, ENTRY_FIELDS)?;

    let when = fields.required_date("when");
    let credit_name = fields.required_name("credit_account");
    let credit_type = fields.optional_account_type("credit_account_type");
    let debit_name = fields.required_name("debit_account");
    let debit_type = fields.optional_account_type("debit_account_type");
    let amount = fields.required_amount("amount");
    let who = fields.optional_str("who");
    let description = fields.optional_str("description");
    let tags = fields.tags("tags");

    if let (Some(credit), Some(debit)) = (&credit_name, &debit_name)
        && credit == debit
        && credit_type == debit_type
    {
        fields.add("debit_account", "Must differ from credit_account.");
    }

    let errors = fields.into_errors();
    match (when, credit_name, debit_name, amount) {
        (Some(when), Some(credit), Some(debit), Some(amount)) if errors.is_empty() => {
            Ok(NewEntry {
                when,
                credit_account: AccountRef {
                    name: credit,
                    account_type: credit_type,
                },
                debit_account: AccountRef {
                    name: debit,
                    account_type: debit_type,
                },
                amount,
                who,
                description,
                tags,
            })
        }
        _ => Err(errors),
    }
}

/// Validates a user: `name`, `email`, pre-hashed `password`, `salt` and
/// `created` (ISO date) are all required.
pub fn validate_user(input: &Value) -> Result<NewUser, ValidationErrors> {
    let mut fields = Fields::open(input, USER_FIELDS)?;

    let name = fields.required_str("name");
    let email = fields.required_name("email");
    let password_hash = fields.required_str("password");
    let salt = fields.required_str("salt");
    let created = fields.required_date("created");

    if let Some(email) = &email
        && !email.contains('@')
    {
        fields.add("email", "Not a valid email address.");
    }

    let errors = fields.into_errors();
    match (name, email, password_hash, salt, created) {
        (Some(name), Some(email), Some(password_hash), Some(salt), Some(created))
            if errors.is_empty() =>
        {
            Ok(NewUser {
                name,
                email,
                password_hash,
                salt,
                created,
            })
        }
        _ => Err(errors),
    }
}

/// Parses an ISO `YYYY-MM-DD` date.
pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Message listing the accepted account roles.
pub(crate) fn account_type_message() -> String {
    let names: Vec<&str> = AccountType::ALL.iter().map(AccountType::as_str).collect();
    format!("Must be one of: {}.", names.join(", "))
}

/// Field reader that accumulates violations instead of stopping at the first.
struct Fields<'a> {
    object: &'a Map<String, Value>,
    errors: ValidationErrors,
}

impl<'a> Fields<'a> {
    fn open(input: &'a Value, known: &[&str]) -> Result<Self, ValidationErrors> {
        let Some(object) = input.as_object() else {
            let mut errors = ValidationErrors::new();
            errors.add(SCHEMA_FIELD, "Invalid input type.");
            return Err(errors);
        };

        let mut errors = ValidationErrors::new();
        for key in object.keys() {
            if !known.contains(&key.as_str()) {
                errors.add(key.clone(), UNKNOWN);
            }
        }

        Ok(Self { object, errors })
    }

    fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    fn into_errors(self) -> ValidationErrors {
        self.errors
    }

    /// Looks up a present, non-null value; records missing/null violations.
    fn required(&mut self, key: &str) -> Option<&'a Value> {
        match self.object.get(key) {
            None => {
                self.add(key, MISSING);
                None
            }
            Some(Value::Null) => {
                self.add(key, NULL);
                None
            }
            Some(value) => Some(value),
        }
    }

    /// Looks up an optional value; `null` is still a violation.
    fn optional(&mut self, key: &str) -> Option<&'a Value> {
        match self.object.get(key) {
            Some(Value::Null) => {
                self.add(key, NULL);
                None
            }
            other => other,
        }
    }

    fn string(&mut self, key: &str, value: &Value) -> Option<String> {
        if let Value::String(s) = value {
            Some(s.clone())
        } else {
            self.add(key, NOT_STRING);
            None
        }
    }

    fn required_str(&mut self, key: &str) -> Option<String> {
        let value = self.required(key)?;
        self.string(key, value)
    }

    /// A required string that must not be blank.
    fn required_name(&mut self, key: &str) -> Option<String> {
        let value = self.required_str(key)?;
        if value.trim().is_empty() {
            self.add(key, EMPTY);
            return None;
        }
        Some(value)
    }

    fn optional_str(&mut self, key: &str) -> String {
        self.optional(key)
            .and_then(|value| self.string(key, value))
            .unwrap_or_default()
    }

    fn required_date(&mut self, key: &str) -> Option<NaiveDate> {
        let raw = self.required_str(key)?;
        let date = parse_date(&raw);
        if date.is_none() {
            self.add(key, "Not a valid date.");
        }
        date
    }

    fn account_type(&mut self, key: &str, value: &Value) -> Option<AccountType> {
        let raw = self.string(key, value)?;
        let kind = raw.parse().ok();
        if kind.is_none() {
            self.add(key, account_type_message());
        }
        kind
    }

    fn required_account_type(&mut self, key: &str) -> Option<AccountType> {
        let value = self.required(key)?;
        self.account_type(key, value)
    }

    fn optional_account_type(&mut self, key: &str) -> Option<AccountType> {
        let value = self.optional(key)?;
        self.account_type(key, value)
    }

    fn required_amount(&mut self, key: &str) -> Option<Amount> {
        let raw = match self.required(key)? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => {
                self.add(key, "Not a valid number.");
                return None;
            }
        };

        match raw.parse::<Amount>() {
            Ok(amount) => Some(amount),
            Err(AmountError::Invalid(_)) => {
                self.add(key, "Not a valid number.");
                None
            }
            Err(AmountError::TooPrecise(_)) => {
                self.add(key, "Must have at most 2 decimal places.");
                None
            }
            Err(AmountError::OutOfRange(_)) => {
                self.add(key, "Amount is out of range.");
                None
            }
        }
    }

    fn tags(&mut self, key: &str) -> Vec<String> {
        let Some(value) = self.optional(key) else {
            return Vec::new();
        };
        let Value::Array(items) = value else {
            self.add(key, "Not a valid list.");
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut labels = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let item_key = format!("{key}[{index}]");
            match item {
                Value::String(label) if label.trim().is_empty() => self.add(&item_key, EMPTY),
                Value::String(label) => {
                    if seen.insert(label.as_str()) {
                        labels.push(label.clone());
                    }
                }
                _ => self.add(&item_key, NOT_STRING),
            }
        }
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use serde_json::json;

    // ========================================================================
    // Accounts
    // ========================================================================

    #[test]
    fn test_account_valid() {
        let account = validate_account(&json!({
            "name": "groceries",
            "type": "expense",
            "description": "food and household"
        }))
        .unwrap();

        assert_eq!(account.name, "groceries");
        assert_eq!(account.account_type, AccountType::Expense);
        assert_eq!(account.description, "food and household");
    }

    #[test]
    fn test_account_description_defaults_to_empty() {
        let account = validate_account(&json!({"name": "cash", "type": "asset"})).unwrap();
        assert_eq!(account.description, "");
    }

    #[test]
    fn test_account_id_is_ignored() {
        let account =
            validate_account(&json!({"id": "whatever", "name": "cash", "type": "asset"}))
                .unwrap();
        assert_eq!(account.name, "cash");
    }

    #[test]
    fn test_account_reports_every_violation() {
        let errors = validate_account(&json!({"type": "revenue", "color": "red"})).unwrap_err();

        assert_eq!(errors.field("name").unwrap(), [MISSING]);
        assert_eq!(
            errors.field("type").unwrap(),
            ["Must be one of: expense, income, equity, asset, liability."]
        );
        assert_eq!(errors.field("color").unwrap(), [UNKNOWN]);
    }

    #[rstest]
    #[case(json!({"name": null, "type": "asset"}), "name", NULL)]
    #[case(json!({"name": 5, "type": "asset"}), "name", NOT_STRING)]
    #[case(json!({"name": "  ", "type": "asset"}), "name", EMPTY)]
    #[case(json!({"name": "cash", "type": "asset", "description": 3}), "description", NOT_STRING)]
    #[case(json!({"name": "cash", "type": "asset", "description": null}), "description", NULL)]
    fn test_account_field_errors(
        #[case] input: Value,
        #[case] field: &str,
        #[case] message: &str,
    ) {
        let errors = validate_account(&input).unwrap_err();
        assert_eq!(errors.field(field).unwrap(), [message]);
    }

    #[test]
    fn test_non_object_rejected() {
        let errors = validate_account(&json!(["cash", "asset"])).unwrap_err();
        assert!(errors.has(SCHEMA_FIELD));
    }

    // ========================================================================
    // Entries
    // ========================================================================

    fn entry_input() -> Value {
        json!({
            "when": "2024-02-15",
            "credit_account": "bank",
            "debit_account": "groceries",
            "amount": "42.10",
            "who": "Corner Shop",
            "description": "weekly shop",
            "tags": ["food", "weekly"]
        })
    }

    #[test]
    fn test_entry_valid() {
        let entry = validate_entry(&entry_input()).unwrap();

        assert_eq!(entry.when, NaiveDate::from_ymd_opt(2024, 2, 15).unwrap());
        assert_eq!(entry.credit_account, AccountRef::named("bank"));
        assert_eq!(entry.debit_account, AccountRef::named("groceries"));
        assert_eq!(entry.amount.as_decimal(), dec!(42.10));
        assert_eq!(entry.who, "Corner Shop");
        assert_eq!(entry.tags, ["food", "weekly"]);
    }

    #[test]
    fn test_entry_defaults() {
        let entry = validate_entry(&json!({
            "when": "2024-01-01",
            "credit_account": "income",
            "debit_account": "bank",
            "amount": 100
        }))
        .unwrap();

        assert_eq!(entry.who, "");
        assert_eq!(entry.description, "");
        assert!(entry.tags.is_empty());
        assert_eq!(entry.amount.to_string(), "100.00");
    }

    #[test]
    fn test_entry_numeric_amount() {
        let mut input = entry_input();
        input["amount"] = json!(12.5);
        assert_eq!(validate_entry(&input).unwrap().amount.to_string(), "12.50");
    }

    #[rstest]
    #[case(json!("12.345"), "Must have at most 2 decimal places.")]
    #[case(json!(0.125), "Must have at most 2 decimal places.")]
    #[case(json!("twelve"), "Not a valid number.")]
    #[case(json!(true), "Not a valid number.")]
    #[case(json!(["1"]), "Not a valid number.")]
    fn test_entry_amount_errors(#[case] amount: Value, #[case] message: &str) {
        let mut input = entry_input();
        input["amount"] = amount;
        let errors = validate_entry(&input).unwrap_err();
        assert_eq!(errors.field("amount").unwrap(), [message]);
    }

    #[rstest]
    #[case("2024-13-01")]
    #[case("15/02/2024")]
    #[case("2024-02-30")]
    #[case("")]
    fn test_entry_bad_date(#[case] when: &str) {
        let mut input = entry_input();
        input["when"] = json!(when);
        let errors = validate_entry(&input).unwrap_err();
        assert_eq!(errors.field("when").unwrap(), ["Not a valid date."]);
    }

    #[test]
    fn test_entry_missing_required_fields() {
        let errors = validate_entry(&json!({})).unwrap_err();
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, ["amount", "credit_account", "debit_account", "when"]);
    }

    #[test]
    fn test_entry_same_account_rejected() {
        let mut input = entry_input();
        input["debit_account"] = json!("bank");
        let errors = validate_entry(&input).unwrap_err();
        assert!(errors.has("debit_account"));
    }

    #[test]
    fn test_entry_same_name_different_types_allowed() {
        let mut input = entry_input();
        input["debit_account"] = json!("bank");
        input["credit_account_type"] = json!("liability");
        input["debit_account_type"] = json!("asset");

        let entry = validate_entry(&input).unwrap();
        assert_eq!(
            entry.credit_account,
            AccountRef::typed("bank", AccountType::Liability)
        );
        assert_eq!(entry.debit_account, AccountRef::typed("bank", AccountType::Asset));
    }

    #[test]
    fn test_entry_tags_deduplicated_in_order() {
        let mut input = entry_input();
        input["tags"] = json!(["food", "weekly", "food"]);
        assert_eq!(validate_entry(&input).unwrap().tags, ["food", "weekly"]);
    }

    #[test]
    fn test_entry_tag_errors() {
        let mut input = entry_input();
        input["tags"] = json!(["food", "", 7]);
        let errors = validate_entry(&input).unwrap_err();
        assert_eq!(errors.field("tags[1]").unwrap(), [EMPTY]);
        assert_eq!(errors.field("tags[2]").unwrap(), [NOT_STRING]);

        input["tags"] = json!("food");
        let errors = validate_entry(&input).unwrap_err();
        assert_eq!(errors.field("tags").unwrap(), ["Not a valid list."]);
    }

    // ========================================================================
    // Users
    // ========================================================================

    fn user_input() -> Value {
        json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "$2b$12$hash",
            "salt": "$2b$12$salt",
            "created": "2024-01-01"
        })
    }

    #[test]
    fn test_user_valid() {
        let user = validate_user(&user_input()).unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.password_hash, "$2b$12$hash");
        assert_eq!(user.created, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[rstest]
    #[case("name")]
    #[case("email")]
    #[case("password")]
    #[case("salt")]
    #[case("created")]
    fn test_user_required_fields(#[case] field: &str) {
        let mut input = user_input();
        input.as_object_mut().unwrap().remove(field);
        let errors = validate_user(&input).unwrap_err();
        assert_eq!(errors.field(field).unwrap(), [MISSING]);
    }

    #[test]
    fn test_user_bad_email() {
        let mut input = user_input();
        input["email"] = json!("not-an-email");
        assert!(validate_user(&input).unwrap_err().has("email"));
    }

    #[test]
    fn test_errors_display() {
        let errors = validate_account(&json!({})).unwrap_err();
        assert_eq!(
            errors.to_string(),
            format!("name: {MISSING}; type: {MISSING}")
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Any amount with at most two decimals validates to exactly that value.
        #[test]
        fn prop_entry_amount_exact(cents in -10_000_000i64..10_000_000) {
            let amount = Amount::from_minor_units(cents);
            let mut input = entry_input();
            input["amount"] = json!(amount.to_string());
            let entry = validate_entry(&input).unwrap();
            prop_assert_eq!(entry.amount, amount);
        }

        /// Unknown account roles never validate.
        #[test]
        fn prop_unknown_type_rejected(kind in "[a-z]{1,12}") {
            prop_assume!(kind.parse::<AccountType>().is_err());
            let result = validate_account(&json!({"name": "x", "type": kind}));
            prop_assert!(result.is_err());
        }
    }
}
