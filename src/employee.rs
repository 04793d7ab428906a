//! Employee records and personal details as they are held by the workspace store
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

/// Employees keyed by email. Insertion order is kept, it decides member order in a workflow.
pub type PolicyEmployeeList = IndexMap<Email, PolicyEmployee>;

pub type PersonalDetailsList = HashMap<Email, PersonalDetails>;

// Email is the natural key for every employee in a policy
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    #[n(0)]
    Add,
    #[n(1)]
    Update,
    #[n(2)]
    Delete,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingFields {
    #[n(0)]
    pub forwards_to: Option<PendingAction>,
    #[n(1)]
    pub submits_to: Option<PendingAction>,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyEmployee {
    #[n(0)]
    pub email: Email,
    #[n(1)]
    pub forwards_to: Option<Email>, // delegate receiving this employee's approvals
    #[n(2)]
    pub submits_to: Option<Email>, // manager this employee's reports route to
    #[n(3)]
    pub pending_action: Option<PendingAction>,
    #[n(4)]
    pub pending_fields: PendingFields,
    #[n(5)]
    pub errors: Vec<String>,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonalDetails {
    #[n(0)]
    pub display_name: Option<String>,
    #[n(1)]
    pub avatar: Option<String>,
}

impl Email {
    pub fn new(email: impl Into<String>) -> Self {
        Self(email.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PolicyEmployee {
    pub fn new(email: impl Into<Email>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }
    pub fn set_forwards_to(mut self, email: impl Into<Email>) -> Self {
        self.forwards_to = Some(email.into());
        self
    }
    pub fn set_submits_to(mut self, email: impl Into<Email>) -> Self {
        self.submits_to = Some(email.into());
        self
    }
    pub fn set_pending_action(mut self, action: PendingAction) -> Self {
        self.pending_action = Some(action);
        self
    }
    /// The delegate this employee forwards to. An empty email counts as no delegate.
    pub fn forwards_to(&self) -> Option<&Email> {
        self.forwards_to.as_ref().filter(|email| !email.is_empty())
    }
    /// The manager this employee submits to. An empty email counts as no manager.
    pub fn submits_to(&self) -> Option<&Email> {
        self.submits_to.as_ref().filter(|email| !email.is_empty())
    }
}

impl PersonalDetails {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: Some(display_name.into()),
            avatar: None,
        }
    }
    pub fn set_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }
}

/// Collect employees into an ordered list keyed by their email.
pub fn employee_list(employees: impl IntoIterator<Item = PolicyEmployee>) -> PolicyEmployeeList {
    employees
        .into_iter()
        .map(|employee| (employee.email.clone(), employee))
        .collect()
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
impl From<&str> for Email {
    fn from(value: &str) -> Self {
        Email(value.to_owned())
    }
}
impl From<String> for Email {
    fn from(value: String) -> Self {
        Email(value)
    }
}
impl From<&Email> for Email {
    fn from(value: &Email) -> Self {
        value.clone()
    }
}
impl Borrow<str> for Email {
    fn borrow(&self) -> &str {
        &self.0
    }
}
impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
impl<C> minicbor::Encode<C> for Email {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.str(&self.0)?.ok()
    }
}
impl<'b, C> minicbor::Decode<'b, C> for Email {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        Ok(Email(d.str()?.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employee_encoding() {
        let original = PolicyEmployee::new("1@example.com")
            .set_forwards_to("2@example.com")
            .set_submits_to("3@example.com")
            .set_pending_action(PendingAction::Add);

        let encoding = minicbor::to_vec(&original).unwrap();
        let decode: PolicyEmployee = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decode);
    }

    #[test]
    fn empty_edges_read_as_absent() {
        let employee = PolicyEmployee::new("1@example.com")
            .set_forwards_to("")
            .set_submits_to("");

        assert_eq!(employee.forwards_to(), None);
        assert_eq!(employee.submits_to(), None);
    }

    #[test]
    fn list_lookup_by_str() {
        let list = employee_list([
            PolicyEmployee::new("2@example.com"),
            PolicyEmployee::new("1@example.com"),
        ]);

        assert!(list.contains_key("1@example.com"));
        let order: Vec<&str> = list.keys().map(Email::as_str).collect();
        assert_eq!(order, ["2@example.com", "1@example.com"]);
    }
}
