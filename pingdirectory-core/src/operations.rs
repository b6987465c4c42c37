//! Operations - Translate a plan/state difference into PATCH operations
//!
//! The configuration API updates an object with a list of field-level
//! operations. Each helper here compares one planned value with the prior
//! state value and appends the operations needed to move the server from
//! one to the other. Unknown planned values never produce an operation.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::resource::Value;
use crate::schema::ResourceSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Add,
    Remove,
    Replace,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Add => write!(f, "add"),
            OperationKind::Remove => write!(f, "remove"),
            OperationKind::Replace => write!(f, "replace"),
        }
    }
}

/// A single field-level change sent to the update endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub op: OperationKind,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Vec<String>>,
}

impl Operation {
    pub fn new(op: OperationKind, path: impl Into<String>) -> Self {
        Self {
            op,
            path: path.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: Vec<String>) -> Self {
        self.value = Some(value);
        self
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(values) => write!(f, "{} {} [{}]", self.op, self.path, values.join(", ")),
            None => write!(f, "{} {}", self.op, self.path),
        }
    }
}

/// Append a `replace` or `remove` for a string attribute when plan and state differ
pub fn add_string_operation_if_necessary(
    ops: &mut Vec<Operation>,
    plan: &Value,
    state: &Value,
    path: &str,
) {
    if plan.is_unknown() || plan.equivalent(state) {
        return;
    }
    if plan.is_empty_string() {
        ops.push(Operation::new(OperationKind::Remove, path));
    } else if let Some(s) = plan.as_str() {
        ops.push(Operation::new(OperationKind::Replace, path).with_value(vec![s.to_string()]));
    }
}

/// Append a `replace` or `remove` for a boolean attribute when plan and state differ
pub fn add_bool_operation_if_necessary(
    ops: &mut Vec<Operation>,
    plan: &Value,
    state: &Value,
    path: &str,
) {
    if plan.is_unknown() || plan == state {
        return;
    }
    match plan {
        Value::Null => ops.push(Operation::new(OperationKind::Remove, path)),
        Value::Bool(b) => {
            ops.push(Operation::new(OperationKind::Replace, path).with_value(vec![b.to_string()]))
        }
        _ => {}
    }
}

/// Append a `replace` or `remove` for an integer attribute when plan and state differ
pub fn add_int_operation_if_necessary(
    ops: &mut Vec<Operation>,
    plan: &Value,
    state: &Value,
    path: &str,
) {
    if plan.is_unknown() || plan == state {
        return;
    }
    match plan {
        Value::Null => ops.push(Operation::new(OperationKind::Remove, path)),
        Value::Int(n) => {
            ops.push(Operation::new(OperationKind::Replace, path).with_value(vec![n.to_string()]))
        }
        _ => {}
    }
}

/// Append an `add` for new set members and a `remove` for dropped ones
pub fn add_string_set_operations_if_necessary(
    ops: &mut Vec<Operation>,
    plan: &Value,
    state: &Value,
    path: &str,
) {
    if plan.is_unknown() || plan.equivalent(state) {
        return;
    }
    let empty = Default::default();
    let planned = plan.as_set().unwrap_or(&empty);
    let current = state.as_set().unwrap_or(&empty);

    let added: Vec<String> = planned.difference(current).cloned().collect();
    if !added.is_empty() {
        ops.push(Operation::new(OperationKind::Add, path).with_value(added));
    }

    let removed: Vec<String> = current.difference(planned).cloned().collect();
    if !removed.is_empty() {
        ops.push(Operation::new(OperationKind::Remove, path).with_value(removed));
    }
}

/// Append the operations for one attribute, choosing the helper from the value's shape
pub fn add_operations_if_necessary(
    ops: &mut Vec<Operation>,
    plan: &Value,
    state: &Value,
    path: &str,
) {
    let shape = if plan.is_null() { state } else { plan };
    match shape {
        Value::Bool(_) => add_bool_operation_if_necessary(ops, plan, state, path),
        Value::Int(_) => add_int_operation_if_necessary(ops, plan, state, path),
        Value::Set(_) => add_string_set_operations_if_necessary(ops, plan, state, path),
        _ => add_string_operation_if_necessary(ops, plan, state, path),
    }
}

/// Build the full operation list for every attribute that maps to an API property
///
/// `applicable` decides which attributes take part (e.g. only those valid for
/// the object's variant). Operations follow the schema's attribute order.
pub fn create_operations(
    schema: &ResourceSchema,
    plan: &HashMap<String, Value>,
    state: &HashMap<String, Value>,
    applicable: impl Fn(&str) -> bool,
) -> Vec<Operation> {
    let mut ops = Vec::new();
    let null = Value::Null;

    for (name, attr) in &schema.attributes {
        let Some(path) = attr.provider_name.as_deref() else {
            continue;
        };
        if attr.requires_replace || attr.is_read_only() || !applicable(name) {
            continue;
        }
        let planned = plan.get(name).unwrap_or(&null);
        let current = state.get(name).unwrap_or(&null);
        add_operations_if_necessary(&mut ops, planned, current, path);
    }

    ops
}
