use std::collections::BTreeMap;

use crate::expr::Constant;

/// Supplies constants for a variable when nothing in the known facts binds it.
///
/// The resolver only asks when a variable of `action` has no candidate at all; whatever is
/// returned is then treated exactly like an observed constant.
pub trait BindingProvider {
    fn candidates(&self, action: &str, variable: &str) -> Vec<Constant>;
}

/// Supplies nothing. Variables without observed candidates stay unresolved.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBindings;

impl BindingProvider for NoBindings {
    fn candidates(&self, _action: &str, _variable: &str) -> Vec<Constant> {
        Vec::new()
    }
}

/// Fixed constants per variable name, shared by every action.
#[derive(Debug, Default, Clone)]
pub struct StaticBindings {
    by_variable: BTreeMap<String, Vec<Constant>>,
}

impl StaticBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, variable: impl Into<String>, value: impl Into<Constant>) -> Self {
        let values = self.by_variable.entry(variable.into()).or_default();
        let value = value.into();
        if !values.contains(&value) {
            values.push(value);
        }
        self
    }
}

impl BindingProvider for StaticBindings {
    fn candidates(&self, _action: &str, variable: &str) -> Vec<Constant> {
        self.by_variable.get(variable).cloned().unwrap_or_default()
    }
}
