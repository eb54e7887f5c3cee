//! Master/slave enablement
//!
//! A slave control is enabled exactly when its master check box is
//! selected. Edges are applied after every master edit and once when the
//! block is initialized.

use super::controls::Form;
use log::debug;

/// Directed master → slave edges between controls of one form
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// (master, slave) pairs in registration order
    edges: Vec<(String, String)>,
}

impl DependencyGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `slave` follow the selection of `master`
    pub fn add(&mut self, slave: impl Into<String>, master: impl Into<String>) {
        self.edges.push((master.into(), slave.into()));
    }

    pub fn slaves_of<'a>(&'a self, master: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.edges
            .iter()
            .filter(move |(m, _)| m == master)
            .map(|(_, slave)| slave.as_str())
    }

    pub fn is_master(&self, name: &str) -> bool {
        self.edges.iter().any(|(m, _)| m == name)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Set every slave of `master` to the master's selection
    pub fn apply(&self, form: &mut Form, master: &str) {
        let Ok(selected) = form.checkbox(master).map(|c| c.is_selected()) else {
            return;
        };
        for slave in self.slaves_of(master) {
            if let Some(control) = form.get_mut(slave) {
                control.set_enabled(selected);
                debug!("{slave} {}", if selected { "enabled" } else { "disabled" });
            }
        }
    }

    /// Apply every edge, in registration order
    pub fn apply_all(&self, form: &mut Form) {
        for (master, slave) in &self.edges {
            let Ok(selected) = form.checkbox(master).map(|c| c.is_selected()) else {
                continue;
            };
            if let Some(control) = form.get_mut(slave) {
                control.set_enabled(selected);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::controls::{CheckBox, Control, TextField};
    use crate::value::PreferenceKey;

    fn form() -> Form {
        let mut form = Form::new();
        form.add(Control::CheckBox(
            CheckBox::new("Mark occurrences", PreferenceKey::boolean("mark")).unwrap(),
        ))
        .unwrap();
        form.add(Control::CheckBox(
            CheckBox::new("Sticky", PreferenceKey::boolean("sticky")).unwrap(),
        ))
        .unwrap();
        form.add(Control::TextField(
            TextField::new("Delay", PreferenceKey::int("delay"), None).unwrap(),
        ))
        .unwrap();
        form
    }

    #[test]
    fn test_slaves_follow_master() {
        let mut form = form();
        let mut graph = DependencyGraph::new();
        graph.add("sticky", "mark");
        graph.add("delay", "mark");

        graph.apply_all(&mut form);
        assert!(!form.get("sticky").unwrap().is_enabled());
        assert!(!form.get("delay").unwrap().is_enabled());

        form.checkbox_mut("mark").unwrap().set_selected(true);
        graph.apply(&mut form, "mark");
        assert!(form.get("sticky").unwrap().is_enabled());
        assert!(form.get("delay").unwrap().is_enabled());
        assert!(form.get("mark").unwrap().is_enabled());
    }

    #[test]
    fn test_slave_state_never_feeds_back() {
        let mut form = form();
        let mut graph = DependencyGraph::new();
        graph.add("sticky", "mark");

        form.checkbox_mut("sticky").unwrap().set_selected(true);
        graph.apply_all(&mut form);
        assert!(!form.get("sticky").unwrap().is_enabled());
        assert!(graph.is_master("mark"));
        assert!(!graph.is_master("sticky"));
    }
}
