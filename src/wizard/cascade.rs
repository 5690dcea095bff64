//! Dependent field resets

use crate::state::FormValues;

/// Declares that changing `parent` invalidates `children`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDependency {
    pub parent: &'static str,
    pub children: &'static [&'static str],
}

/// Clear every field that depends on `changed`, transitively.
///
/// Returns the cleared fields in the order they were reset.
pub fn cascade_reset(
    values: &mut FormValues,
    dependencies: &[FieldDependency],
    changed: &str,
) -> Vec<&'static str> {
    let mut cleared: Vec<&'static str> = Vec::new();
    let mut queue: Vec<&str> = vec![changed];

    while let Some(parent) = queue.pop() {
        for dependency in dependencies.iter().filter(|d| d.parent == parent) {
            for &child in dependency.children {
                if cleared.contains(&child) || child == changed {
                    continue;
                }
                if let Some(current) = values.get(child) {
                    let empty = current.cleared();
                    values.replace(child, empty);
                }
                cleared.push(child);
                queue.push(child);
            }
        }
    }

    cleared
}
