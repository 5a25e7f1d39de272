//! The four defect rules (spec §4.4), applied to one merged class record at
//! a time.

use std::collections::HashSet;

use indexmap::IndexMap;
use leakcheck_par::{Allocation, Class, Deallocation, Function, Member};
use leakcheck_util::Severity;

use crate::leak::Leak;

/// Runs all four rules over every merged class, in registry iteration order.
pub fn analyze(classes: &[Class]) -> Vec<Leak> {
    let mut leaks = Vec::new();
    for class in classes {
        analyze_class(class, &mut leaks);
    }
    leaks
}

fn analyze_class(class: &Class, leaks: &mut Vec<Leak>) {
    let pointer_members: Vec<&Member> = class.members.iter().filter(|m| m.is_pointer).collect();
    if pointer_members.is_empty() {
        return;
    }

    let mut allocated_vars: IndexMap<String, Allocation> = IndexMap::new();
    if let Some(ctor) = &class.constructor {
        for alloc in &ctor.allocations {
            allocated_vars.insert(alloc.variable.clone(), alloc.clone());
        }
    }

    let mut alias_map: IndexMap<String, Vec<String>> = IndexMap::new();
    for function in all_functions(class) {
        for alias in &function.aliases {
            add_alias_edge(&mut alias_map, &alias.target, &alias.source);
            add_alias_edge(&mut alias_map, &alias.source, &alias.target);
        }
    }

    let mut deallocated_vars: IndexMap<String, Deallocation> = IndexMap::new();
    let mut visited = HashSet::new();
    collect_deallocations(
        class.destructor.as_ref(),
        5,
        &mut visited,
        &class.methods,
        &mut deallocated_vars,
    );

    rule_missing_or_mismatched(class, &allocated_vars, &deallocated_vars, &alias_map, leaks);
    rule_reassignment(class, &allocated_vars, leaks);
    rule_double_free_via_alias(class, leaks);
    rule_no_destructor(class, &allocated_vars, &pointer_members, leaks);
}

fn all_functions(class: &Class) -> impl Iterator<Item = &Function> {
    class
        .constructor
        .iter()
        .chain(class.destructor.iter())
        .chain(class.methods.values())
}

fn add_alias_edge(map: &mut IndexMap<String, Vec<String>>, from: &str, to: &str) {
    let entry = map.entry(from.to_string()).or_default();
    if !entry.iter().any(|existing| existing == to) {
        entry.push(to.to_string());
    }
}

/// Starting at the destructor with a depth budget of 5 and a visited-name
/// set shared across the whole traversal, collects every reachable direct
/// deallocation (later ones shadow earlier ones for the same variable).
fn collect_deallocations(
    function: Option<&Function>,
    depth: i32,
    visited: &mut HashSet<String>,
    method_index: &IndexMap<String, Function>,
    out: &mut IndexMap<String, Deallocation>,
) {
    let Some(function) = function else {
        return;
    };
    if depth <= 0 || visited.contains(&function.name) {
        return;
    }
    visited.insert(function.name.clone());

    for dealloc in &function.deallocations {
        out.insert(dealloc.variable.clone(), dealloc.clone());
    }

    for invoked in &function.invocations {
        if let Some(callee) = method_index.get(invoked) {
            collect_deallocations(Some(callee), depth - 1, visited, method_index, out);
        }
    }
}

fn is_released(
    variable: &str,
    deallocated: &IndexMap<String, Deallocation>,
    alias_map: &IndexMap<String, Vec<String>>,
) -> bool {
    if deallocated.contains_key(variable) {
        return true;
    }
    alias_map
        .get(variable)
        .map(|aliases| aliases.iter().any(|a| deallocated.contains_key(a)))
        .unwrap_or(false)
}

fn find_dealloc<'a>(
    variable: &str,
    deallocated: &'a IndexMap<String, Deallocation>,
    alias_map: &IndexMap<String, Vec<String>>,
) -> Option<&'a Deallocation> {
    if let Some(d) = deallocated.get(variable) {
        return Some(d);
    }
    let aliases = alias_map.get(variable)?;
    aliases.iter().find_map(|a| deallocated.get(a))
}

/// Rule 1 — missing deallocation / array mismatch.
fn rule_missing_or_mismatched(
    class: &Class,
    allocated: &IndexMap<String, Allocation>,
    deallocated: &IndexMap<String, Deallocation>,
    alias_map: &IndexMap<String, Vec<String>>,
    leaks: &mut Vec<Leak>,
) {
    for (variable, alloc) in allocated {
        if !is_released(variable, deallocated, alias_map) {
            leaks.push(Leak {
                file: class.file.clone(),
                line: alloc.line.line,
                class: class.name.clone(),
                variable: variable.clone(),
                reason: "allocated with 'new' but not deleted in destructor".to_string(),
                severity: Severity::Error,
            });
            continue;
        }

        let Some(dealloc) = find_dealloc(variable, deallocated, alias_map) else {
            continue;
        };
        if alloc.is_array && !dealloc.is_array {
            leaks.push(Leak {
                file: class.file.clone(),
                line: dealloc.line.line,
                class: class.name.clone(),
                variable: variable.clone(),
                reason: "allocated with 'new[]' but deleted with 'delete' instead of 'delete[]'"
                    .to_string(),
                severity: Severity::Error,
            });
        } else if !alloc.is_array && dealloc.is_array {
            leaks.push(Leak {
                file: class.file.clone(),
                line: dealloc.line.line,
                class: class.name.clone(),
                variable: variable.clone(),
                reason: "allocated with 'new' but deleted with 'delete[]' instead of 'delete'"
                    .to_string(),
                severity: Severity::Warning,
            });
        }
    }
}

/// Rule 2 — re-assignment without prior release.
fn rule_reassignment(class: &Class, allocated: &IndexMap<String, Allocation>, leaks: &mut Vec<Leak>) {
    for (method_name, method) in &class.methods {
        for alloc in &method.allocations {
            let is_pointer_member = class
                .members
                .iter()
                .any(|m| m.is_pointer && m.name == alloc.variable);
            if !is_pointer_member || !allocated.contains_key(&alloc.variable) {
                continue;
            }
            let has_prior_release = method
                .deallocations
                .iter()
                .any(|d| d.variable == alloc.variable && d.line.line < alloc.line.line);
            if !has_prior_release {
                leaks.push(Leak {
                    file: class.file.clone(),
                    line: alloc.line.line,
                    class: class.name.clone(),
                    variable: alloc.variable.clone(),
                    reason: format!(
                        "pointer reassigned with 'new' without deleting previous allocation (in {})",
                        method_name
                    ),
                    severity: Severity::Warning,
                });
            }
        }
    }
}

/// Rule 3 — double free via a local alias.
fn rule_double_free_via_alias(class: &Class, leaks: &mut Vec<Leak>) {
    for function in all_functions(class) {
        for alias in &function.aliases {
            let source_is_pointer_member = class
                .members
                .iter()
                .any(|m| m.is_pointer && m.name == alias.source);
            if !source_is_pointer_member {
                continue;
            }
            let source_deleted = function
                .deallocations
                .iter()
                .any(|d| d.variable == alias.source);
            let target_deleted = function
                .deallocations
                .iter()
                .any(|d| d.variable == alias.target);
            if source_deleted && target_deleted {
                leaks.push(Leak {
                    file: class.file.clone(),
                    line: alias.line.line,
                    class: class.name.clone(),
                    variable: alias.source.clone(),
                    reason: format!(
                        "pointer aliased to '{}' and both are deleted (potential double-free)",
                        alias.target
                    ),
                    severity: Severity::Error,
                });
            }
        }
    }
}

/// Rule 4 — allocating pointer member with no destructor at all.
fn rule_no_destructor(
    class: &Class,
    allocated: &IndexMap<String, Allocation>,
    pointer_members: &[&Member],
    leaks: &mut Vec<Leak>,
) {
    if class.destructor.is_some() {
        return;
    }
    for member in pointer_members {
        if allocated.contains_key(&member.name) {
            leaks.push(Leak {
                file: class.file.clone(),
                line: member.line.line,
                class: class.name.clone(),
                variable: member.name.clone(),
                reason: "pointer member allocated but class has no destructor".to_string(),
                severity: Severity::Error,
            });
        }
    }
}
