//! Accumulates per-file class records and reconciles header/implementation
//! duality into one canonical record per class name (spec §4.3).

use indexmap::IndexMap;
use leakcheck_par::Class;

const HEADER_EXTENSIONS: &[&str] = &[".h", ".hpp", ".hxx"];

fn is_header(file: &str) -> bool {
    let lower = file.to_lowercase();
    HEADER_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Groups class records by name, merging same-named records from multiple
/// files into one as they arrive.
#[derive(Default)]
pub struct ClassRegistry {
    classes: IndexMap<String, Class>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_all(&mut self, classes: Vec<Class>) {
        for class in classes {
            self.add(class);
        }
    }

    pub fn add(&mut self, incoming: Class) {
        match self.classes.get_mut(&incoming.name) {
            None => {
                self.classes.insert(incoming.name.clone(), incoming);
            }
            Some(target) => merge_into(target, incoming),
        }
    }

    /// Consumes the registry, returning merged class records in the order
    /// their names were first seen.
    pub fn into_classes(self) -> Vec<Class> {
        self.classes.into_values().collect()
    }
}

fn merge_into(target: &mut Class, source: Class) {
    let Class {
        name: _,
        file: source_file,
        start_line: _,
        end_line: _,
        members: source_members,
        constructor: source_constructor,
        destructor: source_destructor,
        methods: source_methods,
    } = source;

    let target_is_header = is_header(&target.file);
    let source_is_header = is_header(&source_file);

    if source_is_header && !target_is_header {
        target.members = source_members;
    } else if target_is_header && !source_is_header {
        // keep target.members as-is
    } else if target.members.is_empty() {
        target.members = source_members;
    }

    target.constructor = match (target.constructor.take(), source_constructor) {
        (None, s) => s,
        (Some(t), None) => Some(t),
        (Some(t), Some(s)) => {
            if !s.allocations.is_empty() && t.allocations.is_empty() {
                Some(s)
            } else {
                Some(t)
            }
        }
    };

    target.destructor = match (target.destructor.take(), source_destructor) {
        (None, s) => s,
        (Some(t), None) => Some(t),
        (Some(t), Some(s)) => {
            if !s.deallocations.is_empty() && t.deallocations.is_empty() {
                Some(s)
            } else {
                Some(t)
            }
        }
    };

    for (name, method) in source_methods {
        match target.methods.get(&name) {
            None => {
                target.methods.insert(name, method);
            }
            Some(_) => {
                if !method.allocations.is_empty() || !method.deallocations.is_empty() {
                    target.methods.insert(name, method);
                }
            }
        }
    }

    if source_file != target.file && !target.file.contains(&source_file) {
        target.file.push_str(", ");
        target.file.push_str(basename(&source_file));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leakcheck_par::parse_source;

    #[test]
    fn header_declaration_merges_with_cpp_definitions() {
        let header = parse_source(
            "class DataManager { public: DataManager(); ~DataManager(); private: int* buffer; char* name; };",
            "data_manager.h",
        );
        let impl_file = parse_source(
            "DataManager::DataManager() { buffer = new int(1); name = new char(2); } \
             DataManager::~DataManager() { delete buffer; }",
            "data_manager.cpp",
        );

        let mut registry = ClassRegistry::new();
        registry.add_all(header);
        registry.add_all(impl_file);
        let classes = registry.into_classes();

        assert_eq!(classes.len(), 1);
        let merged = &classes[0];
        assert_eq!(merged.members.len(), 2);
        assert_eq!(merged.constructor.as_ref().unwrap().allocations.len(), 2);
        assert_eq!(merged.destructor.as_ref().unwrap().deallocations.len(), 1);
        assert!(merged.file.contains("data_manager.h"));
        assert!(merged.file.contains("data_manager.cpp"));
    }

    #[test]
    fn out_of_class_method_overwrites_declaration_placeholder() {
        let header = parse_source("class Widget { public: void reset(); };", "widget.h");
        let impl_file = parse_source(
            "void Widget::reset() { delete ptr; }",
            "widget.cpp",
        );

        let mut registry = ClassRegistry::new();
        registry.add_all(header);
        registry.add_all(impl_file);
        let classes = registry.into_classes();

        assert_eq!(classes.len(), 1);
        let reset = &classes[0].methods["reset"];
        assert_eq!(reset.deallocations.len(), 1);
    }
}
