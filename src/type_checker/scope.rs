use std::collections::HashMap;

use crate::ast::types::ValueType;

/// Local variables of one code block. Names are stored lowercase.
#[derive(Debug, Clone)]
pub struct Environment {
    pub id: u32,
    pub parent: Option<usize>,
    pub variable_lookup: HashMap<String, ValueType>,
}

impl Environment {
    pub fn new(id: u32, parent: Option<usize>) -> Self {
        Environment {
            id,
            parent,
            variable_lookup: HashMap::new(),
        }
    }

    pub fn declare_variable(&mut self, name: &str, value_type: ValueType) {
        self.variable_lookup
            .insert(name.to_ascii_lowercase(), value_type);
    }

    pub fn get_variable(&self, name: &str) -> Option<&ValueType> {
        self.variable_lookup.get(&name.to_ascii_lowercase())
    }
}

/// Every scope created during one check, linked to its enclosing scope.
#[derive(Debug, Clone, Default)]
pub struct ScopeTree {
    environments: Vec<Environment>,
    environment_lookup: HashMap<u32, usize>,
}

impl ScopeTree {
    pub fn add_environment(&mut self, id: u32, parent: Option<usize>) -> usize {
        self.environments.push(Environment::new(id, parent));
        let index = self.environments.len() - 1;
        self.environment_lookup.insert(id, index);
        index
    }

    pub fn get(&self, index: usize) -> &Environment {
        &self.environments[index]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut Environment {
        &mut self.environments[index]
    }

    /// Scope of the code block with parser id `id`.
    pub fn get_by_id(&self, id: u32) -> Option<&Environment> {
        self.environment_lookup
            .get(&id)
            .map(|index| &self.environments[*index])
    }

    /// Finds `name` starting at scope `from` and walking outward. Returns
    /// the index of the declaring scope with the variable's type.
    pub fn resolve(&self, from: usize, name: &str) -> Option<(usize, &ValueType)> {
        let mut current = Some(from);

        while let Some(index) = current {
            let environment = &self.environments[index];
            if let Some(value_type) = environment.get_variable(name) {
                return Some((index, value_type));
            }
            current = environment.parent;
        }

        None
    }

    pub fn len(&self) -> usize {
        self.environments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }
}
