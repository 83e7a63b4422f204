//! The variable table: an ordered, deduplicated map from variable name to a
//! stable zero-based [`VarId`], established once from the whole program.

use std::collections::HashMap;

use crate::ast::Stmt;
use crate::id::VarId;

#[derive(Debug, Clone)]
pub struct VarTable {
    names: Vec<String>,
    index: HashMap<String, u32>,
}

impl VarTable {
    /// Collects every variable mentioned anywhere in `program`, in order of
    /// first occurrence, and assigns each a stable index.
    pub fn from_program(program: &Stmt) -> Self {
        let mut order = Vec::new();
        program.variables(&mut order);

        let mut names = Vec::new();
        let mut index = HashMap::new();
        for name in order {
            if !index.contains_key(&name) {
                index.insert(name.clone(), names.len() as u32);
                names.push(name);
            }
        }
        VarTable { names, index }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Panics if `name` was never declared -- the variable table is built
    /// from the whole program before any transfer function runs, so every
    /// name an expression can mention is already present (§4.2).
    pub fn id_of(&self, name: &str) -> VarId {
        VarId(
            *self
                .index
                .get(name)
                .unwrap_or_else(|| panic!("undeclared variable '{name}'")),
        )
    }

    pub fn name_of(&self, id: VarId) -> &str {
        &self.names[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (VarId(i as u32), name.as_str()))
    }
}
