use std::{collections::HashMap, fmt::Display};

use lazy_static::lazy_static;
use log::debug;
use serde::Serialize;

use crate::{
    ast::types::{ExpandedValueType, ValueType},
    errors::errors::CommandTableError,
};

use super::descriptors::CommandDescriptor;

lazy_static! {
    static ref GLOBAL_TABLE: CommandTable = CommandTable::from_json(include_str!("commands.json"))
        .expect("bundled command descriptors are valid");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Arity {
    Nular,
    Unary,
    Binary,
}

impl Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arity::Nular => write!(f, "nular"),
            Arity::Unary => write!(f, "unary"),
            Arity::Binary => write!(f, "binary"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub value_type: ValueType,
    pub description: String,
    /// The parameter may also be given as an array of any number of values
    /// of `value_type`.
    pub unbounded: bool,
}

impl Parameter {
    pub fn new(value_type: ValueType) -> Self {
        Parameter {
            value_type,
            description: String::new(),
            unbounded: false,
        }
    }

    pub fn accepts(&self, supplied: &ValueType) -> bool {
        if self.value_type.accepts(supplied) {
            return true;
        }

        self.unbounded
            && ValueType::Expanded(ExpandedValueType::new(true, vec![self.value_type.clone()]))
                .accepts(supplied)
    }
}

/// One syntax of a command. Unary commands only have `right`.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSignature {
    pub name: String,
    pub arity: Arity,
    pub left: Option<Parameter>,
    pub right: Option<Parameter>,
    pub return_type: ValueType,
}

impl CommandSignature {
    pub fn nular(name: &str, return_type: ValueType) -> Self {
        CommandSignature {
            name: name.to_string(),
            arity: Arity::Nular,
            left: None,
            right: None,
            return_type,
        }
    }

    pub fn unary(name: &str, right: ValueType, return_type: ValueType) -> Self {
        CommandSignature {
            name: name.to_string(),
            arity: Arity::Unary,
            left: None,
            right: Some(Parameter::new(right)),
            return_type,
        }
    }

    pub fn binary(name: &str, left: ValueType, right: ValueType, return_type: ValueType) -> Self {
        CommandSignature {
            name: name.to_string(),
            arity: Arity::Binary,
            left: Some(Parameter::new(left)),
            right: Some(Parameter::new(right)),
            return_type,
        }
    }

    /// Parameters in operand order: left, then right.
    pub fn parameters(&self) -> Vec<&Parameter> {
        self.left.iter().chain(self.right.iter()).collect()
    }

    pub fn matches(&self, supplied: &[ValueType]) -> bool {
        self.mismatch_index(supplied).is_none()
    }

    /// Index of the first argument this signature rejects: 0 is the left (or
    /// only) operand, 1 the right operand.
    pub fn mismatch_index(&self, supplied: &[ValueType]) -> Option<usize> {
        let parameters = self.parameters();
        if parameters.len() != supplied.len() {
            return Some(parameters.len().min(supplied.len()));
        }

        parameters
            .iter()
            .zip(supplied)
            .position(|(parameter, argument)| !parameter.accepts(argument))
    }
}

/// Outcome of resolving a command invocation against the table.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    /// No command of that name exists in any arity.
    Unknown,
    /// The command exists, but not with the requested arity.
    UnsupportedArity,
    /// The first signature in declaration order accepting the arguments.
    Match(&'a CommandSignature),
    /// Every signature rejected the arguments. Carries the signature that got
    /// furthest and the index it failed at.
    NoMatch {
        closest: &'a CommandSignature,
        argument: usize,
    },
}

/// Command signatures keyed by lowercase name and arity.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    signatures: HashMap<(String, Arity), Vec<CommandSignature>>,
}

impl CommandTable {
    pub fn new() -> Self {
        CommandTable::default()
    }

    /// The bundled table, loaded on first use.
    pub fn global() -> &'static CommandTable {
        &GLOBAL_TABLE
    }

    pub fn from_signatures<I: IntoIterator<Item = CommandSignature>>(signatures: I) -> Self {
        let mut table = CommandTable::new();
        for signature in signatures {
            table.insert(signature);
        }
        table
    }

    pub fn from_descriptors(descriptors: &[CommandDescriptor]) -> Result<Self, CommandTableError> {
        let mut table = CommandTable::new();
        for descriptor in descriptors {
            for signature in descriptor.to_signatures()? {
                table.insert(signature);
            }
        }

        debug!(
            "loaded {} signatures for {} commands",
            table.len(),
            descriptors.len()
        );
        Ok(table)
    }

    pub fn from_json(json: &str) -> Result<Self, CommandTableError> {
        let descriptors: Vec<CommandDescriptor> = serde_json::from_str(json)?;
        CommandTable::from_descriptors(&descriptors)
    }

    /// Appends a signature after any existing overloads of the same command.
    pub fn insert(&mut self, signature: CommandSignature) {
        let key = (signature.name.to_ascii_lowercase(), signature.arity);
        self.signatures.entry(key).or_default().push(signature);
    }

    pub fn extend(&mut self, other: CommandTable) {
        for (key, mut signatures) in other.signatures {
            self.signatures.entry(key).or_default().append(&mut signatures);
        }
    }

    /// All overloads of `name` with the given arity, in declaration order.
    /// Empty when there are none.
    pub fn lookup(&self, name: &str, arity: Arity) -> &[CommandSignature] {
        self.signatures
            .get(&(name.to_ascii_lowercase(), arity))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_known(&self, name: &str) -> bool {
        [Arity::Nular, Arity::Unary, Arity::Binary]
            .iter()
            .any(|arity| !self.lookup(name, *arity).is_empty())
    }

    pub fn has_binary(&self, name: &str) -> bool {
        !self.lookup(name, Arity::Binary).is_empty()
    }

    pub fn resolve(&self, name: &str, arity: Arity, supplied: &[ValueType]) -> Resolution<'_> {
        let overloads = self.lookup(name, arity);
        if overloads.is_empty() {
            return if self.is_known(name) {
                Resolution::UnsupportedArity
            } else {
                Resolution::Unknown
            };
        }

        let mut closest: Option<(&CommandSignature, usize)> = None;
        for signature in overloads {
            match signature.mismatch_index(supplied) {
                None => return Resolution::Match(signature),
                Some(index) => {
                    if closest.map_or(true, |(_, best)| index > best) {
                        closest = Some((signature, index));
                    }
                }
            }
        }

        match closest {
            Some((closest, argument)) => Resolution::NoMatch { closest, argument },
            None => Resolution::Unknown,
        }
    }

    /// Total number of signatures.
    pub fn len(&self) -> usize {
        self.signatures.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}
