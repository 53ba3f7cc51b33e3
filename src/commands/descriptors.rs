//! Serde model of the command descriptor list.
//!
//! ```json
//! { "name": "setPos",
//!   "syntaxes": [ { "left": "Object", "right": "Position3D", "returns": "Nothing" } ] }
//! ```
//!
//! A parameter is a type name, a `{ "type": .., "desc": .. }` object or an
//! `{ "array": [..] }` of element parameters. Array elements may be marked
//! `optional` (trailing only) and the last one `unbounded`.

use serde::Deserialize;

use crate::{
    ast::types::{ExpandedValueType, Lookup, ValueType},
    errors::errors::CommandTableError,
};

use super::signatures::{Arity, CommandSignature, Parameter};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandDescriptor {
    pub name: String,
    pub syntaxes: Vec<SyntaxDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SyntaxDescriptor {
    #[serde(default)]
    pub left: Option<ParamDescriptor>,
    #[serde(default)]
    pub right: Option<ParamDescriptor>,
    pub returns: ParamDescriptor,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParamDescriptor {
    Name(String),
    Array {
        array: Vec<ParamDescriptor>,
        #[serde(default)]
        desc: String,
        #[serde(default)]
        optional: bool,
    },
    Typed {
        #[serde(rename = "type")]
        type_name: String,
        #[serde(default)]
        desc: String,
        #[serde(default)]
        optional: bool,
        #[serde(default)]
        unbounded: bool,
    },
}

impl ParamDescriptor {
    fn is_optional(&self) -> bool {
        match self {
            ParamDescriptor::Name(_) => false,
            ParamDescriptor::Array { optional, .. } | ParamDescriptor::Typed { optional, .. } => {
                *optional
            }
        }
    }

    fn is_unbounded(&self) -> bool {
        matches!(self, ParamDescriptor::Typed { unbounded: true, .. })
    }

    fn description(&self) -> &str {
        match self {
            ParamDescriptor::Name(_) => "",
            ParamDescriptor::Array { desc, .. } | ParamDescriptor::Typed { desc, .. } => desc,
        }
    }

    pub fn to_value_type(&self, command: &str) -> Result<ValueType, CommandTableError> {
        match self {
            ParamDescriptor::Name(type_name) | ParamDescriptor::Typed { type_name, .. } => {
                parse_lookup(command, type_name).map(ValueType::Primitive)
            }
            ParamDescriptor::Array { array, .. } => {
                to_expanded(command, array).map(ValueType::Expanded)
            }
        }
    }

    fn to_parameter(&self, command: &str) -> Result<Parameter, CommandTableError> {
        Ok(Parameter {
            value_type: self.to_value_type(command)?,
            description: self.description().to_string(),
            unbounded: self.is_unbounded(),
        })
    }
}

fn parse_lookup(command: &str, type_name: &str) -> Result<Lookup, CommandTableError> {
    type_name
        .parse::<Lookup>()
        .map_err(|type_name| CommandTableError::UnknownType {
            command: command.to_string(),
            type_name,
        })
}

fn to_expanded(
    command: &str,
    elements: &[ParamDescriptor],
) -> Result<ExpandedValueType, CommandTableError> {
    let last = elements.len().saturating_sub(1);
    let mut unbounded = false;
    let mut optional = 0_i64;
    let mut value_types = Vec::with_capacity(elements.len());

    for (index, element) in elements.iter().enumerate() {
        if element.is_unbounded() {
            if index != last {
                return Err(CommandTableError::UnboundedNotLast {
                    command: command.to_string(),
                });
            }
            unbounded = true;
        }

        if element.is_optional() {
            optional += 1;
        } else if optional > 0 {
            return Err(CommandTableError::RequiredAfterOptional {
                command: command.to_string(),
            });
        }

        value_types.push(element.to_value_type(command)?);
    }

    let mut expanded = ExpandedValueType::new(unbounded, vec![]);
    for value_type in value_types {
        expanded.add_value_type(value_type);
    }
    expanded
        .set_num_optional_values(optional)
        .map_err(|source| CommandTableError::ValueType {
            command: command.to_string(),
            source,
        })?;

    Ok(expanded)
}

impl CommandDescriptor {
    pub fn to_signatures(&self) -> Result<Vec<CommandSignature>, CommandTableError> {
        self.syntaxes
            .iter()
            .map(|syntax| self.to_signature(syntax))
            .collect()
    }

    fn to_signature(&self, syntax: &SyntaxDescriptor) -> Result<CommandSignature, CommandTableError> {
        let arity = match (&syntax.left, &syntax.right) {
            (None, None) => Arity::Nular,
            (None, Some(_)) => Arity::Unary,
            (Some(_), Some(_)) => Arity::Binary,
            (Some(_), None) => {
                return Err(CommandTableError::MissingRightOperand {
                    command: self.name.clone(),
                })
            }
        };

        let left = match &syntax.left {
            Some(left) => Some(left.to_parameter(&self.name)?),
            None => None,
        };
        let right = match &syntax.right {
            Some(right) => Some(right.to_parameter(&self.name)?),
            None => None,
        };

        Ok(CommandSignature {
            name: self.name.clone(),
            arity,
            left,
            right,
            return_type: syntax.returns.to_value_type(&self.name)?,
        })
    }
}
