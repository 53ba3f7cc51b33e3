//! Value types of SQF expressions and command parameters.
//!
//! This module defines:
//!
//! - `Lookup`, the primitive kinds (one value per kind)
//! - `ExpandedValueType`, a positional sequence of value types with optional
//!   trailing slots and an optionally repeating last slot
//! - `ValueType`, either of the two, with the mixed equality rules between them
//!
//! Compound kinds such as `Position3D` are primitives whose expansion is an
//! array of numbers.

use std::{fmt::Display, str::FromStr};

use serde::Serialize;

use crate::errors::errors::ValueTypeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Lookup {
    Number,
    String,
    Boolean,
    Object,
    Array,
    Code,
    Nothing,
    Any,
    Side,
    Group,
    Config,
    Control,
    Display,
    Namespace,
    Location,
    Script,
    StructuredText,
    Task,
    TeamMember,
    HashMap,
    Position2D,
    Position3D,
    ColorRgb,
    ColorRgba,
}

impl Lookup {
    pub fn get_display_name(&self) -> &'static str {
        match self {
            Lookup::Number => "Number",
            Lookup::String => "String",
            Lookup::Boolean => "Boolean",
            Lookup::Object => "Object",
            Lookup::Array => "Array",
            Lookup::Code => "Code",
            Lookup::Nothing => "Nothing",
            Lookup::Any => "Anything",
            Lookup::Side => "Side",
            Lookup::Group => "Group",
            Lookup::Config => "Config",
            Lookup::Control => "Control",
            Lookup::Display => "Display",
            Lookup::Namespace => "Namespace",
            Lookup::Location => "Location",
            Lookup::Script => "Script",
            Lookup::StructuredText => "Structured Text",
            Lookup::Task => "Task",
            Lookup::TeamMember => "Team Member",
            Lookup::HashMap => "HashMap",
            Lookup::Position2D => "Position 2D",
            Lookup::Position3D => "Position 3D",
            Lookup::ColorRgb => "Color RGB",
            Lookup::ColorRgba => "Color RGBA",
        }
    }

    /// Number of number slots a compound kind expands to, 0 for plain kinds.
    fn compound_len(&self) -> usize {
        match self {
            Lookup::Position2D => 2,
            Lookup::Position3D | Lookup::ColorRgb => 3,
            Lookup::ColorRgba => 4,
            _ => 0,
        }
    }

    pub fn get_expanded(&self) -> ExpandedValueType {
        match self.compound_len() {
            0 => ExpandedValueType::new(false, vec![ValueType::Primitive(*self)]),
            n => ExpandedValueType::new(false, vec![ValueType::NUMBER; n]),
        }
    }
}

impl Display for Lookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get_display_name())
    }
}

impl FromStr for Lookup {
    type Err = String;

    /// Parses descriptor spellings, ignoring case, spaces and underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();

        let lookup = match key.as_str() {
            "number" | "scalar" => Lookup::Number,
            "string" => Lookup::String,
            "boolean" | "bool" => Lookup::Boolean,
            "object" => Lookup::Object,
            "array" => Lookup::Array,
            "code" => Lookup::Code,
            "nothing" | "void" => Lookup::Nothing,
            "any" | "anything" => Lookup::Any,
            "side" => Lookup::Side,
            "group" => Lookup::Group,
            "config" => Lookup::Config,
            "control" => Lookup::Control,
            "display" => Lookup::Display,
            "namespace" => Lookup::Namespace,
            "location" => Lookup::Location,
            "script" | "scripthandle" => Lookup::Script,
            "structuredtext" | "text" => Lookup::StructuredText,
            "task" => Lookup::Task,
            "teammember" => Lookup::TeamMember,
            "hashmap" => Lookup::HashMap,
            "position2d" | "pos2d" => Lookup::Position2D,
            "position3d" | "position" | "pos3d" => Lookup::Position3D,
            "colorrgb" => Lookup::ColorRgb,
            "colorrgba" | "color" => Lookup::ColorRgba,
            _ => return Err(s.to_string()),
        };

        Ok(lookup)
    }
}

#[derive(Debug, Clone)]
pub enum ValueType {
    Primitive(Lookup),
    Expanded(ExpandedValueType),
}

impl ValueType {
    pub const NUMBER: ValueType = ValueType::Primitive(Lookup::Number);
    pub const STRING: ValueType = ValueType::Primitive(Lookup::String);
    pub const BOOLEAN: ValueType = ValueType::Primitive(Lookup::Boolean);
    pub const ARRAY: ValueType = ValueType::Primitive(Lookup::Array);
    pub const CODE: ValueType = ValueType::Primitive(Lookup::Code);
    pub const NOTHING: ValueType = ValueType::Primitive(Lookup::Nothing);
    pub const ANY: ValueType = ValueType::Primitive(Lookup::Any);

    pub fn get_display_name(&self) -> String {
        match self {
            ValueType::Primitive(lookup) => lookup.get_display_name().to_string(),
            ValueType::Expanded(expanded) => expanded.get_display_name(),
        }
    }

    pub fn get_expanded(&self) -> ExpandedValueType {
        match self {
            ValueType::Primitive(lookup) => lookup.get_expanded(),
            ValueType::Expanded(expanded) => expanded.clone(),
        }
    }

    pub fn is_any(&self) -> bool {
        *self == ValueType::ANY
    }

    pub fn is_array(&self) -> bool {
        match self {
            ValueType::Primitive(Lookup::Array) => true,
            ValueType::Primitive(lookup) => lookup.compound_len() > 0,
            ValueType::Expanded(expanded) => expanded.is_array(),
        }
    }

    /// Whether a value of type `supplied` may be passed where `self` is expected.
    ///
    /// `Any` on either side is always compatible. Array-shaped expectations
    /// are checked slot by slot, honouring optional trailing slots and a
    /// repeating last slot; a generic `Array` is accepted for any of them.
    pub fn accepts(&self, supplied: &ValueType) -> bool {
        if self.is_any() || supplied.is_any() || self == supplied {
            return true;
        }

        if *self == ValueType::ARRAY {
            return supplied.is_array();
        }

        let expected = self.get_expanded();
        if !expected.is_array() {
            return match self {
                ValueType::Expanded(single) => single
                    .value_types
                    .first()
                    .is_some_and(|slot| slot.accepts(supplied)),
                ValueType::Primitive(_) => false,
            };
        }

        if *supplied == ValueType::ARRAY {
            return true;
        }

        let supplied = supplied.get_expanded();
        if !supplied.is_array() {
            return false;
        }
        expected.accepts_elements(&supplied)
    }
}

impl From<Lookup> for ValueType {
    fn from(lookup: Lookup) -> Self {
        ValueType::Primitive(lookup)
    }
}

impl From<ExpandedValueType> for ValueType {
    fn from(expanded: ExpandedValueType) -> Self {
        ValueType::Expanded(expanded)
    }
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ValueType::Primitive(a), ValueType::Primitive(b)) => a == b,
            (ValueType::Expanded(a), ValueType::Expanded(b)) => a == b,
            (ValueType::Expanded(expanded), ValueType::Primitive(lookup))
            | (ValueType::Primitive(lookup), ValueType::Expanded(expanded)) => {
                expanded.equals_lookup(*lookup)
            }
        }
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get_display_name())
    }
}

/// A positional sequence of value types.
///
/// The last `num_optional_values` slots may be omitted, always from the end.
/// When `unbounded` is set the last slot repeats any number of times. An
/// empty, bounded sequence is the empty array; an empty, unbounded one is an
/// array of anything.
#[derive(Debug, Clone)]
pub struct ExpandedValueType {
    value_types: Vec<ValueType>,
    unbounded: bool,
    num_optional_values: usize,
}

impl ExpandedValueType {
    pub fn new(unbounded: bool, value_types: Vec<ValueType>) -> Self {
        ExpandedValueType {
            value_types,
            unbounded,
            num_optional_values: 0,
        }
    }

    pub fn empty_array() -> Self {
        ExpandedValueType::new(false, vec![])
    }

    pub fn is_array(&self) -> bool {
        self.unbounded || self.value_types.len() > 1 || self.is_empty_array()
    }

    pub fn is_empty_array(&self) -> bool {
        !self.unbounded && self.value_types.is_empty()
    }

    pub fn is_unbounded(&self) -> bool {
        self.unbounded
    }

    pub fn get_value_types(&self) -> &[ValueType] {
        &self.value_types
    }

    /// The backing slots, for assembling a type before it is published.
    pub fn get_value_types_mut(&mut self) -> &mut Vec<ValueType> {
        &mut self.value_types
    }

    pub fn add_value_type(&mut self, value_type: ValueType) {
        self.value_types.push(value_type);
    }

    pub fn get_num_optional_values(&self) -> usize {
        self.num_optional_values
    }

    /// Marks the last `n` slots optional. Any `n` at or above the slot count
    /// makes every slot optional.
    pub fn set_num_optional_values(&mut self, n: i64) -> Result<(), ValueTypeError> {
        if n < 0 {
            return Err(ValueTypeError::InvalidArgument(n));
        }
        self.num_optional_values = n as usize;
        Ok(())
    }

    /// Minimum number of values a matching array must supply.
    pub fn required_count(&self) -> usize {
        let len = self.value_types.len();
        let required = len - self.num_optional_values.min(len);
        if self.unbounded {
            required.min(len.saturating_sub(1))
        } else {
            required
        }
    }

    pub fn get_display_name(&self) -> String {
        if self.value_types.len() == 1 && !self.unbounded {
            return self.value_types[0].get_display_name();
        }

        let mut names: Vec<String> = self
            .value_types
            .iter()
            .map(|value_type| value_type.get_display_name())
            .collect();
        if self.unbounded {
            names.push(String::from("..."));
        }
        format!("[{}]", names.join(", "))
    }

    fn equals_lookup(&self, lookup: Lookup) -> bool {
        if self.is_array() && self.value_types.is_empty() {
            return lookup == Lookup::Array;
        }
        self.value_types.len() == 1
            && matches!(self.value_types[0], ValueType::Primitive(slot) if slot == lookup)
    }

    fn accepts_elements(&self, supplied: &ExpandedValueType) -> bool {
        let count = supplied.value_types.len();
        if count < self.required_count() {
            return false;
        }
        if !self.unbounded && count > self.value_types.len() {
            return false;
        }
        if self.value_types.is_empty() {
            return self.unbounded || count == 0;
        }

        let last = self.value_types.len() - 1;
        supplied
            .value_types
            .iter()
            .enumerate()
            .all(|(index, element)| self.value_types[index.min(last)].accepts(element))
    }
}

impl PartialEq for ExpandedValueType {
    fn eq(&self, other: &Self) -> bool {
        self.unbounded == other.unbounded && self.value_types == other.value_types
    }
}
