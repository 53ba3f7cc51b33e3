use serde::{Deserialize, Serialize};

use crate::Span;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum HeaderValue {
    Number(f64),
    String(String),
    /// Unquoted text, kept as written (macros, constants).
    Word(String),
    Array(Vec<HeaderValue>),
}

impl HeaderValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::String(value) | HeaderValue::Word(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderProperty {
    pub name: String,
    pub value: HeaderValue,
    /// `name[] = {..}`
    pub is_array: bool,
    /// `name[] += {..}`
    pub appends: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderClass {
    pub name: String,
    pub parent: Option<String>,
    pub entries: Vec<HeaderEntry>,
    /// `class Name;`
    pub is_forward: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum HeaderEntry {
    Property(HeaderProperty),
    Class(HeaderClass),
}

fn classes_of(entries: &[HeaderEntry]) -> impl Iterator<Item = &HeaderClass> {
    entries.iter().filter_map(|entry| match entry {
        HeaderEntry::Class(class) => Some(class),
        _ => None,
    })
}

fn properties_of(entries: &[HeaderEntry]) -> impl Iterator<Item = &HeaderProperty> {
    entries.iter().filter_map(|entry| match entry {
        HeaderEntry::Property(property) => Some(property),
        _ => None,
    })
}

/// Follows `path` (`/`-separated class names, case-insensitive) from `entries`.
fn find_in<'a>(entries: &'a [HeaderEntry], path: &str) -> Option<&'a HeaderClass> {
    let mut names = path.split('/').filter(|name| !name.is_empty());
    let first = names.next()?;

    let mut current = classes_of(entries).find(|class| class.name.eq_ignore_ascii_case(first))?;
    for name in names {
        current = current.get_class(name)?;
    }

    Some(current)
}

impl HeaderClass {
    pub fn classes(&self) -> impl Iterator<Item = &HeaderClass> {
        classes_of(&self.entries)
    }

    pub fn properties(&self) -> impl Iterator<Item = &HeaderProperty> {
        properties_of(&self.entries)
    }

    pub fn get_class(&self, name: &str) -> Option<&HeaderClass> {
        self.classes().find(|class| class.name.eq_ignore_ascii_case(name))
    }

    pub fn get_property(&self, name: &str) -> Option<&HeaderProperty> {
        self.properties()
            .find(|property| property.name.eq_ignore_ascii_case(name))
    }

    pub fn find_class(&self, path: &str) -> Option<&HeaderClass> {
        find_in(&self.entries, path)
    }
}

/// A function declared under `CfgFunctions`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigFunction {
    pub tag: String,
    pub category: String,
    pub name: String,
    /// Explicit `file` of the function or, failing that, of its category.
    pub file: Option<String>,
}

impl ConfigFunction {
    /// Name scripts call the function by, `TAG_fnc_name`.
    pub fn full_name(&self) -> String {
        format!("{}_fnc_{}", self.tag, self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaderFile {
    pub entries: Vec<HeaderEntry>,
}

impl HeaderFile {
    pub fn classes(&self) -> impl Iterator<Item = &HeaderClass> {
        classes_of(&self.entries)
    }

    pub fn properties(&self) -> impl Iterator<Item = &HeaderProperty> {
        properties_of(&self.entries)
    }

    /// Finds a class by path, e.g. `CfgFunctions/TAG/Category`.
    pub fn find_class(&self, path: &str) -> Option<&HeaderClass> {
        find_in(&self.entries, path)
    }

    /// Every function declared in `CfgFunctions`, in declaration order.
    ///
    /// The tag is the tag class's `tag` property when present, else its name.
    pub fn config_functions(&self) -> Vec<ConfigFunction> {
        let mut functions = vec![];
        let cfg_functions = match self.find_class("CfgFunctions") {
            Some(class) => class,
            None => return functions,
        };

        for tag_class in cfg_functions.classes() {
            let tag = tag_class
                .get_property("tag")
                .and_then(|property| property.value.as_str())
                .unwrap_or(&tag_class.name);

            for category in tag_class.classes() {
                let category_file = category
                    .get_property("file")
                    .and_then(|property| property.value.as_str());

                for function in category.classes() {
                    let file = function
                        .get_property("file")
                        .and_then(|property| property.value.as_str())
                        .or(category_file);

                    functions.push(ConfigFunction {
                        tag: tag.to_string(),
                        category: category.name.clone(),
                        name: function.name.clone(),
                        file: file.map(String::from),
                    });
                }
            }
        }

        functions
    }
}
