//! Bidirectional enum tables.
//!
//! An [`EnumTable`] is built once from an enum declaration. Numeric members
//! get a reverse entry keyed by the printed form of their value, so a
//! lookup by value (`Size[2]`) yields the member name. String members have
//! no reverse entry.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::ast::{EnumDecl, EnumInit};
use crate::error::Diagnostic;
use crate::number::format_number;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EnumValue {
    Number(f64),
    Str(String),
}

impl EnumValue {
    pub fn is_numeric(&self) -> bool {
        matches!(self, EnumValue::Number(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumTable {
    pub name: String,
    /// Members in declaration order.
    members: Vec<(String, EnumValue)>,
    #[serde(skip)]
    forward: BTreeMap<String, EnumValue>,
    #[serde(skip)]
    reverse: BTreeMap<String, String>,
}

impl EnumTable {
    /// Assign member values and build both lookup directions.
    ///
    /// A member without an initializer takes the previous numeric value
    /// plus one (0 for the first member). After a string-valued member an
    /// initializer is mandatory.
    pub fn build(decl: &EnumDecl, file: &str) -> Result<EnumTable, Diagnostic> {
        let mut table = EnumTable {
            name: decl.name.clone(),
            members: Vec::with_capacity(decl.members.len()),
            forward: BTreeMap::new(),
            reverse: BTreeMap::new(),
        };
        let mut previous: Option<EnumValue> = None;
        for m in &decl.members {
            let value = match (&m.init, &previous) {
                (Some(EnumInit::Number(n)), _) => EnumValue::Number(*n),
                (Some(EnumInit::Str(s)), _) => EnumValue::Str(s.clone()),
                (None, None) => EnumValue::Number(0.0),
                (None, Some(EnumValue::Number(p))) => EnumValue::Number(p + 1.0),
                (None, Some(EnumValue::Str(_))) => {
                    return Err(Diagnostic::check(
                        file,
                        m.line,
                        format!("enum member '{}.{}' must have an initializer", decl.name, m.name),
                    ))
                }
            };
            table.insert(&m.name, value.clone());
            previous = Some(value);
        }
        Ok(table)
    }

    fn insert(&mut self, name: &str, value: EnumValue) {
        if let EnumValue::Number(n) = value {
            // Later members win on collision, like re-assigning a property.
            self.reverse.insert(format_number(n), name.to_owned());
        }
        self.forward.insert(name.to_owned(), value.clone());
        self.members.push((name.to_owned(), value));
    }

    /// Forward lookup: member name to value.
    pub fn value_of(&self, member: &str) -> Option<&EnumValue> {
        self.forward.get(member)
    }

    /// Reverse lookup: numeric value to member name.
    pub fn name_of(&self, value: f64) -> Option<&str> {
        self.reverse.get(&format_number(value)).map(String::as_str)
    }

    pub fn members(&self) -> &[(String, EnumValue)] {
        &self.members
    }

    /// True when every member is numeric.
    pub fn is_numeric(&self) -> bool {
        self.members.iter().all(|(_, v)| v.is_numeric())
    }

    pub fn has_numeric_member(&self) -> bool {
        self.members.iter().any(|(_, v)| v.is_numeric())
    }
}
