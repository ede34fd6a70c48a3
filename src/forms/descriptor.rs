//! Declarative description of a stepped form.

use std::collections::HashSet;

use super::error::FormError;
use super::field::FieldValue;
use super::validation::{CrossFieldRule, Validator};

/// One step of a wizard. Ordinals are 1-based and follow declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub key: &'static str,
    pub title: &'static str,
    pub ordinal: usize,
}

impl Section {
    pub fn new(key: &'static str, title: &'static str) -> Self {
        Self {
            key,
            title,
            ordinal: 0,
        }
    }
}

/// Declarative description of a single form field.
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub section: &'static str,
    pub default: FieldValue,
    pub required: bool,
    pub help: Option<&'static str>,
    pub validator: Validator,
}

impl FieldDescriptor {
    pub fn new(
        key: &'static str,
        label: &'static str,
        default: FieldValue,
        validator: Validator,
    ) -> Self {
        Self {
            key,
            label,
            section: "",
            default,
            required: true,
            help: None,
            validator,
        }
    }

    pub fn in_section(mut self, section: &'static str) -> Self {
        self.section = section;
        self
    }

    pub fn with_optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

/// Metadata describing a full form, including section and field order.
#[derive(Clone, Debug)]
pub struct FormDescriptor {
    pub name: &'static str,
    pub sections: Vec<Section>,
    pub fields: Vec<FieldDescriptor>,
    pub rules: Vec<CrossFieldRule>,
}

impl FormDescriptor {
    /// Builds a descriptor, numbering sections in declaration order. Fields
    /// without a section land in the first one.
    pub fn new(
        name: &'static str,
        sections: Vec<Section>,
        fields: Vec<FieldDescriptor>,
    ) -> Self {
        let sections: Vec<Section> = sections
            .into_iter()
            .enumerate()
            .map(|(idx, section)| Section {
                ordinal: idx + 1,
                ..section
            })
            .collect();
        let first = sections.first().map(|section| section.key).unwrap_or("");
        let fields = fields
            .into_iter()
            .map(|field| {
                if field.section.is_empty() {
                    field.in_section(first)
                } else {
                    field
                }
            })
            .collect();
        Self {
            name,
            sections,
            fields,
            rules: Vec::new(),
        }
    }

    /// Single-step form.
    pub fn single(name: &'static str, title: &'static str, fields: Vec<FieldDescriptor>) -> Self {
        Self::new(name, vec![Section::new("main", title)], fields)
    }

    pub fn with_rule(mut self, rule: CrossFieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Number of steps; a form without sections still has one.
    pub fn total_steps(&self) -> usize {
        self.sections.len().max(1)
    }

    pub fn section(&self, step: usize) -> Option<&Section> {
        self.sections.iter().find(|section| section.ordinal == step)
    }

    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.key == key)
    }

    /// Fields shown on `step`. With no sections every field is on step 1.
    pub fn fields_in_step(&self, step: usize) -> Vec<&FieldDescriptor> {
        match self.section(step) {
            Some(section) => self
                .fields
                .iter()
                .filter(|field| field.section == section.key)
                .collect(),
            None if self.sections.is_empty() && step == 1 => self.fields.iter().collect(),
            None => Vec::new(),
        }
    }

    /// Rejects duplicate keys, unknown sections and rules on unknown fields.
    pub fn check(&self) -> Result<(), FormError> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.key) {
                return Err(FormError::DuplicateField(field.key.to_string()));
            }
            if !self.sections.is_empty()
                && !self.sections.iter().any(|section| section.key == field.section)
            {
                return Err(FormError::UnknownSection {
                    field: field.key.to_string(),
                    section: field.section.to_string(),
                });
            }
        }
        for rule in &self.rules {
            for key in std::iter::once(&rule.target).chain(rule.depends_on.iter()) {
                if !seen.contains(key) {
                    return Err(FormError::UnknownField(key.to_string()));
                }
            }
        }
        Ok(())
    }
}
