//! Event matchers: action sets, field predicates, and text patterns.
//!
//! A command's matcher is the AND of up to three parts. Every part that is
//! present must pass; a command with no parts matches every event.

use chatter_api::Event;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;

/// One entry in an action filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionPattern {
    /// Matches events whose action field equals the name.
    Named(String),
    /// Matches events with no action field at all.
    None,
    /// Matches any event, with or without an action field.
    Any,
}

/// Predicate applied to a single event field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldPattern {
    /// The field must be present and equal to the value.
    Equals(Value),
    /// The field must be present, any value.
    Present,
}

/// Composite matcher attached to a command.
///
/// The regex part applies to the event's `text` field and is an unanchored
/// search: patterns that require a full-line match must carry explicit
/// `^...$` anchors. Events without a text field never match a regex part.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    pub(crate) actions: Option<Vec<ActionPattern>>,
    pub(crate) fields: Option<BTreeMap<String, FieldPattern>>,
    pub(crate) pattern: Option<Regex>,
}

impl Matcher {
    /// Test the matcher against an event.
    ///
    /// Returns the regex capture groups (positions 1..) on a match, empty
    /// when there is no regex part. Non-participating groups yield empty
    /// strings.
    pub fn matches(&self, event: &Event) -> Option<Vec<String>> {
        if let Some(actions) = &self.actions {
            let action = event.action();
            let hit = actions.iter().any(|pattern| match pattern {
                ActionPattern::Any => true,
                ActionPattern::None => action.is_none(),
                ActionPattern::Named(name) => action == Some(name.as_str()),
            });
            if !hit {
                return None;
            }
        }

        if let Some(fields) = &self.fields {
            for (key, pattern) in fields {
                let value = event.get(key);
                let hit = match pattern {
                    FieldPattern::Present => value.is_some(),
                    FieldPattern::Equals(want) => value == Some(want),
                };
                if !hit {
                    return None;
                }
            }
        }

        match &self.pattern {
            Some(regex) => {
                let text = event.text()?;
                let caps = regex.captures(text)?;
                Some(
                    caps.iter()
                        .skip(1)
                        .map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
                        .collect(),
                )
            }
            None => Some(Vec::new()),
        }
    }

    /// Whether this matcher has no parts (matches everything).
    pub fn is_empty(&self) -> bool {
        self.actions.is_none() && self.fields.is_none() && self.pattern.is_none()
    }
}
