use std::collections::HashSet;

use thiserror::Error;

use crate::quiz::model::{Unit, UnitId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitError {
    #[error("a unit with id '{0}' already exists")]
    DuplicateId(UnitId),
    #[error("no unit with id '{0}'")]
    Unknown(UnitId),
}

/// Ordered list of units plus the current selection.
#[derive(Debug, Default)]
pub struct UnitDirectory {
    units: Vec<Unit>,
    current: Option<UnitId>,
}

impl UnitDirectory {
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn current(&self) -> Option<&Unit> {
        let id = self.current.as_ref()?;
        self.units.iter().find(|u| &u.id == id)
    }

    pub fn current_id(&self) -> Option<&UnitId> {
        self.current.as_ref()
    }

    /// Replace the list with the backend's units. Later duplicates of an id
    /// are dropped.
    pub fn replace_all(&mut self, units: Vec<Unit>) {
        let mut seen = HashSet::new();
        self.units = units
            .into_iter()
            .filter(|u| {
                let fresh = seen.insert(u.id.clone());
                if !fresh {
                    tracing::warn!(unit = %u.id, "dropping duplicate unit id from backend");
                }
                fresh
            })
            .collect();
        if let Some(id) = &self.current {
            if !self.units.iter().any(|u| &u.id == id) {
                self.current = None;
            }
        }
    }

    /// Validates a title for creation. Returns the trimmed title, or `None`
    /// when there is nothing to send.
    pub fn prepare_create(&self, title: &str) -> Option<String> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Append the unit the backend created.
    pub fn complete_create(&mut self, unit: Unit) -> Result<(), UnitError> {
        if self.units.iter().any(|u| u.id == unit.id) {
            return Err(UnitError::DuplicateId(unit.id));
        }
        self.units.push(unit);
        Ok(())
    }

    pub fn select(&mut self, id: &UnitId) -> Result<&Unit, UnitError> {
        let unit = self
            .units
            .iter()
            .find(|u| &u.id == id)
            .ok_or_else(|| UnitError::Unknown(id.clone()))?;
        self.current = Some(id.clone());
        Ok(unit)
    }

    pub fn deselect(&mut self) {
        self.current = None;
    }
}
