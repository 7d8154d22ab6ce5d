//! Resource model.
//!
//! Resources are the bookable assets activities run in: rooms, labs,
//! equipment. Each has a type (looked up through the resource-type store),
//! a location, and an optional seating capacity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bookable resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Unique resource identifier.
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Reference to the resource's [`ResourceType`].
    pub resource_type_id: Uuid,
    /// Location label (building, campus).
    pub location: String,
    /// Human-readable identifier (e.g. room number).
    pub identifier: String,
    /// Seating capacity, if known.
    pub capacity: Option<u32>,
}

/// Resource classification (e.g. "Lecture Hall", "Laboratory").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceType {
    /// Unique resource type identifier.
    pub id: Uuid,
    /// Display name, matched case-insensitively by constraints.
    pub name: String,
}

impl Resource {
    /// Creates a resource with a fresh identifier.
    pub fn new(organization_id: Uuid, resource_type_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_id,
            resource_type_id,
            location: String::new(),
            identifier: String::new(),
            capacity: None,
        }
    }

    /// Overrides the identifier.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Sets the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Sets the human-readable identifier.
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Sets the capacity.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Whether this resource can seat `expected` attendees.
    ///
    /// Unknown capacity or unknown attendance never disqualifies.
    pub fn can_seat(&self, expected: Option<u32>) -> bool {
        match (self.capacity, expected) {
            (Some(capacity), Some(expected)) => capacity >= expected,
            _ => true,
        }
    }
}

impl ResourceType {
    /// Creates a resource type with a fresh identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}
