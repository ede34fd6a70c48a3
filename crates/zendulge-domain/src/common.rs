//! Shared traits for marketplace records.

/// Exposes the backend identifier of a stored record.
pub trait Identifiable {
    fn id(&self) -> &str;
}

/// Provides read-only access to a record's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Records that can be switched on and off by their operator.
pub trait Activatable {
    fn is_active(&self) -> bool;
}

/// Text a record exposes to client-side search, most significant first.
pub trait Searchable {
    fn search_terms(&self) -> Vec<&str>;
}
