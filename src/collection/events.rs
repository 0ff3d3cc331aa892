/// Change notification delivered by a [`Collection`](super::Collection).
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionEvent<T> {
    /// A record joined the collection.
    Add(T),
    /// A record left the collection.
    Remove(T),
    /// A member was replaced by a different version of itself.
    Change(T),
    /// All members were replaced at once.
    Reset,
    /// A request to the server was issued.
    Request,
    /// The server confirmed a fetch or save.
    Sync,
    /// A record failed validation.
    Invalid(String),
    /// A request to the server failed; the collection was left unchanged.
    Error(String),
}
