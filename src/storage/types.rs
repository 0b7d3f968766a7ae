//! Storage types

/// A stored object read back from a backend
#[derive(Debug, Clone)]
pub struct Blob {
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Who may read a newly written object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Private,
    Public,
}
