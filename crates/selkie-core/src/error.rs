use crate::handler::HandlerKind;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the configuration core.
///
/// Every variant except the two root-type ones is a precondition violation:
/// the operation is rejected synchronously and the configuration is left
/// unmodified. The root-type variants abort [`Configuration::new`]
/// (structural invariant of the input hierarchy).
///
/// [`Configuration::new`]: crate::Configuration::new
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown instance type: {iri}")]
    UnknownType { iri: String },

    #[error("unknown instance: {uri}")]
    UnknownInstance { uri: String },

    #[error("unknown relation type: {iri}")]
    UnknownRelationType { iri: String },

    #[error("unknown relation: {uri}")]
    UnknownRelation { uri: String },

    #[error("unknown group: {name}")]
    UnknownGroup { name: String },

    #[error("a group named {name} already exists")]
    DuplicateGroup { name: String },

    #[error("unknown position handler: {index}")]
    UnknownHandler { index: usize },

    #[error("unknown value descriptor: {name}")]
    UnknownValueDescriptor { name: String },

    #[error("descriptor {name} is not in the value universe of type {type_iri}")]
    DescriptorNotInUniverse { type_iri: String, name: String },

    #[error("{kind:?} handler may not be assigned to type {type_iri}")]
    IllegalHandlerAssignment { kind: HandlerKind, type_iri: String },

    #[error("relation depth must be non-negative, got {value}")]
    NegativeDepth { value: i32 },

    #[error("parallel relation count must be at least 1, got {value}")]
    NonPositiveParallelRelations { value: i32 },

    #[error("ontology type hierarchy has no root type")]
    NoRootType,

    #[error("ontology type hierarchy has multiple root types: {iris:?}")]
    MultipleRootTypes { iris: Vec<String> },
}
