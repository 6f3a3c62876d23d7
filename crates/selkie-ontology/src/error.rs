pub type Result<T> = std::result::Result<T, OntologyError>;

#[derive(Debug, thiserror::Error)]
pub enum OntologyError {
    #[error("duplicate type IRI: {iri}")]
    DuplicateType { iri: String },

    #[error("duplicate individual URI: {uri}")]
    DuplicateIndividual { uri: String },

    #[error("duplicate relation kind IRI: {iri}")]
    DuplicateRelationKind { iri: String },

    #[error("duplicate relation URI: {uri}")]
    DuplicateRelation { uri: String },

    #[error("duplicate value descriptor: {name}")]
    DuplicateDescriptor { name: String },

    #[error("type {of} declares unknown supertype: {iri}")]
    UnknownSupertype { of: String, iri: String },

    #[error("individual {of} declares unknown type: {iri}")]
    UnknownIndividualType { of: String, iri: String },

    #[error("type {of} references unknown value descriptor: {name}")]
    UnknownDescriptor { of: String, name: String },

    #[error("individual {of} asserts a value for unknown descriptor: {name}")]
    UnknownValueDescriptor { of: String, name: String },

    #[error("relation {of} references unknown relation kind: {iri}")]
    UnknownRelationKind { of: String, iri: String },

    #[error("relation {of} references unknown endpoint individual: {uri}")]
    UnknownEndpoint { of: String, uri: String },

    #[error("descriptor attached to undeclared type: {0}")]
    UnknownDescriptorTarget(String),

    #[error("value asserted on undeclared individual: {0}")]
    UnknownValueTarget(String),

    #[error("supertype cycle through type: {iri}")]
    SupertypeCycle { iri: String },
}
