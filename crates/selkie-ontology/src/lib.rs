#![forbid(unsafe_code)]

//! Immutable ontology input graph for the selkie configuration core.
//!
//! An [`Ontology`] is a finished, read-only graph of typed individuals, their
//! type hierarchy (a DAG: a type may have several supertypes), typed relations
//! between individuals, and the value descriptors attached to types. It is
//! assembled once through [`OntologyBuilder`] (which resolves every
//! cross-reference by IRI/URI and validates the result) and never mutated
//! afterwards. `selkie-core` holds it behind an `Arc` and addresses entries by
//! arena index, so index stability after [`OntologyBuilder::build`] is part of
//! this crate's contract.
//!
//! Parsing ontology source files into this model is out of scope; callers
//! construct it programmatically from whatever frontend they use.

mod builder;
mod error;

pub use builder::OntologyBuilder;
pub use error::{OntologyError, Result};

use rustc_hash::FxBuildHasher;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

/// The primitive kind of a value descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ValueKind {
    String,
    Integer,
    Decimal,
    Boolean,
}

/// One ontology type (class). Entries of the type arena.
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub(crate) iri: String,
    pub(crate) name: String,
    pub(crate) supertypes: Vec<usize>,
    pub(crate) descriptors: Vec<usize>,
}

impl TypeDef {
    pub fn iri(&self) -> &str {
        &self.iri
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct supertypes, as indices into [`Ontology::types`].
    pub fn supertypes(&self) -> &[usize] {
        &self.supertypes
    }

    /// Value descriptors declared directly on this type, as indices into the
    /// shared descriptor arena. Inherited descriptors are not repeated here.
    pub fn descriptors(&self) -> &[usize] {
        &self.descriptors
    }
}

/// A value asserted on an individual. The core never interprets the lexical
/// form; it is carried for display layers.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueAssertion {
    pub(crate) descriptor: usize,
    pub(crate) lexical: String,
}

impl ValueAssertion {
    pub fn descriptor(&self) -> usize {
        self.descriptor
    }

    pub fn lexical(&self) -> &str {
        &self.lexical
    }
}

/// One ontology individual.
#[derive(Debug, Clone)]
pub struct IndividualDef {
    pub(crate) uri: String,
    pub(crate) name: String,
    pub(crate) types: Vec<usize>,
    pub(crate) values: Vec<ValueAssertion>,
}

impl IndividualDef {
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct types of this individual (indices into [`Ontology::types`]).
    pub fn types(&self) -> &[usize] {
        &self.types
    }

    pub fn values(&self) -> &[ValueAssertion] {
        &self.values
    }
}

/// One relation kind (object property).
#[derive(Debug, Clone)]
pub struct RelationKindDef {
    pub(crate) iri: String,
    pub(crate) name: String,
}

impl RelationKindDef {
    pub fn iri(&self) -> &str {
        &self.iri
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// One directed relation between two individuals.
#[derive(Debug, Clone)]
pub struct RelationDef {
    pub(crate) uri: String,
    pub(crate) kind: usize,
    pub(crate) origin: usize,
    pub(crate) destination: usize,
}

impl RelationDef {
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Index into [`Ontology::relation_kinds`].
    pub fn kind(&self) -> usize {
        self.kind
    }

    /// Origin individual (index into [`Ontology::individuals`]).
    pub fn origin(&self) -> usize {
        self.origin
    }

    /// Destination individual (index into [`Ontology::individuals`]).
    pub fn destination(&self) -> usize {
        self.destination
    }
}

/// One value descriptor. Descriptors form a shared universe: several types
/// may reference the same entry.
#[derive(Debug, Clone)]
pub struct ValueDescriptorDef {
    pub(crate) name: String,
    pub(crate) kind: ValueKind,
}

impl ValueDescriptorDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }
}

/// The finished, immutable ontology graph.
#[derive(Debug)]
pub struct Ontology {
    pub(crate) types: Vec<TypeDef>,
    pub(crate) type_index: HashMap<String, usize>,

    pub(crate) individuals: Vec<IndividualDef>,
    pub(crate) individual_index: HashMap<String, usize>,

    pub(crate) relation_kinds: Vec<RelationKindDef>,
    pub(crate) kind_index: HashMap<String, usize>,

    pub(crate) relations: Vec<RelationDef>,
    pub(crate) relation_index: HashMap<String, usize>,

    pub(crate) descriptors: Vec<ValueDescriptorDef>,
    pub(crate) descriptor_index: HashMap<String, usize>,
}

impl Ontology {
    pub fn builder() -> OntologyBuilder {
        OntologyBuilder::new()
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.iter()
    }

    /// Entry of the type arena. Panics on an out-of-range index; indices
    /// obtained from this ontology are always in range.
    pub fn type_def(&self, index: usize) -> &TypeDef {
        &self.types[index]
    }

    pub fn type_index_of(&self, iri: &str) -> Option<usize> {
        self.type_index.get(iri).copied()
    }

    pub fn type_by_iri(&self, iri: &str) -> Option<&TypeDef> {
        self.type_index_of(iri).map(|i| &self.types[i])
    }

    pub fn individual_count(&self) -> usize {
        self.individuals.len()
    }

    pub fn individuals(&self) -> impl Iterator<Item = &IndividualDef> {
        self.individuals.iter()
    }

    pub fn individual_def(&self, index: usize) -> &IndividualDef {
        &self.individuals[index]
    }

    pub fn individual_index_of(&self, uri: &str) -> Option<usize> {
        self.individual_index.get(uri).copied()
    }

    pub fn individual_by_uri(&self, uri: &str) -> Option<&IndividualDef> {
        self.individual_index_of(uri).map(|i| &self.individuals[i])
    }

    pub fn relation_kind_count(&self) -> usize {
        self.relation_kinds.len()
    }

    pub fn relation_kinds(&self) -> impl Iterator<Item = &RelationKindDef> {
        self.relation_kinds.iter()
    }

    pub fn relation_kind_def(&self, index: usize) -> &RelationKindDef {
        &self.relation_kinds[index]
    }

    pub fn relation_kind_index_of(&self, iri: &str) -> Option<usize> {
        self.kind_index.get(iri).copied()
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    pub fn relations(&self) -> impl Iterator<Item = &RelationDef> {
        self.relations.iter()
    }

    pub fn relation_def(&self, index: usize) -> &RelationDef {
        &self.relations[index]
    }

    pub fn relation_index_of(&self, uri: &str) -> Option<usize> {
        self.relation_index.get(uri).copied()
    }

    pub fn descriptor_count(&self) -> usize {
        self.descriptors.len()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ValueDescriptorDef> {
        self.descriptors.iter()
    }

    pub fn descriptor(&self, index: usize) -> &ValueDescriptorDef {
        &self.descriptors[index]
    }

    pub fn descriptor_index_of(&self, name: &str) -> Option<usize> {
        self.descriptor_index.get(name).copied()
    }

    /// Indices of the types with no supertype. A well-formed input for the
    /// configuration layer has exactly one; this crate does not enforce that
    /// (the hierarchy itself is a DAG, root uniqueness is a consumer rule).
    pub fn root_types(&self) -> Vec<usize> {
        self.types
            .iter()
            .enumerate()
            .filter(|(_, t)| t.supertypes.is_empty())
            .map(|(i, _)| i)
            .collect()
    }

    /// Transitive supertype closure of a type, excluding the type itself,
    /// deduplicated, in breadth-first discovery order.
    pub fn ancestors_of(&self, type_index: usize) -> Vec<usize> {
        let mut seen = vec![false; self.types.len()];
        let mut out: Vec<usize> = Vec::new();
        let mut queue: std::collections::VecDeque<usize> =
            self.types[type_index].supertypes.iter().copied().collect();
        while let Some(t) = queue.pop_front() {
            if seen[t] {
                continue;
            }
            seen[t] = true;
            out.push(t);
            for &s in &self.types[t].supertypes {
                queue.push_back(s);
            }
        }
        out
    }
}
