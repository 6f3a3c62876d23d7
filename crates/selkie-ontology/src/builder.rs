//! Builder for [`Ontology`].
//!
//! Declarations are accumulated as raw id strings so callers can add entities
//! in any order; [`OntologyBuilder::build`] resolves every cross-reference and
//! validates the whole graph in one pass.

use crate::error::{OntologyError, Result};
use crate::{
    HashMap, IndividualDef, Ontology, RelationDef, RelationKindDef, TypeDef, ValueAssertion,
    ValueDescriptorDef, ValueKind,
};

#[derive(Debug, Clone)]
struct TypeDecl {
    iri: String,
    name: String,
    supertypes: Vec<String>,
    descriptors: Vec<String>,
}

#[derive(Debug, Clone)]
struct IndividualDecl {
    uri: String,
    name: String,
    types: Vec<String>,
    values: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
struct RelationDecl {
    uri: String,
    kind: String,
    origin: String,
    destination: String,
}

#[derive(Debug, Clone, Default)]
pub struct OntologyBuilder {
    types: Vec<TypeDecl>,
    individuals: Vec<IndividualDecl>,
    relation_kinds: Vec<(String, String)>,
    relations: Vec<RelationDecl>,
    descriptors: Vec<(String, ValueKind)>,
    /// Attachments made before the target type was declared; resolved (or
    /// reported) in `build()`.
    pending_descriptors: Vec<(String, String)>,
    /// Values asserted before the target individual was declared; resolved
    /// (or reported) in `build()`.
    pending_values: Vec<(String, String, String)>,
}

impl OntologyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_type(
        &mut self,
        iri: impl Into<String>,
        name: impl Into<String>,
        supertypes: &[&str],
    ) -> &mut Self {
        self.types.push(TypeDecl {
            iri: iri.into(),
            name: name.into(),
            supertypes: supertypes.iter().map(|s| s.to_string()).collect(),
            descriptors: Vec::new(),
        });
        self
    }

    /// Declares a value descriptor in the shared universe.
    pub fn add_descriptor(&mut self, name: impl Into<String>, kind: ValueKind) -> &mut Self {
        self.descriptors.push((name.into(), kind));
        self
    }

    /// Attaches a descriptor to a type. Either side may be declared before or
    /// after the attachment; unknown ids are reported by
    /// [`OntologyBuilder::build`], not here.
    pub fn attach_descriptor(
        &mut self,
        type_iri: &str,
        descriptor_name: impl Into<String>,
    ) -> &mut Self {
        if let Some(decl) = self.types.iter_mut().rev().find(|t| t.iri == type_iri) {
            decl.descriptors.push(descriptor_name.into());
        } else {
            // Target not declared yet; build() resolves it once all types
            // are known, or reports the iri if it never shows up.
            self.pending_descriptors
                .push((type_iri.to_string(), descriptor_name.into()));
        }
        self
    }

    pub fn add_individual(
        &mut self,
        uri: impl Into<String>,
        name: impl Into<String>,
        types: &[&str],
    ) -> &mut Self {
        self.individuals.push(IndividualDecl {
            uri: uri.into(),
            name: name.into(),
            types: types.iter().map(|s| s.to_string()).collect(),
            values: Vec::new(),
        });
        self
    }

    /// Asserts a value on the individual with `uri`. The individual may be
    /// declared before or after the assertion; a uri that never gets declared
    /// is reported by [`OntologyBuilder::build`].
    pub fn add_value(
        &mut self,
        uri: &str,
        descriptor_name: impl Into<String>,
        lexical: impl Into<String>,
    ) -> &mut Self {
        if let Some(decl) = self.individuals.iter_mut().rev().find(|i| i.uri == uri) {
            decl.values.push((descriptor_name.into(), lexical.into()));
        } else {
            self.pending_values
                .push((uri.to_string(), descriptor_name.into(), lexical.into()));
        }
        self
    }

    pub fn add_relation_kind(
        &mut self,
        iri: impl Into<String>,
        name: impl Into<String>,
    ) -> &mut Self {
        self.relation_kinds.push((iri.into(), name.into()));
        self
    }

    pub fn add_relation(
        &mut self,
        uri: impl Into<String>,
        kind_iri: impl Into<String>,
        origin_uri: impl Into<String>,
        destination_uri: impl Into<String>,
    ) -> &mut Self {
        self.relations.push(RelationDecl {
            uri: uri.into(),
            kind: kind_iri.into(),
            origin: origin_uri.into(),
            destination: destination_uri.into(),
        });
        self
    }

    /// Resolves all declarations into an immutable [`Ontology`].
    ///
    /// Arena order follows declaration order, so index assignment is
    /// deterministic for a given builder script.
    pub fn build(&self) -> Result<Ontology> {
        let mut descriptors: Vec<ValueDescriptorDef> = Vec::with_capacity(self.descriptors.len());
        let mut descriptor_index: HashMap<String, usize> = HashMap::default();
        for (name, kind) in &self.descriptors {
            if descriptor_index.contains_key(name) {
                return Err(OntologyError::DuplicateDescriptor { name: name.clone() });
            }
            descriptor_index.insert(name.clone(), descriptors.len());
            descriptors.push(ValueDescriptorDef {
                name: name.clone(),
                kind: *kind,
            });
        }

        // Pass 1: allocate type slots so supertype references can point
        // forward as well as backward.
        let mut type_index: HashMap<String, usize> = HashMap::default();
        for decl in &self.types {
            if type_index.contains_key(&decl.iri) {
                return Err(OntologyError::DuplicateType {
                    iri: decl.iri.clone(),
                });
            }
            type_index.insert(decl.iri.clone(), type_index.len());
        }

        let mut types: Vec<TypeDef> = Vec::with_capacity(self.types.len());
        for decl in &self.types {
            let mut supertypes = Vec::with_capacity(decl.supertypes.len());
            for s in &decl.supertypes {
                let Some(&idx) = type_index.get(s) else {
                    return Err(OntologyError::UnknownSupertype {
                        of: decl.iri.clone(),
                        iri: s.clone(),
                    });
                };
                supertypes.push(idx);
            }
            let mut descs = Vec::new();
            for d in &decl.descriptors {
                let Some(&idx) = descriptor_index.get(d) else {
                    return Err(OntologyError::UnknownDescriptor {
                        of: decl.iri.clone(),
                        name: d.clone(),
                    });
                };
                descs.push(idx);
            }
            types.push(TypeDef {
                iri: decl.iri.clone(),
                name: decl.name.clone(),
                supertypes,
                descriptors: descs,
            });
        }

        // Attachments that arrived before their target type was declared.
        for (type_iri, descriptor_name) in &self.pending_descriptors {
            let Some(&t) = type_index.get(type_iri) else {
                return Err(OntologyError::UnknownDescriptorTarget(type_iri.clone()));
            };
            let Some(&d) = descriptor_index.get(descriptor_name) else {
                return Err(OntologyError::UnknownDescriptor {
                    of: type_iri.clone(),
                    name: descriptor_name.clone(),
                });
            };
            if !types[t].descriptors.contains(&d) {
                types[t].descriptors.push(d);
            }
        }

        check_acyclic(&types)?;

        let mut individuals: Vec<IndividualDef> = Vec::with_capacity(self.individuals.len());
        let mut individual_index: HashMap<String, usize> = HashMap::default();
        for decl in &self.individuals {
            if individual_index.contains_key(&decl.uri) {
                return Err(OntologyError::DuplicateIndividual {
                    uri: decl.uri.clone(),
                });
            }
            let mut type_ids = Vec::with_capacity(decl.types.len());
            for t in &decl.types {
                let Some(&idx) = type_index.get(t) else {
                    return Err(OntologyError::UnknownIndividualType {
                        of: decl.uri.clone(),
                        iri: t.clone(),
                    });
                };
                type_ids.push(idx);
            }
            let mut values = Vec::with_capacity(decl.values.len());
            for (d, lexical) in &decl.values {
                let Some(&idx) = descriptor_index.get(d) else {
                    return Err(OntologyError::UnknownValueDescriptor {
                        of: decl.uri.clone(),
                        name: d.clone(),
                    });
                };
                values.push(ValueAssertion {
                    descriptor: idx,
                    lexical: lexical.clone(),
                });
            }
            individual_index.insert(decl.uri.clone(), individuals.len());
            individuals.push(IndividualDef {
                uri: decl.uri.clone(),
                name: decl.name.clone(),
                types: type_ids,
                values,
            });
        }

        // Values asserted before their individual was declared.
        for (uri, descriptor_name, lexical) in &self.pending_values {
            let Some(&i) = individual_index.get(uri) else {
                return Err(OntologyError::UnknownValueTarget(uri.clone()));
            };
            let Some(&d) = descriptor_index.get(descriptor_name) else {
                return Err(OntologyError::UnknownValueDescriptor {
                    of: uri.clone(),
                    name: descriptor_name.clone(),
                });
            };
            individuals[i].values.push(ValueAssertion {
                descriptor: d,
                lexical: lexical.clone(),
            });
        }

        let mut relation_kinds: Vec<RelationKindDef> = Vec::with_capacity(self.relation_kinds.len());
        let mut kind_index: HashMap<String, usize> = HashMap::default();
        for (iri, name) in &self.relation_kinds {
            if kind_index.contains_key(iri) {
                return Err(OntologyError::DuplicateRelationKind { iri: iri.clone() });
            }
            kind_index.insert(iri.clone(), relation_kinds.len());
            relation_kinds.push(RelationKindDef {
                iri: iri.clone(),
                name: name.clone(),
            });
        }

        let mut relations: Vec<RelationDef> = Vec::with_capacity(self.relations.len());
        let mut relation_index: HashMap<String, usize> = HashMap::default();
        for decl in &self.relations {
            if relation_index.contains_key(&decl.uri) {
                return Err(OntologyError::DuplicateRelation {
                    uri: decl.uri.clone(),
                });
            }
            let Some(&kind) = kind_index.get(&decl.kind) else {
                return Err(OntologyError::UnknownRelationKind {
                    of: decl.uri.clone(),
                    iri: decl.kind.clone(),
                });
            };
            let Some(&origin) = individual_index.get(&decl.origin) else {
                return Err(OntologyError::UnknownEndpoint {
                    of: decl.uri.clone(),
                    uri: decl.origin.clone(),
                });
            };
            let Some(&destination) = individual_index.get(&decl.destination) else {
                return Err(OntologyError::UnknownEndpoint {
                    of: decl.uri.clone(),
                    uri: decl.destination.clone(),
                });
            };
            relation_index.insert(decl.uri.clone(), relations.len());
            relations.push(RelationDef {
                uri: decl.uri.clone(),
                kind,
                origin,
                destination,
            });
        }

        Ok(Ontology {
            types,
            type_index,
            individuals,
            individual_index,
            relation_kinds,
            kind_index,
            relations,
            relation_index,
            descriptors,
            descriptor_index,
        })
    }
}

fn check_acyclic(types: &[TypeDef]) -> Result<()> {
    // DFS coloring over supertype edges. 0 = white, 1 = on stack, 2 = done.
    fn visit(types: &[TypeDef], color: &mut [u8], t: usize) -> Result<()> {
        match color[t] {
            1 => {
                return Err(OntologyError::SupertypeCycle {
                    iri: types[t].iri.clone(),
                });
            }
            2 => return Ok(()),
            _ => {}
        }
        color[t] = 1;
        for &s in &types[t].supertypes {
            visit(types, color, s)?;
        }
        color[t] = 2;
        Ok(())
    }

    let mut color = vec![0u8; types.len()];
    for t in 0..types.len() {
        visit(types, &mut color, t)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_and_resolves_forward_references() {
        let mut b = OntologyBuilder::new();
        // Subtype declared before its supertype.
        b.add_type("ex:B", "B", &["ex:A"])
            .add_type("ex:A", "A", &[])
            .add_individual("urn:x", "x", &["ex:B"])
            .add_relation_kind("ex:rel", "rel")
            .add_relation("urn:r", "ex:rel", "urn:x", "urn:x");
        let ontology = b.build().unwrap();
        assert_eq!(ontology.type_count(), 2);
        let b_idx = ontology.type_index_of("ex:B").unwrap();
        let a_idx = ontology.type_index_of("ex:A").unwrap();
        assert_eq!(ontology.type_def(b_idx).supertypes(), &[a_idx]);
        assert_eq!(ontology.root_types(), vec![a_idx]);
        assert_eq!(ontology.ancestors_of(b_idx), vec![a_idx]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut b = OntologyBuilder::new();
        b.add_type("ex:A", "A", &[]).add_type("ex:A", "again", &[]);
        assert!(matches!(
            b.build(),
            Err(OntologyError::DuplicateType { .. })
        ));

        let mut b = OntologyBuilder::new();
        b.add_type("ex:A", "A", &[])
            .add_individual("urn:x", "x", &["ex:A"])
            .add_individual("urn:x", "x2", &["ex:A"]);
        assert!(matches!(
            b.build(),
            Err(OntologyError::DuplicateIndividual { .. })
        ));
    }

    #[test]
    fn unknown_references_name_the_offender() {
        let mut b = OntologyBuilder::new();
        b.add_type("ex:A", "A", &["ex:Missing"]);
        match b.build() {
            Err(OntologyError::UnknownSupertype { of, iri }) => {
                assert_eq!(of, "ex:A");
                assert_eq!(iri, "ex:Missing");
            }
            other => panic!("expected UnknownSupertype, got {other:?}"),
        }

        let mut b = OntologyBuilder::new();
        b.add_type("ex:A", "A", &[])
            .add_relation_kind("ex:rel", "rel")
            .add_individual("urn:x", "x", &["ex:A"])
            .add_relation("urn:r", "ex:rel", "urn:x", "urn:missing");
        assert!(matches!(
            b.build(),
            Err(OntologyError::UnknownEndpoint { .. })
        ));
    }

    #[test]
    fn supertype_cycles_are_rejected() {
        let mut b = OntologyBuilder::new();
        b.add_type("ex:A", "A", &["ex:B"]).add_type("ex:B", "B", &["ex:A"]);
        assert!(matches!(
            b.build(),
            Err(OntologyError::SupertypeCycle { .. })
        ));

        // Self-supertype is the one-node cycle.
        let mut b = OntologyBuilder::new();
        b.add_type("ex:A", "A", &["ex:A"]);
        assert!(matches!(
            b.build(),
            Err(OntologyError::SupertypeCycle { .. })
        ));
    }

    #[test]
    fn descriptors_attach_to_declared_types_only() {
        let mut b = OntologyBuilder::new();
        b.add_type("ex:A", "A", &[])
            .add_descriptor("label", ValueKind::String)
            .attach_descriptor("ex:A", "label");
        let ontology = b.build().unwrap();
        let a = ontology.type_by_iri("ex:A").unwrap();
        assert_eq!(a.descriptors().len(), 1);

        let mut b = OntologyBuilder::new();
        b.add_descriptor("label", ValueKind::String)
            .attach_descriptor("ex:Ghost", "label");
        assert!(matches!(
            b.build(),
            Err(OntologyError::UnknownDescriptorTarget(_))
        ));
    }

    #[test]
    fn values_resolve_against_the_descriptor_universe() {
        let mut b = OntologyBuilder::new();
        b.add_type("ex:A", "A", &[])
            .add_descriptor("label", ValueKind::String)
            .add_individual("urn:x", "x", &["ex:A"])
            .add_value("urn:x", "label", "hello");
        let ontology = b.build().unwrap();
        let x = ontology.individual_by_uri("urn:x").unwrap();
        assert_eq!(x.values().len(), 1);
        assert_eq!(x.values()[0].lexical(), "hello");

        let mut b = OntologyBuilder::new();
        b.add_type("ex:A", "A", &[])
            .add_individual("urn:x", "x", &["ex:A"])
            .add_value("urn:x", "missing", "hello");
        assert!(matches!(
            b.build(),
            Err(OntologyError::UnknownValueDescriptor { .. })
        ));
    }

    #[test]
    fn values_on_undeclared_individuals_are_reported() {
        let mut b = OntologyBuilder::new();
        b.add_type("ex:A", "A", &[])
            .add_descriptor("label", ValueKind::String)
            .add_individual("urn:x", "x", &["ex:A"])
            .add_value("urn:typo", "label", "hello");
        match b.build() {
            Err(OntologyError::UnknownValueTarget(uri)) => assert_eq!(uri, "urn:typo"),
            other => panic!("expected UnknownValueTarget, got {other:?}"),
        }
    }

    #[test]
    fn declaration_order_does_not_matter_for_attachments() {
        let mut b = OntologyBuilder::new();
        // Attach and assert before the targets exist.
        b.add_descriptor("label", ValueKind::String)
            .attach_descriptor("ex:A", "label")
            .add_value("urn:x", "label", "hello")
            .add_type("ex:A", "A", &[])
            .add_individual("urn:x", "x", &["ex:A"]);
        let ontology = b.build().unwrap();
        let a = ontology.type_by_iri("ex:A").unwrap();
        assert_eq!(a.descriptors().len(), 1);
        let x = ontology.individual_by_uri("urn:x").unwrap();
        assert_eq!(x.values().len(), 1);
        assert_eq!(x.values()[0].lexical(), "hello");
    }
}
