use std::sync::Arc;

use selkie_core::{
    ArrowShape, Color, ConfigDocument, Configuration, Error, Icon, IconError, IconSource, Mark,
    PositionHandler, RelationStyle, Stroke,
};
use selkie_ontology::{Ontology, ValueKind};

fn network_ontology() -> Arc<Ontology> {
    let mut b = Ontology::builder();
    b.add_type("ex:Entity", "Entity", &[])
        .add_type("ex:Device", "Device", &["ex:Entity"])
        .add_type("ex:Interface", "Interface", &["ex:Entity"])
        .add_descriptor("label", ValueKind::String)
        .attach_descriptor("ex:Entity", "label")
        .add_individual("urn:d1", "d1", &["ex:Device"])
        .add_individual("urn:d2", "d2", &["ex:Device"])
        .add_individual("urn:if1", "if1", &["ex:Interface"])
        .add_relation_kind("ex:connectsTo", "connects to")
        .add_relation("urn:rel1", "ex:connectsTo", "urn:d1", "urn:if1")
        .add_relation("urn:rel2", "ex:connectsTo", "urn:if1", "urn:d2");
    Arc::new(b.build().unwrap())
}

struct FixedIcons;

impl IconSource for FixedIcons {
    fn default_icon(&self, type_iri: &str) -> Result<Icon, IconError> {
        Ok(Icon::new(format!("default/{type_iri}")))
    }
}

fn customized(ontology: &Arc<Ontology>) -> Configuration {
    let mut config = Configuration::new(Arc::clone(ontology), Some(&FixedIcons)).unwrap();
    config.show_instance("urn:d1").unwrap();
    config.show_instance("urn:if1").unwrap();
    config.hide_instance("urn:d1").unwrap();
    config.move_instance_to("urn:d2", 40.0, 50.0).unwrap();
    config
        .mark_instance("urn:d2", Mark::color(Color::rgb(255, 0, 0)))
        .unwrap();
    config.create_group("core", &["urn:d1", "urn:d2"]).unwrap();
    config
        .set_group_mark("core", Mark::color(Color::rgb(0, 0, 255)))
        .unwrap();
    config
        .set_relation_type_style(
            "ex:connectsTo",
            RelationStyle {
                stroke: Some(Stroke::Dashed),
                arrow: Some(ArrowShape::Open),
                ..RelationStyle::default()
            },
        )
        .unwrap();
    config.hide_relation_type("ex:connectsTo").unwrap();
    config
        .set_instance_type_icon("ex:Device", Some(Icon::new("router.svg")))
        .unwrap();
    config.deactivate_value("ex:Interface", "label").unwrap();
    let handler = config.register_position_handler(PositionHandler::interface(10));
    config.set_position_handler("ex:Interface", handler).unwrap();
    config.set_relation_depth(2).unwrap();
    config.set_max_parallel_relations(3).unwrap();
    config
}

#[test]
fn export_then_apply_reproduces_the_configuration() {
    let ontology = network_ontology();
    let original = customized(&ontology);
    let document = original.export_document();

    let mut fresh = Configuration::new(Arc::clone(&ontology), Some(&FixedIcons)).unwrap();
    assert_ne!(fresh, original);
    fresh.apply_document(&document).unwrap();
    assert_eq!(fresh, original);
}

#[test]
fn the_document_survives_a_json_round_trip() {
    let ontology = network_ontology();
    let original = customized(&ontology);
    let document = original.export_document();

    let json = serde_json::to_string_pretty(&document).unwrap();
    let parsed: ConfigDocument = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, document);

    let mut fresh = Configuration::new(Arc::clone(&ontology), Some(&FixedIcons)).unwrap();
    fresh.apply_document(&parsed).unwrap();
    assert_eq!(fresh, original);
}

#[test]
fn a_document_with_unknown_identifiers_is_rejected_atomically() {
    let ontology = network_ontology();
    let original = customized(&ontology);
    let mut document = original.export_document();
    document.visible_instances.push("urn:missing".to_string());

    let mut fresh = Configuration::new(Arc::clone(&ontology), Some(&FixedIcons)).unwrap();
    let before = fresh.clone();
    assert!(matches!(
        fresh.apply_document(&document),
        Err(Error::UnknownInstance { .. })
    ));
    assert_eq!(fresh, before);
}

#[test]
fn an_illegal_handler_assignment_rejects_the_document() {
    let ontology = network_ontology();
    let mut config = Configuration::new(Arc::clone(&ontology), None).unwrap();
    let mut document = config.export_document();
    // ex:Device members have no incoming relations at all on d1, and two
    // incoming would be just as illegal; either way the gate rejects it.
    document.handlers.push(PositionHandler::interface(10));
    for assignment in &mut document.handler_assignments {
        if assignment.type_iri == "ex:Device" {
            assignment.handler = document.handlers.len() - 1;
        }
    }
    assert!(matches!(
        config.apply_document(&document),
        Err(Error::IllegalHandlerAssignment { .. })
    ));
}

#[test]
fn exported_documents_list_only_meaningful_entries() {
    let ontology = network_ontology();
    let config = Configuration::new(Arc::clone(&ontology), None).unwrap();
    let document = config.export_document();
    assert!(document.visible_instances.is_empty());
    assert!(document.hidden_instances.is_empty());
    assert!(document.position_overrides.is_empty());
    assert!(document.marks.is_empty());
    assert!(document.groups.is_empty());
    assert!(document.hidden_relation_types.is_empty());
    // Per-type tables are exhaustive by design.
    assert_eq!(document.icons.len(), 3);
    assert_eq!(document.active_values.len(), 3);
    assert_eq!(document.handler_assignments.len(), 3);
    assert_eq!(document.handlers, vec![PositionHandler::stored()]);
}
