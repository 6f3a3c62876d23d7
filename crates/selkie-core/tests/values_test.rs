use std::sync::Arc;

use selkie_core::{Configuration, ValueActivation};
use selkie_ontology::{Ontology, ValueKind};

fn network_ontology() -> Arc<Ontology> {
    let mut b = Ontology::builder();
    b.add_type("ex:Entity", "Entity", &[])
        .add_type("ex:Device", "Device", &["ex:Entity"])
        .add_type("ex:Router", "Router", &["ex:Device"])
        .add_type("ex:Switch", "Switch", &["ex:Device"])
        .add_type("ex:Person", "Person", &["ex:Entity"])
        .add_descriptor("label", ValueKind::String)
        .add_descriptor("speed", ValueKind::Integer)
        .attach_descriptor("ex:Entity", "label")
        .attach_descriptor("ex:Device", "speed")
        .add_individual("urn:r1", "r1", &["ex:Router"])
        .add_individual("urn:r2", "r2", &["ex:Router"])
        .add_individual("urn:p1", "p1", &["ex:Person"]);
    Arc::new(b.build().unwrap())
}

fn config() -> Configuration {
    Configuration::new(network_ontology(), None).unwrap()
}

#[test]
fn all_descriptors_start_active() {
    let config = config();
    assert_eq!(
        config.value_activation("ex:Entity", "label").unwrap(),
        ValueActivation::Yes
    );
    assert_eq!(
        config.value_activation("ex:Router", "speed").unwrap(),
        ValueActivation::Yes
    );
    assert!(config.instance_displays_value("urn:p1", "label").unwrap());
}

#[test]
fn an_instance_displays_a_value_if_any_of_its_types_activates_it() {
    let mut config = config();
    // Deactivating on the supertype alone changes nothing for r1: Router and
    // Device still have "label" active.
    config.deactivate_value("ex:Entity", "label").unwrap();
    assert!(config.instance_displays_value("urn:r1", "label").unwrap());

    config.deactivate_value("ex:Device", "label").unwrap();
    assert!(config.instance_displays_value("urn:r1", "label").unwrap());

    config.deactivate_value("ex:Router", "label").unwrap();
    assert!(!config.instance_displays_value("urn:r1", "label").unwrap());
    // p1 is unaffected: Person still activates "label".
    assert!(config.instance_displays_value("urn:p1", "label").unwrap());
}

#[test]
fn aggregation_reports_partial_when_members_disagree() {
    let mut config = config();
    for iri in ["ex:Entity", "ex:Device", "ex:Router"] {
        config.deactivate_value(iri, "label").unwrap();
    }
    // Routers no longer display "label", p1 still does.
    assert_eq!(
        config.value_activation("ex:Entity", "label").unwrap(),
        ValueActivation::Partial
    );
    assert_eq!(
        config.value_activation("ex:Router", "label").unwrap(),
        ValueActivation::No
    );
    assert_eq!(
        config.value_activation("ex:Person", "label").unwrap(),
        ValueActivation::Yes
    );
}

#[test]
fn member_less_types_are_indefinite() {
    let config = config();
    assert_eq!(
        config.value_activation("ex:Switch", "speed").unwrap(),
        ValueActivation::Indefinite
    );
}

#[test]
fn activate_and_deactivate_all_toggle_the_whole_universe() {
    let mut config = config();
    config.deactivate_all_values("ex:Router").unwrap();
    assert_eq!(config.instance_type("ex:Router").unwrap().active_values().count(), 0);

    // Device and Entity still activate their descriptors, so the members
    // keep displaying them.
    assert_eq!(
        config.value_activation("ex:Router", "speed").unwrap(),
        ValueActivation::Yes
    );

    config.deactivate_all_values("ex:Device").unwrap();
    config.deactivate_all_values("ex:Entity").unwrap();
    assert_eq!(
        config.value_activation("ex:Router", "speed").unwrap(),
        ValueActivation::No
    );
    assert_eq!(
        config.value_activation("ex:Router", "label").unwrap(),
        ValueActivation::No
    );

    config.activate_all_values("ex:Router").unwrap();
    assert_eq!(
        config.value_activation("ex:Router", "speed").unwrap(),
        ValueActivation::Yes
    );
    assert_eq!(
        config
            .instance_type("ex:Router")
            .unwrap()
            .active_values()
            .count(),
        2
    );
}

#[test]
fn activation_is_idempotent() {
    let mut config = config();
    config.deactivate_value("ex:Router", "speed").unwrap();
    config.deactivate_value("ex:Router", "speed").unwrap();
    config.activate_value("ex:Router", "speed").unwrap();
    config.activate_value("ex:Router", "speed").unwrap();
    assert_eq!(
        config.value_activation("ex:Router", "speed").unwrap(),
        ValueActivation::Yes
    );
}
