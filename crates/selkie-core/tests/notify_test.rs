use std::sync::{Arc, Mutex};

use selkie_core::{
    ChangeEvent, ChangeListener, Color, Configuration, Icon, Mark, PositionHandler,
    RecordingListener, RelationStyle, Stroke,
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

fn listening_config() -> (Configuration, RecordingListener) {
    let mut config = Configuration::new(network_ontology(), None).unwrap();
    let listener = RecordingListener::new();
    config.add_listener(Box::new(listener.clone()));
    (config, listener)
}

fn instance(uri: &str) -> ChangeEvent {
    ChangeEvent::Instance(uri.to_string())
}

fn relation(uri: &str) -> ChangeEvent {
    ChangeEvent::Relation(uri.to_string())
}

#[test]
fn showing_an_instance_notifies_it_and_the_relations_that_flip() {
    let (mut config, listener) = listening_config();
    config.show_instance("urn:d1").unwrap();
    // No relation flips: if1 is still hidden.
    assert_eq!(listener.take(), vec![instance("urn:d1")]);

    config.show_instance("urn:if1").unwrap();
    // rel1 becomes visible together with if1; rel2 still waits for d2.
    assert_eq!(
        listener.take(),
        vec![instance("urn:if1"), relation("urn:rel1")]
    );

    config.hide_instance("urn:if1").unwrap();
    assert_eq!(
        listener.take(),
        vec![instance("urn:if1"), relation("urn:rel1")]
    );
}

#[test]
fn no_op_mutations_fire_nothing() {
    let (mut config, listener) = listening_config();
    config.hide_instance("urn:d1").unwrap();
    config.unmark_instance("urn:d1", Mark::color(Color::rgb(1, 1, 1))).unwrap();
    config.show_all_relations().unwrap();
    config
        .set_relation_type_style("ex:connectsTo", RelationStyle::default())
        .unwrap();
    config.set_relation_depth(config.relation_depth() as i32).unwrap();
    config.activate_all_values("ex:Entity").unwrap();
    assert!(listener.is_empty());

    config.mark_instance("urn:d1", Mark::color(Color::rgb(1, 1, 1))).unwrap();
    listener.take();
    // Re-applying the trailing mark is a no-op.
    config.mark_instance("urn:d1", Mark::color(Color::rgb(1, 1, 1))).unwrap();
    assert!(listener.is_empty());
}

#[test]
fn rejected_operations_fire_nothing() {
    let (mut config, listener) = listening_config();
    config.set_relation_depth(-3).unwrap_err();
    config.show_instance("urn:missing").unwrap_err();
    config.set_group_mark("missing", Mark::default()).unwrap_err();
    assert!(listener.is_empty());
}

#[test]
fn clear_instance_always_fires_the_repaint_touch() {
    let (mut config, listener) = listening_config();
    // No marks at all, yet the touch still notifies.
    config.clear_instance("urn:d1").unwrap();
    assert_eq!(listener.take(), vec![instance("urn:d1")]);
}

#[test]
fn bulk_operations_fire_a_single_full_change() {
    let (mut config, listener) = listening_config();

    config.show_instance_type("ex:Entity").unwrap();
    assert_eq!(listener.take(), vec![ChangeEvent::Full]);
    // Everything is already visible: idempotent, silent.
    config.show_instance_type("ex:Entity").unwrap();
    assert!(listener.is_empty());

    config.hide_all_relations().unwrap();
    assert_eq!(listener.take(), vec![ChangeEvent::Full]);

    config.set_relation_depth(7).unwrap();
    assert_eq!(listener.take(), vec![ChangeEvent::Full]);

    config.restore_standard_alignment();
    assert_eq!(listener.take(), vec![ChangeEvent::Full]);

    config.restore_standard_view();
    assert_eq!(listener.take(), vec![ChangeEvent::Full]);
}

#[test]
fn handler_assignment_fires_a_full_change() {
    let (mut config, listener) = listening_config();
    let handler = config.register_position_handler(PositionHandler::interface(10));
    config.set_position_handler("ex:Interface", handler).unwrap();
    assert_eq!(listener.take(), vec![ChangeEvent::Full]);
    // Assigning the same handler again is silent.
    config.set_position_handler("ex:Interface", handler).unwrap();
    assert!(listener.is_empty());
}

#[test]
fn type_level_changes_notify_every_member() {
    let (mut config, listener) = listening_config();

    config
        .set_instance_type_icon("ex:Device", Some(Icon::new("router.svg")))
        .unwrap();
    assert_eq!(
        listener.take(),
        vec![instance("urn:d1"), instance("urn:d2")]
    );

    config.deactivate_value("ex:Device", "label").unwrap();
    assert_eq!(
        listener.take(),
        vec![instance("urn:d1"), instance("urn:d2")]
    );
}

#[test]
fn relation_type_changes_notify_every_member_relation() {
    let (mut config, listener) = listening_config();
    config
        .set_relation_type_style(
            "ex:connectsTo",
            RelationStyle {
                stroke: Some(Stroke::Dashed),
                ..RelationStyle::default()
            },
        )
        .unwrap();
    assert_eq!(
        listener.take(),
        vec![relation("urn:rel1"), relation("urn:rel2")]
    );

    config.hide_relation_type("ex:connectsTo").unwrap();
    assert_eq!(
        listener.take(),
        vec![relation("urn:rel1"), relation("urn:rel2")]
    );
}

#[test]
fn group_changes_notify_the_touched_members() {
    let (mut config, listener) = listening_config();
    config.create_group("g", &["urn:d1", "urn:d2"]).unwrap();
    assert_eq!(
        listener.take(),
        vec![instance("urn:d1"), instance("urn:d2")]
    );

    config.set_group_mark("g", Mark::color(Color::rgb(7, 7, 7))).unwrap();
    assert_eq!(
        listener.take(),
        vec![instance("urn:d1"), instance("urn:d2")]
    );

    config.remove_from_group("g", "urn:d2").unwrap();
    assert_eq!(listener.take(), vec![instance("urn:d2")]);

    config.delete_group("g").unwrap();
    assert_eq!(listener.take(), vec![instance("urn:d1")]);
}

/// Appends a tag to a shared log on any event.
struct TaggedListener {
    tag: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl ChangeListener for TaggedListener {
    fn on_full_change(&self) {
        self.log.lock().unwrap().push(self.tag);
    }

    fn on_instance_change(&self, _uri: &str) {
        self.log.lock().unwrap().push(self.tag);
    }
}

#[test]
fn listeners_are_invoked_in_registration_order() {
    let mut config = Configuration::new(network_ontology(), None).unwrap();
    let log: Arc<Mutex<Vec<&'static str>>> = Arc::default();
    config.add_listener(Box::new(TaggedListener {
        tag: "first",
        log: Arc::clone(&log),
    }));
    config.add_listener(Box::new(TaggedListener {
        tag: "second",
        log: Arc::clone(&log),
    }));

    config.show_instance("urn:d1").unwrap();
    config.show_instance_type("ex:Entity").unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        vec!["first", "second", "first", "second"]
    );
}
