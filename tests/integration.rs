/// Integration test suite — drives whole analyses through an in-memory heap.
///
/// `MockHeap` plays the heap-introspection collaborator: every object is a
/// named entry with a built-in kind and an ordered list of outgoing
/// references. Unknown names classify as plain objects with no references.
use std::collections::HashMap;

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};

use reach_graph::builder::introspect::{HeapIntrospector, OutgoingReference, ReferenceForm};
use reach_graph::export::{render_json, to_document};
use reach_graph::graph::{EdgeId, EdgeKind, ObjectKey, ObjectKinds, TupleMember};
use reach_graph::query::path::strong_chain;
use reach_graph::query::stats::graph_stats;
use reach_graph::{ReachConfig, ReachabilityGraph, TopDownGraphBuilder};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MockObject {
    built_in: String,
    refs: Vec<OutgoingReference<String>>,
    shadow: bool,
}

#[derive(Default)]
struct MockHeap {
    objects: HashMap<String, MockObject>,
}

impl MockHeap {
    fn new() -> Self {
        init_tracing();
        Self::default()
    }

    fn add(mut self, name: &str, built_in: &str, refs: Vec<OutgoingReference<String>>) -> Self {
        self.objects.insert(
            name.to_string(),
            MockObject {
                built_in: built_in.to_string(),
                refs,
                shadow: false,
            },
        );
        self
    }

    fn shadow(mut self, name: &str) -> Self {
        if let Some(object) = self.objects.get_mut(name) {
            object.shadow = true;
        }
        self
    }
}

impl HeapIntrospector for MockHeap {
    type Handle = String;

    fn classify(&self, handle: &String) -> anyhow::Result<ObjectKinds> {
        let built_in = self
            .objects
            .get(handle)
            .map(|o| o.built_in.as_str())
            .unwrap_or("Object");
        Ok(ObjectKinds::new(built_in, built_in))
    }

    fn references(&self, handle: &String) -> anyhow::Result<Vec<OutgoingReference<String>>> {
        Ok(self
            .objects
            .get(handle)
            .map(|o| o.refs.clone())
            .unwrap_or_default())
    }

    fn exclude_from_strong_set(&self, handle: &String) -> bool {
        self.objects.get(handle).is_some_and(|o| o.shadow)
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn s(name: &str) -> String {
    name.to_string()
}

fn prop(name: &str, value: &str) -> OutgoingReference<String> {
    OutgoingReference::strong(ReferenceForm::Property {
        name: s(name),
        value: s(value),
    })
}

fn weak_prop(name: &str, value: &str) -> OutgoingReference<String> {
    OutgoingReference::weak(ReferenceForm::Property {
        name: s(name),
        value: s(value),
    })
}

fn weak_target(target: &str) -> OutgoingReference<String> {
    OutgoingReference::strong(ReferenceForm::WeakTarget { target: s(target) })
}

fn map_entry(key: &str, value: &str, strong_key: bool, keys_held_weakly: bool) -> OutgoingReference<String> {
    OutgoingReference::strong(ReferenceForm::MapEntry {
        key: s(key),
        value: s(value),
        strong_key,
        keys_held_weakly,
    })
}

fn run(heap: &MockHeap, config: ReachConfig, held: &[&str]) -> ReachabilityGraph {
    let held: Vec<String> = held.iter().map(|h| s(h)).collect();
    TopDownGraphBuilder::new(heap, config).run(&s("target"), &held)
}

fn node_keys(graph: &ReachabilityGraph) -> Vec<u32> {
    graph.nodes().iter().map(|n| n.key.0).collect()
}

fn edge_between(graph: &ReachabilityGraph, from: u32, to: u32) -> &reach_graph::graph::ParentToChildEdge {
    graph
        .parent_to_child_edges()
        .iter()
        .find(|e| e.parent_key == ObjectKey(from) && e.child_key == ObjectKey(to))
        .unwrap_or_else(|| panic!("no edge {from} -> {to} in {:#?}", graph.parent_to_child_edges()))
}

fn owners_of(graph: &ReachabilityGraph, edge_id: EdgeId) -> Vec<u32> {
    graph
        .child_to_parent_edges()
        .iter()
        .find(|r| r.edge_id == edge_id)
        .map(|r| r.joint_owner_keys.iter().map(|k| k.0).collect())
        .expect("requirement for edge")
}

// ---------------------------------------------------------------------------
// Scenario A: weak handle held by the roots
// ---------------------------------------------------------------------------

fn weak_handle_heap() -> MockHeap {
    MockHeap::new().add("handle", "WeakRef", vec![weak_target("target")])
}

#[test]
fn test_weak_handle_strong_mode_keeps_only_roots() {
    let graph = run(&weak_handle_heap(), ReachConfig::strong_only(), &["handle"]);
    assert!(graph.succeeded());
    assert!(!graph.found_target());
    assert_eq!(node_keys(&graph), vec![1]);
    assert!(graph.parent_to_child_edges().is_empty());
}

#[test]
fn test_weak_handle_all_references_mode_finds_target() {
    let graph = run(&weak_handle_heap(), ReachConfig::all_references(), &["handle"]);
    assert!(graph.succeeded());
    assert!(graph.found_target());
    assert_eq!(node_keys(&graph), vec![0, 1, 2]);

    let roots_edge = edge_between(&graph, 1, 2);
    assert_eq!(roots_edge.kind, EdgeKind::ArrayIndex { index: 0 });
    assert!(!roots_edge.is_strong_owning);

    let target_edge = edge_between(&graph, 2, 0);
    assert_eq!(target_edge.kind, EdgeKind::WeakHandleTarget);
    assert!(!target_edge.is_strong_owning);
    assert_eq!(target_edge.kind.label(), "[[WeakRefTarget]]");
}

// ---------------------------------------------------------------------------
// Scenario B: weak handle to an object that strongly holds the target
// ---------------------------------------------------------------------------

fn indirect_handle_heap() -> MockHeap {
    MockHeap::new()
        .add("handle", "WeakRef", vec![weak_target("intermediate")])
        .add("intermediate", "Object", vec![prop("target", "target")])
}

#[test]
fn test_indirect_weak_handle_strong_mode_is_empty() {
    let graph = run(&indirect_handle_heap(), ReachConfig::strong_only(), &["handle"]);
    assert!(graph.succeeded());
    assert!(!graph.found_target());
    assert!(graph.parent_to_child_edges().is_empty());
    assert!(graph.child_to_parent_edges().is_empty());
    assert_eq!(node_keys(&graph), vec![1]);
}

#[test]
fn test_indirect_weak_handle_all_references_mode() {
    let graph = run(&indirect_handle_heap(), ReachConfig::all_references(), &["handle"]);
    assert!(graph.found_target());
    assert_eq!(node_keys(&graph), vec![0, 1, 2, 3]);
    assert!(!edge_between(&graph, 2, 3).is_strong_owning);
    let field = edge_between(&graph, 3, 0);
    assert!(field.is_strong_owning);
    assert_eq!(field.kind, EdgeKind::PropertyName { name: s("target") });

    assert_eq!(
        strong_chain(&graph),
        Some(vec![ObjectKey(1), ObjectKey(2), ObjectKey(3), ObjectKey(0)])
    );
    let stats = graph_stats(&graph);
    assert_eq!(stats.edge_count, 3);
    assert_eq!(stats.strong_edges, 1);
    assert_eq!(stats.weak_edges, 2);
    assert_eq!(stats.marked_strong, 3);
}

// ---------------------------------------------------------------------------
// Scenario C: keyed collection entries route through a tuple node
// ---------------------------------------------------------------------------

#[test]
fn test_collection_tuple_with_strong_key() {
    let heap = MockHeap::new().add("map", "Map", vec![map_entry("k", "target", true, false)]);
    let graph = run(&heap, ReachConfig::strong_only(), &["map"]);
    assert!(graph.found_target());

    // target 0, roots 1, map 2, key 3, tuple 4
    assert_eq!(node_keys(&graph), vec![0, 1, 2, 3, 4]);
    assert_eq!(graph.node(ObjectKey(4)).unwrap().built_in_kind, "Tuple");

    let to_tuple = edge_between(&graph, 2, 4);
    let to_key = edge_between(&graph, 4, 3);
    let to_value = edge_between(&graph, 4, 0);
    assert!(to_tuple.is_strong_owning && to_key.is_strong_owning && to_value.is_strong_owning);
    assert_eq!(
        to_value.kind,
        EdgeKind::CollectionValueTuple {
            member: TupleMember::Value
        }
    );
    assert_eq!(owners_of(&graph, to_value.edge_id), vec![4]);
    assert_eq!(owners_of(&graph, to_tuple.edge_id), vec![2]);

    let tuples = graph.collection_tuple_edges();
    assert_eq!(tuples.len(), 1);
    assert_eq!(tuples[0].collection_key, ObjectKey(2));
    assert_eq!(tuples[0].members.len(), 2);
}

#[test]
fn test_collection_tuple_with_weak_key() {
    let heap = MockHeap::new().add("map", "Map", vec![map_entry("k", "target", false, false)]);

    let graph = run(&heap, ReachConfig::all_references(), &["map"]);
    assert!(graph.found_target());
    assert!(!edge_between(&graph, 4, 3).is_strong_owning);
    let to_value = edge_between(&graph, 4, 0);
    assert!(to_value.is_strong_owning);
    assert_eq!(owners_of(&graph, to_value.edge_id), vec![4]);

    // Strong-only drops the key edge entirely; the value is still held.
    let graph = run(&heap, ReachConfig::strong_only(), &["map"]);
    assert!(graph.found_target());
    assert!(
        graph
            .parent_to_child_edges()
            .iter()
            .all(|e| e.kind != EdgeKind::CollectionKeyTuple { member: TupleMember::Key })
    );
}

#[test]
fn test_collection_tuple_unreachable_without_collection() {
    let heap = MockHeap::new()
        .add("map", "Map", vec![map_entry("k", "target", true, false)])
        .add("holder", "Object", vec![prop("key", "k")]);
    let graph = run(&heap, ReachConfig::strong_only(), &["holder"]);
    assert!(graph.succeeded());
    assert!(!graph.found_target());
}

// ---------------------------------------------------------------------------
// Joint ownership
// ---------------------------------------------------------------------------

#[test]
fn test_weak_keyed_entry_needs_collection_and_key() {
    let heap = MockHeap::new()
        .add("wm", "WeakMap", vec![map_entry("k", "target", false, true)])
        .add("keyholder", "Object", vec![prop("key", "k")]);

    assert!(!run(&heap, ReachConfig::strong_only(), &["wm"]).found_target());
    assert!(!run(&heap, ReachConfig::strong_only(), &["keyholder"]).found_target());

    let both = run(&heap, ReachConfig::strong_only(), &["wm", "keyholder"]);
    assert!(both.found_target());
    let reversed = run(&heap, ReachConfig::strong_only(), &["keyholder", "wm"]);
    assert!(reversed.found_target());
    assert_eq!(both.nodes().len(), reversed.nodes().len());
    assert_eq!(
        both.parent_to_child_edges().len(),
        reversed.parent_to_child_edges().len()
    );
}

fn weak_set_heap() -> MockHeap {
    MockHeap::new()
        .add(
            "ws",
            "WeakSet",
            vec![OutgoingReference::strong(ReferenceForm::SetEntry {
                element: s("member"),
                held_weakly: true,
            })],
        )
        .add("holder", "Object", vec![prop("member", "member")])
}

/// Whether the weak set's entry tuple resolved, observed through the step API.
fn set_entry_resolved(heap: &MockHeap, config: ReachConfig, held: &[&str]) -> bool {
    let held: Vec<String> = held.iter().map(|h| s(h)).collect();
    let mut builder = TopDownGraphBuilder::new(heap, config);
    builder.discover(&s("target"), &held).unwrap();
    builder.resolve().unwrap();
    builder
        .registry()
        .nodes()
        .iter()
        .find(|n| n.derived_kind == "SetElement")
        .is_some_and(|n| builder.store().resolver().is_resolved(n.key))
}

#[test]
fn test_weak_set_entry_needs_set_and_element() {
    let heap = weak_set_heap();
    assert!(!set_entry_resolved(&heap, ReachConfig::strong_only(), &["ws"]));
    assert!(!set_entry_resolved(&heap, ReachConfig::strong_only(), &["holder"]));
    assert!(set_entry_resolved(&heap, ReachConfig::strong_only(), &["ws", "holder"]));
    assert!(set_entry_resolved(&heap, ReachConfig::strong_only(), &["holder", "ws"]));
}

#[test]
fn test_weak_set_does_not_keep_its_element() {
    let heap = MockHeap::new().add(
        "ws",
        "WeakSet",
        vec![OutgoingReference::strong(ReferenceForm::SetEntry {
            element: s("target"),
            held_weakly: true,
        })],
    );
    assert!(!run(&heap, ReachConfig::strong_only(), &["ws"]).found_target());
    assert!(!run(&heap, ReachConfig::all_references(), &["ws"]).found_target());
}

#[test]
fn test_weak_set_element_member_edge_per_mode() {
    let heap = weak_set_heap();
    let element_edges = |config: ReachConfig| {
        let held = vec![s("ws"), s("holder")];
        let mut builder = TopDownGraphBuilder::new(&heap, config);
        builder.discover(&s("target"), &held).unwrap();
        builder
            .store()
            .parent_to_child_edges()
            .iter()
            .filter(|e| {
                e.kind
                    == EdgeKind::SetElement {
                        member: TupleMember::Element,
                    }
            })
            .map(|e| e.is_strong_owning)
            .collect::<Vec<bool>>()
    };
    assert!(element_edges(ReachConfig::strong_only()).is_empty());
    assert_eq!(element_edges(ReachConfig::all_references()), vec![false]);
}

#[test]
fn test_finalization_payload_needs_registry_and_watched() {
    let heap = MockHeap::new()
        .add(
            "registry",
            "FinalizationRegistry",
            vec![OutgoingReference::strong(ReferenceForm::Finalization {
                watched: s("watched"),
                held_value: s("target"),
                unregister_token: Some(s("token")),
            })],
        )
        .add("owner", "Object", vec![prop("w", "watched")]);

    assert!(!run(&heap, ReachConfig::strong_only(), &["registry"]).found_target());

    let graph = run(&heap, ReachConfig::strong_only(), &["registry", "owner"]);
    assert!(graph.found_target());
    let tuple = &graph.collection_tuple_edges()[0];
    // Weak members are not discovered in strong-only mode.
    assert_eq!(tuple.members.len(), 1);
    assert_eq!(tuple.members[0].member, TupleMember::HeldValue);

    let graph = run(&heap, ReachConfig::all_references(), &["registry", "owner"]);
    let members: Vec<TupleMember> = graph.collection_tuple_edges()[0]
        .members
        .iter()
        .map(|m| m.member)
        .collect();
    assert_eq!(
        members,
        vec![
            TupleMember::Watched,
            TupleMember::HeldValue,
            TupleMember::UnregisterToken
        ]
    );
}

#[test]
fn test_symbol_keyed_property_keeps_key_in_provenance() {
    let heap = MockHeap::new().add(
        "obj",
        "Object",
        vec![OutgoingReference::strong(ReferenceForm::SymbolKeyed {
            key: s("sym"),
            description: s("secret"),
            value: s("target"),
        })],
    );
    let graph = run(&heap, ReachConfig::strong_only(), &["obj"]);
    assert!(graph.found_target());
    // target 0, roots 1, obj 2, sym 3
    let key_edge = edge_between(&graph, 2, 3);
    assert_eq!(key_edge.kind.name(), "SymbolAsKey");
    let value_edge = edge_between(&graph, 2, 0);
    assert_eq!(value_edge.kind.label(), "Symbol(secret)");
    assert_eq!(owners_of(&graph, value_edge.edge_id), vec![2, 3]);
}

#[test]
fn test_private_field_and_scope_and_slot() {
    let heap = MockHeap::new()
        .add(
            "closure",
            "Function",
            vec![OutgoingReference::strong(ReferenceForm::Scope {
                name: s("instance"),
                value: s("instance"),
            })],
        )
        .add(
            "instance",
            "Object",
            vec![OutgoingReference::strong(ReferenceForm::PrivateField {
                name_key: s("#inner"),
                name: s("inner"),
                value: s("bound"),
            })],
        )
        .add(
            "bound",
            "Function",
            vec![OutgoingReference::strong(ReferenceForm::InternalSlot {
                slot: s("BoundThis"),
                value: s("target"),
            })],
        );
    let graph = run(&heap, ReachConfig::strong_only(), &["closure"]);
    assert!(graph.found_target());
    let labels: Vec<String> = graph
        .parent_to_child_edges()
        .iter()
        .map(|e| e.kind.label())
        .collect();
    assert_eq!(labels, vec!["0", "instance", "#inner key", "#inner", "[[BoundThis]]"]);
}

#[test]
fn test_distinct_symbols_with_same_description_hold_one_value() {
    let symbol_ref = |key: &str| {
        OutgoingReference::strong(ReferenceForm::SymbolKeyed {
            key: s(key),
            description: String::new(),
            value: s("target"),
        })
    };
    let heap = MockHeap::new().add(
        "obj",
        "Object",
        vec![symbol_ref("sym1"), symbol_ref("sym2")],
    );
    let graph = run(&heap, ReachConfig::strong_only(), &["obj"]);
    assert!(graph.succeeded(), "{:?}", graph.error());
    assert!(graph.found_target());

    // target 0, roots 1, obj 2, sym1 3, sym2 4
    let value_edges: Vec<_> = graph
        .parent_to_child_edges()
        .iter()
        .filter(|e| e.kind.name() == "PropertySymbol")
        .collect();
    assert_eq!(value_edges.len(), 2);
    assert!(value_edges.iter().all(|e| e.kind.label() == "Symbol()"));
    let owners: Vec<Vec<u32>> = value_edges
        .iter()
        .map(|e| owners_of(&graph, e.edge_id))
        .collect();
    assert_eq!(owners, vec![vec![2, 3], vec![2, 4]]);
}

#[test]
fn test_same_private_name_from_two_classes() {
    let field = |name_key: &str| {
        OutgoingReference::strong(ReferenceForm::PrivateField {
            name_key: s(name_key),
            name: s("x"),
            value: s("target"),
        })
    };
    let heap = MockHeap::new().add(
        "instance",
        "Object",
        vec![field("Base#x"), field("Derived#x")],
    );
    let graph = run(&heap, ReachConfig::strong_only(), &["instance"]);
    assert!(graph.succeeded(), "{:?}", graph.error());
    assert!(graph.found_target());

    let labels: Vec<String> = graph
        .parent_to_child_edges()
        .iter()
        .map(|e| e.kind.label())
        .collect();
    assert_eq!(labels, vec!["0", "#x key", "#x", "#x key", "#x"]);
    let value_owners: Vec<Vec<u32>> = graph
        .parent_to_child_edges()
        .iter()
        .filter(|e| e.child_key == ObjectKey::TARGET)
        .map(|e| owners_of(&graph, e.edge_id))
        .collect();
    assert_eq!(value_owners, vec![vec![2, 3], vec![2, 4]]);
}

#[test]
fn test_same_symbol_reported_twice_is_rejected() {
    let symbol_ref = OutgoingReference::strong(ReferenceForm::SymbolKeyed {
        key: s("sym"),
        description: s("tag"),
        value: s("target"),
    });
    let heap = MockHeap::new().add("obj", "Object", vec![symbol_ref.clone(), symbol_ref]);
    let graph = run(&heap, ReachConfig::strong_only(), &["obj"]);
    assert!(!graph.succeeded());
    assert_eq!(graph.error().map(|e| e.code()), Some("DUPLICATE_DEFINITION"));
}

// ---------------------------------------------------------------------------
// Strong set and exclusions
// ---------------------------------------------------------------------------

#[test]
fn test_shadow_propagates_but_is_not_reported_strong() {
    let heap = MockHeap::new()
        .add("shadow", "Proxy", vec![prop("real", "target")])
        .shadow("shadow");
    let graph = run(&heap, ReachConfig::strong_only(), &["shadow"]);
    assert!(graph.found_target());
    assert_eq!(graph.strong_keys(), &[ObjectKey::TARGET]);
}

#[test]
fn test_unreachable_target_is_a_successful_run() {
    let heap = MockHeap::new().add("a", "Object", vec![prop("b", "b")]);
    let graph = run(&heap, ReachConfig::strong_only(), &["a"]);
    assert!(graph.succeeded());
    assert!(graph.error().is_none());
    assert!(!graph.found_target());
    assert_eq!(strong_chain(&graph), None);
    assert_eq!(graph.strong_keys(), &[ObjectKey(2), ObjectKey(3)]);
}

#[test]
fn test_provenance_excludes_unrelated_branches() {
    let heap = MockHeap::new()
        .add("a", "Object", vec![prop("noise", "n1"), prop("t", "target")])
        .add("n1", "Object", vec![prop("more", "n2")]);
    let graph = run(&heap, ReachConfig::strong_only(), &["a"]);
    assert!(graph.found_target());
    // a is key 2; n1 and n2 are discovered but not part of the proof.
    assert_eq!(node_keys(&graph), vec![0, 1, 2]);
    assert_eq!(graph.parent_to_child_edges().len(), 2);
}

// ---------------------------------------------------------------------------
// Determinism and isolation
// ---------------------------------------------------------------------------

fn busy_heap() -> MockHeap {
    MockHeap::new()
        .add("a", "Array", vec![
            OutgoingReference::strong(ReferenceForm::Index { index: 0, value: s("b") }),
            OutgoingReference::strong(ReferenceForm::Index { index: 1, value: s("wm") }),
        ])
        .add("b", "Object", vec![prop("self", "a"), weak_prop("cache", "c")])
        .add("wm", "WeakMap", vec![map_entry("b", "c", false, true)])
        .add("c", "Set", vec![OutgoingReference::strong(ReferenceForm::SetEntry {
            element: s("target"),
            held_weakly: false,
        })])
}

#[test]
fn test_runs_are_deterministic() {
    for config in [ReachConfig::strong_only(), ReachConfig::all_references()] {
        let heap = busy_heap();
        let first = render_json(&run(&heap, config, &["a"])).unwrap();
        let second = render_json(&run(&heap, config, &["a"])).unwrap();
        assert_eq!(first, second);
        assert!(to_document(&run(&heap, config, &["a"])).found_target);
    }
}

#[test]
fn test_independent_builders_do_not_share_counters() {
    let heap_one = busy_heap();
    let heap_two = indirect_handle_heap();
    let mut one = TopDownGraphBuilder::new(&heap_one, ReachConfig::strong_only());
    let mut two = TopDownGraphBuilder::new(&heap_two, ReachConfig::all_references());
    one.discover(&s("target"), &[s("a")]).unwrap();
    two.discover(&s("target"), &[s("handle")]).unwrap();
    assert_eq!(two.registry().lookup_key(&s("handle")), Some(ObjectKey(2)));
    assert_eq!(two.store().parent_to_child_edges()[0].edge_id, EdgeId(0));
    one.resolve().unwrap();
    two.resolve().unwrap();
    assert!(one.finish().unwrap().found_target());
    assert!(two.finish().unwrap().found_target());
}

#[test]
fn test_document_shape() {
    let graph = run(&indirect_handle_heap(), ReachConfig::all_references(), &["handle"]);
    let json = render_json(&graph).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["foundTarget"], true);
    assert_eq!(value["succeeded"], true);
    assert_eq!(value["nodes"][0]["key"], 0);
    let first_edge = &value["edges"][0];
    assert_eq!(first_edge["from"], 1);
    assert_eq!(first_edge["to"], 2);
    assert_eq!(first_edge["label"], "0");
    assert_eq!(first_edge["edgeKind"], "ArrayIndex");
    assert_eq!(first_edge["metadata"]["isMarkedStrong"], true);
    assert_eq!(first_edge["metadata"]["jointOwnerKeys"], serde_json::json!([1]));
}

// ---------------------------------------------------------------------------
// Oracle: strong-only results agree with plain graph reachability
// ---------------------------------------------------------------------------

/// Small deterministic generator so the heaps are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound
    }
}

#[test]
fn test_strong_only_matches_path_search() {
    let mut rng = Lcg(42);
    for round in 0..40 {
        let names: Vec<String> = (0..8).map(|i| format!("o{i}")).chain([s("target")]).collect();
        let mut heap = MockHeap::new();
        let mut oracle: DiGraph<(), ()> = DiGraph::new();
        let index: Vec<NodeIndex> = names.iter().map(|_| oracle.add_node(())).collect();
        let roots = oracle.add_node(());

        for (from, name) in names.iter().enumerate().take(8) {
            let mut refs = Vec::new();
            for slot in 0..rng.next(4) {
                let to = rng.next(names.len() as u64) as usize;
                let strong = rng.next(3) != 0;
                let reference = if strong {
                    prop(&format!("p{slot}"), &names[to])
                } else {
                    weak_prop(&format!("p{slot}"), &names[to])
                };
                if strong {
                    oracle.add_edge(index[from], index[to], ());
                }
                refs.push(reference);
            }
            heap = heap.add(name, "Object", refs);
        }

        let held: Vec<&str> = ["o0", "o1"].into_iter().take(1 + (round % 2)).collect();
        for h in &held {
            let i = names.iter().position(|n| n == h).unwrap();
            oracle.add_edge(roots, index[i], ());
        }

        let graph = run(&heap, ReachConfig::strong_only(), &held);
        let expected = has_path_connecting(&oracle, roots, index[8], None);
        assert!(graph.succeeded(), "round {round}: {:?}", graph.error());
        assert_eq!(graph.found_target(), expected, "round {round}");
        assert_eq!(strong_chain(&graph).is_some(), expected, "round {round}");
    }
}
