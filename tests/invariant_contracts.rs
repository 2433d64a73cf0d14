//! Contract tests for the invariant log.
//!
//! Each test drives one operation and checks that the invariants it is
//! responsible for were asserted along the way.

#![cfg(feature = "ppt")]

use tonegraph::dsl::{constant, noise, sine, Patch};
use tonegraph::harness::TickHarness;
use tonegraph::invariant_ppt::{
    contract_test, EXPORT_STARTS_RESET, GRAPH_ACYCLIC, GRAPH_ARITY, PATCH_SHARES_IDENTICAL,
    PLAN_REACHABLE_ONCE, RESET_COMPLETE, TICK_SINGLE_ADVANCE, WAV_SIZES_CONSISTENT,
};
use tonegraph::sequence::RenderConfig;
use tonegraph::units::UnitExt;
use tonegraph::{Graph, NodeType};

#[test]
fn contract_graph_construction() {
    let mut graph = Graph::new();
    let a = graph.add_node(NodeType::Constant { value: 1.0 }, &[]).unwrap();
    graph.add_node(NodeType::Complement, &[a]).unwrap();
    contract_test("graph construction", &[GRAPH_ACYCLIC, GRAPH_ARITY]);
}

#[test]
fn contract_patch_compile() {
    let shared = sine(110.0.hz());
    Patch::compile(&(shared.clone() + shared)).unwrap();
    contract_test("patch compile", &[PATCH_SHARES_IDENTICAL, GRAPH_ARITY]);
}

#[test]
fn contract_export() {
    let mut patch = Patch::compile(&(noise() * 0.5)).unwrap();
    let count = patch.samples(100.0.hz(), 0.1.sec()).unwrap().count();
    assert_eq!(count, 10);
    contract_test(
        "export",
        &[RESET_COMPLETE, PLAN_REACHABLE_ONCE, EXPORT_STARTS_RESET],
    );
}

#[test]
fn contract_wav_encoding() {
    let config = RenderConfig::with_duration(0.01.sec());
    Patch::compile(&constant(0.1)).unwrap().to_wav(&config).unwrap();
    contract_test("wav encoding", &[WAV_SIZES_CONSISTENT]);
}

#[test]
fn contract_tick_harness() {
    let lfo = sine(2.0.hz());
    let mut harness = TickHarness::from_signal(&(lfo.clone() * lfo), 64.0.hz()).unwrap();
    harness.run(8).unwrap();
    contract_test("tick harness", &[TICK_SINGLE_ADVANCE, RESET_COMPLETE]);
}
