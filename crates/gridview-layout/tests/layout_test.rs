use gridview_layout::{
    LayoutConfig, LayoutEdge, LayoutInputError, LayoutNode, Point, RankDir, layout,
};
use std::collections::BTreeMap;

fn gateway(id: &str) -> LayoutNode {
    LayoutNode::new(id, 288.0, 168.0).root()
}

fn worker(id: &str) -> LayoutNode {
    LayoutNode::new(id, 256.0, 140.0)
}

fn edge(v: &str, w: &str) -> LayoutEdge {
    LayoutEdge::new(v, w)
}

fn no_fixed() -> BTreeMap<String, Point> {
    BTreeMap::new()
}

fn overlaps(a: Point, a_size: (f64, f64), b: Point, b_size: (f64, f64)) -> bool {
    a.x < b.x + b_size.0 && b.x < a.x + a_size.0 && a.y < b.y + b_size.1 && b.y < a.y + a_size.1
}

#[test]
fn layout_places_a_single_gateway_at_the_margin() {
    let out = layout(&[gateway("gw")], &[], &no_fixed(), &LayoutConfig::default());
    assert_eq!(out.positions["gw"], Point::new(40.0, 40.0));
    assert_eq!(out.ranks["gw"], 0);
    assert_eq!(out.overflow_rank, None);
}

#[test]
fn layout_ranks_follow_directed_distance_from_the_gateway() {
    let nodes = [gateway("G"), worker("W1"), worker("W2"), worker("R")];
    let edges = [edge("G", "W1"), edge("G", "W2"), edge("W1", "R")];
    let out = layout(&nodes, &edges, &no_fixed(), &LayoutConfig::default());

    assert!(out.ranks["G"] < out.ranks["W1"]);
    assert_eq!(out.ranks["W1"], out.ranks["W2"]);
    assert!(out.ranks["W2"] < out.ranks["R"]);
    assert!(out.positions["G"].x < out.positions["W1"].x);
    assert_eq!(out.positions["W1"].x, out.positions["W2"].x);
    assert!(out.positions["W1"].x < out.positions["R"].x);
}

#[test]
fn layout_uses_the_longest_path_for_multi_hop_nodes() {
    let nodes = [gateway("G"), worker("W"), worker("R")];
    let edges = [edge("G", "R"), edge("G", "W"), edge("W", "R")];
    let out = layout(&nodes, &edges, &no_fixed(), &LayoutConfig::default());
    assert_eq!(out.ranks["R"], 2);
}

#[test]
fn layout_stacks_a_rank_and_centers_it_against_the_tallest_one() {
    let nodes = [gateway("G"), worker("W1"), worker("W2")];
    let edges = [edge("G", "W1"), edge("G", "W2")];
    let out = layout(&nodes, &edges, &no_fixed(), &LayoutConfig::default());

    // Rank 1 stack: 140 + 60 + 140 = 340; the gateway (168 tall) is centered against it.
    assert_eq!(out.positions["G"], Point::new(40.0, 126.0));
    // Rank 1 column starts after the gateway column (288) plus rank_sep (150).
    assert_eq!(out.positions["W1"], Point::new(478.0, 40.0));
    assert_eq!(out.positions["W2"], Point::new(478.0, 240.0));
}

#[test]
fn layout_is_deterministic() {
    let nodes = [
        gateway("G"),
        worker("W1"),
        worker("W2"),
        worker("W3"),
        worker("R1"),
        worker("R2"),
        worker("lonely"),
    ];
    let edges = [
        edge("G", "W1"),
        edge("G", "W2"),
        edge("G", "W3"),
        edge("W3", "R1"),
        edge("W1", "R2"),
        edge("W2", "R1"),
    ];
    let mut fixed = BTreeMap::new();
    fixed.insert("W2".to_string(), Point::new(478.0, 40.0));

    let a = layout(&nodes, &edges, &fixed, &LayoutConfig::default());
    let b = layout(&nodes, &edges, &fixed, &LayoutConfig::default());
    assert_eq!(a, b);
    for (id, p) in &a.positions {
        let q = b.positions[id];
        assert_eq!(p.x.to_bits(), q.x.to_bits());
        assert_eq!(p.y.to_bits(), q.y.to_bits());
    }
}

#[test]
fn layout_keeps_fixed_positions_exactly() {
    let nodes = [gateway("G"), worker("W1"), worker("W2")];
    let edges = [edge("G", "W1"), edge("G", "W2")];
    let mut fixed = BTreeMap::new();
    fixed.insert("W1".to_string(), Point::new(500.0, 500.0));

    let out = layout(&nodes, &edges, &fixed, &LayoutConfig::default());
    assert_eq!(out.positions["W1"], Point::new(500.0, 500.0));
    assert_eq!(out.positions["W2"], Point::new(478.0, 240.0));
    assert_eq!(out.positions.len(), 3);
}

#[test]
fn layout_pushes_free_nodes_off_fixed_boxes_within_their_rank() {
    let nodes = [gateway("G"), worker("W1"), worker("W2")];
    let edges = [edge("G", "W1"), edge("G", "W2")];
    // Park W2 exactly where W1 would be computed.
    let mut fixed = BTreeMap::new();
    fixed.insert("W2".to_string(), Point::new(478.0, 40.0));

    let out = layout(&nodes, &edges, &fixed, &LayoutConfig::default());
    assert_eq!(out.positions["W2"], Point::new(478.0, 40.0));
    assert_eq!(out.positions["W1"], Point::new(478.0, 240.0));
    assert!(!overlaps(
        out.positions["W1"],
        (256.0, 140.0),
        out.positions["W2"],
        (256.0, 140.0)
    ));
}

#[test]
fn layout_push_terminates_with_a_negative_node_sep() {
    let nodes = [gateway("G"), worker("W1"), worker("W2")];
    let edges = [edge("G", "W1"), edge("G", "W2")];
    let mut fixed = BTreeMap::new();
    fixed.insert("W2".to_string(), Point::new(478.0, 40.0));
    let config = LayoutConfig {
        node_sep: -10.0,
        ..Default::default()
    };

    let out = layout(&nodes, &edges, &fixed, &config);
    assert_eq!(out.positions["W2"], Point::new(478.0, 40.0));
    assert_eq!(out.positions["W1"], Point::new(478.0, 180.0));
    assert!(!overlaps(
        out.positions["W1"],
        (256.0, 140.0),
        out.positions["W2"],
        (256.0, 140.0)
    ));
}

#[test]
fn layout_puts_disconnected_nodes_in_an_overflow_rank_ordered_by_id() {
    let nodes = [gateway("G"), worker("W1"), worker("zeta"), worker("alpha")];
    let edges = [edge("G", "W1")];
    let out = layout(&nodes, &edges, &no_fixed(), &LayoutConfig::default());

    assert_eq!(out.overflow_rank, Some(2));
    assert_eq!(out.ranks["alpha"], 2);
    assert_eq!(out.ranks["zeta"], 2);
    assert!(out.positions["alpha"].y < out.positions["zeta"].y);
    assert_eq!(out.positions["alpha"].x, out.positions["zeta"].x);
    assert!(out.positions["alpha"].x > out.positions["W1"].x);
}

#[test]
fn layout_without_roots_puts_everything_in_rank_zero_overflow() {
    let nodes = [worker("b"), worker("a")];
    let edges = [edge("b", "a")];
    let out = layout(&nodes, &edges, &no_fixed(), &LayoutConfig::default());
    assert_eq!(out.overflow_rank, Some(0));
    assert_eq!(out.ranks["a"], 0);
    assert_eq!(out.ranks["b"], 0);
    assert!(out.positions["a"].y < out.positions["b"].y);
}

#[test]
fn layout_drops_edges_with_unknown_endpoints() {
    let nodes = [gateway("G"), worker("W1")];
    let edges = [edge("G", "W1"), edge("W1", "ghost")];
    let out = layout(&nodes, &edges, &no_fixed(), &LayoutConfig::default());

    assert_eq!(
        out.dropped_edges,
        vec![LayoutInputError::MissingEndpoint {
            v: "W1".to_string(),
            w: "ghost".to_string(),
            missing: "ghost".to_string(),
        }]
    );
    assert_eq!(out.positions.len(), 2);
    assert!(!out.positions.contains_key("ghost"));
}

#[test]
fn layout_survives_cycles() {
    let nodes = [gateway("G"), worker("A"), worker("B")];
    let edges = [edge("G", "A"), edge("A", "B"), edge("B", "A"), edge("B", "B")];
    let out = layout(&nodes, &edges, &no_fixed(), &LayoutConfig::default());
    assert_eq!(out.ranks["G"], 0);
    assert_eq!(out.ranks["A"], 1);
    assert_eq!(out.ranks["B"], 2);
    assert_eq!(out.overflow_rank, None);
}

#[test]
fn layout_median_sweeps_remove_crossings() {
    // BFS discovery puts `b` above `a`, which crosses g1->a with g2->b.
    let nodes = [gateway("g1"), gateway("g2"), worker("a"), worker("b")];
    let edges = [edge("g1", "b"), edge("g1", "a"), edge("g2", "b")];

    let unswept = LayoutConfig {
        max_order_iterations: 0,
        ..Default::default()
    };
    let before = layout(&nodes, &edges, &no_fixed(), &unswept);
    assert!(before.positions["b"].y < before.positions["a"].y);

    let after = layout(&nodes, &edges, &no_fixed(), &LayoutConfig::default());
    assert!(after.positions["a"].y < after.positions["b"].y);
}

#[test]
fn layout_supports_top_to_bottom_ranks() {
    let config = LayoutConfig {
        rank_dir: RankDir::TB,
        ..Default::default()
    };
    let out = layout(&[gateway("G"), worker("W")], &[edge("G", "W")], &no_fixed(), &config);
    assert_eq!(out.positions["G"], Point::new(40.0, 40.0));
    assert_eq!(out.positions["W"], Point::new(56.0, 358.0));
}

#[test]
fn layout_supports_right_to_left_ranks() {
    let config = LayoutConfig {
        rank_dir: RankDir::RL,
        ..Default::default()
    };
    let out = layout(&[gateway("G"), worker("W")], &[edge("G", "W")], &no_fixed(), &config);
    assert_eq!(out.positions["G"], Point::new(446.0, 40.0));
    assert_eq!(out.positions["W"], Point::new(40.0, 54.0));
}

#[test]
fn layout_config_deserializes_with_defaults() {
    let config: LayoutConfig =
        serde_json::from_str(r#"{ "rank_dir": "TB", "node_sep": 10 }"#).unwrap();
    assert_eq!(config.rank_dir, RankDir::TB);
    assert_eq!(config.node_sep, 10.0);
    assert_eq!(config.rank_sep, LayoutConfig::default().rank_sep);
}
