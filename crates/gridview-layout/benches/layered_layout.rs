use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use gridview_layout::{LayoutConfig, LayoutEdge, LayoutNode, Point, layout};
use std::collections::BTreeMap;
use std::hint::black_box;

/// One gateway, `workers` workers, and `resources` resources shared round-robin between them.
fn topology(workers: usize, resources: usize) -> (Vec<LayoutNode>, Vec<LayoutEdge>) {
    let mut nodes = vec![LayoutNode::new("gateway", 288.0, 168.0).root()];
    let mut edges = Vec::new();
    for i in 0..workers {
        let id = format!("worker-{i:03}");
        nodes.push(LayoutNode::new(id.clone(), 256.0, 140.0));
        edges.push(LayoutEdge::new("gateway", id));
    }
    for j in 0..resources {
        let id = format!("resource-{j:03}");
        nodes.push(LayoutNode::new(id.clone(), 256.0, 140.0));
        if workers == 0 {
            edges.push(LayoutEdge::new("gateway", id));
            continue;
        }
        // Deliberately scrambled so the median sweeps have work to do.
        let a = (j * 7) % workers;
        let b = (j * 13 + 5) % workers;
        edges.push(LayoutEdge::new(format!("worker-{a:03}"), id.clone()));
        edges.push(LayoutEdge::new(format!("worker-{b:03}"), id));
    }
    (nodes, edges)
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layered_layout");
    let config = LayoutConfig::default();
    for &(workers, resources) in &[(8, 4), (32, 24), (128, 96)] {
        let (nodes, edges) = topology(workers, resources);
        let fixed: BTreeMap<String, Point> = BTreeMap::new();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{workers}w_{resources}r")),
            &(nodes, edges),
            |b, (nodes, edges)| {
                b.iter(|| black_box(layout(nodes, edges, &fixed, &config)));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_layout);
criterion_main!(benches);
