use std::collections::HashMap;

use super::*;
use crate::geometry::{circumcircle, dist};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-7 + (a.abs() + b.abs()) * 1e-9
}

fn point_close(a: Point, b: Point) -> bool {
    close(a.x, b.x) && close(a.y, b.y)
}

/// Check everything the output promises, for any input.
fn check_invariants(sites: &[Point], diagram: &Diagram) {
    let mut degree_sum = 0;

    for (vi, vertex) in diagram.vertices.iter().enumerate() {
        let vi = vi as VertexIdx;
        degree_sum += vertex.edges.len();

        for &ei in &vertex.edges {
            let edge = &diagram.edges[ei as usize];
            assert!(
                edge.endpoints.0 == vi || edge.endpoints.1 == vi,
                "vertex {vi} lists edge {ei} but is not an endpoint of it"
            );
        }
        for &ni in &vertex.neighbors {
            assert!(
                diagram.vertices[ni as usize].neighbors.contains(&vi),
                "neighbor relation between vertices {vi} and {ni} is one-sided"
            );
        }

        match vertex.parents.len() {
            2 => {
                // ray anchors sit at the midpoint of their two sites
                let mut parents = vertex.parents.iter();
                let a = sites[*parents.next().unwrap() as usize];
                let b = sites[*parents.next().unwrap() as usize];
                assert!(point_close(vertex.position, (a + b) * 0.5));
            }
            3 => {
                // interior vertices are equidistant from their three sites,
                // and no other site intrudes into that circle
                let radii: Vec<f64> = vertex
                    .parents
                    .iter()
                    .map(|&p| dist(sites[p as usize], vertex.position))
                    .collect();
                assert!(close(radii[0], radii[1]) && close(radii[0], radii[2]));

                let r = radii[0];
                for (si, site) in sites.iter().enumerate() {
                    if vertex.parents.contains(&(si as SiteIdx)) {
                        continue;
                    }
                    assert!(
                        dist(*site, vertex.position) >= r * (1.0 - 1e-6) - 1e-9,
                        "site {si} lies strictly inside the circle of vertex {vi}"
                    );
                }
            }
            n => panic!("vertex {vi} has {n} parents"),
        }
    }

    assert_eq!(degree_sum, 2 * diagram.edges.len());

    for (ei, edge) in diagram.edges.iter().enumerate() {
        let ei = ei as EdgeIdx;
        let (a, b) = edge.endpoints;
        assert_ne!(a, b);
        let va = &diagram.vertices[a as usize];
        let vb = &diagram.vertices[b as usize];

        // the edge separates exactly the two cells its endpoints share
        let shared: std::collections::BTreeSet<SiteIdx> =
            va.parents.intersection(&vb.parents).copied().collect();
        assert_eq!(edge.parents, shared);
        assert_eq!(edge.parents.len(), 2);

        assert!(va.edges.contains(&ei) && vb.edges.contains(&ei));
        assert!(va.neighbors.contains(&b) && vb.neighbors.contains(&a));

        let mut expected: std::collections::BTreeSet<EdgeIdx> = &va.edges | &vb.edges;
        expected.remove(&ei);
        assert_eq!(edge.neighbors, expected);
    }
}

fn interior(diagram: &Diagram) -> Vec<&Vertex> {
    diagram
        .vertices
        .iter()
        .filter(|v| v.parents.len() == 3)
        .collect()
}

/// Vertices keyed by their (relabelled) parent sites.
fn vertices_by_parents(
    diagram: &Diagram,
    relabel: impl Fn(SiteIdx) -> SiteIdx,
) -> HashMap<Vec<SiteIdx>, Point> {
    diagram
        .vertices
        .iter()
        .map(|v| {
            let mut key: Vec<SiteIdx> = v.parents.iter().map(|&p| relabel(p)).collect();
            key.sort_unstable();
            (key, v.position)
        })
        .collect()
}

#[test]
fn no_sites() {
    let diagram = compute(&[]).unwrap();
    assert!(diagram.vertices.is_empty());
    assert!(diagram.edges.is_empty());
}

#[test]
fn single_site() {
    let diagram = compute(&[Point::new(3.0, -1.0)]).unwrap();
    assert!(diagram.vertices.is_empty());
    assert!(diagram.edges.is_empty());
}

#[test]
fn two_sites_side_by_side() {
    let sites = [Point::new(0.0, 0.0), Point::new(2.0, 0.0)];
    let diagram = compute(&sites).unwrap();
    check_invariants(&sites, &diagram);

    // the bisector is anchored by a single midpoint vertex, nothing else
    assert_eq!(diagram.vertices.len(), 1);
    assert!(diagram.edges.is_empty());
    let vertex = &diagram.vertices[0];
    assert!(point_close(vertex.position, Point::new(1.0, 0.0)));
    assert_eq!(vertex.parents, [0, 1].into());
}

#[test]
fn two_sites_stacked() {
    let sites = [Point::new(0.0, 1.0), Point::new(0.0, 0.0)];
    let diagram = compute(&sites).unwrap();
    check_invariants(&sites, &diagram);

    assert_eq!(diagram.vertices.len(), 1);
    assert!(diagram.edges.is_empty());
    assert!(point_close(
        diagram.vertices[0].position,
        Point::new(0.0, 0.5)
    ));
}

#[test]
fn equilateral_triangle() {
    let sites = [
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(0.5, 3f64.sqrt() / 2.0),
    ];
    let diagram = compute(&sites).unwrap();
    check_invariants(&sites, &diagram);

    // one corner at the centroid, anchored to the three edge midpoints
    let corners = interior(&diagram);
    assert_eq!(corners.len(), 1);
    assert!(point_close(
        corners[0].position,
        Point::new(0.5, 3f64.sqrt() / 6.0)
    ));
    assert_eq!(corners[0].parents, [0, 1, 2].into());
    assert_eq!(corners[0].edges.len(), 3);

    assert_eq!(diagram.vertices.len(), 4);
    assert_eq!(diagram.edges.len(), 3);

    let anchors: Vec<Point> = diagram
        .vertices
        .iter()
        .filter(|v| v.parents.len() == 2)
        .map(|v| v.position)
        .collect();
    for expected in [
        Point::new(0.5, 0.0),
        Point::new(0.75, 3f64.sqrt() / 4.0),
        Point::new(0.25, 3f64.sqrt() / 4.0),
    ] {
        assert!(anchors.iter().any(|&p| point_close(p, expected)));
    }
}

#[test]
fn unit_square() {
    // four cocircular sites: the centre appears as two coincident corners,
    // one per resolved triple
    let sites = [
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(0.0, 1.0),
        Point::new(1.0, 1.0),
    ];
    let diagram = compute(&sites).unwrap();
    check_invariants(&sites, &diagram);

    let corners = interior(&diagram);
    assert_eq!(corners.len(), 2);
    for corner in &corners {
        assert!(point_close(corner.position, Point::new(0.5, 0.5)));
    }

    let all_parents: std::collections::BTreeSet<SiteIdx> = corners
        .iter()
        .flat_map(|v| v.parents.iter().copied())
        .collect();
    assert_eq!(all_parents, [0, 1, 2, 3].into());

    assert_eq!(diagram.edges.len(), 6);
}

#[test]
fn collinear_triple() {
    let sites = [
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(2.0, 0.0),
    ];
    let diagram = compute(&sites).unwrap();
    check_invariants(&sites, &diagram);

    // no circle ever closes: only the two midpoint anchors appear
    assert!(interior(&diagram).is_empty());
    assert!(diagram.edges.is_empty());
    assert_eq!(diagram.vertices.len(), 2);

    let positions: Vec<Point> = diagram.vertices.iter().map(|v| v.position).collect();
    assert!(positions
        .iter()
        .any(|&p| point_close(p, Point::new(0.5, 0.0))));
    assert!(positions
        .iter()
        .any(|&p| point_close(p, Point::new(1.5, 0.0))));
}

#[test]
fn cohorizontal_pair_above_apex() {
    // two sites at the same height exercise the equal-height intersection
    let sites = [
        Point::new(0.0, 2.0),
        Point::new(1.0, 2.0),
        Point::new(0.5, 0.0),
    ];
    let diagram = compute(&sites).unwrap();
    check_invariants(&sites, &diagram);

    let corners = interior(&diagram);
    assert_eq!(corners.len(), 1);
    let expected = circumcircle(sites[0], sites[1], sites[2]).unwrap();
    assert!(point_close(corners[0].position, expected.center));
    assert!(point_close(corners[0].position, Point::new(0.5, 1.0625)));
    assert_eq!(diagram.edges.len(), 3);
}

#[test]
fn five_sites_general_position() {
    let sites = [
        Point::new(0.0, 0.0),
        Point::new(4.0, 0.0),
        Point::new(2.0, 3.0),
        Point::new(-1.0, 2.0),
        Point::new(5.0, 2.0),
    ];
    let diagram = compute(&sites).unwrap();
    check_invariants(&sites, &diagram);

    // all five sites are hull points, so exactly three triples close a circle
    let corners = interior(&diagram);
    assert_eq!(corners.len(), 3);
    assert_eq!(diagram.edges.len(), 9);

    for corner in corners {
        let parents: Vec<SiteIdx> = corner.parents.iter().copied().collect();
        let expected = circumcircle(
            sites[parents[0] as usize],
            sites[parents[1] as usize],
            sites[parents[2] as usize],
        )
        .unwrap();
        assert!(point_close(corner.position, expected.center));
    }
}

#[test]
fn permuting_sites_relabels_the_diagram() {
    let base = [
        Point::new(0.0, 0.0),
        Point::new(4.0, 0.0),
        Point::new(2.0, 3.0),
        Point::new(-1.0, 2.0),
        Point::new(5.0, 2.0),
    ];
    let perm = [2usize, 0, 4, 1, 3];
    let shuffled: Vec<Point> = perm.iter().map(|&i| base[i]).collect();

    let first = compute(&base).unwrap();
    let second = compute(&shuffled).unwrap();

    let first_map = vertices_by_parents(&first, |p| p);
    let second_map = vertices_by_parents(&second, |p| perm[p as usize] as SiteIdx);

    assert_eq!(first_map.len(), second_map.len());
    assert_eq!(first.edges.len(), second.edges.len());
    for (key, position) in &first_map {
        let other = second_map
            .get(key)
            .unwrap_or_else(|| panic!("no vertex for sites {key:?} after permutation"));
        assert!(point_close(*position, *other));
    }
}

#[test]
fn translation_and_scaling() {
    let base = [
        Point::new(0.0, 0.0),
        Point::new(4.0, 0.0),
        Point::new(2.0, 3.0),
        Point::new(-1.0, 2.0),
        Point::new(5.0, 2.0),
    ];
    let offset = Point::new(13.0, -2.5);
    let scale = 3.0;
    let moved: Vec<Point> = base.iter().map(|&p| (p * scale) + offset).collect();

    let first = compute(&base).unwrap();
    let second = compute(&moved).unwrap();

    let first_map = vertices_by_parents(&first, |p| p);
    let second_map = vertices_by_parents(&second, |p| p);
    assert_eq!(first_map.len(), second_map.len());
    for (key, position) in &first_map {
        let moved_position = (*position * scale) + offset;
        assert!(point_close(second_map[key], moved_position));
    }
}

#[quickcheck]
fn diagram_fuzz(mut points: Vec<(u8, u8)>) {
    points.sort();
    points.dedup();

    let sites: Vec<Point> = points
        .into_iter()
        .map(|(x, y)| Point::new(x as f64, y as f64))
        .collect();

    let diagram = compute(&sites).unwrap();
    check_invariants(&sites, &diagram);
}

#[quickcheck]
fn fuzz_corners_keep_their_three_anchors(mut points: Vec<(u8, u8)>) -> bool {
    points.sort();
    points.dedup();

    let sites: Vec<Point> = points
        .into_iter()
        .map(|(x, y)| Point::new(x as f64, y as f64))
        .collect();

    let diagram = compute(&sites).unwrap();

    // every corner is wired to the anchors of exactly its three site pairs
    interior(&diagram).iter().all(|v| v.edges.len() == 3)
}
