//! Voronoi diagrams in the plane, built with Fortune's sweep line and
//! reported as a graph of vertices and edges.
//!
//! A horizontal sweep line descends from above the topmost site. Sites
//! already passed contribute parabolic arcs whose lower envelope is the
//! *beach line*; the crossings between neighbouring arcs are *breakpoints*,
//! and each breakpoint traces one edge of the diagram as the sweep moves.
//! Two kinds of event drive the construction: a *site event* splits the arc
//! vertically above a newly reached site, and a *circle event* fires when an
//! arc shrinks to nothing and its two breakpoints meet at the circumcentre
//! of three sites, producing a vertex of the diagram.
//!
//! [`compute`] is the entry point:
//!
//! ```
//! use voronoi_graph::{compute, Point};
//!
//! let sites = [
//!     Point::new(0.0, 0.0),
//!     Point::new(1.0, 0.0),
//!     Point::new(0.5, 3f64.sqrt() / 2.0),
//! ];
//! let diagram = compute(&sites).unwrap();
//!
//! // the three cells meet at the circumcentre of the triangle
//! let corner = diagram.vertices.iter().find(|v| v.parents.len() == 3).unwrap();
//! assert!((corner.position.y - 3f64.sqrt() / 6.0).abs() < 1e-9);
//! ```
//!
//! Coordinates are `f64` and must be finite. The geometric predicates select
//! their degenerate branches with an absolute tolerance of 1e-7, which is
//! calibrated for coordinate magnitudes up to about 1e3; inputs far outside
//! that range should be scaled down first. Duplicate sites are outside the
//! contract.
//!
//! References:
//! - S.J. Fortune, A sweepline algorithm for Voronoi diagrams, Algorithmica 2
//!   (1987), 153-174.
//! - Kenny Wong, Hausi A. Müller, An Efficient Implementation of Fortune's
//!   Plane-Sweep Algorithm for Voronoi Diagrams.

use std::cmp::Ordering;

use log::{debug, trace};

#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

pub mod beach;
mod diagram;
pub mod events;
pub mod geometry;

#[cfg(test)]
mod test;

use beach::{BeachLine, Breakpoint};
use diagram::{sorted3, Builder};
use events::{CircleEvent, CircleQueue};
use geometry::{Circle, EPS};

pub use diagram::{Diagram, Edge, EdgeIdx, Vertex, VertexIdx};

/// A point in 2D space. It is ordered in lexicographic order, y first.
#[derive(PartialEq, Clone, Copy, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}
impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}
impl std::ops::Mul<f64> for Point {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Point")
            .field(&self.x)
            .field(&self.y)
            .finish()
    }
}

impl std::hash::Hash for Point {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.x.to_bits().hash(state);
        self.y.to_bits().hash(state);
    }
}

impl Eq for Point {}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.y == other.y {
            self.x.partial_cmp(&other.x).unwrap()
        } else {
            self.y.partial_cmp(&other.y).unwrap()
        }
    }
}

/// Index of a site in the input slice. All topology is reported in terms of
/// these indices.
pub type SiteIdx = u32;

/// An internal invariant of the sweep failed. This is a bug in the engine,
/// not a property of the input; no partial diagram is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The beach line's stored order contradicts its comparator.
    #[error("beach line out of order at entry {index} with sweep at y = {sweep}")]
    BeachOrder { index: usize, sweep: f64 },

    /// Two adjacent breakpoints disagree about the arc between them.
    #[error("adjacent breakpoints disagree on their shared arc at entry {index}")]
    ArcMismatch { index: usize },
}

/// Compute the Voronoi diagram of a set of sites.
///
/// The result's vertices and edges carry the indices of the sites that
/// generate them: a vertex with three parents is the circumcentre of those
/// sites' cells, a vertex with two parents is the midpoint of the two sites
/// and anchors the unbounded edge between their cells. An empty input yields
/// an empty diagram. Site order does not affect the geometry, only the
/// labels.
pub fn compute(sites: &[Point]) -> Result<Diagram, Error> {
    let mut order: Vec<SiteIdx> = (0..sites.len() as SiteIdx).collect();
    // topmost first; left to right within a row so cohorizontal runs chain
    order.sort_unstable_by(|&i, &j| {
        let (p, q) = (sites[i as usize], sites[j as usize]);
        q.y.partial_cmp(&p.y)
            .unwrap()
            .then(p.x.partial_cmp(&q.x).unwrap())
            .then(i.cmp(&j))
    });

    if !sites.is_empty() {
        let min_x = sites.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = sites.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = sites.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_y = sites.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        debug!(
            "{} sites in [{min_x}, {max_x}] x [{min_y}, {max_y}]",
            sites.len()
        );
    }

    let mut fortune = Fortune::new(sites);
    let mut cursor = 0;

    loop {
        let next_site = order.get(cursor).copied();
        let next_key = fortune.events.peek().map(CircleEvent::key);
        let take_site = match (next_site, next_key) {
            (None, None) => break,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            // sites win ties against circle events at the same height
            (Some(site), Some(key)) => sites[site as usize].y >= key,
        };
        if take_site {
            fortune.process_site(order[cursor]);
            cursor += 1;
        } else {
            let event = fortune.events.pop().expect("peeked above");
            fortune.process_circle(event)?;
        }
    }

    Ok(fortune.builder.finish())
}

/// Sweep state: the beach line, the pending circle events and the diagram
/// under construction. The driver owns the sweep position and hands it to
/// every beach operation; nothing compares breakpoints while the position is
/// being moved.
struct Fortune<'a> {
    sites: &'a [Point],
    sweep: f64,
    beach: BeachLine,
    events: CircleQueue,
    builder: Builder,
}

impl<'a> Fortune<'a> {
    fn new(sites: &'a [Point]) -> Self {
        Fortune {
            sites,
            sweep: f64::INFINITY,
            beach: BeachLine::new(),
            events: CircleQueue::new(),
            builder: Builder::new(),
        }
    }

    /// Handle the sweep reaching a new site: split the arc vertically above
    /// it and schedule the circle events the new breakpoints take part in.
    fn process_site(&mut self, m: SiteIdx) {
        let point = self.sites[m as usize];
        trace!("site event {m} at {point:?}");

        // the sweep advances before the beach is touched
        self.sweep = point.y;

        if self.beach.is_empty() {
            self.beach.bootstrap(m);
            return;
        }

        // the head sentinel comes before every probe and the tail never
        // does, so the probe lands strictly inside the beach
        let index = self.beach.locate(self.sites, self.sweep, m);
        debug_assert!(index >= 1 && index < self.beach.len());
        let left = self.beach.get(index - 1);
        let right = self.beach.get(index);
        let s = left.right.expect("entry before a probe has a right site");

        if right.right.is_none() && (self.sites[s as usize].y - point.y).abs() < EPS {
            // level with the rightmost arc: the regions sit side by side and
            // share a single vertical breakpoint instead of a split
            trace!("site {m} level with arc {s}");
            self.beach.extend_right(index, s, m);
            self.builder.midpoint(self.sites, s, m);
            self.events
                .try_insert(self.sites, self.sweep, left, Breakpoint::new(s, m));
            return;
        }

        // the arc of s splits around the new arc of m
        self.beach.split(index, s, m);
        self.builder.midpoint(self.sites, s, m);

        // the old neighbours no longer enclose a shrinking arc together
        self.events.invalidate(left, right);

        self.events
            .try_insert(self.sites, self.sweep, left, self.beach.get(index));
        self.events
            .try_insert(self.sites, self.sweep, self.beach.get(index + 1), right);
    }

    /// Handle two breakpoints meeting: the arc between them vanishes, a
    /// vertex is emitted and the outer neighbours become adjacent.
    fn process_circle(&mut self, event: CircleEvent) -> Result<(), Error> {
        // the beach must corroborate the event; whatever it no longer
        // carries was invalidated implicitly
        let Some(index) = self.beach.find_pair(event.left, event.right) else {
            trace!("stale circle event {:?} {:?}", event.left, event.right);
            return Ok(());
        };

        self.beach.validate(self.sites, self.sweep)?;

        let (a, b, c) = event.sites();
        trace!(
            "circle event ({a}, {b}, {c}) at y = {}, beach {:?}",
            event.key(),
            self.beach
        );

        // outer neighbours, read before the beach changes under them
        let outer_left = self.beach.get(index - 1);
        let outer_right = self.beach.get(index + 2);

        // events that relied on the dying breakpoints
        self.events.invalidate(outer_left, event.left);
        self.events.invalidate(event.right, outer_right);

        // the pair leaves first; only once the coincident entries are gone
        // may the sweep advance past their meeting point
        self.beach.remove_pair(index);
        self.sweep = event.key();

        let merged = Breakpoint::new(a, c);
        self.beach.insert(index, merged);

        // new meetings with the outer neighbours, unless they would re-queue
        // the triple just resolved
        let resolved = sorted3(a, b, c);
        if outer_left.left.map(|q| sorted3(q, a, c)) != Some(resolved) {
            self.events
                .try_insert(self.sites, self.sweep, outer_left, merged);
        }
        if outer_right.right.map(|q| sorted3(a, c, q)) != Some(resolved) {
            self.events
                .try_insert(self.sites, self.sweep, merged, outer_right);
        }

        self.emit(a, b, c, event.circle);
        Ok(())
    }

    /// Record the vertex at the circumcentre and wire it to the midpoint
    /// anchors of its three site pairs. The corner joins the same three
    /// anchors whether the centre falls inside the site triangle or beyond
    /// one of its sides: a far side's bisector reaches it through the pair
    /// midpoint.
    fn emit(&mut self, a: SiteIdx, b: SiteIdx, c: SiteIdx, circle: Circle) {
        let center = self.builder.corner(a, b, c, circle.center);
        for (p, q) in [(a, b), (b, c), (c, a)] {
            let anchor = self.builder.midpoint(self.sites, p, q);
            self.builder.connect(anchor, center);
        }
    }
}
