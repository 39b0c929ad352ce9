//! The beach line: an ordered sequence of breakpoints between neighbouring
//! parabolic arcs, parameterised by the current sweep position.
//!
//! A breakpoint is an *ordered* pair of sites. The same two sites in the
//! opposite order name the other root of the parabola quadratic, so `(a, b)`
//! and `(b, a)` are distinct entries that may both live on the beach. The
//! open ends of the beach are marked by sentinel pairs with a missing side.

use crate::geometry::{parabola_intersection, EPS};
use crate::{Error, Point, SiteIdx};

/// A point on the beach line where the parabolas of two sites meet, named by
/// the arcs on either side. `None` stands for the open plane beyond the
/// first or last arc.
#[derive(PartialEq, Eq, Clone, Copy, Hash)]
pub struct Breakpoint {
    /// Site of the arc immediately to the left of the crossing.
    pub left: Option<SiteIdx>,
    /// Site of the arc immediately to the right.
    pub right: Option<SiteIdx>,
}

impl std::fmt::Debug for Breakpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn side(s: Option<SiteIdx>) -> String {
            s.map_or_else(|| "-".to_string(), |i| i.to_string())
        }
        write!(f, "({}|{})", side(self.left), side(self.right))
    }
}

impl Breakpoint {
    pub fn new(left: SiteIdx, right: SiteIdx) -> Self {
        Self {
            left: Some(left),
            right: Some(right),
        }
    }

    /// The sentinel before the leftmost arc.
    pub const fn head(first: SiteIdx) -> Self {
        Self {
            left: None,
            right: Some(first),
        }
    }

    /// The sentinel after the rightmost arc.
    pub const fn tail(last: SiteIdx) -> Self {
        Self {
            left: Some(last),
            right: None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.left.is_none() || self.right.is_none()
    }

    /// Which root of the parabola quadratic this breakpoint selects: +1 when
    /// the left site sits at or below the right one, -1 otherwise.
    pub fn sign(&self, sites: &[Point]) -> f64 {
        let (l, r) = self.sites(sites);
        if l.y <= r.y {
            1.0
        } else {
            -1.0
        }
    }

    /// Where the two parabolas cross at the given sweep position. Must not be
    /// called on a sentinel.
    pub fn position(&self, sites: &[Point], sweep: f64) -> Point {
        let (l, r) = self.sites(sites);
        parabola_intersection(sweep, l, r, self.sign(sites))
    }

    fn sites(&self, sites: &[Point]) -> (Point, Point) {
        (
            sites[self.left.expect("sentinel breakpoint has no position") as usize],
            sites[self.right.expect("sentinel breakpoint has no position") as usize],
        )
    }
}

/// Strict "comes before" relation between two breakpoints at the given sweep
/// position. A pair with both sides equal acts as a degenerate probe that
/// compares by its site's x alone, which is how [`BeachLine::locate`] turns
/// an x lookup into an ordinary comparison.
pub fn comes_before(sites: &[Point], sweep: f64, lhs: Breakpoint, rhs: Breakpoint) -> bool {
    let lhs_head = lhs.left.is_none();
    let lhs_tail = lhs.right.is_none();
    let rhs_head = rhs.left.is_none();
    let rhs_tail = rhs.right.is_none();

    if (lhs_tail && rhs_head) || (lhs_tail && rhs_tail) || (lhs_head && rhs_head) {
        // a tail never precedes a head, and two sentinels on the same side
        // are indistinguishable
        return false;
    }
    if lhs_head || rhs_tail {
        return true;
    }
    if lhs_tail || rhs_head {
        return false;
    }
    if lhs == rhs {
        return false;
    }
    if lhs.left == rhs.right && lhs.right == rhs.left {
        // same two parabolas, opposite order: the two roots of the quadratic
        return lhs.sign(sites) < rhs.sign(sites);
    }
    if lhs.left == lhs.right {
        let x = sites[lhs.left.expect("probe has a site") as usize].x;
        return x < rhs.position(sites, sweep).x;
    }
    if rhs.left == rhs.right {
        let x = sites[rhs.left.expect("probe has a site") as usize].x;
        return lhs.position(sites, sweep).x < x;
    }
    lhs.position(sites, sweep).x < rhs.position(sites, sweep).x
}

/// The ordered breakpoint sequence. Between two adjacent entries `(·, s)` and
/// `(s, ·)` lies the arc of site `s`; the shared site is an invariant checked
/// by [`BeachLine::validate`].
///
/// The container is a plain vector in beach order. Lookups binary-search with
/// [`comes_before`] under the sweep position the driver passes in; edits are
/// splices at an index the caller already knows.
#[derive(Clone, Default)]
pub struct BeachLine {
    entries: Vec<Breakpoint>,
}

impl std::fmt::Debug for BeachLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}

impl BeachLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, index: usize) -> Breakpoint {
        self.entries[index]
    }

    pub fn entries(&self) -> &[Breakpoint] {
        &self.entries
    }

    /// Seed the beach with the very first arc.
    pub fn bootstrap(&mut self, site: SiteIdx) {
        debug_assert!(self.entries.is_empty());
        self.entries.push(Breakpoint::head(site));
        self.entries.push(Breakpoint::tail(site));
    }

    /// Index of the first breakpoint that does not come before a vertical
    /// probe through `site`. The arc under the probe is named by the entry
    /// just left of the returned index.
    pub fn locate(&self, sites: &[Point], sweep: f64, site: SiteIdx) -> usize {
        let probe = Breakpoint {
            left: Some(site),
            right: Some(site),
        };
        self.entries
            .partition_point(|&b| comes_before(sites, sweep, b, probe))
    }

    /// Split the arc of `s` at `index`, which gains the new arc of `m`:
    /// `..., (s, m), (m, s), ...` take the place of the arc.
    pub fn split(&mut self, index: usize, s: SiteIdx, m: SiteIdx) {
        self.entries
            .splice(index..index, [Breakpoint::new(s, m), Breakpoint::new(m, s)]);
    }

    /// Put the arc of `m` directly beside the rightmost arc of `s`, replacing
    /// the tail sentinel at `index`. Used when `m` arrives level with `s` and
    /// no genuine split exists.
    pub fn extend_right(&mut self, index: usize, s: SiteIdx, m: SiteIdx) {
        debug_assert_eq!(self.entries[index], Breakpoint::tail(s));
        self.entries
            .splice(index..=index, [Breakpoint::new(s, m), Breakpoint::tail(m)]);
    }

    /// Drop the two adjacent breakpoints at `index` and `index + 1`.
    pub fn remove_pair(&mut self, index: usize) {
        self.entries.drain(index..index + 2);
    }

    pub fn insert(&mut self, index: usize, breakpoint: Breakpoint) {
        self.entries.insert(index, breakpoint);
    }

    /// Find the adjacent pair `[left, right]` with exactly these site
    /// references, if the beach still carries it. `None` means the event that
    /// remembered the pair went stale.
    pub fn find_pair(&self, left: Breakpoint, right: Breakpoint) -> Option<usize> {
        self.entries
            .windows(2)
            .position(|w| w[0] == left && w[1] == right)
    }

    /// Check the two structural invariants: adjacent entries share their arc
    /// site, and no entry comes before its predecessor under the current
    /// sweep. A failure here is an engine bug, not bad input.
    pub fn validate(&self, sites: &[Point], sweep: f64) -> Result<(), Error> {
        for (index, w) in self.entries.windows(2).enumerate() {
            if w[0].right != w[1].left {
                return Err(Error::ArcMismatch { index });
            }
            if comes_before(sites, sweep, w[1], w[0]) {
                // breakpoints meeting at a vertex may swap by a rounding step
                // right at the coincidence; only a gap beyond the kernel
                // tolerance contradicts the comparator for real
                let gap = w[0].position(sites, sweep).x - w[1].position(sites, sweep).x;
                if gap > EPS {
                    return Err(Error::BeachOrder { index, sweep });
                }
            }
        }
        Ok(())
    }
}
