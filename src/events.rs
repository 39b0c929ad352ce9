//! Circle events and their priority queue.
//!
//! An event remembers the *identity* of the two adjacent breakpoints that
//! produced it, not positions: it stays meaningful only while both still sit
//! side by side on the beach with the same site references. The queue erases
//! events by that identity when a breakpoint dies, and the driver skips any
//! event the beach no longer corroborates.

use std::cmp::Ordering;

use log::trace;

use crate::beach::Breakpoint;
use crate::geometry::{circumcircle, dist, Circle, EPS};
use crate::{Point, SiteIdx};

/// Three consecutive arcs whose breakpoints converge on the centre of the
/// circumcircle of their sites.
#[derive(Clone, Copy, Debug)]
pub struct CircleEvent {
    /// The breakpoint between the left and middle arcs.
    pub left: Breakpoint,
    /// The breakpoint between the middle and right arcs.
    pub right: Breakpoint,
    pub circle: Circle,
}

impl CircleEvent {
    /// Sweep position at which the event fires: the bottom of its circle.
    pub fn key(&self) -> f64 {
        self.circle.bottom()
    }

    /// The three generating sites, left to right.
    pub fn sites(&self) -> (SiteIdx, SiteIdx, SiteIdx) {
        (
            self.left.left.expect("event stores no sentinel"),
            self.left.right.expect("event stores no sentinel"),
            self.right.right.expect("event stores no sentinel"),
        )
    }
}

/// Binary max-heap of circle events: greatest key first, ties broken by the
/// site triple so runs are reproducible.
#[derive(Default)]
pub struct CircleQueue {
    data: Vec<CircleEvent>,
}

impl std::fmt::Debug for CircleQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.data)
    }
}

impl CircleQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn peek(&self) -> Option<&CircleEvent> {
        self.data.first()
    }

    /// Whether `a` pops before `b`.
    fn before(a: &CircleEvent, b: &CircleEvent) -> bool {
        match a.key().partial_cmp(&b.key()) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Less) => false,
            _ => a.sites() < b.sites(),
        }
    }

    /// Run the generation predicate for two adjacent breakpoints and queue
    /// the event if every gate passes. Returns whether an event was queued.
    ///
    /// The gates, in order: no sentinel side, three distinct sites, a real
    /// circumcircle, an event point not above the sweep, and both
    /// breakpoints converging on the circumcentre when evaluated at the
    /// event's own sweep position.
    pub fn try_insert(
        &mut self,
        sites: &[Point],
        sweep: f64,
        left: Breakpoint,
        right: Breakpoint,
    ) -> bool {
        let (Some(a), Some(b)) = (left.left, left.right) else {
            return false;
        };
        let Some(c) = right.right else {
            return false;
        };
        debug_assert_eq!(left.right, right.left);

        if a == b || b == c || a == c {
            // only two parabolas involved: these breakpoints are the two
            // roots of one quadratic and never meet
            return false;
        }

        let Some(circle) = circumcircle(
            sites[a as usize],
            sites[b as usize],
            sites[c as usize],
        ) else {
            // colinear sites have no circumcircle and no meeting point
            return false;
        };

        let key = circle.bottom();
        if key > sweep + EPS {
            // the meeting point is above the sweep line, so it already passed
            return false;
        }

        let left_at_key = left.position(sites, key);
        let right_at_key = right.position(sites, key);
        if dist(left_at_key, circle.center) > circle.radius
            || dist(right_at_key, circle.center) > circle.radius
        {
            // diverging breakpoints land far outside the circle
            return false;
        }

        trace!(
            "queue circle event ({a}, {b}, {c}) at y = {key} around {:?}",
            circle.center
        );
        self.push(CircleEvent {
            left,
            right,
            circle,
        });
        true
    }

    /// Erase the event generated by exactly this breakpoint pair, if queued.
    pub fn invalidate(&mut self, left: Breakpoint, right: Breakpoint) {
        if left.is_sentinel() || right.is_sentinel() {
            // no event can reference the open ends of the beach
            return;
        }
        if let Some(index) = self
            .data
            .iter()
            .position(|e| e.left == left && e.right == right)
        {
            trace!("invalidate circle event {:?} {:?}", left, right);
            self.remove_at(index);
        }
    }

    fn push(&mut self, event: CircleEvent) {
        let mut i = self.data.len();
        self.data.push(event);
        while i > 0 {
            let parent = (i - 1) / 2;
            if Self::before(&self.data[i], &self.data[parent]) {
                self.data.swap(i, parent);
                i = parent;
            } else {
                break;
            }
        }
    }

    pub fn pop(&mut self) -> Option<CircleEvent> {
        if self.data.is_empty() {
            return None;
        }
        let ret = self.data.swap_remove(0);
        self.sift_down(0);
        Some(ret)
    }

    fn remove_at(&mut self, index: usize) {
        assert!(index < self.data.len());
        self.data.swap_remove(index);
        if index == self.data.len() {
            return;
        }
        let mut i = index;
        while i > 0 {
            let parent = (i - 1) / 2;
            if Self::before(&self.data[i], &self.data[parent]) {
                self.data.swap(i, parent);
                i = parent;
            } else {
                break;
            }
        }
        self.sift_down(i);
    }

    fn sift_down(&mut self, mut i: usize) {
        while 2 * i + 1 < self.data.len() {
            let l = 2 * i + 1;
            let r = 2 * i + 2;
            let mut j = l;
            if r < self.data.len() && Self::before(&self.data[r], &self.data[l]) {
                j = r;
            }
            if Self::before(&self.data[j], &self.data[i]) {
                self.data.swap(i, j);
                i = j;
            } else {
                break;
            }
        }
    }
}
