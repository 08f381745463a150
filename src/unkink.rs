//! Splitting self-intersecting rings into simple fragments.
//!
//! A GPS loop often crosses itself (figure-eights, doubling back along a
//! street). The ring is cut at its first crossing into an outer loop that
//! still contains the start vertex and an inner loop, and both halves are
//! split again until no crossing remains. Fragments come out depth first,
//! outer before inner, which is the "first encountered" order used when two
//! fragments tie on area.

use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Line};

/// Split a ring into simple fragments.
///
/// The input may be open or closed; output rings are open (no repeated
/// closing coordinate). Fragments with fewer than 3 distinct vertices are
/// dropped.
pub fn unkink_ring(ring: &[Coord]) -> Vec<Vec<Coord>> {
    let mut fragments = Vec::new();
    let mut stack = vec![normalize(ring.to_vec())];

    while let Some(current) = stack.pop() {
        if current.len() < 3 {
            continue;
        }
        match first_crossing(&current) {
            None => fragments.push(current),
            Some((i, j, point)) => {
                let mut outer = Vec::with_capacity(current.len());
                outer.extend_from_slice(&current[..=i]);
                outer.push(point);
                outer.extend_from_slice(&current[j + 1..]);

                let mut inner = Vec::with_capacity(j - i + 1);
                inner.push(point);
                inner.extend_from_slice(&current[i + 1..=j]);

                // LIFO: outer is processed first
                stack.push(normalize(inner));
                stack.push(normalize(outer));
            }
        }
    }

    fragments
}

/// True when any two non-adjacent edges of the ring touch or cross.
pub fn is_self_intersecting(ring: &[Coord]) -> bool {
    first_crossing(&normalize(ring.to_vec())).is_some()
}

/// Drop consecutive duplicates and the closing coordinate.
fn normalize(mut ring: Vec<Coord>) -> Vec<Coord> {
    ring.dedup();
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

fn edge(ring: &[Coord], k: usize) -> Line {
    Line::new(ring[k], ring[(k + 1) % ring.len()])
}

fn boxes_touch(a: &Line, b: &Line) -> bool {
    a.start.x.min(a.end.x) <= b.start.x.max(b.end.x)
        && b.start.x.min(b.end.x) <= a.start.x.max(a.end.x)
        && a.start.y.min(a.end.y) <= b.start.y.max(b.end.y)
        && b.start.y.min(b.end.y) <= a.start.y.max(a.end.y)
}

/// First pair of non-adjacent edges `(i, j)`, `i < j`, that meet, and the
/// meeting point.
fn first_crossing(ring: &[Coord]) -> Option<(usize, usize, Coord)> {
    let n = ring.len();
    if n < 4 {
        return None;
    }

    for i in 0..n {
        let a = edge(ring, i);
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let b = edge(ring, j);
            if !boxes_touch(&a, &b) {
                continue;
            }
            let point = match line_intersection(a, b) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => intersection,
                Some(LineIntersection::Collinear { intersection }) => intersection.start,
                None => continue,
            };
            return Some((i, j, point));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coord {
        Coord { x, y }
    }

    #[test]
    fn test_normalize_strips_closing_and_duplicates() {
        let ring = normalize(vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 0.0)]);
        assert_eq!(ring, vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0)]);
    }

    #[test]
    fn test_square_has_no_crossing() {
        let square = vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 1.0)];
        assert!(first_crossing(&square).is_none());
    }

    #[test]
    fn test_bowtie_crossing_found_at_center() {
        let bowtie = vec![c(0.0, 0.0), c(2.0, 2.0), c(2.0, 0.0), c(0.0, 2.0)];
        let (i, j, point) = first_crossing(&bowtie).unwrap();
        assert_eq!((i, j), (0, 2));
        assert!((point.x - 1.0).abs() < 1e-12);
        assert!((point.y - 1.0).abs() < 1e-12);
    }
}
