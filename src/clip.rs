//! Exact clipping of simple rings against half-planes and rectangles.
//!
//! The planning algorithms only ever intersect or subtract rectangular
//! masks that span the full working x-range, so this kernel provides
//! half-plane clipping (which such masks reduce to) instead of a general
//! polygon boolean. Output rings keep the input orientation and may
//! contain duplicate or collinear vertices; callers pass them through
//! [`cleanup_ring`].

use crate::line::{Line, Segment};
use crate::point::{orient2d, Orientation, Point, Scalar};
use num_traits::Zero;

/// Twice the signed area of a ring (positive for counter-clockwise).
#[must_use]
pub fn ring_area2(ring: &[Point]) -> Scalar {
    let mut sum = Scalar::zero();
    for i in 0..ring.len() {
        let a = &ring[i];
        let b = &ring[(i + 1) % ring.len()];
        sum += a.cross(b);
    }
    sum
}

/// Remove duplicate and collinear vertices, then verify the ring is
/// strictly simple with nonzero area. `None` if the cleaned ring is
/// degenerate.
#[must_use]
pub fn cleanup_ring(ring: &[Point]) -> Option<Vec<Point>> {
    let mut out: Vec<Point> = Vec::with_capacity(ring.len());
    for p in ring {
        if out.last() != Some(p) {
            out.push(p.clone());
        }
    }
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }

    // Merge collinear runs, including spikes; removing one vertex can
    // expose another collinear triple, so iterate to a fixed point.
    let mut changed = true;
    while changed && out.len() >= 3 {
        changed = false;
        let mut i = 0;
        while i < out.len() && out.len() >= 3 {
            let n = out.len();
            let prev = &out[(i + n - 1) % n];
            let next = &out[(i + 1) % n];
            if prev == next || orient2d(prev, &out[i], next) == Orientation::Collinear {
                out.remove(i);
                changed = true;
            } else {
                i += 1;
            }
        }
    }

    if out.len() < 3 || ring_area2(&out).is_zero() || !is_strictly_simple(&out) {
        return None;
    }
    Some(out)
}

/// Strict simplicity: non-adjacent edges may not meet at all; adjacent
/// edges share exactly their common endpoint.
#[must_use]
pub fn is_strictly_simple(ring: &[Point]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    for i in 0..n {
        let ei = Segment::new(ring[i].clone(), ring[(i + 1) % n].clone());
        if ei.is_degenerate() {
            return false;
        }
        for j in (i + 1)..n {
            let ej = Segment::new(ring[j].clone(), ring[(j + 1) % n].clone());
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            if adjacent {
                // The shared endpoint is allowed; any further contact is
                // an overlap.
                if ei.interior_contains(ej.end())
                    || ej.interior_contains(ei.start())
                    || ei.properly_intersects(&ej)
                {
                    return false;
                }
                continue;
            }
            if ei.properly_intersects(&ej)
                || ei.contains_point(ej.start())
                || ei.contains_point(ej.end())
                || ej.contains_point(ei.start())
                || ej.contains_point(ei.end())
            {
                return false;
            }
        }
    }
    true
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum EndpointKind {
    Entry,
    Exit,
}

struct Chain {
    vertices: Vec<Point>,
    entry_param: Option<Scalar>,
    exit_param: Option<Scalar>,
}

/// Clip a simple ring against the closed left half-plane of `line`,
/// returning zero or more rings. A simple ring can be cut into several
/// pieces by one line; the pieces are reassembled by pairing the
/// crossings in order along the line (the segments of the line between
/// alternate crossings lie inside the ring).
#[must_use]
pub fn clip_ring_halfplane(ring: &[Point], line: &Line) -> Vec<Vec<Point>> {
    let n = ring.len();
    if n < 3 {
        return Vec::new();
    }

    let sides: Vec<Orientation> = ring.iter().map(|p| line.side(p)).collect();
    let any_kept = sides.iter().any(|s| *s == Orientation::CounterClockwise);
    let any_cut = sides.iter().any(|s| *s == Orientation::Clockwise);
    if !any_cut {
        return if any_kept {
            vec![ring.to_vec()]
        } else {
            Vec::new()
        };
    }

    // Start the walk at a vertex on the cut side so every kept run is
    // seen as one complete chain.
    let offset = sides
        .iter()
        .position(|s| *s == Orientation::Clockwise)
        .unwrap_or(0);

    let mut chains: Vec<Chain> = Vec::new();
    let mut current: Option<Chain> = None;
    for k in 0..n {
        let i = (offset + k) % n;
        let j = (i + 1) % n;
        let (si, sj) = (sides[i], sides[j]);
        let kept_i = si != Orientation::Clockwise;
        let kept_j = sj != Orientation::Clockwise;

        match (kept_i, kept_j) {
            (true, true) => {
                if let Some(chain) = current.as_mut() {
                    chain.vertices.push(ring[j].clone());
                }
            }
            (true, false) => {
                // Leaving the half-plane.
                let exit = if si == Orientation::Collinear {
                    ring[i].clone()
                } else {
                    match line.intersect_supporting(&ring[i], &ring[j]) {
                        Some(p) => p,
                        None => continue,
                    }
                };
                if let Some(mut chain) = current.take() {
                    if chain.vertices.last() != Some(&exit) {
                        chain.vertices.push(exit.clone());
                    }
                    chain.exit_param = Some(line.parameter(&exit));
                    chains.push(chain);
                }
            }
            (false, true) => {
                // Entering the half-plane.
                let entry = if sj == Orientation::Collinear {
                    ring[j].clone()
                } else {
                    match line.intersect_supporting(&ring[i], &ring[j]) {
                        Some(p) => p,
                        None => continue,
                    }
                };
                let mut chain = Chain {
                    vertices: vec![entry.clone()],
                    entry_param: Some(line.parameter(&entry)),
                    exit_param: None,
                };
                if ring[j] != entry {
                    chain.vertices.push(ring[j].clone());
                }
                current = Some(chain);
            }
            (false, false) => {}
        }
    }
    if let Some(chain) = current.take() {
        // The walk started on the cut side, so every chain must close.
        debug_assert!(chain.exit_param.is_some());
        chains.push(chain);
    }

    stitch_chains(chains)
}

/// Pair chain endpoints in order along the clip line and walk the
/// resulting cycles.
fn stitch_chains(chains: Vec<Chain>) -> Vec<Vec<Point>> {
    let mut endpoints: Vec<(Scalar, usize, EndpointKind)> = Vec::with_capacity(chains.len() * 2);
    for (id, chain) in chains.iter().enumerate() {
        match (&chain.entry_param, &chain.exit_param) {
            (Some(entry), Some(exit)) => {
                endpoints.push((entry.clone(), id, EndpointKind::Entry));
                endpoints.push((exit.clone(), id, EndpointKind::Exit));
            }
            _ => return chains.into_iter().map(|c| c.vertices).collect(),
        }
    }
    endpoints.sort_by(|a, b| a.0.cmp(&b.0));

    // Successive pairs bound the in-polygon stretches of the line; each
    // connects the exit of one chain to the entry of the next.
    let mut next_chain = vec![usize::MAX; chains.len()];
    for pair in endpoints.chunks(2) {
        if pair.len() != 2 {
            return Vec::new();
        }
        let (from, to) = match (pair[0].2, pair[1].2) {
            (EndpointKind::Exit, EndpointKind::Entry) => (pair[0].1, pair[1].1),
            (EndpointKind::Entry, EndpointKind::Exit) => (pair[1].1, pair[0].1),
            // Tangency sliver; dropping it only loses a zero-area piece.
            _ => continue,
        };
        next_chain[from] = to;
    }

    let mut pieces = Vec::new();
    let mut visited = vec![false; chains.len()];
    for start in 0..chains.len() {
        if visited[start] || next_chain[start] == usize::MAX {
            continue;
        }
        let mut piece = Vec::new();
        let mut at = start;
        loop {
            visited[at] = true;
            piece.extend(chains[at].vertices.iter().cloned());
            at = next_chain[at];
            if at == usize::MAX || visited[at] {
                break;
            }
        }
        if at == start {
            pieces.push(piece);
        }
    }
    pieces
}

/// Clip a ring to an axis-aligned rectangle (four half-plane clips).
#[must_use]
pub fn clip_ring_rect(
    ring: &[Point],
    x_min: &Scalar,
    x_max: &Scalar,
    y_min: &Scalar,
    y_max: &Scalar,
) -> Vec<Vec<Point>> {
    let corner = |x: &Scalar, y: &Scalar| Point::new(x.clone(), y.clone());
    // Counter-clockwise rectangle boundary; the interior is left of each
    // directed side.
    let edges = [
        Line::new(corner(x_min, y_min), corner(x_max, y_min)),
        Line::new(corner(x_max, y_min), corner(x_max, y_max)),
        Line::new(corner(x_max, y_max), corner(x_min, y_max)),
        Line::new(corner(x_min, y_max), corner(x_min, y_min)),
    ];

    let mut pieces = vec![ring.to_vec()];
    for edge in &edges {
        let mut next = Vec::new();
        for piece in &pieces {
            next.extend(clip_ring_halfplane(piece, edge));
        }
        pieces = next;
        if pieces.is_empty() {
            break;
        }
    }
    pieces
}
