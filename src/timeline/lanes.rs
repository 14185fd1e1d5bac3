use smallvec::SmallVec;

/// Active time range of one link, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Span {
    /// Start (first event timestamp).
    pub from: f64,
    /// End (last event timestamp).
    pub to: f64,
}

impl Span {
    /// Span from `from` to `to`.
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }

    /// Whether an already-placed span collides with `candidate`.
    ///
    /// Touching spans do not overlap; identical spans always do, zero-width ones included.
    pub fn overlaps(&self, candidate: &Span) -> bool {
        if self.from == candidate.from && self.to == candidate.to {
            return true;
        }
        !(self.to <= candidate.from || self.from >= candidate.to)
    }
}

/// Greedy first-fit packing of spans into rows.
///
/// Lanes live in a `Vec` and are scanned by ascending index, so the packing only depends on the
/// order spans are placed in.
#[derive(Clone, Debug, Default)]
pub struct LanePacker {
    lanes: Vec<SmallVec<[Span; 4]>>,
}

impl LanePacker {
    /// No lanes yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `span` in the lowest lane holding nothing that overlaps it; returns that lane.
    pub fn place(&mut self, span: Span) -> usize {
        let mut lane = 0;
        while let Some(placed) = self.lanes.get(lane) {
            if !placed.iter().any(|p| p.overlaps(&span)) {
                break;
            }
            lane += 1;
        }
        if lane == self.lanes.len() {
            self.lanes.push(SmallVec::new());
        }
        self.lanes[lane].push(span);
        lane
    }

    /// Number of lanes opened so far.
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Spans placed in `lane`.
    pub fn spans(&self, lane: usize) -> &[Span] {
        self.lanes.get(lane).map_or(&[][..], |l| l.as_slice())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/lanes.rs"]
mod tests;
