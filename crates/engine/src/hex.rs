/// Axial hex coordinate on the pointy-top world grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HexPoint {
    pub q: i32,
    pub r: i32,
}

const NEIGHBOR_OFFSETS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

impl HexPoint {
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    pub fn distance_to(self, other: HexPoint) -> u32 {
        let dq = self.q - other.q;
        let dr = self.r - other.r;
        let ds = dq + dr;
        ((dq.abs() + dr.abs() + ds.abs()) / 2) as u32
    }

    pub fn neighbors(self) -> [HexPoint; 6] {
        let mut out = [self; 6];
        for (slot, (dq, dr)) in out.iter_mut().zip(NEIGHBOR_OFFSETS) {
            slot.q += dq;
            slot.r += dr;
        }
        out
    }

    pub fn is_adjacent_to(self, other: HexPoint) -> bool {
        self.distance_to(other) == 1
    }
}
