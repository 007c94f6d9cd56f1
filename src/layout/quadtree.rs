use emath::{Vec2, vec2};

const MAX_BODIES_PER_LEAF: usize = 4;
const MAX_DEPTH: u8 = 12;

/// Axis-aligned square cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Square {
    pub(super) center: Vec2,
    pub(super) half: f32,
}

impl Square {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(min, max), point| (min.min(*point), max.max(*point)));
        if !(min.is_finite() && max.is_finite()) {
            return None;
        }

        let extent = max - min;
        Some(Self {
            center: min + extent * 0.5,
            half: extent.max_elem().max(1.0) * 0.5 + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let offset = (point - self.center).abs();
        offset.x <= self.half && offset.y <= self.half
    }

    /// Euclidean gap from `point` to the square's edge; zero inside.
    pub(super) fn gap_to(self, point: Vec2) -> f32 {
        let outside = ((point - self.center).abs() - Vec2::splat(self.half)).max(Vec2::ZERO);
        outside.length()
    }

    fn quadrant(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }

    fn sub_square(self, quadrant: usize) -> Self {
        let quarter = self.half * 0.5;
        let sign = |bit: usize| if quadrant & bit == 0 { -quarter } else { quarter };
        Self {
            center: self.center + vec2(sign(1), sign(2)),
            half: quarter,
        }
    }
}

/// One cell of the tree. Leaves list their bodies; inner cells only aggregate.
#[derive(Debug)]
pub(super) struct Cell {
    pub(super) square: Square,
    pub(super) mass: f32,
    pub(super) centroid: Vec2,
    /// Largest collision radius among the bodies below this cell.
    pub(super) max_radius: f32,
    pub(super) bodies: Vec<usize>,
    children: [Option<usize>; 4],
}

impl Cell {
    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }
}

/// Barnes-Hut tree stored flat; cell 0 is the root.
#[derive(Debug)]
pub(super) struct QuadTree {
    cells: Vec<Cell>,
}

impl QuadTree {
    pub(super) fn build(positions: &[Vec2], radii: &[f32]) -> Option<Self> {
        let square = Square::enclosing(positions)?;
        let mut tree = Self {
            cells: Vec::with_capacity(positions.len() * 2),
        };
        tree.insert_cell(square, (0..positions.len()).collect(), positions, radii, 0);
        Some(tree)
    }

    fn insert_cell(
        &mut self,
        square: Square,
        bodies: Vec<usize>,
        positions: &[Vec2],
        radii: &[f32],
        depth: u8,
    ) -> usize {
        let mass = bodies.len() as f32;
        let centroid = bodies
            .iter()
            .fold(Vec2::ZERO, |sum, &body| sum + positions[body])
            / mass.max(1.0);
        let max_radius = bodies
            .iter()
            .map(|&body| radii.get(body).copied().unwrap_or(0.0))
            .fold(0.0, f32::max);

        let id = self.cells.len();
        self.cells.push(Cell {
            square,
            mass,
            centroid,
            max_radius,
            bodies: Vec::new(),
            children: [None; 4],
        });

        let mut groups: [Vec<usize>; 4] = Default::default();
        for &body in &bodies {
            groups[square.quadrant(positions[body])].push(body);
        }
        let occupied = groups.iter().filter(|group| !group.is_empty()).count();

        if bodies.len() <= MAX_BODIES_PER_LEAF || depth >= MAX_DEPTH || occupied < 2 {
            self.cells[id].bodies = bodies;
            return id;
        }

        for (quadrant, group) in groups.into_iter().enumerate() {
            if !group.is_empty() {
                let child =
                    self.insert_cell(square.sub_square(quadrant), group, positions, radii, depth + 1);
                self.cells[id].children[quadrant] = Some(child);
            }
        }
        id
    }

    pub(super) fn root(&self) -> &Cell {
        &self.cells[0]
    }

    /// Depth-first walk. `enter` returns false to skip a cell's children.
    pub(super) fn visit(&self, mut enter: impl FnMut(&Cell) -> bool) {
        let mut stack = vec![0];
        while let Some(id) = stack.pop() {
            let cell = &self.cells[id];
            if enter(cell) {
                stack.extend(cell.children.iter().flatten().copied());
            }
        }
    }
}
