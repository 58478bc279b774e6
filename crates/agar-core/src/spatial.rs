use crate::entity::Food;
use crate::geometry::Point;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// Index entry for a live food pellet: slot in the food vector plus position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FoodLocation {
    pub index: usize,
    pub position: Point,
}

impl RTreeObject for FoodLocation {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for FoodLocation {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Build an R*-tree over live pellets via bulk_load (O(n log n)).
pub fn build_food_index(food: &[Food]) -> RTree<FoodLocation> {
    let locations = food
        .iter()
        .enumerate()
        .filter(|(_, f)| f.is_alive())
        .map(|(index, f)| FoodLocation {
            index,
            position: f.position(),
        })
        .collect();
    RTree::bulk_load(locations)
}

/// Pellets strictly closer than `radius` to `center`, with their distances.
/// A non-positive radius reaches nothing.
pub fn food_within(tree: &RTree<FoodLocation>, center: Point, radius: f64) -> Vec<(usize, f64)> {
    if radius <= 0.0 || !radius.is_finite() {
        return Vec::new();
    }
    let mut hits: Vec<(usize, f64)> = tree
        .locate_within_distance(center, radius * radius)
        .map(|loc| (loc.index, loc.distance_2(&center).sqrt()))
        .filter(|&(_, dist)| dist < radius)
        .collect();
    hits.sort_unstable_by_key(|&(index, _)| index);
    hits
}
