//! Answer cards drifting across the playfield

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{outside_field, rect_contains};

/// Stable card identity (allocation order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

/// Playfield edge a card enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnEdge {
    Top,
    Bottom,
    Left,
    Right,
}

impl SpawnEdge {
    pub const ALL: [SpawnEdge; 4] = [
        SpawnEdge::Top,
        SpawnEdge::Bottom,
        SpawnEdge::Left,
        SpawnEdge::Right,
    ];

    /// Unit vector pointing into the playfield
    pub fn inward(self) -> Vec2 {
        match self {
            SpawnEdge::Top => Vec2::Y,
            SpawnEdge::Bottom => Vec2::NEG_Y,
            SpawnEdge::Left => Vec2::X,
            SpawnEdge::Right => Vec2::NEG_X,
        }
    }
}

/// A moving card carrying a candidate answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub value: u32,
    /// Fixed at spawn
    pub is_correct: bool,
    /// Center of the card (pixels, y down)
    pub pos: Vec2,
    /// Pixels per second
    pub vel: Vec2,
    pub size: Vec2,
    pub edge: SpawnEdge,
}

impl Card {
    /// Advance by `vel * dt`
    pub fn step(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }

    /// Point-in-rectangle test on the card's bounds
    pub fn contains(&self, point: Vec2) -> bool {
        rect_contains(self.pos, self.size, point)
    }

    /// True once the center is more than `margin` outside the field
    pub fn is_out_of_bounds(&self, width: f32, height: f32, margin: f32) -> bool {
        outside_field(self.pos, width, height, margin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_at(x: f32, y: f32) -> Card {
        Card {
            id: CardId(1),
            value: 56,
            is_correct: true,
            pos: Vec2::new(x, y),
            vel: Vec2::new(0.0, 100.0),
            size: Vec2::new(120.0, 80.0),
            edge: SpawnEdge::Top,
        }
    }

    #[test]
    fn test_step() {
        let mut card = card_at(10.0, 10.0);
        card.step(0.5);
        assert_eq!(card.pos, Vec2::new(10.0, 60.0));
    }

    #[test]
    fn test_contains() {
        let card = card_at(200.0, 200.0);
        assert!(card.contains(Vec2::new(255.0, 235.0)));
        assert!(!card.contains(Vec2::new(265.0, 200.0)));
    }

    #[test]
    fn test_out_of_bounds_uses_margin() {
        let card = card_at(600.0, 890.0);
        assert!(!card.is_out_of_bounds(1200.0, 800.0, 100.0));
        let card = card_at(600.0, 901.0);
        assert!(card.is_out_of_bounds(1200.0, 800.0, 100.0));
    }

    #[test]
    fn test_inward_points_into_field() {
        assert_eq!(SpawnEdge::Top.inward(), Vec2::new(0.0, 1.0));
        assert_eq!(SpawnEdge::Right.inward(), Vec2::new(-1.0, 0.0));
    }
}
