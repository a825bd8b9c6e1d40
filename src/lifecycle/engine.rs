use crate::model::position::Position;

/// Open positions in creation order. Entries add, exits remove; a position
/// is never edited in place.
#[derive(Debug, Clone, Default)]
pub struct PositionBook {
    positions: Vec<Position>,
}

impl PositionBook {
    pub fn on_entry_filled(&mut self, position: Position) -> String {
        let id = position.id.clone();
        self.positions.push(position);
        id
    }

    pub fn on_position_closed(&mut self, position_id: &str) -> Option<Position> {
        let idx = self.positions.iter().position(|p| p.id == position_id)?;
        Some(self.positions.remove(idx))
    }

    pub fn get(&self, position_id: &str) -> Option<&Position> {
        self.positions.iter().find(|p| p.id == position_id)
    }

    pub fn contains(&self, position_id: &str) -> bool {
        self.get(position_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter()
    }

    pub fn to_vec(&self) -> Vec<Position> {
        self.positions.clone()
    }

    /// Sum of entry notionals, in quote units.
    pub fn open_exposure(&self) -> f64 {
        self.positions.iter().map(Position::notional).sum()
    }
}
