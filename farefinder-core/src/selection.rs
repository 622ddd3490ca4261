use crate::offer::{Direction, FlightOffer};

/// The user's pick for each direction. At most one offer per direction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    departure: Option<FlightOffer>,
    inbound: Option<FlightOffer>,
}

impl Selection {
    pub fn get(&self, direction: Direction) -> Option<&FlightOffer> {
        self.slot(direction).as_ref()
    }

    pub fn selected_id(&self, direction: Direction) -> Option<&str> {
        self.get(direction).map(|o| o.id.as_str())
    }

    /// Picking the offer that is already selected deselects it; picking another replaces it.
    /// Returns whether `offer` is selected afterwards.
    pub fn toggle(&mut self, direction: Direction, offer: FlightOffer) -> bool {
        let slot = self.slot_mut(direction);
        if slot.as_ref().map(|current| current.id == offer.id).unwrap_or(false) {
            *slot = None;
            false
        } else {
            *slot = Some(offer);
            true
        }
    }

    pub fn clear(&mut self) {
        self.departure = None;
        self.inbound = None;
    }

    pub fn is_empty(&self) -> bool {
        self.departure.is_none() && self.inbound.is_none()
    }

    fn slot(&self, direction: Direction) -> &Option<FlightOffer> {
        match direction {
            Direction::Departure => &self.departure,
            Direction::Return => &self.inbound,
        }
    }

    fn slot_mut(&mut self, direction: Direction) -> &mut Option<FlightOffer> {
        match direction {
            Direction::Departure => &mut self.departure,
            Direction::Return => &mut self.inbound,
        }
    }
}
