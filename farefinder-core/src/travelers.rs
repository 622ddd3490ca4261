use serde::{Deserialize, Serialize};
use crate::{CoreError, CoreResult};

/// Adults plus children may never exceed this many seats.
pub const MAX_SEATED_TRAVELERS: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TravelerCategory {
    Adults,
    Children,
    Infants,
}

impl TravelerCategory {
    pub const ALL: [TravelerCategory; 3] = [
        TravelerCategory::Adults,
        TravelerCategory::Children,
        TravelerCategory::Infants,
    ];

    pub fn min(&self) -> u32 {
        match self {
            TravelerCategory::Adults => 1,
            TravelerCategory::Children => 0,
            TravelerCategory::Infants => 0,
        }
    }

    pub fn max(&self) -> u32 {
        match self {
            TravelerCategory::Adults => 9,
            TravelerCategory::Children => 8,
            TravelerCategory::Infants => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TravelerCategory::Adults => "Adults",
            TravelerCategory::Children => "Children",
            TravelerCategory::Infants => "Infants",
        }
    }

    /// Cross-category capacity rule checked before adding one traveler.
    /// Infants travel on an adult's lap, so there is at most one per adult.
    pub fn validate_add(&self, counts: &TravelerCounts) -> bool {
        match self {
            TravelerCategory::Adults | TravelerCategory::Children => {
                counts.adults + counts.children < MAX_SEATED_TRAVELERS
            }
            TravelerCategory::Infants => counts.infants < counts.adults,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelerCounts {
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

impl Default for TravelerCounts {
    fn default() -> Self {
        Self { adults: 1, children: 0, infants: 0 }
    }
}

impl TravelerCounts {
    pub fn new(adults: u32, children: u32, infants: u32) -> CoreResult<Self> {
        let counts = Self { adults, children, infants };
        counts.validate()?;
        Ok(counts)
    }

    /// Check per-category bounds and the seat/lap invariants.
    pub fn validate(&self) -> CoreResult<()> {
        for category in TravelerCategory::ALL {
            let count = self.count(category);
            if count < category.min() || count > category.max() {
                return Err(CoreError::ValidationError(format!(
                    "{} must be between {} and {}",
                    category.label(),
                    category.min(),
                    category.max()
                )));
            }
        }
        if self.adults + self.children > MAX_SEATED_TRAVELERS {
            return Err(CoreError::ValidationError(format!(
                "At most {} adults and children can travel together",
                MAX_SEATED_TRAVELERS
            )));
        }
        if self.infants > self.adults {
            return Err(CoreError::ValidationError(
                "Each infant must travel with an adult".to_string(),
            ));
        }
        Ok(())
    }

    pub fn count(&self, category: TravelerCategory) -> u32 {
        match category {
            TravelerCategory::Adults => self.adults,
            TravelerCategory::Children => self.children,
            TravelerCategory::Infants => self.infants,
        }
    }

    fn count_mut(&mut self, category: TravelerCategory) -> &mut u32 {
        match category {
            TravelerCategory::Adults => &mut self.adults,
            TravelerCategory::Children => &mut self.children,
            TravelerCategory::Infants => &mut self.infants,
        }
    }

    pub fn can_increment(&self, category: TravelerCategory) -> bool {
        self.count(category) < category.max() && category.validate_add(self)
    }

    pub fn can_decrement(&self, category: TravelerCategory) -> bool {
        self.count(category) > category.min()
    }

    /// Add one traveler. Returns false (and leaves the counts alone) when a rule forbids it.
    pub fn increment(&mut self, category: TravelerCategory) -> bool {
        if !self.can_increment(category) {
            return false;
        }
        *self.count_mut(category) += 1;
        true
    }

    /// Remove one traveler. Dropping an adult pulls infants down with it.
    pub fn decrement(&mut self, category: TravelerCategory) -> bool {
        if !self.can_decrement(category) {
            return false;
        }
        *self.count_mut(category) -= 1;
        if category == TravelerCategory::Adults {
            self.infants = self.infants.min(self.adults);
        }
        true
    }

    pub fn total(&self) -> u32 {
        self.adults + self.children + self.infants
    }

    pub fn label(&self) -> String {
        let total = self.total();
        if total == 1 {
            "1 Traveler".to_string()
        } else {
            format!("{} Travelers", total)
        }
    }
}
