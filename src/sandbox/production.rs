//! Production wish list for the sandbox

use serde::Serialize;

use crate::core::types::Priority;
use crate::engine::WishList;
use crate::units::UnitCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Request {
    #[serde(with = "crate::units::category::category_bits")]
    pub categories: UnitCategory,
    pub priority: Priority,
}

#[derive(Debug, Default)]
pub struct ProductionQueue {
    requests: Vec<Request>,
}

impl ProductionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Requests of one priority
    pub fn count(&self, priority: Priority) -> usize {
        self.requests.iter().filter(|r| r.priority == priority).count()
    }

    /// Hand over everything queued, highest priority first
    pub fn drain(&mut self) -> Vec<Request> {
        let mut out: Vec<Request> = self.requests.drain(..).collect();
        out.sort_by(|a, b| b.priority.cmp(&a.priority));
        out
    }
}

impl WishList for ProductionQueue {
    fn push(&mut self, categories: UnitCategory, priority: Priority) {
        tracing::trace!("Wish list: {:?} at {:?}", categories, priority);
        self.requests.push(Request { categories, priority });
    }
}
