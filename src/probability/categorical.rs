use std::collections::HashMap;

use rand::Rng;

use super::{MissingProbability, sigmoid};
use crate::sampler::standard_normal;
use crate::value::Value;

/// Hashable identity of a category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CategoryKey {
    Text(String),
    Boolean(bool),
    Integer(i64),
    /// Float categories compare by bit pattern.
    Float(u64),
    /// Cells that were already missing form a category of their own.
    Missing,
}

impl From<&Value> for CategoryKey {
    fn from(value: &Value) -> Self {
        match value {
            Value::Text(s) => Self::Text(s.clone()),
            Value::Boolean(b) => Self::Boolean(*b),
            Value::Integer(i) => Self::Integer(*i),
            Value::Float(f) => Self::Float(f.to_bits()),
            Value::Missing(_) => Self::Missing,
        }
    }
}

/// Per-category missingness probabilities, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct CategoricalAssignment {
    categories: Vec<(CategoryKey, f64)>,
    index: HashMap<CategoryKey, usize>,
}

impl CategoricalAssignment {
    /// Draws one standard-normal sample per distinct value, in the order the
    /// values first appear, and maps it through the sigmoid.
    pub fn draw<R: Rng + ?Sized>(values: &[Value], rng: &mut R) -> Self {
        let mut assignment = Self::default();
        for value in values {
            let key = CategoryKey::from(value);
            if assignment.index.contains_key(&key) {
                continue;
            }
            let probability = sigmoid(standard_normal(rng));
            assignment.insert(key, probability);
        }
        assignment
    }

    fn insert(&mut self, key: CategoryKey, probability: f64) {
        self.index.insert(key.clone(), self.categories.len());
        self.categories.push((key, probability));
    }

    #[must_use]
    pub fn get(&self, key: &CategoryKey) -> Option<f64> {
        self.index.get(key).map(|&slot| self.categories[slot].1)
    }

    /// Categories with their probabilities, in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&CategoryKey, f64)> {
        self.categories.iter().map(|(key, p)| (key, *p))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl MissingProbability for CategoricalAssignment {
    /// Categories that were not present when the assignment was drawn get
    /// probability `0`.
    fn probability_for(&self, value: &Value) -> f64 {
        self.get(&CategoryKey::from(value)).unwrap_or(0.0)
    }
}
