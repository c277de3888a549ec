use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ausbau_core::{DomainError, DomainResult, impl_uuid_newtype};

/// Category identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(Uuid);

impl_uuid_newtype!(CategoryId, "CategoryId");

/// Where in a project a category's items apply.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryScope {
    /// Applies to the whole house (facade, roofing, ...). Sorts first in
    /// the configuration wizard.
    WholeHouse,
    Room,
    Bathroom,
}

impl CategoryScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryScope::WholeHouse => "whole_house",
            CategoryScope::Room => "room",
            CategoryScope::Bathroom => "bathroom",
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            "whole_house" => Ok(CategoryScope::WholeHouse),
            "room" => Ok(CategoryScope::Room),
            "bathroom" => Ok(CategoryScope::Bathroom),
            other => Err(DomainError::validation(format!(
                "unknown category scope '{other}'"
            ))),
        }
    }
}

/// A catalog category (e.g. "Flooring", "Sanitary fittings").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub scope: CategoryScope,
    /// Manual ordering within the wizard; lower sorts first.
    pub sort_order: i32,
}

impl Category {
    pub fn new(name: impl Into<String>, scope: CategoryScope, sort_order: i32) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("category name must not be empty"));
        }
        Ok(Self {
            id: CategoryId::new(),
            name,
            scope,
            sort_order,
        })
    }
}

/// Orders categories for the configuration wizard.
///
/// Whole-house categories sort before all others, then the manual
/// `sort_order` applies; name breaks remaining ties deterministically.
pub fn wizard_order(mut categories: Vec<Category>) -> Vec<Category> {
    categories.sort_by(|a, b| {
        let rank = |c: &Category| c.scope != CategoryScope::WholeHouse;
        rank(a)
            .cmp(&rank(b))
            .then(a.sort_order.cmp(&b.sort_order))
            .then_with(|| a.name.cmp(&b.name))
    });
    categories
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cat(name: &str, scope: CategoryScope, sort_order: i32) -> Category {
        Category {
            id: CategoryId::new(),
            name: name.to_string(),
            scope,
            sort_order,
        }
    }

    #[test]
    fn whole_house_sorts_before_everything_else() {
        let ordered = wizard_order(vec![
            cat("Tiles", CategoryScope::Bathroom, 0),
            cat("Doors", CategoryScope::Room, 1),
            cat("Facade", CategoryScope::WholeHouse, 9),
            cat("Roofing", CategoryScope::WholeHouse, 2),
        ]);

        let names: Vec<_> = ordered.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Roofing", "Facade", "Tiles", "Doors"]);
    }

    #[test]
    fn name_breaks_sort_order_ties() {
        let ordered = wizard_order(vec![
            cat("Windows", CategoryScope::Room, 3),
            cat("Doors", CategoryScope::Room, 3),
        ]);
        assert_eq!(ordered[0].name, "Doors");
    }

    #[test]
    fn rejects_blank_names() {
        assert!(Category::new("  ", CategoryScope::Room, 0).is_err());
    }

    #[test]
    fn scope_round_trips_through_strings() {
        for scope in [
            CategoryScope::WholeHouse,
            CategoryScope::Room,
            CategoryScope::Bathroom,
        ] {
            assert_eq!(CategoryScope::parse(scope.as_str()).unwrap(), scope);
        }
        assert!(CategoryScope::parse("garage").is_err());
    }

    proptest! {
        #[test]
        fn ordering_is_stable_under_shuffling(seed in 0u64..1000) {
            let mut cats = vec![
                cat("A", CategoryScope::WholeHouse, 2),
                cat("B", CategoryScope::Room, 0),
                cat("C", CategoryScope::Bathroom, 1),
                cat("D", CategoryScope::WholeHouse, 1),
            ];
            // Cheap deterministic shuffle.
            cats.rotate_left((seed % 4) as usize);
            if seed % 2 == 0 {
                cats.reverse();
            }

            let names: Vec<String> = wizard_order(cats).into_iter().map(|c| c.name).collect();
            prop_assert_eq!(names, vec!["D".to_string(), "A".to_string(), "B".to_string(), "C".to_string()]);
        }
    }
}
