//! Domain models for the salad recipes catalogue

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role assigned to accounts registered without an explicit one
pub const DEFAULT_ROLE: &str = "user";

/// User account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Unique login
    pub username: String,
    /// Password hash, stored as-is
    #[serde(skip_serializing)]
    pub password: String,
    pub email: String,
    pub role: String,
}

/// Credentials projection of a user, used for login lookups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAuth {
    pub id: Uuid,
    pub hashed_password: String,
    pub role: String,
}

/// A published salad
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salad {
    pub id: Uuid,
    pub author_id: Uuid,
    pub name: String,
    pub description: String,
}

/// Lifecycle status of a recipe
///
/// Persisted as its integer discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum RecipeStatus {
    #[default]
    Editing = 1,
    Moderation = 2,
    Published = 3,
    Rejected = 4,
    Closed = 5,
}

impl RecipeStatus {
    /// Integer code stored in the `status` column
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Parse a stored status code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::Editing),
            2 => Some(Self::Moderation),
            3 => Some(Self::Published),
            4 => Some(Self::Rejected),
            5 => Some(Self::Closed),
            _ => None,
        }
    }
}

/// Cookable specification attached to a salad
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    pub salad_id: Uuid,
    pub status: RecipeStatus,
    pub number_of_servings: i32,
    /// Minutes
    pub time_to_cook: i32,
    pub rating: Option<f32>,
}

/// One ordered instruction of a recipe
///
/// Step numbers of a recipe always form the dense run `1..=N`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeStep {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub name: String,
    pub description: String,
    pub step_num: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: Uuid,
    pub type_id: Uuid,
    pub name: String,
    pub calories: i32,
}

/// Join row between a recipe and one of its ingredients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientLink {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub ingredient_id: Uuid,
    pub measurement_id: Option<Uuid>,
    pub amount: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientType {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

/// Unit of measure for recipe ingredients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    pub id: Uuid,
    pub name: String,
    /// Grams per unit
    pub grams: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaladType {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

/// Word checked by content validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyWord {
    pub id: Uuid,
    pub word: String,
}

/// User review of a salad, one per (salad, author)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub author_id: Uuid,
    pub salad_id: Uuid,
    pub text: String,
    pub rating: i32,
}

/// Criteria for the salad and recipe listings
///
/// An empty id set means "no constraint" for that stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeFilter {
    /// Ingredients the caller has; a recipe matches when it needs nothing else
    #[serde(default)]
    pub available_ingredients: Vec<Uuid>,
    /// A salad matches when tagged with at least one of these
    #[serde(default)]
    pub salad_types: Vec<Uuid>,
    /// Inclusive lower bound; unrated recipes always pass
    #[serde(default)]
    pub min_rate: f32,
    pub status: RecipeStatus,
}

impl Default for RecipeFilter {
    fn default() -> Self {
        Self {
            available_ingredients: Vec::new(),
            salad_types: Vec::new(),
            min_rate: 0.0,
            status: RecipeStatus::Published,
        }
    }
}
