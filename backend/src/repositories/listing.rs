//! Filtered salad and recipe listings
//!
//! A recipe passes the filter when
//!
//! - it has the requested status,
//! - it is unrated or rated at least `min_rate`,
//! - every ingredient it needs is among `available_ingredients`,
//! - its salad carries at least one of `salad_types`.
//!
//! An empty id set leaves its stage out. The stages are plain set predicates,
//! so the result does not depend on the order they are applied in.

use salad_recipes_shared::{page_offset, RecipeFilter, PAGE_SIZE};
use sqlx::{Postgres, QueryBuilder};

/// Start a query over recipes joined to their salads (`r`, `s`) with the
/// filter applied as the `WHERE` clause
///
/// `select` is the projection, e.g. `SELECT s.id, s.author_id`.
pub(crate) fn filtered(select: &str, filter: &RecipeFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(select);
    query.push(" FROM recipe r JOIN salad s ON s.id = r.salad_id WHERE r.status = ");
    query.push_bind(filter.status.code());
    query.push(" AND (r.rating IS NULL OR r.rating >= ");
    query.push_bind(filter.min_rate);
    query.push(")");

    if !filter.available_ingredients.is_empty() {
        query.push(
            " AND NOT EXISTS (SELECT 1 FROM recipe_ingredient ri \
             WHERE ri.recipe_id = r.id AND ri.ingredient_id <> ALL(",
        );
        query.push_bind(filter.available_ingredients.clone());
        query.push("))");
    }

    if !filter.salad_types.is_empty() {
        query.push(
            " AND EXISTS (SELECT 1 FROM types_of_salads ts \
             WHERE ts.salad_id = s.id AND ts.type_id = ANY(",
        );
        query.push_bind(filter.salad_types.clone());
        query.push("))");
    }

    query
}

/// Order best rated first and cut out one page
pub(crate) fn push_page(query: &mut QueryBuilder<'static, Postgres>, page: u32) {
    query.push(" ORDER BY r.rating DESC NULLS LAST, s.id LIMIT ");
    query.push_bind(PAGE_SIZE);
    query.push(" OFFSET ");
    query.push_bind(page_offset(page));
}

#[cfg(test)]
mod tests {
    use super::*;
    use salad_recipes_shared::RecipeStatus;
    use uuid::Uuid;

    #[test]
    fn test_empty_sets_leave_stages_out() {
        let query = filtered("SELECT s.id", &RecipeFilter::default());
        let sql = query.sql();

        assert!(sql.starts_with("SELECT s.id FROM recipe r JOIN salad s"));
        assert!(sql.contains("r.status = $1"));
        assert!(sql.contains("r.rating IS NULL OR r.rating >= $2"));
        assert!(!sql.contains("recipe_ingredient"));
        assert!(!sql.contains("types_of_salads"));
    }

    #[test]
    fn test_all_stages_bind_in_order() {
        let filter = RecipeFilter {
            available_ingredients: vec![Uuid::new_v4(), Uuid::new_v4()],
            salad_types: vec![Uuid::new_v4()],
            min_rate: 3.5,
            status: RecipeStatus::Moderation,
        };
        let mut query = filtered("SELECT COUNT(*)", &filter);
        push_page(&mut query, 2);
        let sql = query.sql();

        assert!(sql.contains("ri.ingredient_id <> ALL($3)"));
        assert!(sql.contains("ts.type_id = ANY($4)"));
        assert!(sql.ends_with("ORDER BY r.rating DESC NULLS LAST, s.id LIMIT $5 OFFSET $6"));
    }

    #[test]
    fn test_only_types_stage() {
        let filter = RecipeFilter {
            salad_types: vec![Uuid::new_v4()],
            ..RecipeFilter::default()
        };
        let query = filtered("SELECT s.id", &filter);
        let sql = query.sql();

        assert!(!sql.contains("recipe_ingredient"));
        assert!(sql.contains("ts.type_id = ANY($3)"));
    }
}
