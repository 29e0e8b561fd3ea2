//! Integration tests for the filtered salad and recipe listings
//!
//! Every test tags its salads with a fresh salad type and filters on it, so
//! rows from other tests never show up in the results.

mod common;

use std::collections::HashSet;

use common::TestDb;
use salad_recipes_shared::{RecipeFilter, RecipeStatus, PAGE_SIZE};
use uuid::Uuid;

/// Listed salads with a fresh type; returns (type id, salad ids)
async fn tagged_salads(db: &TestDb, ratings: &[Option<f32>]) -> (Uuid, Vec<Uuid>) {
    let author = db.create_user().await;
    let type_id = db.create_salad_type().await;
    let mut salads = Vec::new();
    for rating in ratings {
        let (salad_id, _) = db.create_listed_salad(author, *rating).await;
        db.repos.salad_types().link(salad_id, type_id).await.unwrap();
        salads.push(salad_id);
    }
    (type_id, salads)
}

fn by_type(type_id: Uuid) -> RecipeFilter {
    RecipeFilter {
        salad_types: vec![type_id],
        ..RecipeFilter::default()
    }
}

async fn listed_ids(db: &TestDb, filter: &RecipeFilter, page: u32) -> Vec<Uuid> {
    db.repos
        .salads()
        .get_all(filter, page)
        .await
        .unwrap()
        .items
        .into_iter()
        .map(|s| s.id)
        .collect()
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_orders_by_rating_with_unrated_last() {
    let db = TestDb::new().await;
    let (type_id, salads) = tagged_salads(&db, &[Some(3.0), None, Some(4.5), Some(1.0)]).await;

    let ids = listed_ids(&db, &by_type(type_id), 1).await;
    assert_eq!(ids, vec![salads[2], salads[0], salads[3], salads[1]]);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_min_rate_is_inclusive_and_keeps_unrated() {
    let db = TestDb::new().await;
    let (type_id, salads) = tagged_salads(&db, &[Some(3.0), Some(2.9), None, Some(5.0)]).await;

    let filter = RecipeFilter {
        min_rate: 3.0,
        ..by_type(type_id)
    };
    let ids = listed_ids(&db, &filter, 1).await;
    assert_eq!(ids, vec![salads[3], salads[0], salads[2]]);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_ingredient_stage_is_a_subset_test() {
    let db = TestDb::new().await;
    let (type_id, salads) = tagged_salads(&db, &[Some(5.0), Some(4.0), Some(3.0)]).await;
    let lettuce = db.create_ingredient().await;
    let tomato = db.create_ingredient().await;
    let anchovy = db.create_ingredient().await;

    let recipe_of = |salad_id: Uuid| {
        let repos = db.repos.clone();
        async move { repos.recipes().get_by_salad_id(salad_id).await.unwrap().id }
    };
    let first = recipe_of(salads[0]).await;
    let second = recipe_of(salads[1]).await;
    // salads[2] needs nothing
    db.repos.ingredients().link(first, lettuce).await.unwrap();
    db.repos.ingredients().link(first, tomato).await.unwrap();
    db.repos.ingredients().link(second, lettuce).await.unwrap();
    db.repos.ingredients().link(second, anchovy).await.unwrap();

    let filter = RecipeFilter {
        available_ingredients: vec![lettuce, tomato],
        ..by_type(type_id)
    };
    let ids = listed_ids(&db, &filter, 1).await;
    assert_eq!(ids, vec![salads[0], salads[2]]);

    let filter = RecipeFilter {
        available_ingredients: vec![lettuce, tomato, anchovy],
        ..by_type(type_id)
    };
    assert_eq!(listed_ids(&db, &filter, 1).await, salads);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_type_stage_matches_any_listed_type() {
    let db = TestDb::new().await;
    let (green, green_salads) = tagged_salads(&db, &[Some(4.0)]).await;
    let (warm, warm_salads) = tagged_salads(&db, &[Some(3.0)]).await;
    let (_, other_salads) = tagged_salads(&db, &[Some(5.0)]).await;

    let filter = RecipeFilter {
        salad_types: vec![green, warm],
        ..RecipeFilter::default()
    };
    let ids: HashSet<Uuid> = listed_ids(&db, &filter, 1).await.into_iter().collect();

    assert!(ids.contains(&green_salads[0]));
    assert!(ids.contains(&warm_salads[0]));
    assert!(!ids.contains(&other_salads[0]));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_status_and_missing_recipe_exclude_salads() {
    let db = TestDb::new().await;
    let author = db.create_user().await;
    let type_id = db.create_salad_type().await;

    let (published, _) = db.create_listed_salad(author, Some(4.0)).await;
    let drafted = db.create_salad(author).await;
    db.create_recipe(drafted, RecipeStatus::Editing, Some(4.0)).await;
    let bare = db.create_salad(author).await;
    for salad_id in [published, drafted, bare] {
        db.repos.salad_types().link(salad_id, type_id).await.unwrap();
    }

    assert_eq!(listed_ids(&db, &by_type(type_id), 1).await, vec![published]);

    let filter = RecipeFilter {
        status: RecipeStatus::Editing,
        ..by_type(type_id)
    };
    assert_eq!(listed_ids(&db, &filter, 1).await, vec![drafted]);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_pagination_over_filtered_rows() {
    let db = TestDb::new().await;
    let ratings: Vec<Option<f32>> = (0..32).map(|i| Some(i as f32 / 10.0)).collect();
    let (type_id, salads) = tagged_salads(&db, &ratings).await;
    let filter = by_type(type_id);

    let first = db.repos.salads().get_all(&filter, 1).await.unwrap();
    let second = db.repos.salads().get_all(&filter, 2).await.unwrap();
    let third = db.repos.salads().get_all(&filter, 3).await.unwrap();

    assert_eq!(first.items.len(), PAGE_SIZE as usize);
    assert_eq!(second.items.len(), 2);
    assert!(third.items.is_empty());
    assert_eq!(first.total_pages, 2);
    assert_eq!(second.total_pages, 2);

    // Lowest rated come last
    let tail: Vec<Uuid> = second.items.iter().map(|s| s.id).collect();
    assert_eq!(tail, vec![salads[1], salads[0]]);

    // Page 0 reads as page 1
    let zero = db.repos.salads().get_all(&filter, 0).await.unwrap();
    assert_eq!(zero.items, first.items);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_recipe_listing_uses_same_filter() {
    let db = TestDb::new().await;
    let (type_id, salads) = tagged_salads(&db, &[Some(2.0), Some(4.0)]).await;

    let page = db
        .repos
        .recipes()
        .get_all(&by_type(type_id), 1)
        .await
        .unwrap();

    assert_eq!(page.total_pages, 1);
    let salad_ids: Vec<Uuid> = page.items.iter().map(|r| r.salad_id).collect();
    assert_eq!(salad_ids, vec![salads[1], salads[0]]);
    assert!(page
        .items
        .iter()
        .all(|r| r.status == RecipeStatus::Published));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_rated_by_user_lists_commented_salads() {
    let db = TestDb::new().await;
    let author = db.create_user().await;
    let reviewer = db.create_user().await;
    let liked = db.create_salad(author).await;
    let ignored = db.create_salad(author).await;

    let comment = salad_recipes_shared::Comment {
        id: Uuid::nil(),
        author_id: reviewer,
        salad_id: liked,
        text: "fresh and crunchy".to_string(),
        rating: 5,
    };
    db.repos.comments().create(&comment).await.unwrap();

    let page = db
        .repos
        .salads()
        .get_all_rated_by_user(reviewer, 1)
        .await
        .unwrap();
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, liked);
    assert_ne!(page.items[0].id, ignored);
}
