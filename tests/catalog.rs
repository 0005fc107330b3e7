use chrono::Utc;
use marketplace_api::{
    entity::categories,
    services::category_service::{build_tree, collect_descendants},
    slugs::{short_code, slugify, with_short_code},
};
use uuid::Uuid;

fn category(name: &str, level: &str, parent_id: Option<Uuid>) -> categories::Model {
    categories::Model {
        id: Uuid::new_v4(),
        parent_id,
        level: level.into(),
        name: name.into(),
        slug: slugify(name),
        description: None,
        image_url: None,
        created_at: Utc::now().into(),
    }
}

#[test]
fn descendants_include_the_whole_subtree() {
    let fashion = category("Fashion", "super", None);
    let men = category("Men", "main", Some(fashion.id));
    let shirts = category("Shirts", "sub", Some(men.id));
    let books = category("Books", "super", None);
    let all = vec![fashion.clone(), men.clone(), shirts.clone(), books.clone()];

    let ids = collect_descendants(&all, fashion.id);
    assert_eq!(ids, vec![fashion.id, men.id, shirts.id]);
    assert_eq!(collect_descendants(&all, books.id), vec![books.id]);
}

#[test]
fn tree_nests_children_under_roots() {
    let fashion = category("Fashion", "super", None);
    let men = category("Men", "main", Some(fashion.id));
    let shirts = category("Shirts", "sub", Some(men.id));
    let books = category("Books", "super", None);

    let tree = build_tree(vec![fashion.clone(), men.clone(), shirts.clone(), books.clone()]);
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].category.id, fashion.id);
    assert_eq!(tree[0].children.len(), 1);
    assert_eq!(tree[0].children[0].children[0].category.slug, "shirts");
    assert!(tree[1].children.is_empty());
}

#[test]
fn slugs_are_lowercase_and_suffixed() {
    assert_eq!(slugify("Hello World!"), "hello-world");
    assert_eq!(with_short_code("shirt", "x1y2"), "shirt-x1y2");
    assert_eq!(with_short_code("", "abc"), "abc");

    let code = short_code(6);
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
}
