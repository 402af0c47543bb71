//! Search and pagination tests.
//!
//! The scan covers live rows only, scoped to one data source, matching
//! `id`, `content`, or `assign_to` as an unanchored substring, ordered
//! by `id` descending, at most SEARCH_PAGE_LIMIT rows per page.

use annot_core::{AnnotationRepository, AnnotationSearch, Status, UpdateAnnotationRequest};
use annot_db::test_fixtures::TestDatabase;
use annot_db::SEARCH_PAGE_LIMIT;

async fn seed(
    test_db: &TestDatabase,
    data_source_id: &str,
    id: &str,
    content: &str,
    assign_to: &str,
) {
    test_db
        .db
        .annotations
        .create(data_source_id, id)
        .await
        .expect("create failed");
    test_db
        .db
        .annotations
        .update(
            data_source_id,
            id,
            UpdateAnnotationRequest {
                content: content.to_string(),
                assign_to: assign_to.to_string(),
                status: Status::Open,
                updated_by: "seeder".to_string(),
            },
        )
        .await
        .expect("update failed");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_search_matches_id_content_and_assignee() {
    let test_db = TestDatabase::new().await;

    seed(&test_db, "src1", "alert-7", "routine check", "alice").await;
    seed(&test_db, "src1", "case-1", "network breach", "bob").await;
    seed(&test_db, "src1", "case-2", "disk failure", "breach-team").await;
    seed(&test_db, "src1", "case-3", "all quiet", "carol").await;

    let results = test_db
        .db
        .search
        .search("src1", "breach", None)
        .await
        .expect("search failed");

    let ids: Vec<_> = results.iter().map(|a| a.id.as_str()).collect();
    // case-1 matches on content, case-2 on assign_to; id descending.
    assert_eq!(ids, vec!["case-2", "case-1"]);

    let by_id = test_db
        .db
        .search
        .search("src1", "alert", None)
        .await
        .expect("search failed");
    assert_eq!(by_id.len(), 1);
    assert_eq!(by_id[0].id, "alert-7");

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_search_scoped_to_data_source() {
    let test_db = TestDatabase::new().await;

    seed(&test_db, "src1", "a1", "shared term", "alice").await;
    seed(&test_db, "src2", "a2", "shared term", "bob").await;

    let results = test_db
        .db
        .search
        .search("src1", "shared", None)
        .await
        .expect("search failed");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].data_source_id, "src1");

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_search_pagination_no_overlap() {
    let test_db = TestDatabase::new().await;

    // 15 matching rows; zero-padded ids make the descending string
    // order unambiguous.
    for i in 1..=15 {
        seed(
            &test_db,
            "src1",
            &format!("a{:02}", i),
            "paginated",
            "alice",
        )
        .await;
    }

    let first_page = test_db
        .db
        .search
        .search("src1", "paginated", None)
        .await
        .expect("first page failed");
    assert_eq!(first_page.len() as i64, SEARCH_PAGE_LIMIT);
    assert_eq!(first_page[0].id, "a15");
    assert_eq!(first_page[9].id, "a06");

    let second_page = test_db
        .db
        .search
        .search("src1", "paginated", Some(SEARCH_PAGE_LIMIT))
        .await
        .expect("second page failed");
    assert_eq!(second_page.len(), 5);
    assert_eq!(second_page[0].id, "a05");
    assert_eq!(second_page[4].id, "a01");

    for a in &second_page {
        assert!(
            !first_page.iter().any(|b| b.id == a.id),
            "pages must not overlap"
        );
    }

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_empty_query_matches_every_live_row() {
    let test_db = TestDatabase::new().await;

    seed(&test_db, "src1", "a1", "one", "alice").await;
    seed(&test_db, "src1", "a2", "two", "bob").await;

    let results = test_db
        .db
        .search
        .search("src1", "", None)
        .await
        .expect("search failed");
    assert_eq!(results.len(), 2);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_like_wildcards_in_query_match_literally() {
    let test_db = TestDatabase::new().await;

    seed(&test_db, "src1", "a1", "progress 50% done", "alice").await;
    seed(&test_db, "src1", "a2", "progress 5x done", "bob").await;

    // '%' in the query must not act as a wildcard: only the row
    // containing a literal "50%" matches.
    let results = test_db
        .db
        .search
        .search("src1", "50%", None)
        .await
        .expect("search failed");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "a1");

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_deleted_rows_are_not_searchable() {
    let test_db = TestDatabase::new().await;

    seed(&test_db, "src1", "a1", "findme", "alice").await;
    seed(&test_db, "src1", "a2", "findme", "bob").await;
    test_db
        .db
        .annotations
        .delete("src1", "a2")
        .await
        .expect("delete failed");

    let results = test_db
        .db
        .search
        .search("src1", "findme", None)
        .await
        .expect("search failed");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "a1");

    test_db.cleanup().await;
}
