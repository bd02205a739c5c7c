use std::sync::Arc;

use crate::filter::{FilterEngine, FilterQuery};
use crate::output::{self, OutputFormat, ViewMode};
use crate::paginate::{PaginateError, Paginator};
use crate::session::{Reply, Session, SessionCommand};
use crate::store::{self, Attribute, Dataset, LoadOptions, Record};

const DIRECTORY: &str = "\
Organisation Name,Category,Country,Short Description,Category/Focus,Website URL,Contact Name,Phone,Email
Clean Water Trust,Health,Kenya,Wells for rural villages,Water,https://cleanwater.example,Amina Otieno,+254 100,info@cleanwater.example
Books for All,Education,UK,School libraries,Literacy,www.books.example,,020 7946 0000,
River Health,Health,Uganda,Mobile clinics,Clean water and sanitation,HTTP://river.example,,,
Open Minds,Education,Kenya,Mentoring for teenagers,Youth,,N/A,,hello@openminds.example
";

fn directory() -> Arc<Dataset> {
    let dataset =
        store::load_from_reader(DIRECTORY.as_bytes(), "directory.csv", &LoadOptions::default())
            .unwrap();
    Arc::new(dataset)
}

fn numbered(n: usize) -> Dataset {
    Dataset::new(
        (0..n)
            .map(|i| Record {
                name: Some(format!("Charity {i:02}")),
                ..Record::default()
            })
            .collect(),
    )
}

fn names(records: &[&Record]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.display(Attribute::Name).to_string())
        .collect()
}

#[test]
fn search_is_case_insensitive_across_fields() {
    let ds = directory();
    let engine = FilterEngine::default();
    let view = engine.apply(ds.iter(), &FilterQuery::new().with_term("WATER"));
    assert_eq!(
        names(view.as_slice()),
        vec!["Clean Water Trust", "River Health"]
    );
}

#[test]
fn empty_query_returns_the_full_dataset_in_order() {
    let ds = directory();
    let view = FilterEngine::default().apply(ds.iter(), &FilterQuery::default());
    assert_eq!(view.len(), ds.len());
    assert!(view.iter().zip(ds.iter()).all(|(a, b)| std::ptr::eq(a, b)));
}

#[test]
fn category_membership() {
    let ds = directory();
    let engine = FilterEngine::default();
    let health = engine.apply(ds.iter(), &FilterQuery::new().with_categories(["Health"]));
    assert!(!names(health.as_slice()).contains(&"Books for All".to_string()));
    let both = engine.apply(
        ds.iter(),
        &FilterQuery::new().with_categories(["Education", "Health"]),
    );
    assert_eq!(both.len(), 4);
}

#[test]
fn search_and_selections_combine() {
    let ds = directory();
    let query = FilterQuery::new()
        .with_term("water")
        .with_categories(["Health"])
        .with_countries(["Kenya"]);
    let view = FilterEngine::default().apply(ds.iter(), &query);
    assert_eq!(names(view.as_slice()), vec!["Clean Water Trust"]);
}

#[test]
fn missing_values_display_as_sentinel() {
    let ds = directory();
    let open_minds = &ds.records()[3];
    assert_eq!(open_minds.get(Attribute::Website), None);
    assert_eq!(open_minds.display(Attribute::Website), store::SENTINEL);
    assert_eq!(open_minds.website_link(), None);
    assert_eq!(open_minds.get(Attribute::ContactName), None);

    let json = serde_json::to_value(open_minds).unwrap();
    assert_eq!(json["website_url"], "N/A");
}

#[test]
fn link_rule_is_case_insensitive_http_prefix() {
    let ds = directory();
    assert_eq!(
        ds.records()[0].website_link(),
        Some("https://cleanwater.example")
    );
    assert_eq!(ds.records()[1].website_link(), None);
    assert_eq!(ds.records()[2].website_link(), Some("HTTP://river.example"));
}

#[test]
fn numeric_looking_values_stay_verbatim() {
    let ds = directory();
    assert_eq!(ds.records()[1].get(Attribute::Phone), Some("020 7946 0000"));
}

#[test]
fn twenty_five_records_make_three_pages() {
    let ds = numbered(25);
    let view = FilterEngine::default().apply(ds.iter(), &FilterQuery::default());
    let paginator = Paginator::new(10).unwrap();
    assert_eq!(paginator.total_pages(view.len()), 3);
    let page = paginator.paginate(view.as_slice(), 3).unwrap();
    assert_eq!(page.offset(), 20);
    assert_eq!(page.items().len(), 5);
    assert_eq!(page.range_label(), "Showing 21-25 of 25");
    assert_eq!(
        paginator.paginate(view.as_slice(), 4).unwrap_err(),
        PaginateError::OutOfRange {
            page: 4,
            total_pages: 3
        }
    );
}

#[test]
fn empty_view_has_one_empty_page() {
    let ds = directory();
    let view = FilterEngine::default().apply(ds.iter(), &FilterQuery::new().with_term("zzz"));
    let page = Paginator::default().paginate(view.as_slice(), 1).unwrap();
    assert_eq!(page.total_pages(), 1);
    assert!(page.is_empty());
    assert_eq!(page.range_label(), "Showing 0-0");
}

#[test]
fn facets_include_the_sentinel_for_missing_values() {
    let mut records = directory().records().to_vec();
    records[0].country = None;
    let ds = Dataset::new(records);
    let countries = ds.distinct(Attribute::Country);
    assert!(countries.contains(&store::SENTINEL.to_string()));
    assert!(countries.contains(&"Kenya".to_string()));
}

#[test]
fn session_walkthrough() {
    colored::control::set_override(false);
    let paginator = Paginator::new(1).unwrap();
    let mut session = Session::new(directory(), FilterEngine::default(), paginator);
    assert_eq!(session.execute(SessionCommand::Next), Reply::Render);
    assert_eq!(session.page_number(), 2);

    session.execute(SessionCommand::Country(vec!["Kenya".to_string()]));
    assert_eq!(session.page_number(), 1);
    assert_eq!(session.filtered().len(), 2);

    session.execute(SessionCommand::View(ViewMode::Cards));
    let text = session.render(40);
    assert!(text.contains("Displaying 2 Organisations"));
    assert!(text.contains("Page 1 of 2 (Showing 1-1 of 2)"));
}

#[test]
fn csv_export_covers_the_filtered_view() {
    let ds = directory();
    let paginator = Paginator::new(1).unwrap();
    let session = Session::new(Arc::clone(&ds), FilterEngine::default(), paginator)
        .with_query(FilterQuery::new().with_categories(["Education"]));
    let bytes = session
        .with_listing(|listing, _| output::render(OutputFormat::Csv, listing, ds.records()))
        .unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Organisation Name,"));
    assert!(lines[2].starts_with("Open Minds,Education,Kenya"));
}
