use charity_directory::filter::{FilterEngine, FilterQuery};
use charity_directory::paginate::Paginator;
use charity_directory::store::{Dataset, Record};
use proptest::prelude::*;

const CATEGORIES: &[&str] = &["Health", "Education", "Poverty"];
const COUNTRIES: &[&str] = &["Kenya", "UK", "Peru"];

fn record() -> impl Strategy<Value = Record> {
    (
        "[a-cA-C ]{0,6}",
        proptest::option::of(proptest::sample::select(CATEGORIES)),
        proptest::option::of(proptest::sample::select(COUNTRIES)),
        proptest::option::of("[a-c ]{0,8}"),
    )
        .prop_map(|(name, category, country, description)| Record {
            name: Some(name),
            category: category.map(str::to_string),
            country: country.map(str::to_string),
            short_description: description,
            ..Record::default()
        })
}

fn query() -> impl Strategy<Value = FilterQuery> {
    (
        "[a-cA-C]{0,2}",
        proptest::sample::subsequence(CATEGORIES, 0..=2),
        proptest::sample::subsequence(COUNTRIES, 0..=2),
    )
        .prop_map(|(term, categories, countries)| {
            FilterQuery::new()
                .with_term(term)
                .with_categories(categories)
                .with_countries(countries)
        })
}

proptest! {
    #[test]
    fn empty_query_is_identity(records in proptest::collection::vec(record(), 0..40)) {
        let ds = Dataset::new(records);
        let view = FilterEngine::default().apply(ds.iter(), &FilterQuery::default());
        prop_assert_eq!(view.len(), ds.len());
        for (kept, source) in view.iter().zip(ds.iter()) {
            prop_assert!(std::ptr::eq(kept, source));
        }
    }

    #[test]
    fn filtered_view_is_an_ordered_subsequence(
        records in proptest::collection::vec(record(), 0..40),
        q in query(),
    ) {
        let ds = Dataset::new(records);
        let view = FilterEngine::default().apply(ds.iter(), &q);
        let mut source = ds.iter();
        for kept in view.iter() {
            prop_assert!(source.any(|r| std::ptr::eq(r, kept)));
        }
    }

    #[test]
    fn filtering_twice_changes_nothing(
        records in proptest::collection::vec(record(), 0..40),
        q in query(),
    ) {
        let ds = Dataset::new(records);
        let engine = FilterEngine::default();
        let once = engine.apply(ds.iter(), &q);
        let twice = engine.apply(once.iter(), &q);
        prop_assert_eq!(once.as_slice(), twice.as_slice());
    }

    #[test]
    fn pages_reconstruct_the_view(
        records in proptest::collection::vec(record(), 0..60),
        q in query(),
        page_size in 1usize..15,
    ) {
        let ds = Dataset::new(records);
        let view = FilterEngine::default().apply(ds.iter(), &q);
        let paginator = Paginator::new(page_size).unwrap();
        let total_pages = paginator.total_pages(view.len());
        prop_assert!(total_pages >= 1);

        let mut joined = Vec::new();
        for n in 1..=total_pages {
            let page = paginator.paginate(view.as_slice(), n).unwrap();
            prop_assert!(page.items().len() <= page_size);
            joined.extend_from_slice(page.items());
        }
        prop_assert_eq!(joined.as_slice(), view.as_slice());
        prop_assert!(paginator.paginate(view.as_slice(), total_pages + 1).is_err());
        prop_assert!(paginator.paginate(view.as_slice(), 0).is_err());
    }
}
