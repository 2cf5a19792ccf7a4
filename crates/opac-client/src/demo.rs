//! An in-memory catalog for running without a server.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use log::debug;
use opac_core::call_number::CallNumberDisplay;
use opac_core::holding::{HoldingStatus, ItemHolding};
use opac_core::marc::{tags, FieldContent, MarcField, MarcRecord, Subfield};
use opac_core::page::{ResultSource, SearchResultPage, TotalCount};
use opac_core::query::{SearchField, SearchQuery};
use opac_core::record::BibliographicDetail;
use opac_core::types::RecordId;

use crate::client::{CatalogClient, LibraryMap};
use crate::error::CatalogError;
use crate::normalize::detail_from_marc;
use crate::transport::BoxFuture;

struct Sample {
    id: u64,
    title: &'static str,
    author: &'static str,
    year: &'static str,
    publisher: &'static str,
    isbn: &'static str,
    item_type: &'static str,
    lcc: Option<&'static str>,
    dewey: Option<&'static str>,
    subject: &'static str,
    summary: &'static str,
}

const SAMPLES: &[Sample] = &[
    Sample {
        id: 1,
        title: "For whom the bell tolls",
        author: "Hemingway, Ernest, 1899-1961.",
        year: "1940",
        publisher: "Charles Scribner's Sons",
        isbn: "9780684803357",
        item_type: "Book",
        lcc: Some("PS3515.E37 F6"),
        dewey: Some("813.52"),
        subject: "Spain -- History -- Civil War, 1936-1939",
        summary: "A young American in the International Brigades during the Spanish Civil War.",
    },
    Sample {
        id: 3,
        title: "The old man and the sea",
        author: "Hemingway, Ernest, 1899-1961.",
        year: "1952",
        publisher: "Charles Scribner's Sons",
        isbn: "9780684801223",
        item_type: "Sound recording",
        lcc: Some("PS3515.E37 O4"),
        dewey: Some("813.52"),
        subject: "Fishers -- Fiction",
        summary: "An aging Cuban fisherman and his battle with a giant marlin.",
    },
    Sample {
        id: 5,
        title: "Foundation",
        author: "Asimov, Isaac, 1920-1992.",
        year: "1951",
        publisher: "Gnome Press",
        isbn: "9780553293357",
        item_type: "Book",
        lcc: Some("PS3551.S5 F6"),
        dewey: Some("813.54"),
        subject: "Science fiction",
        summary: "The first novel of the Foundation series.",
    },
    Sample {
        id: 6,
        title: "I, robot",
        author: "Asimov, Isaac, 1920-1992.",
        year: "1950",
        publisher: "Gnome Press",
        isbn: "9780553294385",
        item_type: "Book",
        lcc: Some("PS3551.S5 I2"),
        dewey: Some("813.54"),
        subject: "Robots -- Fiction",
        summary: "Nine short stories about robots.",
    },
    Sample {
        id: 7,
        title: "The great Gatsby",
        author: "Fitzgerald, F. Scott, 1896-1940.",
        year: "1925",
        publisher: "Charles Scribner's Sons",
        isbn: "9780743273565",
        item_type: "Book",
        lcc: Some("PS3511.I9 G7"),
        dewey: Some("813.52"),
        subject: "Long Island (N.Y.) -- Fiction",
        summary: "A portrait of the Jazz Age in all of its decadence and excess.",
    },
    Sample {
        id: 8,
        title: "To kill a mockingbird",
        author: "Lee, Harper, 1926-2016.",
        year: "1960",
        publisher: "J. B. Lippincott & Co.",
        isbn: "9780061120084",
        item_type: "Book",
        lcc: Some("PS3562.E353 T6"),
        dewey: Some("813.54"),
        subject: "Race relations -- Fiction",
        summary: "Racial injustice and the loss of innocence in the American South.",
    },
    Sample {
        id: 9,
        title: "Nineteen eighty-four",
        author: "Orwell, George, 1903-1950.",
        year: "1949",
        publisher: "Secker & Warburg",
        isbn: "9780451524935",
        item_type: "Book",
        lcc: Some("PR6029.R8 N5"),
        dewey: Some("823.912"),
        subject: "Totalitarianism -- Fiction",
        summary: "A dystopian novel set in a totalitarian society.",
    },
    Sample {
        id: 10,
        title: "Pride and prejudice",
        author: "Austen, Jane, 1775-1817.",
        year: "1813",
        publisher: "T. Egerton",
        isbn: "9780141439518",
        item_type: "Book",
        lcc: Some("PR4034 .P7"),
        dewey: Some("823.7"),
        subject: "Courtship -- Fiction",
        summary: "Elizabeth Bennet and Mr. Darcy.",
    },
    Sample {
        id: 14,
        title: "The hobbit",
        author: "Tolkien, J. R. R., 1892-1973.",
        year: "1937",
        publisher: "George Allen & Unwin",
        isbn: "9780547928227",
        item_type: "Book",
        lcc: Some("PR6039.O32 H6"),
        dewey: Some("823.912"),
        subject: "Fantasy fiction",
        summary: "The adventures of the hobbit Bilbo Baggins.",
    },
    Sample {
        id: 16,
        title: "Python programming : an introduction to computer science",
        author: "Zelle, John M.",
        year: "2016",
        publisher: "Franklin, Beedle & Associates",
        isbn: "9781590282755",
        item_type: "Book",
        lcc: None,
        dewey: Some("005.133"),
        subject: "Python (Computer program language)",
        summary: "A first course in computer science using Python.",
    },
    Sample {
        id: 17,
        title: "Clean code : a handbook of agile software craftsmanship",
        author: "Martin, Robert C.",
        year: "2008",
        publisher: "Prentice Hall",
        isbn: "9780132350884",
        item_type: "Book",
        lcc: Some("QA76.76.D47 M38"),
        dewey: None,
        subject: "Agile software development",
        summary: "Writing clean, readable and maintainable code.",
    },
    Sample {
        id: 20,
        title: "The grapes of wrath",
        author: "Steinbeck, John, 1902-1968.",
        year: "1939",
        publisher: "The Viking Press",
        isbn: "9780143039433",
        item_type: "Book",
        lcc: Some("PS3537.T3234 G8"),
        dewey: Some("813.52"),
        subject: "Migrant agricultural laborers -- Fiction",
        summary: "The Joad family's migration from Oklahoma to California.",
    },
];

const LIBRARIES: &[(&str, &str)] = &[
    ("MAIN", "Main Library"),
    ("NORTH", "North Branch"),
    ("SOUTH", "South Branch"),
    ("CHILD", "Children's Library"),
    ("REF", "Reference Library"),
];

const LOCATIONS: &[&str] = &["Adult Fiction", "Adult Non-Fiction", "Young Adult", "Large Print"];

const STATUS_CYCLE: &[HoldingStatus] = &[
    HoldingStatus::Available,
    HoldingStatus::CheckedOut,
    HoldingStatus::Available,
    HoldingStatus::InTransit,
    HoldingStatus::ReferenceOnly,
];

/// Record with no physical copies.
const ONLINE_ONLY_ID: u64 = 17;

fn data(tag: &str, subfields: &[(char, &str)]) -> MarcField {
    MarcField {
        tag: tag.to_owned(),
        content: FieldContent::Data {
            ind1: ' ',
            ind2: ' ',
            subfields: subfields
                .iter()
                .map(|(code, value)| Subfield {
                    code: *code,
                    value: (*value).to_owned(),
                })
                .collect(),
        },
    }
}

impl Sample {
    fn marc(&self) -> MarcRecord {
        let mut fields = vec![
            MarcField {
                tag: "001".to_owned(),
                content: FieldContent::Control(self.id.to_string()),
            },
            data(tags::ISBN, &[('a', self.isbn)]),
        ];
        if let Some(lcc) = self.lcc {
            fields.push(data(tags::LC_CALL_NUMBER, &[('a', lcc)]));
        }
        if let Some(dewey) = self.dewey {
            fields.push(data(tags::DEWEY, &[('a', dewey)]));
        }
        let (title, subtitle) = match self.title.split_once(" : ") {
            Some((t, s)) => (format!("{t} :"), Some(s)),
            None => (self.title.to_owned(), None),
        };
        let mut title_field = vec![('a', title.as_str())];
        if let Some(s) = subtitle {
            title_field.push(('b', s));
        }
        fields.push(data(tags::AUTHOR_PERSONAL, &[('a', self.author)]));
        fields.push(data(tags::TITLE, &title_field));
        fields.push(data(
            tags::PUBLICATION,
            &[('b', self.publisher), ('c', self.year)],
        ));
        fields.push(data(tags::SUMMARY, &[('a', self.summary)]));
        let mut subject = self.subject.split(" -- ");
        let mut subject_subfields = vec![('a', subject.next().unwrap_or(self.subject))];
        subject_subfields.extend(subject.map(|part| ('x', part)));
        fields.push(data(tags::SUBJECT_TOPICAL, &subject_subfields));
        fields.push(data(tags::KOHA_ITEM_TYPE, &[('c', self.item_type)]));

        MarcRecord {
            leader: Some("00000nam a22000007a 4500".to_owned()),
            fields,
        }
    }

    fn matches(&self, field: SearchField, needle: &str) -> bool {
        let hay = |s: &str| s.to_lowercase().contains(needle);
        match field {
            SearchField::Title => hay(self.title),
            SearchField::Author => hay(self.author),
            SearchField::Subject => hay(self.subject),
            SearchField::Isbn => self.isbn.contains(&needle.replace('-', "")),
            SearchField::Series => false,
            SearchField::CallNumber => {
                self.lcc.is_some_and(hay) || self.dewey.is_some_and(hay)
            }
            SearchField::Keyword => {
                hay(self.title) || hay(self.author) || hay(self.subject) || hay(self.summary)
            }
        }
    }

    fn holdings(&self) -> Vec<ItemHolding> {
        if self.id == ONLINE_ONLY_ID {
            return Vec::new();
        }
        let base_due = NaiveDate::from_ymd_opt(2026, 11, 2).unwrap_or_default();
        let copies = self.id % 3 + 1;
        (0..copies)
            .map(|n| {
                let slot = usize::try_from(self.id + n).unwrap_or_default();
                let (library_id, library_name) = LIBRARIES[slot % LIBRARIES.len()];
                let status = STATUS_CYCLE[slot % STATUS_CYCLE.len()];
                ItemHolding {
                    item_id: self.id * 100 + n + 1,
                    barcode: Some(format!("{:06}{:03}", self.id, n + 1)),
                    library_id: library_id.to_owned(),
                    library_name: library_name.to_owned(),
                    location: Some(LOCATIONS[slot % LOCATIONS.len()].to_owned()),
                    call_number: self.lcc.or(self.dewey).map(str::to_owned),
                    copy_number: Some((n + 1).to_string()),
                    status,
                    due_date: (status == HoldingStatus::CheckedOut)
                        .then(|| base_due.checked_add_days(Days::new(self.id % 21)))
                        .flatten(),
                    public_note: (n == 0 && self.id % 4 == 0)
                        .then(|| "Gift from Friends of the Library".to_owned()),
                }
            })
            .collect()
    }
}

/// A fixed sample collection implementing [`CatalogClient`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoCatalog {
    display: CallNumberDisplay,
}

impl DemoCatalog {
    /// A demo catalog showing call numbers under `display`.
    #[must_use]
    pub fn new(display: CallNumberDisplay) -> Self {
        Self { display }
    }

    fn sample(id: RecordId) -> Result<&'static Sample, CatalogError> {
        SAMPLES
            .iter()
            .find(|s| s.id == id.get())
            .ok_or(CatalogError::RecordNotFound(id))
    }

    fn detail(&self, id: RecordId) -> Result<BibliographicDetail, CatalogError> {
        Self::sample(id).map(|s| detail_from_marc(id, s.marc(), self.display))
    }

    fn run_search(&self, query: &SearchQuery) -> Result<SearchResultPage, CatalogError> {
        let needle = query.term().to_lowercase();
        let matches: Vec<&Sample> = SAMPLES
            .iter()
            .filter(|s| s.matches(query.field(), &needle))
            .collect();
        debug!("demo search '{query}' matched {}", matches.len());

        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let records = matches
            .iter()
            .skip(offset)
            .take(query.page_size() as usize)
            .map(|s| -> Result<_, CatalogError> {
                let id = RecordId::new(s.id)?;
                Ok(self.detail(id)?.summary)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SearchResultPage {
            records,
            total: TotalCount::Exact(matches.len() as u64),
            page: query.page(),
            page_size: query.page_size(),
            source: ResultSource::Demo,
        })
    }
}

impl CatalogClient for DemoCatalog {
    fn search<'a>(
        &'a self,
        query: &'a SearchQuery,
    ) -> BoxFuture<'a, Result<SearchResultPage, CatalogError>> {
        Box::pin(async move { self.run_search(query) })
    }

    fn get_detail(&self, id: RecordId) -> BoxFuture<'_, Result<BibliographicDetail, CatalogError>> {
        Box::pin(async move { self.detail(id) })
    }

    fn get_holdings(&self, id: RecordId) -> BoxFuture<'_, Result<Vec<ItemHolding>, CatalogError>> {
        Box::pin(async move { Self::sample(id).map(Sample::holdings) })
    }

    fn get_libraries(&self) -> BoxFuture<'_, Result<LibraryMap, CatalogError>> {
        Box::pin(async move {
            Ok(LIBRARIES
                .iter()
                .map(|(code, name)| ((*code).to_owned(), (*name).to_owned()))
                .collect::<BTreeMap<_, _>>())
        })
    }
}
