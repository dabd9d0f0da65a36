//! Image listing filters.
//!
//! A request's `status` selects where images come from and which category
//! predicate applies. The predicate is store-agnostic; the repository
//! translates its [`Clause`]s into SQL.

use serde::Serialize;

/// Listing bucket requested via the `status` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStatus {
    /// Files in the unprocessed folder; not backed by the store.
    Unprocessed,
    /// Stored images without any category data.
    Uncategorized,
    /// Stored images with proposed categories.
    Autocategorized,
    /// Stored images with assigned categories. Any unknown status maps here.
    Categorized,
}

impl ImageStatus {
    /// Parse a status parameter. Unknown and empty values select
    /// [`ImageStatus::Categorized`].
    pub fn parse(s: &str) -> Self {
        match s {
            "unprocessed" => Self::Unprocessed,
            "uncategorized" => Self::Uncategorized,
            "autocategorized" => Self::Autocategorized,
            _ => Self::Categorized,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unprocessed => "unprocessed",
            Self::Uncategorized => "uncategorized",
            Self::Autocategorized => "autocategorized",
            Self::Categorized => "categorized",
        }
    }
}

/// Multi-valued category column of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryField {
    Assigned,
    Proposed,
}

/// Filter on one category set.
///
/// `Unset` and `RequireNonEmpty` are distinct states: an empty request list
/// means "has any category", never "don't filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    Unset,
    RequireNonEmpty,
    RequireSupersetOf(Vec<String>),
}

impl CategoryFilter {
    /// Build the filter for a requested name list.
    ///
    /// Duplicates are dropped and order is irrelevant; an empty list
    /// requires a non-empty set.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names
            .into_iter()
            .map(Into::into)
            .filter(|n| !n.is_empty())
            .collect();
        names.sort();
        names.dedup();

        if names.is_empty() {
            Self::RequireNonEmpty
        } else {
            Self::RequireSupersetOf(names)
        }
    }

    fn clause(&self, field: CategoryField) -> Option<Clause> {
        match self {
            Self::Unset => None,
            Self::RequireNonEmpty => Some(Clause::NonEmpty(field)),
            Self::RequireSupersetOf(names) => Some(Clause::Superset(field, names.clone())),
        }
    }
}

/// A single condition on an image record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// Assigned, proposed and starred are all empty or absent.
    Uncategorized,
    /// The field contains every listed name.
    Superset(CategoryField, Vec<String>),
    /// The field has at least one name.
    NonEmpty(CategoryField),
    /// `starredCategory` equals the value exactly.
    StarredEquals(String),
}

/// Category predicate for a store-backed listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePredicate {
    Uncategorized,
    Categorized {
        assigned: CategoryFilter,
        proposed: CategoryFilter,
        starred: Option<String>,
    },
}

impl ImagePredicate {
    /// Build the predicate for a store-backed status.
    ///
    /// Returns `None` for [`ImageStatus::Unprocessed`], which is served from
    /// the filesystem. `starred` is ignored for `Uncategorized`.
    pub fn for_status(
        status: ImageStatus,
        categories: &[String],
        starred: Option<&str>,
    ) -> Option<Self> {
        let starred = starred.filter(|s| !s.is_empty()).map(str::to_string);

        match status {
            ImageStatus::Unprocessed => None,
            ImageStatus::Uncategorized => Some(Self::Uncategorized),
            ImageStatus::Autocategorized => Some(Self::Categorized {
                assigned: CategoryFilter::Unset,
                proposed: CategoryFilter::from_names(categories.iter().cloned()),
                starred,
            }),
            ImageStatus::Categorized => Some(Self::Categorized {
                assigned: CategoryFilter::from_names(categories.iter().cloned()),
                proposed: CategoryFilter::Unset,
                starred,
            }),
        }
    }

    /// Standalone exact-match filter on the starred category.
    pub fn starred(name: impl Into<String>) -> Self {
        Self::Categorized {
            assigned: CategoryFilter::Unset,
            proposed: CategoryFilter::Unset,
            starred: Some(name.into()),
        }
    }

    /// Conditions to AND together.
    pub fn clauses(&self) -> Vec<Clause> {
        match self {
            Self::Uncategorized => vec![Clause::Uncategorized],
            Self::Categorized {
                assigned,
                proposed,
                starred,
            } => assigned
                .clause(CategoryField::Assigned)
                .into_iter()
                .chain(proposed.clause(CategoryField::Proposed))
                .chain(starred.clone().map(Clause::StarredEquals))
                .collect(),
        }
    }
}
