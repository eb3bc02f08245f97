use serde::{Deserialize, Serialize};
use std::fmt;

/// Project columns a listing may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableSort {
    Name,
    Description,
    Type,
    Board,
    Created,
    Modified,
}

impl TableSort {
    pub const ALL: [TableSort; 6] = [
        TableSort::Name,
        TableSort::Description,
        TableSort::Type,
        TableSort::Board,
        TableSort::Created,
        TableSort::Modified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableSort::Name => "name",
            TableSort::Description => "description",
            TableSort::Type => "type",
            TableSort::Board => "board",
            TableSort::Created => "created",
            TableSort::Modified => "modified",
        }
    }

    /// Quoted column name, safe to splice into an ORDER BY clause.
    pub fn column(&self) -> &'static str {
        match self {
            TableSort::Name => "\"name\"",
            TableSort::Description => "\"description\"",
            TableSort::Type => "\"type\"",
            TableSort::Board => "\"board\"",
            TableSort::Created => "\"created\"",
            TableSort::Modified => "\"modified\"",
        }
    }
}

impl fmt::Display for TableSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableOrder {
    Asc,
    Desc,
}

impl TableOrder {
    pub fn to_sql(&self) -> &'static str {
        match self {
            TableOrder::Asc => "ASC",
            TableOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for TableOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableOrder::Asc => f.write_str("asc"),
            TableOrder::Desc => f.write_str("desc"),
        }
    }
}
