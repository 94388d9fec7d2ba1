use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextLine {
    pub text: String,
    pub align: Align,
    pub bold: bool,
}

/// A bordered table. `total` is the computed aggregate row, drawn last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub title: Option<String>,
    pub head: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total: Option<Vec<String>>,
    /// Set on the fragment of a table carried over to a new page
    pub continued: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Line(TextLine),
    Table(Table),
    Gap { height: u32 },
    Rule,
}

impl Block {
    pub fn centered(text: impl Into<String>) -> Self {
        Block::Line(TextLine { text: text.into(), align: Align::Center, bold: true })
    }

    pub fn left(text: impl Into<String>) -> Self {
        Block::Line(TextLine { text: text.into(), align: Align::Left, bold: false })
    }

    pub fn right(text: impl Into<String>) -> Self {
        Block::Line(TextLine { text: text.into(), align: Align::Right, bold: true })
    }

    pub fn gap(height: u32) -> Self {
        Block::Gap { height }
    }
}

impl Table {
    pub fn new<S: Into<String>>(head: impl IntoIterator<Item = S>) -> Self {
        Self {
            title: None,
            head: head.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            total: None,
            continued: false,
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn row<S: Into<String>>(mut self, cells: impl IntoIterator<Item = S>) -> Self {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_rows(mut self, rows: Vec<Vec<String>>) -> Self {
        self.rows.extend(rows);
        self
    }

    pub fn with_total<S: Into<String>>(mut self, cells: impl IntoIterator<Item = S>) -> Self {
        self.total = Some(cells.into_iter().map(Into::into).collect());
        self
    }

    pub fn columns(&self) -> usize {
        self.head.len()
    }

    /// Empty fragment sharing this table's header, used when a table
    /// continues on the next page
    pub(crate) fn continuation(&self) -> Self {
        Self {
            title: None,
            head: self.head.clone(),
            rows: Vec::new(),
            total: None,
            continued: true,
        }
    }
}

impl From<Table> for Block {
    fn from(table: Table) -> Self {
        Block::Table(table)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub number: usize,
    pub blocks: Vec<Block>,
}

/// A laid-out document, ready for the text renderer or an external PDF service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub file_name: String,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.pages.iter().flat_map(|p| p.blocks.iter()).filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(|p| p.blocks.iter()).filter_map(|b| match b {
            Block::Line(l) => Some(l.text.as_str()),
            _ => None,
        })
    }
}
