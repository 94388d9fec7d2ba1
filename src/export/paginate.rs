use crate::config::ExportConfig;

use super::layout::{Block, Page, Table};

/// Lays blocks onto pages. A block that would push the vertical cursor past
/// the content threshold starts a new page; table rows are never split, and a
/// table carried over repeats its header.
pub struct Paginator<'a> {
    config: &'a ExportConfig,
    pages: Vec<Page>,
    current: Vec<Block>,
    cursor: u32,
}

impl<'a> Paginator<'a> {
    pub fn new(config: &'a ExportConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
            current: Vec::new(),
            cursor: config.page_top,
        }
    }

    pub fn paginate(mut self, blocks: Vec<Block>) -> Vec<Page> {
        for block in blocks {
            match block {
                Block::Gap { height } => {
                    if self.overflows(height) {
                        // a gap at a page boundary is swallowed
                        self.break_page();
                    } else if !self.current.is_empty() {
                        self.cursor += height;
                        self.current.push(Block::Gap { height });
                    }
                }
                Block::Line(_) | Block::Rule => {
                    self.ensure_room(self.config.line_height);
                    self.cursor += self.config.line_height;
                    self.current.push(block);
                }
                Block::Table(table) => self.place_table(table),
            }
        }

        self.break_page();
        self.pages
    }

    fn place_table(&mut self, table: Table) {
        let line = self.config.line_height;
        let row = self.config.row_height;
        let title_height = if table.title.is_some() { line } else { 0 };
        let has_body = !table.rows.is_empty() || table.total.is_some();

        // title, header and the first body row travel together
        let lead = title_height + row + if has_body { row } else { 0 };
        self.ensure_room(lead);

        let mut fragment = Table {
            title: table.title.clone(),
            head: table.head.clone(),
            rows: Vec::new(),
            total: None,
            continued: table.continued,
        };
        self.cursor += title_height + row;

        for cells in table.rows.iter() {
            if self.overflows(row) && !fragment.rows.is_empty() {
                self.current.push(Block::Table(fragment));
                self.break_page();
                fragment = table.continuation();
                self.cursor += row;
            }
            fragment.rows.push(cells.clone());
            self.cursor += row;
        }

        if let Some(total) = table.total.as_ref() {
            if self.overflows(row) && !fragment.rows.is_empty() {
                self.current.push(Block::Table(fragment));
                self.break_page();
                fragment = table.continuation();
                self.cursor += row;
            }
            fragment.total = Some(total.clone());
            self.cursor += row;
        }

        self.current.push(Block::Table(fragment));
    }

    fn overflows(&self, height: u32) -> bool {
        self.cursor + height > self.config.page_content_threshold
    }

    fn ensure_room(&mut self, height: u32) {
        if self.overflows(height) && !self.current.is_empty() {
            self.break_page();
        }
    }

    fn break_page(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let number = self.pages.len() + 1;
        self.pages.push(Page {
            number,
            blocks: std::mem::take(&mut self.current),
        });
        self.cursor = self.config.page_top;
    }
}
