use crate::formatter::{format_confidence, truncate};
use crate::types::{ConfidenceLevel, OcrTextBlock};
use comfy_table::{
    modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Attribute, Cell, CellAlignment, Color,
    ContentArrangement, Table,
};

/// Longest block text shown in a table cell
const MAX_CELL_TEXT: usize = 60;

/// Builder for consistently styled block tables
#[derive(Clone)]
pub struct TableBuilder {
    table: Table,
    colored: bool,
}

impl TableBuilder {
    pub fn new() -> Self {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic);

        Self {
            table,
            colored: true,
        }
    }

    /// Skip confidence colors (for piping into files)
    pub fn plain(mut self) -> Self {
        self.colored = false;
        self
    }

    pub fn headers<I, S>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cells: Vec<Cell> = headers
            .into_iter()
            .map(|h| Cell::new(h.into()).add_attribute(Attribute::Bold))
            .collect();
        self.table.set_header(cells);
        self
    }

    /// One row per detected block, in backend order
    pub fn blocks(&mut self, blocks: &[OcrTextBlock]) -> &mut Self {
        self.headers(["#", "Text", "Confidence", "Position", "Size"]);
        for (index, block) in blocks.iter().enumerate() {
            let bbox = &block.bounding_box;
            self.table.add_row(vec![
                Cell::new(index + 1).set_alignment(CellAlignment::Right),
                Cell::new(truncate(&block.text, MAX_CELL_TEXT)),
                self.confidence_cell(block),
                Cell::new(format!(
                    "X: {} → {}, Y: {} → {}",
                    bbox.x_min, bbox.x_max, bbox.y_min, bbox.y_max
                )),
                Cell::new(format!(
                    "{} × {} px",
                    block.dimensions.width, block.dimensions.height
                )),
            ]);
        }
        self
    }

    fn confidence_cell(&self, block: &OcrTextBlock) -> Cell {
        let cell = Cell::new(format_confidence(block.confidence)).set_alignment(CellAlignment::Center);
        if !self.colored {
            return cell;
        }
        let color = match block.confidence_level() {
            ConfidenceLevel::High => Color::Green,
            ConfidenceLevel::Medium => Color::Yellow,
            ConfidenceLevel::Low => Color::Red,
        };
        cell.fg(color)
    }

    pub fn build(&self) -> String {
        self.table.to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}
