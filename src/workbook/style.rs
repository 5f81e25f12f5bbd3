//! Cell styling for the in-memory workbook model.

/// Currency format used for every monetary cell.
pub const ACCOUNTING_FORMAT: &str =
    r#"_-"$"* #,##0.00_-;\-"$"* #,##0.00_-;_-"$"* "-"??_-;_-@_-"#;
pub const DATE_FORMAT: &str = "yyyy-mm-dd";
pub const TEXT_FORMAT: &str = "@";
pub const PERCENT_FORMAT: &str = "0.0%";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

/// Thin border, either around the whole cell or along the bottom edge only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Border {
    pub bottom_only: bool,
    pub color: Option<u32>,
}

impl Border {
    pub fn thin() -> Self {
        Self {
            bottom_only: false,
            color: None,
        }
    }

    pub fn thin_colored(color: u32) -> Self {
        Self {
            bottom_only: false,
            color: Some(color),
        }
    }

    pub fn bottom(color: u32) -> Self {
        Self {
            bottom_only: true,
            color: Some(color),
        }
    }
}

/// Visual attributes of a cell. Colours are `0xRRGGBB`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellStyle {
    pub bold: bool,
    pub italic: bool,
    pub font_size: Option<f64>,
    pub font_color: Option<u32>,
    pub fill: Option<u32>,
    pub align: Option<HorizontalAlign>,
    pub wrap: bool,
    pub border: Option<Border>,
    pub number_format: Option<String>,
}

impl CellStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn font_color(mut self, color: u32) -> Self {
        self.font_color = Some(color);
        self
    }

    pub fn fill(mut self, color: u32) -> Self {
        self.fill = Some(color);
        self
    }

    pub fn align(mut self, align: HorizontalAlign) -> Self {
        self.align = Some(align);
        self
    }

    pub fn center(self) -> Self {
        self.align(HorizontalAlign::Center)
    }

    pub fn wrap(mut self) -> Self {
        self.wrap = true;
        self
    }

    pub fn border(mut self, border: Border) -> Self {
        self.border = Some(border);
        self
    }

    pub fn number_format(mut self, format: &str) -> Self {
        self.number_format = Some(format.to_string());
        self
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Bold, centred header cell with a solid fill.
    pub fn header(fill: u32) -> Self {
        Self::new().bold().center().fill(fill)
    }
}
