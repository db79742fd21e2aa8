//! Paint tools

/// Active paint tool
///
/// Changes only on an explicit tap in the tool palette. Declaration order
/// is palette order (two columns, row-major).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tool {
    Select,
    RectSelect,
    Erase,
    Fill,
    #[default]
    Pencil,
    Brush,
    Text,
    Line,
    Rect,
    Ellipse,
}

impl Tool {
    pub const COUNT: usize = 10;

    /// Every tool in palette order
    pub const ALL: [Tool; Self::COUNT] = [
        Tool::Select,
        Tool::RectSelect,
        Tool::Erase,
        Tool::Fill,
        Tool::Pencil,
        Tool::Brush,
        Tool::Text,
        Tool::Line,
        Tool::Rect,
        Tool::Ellipse,
    ];

    /// Position in the palette
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    /// Half-width of the square stamped per cell
    pub fn stamp_radius(self) -> i32 {
        match self {
            Tool::Brush | Tool::Erase => 1,
            _ => 0,
        }
    }

    /// Pencil, Brush and Erase
    pub fn is_freehand(self) -> bool {
        matches!(self, Tool::Pencil | Tool::Brush | Tool::Erase)
    }

    /// Line, Rect and Ellipse
    pub fn is_shape(self) -> bool {
        matches!(self, Tool::Line | Tool::Rect | Tool::Ellipse)
    }

    /// Both selection tools
    pub fn is_selection(self) -> bool {
        matches!(self, Tool::Select | Tool::RectSelect)
    }

    pub fn name(self) -> &'static str {
        match self {
            Tool::Select => "Select",
            Tool::RectSelect => "Rect Select",
            Tool::Erase => "Eraser",
            Tool::Fill => "Fill",
            Tool::Pencil => "Pencil",
            Tool::Brush => "Brush",
            Tool::Text => "Text",
            Tool::Line => "Line",
            Tool::Rect => "Rectangle",
            Tool::Ellipse => "Ellipse",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_order() {
        for (i, tool) in Tool::ALL.iter().enumerate() {
            assert_eq!(tool.index(), i);
            assert_eq!(Tool::from_index(i), Some(*tool));
        }
        assert_eq!(Tool::from_index(Tool::COUNT), None);
        assert_eq!(Tool::default(), Tool::Pencil);
    }

    #[test]
    fn test_radius() {
        assert_eq!(Tool::Pencil.stamp_radius(), 0);
        assert_eq!(Tool::Brush.stamp_radius(), 1);
        assert_eq!(Tool::Erase.stamp_radius(), 1);
        assert_eq!(Tool::Line.stamp_radius(), 0);
    }

    #[test]
    fn test_categories() {
        let freehand = Tool::ALL.iter().filter(|t| t.is_freehand()).count();
        let shapes = Tool::ALL.iter().filter(|t| t.is_shape()).count();
        let select = Tool::ALL.iter().filter(|t| t.is_selection()).count();
        assert_eq!((freehand, shapes, select), (3, 3, 2));
        assert!(!Tool::Fill.is_freehand() && !Tool::Text.is_shape());
    }
}
