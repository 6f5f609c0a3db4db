use ratatui::style::Color;

pub struct Theme {
    pub fg: Color,
    pub primary: Color,   // Blue
    pub secondary: Color, // Orange
    pub comment: Color,   // Grey
    pub success: Color,   // Green
    pub error: Color,     // Red
    pub keyword: Color,
    pub string: Color,
    pub number: Color,
    pub border_focused: Color,
    pub border_normal: Color,
    pub current_line_bg: Color,
    pub function: Color,
    pub bar: Color,          // Array bars at rest
    pub highlight: Color,    // Cells under a pointer or being compared
    pub pointer: Color,      // Pointer labels
    pub visited: Color,      // Visited tree nodes / matched text
    pub override_tag: Color, // Marker for traces from user code
}

pub const DEFAULT_THEME: Theme = Theme {
    fg: Color::Rgb(205, 214, 244),
    primary: Color::Rgb(137, 180, 250),   // Blue
    secondary: Color::Rgb(250, 179, 135), // Orange
    comment: Color::Rgb(108, 112, 134),
    success: Color::Rgb(166, 227, 161),
    error: Color::Rgb(243, 139, 168),
    keyword: Color::Rgb(137, 180, 250),        // Blue for keywords
    string: Color::Rgb(250, 179, 135),         // Orange for strings
    number: Color::Rgb(250, 179, 135),         // Orange for numbers
    border_focused: Color::Rgb(249, 226, 175), // Yellow border for focus
    border_normal: Color::Rgb(108, 112, 134),  // Grey border for normal
    current_line_bg: Color::Rgb(50, 50, 70),   // Slightly lighter BG for current line
    function: Color::Rgb(249, 226, 175),       // Yellow for functions
    bar: Color::Rgb(116, 199, 236),            // Sapphire
    highlight: Color::Rgb(249, 226, 175),      // Yellow
    pointer: Color::Rgb(245, 194, 231),        // Pink
    visited: Color::Rgb(166, 227, 161),        // Green
    override_tag: Color::Rgb(203, 166, 247),   // Mauve
};
