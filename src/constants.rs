//! Global constants shared across the display and panel modules.

use embedded_graphics::pixelcolor::Rgb888;

/// The total width of the LED matrix in pixels.
pub const PANEL_WIDTH: u32 = 53;
/// The total height of the LED matrix in pixels.
pub const PANEL_HEIGHT: u32 = 11;

/// Width of a clock digit cell in pixels.
pub const DIGIT_WIDTH: u32 = 5;
/// Height of a clock digit cell in pixels.
pub const DIGIT_HEIGHT: u32 = 6;
/// Width of the colon cell between digit pairs.
pub const COLON_WIDTH: u32 = 2;

/// Number of discrete frames in a digit roll, one per glyph row.
pub const ROLL_FRAMES: u8 = DIGIT_HEIGHT as u8;

/// X-offset of the leftmost clock digit.
pub const CLOCK_BASE_X: i32 = 9;
/// Y-offset of the clock digit row. The top glyph row sits just above the
/// panel so the date line below stays fully visible.
pub const CLOCK_Y: i32 = -1;

/// X positions of the six digit slots (HH:MM:SS), left to right.
pub const CLOCK_DIGITS_X: [i32; 6] = [
    CLOCK_BASE_X,
    CLOCK_BASE_X + DIGIT_WIDTH as i32,
    CLOCK_BASE_X + (DIGIT_WIDTH as i32 * 2) + 2,
    CLOCK_BASE_X + (DIGIT_WIDTH as i32 * 3) + 2,
    CLOCK_BASE_X + (DIGIT_WIDTH as i32 * 4) + 5,
    CLOCK_BASE_X + (DIGIT_WIDTH as i32 * 5) + 5,
];

/// X position of the hours/minutes colon.
pub const COLON_HM_X: i32 = CLOCK_BASE_X + (DIGIT_WIDTH as i32 * 2);
/// X position of the minutes/seconds colon.
pub const COLON_MS_X: i32 = CLOCK_BASE_X + (DIGIT_WIDTH as i32 * 4) + 3;

/// Y-offset of the date line beneath the clock digits.
pub const DATE_Y: i32 = CLOCK_Y + DIGIT_HEIGHT as i32;

// Pen colours, matching the board's original palette
pub const PEN_BLACK: Rgb888 = Rgb888::new(0, 0, 0);
pub const PEN_YELLOW: Rgb888 = Rgb888::new(255, 105, 0);
pub const PEN_GREY: Rgb888 = Rgb888::new(96, 96, 96);
pub const PEN_BLUE: Rgb888 = Rgb888::new(153, 255, 255);

/// Per-step delay of the rolling digit animation in milliseconds.
pub const ROLL_STEP_MS: u64 = 50;
/// Nominal clock refresh cycle in milliseconds.
pub const CLOCK_CYCLE_MS: u64 = 1000;
