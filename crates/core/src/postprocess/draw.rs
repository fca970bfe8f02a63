//! Pixel-level drawing primitives for annotating square BGR face crops.
//!
//! Text uses a built-in 5×7 bitmap font covering only the glyphs the debug
//! overlay emits.

pub type Bgr = (u8, u8, u8);

pub const GREEN: Bgr = (0, 255, 0);
pub const BLUE: Bgr = (255, 0, 0);
pub const RED: Bgr = (0, 0, 255);
pub const YELLOW: Bgr = (0, 255, 255);
pub const BLACK: Bgr = (0, 0, 0);

const GLYPH_WIDTH: usize = 5;
const GLYPH_HEIGHT: usize = 7;

pub fn set_pixel(pixels: &mut [u8], size: usize, x: i32, y: i32, color: Bgr) {
    if x < 0 || y < 0 || x >= size as i32 || y >= size as i32 {
        return;
    }
    let base = (y as usize * size + x as usize) * 3;
    pixels[base] = color.0;
    pixels[base + 1] = color.1;
    pixels[base + 2] = color.2;
}

/// Bresenham line between two points, clipped to the crop.
pub fn draw_line(pixels: &mut [u8], size: usize, from: (i32, i32), to: (i32, i32), color: Bgr) {
    let (mut x, mut y) = from;
    let dx = (to.0 - from.0).abs();
    let dy = -(to.1 - from.1).abs();
    let sx = if from.0 < to.0 { 1 } else { -1 };
    let sy = if from.1 < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        set_pixel(pixels, size, x, y, color);
        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// One-pixel rectangle outline with corners `(x1, y1)` and `(x2, y2)`.
pub fn draw_rect(pixels: &mut [u8], size: usize, corner1: (i32, i32), corner2: (i32, i32), color: Bgr) {
    let (x1, y1) = corner1;
    let (x2, y2) = corner2;
    draw_line(pixels, size, (x1, y1), (x2, y1), color);
    draw_line(pixels, size, (x2, y1), (x2, y2), color);
    draw_line(pixels, size, (x2, y2), (x1, y2), color);
    draw_line(pixels, size, (x1, y2), (x1, y1), color);
}

pub fn fill_circle(pixels: &mut [u8], size: usize, center: (i32, i32), radius: i32, color: Bgr) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                set_pixel(pixels, size, center.0 + dx, center.1 + dy, color);
            }
        }
    }
}

fn glyph(c: char) -> [u8; GLYPH_HEIGHT] {
    match c {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        'a' => [0x00, 0x00, 0x0E, 0x01, 0x0F, 0x11, 0x0F],
        'c' => [0x00, 0x00, 0x0E, 0x10, 0x10, 0x11, 0x0E],
        'h' => [0x10, 0x10, 0x16, 0x19, 0x11, 0x11, 0x11],
        'i' => [0x04, 0x00, 0x0C, 0x04, 0x04, 0x04, 0x0E],
        'p' => [0x00, 0x00, 0x1E, 0x11, 0x1E, 0x10, 0x10],
        't' => [0x08, 0x08, 0x1C, 0x08, 0x08, 0x09, 0x06],
        'w' => [0x00, 0x00, 0x11, 0x11, 0x15, 0x15, 0x0A],
        'x' => [0x00, 0x00, 0x11, 0x0A, 0x04, 0x0A, 0x11],
        'y' => [0x00, 0x00, 0x11, 0x11, 0x0F, 0x01, 0x0E],
        _ => [0x00; GLYPH_HEIGHT],
    }
}

/// Pixel width of `text` at the given integer scale.
pub fn text_width(text: &str, scale: usize) -> usize {
    if text.is_empty() {
        return 0;
    }
    text.chars().count() * (GLYPH_WIDTH + 1) * scale - scale
}

pub fn text_height(scale: usize) -> usize {
    GLYPH_HEIGHT * scale
}

fn draw_text(pixels: &mut [u8], size: usize, text: &str, origin: (i32, i32), scale: usize, color: Bgr) {
    let mut pen_x = origin.0;
    for c in text.chars() {
        let rows = glyph(c);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        set_pixel(
                            pixels,
                            size,
                            pen_x + (col * scale + sx) as i32,
                            origin.1 + (row * scale + sy) as i32,
                            color,
                        );
                    }
                }
            }
        }
        pen_x += ((GLYPH_WIDTH + 1) * scale) as i32;
    }
}

/// Text with a black outline so it stays readable on any face.
pub fn draw_text_bordered(
    pixels: &mut [u8],
    size: usize,
    text: &str,
    origin: (i32, i32),
    scale: usize,
    color: Bgr,
) {
    let offset = scale.max(1) as i32;
    for dy in [-offset, 0, offset] {
        for dx in [-offset, 0, offset] {
            if dx == 0 && dy == 0 {
                continue;
            }
            draw_text(pixels, size, text, (origin.0 + dx, origin.1 + dy), scale, BLACK);
        }
    }
    draw_text(pixels, size, text, origin, scale, color);
}
