//! Text rendering of structures and report banners.

use std::collections::BTreeMap;

use crate::structure::Structure;

/// Width of the report banners, excluding the frame.
const BANNER_WIDTH: usize = 50;

/// Renders a structure as a top-down height map.
///
/// One row per y coordinate in ascending order, one column per x
/// coordinate. Each cell shows how many levels the column reaches
/// (`max z + 1`): `1`-`9`, then `A`-`Z`, then `+`. Empty cells are blank.
pub fn height_map(structure: &Structure) -> String {
    // (x, y) -> column height
    let mut heights: BTreeMap<(i32, i32), i32> = BTreeMap::new();
    for cube in structure.cubes() {
        let height = heights.entry((cube.x, cube.y)).or_insert(0);
        *height = (*height).max(cube.z + 1);
    }

    let Some(min_x) = heights.keys().map(|&(x, _)| x).min() else {
        return String::new();
    };
    let max_x = heights.keys().map(|&(x, _)| x).max().unwrap_or(min_x);
    let min_y = heights.keys().map(|&(_, y)| y).min().unwrap_or(0);
    let max_y = heights.keys().map(|&(_, y)| y).max().unwrap_or(0);

    let mut rows = Vec::new();
    for y in min_y..=max_y {
        let mut row = String::new();
        for x in min_x..=max_x {
            match heights.get(&(x, y)) {
                Some(&height) if height > 0 => {
                    row.push(height_char(height));
                    row.push(' ');
                }
                _ => row.push_str("  "),
            }
        }
        rows.push(row.trim_end().to_string());
    }

    rows.join("\n")
}

fn height_char(height: i32) -> char {
    u32::try_from(height)
        .ok()
        .and_then(|h| char::from_digit(h, 36))
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('+')
}

/// Frames a line of text in a double-line box.
fn banner(text: &str) -> String {
    let length = text.chars().count();
    let padding = BANNER_WIDTH.saturating_sub(length) / 2;
    let extra = BANNER_WIDTH.saturating_sub(length) % 2;
    let border = "═".repeat(BANNER_WIDTH);

    format!(
        "╔{border}╗\n║{pad}{text}{pad}{extra}║\n╚{border}╝\n",
        pad = " ".repeat(padding),
        extra = " ".repeat(extra),
    )
}

/// Opening banner naming the run and its parameters.
pub fn header(title: &str, n: usize, m: i32, k: usize) -> String {
    banner(&format!(" {title} using n={n} m={m} k={k} "))
}

/// Closing banner, preceded by a blank line.
pub fn footer(title: &str) -> String {
    format!("\n{}", banner(&format!(" End {title} ")))
}
