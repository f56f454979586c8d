//! Named colors, already converted to linear space.

use super::LinearRgba;

pub const WHITE: LinearRgba = LinearRgba::WHITE;
pub const BLACK: LinearRgba = LinearRgba::BLACK;
pub const RED: LinearRgba = LinearRgba::rgb(1.0, 0.0, 0.0);
pub const GREEN: LinearRgba = LinearRgba::rgb(0.0, 1.0, 0.0);
pub const BLUE: LinearRgba = LinearRgba::rgb(0.0, 0.0, 1.0);
pub const YELLOW: LinearRgba = LinearRgba::rgb(1.0, 1.0, 0.0);
pub const CYAN: LinearRgba = LinearRgba::rgb(0.0, 1.0, 1.0);
pub const MAGENTA: LinearRgba = LinearRgba::rgb(1.0, 0.0, 1.0);

/// sRGB `#808080`.
pub const GRAY: LinearRgba = LinearRgba::rgb(0.2158, 0.2158, 0.2158);

/// sRGB `#ffa500`.
pub const ORANGE: LinearRgba = LinearRgba::rgb(1.0, 0.3763, 0.0);

/// sRGB `#ff69b4`.
pub const HOT_PINK: LinearRgba = LinearRgba::rgb(1.0, 0.1413, 0.4564);

/// sRGB `#00ff7f`.
pub const SPRING_GREEN: LinearRgba = LinearRgba::rgb(0.0, 1.0, 0.2122);

/// sRGB hex codes of the named colors, by lowercase name.
const NAMED: &[(&str, &str)] = &[
    ("white", "#ffffff"),
    ("black", "#000000"),
    ("red", "#ff0000"),
    ("green", "#00ff00"),
    ("blue", "#0000ff"),
    ("yellow", "#ffff00"),
    ("cyan", "#00ffff"),
    ("magenta", "#ff00ff"),
    ("gray", "#808080"),
    ("orange", "#ffa500"),
    ("hot_pink", "#ff69b4"),
    ("spring_green", "#00ff7f"),
];

/// Looks up a palette color by name (case-insensitive), or parses `name` as
/// an sRGB hex code when it is not a known name.
pub fn named(name: &str) -> Option<LinearRgba> {
    let hex = NAMED
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map_or(name, |(_, hex)| *hex);
    LinearRgba::from_hex(hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: LinearRgba, b: LinearRgba) -> bool {
        a.to_array()
            .iter()
            .zip(b.to_array())
            .all(|(x, y)| (x - y).abs() < 1e-4)
    }

    #[test]
    fn constants_match_their_hex_codes() {
        let constants = [
            ("white", WHITE),
            ("black", BLACK),
            ("red", RED),
            ("green", GREEN),
            ("blue", BLUE),
            ("yellow", YELLOW),
            ("cyan", CYAN),
            ("magenta", MAGENTA),
            ("gray", GRAY),
            ("orange", ORANGE),
            ("hot_pink", HOT_PINK),
            ("spring_green", SPRING_GREEN),
        ];
        assert_eq!(constants.len(), NAMED.len());
        for (name, constant) in constants {
            let parsed = named(name).expect("known name");
            assert!(approx(parsed, constant), "{name}: {parsed:?} != {constant:?}");
        }
    }

    #[test]
    fn named_falls_back_to_hex() {
        assert_eq!(named("Hot_Pink"), named("hot_pink"));
        assert!(approx(named("#ff0000").expect("hex"), RED));
        assert_eq!(named("teal"), None);
    }
}
