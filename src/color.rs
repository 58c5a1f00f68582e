use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Material group palette
// ---------------------------------------------------------------------------

/// Fixed colours for the known material groups.
const MATERIAL_COLORS: [(&str, (u8, u8, u8)); 9] = [
    ("Glass", (0xea, 0x76, 0x00)),
    ("Hazardous (excl. tyres)", (0xf6, 0x04, 0x03)),
    ("Metals", (0x60, 0xca, 0xe5)),
    ("Non-core waste", (0xb8, 0xdd, 0x79)),
    ("Paper & cardboard", (0xd2, 0x5c, 0x73)),
    ("Plastics", (0x00, 0x70, 0x96)),
    ("Textiles", (0x68, 0x0e, 0x4a)),
    ("Tyres", (0x82, 0xca, 0x9d)),
    ("Other core waste", (0xc2, 0xb2, 0x80)),
];

/// Colour for a material group: the fixed entry when there is one, otherwise
/// a hue derived from the name so the same group always gets the same colour.
pub fn material_color(group: &str) -> Srgb<u8> {
    MATERIAL_COLORS
        .iter()
        .find(|(name, _)| *name == group)
        .map(|&(_, (r, g, b))| Srgb::new(r, g, b))
        .unwrap_or_else(|| hashed_color(group))
}

/// FNV-1a over the name's bytes, reduced to a hue in degrees.
fn name_hue(key: &str) -> f32 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let hash = key
        .bytes()
        .fold(OFFSET, |h, b| (h ^ u64::from(b)).wrapping_mul(PRIME));
    (hash % 360) as f32
}

fn hashed_color(key: &str) -> Srgb<u8> {
    let hsl = Hsl::new(name_hue(key), 0.75, 0.55);
    let rgb: Srgb = hsl.into_color();
    rgb.into_format()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_groups_use_fixed_palette() {
        assert_eq!(material_color("Glass"), Srgb::new(0xea, 0x76, 0x00));
        assert_eq!(material_color("Other core waste"), Srgb::new(0xc2, 0xb2, 0x80));
    }

    #[test]
    fn unknown_groups_are_deterministic() {
        assert_eq!(material_color("E-waste"), material_color("E-waste"));
        // pinned so the colour never changes between builds
        assert_eq!(name_hue("E-waste"), 155.0);
        assert_eq!(name_hue("Organics"), 335.0);
        assert_eq!(name_hue(""), (0xcbf2_9ce4_8422_2325_u64 % 360) as f32);
    }
}
