use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Product → Color32
// ---------------------------------------------------------------------------

/// Stable colour per product, so a product keeps its colour whichever
/// subgroup slot it is picked into.
#[derive(Debug, Clone)]
pub struct ProductColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ProductColors {
    pub fn new<'a>(products: impl IntoIterator<Item = &'a String>) -> Self {
        let products: Vec<&String> = products.into_iter().collect();
        let mapping = products
            .iter()
            .zip(generate_palette(products.len()))
            .map(|(p, c)| ((*p).clone(), c))
            .collect();

        ProductColors {
            mapping,
            default_color: Color32::LIGHT_BLUE,
        }
    }

    pub fn color_for(&self, product: &str) -> Color32 {
        self.mapping
            .get(product)
            .copied()
            .unwrap_or(self.default_color)
    }
}

impl Default for ProductColors {
    fn default() -> Self {
        Self::new(std::iter::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colours_are_distinct() {
        let colors = generate_palette(6);
        assert_eq!(colors.len(), 6);
        for (i, a) in colors.iter().enumerate() {
            assert!(colors[i + 1..].iter().all(|b| a != b));
        }
    }

    #[test]
    fn unknown_product_gets_default() {
        let products = vec!["GASOLINA A".to_string(), "ÓLEO DIESEL".to_string()];
        let colors = ProductColors::new(&products);
        assert_ne!(colors.color_for("GASOLINA A"), colors.color_for("ÓLEO DIESEL"));
        assert_eq!(colors.color_for("GLP"), Color32::LIGHT_BLUE);
    }
}
