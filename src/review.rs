//! Free-text design narratives. Display only, never used in pricing.

/// Symbolic associations appended to guided-flow narratives. Colors outside
/// this table are simply omitted.
const COLOR_MEANINGS: &[(&str, &str)] = &[
    ("Yellow", "prosperity"),
    ("Red", "energy"),
    ("Orange", "enthusiasm"),
    ("Green", "growth"),
    ("White", "purity"),
    ("Purple", "creativity"),
    ("Pink", "love"),
];

pub fn image_design_review(colors: &[String], size: f64, layers: u32) -> String {
    format!(
        "This beautiful pookkolam design features {count} main colors: {names}. \
         The arrangement creates a vibrant and traditional pattern ideal for Onam \
         celebrations. The symmetrical design with {layers} concentric layers creates \
         a balanced and visually appealing rangoli that would be approximately {size} \
         feet in diameter when created with real flowers.",
        count = colors.len(),
        names = colors.join(", "),
    )
}

/// Used when the vision service could not be reached at all and only the
/// fixed default palette is available.
pub fn fallback_design_review(size: f64, layers: u32) -> String {
    format!(
        "This pookkolam design appears to feature traditional colors commonly used \
         in Onam celebrations. The pattern creates a beautiful arrangement with \
         approximately {layers} layers and would be about {size} feet in diameter \
         when created with real flowers."
    )
}

pub fn guided_design_review(colors: &[String], size: f64, layers: u32) -> String {
    let meanings: Vec<&str> = COLOR_MEANINGS
        .iter()
        .filter(|(color, _)| colors.iter().any(|c| c.eq_ignore_ascii_case(color)))
        .map(|(_, meaning)| *meaning)
        .collect();

    let closing = if meanings.is_empty() {
        "The color combination you've selected makes this design perfect for your \
         Onam celebration."
            .to_string()
    } else {
        format!(
            "The color combination you've selected represents {}, making this design \
             perfect for your Onam celebration.",
            meanings.join(", ")
        )
    };

    format!(
        "This custom pookkolam design features {count} main colors: {names}. \
         The arrangement creates a vibrant and traditional pattern ideal for Onam \
         celebrations. The design with {layers} concentric layers will be \
         approximately {size} feet in diameter when created with real flowers. \
         {closing}",
        count = colors.len(),
        names = colors.join(", "),
    )
}
